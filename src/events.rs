//! The binding surface: [`Events`] and its collection-bound form [`Selection`].

use crate::{
	closure_map::ClosureMap,
	config::Config,
	custom::CustomEvents,
	delegate::{OneShot, Wrap},
	entry::{Arg, Handler, HandlerEntry},
	event::{Event, FamilyCache},
	host::Host,
	identity::{ElementId, IdentityMap},
	registry::Registry,
	types::{self, TypeSpec},
	Result,
};
use core::{
	any::Any,
	cell::{Ref, RefCell},
	fmt,
};
use std::rc::Rc;
use tracing::{debug, error, instrument, trace, warn};

pub(crate) struct Inner<H: Host> {
	pub host: H,
	pub config: Config,
	pub registry: RefCell<Registry<H>>,
	pub identities: IdentityMap,
	pub listeners: RefCell<ClosureMap<H>>,
	pub custom: CustomEvents,
	pub families: RefCell<FamilyCache>,
}
impl<H: Host> Drop for Inner<H> {
	fn drop(&mut self) {
		for (element_id, native_type, installed) in self.listeners.get_mut().drain() {
			if let Err(error) = self.host.remove_listener(&installed.element, &native_type, installed.listener) {
				warn!(element = %element_id, event_type = %native_type, "Failed to remove native listener on drop: {}", error);
			}
		}
	}
}

/// Extra options of [`Events::on_with`] and [`Events::one_with`].
#[derive(Debug, Clone, Default)]
pub struct Binding {
	selector: Option<String>,
	args: Vec<Arg>,
}
impl Binding {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Delegates to descendants of the bound element matching `selector`.
	#[must_use]
	pub fn selector(mut self, selector: impl Into<String>) -> Self {
		self.selector = Some(selector.into());
		self
	}

	/// Appends an argument passed to the handler after any runtime arguments.
	#[must_use]
	pub fn arg<T: Any>(mut self, value: T) -> Self {
		self.args.push(Rc::new(value));
		self
	}

	#[must_use]
	pub fn args(mut self, args: impl IntoIterator<Item = Arg>) -> Self {
		self.args.extend(args);
		self
	}
}

/// An event binding registry over one [`Host`].
///
/// Each (element, native type) pair that has at least one binding gets exactly one native listener,
/// which fans out to the bindings in subscription order.
///
/// Clones share state. Native listeners only hold weak references,
/// and all of them are removed from the host when the last clone is dropped.
///
/// # Type strings
///
/// Type strings are split on whitespace. Each token is an event type optionally followed by `.`-separated namespaces,
/// like `click.menu.shortcuts`. A namespace-only token (`.menu`) addresses all types.
pub struct Events<H: Host>(pub(crate) Rc<Inner<H>>);
impl<H: Host> Clone for Events<H> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}
impl<H: Host> fmt::Debug for Events<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Events")
			.field("config", &self.0.config)
			.field("registry", &self.0.registry)
			.field("listeners", &self.0.listeners)
			.finish()
	}
}
impl<H: Host> Events<H> {
	#[must_use]
	pub fn new(host: H) -> Self {
		Self::with_config(host, Config::default())
	}

	#[must_use]
	pub fn with_config(host: H, config: Config) -> Self {
		let user_agent = config.user_agent_override().map_or_else(|| host.user_agent(), ToOwned::to_owned);
		Self(Rc::new(Inner {
			custom: CustomEvents::new(&user_agent),
			host,
			config,
			registry: RefCell::new(Registry::new()),
			identities: IdentityMap::new(),
			listeners: RefCell::new(ClosureMap::new()),
			families: RefCell::new(FamilyCache::new()),
		}))
	}

	#[must_use]
	pub fn host(&self) -> &H {
		&self.0.host
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.0.config
	}

	/// Read access to the registry.
	///
	/// # Panics
	///
	/// Binding or unbinding while the returned guard is alive panics.
	#[must_use]
	pub fn registry(&self) -> Ref<'_, Registry<H>> {
		self.0.registry.borrow()
	}

	pub fn identity_of(&self, node: &H::Node) -> ElementId {
		self.0.identities.identity_of(&self.0.host, node)
	}

	/// Whether the native listener for `native_type` is installed on `element`.
	#[must_use]
	pub fn is_listening(&self, element: &H::Node, native_type: &str) -> bool {
		self.0
			.host
			.cached_identity(element)
			.map_or(false, |element_id| self.0.listeners.borrow().contains(element_id, native_type))
	}

	/// Number of native listeners installed across all elements.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.0.listeners.borrow().len()
	}

	/// Removes every binding and uninstalls every native listener.
	pub fn clear(&self) {
		let drained = self.0.registry.borrow_mut().drain();
		let installed = self.0.listeners.borrow_mut().drain();
		debug!(entries = drained.len(), listeners = installed.len(), "Clearing.");
		for (element_id, native_type, installed) in installed {
			if let Err(error) = self.0.host.remove_listener(&installed.element, &native_type, installed.listener) {
				error!(element = %element_id, event_type = %native_type, "Failed to remove native listener: {}", error);
			}
		}
	}

	#[must_use]
	pub fn select(&self, nodes: impl IntoIterator<Item = H::Node>) -> Selection<'_, H> {
		Selection {
			events: self,
			nodes: nodes.into_iter().collect(),
		}
	}

	/// Text and comment nodes never accept bindings, and disabled elements don't accept `click`.
	fn accepts(&self, element: &H::Node, types: &str) -> bool {
		let host = &self.0.host;
		let kind = host.node_kind(element);
		if !kind.accepts_bindings() {
			debug!(?kind, "Ignoring events on non-element node.");
			return false;
		}
		if host.is_disabled(element) && types::split(types).any(|spec| spec.kind == "click") {
			debug!("Ignoring `click` on disabled element.");
			return false;
		}
		true
	}

	/// Binds `handler` to each type in `types` on `element`.
	///
	/// Returns `Ok(false)` without binding anything if `element` is a text or comment node,
	/// if it's disabled and `types` contains `click`, or if `types` names no event type at all.
	///
	/// # Errors
	///
	/// Iff the host fails to install a native listener. Types bound before the failing one stay bound.
	///
	/// # Example
	///
	/// ```
	/// use delegate_dom::{Events, Handler, MemoryDom};
	/// use std::{cell::Cell, rc::Rc};
	///
	/// let events = Events::new(MemoryDom::new());
	/// let button = events.host().create_element("button");
	///
	/// let clicks = Rc::new(Cell::new(0));
	/// let handler = Handler::new({
	/// 	let clicks = Rc::clone(&clicks);
	/// 	move |_, _| clicks.set(clicks.get() + 1)
	/// });
	/// assert!(events.on(&button, "click.demo", handler)?);
	///
	/// events.host().click(button);
	/// assert_eq!(clicks.get(), 1);
	///
	/// events.off(&button, ".demo");
	/// events.host().click(button);
	/// assert_eq!(clicks.get(), 1);
	/// assert!(!events.is_listening(&button, "click"));
	/// # Ok::<(), delegate_dom::Error>(())
	/// ```
	#[instrument(skip(self, element, handler))]
	pub fn on(&self, element: &H::Node, types: &str, handler: Handler<H>) -> Result<bool> {
		self.bind(element, types, Binding::default(), handler, false)
	}

	/// Binds `handler` for events whose target is (inside) a descendant of `element` matching `selector`.
	///
	/// The handler's [`Event::current_target`] is the matched descendant.
	///
	/// # Errors
	///
	/// See [`Events::on`].
	#[instrument(skip(self, element, selector, handler))]
	pub fn on_delegate(&self, element: &H::Node, types: &str, selector: &str, handler: Handler<H>) -> Result<bool> {
		self.bind(element, types, Binding::new().selector(selector), handler, false)
	}

	/// # Errors
	///
	/// See [`Events::on`].
	#[instrument(skip(self, element, binding, handler))]
	pub fn on_with(&self, element: &H::Node, types: &str, binding: Binding, handler: Handler<H>) -> Result<bool> {
		self.bind(element, types, binding, handler, false)
	}

	/// Binds each handler to its type string.
	///
	/// Returns `Ok(true)` iff every pair was bound.
	///
	/// # Errors
	///
	/// See [`Events::on`]. Stops at the first failing pair.
	pub fn on_map<'t>(&self, element: &H::Node, map: impl IntoIterator<Item = (&'t str, Handler<H>)>) -> Result<bool> {
		let mut all = true;
		for (types, handler) in map {
			all &= self.on(element, types, handler)?;
		}
		Ok(all)
	}

	/// Like [`Events::on`], but the binding removes itself (for all of `types`) after `handler` first ran.
	///
	/// # Errors
	///
	/// See [`Events::on`].
	#[instrument(skip(self, element, handler))]
	pub fn one(&self, element: &H::Node, types: &str, handler: Handler<H>) -> Result<bool> {
		self.bind(element, types, Binding::default(), handler, true)
	}

	/// # Errors
	///
	/// See [`Events::on`].
	#[instrument(skip(self, element, binding, handler))]
	pub fn one_with(&self, element: &H::Node, types: &str, binding: Binding, handler: Handler<H>) -> Result<bool> {
		self.bind(element, types, binding, handler, true)
	}

	fn bind(&self, element: &H::Node, types: &str, binding: Binding, handler: Handler<H>, one: bool) -> Result<bool> {
		if !self.accepts(element, types) {
			return Ok(false);
		}
		let element_id = self.identity_of(element);
		let Binding { selector, args } = binding;
		#[cfg(feature = "dangerous-logging")]
		trace!(?selector, args = args.len(), "Binding.");

		let mut bound = false;
		for token in types.split_whitespace() {
			let spec = TypeSpec::parse(token);
			if spec.kind.is_empty() {
				warn!(element = %element_id, "Skipping a type token without event type.");
				continue;
			}

			let translation = self.0.custom.translate(spec.kind);
			let native_type = translation.base.to_owned();
			let one_shot = if one {
				Some(types)
			} else if spec.kind == "unload" {
				Some(token)
			} else {
				None
			}
			.map(|types| OneShot {
				types: types.to_owned(),
				original: handler.clone(),
			});

			let dispatch = Wrap {
				element: element.clone(),
				handler: handler.clone(),
				selector: selector.clone(),
				condition: translation.condition,
				requested_type: if self.0.custom.is_custom(spec.kind) { Some(spec.kind.to_owned()) } else { None },
				args: args.clone(),
				one_shot,
			}
			.into_dispatch();
			let entry = Rc::new(
				HandlerEntry::new(element.clone(), element_id, native_type.clone(), handler.clone())
					.with_namespaces(spec.owned_namespaces())
					.with_requested_type(spec.kind)
					.with_dispatch(selector.clone(), args.clone(), dispatch),
			);

			let first = self.0.registry.borrow_mut().put(Rc::clone(&entry));
			if first {
				if let Err(error) = self.install(element, element_id, &native_type) {
					self.0.registry.borrow_mut().remove(&entry);
					return Err(error);
				}
			}
			bound = true;
		}
		if !bound {
			debug!(element = %element_id, "No event type to bind.");
		}
		Ok(bound)
	}

	/// Removes bindings matching `types` from `element`.
	///
	/// A binding is removed if it was bound under the token's type and carries **all** of the token's namespaces.
	/// An empty `types` removes everything, like [`Events::off_all`].
	#[instrument(skip(self, element))]
	pub fn off(&self, element: &H::Node, types: &str) {
		self.off_types(element, types, None)
	}

	/// Removes all bindings of `handler` from `element`, across all types.
	#[instrument(skip(self, element, handler))]
	pub fn off_handler(&self, element: &H::Node, handler: &Handler<H>) {
		self.remove_listener(element, None, Some(handler), &[])
	}

	/// Like [`Events::off`], limited to bindings of `handler`.
	#[instrument(skip(self, element, handler))]
	pub fn off_types_handler(&self, element: &H::Node, types: &str, handler: &Handler<H>) {
		self.off_types(element, types, Some(handler))
	}

	#[instrument(skip(self, element))]
	pub fn off_all(&self, element: &H::Node) {
		self.remove_listener(element, None, None, &[])
	}

	pub fn off_map<'t>(&self, element: &H::Node, map: impl IntoIterator<Item = (&'t str, &'t Handler<H>)>) {
		for (types, handler) in map {
			self.off_types_handler(element, types, handler)
		}
	}

	fn off_types(&self, element: &H::Node, types: &str, handler: Option<&Handler<H>>) {
		let mut any = false;
		for spec in types::split(types) {
			any = true;
			let kind = if spec.kind.is_empty() { None } else { Some(spec.kind) };
			self.remove_listener(element, kind, handler, &spec.namespaces);
		}
		if !any {
			self.remove_listener(element, None, handler, &[]);
		}
	}

	/// Removes matching entries, then uninstalls native listeners left without live entries.
	fn remove_listener(&self, element: &H::Node, kind: Option<&str>, handler: Option<&Handler<H>>, namespaces: &[&str]) {
		let element_id = match self.0.host.cached_identity(element) {
			Some(element_id) => element_id,
			None => return trace!("Element was never bound. Nothing to remove."),
		};
		let native_type = kind.map(|kind| self.0.custom.translate(kind).base);
		let entries = self.0.registry.borrow().get(element_id, native_type, handler, false);

		let mut touched: Vec<String> = Vec::new();
		{
			let mut registry = self.0.registry.borrow_mut();
			for entry in entries
				.iter()
				.filter(|entry| kind.map_or(true, |kind| entry.requested_type == kind) && entry.in_namespaces(namespaces))
			{
				if registry.remove(entry) && !touched.contains(&entry.event_type) {
					touched.push(entry.event_type.clone());
				}
			}
		}

		for native_type in touched {
			if !self.0.registry.borrow().has(element_id, &native_type, None, false) {
				self.uninstall(element_id, &native_type);
			}
		}
	}

	/// Fires each type in `types` on `element`.
	///
	/// Plain native types are dispatched as bubbling, cancelable native events, so default actions and ancestors' listeners run.
	/// Namespaced tokens and emulated types (like `mouseenter`) call the matching bindings of `element` directly instead.
	///
	/// Returns `false` if `element` doesn't accept the types (see [`Events::on`]) or the host failed to dispatch any of them.
	/// The remaining types are still fired after a failed dispatch.
	#[instrument(skip(self, element))]
	pub fn trigger(&self, element: &H::Node, types: &str) -> bool {
		self.trigger_with(element, types, &[])
	}

	/// Calls the matching bindings of `element` directly, passing `args` before any bound arguments.
	#[instrument(skip(self, element, args))]
	pub fn trigger_with(&self, element: &H::Node, types: &str, args: &[Arg]) -> bool {
		if !self.accepts(element, types) {
			return false;
		}
		let element_id = self.0.host.cached_identity(element);
		let mut dispatched = true;
		for spec in types::split(types) {
			if spec.namespaces.is_empty() && args.is_empty() && !self.0.custom.is_custom(spec.kind) {
				if spec.kind.is_empty() {
					continue;
				}
				if let Err(error) = self.0.host.dispatch_synthetic(element, spec.kind) {
					error!(event_type = spec.kind, "Failed to dispatch native event: {}", error);
					dispatched = false;
				}
			} else if let Some(element_id) = element_id {
				self.trigger_direct(element, element_id, &spec, args);
			}
		}
		dispatched
	}

	fn trigger_direct(&self, element: &H::Node, element_id: ElementId, spec: &TypeSpec<'_>, args: &[Arg]) {
		let native_type = if spec.kind.is_empty() { None } else { Some(self.0.custom.translate(spec.kind).base) };
		let entries = self.0.registry.borrow().get(element_id, native_type, None, false);

		// One synthetic event per requested type, in order of first binding.
		let mut groups: Vec<(&str, Vec<Rc<HandlerEntry<H>>>)> = Vec::new();
		for entry in &entries {
			if !(spec.kind.is_empty() || entry.requested_type == spec.kind) || !entry.in_namespaces(&spec.namespaces) {
				continue;
			}
			match groups.iter_mut().find(|(requested_type, _)| *requested_type == entry.requested_type) {
				Some((_, group)) => group.push(Rc::clone(entry)),
				None => groups.push((entry.requested_type.as_str(), vec![Rc::clone(entry)])),
			}
		}

		trace!(element = %element_id, groups = groups.len(), "Triggering directly.");
		for (_, group) in groups {
			let native_type = group[0].event_type.clone();
			let family = self.0.families.borrow_mut().family(&native_type);
			let mut event = Event::synthetic(native_type, element.clone(), family);
			self.run(&group, &mut event, args);
		}
	}
}

/// A set of nodes bound to an [`Events`], for applying the same operation to each.
pub struct Selection<'a, H: Host> {
	events: &'a Events<H>,
	nodes: Vec<H::Node>,
}
impl<'a, H: Host> fmt::Debug for Selection<'a, H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Selection").field(&self.nodes).finish()
	}
}
impl<'a, H: Host> Selection<'a, H> {
	#[must_use]
	pub fn nodes(&self) -> &[H::Node] {
		&self.nodes
	}

	/// Nodes that don't accept the binding are skipped.
	///
	/// # Errors
	///
	/// Iff the host fails to install a native listener.
	pub fn on(&self, types: &str, handler: &Handler<H>) -> Result<&Self> {
		self.on_with(types, &Binding::default(), handler)
	}

	/// # Errors
	///
	/// Iff the host fails to install a native listener.
	pub fn on_delegate(&self, types: &str, selector: &str, handler: &Handler<H>) -> Result<&Self> {
		self.on_with(types, &Binding::new().selector(selector), handler)
	}

	/// # Errors
	///
	/// Iff the host fails to install a native listener.
	pub fn on_with(&self, types: &str, binding: &Binding, handler: &Handler<H>) -> Result<&Self> {
		for node in &self.nodes {
			self.events.on_with(node, types, binding.clone(), handler.clone())?;
		}
		Ok(self)
	}

	/// Each node's binding removes itself independently.
	///
	/// # Errors
	///
	/// Iff the host fails to install a native listener.
	pub fn one(&self, types: &str, handler: &Handler<H>) -> Result<&Self> {
		for node in &self.nodes {
			self.events.one(node, types, handler.clone())?;
		}
		Ok(self)
	}

	pub fn off(&self, types: &str) -> &Self {
		for node in &self.nodes {
			self.events.off(node, types);
		}
		self
	}

	pub fn off_handler(&self, handler: &Handler<H>) -> &Self {
		for node in &self.nodes {
			self.events.off_handler(node, handler);
		}
		self
	}

	pub fn off_types_handler(&self, types: &str, handler: &Handler<H>) -> &Self {
		for node in &self.nodes {
			self.events.off_types_handler(node, types, handler);
		}
		self
	}

	pub fn off_all(&self) -> &Self {
		for node in &self.nodes {
			self.events.off_all(node);
		}
		self
	}

	/// Triggers on the first node only, returning it on success.
	#[must_use]
	pub fn trigger(&self, types: &str) -> Option<H::Node> {
		self.trigger_with(types, &[])
	}

	#[must_use]
	pub fn trigger_with(&self, types: &str, args: &[Arg]) -> Option<H::Node> {
		let first = self.nodes.first()?;
		if self.events.trigger_with(first, types, args) {
			Some(first.clone())
		} else {
			None
		}
	}
}
