use crate::{event::Event, host::Host, identity::ElementId, Events};
use core::{any::Any, cell::Cell, fmt};
use std::rc::Rc;

/// An extra argument bound at subscription or passed through [`Events::trigger_with`].
pub type Arg = Rc<dyn Any>;

/// A user callback.
///
/// Clones share identity: pass a clone of the `Handler` that was bound to [`Events::off_handler`] to remove it again.
/// Inside the call, [`Event::current_target`] is the element the handler runs for (the matched descendant for delegated bindings).
pub struct Handler<H: Host>(Rc<dyn Fn(&mut Event<H>, &[Arg])>);
impl<H: Host> Handler<H> {
	pub fn new(callback: impl Fn(&mut Event<H>, &[Arg]) + 'static) -> Self {
		Self(Rc::new(callback))
	}

	pub fn call(&self, event: &mut Event<H>, args: &[Arg]) {
		(self.0)(event, args)
	}

	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl<H: Host> Clone for Handler<H> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}
impl<H: Host> PartialEq for Handler<H> {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}
impl<H: Host> Eq for Handler<H> {}
impl<H: Host> fmt::Debug for Handler<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Handler").field(&Rc::as_ptr(&self.0).cast::<()>()).finish()
	}
}

/// The wrapped callback the dispatch facade actually invokes.
///
/// Receives the runtime arguments (from [`Events::trigger_with`]); bound arguments are appended by the wrapper itself.
pub(crate) type Dispatch<H> = Rc<dyn Fn(&Events<H>, &mut Event<H>, &[Arg])>;

/// One subscription record.
pub struct HandlerEntry<H: Host> {
	pub(crate) element: H::Node,
	pub(crate) element_id: ElementId,
	/// Native type, after custom event translation. This is the registry key.
	pub(crate) event_type: String,
	/// Type as subscribed, e.g. `mouseenter`.
	pub(crate) requested_type: String,
	pub(crate) namespaces: Vec<String>,
	pub(crate) original: Handler<H>,
	pub(crate) selector: Option<String>,
	pub(crate) args: Vec<Arg>,
	pub(crate) root: bool,
	pub(crate) dispatch: Dispatch<H>,
	removed: Cell<bool>,
}
impl<H: Host> HandlerEntry<H> {
	/// An entry that calls `original` directly, without delegation, condition or bound arguments.
	pub fn new(element: H::Node, element_id: ElementId, event_type: impl Into<String>, original: Handler<H>) -> Self {
		let event_type = event_type.into();
		let dispatch: Dispatch<H> = {
			let original = original.clone();
			Rc::new(move |_: &Events<H>, event: &mut Event<H>, args: &[Arg]| original.call(event, args))
		};
		Self {
			element,
			element_id,
			requested_type: event_type.clone(),
			event_type,
			namespaces: Vec::new(),
			original,
			selector: None,
			args: Vec::new(),
			root: false,
			dispatch,
			removed: Cell::new(false),
		}
	}

	#[must_use]
	pub fn with_namespaces(mut self, namespaces: Vec<String>) -> Self {
		self.namespaces = namespaces;
		self
	}

	#[must_use]
	pub fn with_root(mut self, root: bool) -> Self {
		self.root = root;
		self
	}

	#[must_use]
	pub(crate) fn with_requested_type(mut self, requested_type: impl Into<String>) -> Self {
		self.requested_type = requested_type.into();
		self
	}

	#[must_use]
	pub(crate) fn with_dispatch(mut self, selector: Option<String>, args: Vec<Arg>, dispatch: Dispatch<H>) -> Self {
		self.selector = selector;
		self.args = args;
		self.dispatch = dispatch;
		self
	}

	#[must_use]
	pub fn element(&self) -> &H::Node {
		&self.element
	}

	#[must_use]
	pub fn element_id(&self) -> ElementId {
		self.element_id
	}

	#[must_use]
	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	#[must_use]
	pub fn requested_type(&self) -> &str {
		&self.requested_type
	}

	#[must_use]
	pub fn namespaces(&self) -> &[String] {
		&self.namespaces
	}

	#[must_use]
	pub fn original(&self) -> &Handler<H> {
		&self.original
	}

	#[must_use]
	pub fn selector(&self) -> Option<&str> {
		self.selector.as_deref()
	}

	#[must_use]
	pub fn args(&self) -> &[Arg] {
		&self.args
	}

	#[must_use]
	pub fn is_root(&self) -> bool {
		self.root
	}

	/// Tombstone flag, checked by in-flight dispatches.
	#[must_use]
	pub fn is_removed(&self) -> bool {
		self.removed.get()
	}

	pub(crate) fn mark_removed(&self) {
		self.removed.set(true)
	}

	/// Whether this entry carries **all** of `check`. Extra namespaces on the entry are fine.
	#[must_use]
	pub fn in_namespaces<S: AsRef<str>>(&self, check: &[S]) -> bool {
		check.iter().all(|wanted| self.namespaces.iter().any(|namespace| namespace == wanted.as_ref()))
	}

	/// Matches by element identity and, optionally, by original handler.
	#[must_use]
	pub fn matches(&self, element_id: ElementId, original: Option<&Handler<H>>) -> bool {
		self.element_id == element_id && original.map_or(true, |original| self.original.ptr_eq(original))
	}
}
impl<H: Host> fmt::Debug for HandlerEntry<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HandlerEntry")
			.field("element_id", &self.element_id)
			.field("event_type", &self.event_type)
			.field("requested_type", &self.requested_type)
			.field("namespaces", &self.namespaces)
			.field("original", &self.original)
			.field("selector", &self.selector)
			.field("args", &self.args.len())
			.field("root", &self.root)
			.field("removed", &self.removed.get())
			.finish()
	}
}
