//! A headless, single-threaded DOM implementing [`Host`].
//!
//! Nodes live in an arena owned by [`MemoryDom`] and are addressed by copyable [`NodeRef`]s.
//! Dispatch follows the bubbling half of the W3C algorithm: target first, then ancestors up to the document.

use crate::{
	host::{Host, NativeCallback, NativeEvent, NodeKind},
	identity::ElementId,
	selector::{Atom, DomSelectors, PseudoClass, PseudoElement, SelectorList},
	Error, Result,
};
use core::{
	cell::{Cell, RefCell},
	fmt,
};
use hashbrown::HashMap;
use selectors::{
	attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint},
	matching::{ElementSelectorFlags, MatchingContext},
	OpaqueElement,
};
use std::rc::Rc;
use tracing::trace;

/// Handle of a node in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(usize);

/// Handle of a listener installed on a [`MemoryDom`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryListener(u64);

struct InstalledListener {
	event_type: String,
	id: u64,
	callback: NativeCallback<MemoryEvent>,
}
impl fmt::Debug for InstalledListener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InstalledListener").field("event_type", &self.event_type).field("id", &self.id).finish()
	}
}

#[derive(Debug)]
struct NodeData {
	kind: NodeKind,
	/// Lowercase tag name for elements, character data for text and comments.
	name: String,
	attributes: Vec<(String, String)>,
	parent: Option<NodeRef>,
	children: Vec<NodeRef>,
	identity: Option<ElementId>,
	listeners: Vec<InstalledListener>,
}
impl NodeData {
	fn new(kind: NodeKind, name: String) -> Self {
		Self {
			kind,
			name,
			attributes: Vec::new(),
			parent: None,
			children: Vec::new(),
			identity: None,
			listeners: Vec::new(),
		}
	}

	fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|(n, _)| n == name).map(|(_, value)| value.as_str())
	}
}

/// A view of one node of the arena, for selector matching.
#[derive(Clone, Copy)]
struct ArenaElement<'a> {
	nodes: &'a [NodeData],
	node: NodeRef,
}
impl fmt::Debug for ArenaElement<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ArenaElement").field(&self.node).finish()
	}
}
impl<'a> ArenaElement<'a> {
	fn data(&self) -> &'a NodeData {
		&self.nodes[self.node.0]
	}

	fn at(&self, node: NodeRef) -> Self {
		Self { nodes: self.nodes, node }
	}

	fn is_element(&self) -> bool {
		self.data().kind == NodeKind::Element
	}

	fn sibling_elements(&self) -> impl Iterator<Item = NodeRef> + 'a {
		let nodes = self.nodes;
		self.data()
			.parent
			.map(|parent| nodes[parent.0].children.as_slice())
			.unwrap_or_default()
			.iter()
			.copied()
			.filter(move |sibling| nodes[sibling.0].kind == NodeKind::Element)
	}
}
impl selectors::Element for ArenaElement<'_> {
	type Impl = DomSelectors;

	fn opaque(&self) -> OpaqueElement {
		OpaqueElement::new(self.data())
	}

	fn parent_element(&self) -> Option<Self> {
		self.data().parent.map(|parent| self.at(parent)).filter(Self::is_element)
	}

	fn parent_node_is_shadow_root(&self) -> bool {
		false
	}

	fn containing_shadow_host(&self) -> Option<Self> {
		None
	}

	fn is_pseudo_element(&self) -> bool {
		false
	}

	fn prev_sibling_element(&self) -> Option<Self> {
		let node = self.node;
		self.sibling_elements().take_while(|&sibling| sibling != node).last().map(|sibling| self.at(sibling))
	}

	fn next_sibling_element(&self) -> Option<Self> {
		let node = self.node;
		self.sibling_elements().skip_while(|&sibling| sibling != node).nth(1).map(|sibling| self.at(sibling))
	}

	fn first_element_child(&self) -> Option<Self> {
		self.data().children.iter().map(|&child| self.at(child)).find(Self::is_element)
	}

	fn is_html_element_in_html_document(&self) -> bool {
		true
	}

	fn has_local_name(&self, local_name: &str) -> bool {
		self.is_element() && self.data().name == local_name
	}

	fn has_namespace(&self, _: &()) -> bool {
		true
	}

	fn is_same_type(&self, other: &Self) -> bool {
		self.data().name == other.data().name
	}

	fn attr_matches(&self, _: &NamespaceConstraint<&()>, local_name: &Atom, operation: &AttrSelectorOperation<&Atom>) -> bool {
		self.data().attribute(&local_name.0).map_or(false, |value| operation.eval_str(value))
	}

	fn match_non_ts_pseudo_class(&self, pseudo_class: &PseudoClass, _: &mut MatchingContext<'_, DomSelectors>) -> bool {
		match *pseudo_class {}
	}

	fn match_pseudo_element(&self, pseudo_element: &PseudoElement, _: &mut MatchingContext<'_, DomSelectors>) -> bool {
		match *pseudo_element {}
	}

	fn apply_selector_flags(&self, _: ElementSelectorFlags) {}

	fn is_link(&self) -> bool {
		matches!(self.data().name.as_str(), "a" | "area") && self.data().attribute("href").is_some()
	}

	fn is_html_slot_element(&self) -> bool {
		self.data().name == "slot"
	}

	fn has_id(&self, id: &Atom, case_sensitivity: CaseSensitivity) -> bool {
		self.data()
			.attribute("id")
			.map_or(false, |value| case_sensitivity.eq(value.as_bytes(), id.0.as_bytes()))
	}

	fn has_class(&self, name: &Atom, case_sensitivity: CaseSensitivity) -> bool {
		self.data().attribute("class").map_or(false, |classes| {
			classes
				.split_whitespace()
				.any(|class| case_sensitivity.eq(class.as_bytes(), name.0.as_bytes()))
		})
	}

	fn imported_part(&self, _: &Atom) -> Option<Atom> {
		None
	}

	fn is_part(&self, _: &Atom) -> bool {
		false
	}

	fn is_empty(&self) -> bool {
		self.data().children.iter().all(|child| {
			let child = &self.nodes[child.0];
			match child.kind {
				NodeKind::Element => false,
				NodeKind::Text => child.name.is_empty(),
				_ => true,
			}
		})
	}

	fn is_root(&self) -> bool {
		self.data().parent.map_or(false, |parent| self.nodes[parent.0].kind == NodeKind::Document)
	}
}

#[derive(Debug)]
pub struct MemoryDom {
	nodes: RefCell<Vec<NodeData>>,
	user_agent: String,
	scroll: Cell<(f64, f64)>,
	next_listener: Cell<u64>,
}
impl Default for MemoryDom {
	fn default() -> Self {
		Self::new()
	}
}
impl MemoryDom {
	/// A DOM containing only its document node.
	#[must_use]
	pub fn new() -> Self {
		Self::with_user_agent(concat!("delegate-dom/", env!("CARGO_PKG_VERSION")))
	}

	#[must_use]
	pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
		Self {
			nodes: RefCell::new(vec![NodeData::new(NodeKind::Document, "#document".to_owned())]),
			user_agent: user_agent.into(),
			scroll: Cell::new((0.0, 0.0)),
			next_listener: Cell::new(0),
		}
	}

	#[must_use]
	pub fn document(&self) -> NodeRef {
		NodeRef(0)
	}

	fn create(&self, kind: NodeKind, name: String) -> NodeRef {
		let mut nodes = self.nodes.borrow_mut();
		nodes.push(NodeData::new(kind, name));
		NodeRef(nodes.len() - 1)
	}

	/// A detached element.
	pub fn create_element(&self, tag_name: &str) -> NodeRef {
		self.create(NodeKind::Element, tag_name.to_ascii_lowercase())
	}

	pub fn create_text(&self, data: &str) -> NodeRef {
		self.create(NodeKind::Text, data.to_owned())
	}

	pub fn create_comment(&self, data: &str) -> NodeRef {
		self.create(NodeKind::Comment, data.to_owned())
	}

	/// Moves `child` to the end of `parent`'s children.
	///
	/// # Panics
	///
	/// Iff `child` is `parent` or one of its ancestors.
	pub fn append_child(&self, parent: NodeRef, child: NodeRef) {
		assert!(!self.contains(&child, &parent), "Can't append {:?} to its own descendant {:?}.", child, parent);
		self.detach(child);
		let mut nodes = self.nodes.borrow_mut();
		nodes[parent.0].children.push(child);
		nodes[child.0].parent = Some(parent);
	}

	/// Removes `node` from its parent, if any. Listeners and identity stay with the node.
	pub fn detach(&self, node: NodeRef) {
		let mut nodes = self.nodes.borrow_mut();
		if let Some(parent) = nodes[node.0].parent.take() {
			nodes[parent.0].children.retain(|&child| child != node);
		}
	}

	#[must_use]
	pub fn children(&self, node: NodeRef) -> Vec<NodeRef> {
		self.nodes.borrow()[node.0].children.clone()
	}

	#[must_use]
	pub fn tag_name(&self, node: NodeRef) -> Option<String> {
		let nodes = self.nodes.borrow();
		let data = &nodes[node.0];
		match data.kind {
			NodeKind::Element => Some(data.name.clone()),
			_ => None,
		}
	}

	#[must_use]
	pub fn attribute(&self, node: NodeRef, name: &str) -> Option<String> {
		self.nodes.borrow()[node.0].attribute(name).map(ToOwned::to_owned)
	}

	pub fn set_attribute(&self, node: NodeRef, name: &str, value: &str) {
		let mut nodes = self.nodes.borrow_mut();
		let attributes = &mut nodes[node.0].attributes;
		match attributes.iter_mut().find(|(n, _)| n == name) {
			Some((_, existing)) => *existing = value.to_owned(),
			None => attributes.push((name.to_owned(), value.to_owned())),
		}
	}

	pub fn remove_attribute(&self, node: NodeRef, name: &str) {
		self.nodes.borrow_mut()[node.0].attributes.retain(|(n, _)| n != name);
	}

	pub fn set_id(&self, node: NodeRef, id: &str) {
		self.set_attribute(node, "id", id);
	}

	pub fn add_class(&self, node: NodeRef, class: &str) {
		let classes = self.attribute(node, "class").unwrap_or_default();
		if !classes.split_whitespace().any(|existing| existing == class) {
			let classes = if classes.is_empty() { class.to_owned() } else { format!("{} {}", classes, class) };
			self.set_attribute(node, "class", &classes);
		}
	}

	pub fn set_disabled(&self, node: NodeRef, disabled: bool) {
		if disabled {
			self.set_attribute(node, "disabled", "");
		} else {
			self.remove_attribute(node, "disabled");
		}
	}

	pub fn set_scroll_offset(&self, x: f64, y: f64) {
		self.scroll.set((x, y));
	}

	/// Number of native listeners for `event_type` installed on `node`.
	#[must_use]
	pub fn listener_count(&self, node: NodeRef, event_type: &str) -> usize {
		self.nodes.borrow()[node.0].listeners.iter().filter(|listener| listener.event_type == event_type).count()
	}

	/// Number of native listeners installed anywhere.
	#[must_use]
	pub fn total_listener_count(&self) -> usize {
		self.nodes.borrow().iter().map(|node| node.listeners.len()).sum()
	}

	fn inclusive_ancestors(&self, node: NodeRef) -> Vec<NodeRef> {
		let nodes = self.nodes.borrow();
		let mut path = vec![node];
		let mut current = nodes[node.0].parent;
		while let Some(parent) = current {
			path.push(parent);
			current = nodes[parent.0].parent;
		}
		path
	}

	fn is_installed(&self, node: NodeRef, id: u64) -> bool {
		self.nodes.borrow()[node.0].listeners.iter().any(|listener| listener.id == id)
	}

	/// Dispatches `event` at `target`, bubbling through its ancestors if the event bubbles.
	///
	/// Listeners removed during the dispatch aren't called anymore.
	/// Returns `false` iff the default action was prevented.
	pub fn dispatch(&self, target: NodeRef, event: &MemoryEvent) -> bool {
		event.0.target.set(Some(target));
		let path = if event.0.bubbles { self.inclusive_ancestors(target) } else { vec![target] };
		trace!(event_type = %event.0.event_type, path_len = path.len(), "MemoryDom dispatch.");
		for node in path {
			let listeners: Vec<(u64, NativeCallback<MemoryEvent>)> = self.nodes.borrow()[node.0]
				.listeners
				.iter()
				.filter(|listener| listener.event_type == event.0.event_type)
				.map(|listener| (listener.id, Rc::clone(&listener.callback)))
				.collect();
			for (id, callback) in listeners {
				if event.0.immediate_propagation_stopped.get() {
					break;
				}
				if self.is_installed(node, id) {
					callback(event.clone());
				}
			}
			if event.0.propagation_stopped.get() {
				break;
			}
		}
		!event.0.default_prevented.get()
	}

	/// Dispatches a plain bubbling `click`.
	pub fn click(&self, target: NodeRef) -> bool {
		self.dispatch(target, &MemoryEvent::new("click"))
	}
}
impl Host for MemoryDom {
	type Node = NodeRef;
	type Event = MemoryEvent;
	type Listener = MemoryListener;

	fn node_kind(&self, node: &NodeRef) -> NodeKind {
		self.nodes.borrow()[node.0].kind
	}

	fn parent_node(&self, node: &NodeRef) -> Option<NodeRef> {
		self.nodes.borrow()[node.0].parent
	}

	fn query_selector_all(&self, root: &NodeRef, selector: &str) -> Result<Vec<NodeRef>> {
		let selector = SelectorList::parse(selector)?;
		let nodes = self.nodes.borrow();
		let mut matches = Vec::new();
		let mut stack: Vec<NodeRef> = nodes[root.0].children.iter().rev().copied().collect();
		while let Some(node) = stack.pop() {
			let element = ArenaElement { nodes: &nodes, node };
			if element.is_element() && selector.matches(&element) {
				matches.push(node);
			}
			stack.extend(nodes[node.0].children.iter().rev().copied());
		}
		Ok(matches)
	}

	fn is_disabled(&self, node: &NodeRef) -> bool {
		self.nodes.borrow()[node.0].attribute("disabled").is_some()
	}

	fn cached_identity(&self, node: &NodeRef) -> Option<ElementId> {
		self.nodes.borrow()[node.0].identity
	}

	fn cache_identity(&self, node: &NodeRef, id: ElementId) {
		self.nodes.borrow_mut()[node.0].identity = Some(id);
	}

	fn add_listener(&self, node: &NodeRef, native_type: &str, callback: NativeCallback<MemoryEvent>) -> Result<MemoryListener> {
		let id = self.next_listener.get();
		self.next_listener.set(id + 1);
		self.nodes.borrow_mut()[node.0].listeners.push(InstalledListener {
			event_type: native_type.to_owned(),
			id,
			callback,
		});
		Ok(MemoryListener(id))
	}

	fn remove_listener(&self, node: &NodeRef, native_type: &str, listener: MemoryListener) -> Result<()> {
		let mut nodes = self.nodes.borrow_mut();
		let listeners = &mut nodes[node.0].listeners;
		match listeners.iter().position(|installed| installed.id == listener.0 && installed.event_type == native_type) {
			Some(index) => {
				listeners.remove(index);
				Ok(())
			}
			None => Err(Error::Host(format!("listener {:?} for {:?} is not installed", listener, native_type))),
		}
	}

	fn dispatch_synthetic(&self, node: &NodeRef, event_type: &str) -> Result<bool> {
		Ok(self.dispatch(*node, &MemoryEvent::new(event_type)))
	}

	fn user_agent(&self) -> String {
		self.user_agent.clone()
	}

	fn scroll_offset(&self) -> (f64, f64) {
		self.scroll.get()
	}
}

/// A property value of a [`MemoryEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
	Number(f64),
	Flag(bool),
	Text(String),
	/// Length of a list-valued property.
	List(u32),
}

#[derive(Debug, Clone)]
struct EventState {
	event_type: String,
	bubbles: bool,
	target: Cell<Option<NodeRef>>,
	related_target: Option<NodeRef>,
	properties: HashMap<String, Property>,
	default_prevented: Cell<bool>,
	propagation_stopped: Cell<bool>,
	immediate_propagation_stopped: Cell<bool>,
}

/// The native event type of [`MemoryDom`]. Clones share state.
#[derive(Debug, Clone)]
pub struct MemoryEvent(Rc<EventState>);
impl MemoryEvent {
	/// A bubbling, cancelable event.
	#[must_use]
	pub fn new(event_type: &str) -> Self {
		let mut properties = HashMap::new();
		properties.insert("bubbles".to_owned(), Property::Flag(true));
		properties.insert("cancelable".to_owned(), Property::Flag(true));
		Self(Rc::new(EventState {
			event_type: event_type.to_owned(),
			bubbles: true,
			target: Cell::new(None),
			related_target: None,
			properties,
			default_prevented: Cell::new(false),
			propagation_stopped: Cell::new(false),
			immediate_propagation_stopped: Cell::new(false),
		}))
	}

	#[must_use]
	pub fn non_bubbling(mut self) -> Self {
		let state = Rc::make_mut(&mut self.0);
		state.bubbles = false;
		state.properties.insert("bubbles".to_owned(), Property::Flag(false));
		self
	}

	#[must_use]
	pub fn with_related_target(mut self, related_target: NodeRef) -> Self {
		Rc::make_mut(&mut self.0).related_target = Some(related_target);
		self
	}

	#[must_use]
	pub fn with_property(mut self, name: &str, value: Property) -> Self {
		Rc::make_mut(&mut self.0).properties.insert(name.to_owned(), value);
		self
	}

	#[must_use]
	pub fn with_number(self, name: &str, value: f64) -> Self {
		self.with_property(name, Property::Number(value))
	}

	#[must_use]
	pub fn with_flag(self, name: &str, value: bool) -> Self {
		self.with_property(name, Property::Flag(value))
	}

	#[must_use]
	pub fn with_text(self, name: &str, value: &str) -> Self {
		self.with_property(name, Property::Text(value.to_owned()))
	}

	/// Set by [`MemoryDom::dispatch`].
	#[must_use]
	pub fn dispatched_target(&self) -> Option<NodeRef> {
		self.0.target.get()
	}

	#[must_use]
	pub fn is_default_prevented(&self) -> bool {
		self.0.default_prevented.get()
	}

	#[must_use]
	pub fn is_propagation_stopped(&self) -> bool {
		self.0.propagation_stopped.get()
	}

	#[must_use]
	pub fn is_immediate_propagation_stopped(&self) -> bool {
		self.0.immediate_propagation_stopped.get()
	}

	fn property(&self, name: &str) -> Option<&Property> {
		self.0.properties.get(name)
	}
}
impl NativeEvent for MemoryEvent {
	type Node = NodeRef;

	fn event_type(&self) -> String {
		self.0.event_type.clone()
	}

	fn target(&self) -> Option<NodeRef> {
		self.0.target.get()
	}

	fn related_target(&self) -> Option<NodeRef> {
		self.0.related_target
	}

	fn number(&self, property: &str) -> Option<f64> {
		match self.property(property)? {
			&Property::Number(number) => Some(number),
			_ => None,
		}
	}

	fn flag(&self, property: &str) -> Option<bool> {
		match self.property(property)? {
			&Property::Flag(flag) => Some(flag),
			_ => None,
		}
	}

	fn text(&self, property: &str) -> Option<String> {
		match self.property(property)? {
			Property::Text(text) => Some(text.clone()),
			_ => None,
		}
	}

	fn count(&self, property: &str) -> Option<u32> {
		match self.property(property)? {
			&Property::List(len) => Some(len),
			_ => None,
		}
	}

	fn prevent_default(&self) {
		if self.flag("cancelable").unwrap_or_default() {
			self.0.default_prevented.set(true);
		}
	}

	fn stop_propagation(&self) {
		self.0.propagation_stopped.set(true);
	}

	fn stop_immediate_propagation(&self) {
		self.0.propagation_stopped.set(true);
		self.0.immediate_propagation_stopped.set(true);
	}
}
