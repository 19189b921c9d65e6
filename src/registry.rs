use crate::{
	entry::{Handler, HandlerEntry},
	host::Host,
	identity::ElementId,
};
use core::fmt;
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::trace;

/// Element filter of [`Registry::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
	Element(ElementId),
	/// Every element.
	All,
}
impl From<ElementId> for Scope {
	fn from(id: ElementId) -> Self {
		Self::Element(id)
	}
}

type List<H> = Vec<Rc<HandlerEntry<H>>>;

/// Ordered handler lists keyed by (root flag, native event type).
///
/// Insertion order is dispatch order. Removal splices, so survivors keep their relative order.
pub struct Registry<H: Host> {
	element_lists: HashMap<String, List<H>>,
	root_lists: HashMap<String, List<H>>,
}
impl<H: Host> Default for Registry<H> {
	fn default() -> Self {
		Self::new()
	}
}
impl<H: Host> Registry<H> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			element_lists: HashMap::new(),
			root_lists: HashMap::new(),
		}
	}

	fn lists(&self, root: bool) -> &HashMap<String, List<H>> {
		if root {
			&self.root_lists
		} else {
			&self.element_lists
		}
	}

	fn lists_mut(&mut self, root: bool) -> &mut HashMap<String, List<H>> {
		if root {
			&mut self.root_lists
		} else {
			&mut self.element_lists
		}
	}

	/// Appends `entry` to its list.
	///
	/// Returns `true` iff this is the first live non-root entry for the entry's (element, type),
	/// which means the caller has to install the native listener.
	pub fn put(&mut self, entry: Rc<HandlerEntry<H>>) -> bool {
		let first = !entry.root && !self.has(entry.element_id, &entry.event_type, None, false);
		trace!(element = %entry.element_id, event_type = %entry.event_type, root = entry.root, first, "Registry put.");
		self.lists_mut(entry.root).entry(entry.event_type.clone()).or_default().push(entry);
		first
	}

	/// Entries for `scope`, across all types if `event_type` is `None`, optionally only those bound with `original`.
	///
	/// The result is a snapshot: later mutation of the registry doesn't affect it, but tombstones set on its entries are visible.
	#[must_use]
	pub fn get(&self, scope: impl Into<Scope>, event_type: Option<&str>, original: Option<&Handler<H>>, root: bool) -> Vec<Rc<HandlerEntry<H>>> {
		let scope = scope.into();
		let lists = self.lists(root);
		let select = |entry: &&Rc<HandlerEntry<H>>| match scope {
			Scope::All => original.map_or(true, |original| entry.original.ptr_eq(original)),
			Scope::Element(id) => entry.matches(id, original),
		};
		match event_type {
			Some(event_type) => lists.get(event_type).into_iter().flatten().filter(select).cloned().collect(),
			None => lists.values().flatten().filter(select).cloned().collect(),
		}
	}

	/// Whether a live entry exists for (element, type), optionally bound with `original`.
	#[must_use]
	pub fn has(&self, element_id: ElementId, event_type: &str, original: Option<&Handler<H>>, root: bool) -> bool {
		self.lists(root)
			.get(event_type)
			.map_or(false, |list| list.iter().any(|entry| !entry.is_removed() && entry.matches(element_id, original)))
	}

	/// Splices `entry` out of its list and tombstones it. Drops the list once it's empty.
	///
	/// Returns whether the entry was found. Removing an absent entry is a no-op.
	pub fn remove(&mut self, entry: &Rc<HandlerEntry<H>>) -> bool {
		entry.mark_removed();
		let lists = self.lists_mut(entry.root);
		let list = match lists.get_mut(entry.event_type.as_str()) {
			Some(list) => list,
			None => return false,
		};
		let index = match list.iter().position(|listed| Rc::ptr_eq(listed, entry)) {
			Some(index) => index,
			None => return false,
		};
		list.remove(index);
		if list.is_empty() {
			lists.remove(entry.event_type.as_str());
		}
		trace!(element = %entry.element_id, event_type = %entry.event_type, "Registry remove.");
		true
	}

	/// Tombstones and returns every entry.
	pub fn drain(&mut self) -> Vec<Rc<HandlerEntry<H>>> {
		let drained: Vec<_> = self.element_lists.drain().chain(self.root_lists.drain()).flat_map(|(_, list)| list).collect();
		for entry in &drained {
			entry.mark_removed();
		}
		drained
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.element_lists.values().chain(self.root_lists.values()).map(Vec::len).sum()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.element_lists.is_empty() && self.root_lists.is_empty()
	}

	/// Number of distinct native types with at least one entry.
	#[must_use]
	pub fn type_count(&self, root: bool) -> usize {
		self.lists(root).len()
	}
}
impl<H: Host> fmt::Debug for Registry<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry")
			.field("element_lists", &self.element_lists)
			.field("root_lists", &self.root_lists)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		identity::IdentityMap,
		memory::{MemoryDom, NodeRef},
	};

	fn entry(element: &NodeRef, id: ElementId, event_type: &str, handler: &Handler<MemoryDom>) -> Rc<HandlerEntry<MemoryDom>> {
		Rc::new(HandlerEntry::new(element.clone(), id, event_type, handler.clone()))
	}

	fn setup() -> (MemoryDom, NodeRef, ElementId, NodeRef, ElementId) {
		let dom = MemoryDom::new();
		let ids = IdentityMap::new();
		let a = dom.create_element("div");
		let b = dom.create_element("div");
		let a_id = ids.identity_of(&dom, &a);
		let b_id = ids.identity_of(&dom, &b);
		(dom, a, a_id, b, b_id)
	}

	#[test]
	fn put_reports_first_per_element_and_type() {
		let (_dom, a, a_id, b, b_id) = setup();
		let handler = Handler::new(|_, _| ());
		let mut registry = Registry::new();

		assert!(registry.put(entry(&a, a_id, "click", &handler)));
		assert!(!registry.put(entry(&a, a_id, "click", &handler)));
		assert!(registry.put(entry(&b, b_id, "click", &handler)));
		assert!(registry.put(entry(&a, a_id, "keyup", &handler)));
	}

	#[test]
	fn root_entries_never_report_first() {
		let (_dom, a, a_id, ..) = setup();
		let handler = Handler::new(|_, _| ());
		let mut registry = Registry::new();

		assert!(!registry.put(Rc::new(HandlerEntry::new(a.clone(), a_id, "click", handler.clone()).with_root(true))));
		assert!(registry.get(a_id, Some("click"), None, false).is_empty());
		assert_eq!(registry.get(a_id, Some("click"), None, true).len(), 1);
		assert!(registry.put(entry(&a, a_id, "click", &handler)));
	}

	#[test]
	fn get_filters_by_element_type_and_handler() {
		let (_dom, a, a_id, b, b_id) = setup();
		let first = Handler::new(|_, _| ());
		let second = Handler::new(|_, _| ());
		let mut registry = Registry::new();
		registry.put(entry(&a, a_id, "click", &first));
		registry.put(entry(&a, a_id, "click", &second));
		registry.put(entry(&a, a_id, "keyup", &first));
		registry.put(entry(&b, b_id, "click", &first));

		assert_eq!(registry.get(a_id, Some("click"), None, false).len(), 2);
		assert_eq!(registry.get(a_id, Some("click"), Some(&second), false).len(), 1);
		assert_eq!(registry.get(a_id, None, Some(&first), false).len(), 2);
		assert_eq!(registry.get(Scope::All, Some("click"), None, false).len(), 3);
		assert_eq!(registry.get(Scope::All, None, None, false).len(), 4);
		assert!(registry.has(b_id, "click", Some(&first), false));
		assert!(!registry.has(b_id, "click", Some(&second), false));
	}

	#[test]
	fn get_keeps_insertion_order() {
		let (_dom, a, a_id, ..) = setup();
		let handlers: Vec<_> = (0..3).map(|_| Handler::new(|_, _| ())).collect();
		let mut registry = Registry::new();
		for handler in &handlers {
			registry.put(entry(&a, a_id, "click", handler));
		}
		let middle = registry.get(a_id, Some("click"), Some(&handlers[1]), false).remove(0);
		registry.remove(&middle);

		let listed: Vec<_> = registry.get(a_id, Some("click"), None, false).into_iter().map(|entry| entry.original.clone()).collect();
		assert_eq!(listed, [handlers[0].clone(), handlers[2].clone()]);
	}

	#[test]
	fn remove_tombstones_and_drops_empty_lists() {
		let (_dom, a, a_id, ..) = setup();
		let handler = Handler::new(|_, _| ());
		let mut registry = Registry::new();
		let click = entry(&a, a_id, "click", &handler);
		registry.put(Rc::clone(&click));
		assert_eq!(registry.type_count(false), 1);

		assert!(registry.remove(&click));
		assert!(click.is_removed());
		assert!(registry.is_empty());
		assert!(!registry.has(a_id, "click", None, false));

		assert!(!registry.remove(&click));
	}

	#[test]
	fn snapshot_sees_tombstones() {
		let (_dom, a, a_id, ..) = setup();
		let handler = Handler::new(|_, _| ());
		let mut registry = Registry::new();
		registry.put(entry(&a, a_id, "click", &handler));
		registry.put(entry(&a, a_id, "click", &handler));

		let snapshot = registry.get(a_id, Some("click"), None, false);
		registry.remove(&snapshot[0]);

		assert_eq!(snapshot.len(), 2);
		assert!(snapshot[0].is_removed());
		assert!(!snapshot[1].is_removed());
		assert_eq!(registry.len(), 1);
	}
}
