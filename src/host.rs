//! The seam between the event subsystem and an actual DOM.

use crate::{identity::ElementId, Result};
use core::fmt::Debug;
use std::rc::Rc;

/// What kind of DOM node a [`Host::Node`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Element,
	Text,
	Comment,
	Document,
	Other,
}
impl NodeKind {
	/// Text and comment nodes can't carry event bindings.
	#[must_use]
	pub fn accepts_bindings(self) -> bool {
		!matches!(self, Self::Text | Self::Comment)
	}
}

/// The single callback a [`Host`] calls for each native firing of an installed listener.
pub type NativeCallback<E> = Rc<dyn Fn(E)>;

/// A DOM implementation events can be bound on.
///
/// All methods take `&self`. Implementations must not hold internal borrows while calling a [`NativeCallback`],
/// since callbacks re-enter the host (parent walks, selector queries, further dispatches).
pub trait Host: 'static {
	type Node: Clone + PartialEq + Debug + 'static;
	type Event: NativeEvent<Node = Self::Node> + 'static;
	/// Handle of an installed native listener, required to remove it again.
	type Listener: 'static;

	fn node_kind(&self, node: &Self::Node) -> NodeKind;
	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;

	/// Live evaluation of `selector` against the descendants of `root`.
	///
	/// # Errors
	///
	/// Iff the selector can't be parsed.
	fn query_selector_all(&self, root: &Self::Node, selector: &str) -> Result<Vec<Self::Node>>;

	fn is_disabled(&self, node: &Self::Node) -> bool;

	/// Identity slot weakly associated with `node`.
	fn cached_identity(&self, node: &Self::Node) -> Option<ElementId>;
	fn cache_identity(&self, node: &Self::Node, id: ElementId);

	/// # Errors
	///
	/// Iff the underlying DOM throws.
	fn add_listener(&self, node: &Self::Node, native_type: &str, callback: NativeCallback<Self::Event>) -> Result<Self::Listener>;

	/// # Errors
	///
	/// Iff the underlying DOM throws.
	fn remove_listener(&self, node: &Self::Node, native_type: &str, listener: Self::Listener) -> Result<()>;

	/// Fires a bubbling, cancelable native event of `event_type` at `node`.
	///
	/// Returns `false` iff the default action was prevented.
	///
	/// # Errors
	///
	/// Iff the event can't be created or dispatched.
	fn dispatch_synthetic(&self, node: &Self::Node, event_type: &str) -> Result<bool>;

	fn user_agent(&self) -> String;

	/// Horizontal and vertical document scroll, added to client coordinates of mouse events that lack page coordinates.
	fn scroll_offset(&self) -> (f64, f64) {
		(0.0, 0.0)
	}

	/// Whether `ancestor` is `node` or one of its ancestors.
	fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
		let mut current = Some(node.clone());
		while let Some(node) = current {
			if &node == ancestor {
				return true;
			}
			current = self.parent_node(&node);
		}
		false
	}
}

/// Read access and control of a native event as delivered by a [`Host`].
pub trait NativeEvent: Clone + Debug {
	type Node;

	fn event_type(&self) -> String;
	fn target(&self) -> Option<Self::Node>;
	fn related_target(&self) -> Option<Self::Node>;

	fn number(&self, property: &str) -> Option<f64>;
	fn flag(&self, property: &str) -> Option<bool>;
	fn text(&self, property: &str) -> Option<String>;
	/// Length of a list-valued property, like `touches`.
	fn count(&self, property: &str) -> Option<u32>;

	fn prevent_default(&self);
	fn stop_propagation(&self);
	fn stop_immediate_propagation(&self);
}
