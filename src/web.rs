//! The browser [`Host`], over [`web_sys`].

use crate::{
	host::{Host, NativeCallback, NativeEvent, NodeKind},
	identity::ElementId,
	Error, Result,
};
use core::cell::{Cell, RefCell};
use js_sys::{Object, Reflect, WeakMap};
use std::rc::Rc;
use tracing::trace;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

/// A native listener installed by [`WebHost`].
pub struct WebListener(Closure<dyn Fn(web_sys::Event)>);
impl core::fmt::Debug for WebListener {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_tuple("WebListener").finish()
	}
}

fn js_error(error: &JsValue) -> Error {
	Error::Host(error.as_string().unwrap_or_else(|| format!("{:?}", error)))
}

/// The [`Host`] of a browser document.
///
/// Element identities are kept in a [`WeakMap`], so they are released together with their nodes.
///
/// A listener removed while any listener is running (for example by a one-shot handler) is only
/// dropped on the next listener change outside of dispatch, since its [`Closure`] may still be on the stack.
#[derive(Debug)]
pub struct WebHost {
	document: web_sys::Document,
	identities: WeakMap,
	depth: Rc<Cell<usize>>,
	graveyard: RefCell<Vec<WebListener>>,
}
impl WebHost {
	/// A host for the current window's document.
	///
	/// # Errors
	///
	/// Iff there is no window or it has no document.
	pub fn new() -> Result<Self> {
		let document = web_sys::window()
			.and_then(|window| window.document())
			.ok_or_else(|| Error::Host("no window document".to_owned()))?;
		Ok(Self::with_document(document))
	}

	#[must_use]
	pub fn with_document(document: web_sys::Document) -> Self {
		Self {
			document,
			identities: WeakMap::new(),
			depth: Rc::new(Cell::new(0)),
			graveyard: RefCell::new(Vec::new()),
		}
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	fn bury_or_drop(&self, listener: WebListener) {
		if self.depth.get() > 0 {
			self.graveyard.borrow_mut().push(listener);
		} else {
			drop(listener);
			self.graveyard.borrow_mut().clear();
		}
	}
}
impl Host for WebHost {
	type Node = web_sys::Node;
	type Event = web_sys::Event;
	type Listener = WebListener;

	fn node_kind(&self, node: &web_sys::Node) -> NodeKind {
		match node.node_type() {
			web_sys::Node::ELEMENT_NODE => NodeKind::Element,
			web_sys::Node::TEXT_NODE => NodeKind::Text,
			web_sys::Node::COMMENT_NODE => NodeKind::Comment,
			web_sys::Node::DOCUMENT_NODE => NodeKind::Document,
			_ => NodeKind::Other,
		}
	}

	fn parent_node(&self, node: &web_sys::Node) -> Option<web_sys::Node> {
		node.parent_node()
	}

	fn query_selector_all(&self, root: &web_sys::Node, selector: &str) -> Result<Vec<web_sys::Node>> {
		let list = if let Some(element) = root.dyn_ref::<web_sys::Element>() {
			element.query_selector_all(selector)
		} else if let Some(document) = root.dyn_ref::<web_sys::Document>() {
			document.query_selector_all(selector)
		} else {
			return Ok(Vec::new());
		};
		let list = list.map_err(|error| Error::Selector {
			selector: selector.to_owned(),
			message: js_error(&error).to_string(),
		})?;
		Ok((0..list.length()).filter_map(|i| list.item(i)).collect())
	}

	fn is_disabled(&self, node: &web_sys::Node) -> bool {
		Reflect::get(node, &JsValue::from_str("disabled")).ok().and_then(|disabled| disabled.as_bool()) == Some(true)
	}

	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn cached_identity(&self, node: &web_sys::Node) -> Option<ElementId> {
		self.identities.get(node.unchecked_ref::<Object>()).as_f64().map(|id| ElementId(id as u64))
	}

	#[allow(clippy::cast_precision_loss)]
	fn cache_identity(&self, node: &web_sys::Node, id: ElementId) {
		self.identities.set(node.unchecked_ref::<Object>(), &JsValue::from_f64(id.get() as f64));
	}

	fn add_listener(&self, node: &web_sys::Node, native_type: &str, callback: NativeCallback<web_sys::Event>) -> Result<WebListener> {
		let depth = Rc::clone(&self.depth);
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
			depth.set(depth.get() + 1);
			callback(event);
			depth.set(depth.get() - 1);
		}) as Box<dyn Fn(web_sys::Event)>);
		node.add_event_listener_with_callback(native_type, closure.as_ref().unchecked_ref())
			.map_err(|error| js_error(&error))?;
		trace!(event_type = native_type, "addEventListener");
		Ok(WebListener(closure))
	}

	fn remove_listener(&self, node: &web_sys::Node, native_type: &str, listener: WebListener) -> Result<()> {
		let result = node
			.remove_event_listener_with_callback(native_type, listener.0.as_ref().unchecked_ref())
			.map_err(|error| js_error(&error));
		trace!(event_type = native_type, "removeEventListener");
		self.bury_or_drop(listener);
		result
	}

	fn dispatch_synthetic(&self, node: &web_sys::Node, event_type: &str) -> Result<bool> {
		let mut init = web_sys::EventInit::new();
		init.bubbles(true).cancelable(true);
		let event = web_sys::Event::new_with_event_init_dict(event_type, &init).map_err(|error| js_error(&error))?;
		node.dispatch_event(&event).map_err(|error| js_error(&error))
	}

	fn user_agent(&self) -> String {
		web_sys::window().and_then(|window| window.navigator().user_agent().ok()).unwrap_or_default()
	}

	fn scroll_offset(&self) -> (f64, f64) {
		let scroll = |element: Option<web_sys::Element>| element.map_or((0, 0), |element| (element.scroll_left(), element.scroll_top()));
		let (body_x, body_y) = scroll(self.document.body().map(Into::into));
		let (root_x, root_y) = scroll(self.document.document_element());
		(f64::from(body_x + root_x), f64::from(body_y + root_y))
	}

	fn contains(&self, ancestor: &web_sys::Node, node: &web_sys::Node) -> bool {
		ancestor.contains(Some(node))
	}
}

fn property(event: &web_sys::Event, name: &str) -> Option<JsValue> {
	Reflect::get(event, &JsValue::from_str(name)).ok().filter(|value| !value.is_undefined() && !value.is_null())
}

impl NativeEvent for web_sys::Event {
	type Node = web_sys::Node;

	fn event_type(&self) -> String {
		self.type_()
	}

	fn target(&self) -> Option<web_sys::Node> {
		web_sys::Event::target(self).and_then(|target| target.dyn_into().ok())
	}

	fn related_target(&self) -> Option<web_sys::Node> {
		property(self, "relatedTarget").and_then(|target| target.dyn_into().ok())
	}

	fn number(&self, name: &str) -> Option<f64> {
		property(self, name)?.as_f64()
	}

	fn flag(&self, name: &str) -> Option<bool> {
		property(self, name)?.as_bool()
	}

	fn text(&self, name: &str) -> Option<String> {
		property(self, name)?.as_string()
	}

	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn count(&self, name: &str) -> Option<u32> {
		let list = property(self, name)?;
		Reflect::get(&list, &JsValue::from_str("length")).ok()?.as_f64().map(|length| length as u32)
	}

	fn prevent_default(&self) {
		web_sys::Event::prevent_default(self);
	}

	fn stop_propagation(&self) {
		web_sys::Event::stop_propagation(self);
	}

	fn stop_immediate_propagation(&self) {
		web_sys::Event::stop_immediate_propagation(self);
	}
}
