//! The normalized event handed to [`Handler`](`crate::Handler`)s.

use crate::host::{Host, NativeEvent, NodeKind};
use hashbrown::HashMap;

/// Event type family, deciding which extra fields are read from the native event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
	Keyboard,
	Wheel,
	Mouse,
	Text,
	Touch,
	Message,
	PopState,
	Generic,
}
impl Family {
	#[must_use]
	pub fn of(event_type: &str) -> Self {
		let lower = event_type.to_ascii_lowercase();
		let wheel = lower
			.find("mouse")
			.map_or(false, |start| {
				let rest = &lower[start + "mouse".len()..];
				rest.contains("wheel") || rest.contains("scroll")
			});

		if event_type.starts_with("key") {
			Self::Keyboard
		} else if wheel || lower == "wheel" {
			Self::Wheel
		} else if event_type.starts_with("mouse") || event_type.starts_with("contextmenu") || event_type.contains("click") {
			Self::Mouse
		} else if lower.starts_with("text") {
			Self::Text
		} else if lower.starts_with("touch") || lower.starts_with("gesture") {
			Self::Touch
		} else if lower == "message" {
			Self::Message
		} else if lower == "popstate" {
			Self::PopState
		} else {
			Self::Generic
		}
	}
}

/// Memoizes [`Family::of`] per event type.
#[derive(Debug, Default)]
pub struct FamilyCache(HashMap<String, Family>);
impl FamilyCache {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn family(&mut self, event_type: &str) -> Family {
		if let Some(&family) = self.0.get(event_type) {
			return family;
		}
		let family = Family::of(event_type);
		self.0.insert(event_type.to_owned(), family);
		family
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Fields every normalized event carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Common {
	pub alt_key: bool,
	pub ctrl_key: bool,
	pub meta_key: bool,
	pub shift_key: bool,
	pub bubbles: bool,
	pub cancelable: bool,
	pub event_phase: Option<f64>,
	pub time_stamp: Option<f64>,
	pub which: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyboardDetails {
	/// `keyCode`, falling back to `which`.
	pub key_code: Option<f64>,
	pub char_code: Option<f64>,
	pub key: Option<String>,
	pub char: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MouseDetails {
	pub right_click: bool,
	pub button: Option<f64>,
	pub buttons: Option<f64>,
	/// Page coordinates when the native event has them, otherwise client coordinates plus document scroll.
	pub client_x: Option<f64>,
	pub client_y: Option<f64>,
	pub offset_x: Option<f64>,
	pub offset_y: Option<f64>,
	pub page_x: Option<f64>,
	pub page_y: Option<f64>,
	pub screen_x: Option<f64>,
	pub screen_y: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WheelDetails {
	pub mouse: MouseDetails,
	pub wheel_delta: Option<f64>,
	pub wheel_delta_x: Option<f64>,
	pub wheel_delta_y: Option<f64>,
	pub wheel_delta_z: Option<f64>,
	pub axis: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchDetails {
	pub touches: Option<u32>,
	pub target_touches: Option<u32>,
	pub changed_touches: Option<u32>,
	pub scale: Option<f64>,
	pub rotation: Option<f64>,
}

/// Family-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Details {
	Keyboard(KeyboardDetails),
	Mouse(MouseDetails),
	Wheel(WheelDetails),
	Text { data: Option<String> },
	Touch(TouchDetails),
	Message { data: Option<String>, origin: Option<String> },
	PopState { state: Option<String> },
	Generic,
}
impl Details {
	fn empty(family: Family) -> Self {
		match family {
			Family::Keyboard => Self::Keyboard(KeyboardDetails::default()),
			Family::Mouse => Self::Mouse(MouseDetails::default()),
			Family::Wheel => Self::Wheel(WheelDetails::default()),
			Family::Text => Self::Text { data: None },
			Family::Touch => Self::Touch(TouchDetails::default()),
			Family::Message => Self::Message { data: None, origin: None },
			Family::PopState => Self::PopState { state: None },
			Family::Generic => Self::Generic,
		}
	}

	fn read<E: NativeEvent>(family: Family, native: &E, scroll: (f64, f64)) -> Self {
		match family {
			Family::Keyboard => Self::Keyboard(KeyboardDetails {
				key_code: native.number("keyCode").filter(|&code| code != 0.0).or_else(|| native.number("which")),
				char_code: native.number("charCode"),
				key: native.text("key"),
				char: native.text("char"),
			}),
			Family::Mouse => Self::Mouse(read_mouse(native, scroll)),
			Family::Wheel => Self::Wheel(WheelDetails {
				mouse: read_mouse(native, scroll),
				wheel_delta: native.number("wheelDelta"),
				wheel_delta_x: native.number("wheelDeltaX"),
				wheel_delta_y: native.number("wheelDeltaY"),
				wheel_delta_z: native.number("wheelDeltaZ"),
				axis: native.number("axis"),
			}),
			Family::Text => Self::Text { data: native.text("data") },
			Family::Touch => Self::Touch(TouchDetails {
				touches: native.count("touches"),
				target_touches: native.count("targetTouches"),
				changed_touches: native.count("changedTouches"),
				scale: native.number("scale"),
				rotation: native.number("rotation"),
			}),
			Family::Message => Self::Message {
				data: native.text("data"),
				origin: native.text("origin"),
			},
			Family::PopState => Self::PopState { state: native.text("state") },
			Family::Generic => Self::Generic,
		}
	}
}

fn read_mouse<E: NativeEvent>(native: &E, (scroll_x, scroll_y): (f64, f64)) -> MouseDetails {
	let truthy = |value: Option<f64>| value.map_or(false, |value| value != 0.0);
	let page_x = native.number("pageX");
	let page_y = native.number("pageY");
	let raw_client_x = native.number("clientX");
	let raw_client_y = native.number("clientY");
	let (client_x, client_y) = if truthy(page_x) || truthy(page_y) {
		(page_x, page_y)
	} else if truthy(raw_client_x) || truthy(raw_client_y) {
		(raw_client_x.map(|x| x + scroll_x), raw_client_y.map(|y| y + scroll_y))
	} else {
		(raw_client_x, raw_client_y)
	};
	let button = native.number("button");
	MouseDetails {
		right_click: native.number("which") == Some(3.0) || button == Some(2.0),
		button,
		buttons: native.number("buttons"),
		client_x,
		client_y,
		offset_x: native.number("offsetX"),
		offset_y: native.number("offsetY"),
		page_x,
		page_y,
		screen_x: native.number("screenX"),
		screen_y: native.number("screenY"),
	}
}

/// A cross-host view of one dispatch.
///
/// One instance is built per native firing (or per direct trigger) and shared by the handlers of that pass,
/// so stopping immediate propagation in one handler is seen by the loop before the next.
pub struct Event<H: Host> {
	event_type: String,
	original: Option<H::Event>,
	target: Option<H::Node>,
	current_target: Option<H::Node>,
	related_target: Option<H::Node>,
	common: Common,
	details: Details,
	default_prevented: bool,
	propagation_stopped: bool,
	immediate_propagation_stopped: bool,
	stopped: bool,
}
impl<H: Host> Event<H> {
	/// Normalizes `native`, re-pointing text node targets to their parent element.
	pub fn from_native(host: &H, native: H::Event, current_target: H::Node, family: Family) -> Self {
		let target = native.target().map(|target| match host.node_kind(&target) {
			NodeKind::Text => host.parent_node(&target).unwrap_or(target),
			_ => target,
		});
		let flag = |name: &str| native.flag(name).unwrap_or_default();
		let common = Common {
			alt_key: flag("altKey"),
			ctrl_key: flag("ctrlKey"),
			meta_key: flag("metaKey"),
			shift_key: flag("shiftKey"),
			bubbles: flag("bubbles"),
			cancelable: flag("cancelable"),
			event_phase: native.number("eventPhase"),
			time_stamp: native.number("timeStamp"),
			which: native.number("which"),
		};
		Self {
			event_type: native.event_type(),
			details: Details::read(family, &native, host.scroll_offset()),
			related_target: native.related_target(),
			target,
			current_target: Some(current_target),
			common,
			original: Some(native),
			default_prevented: false,
			propagation_stopped: false,
			immediate_propagation_stopped: false,
			stopped: false,
		}
	}

	/// An event without native counterpart, as used by direct triggers.
	pub fn synthetic(event_type: impl Into<String>, element: H::Node, family: Family) -> Self {
		Self {
			event_type: event_type.into(),
			original: None,
			target: Some(element.clone()),
			current_target: Some(element),
			related_target: None,
			common: Common::default(),
			details: Details::empty(family),
			default_prevented: false,
			propagation_stopped: false,
			immediate_propagation_stopped: false,
			stopped: false,
		}
	}

	/// A copy with a different current target. Control state is copied too.
	#[must_use]
	pub fn clone_for(&self, current_target: H::Node) -> Self {
		Self {
			event_type: self.event_type.clone(),
			original: self.original.clone(),
			target: self.target.clone(),
			current_target: Some(current_target),
			related_target: self.related_target.clone(),
			common: self.common.clone(),
			details: self.details.clone(),
			default_prevented: self.default_prevented,
			propagation_stopped: self.propagation_stopped,
			immediate_propagation_stopped: self.immediate_propagation_stopped,
			stopped: self.stopped,
		}
	}

	#[must_use]
	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	pub(crate) fn replace_type(&mut self, event_type: String) -> String {
		core::mem::replace(&mut self.event_type, event_type)
	}

	/// The native event, if this dispatch came from one.
	#[must_use]
	pub fn original(&self) -> Option<&H::Event> {
		self.original.as_ref()
	}

	#[must_use]
	pub fn target(&self) -> Option<&H::Node> {
		self.target.as_ref()
	}

	/// The element the current handler runs for.
	#[must_use]
	pub fn current_target(&self) -> Option<&H::Node> {
		self.current_target.as_ref()
	}

	pub(crate) fn set_current_target(&mut self, current_target: H::Node) {
		self.current_target = Some(current_target);
	}

	#[must_use]
	pub fn related_target(&self) -> Option<&H::Node> {
		self.related_target.as_ref()
	}

	#[must_use]
	pub fn common(&self) -> &Common {
		&self.common
	}

	#[must_use]
	pub fn details(&self) -> &Details {
		&self.details
	}

	pub fn prevent_default(&mut self) {
		self.default_prevented = true;
		if let Some(original) = &self.original {
			original.prevent_default();
		}
	}

	pub fn stop_propagation(&mut self) {
		self.propagation_stopped = true;
		if let Some(original) = &self.original {
			original.stop_propagation();
		}
	}

	/// Skips the remaining handlers of this dispatch and stops native propagation.
	pub fn stop_immediate_propagation(&mut self) {
		self.immediate_propagation_stopped = true;
		self.propagation_stopped = true;
		if let Some(original) = &self.original {
			original.stop_immediate_propagation();
		}
	}

	/// [`prevent_default`](`Event::prevent_default`) and [`stop_propagation`](`Event::stop_propagation`).
	pub fn stop(&mut self) {
		self.prevent_default();
		self.stop_propagation();
		self.stopped = true;
	}

	#[must_use]
	pub fn is_default_prevented(&self) -> bool {
		self.default_prevented
	}

	#[must_use]
	pub fn is_propagation_stopped(&self) -> bool {
		self.propagation_stopped
	}

	#[must_use]
	pub fn is_immediate_propagation_stopped(&self) -> bool {
		self.immediate_propagation_stopped
	}

	#[must_use]
	pub fn is_stopped(&self) -> bool {
		self.stopped
	}
}
impl<H: Host> core::fmt::Debug for Event<H> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Event")
			.field("event_type", &self.event_type)
			.field("target", &self.target)
			.field("current_target", &self.current_target)
			.field("related_target", &self.related_target)
			.field("common", &self.common)
			.field("details", &self.details)
			.field("default_prevented", &self.default_prevented)
			.field("propagation_stopped", &self.propagation_stopped)
			.field("immediate_propagation_stopped", &self.immediate_propagation_stopped)
			.finish()
	}
}
