//! Synthetic event types emulated on top of native ones.

use crate::{
	event::Event,
	host::{Host, NodeKind},
};
use hashbrown::HashMap;

/// Per-firing predicate of an emulated type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
	/// `relatedTarget` is absent or lies outside the bound element's subtree.
	/// Nothing lies outside the document, so a present `relatedTarget` never satisfies it there.
	///
	/// Turns `*over`/`*out` into enter/leave: moves between descendants of the bound element don't count.
	RelatedOutside,
}
impl Condition {
	pub fn holds<H: Host>(self, host: &H, bound: &H::Node, event: &Event<H>) -> bool {
		match self {
			Self::RelatedOutside => match event.related_target() {
				None => true,
				Some(related) => host.node_kind(bound) != NodeKind::Document && !host.contains(bound, related),
			},
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CustomEvent {
	base: String,
	condition: Option<Condition>,
}

/// Result of [`CustomEvents::translate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation<'a> {
	/// The native type the shared listener is installed for.
	pub base: &'a str,
	pub condition: Option<Condition>,
}

/// Static table from emulated type names to native types, built once per user agent.
#[derive(Debug, Clone)]
pub struct CustomEvents {
	table: HashMap<&'static str, CustomEvent>,
}
impl CustomEvents {
	#[must_use]
	pub fn new(user_agent: &str) -> Self {
		let boundary = |base: &str| CustomEvent {
			base: base.to_owned(),
			condition: Some(Condition::RelatedOutside),
		};
		let mut table = HashMap::new();
		table.insert("mouseenter", boundary("mouseover"));
		table.insert("mouseleave", boundary("mouseout"));
		table.insert("pointerenter", boundary("pointerover"));
		table.insert("pointerleave", boundary("pointerout"));
		table.insert(
			"mousewheel",
			CustomEvent {
				base: if user_agent.contains("Firefox") { "DOMMouseScroll" } else { "mousewheel" }.to_owned(),
				condition: None,
			},
		);
		Self { table }
	}

	/// Unregistered types pass through unchanged.
	#[must_use]
	pub fn translate<'a>(&'a self, event_type: &'a str) -> Translation<'a> {
		match self.table.get(event_type) {
			Some(custom) => Translation {
				base: &custom.base,
				condition: custom.condition,
			},
			None => Translation { base: event_type, condition: None },
		}
	}

	#[must_use]
	pub fn is_custom(&self, event_type: &str) -> bool {
		self.table.contains_key(event_type)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		event::Family,
		memory::{MemoryDom, MemoryEvent},
	};

	#[test]
	fn enter_and_leave() {
		let custom = CustomEvents::new("");
		assert_eq!(custom.translate("mouseenter"), Translation { base: "mouseover", condition: Some(Condition::RelatedOutside) });
		assert_eq!(custom.translate("mouseleave"), Translation { base: "mouseout", condition: Some(Condition::RelatedOutside) });
		assert_eq!(custom.translate("pointerleave").base, "pointerout");
	}

	#[test]
	fn mousewheel_depends_on_user_agent() {
		assert_eq!(CustomEvents::new("Mozilla/5.0 (X11; Linux x86_64; rv:118.0) Gecko/20100101 Firefox/118.0").translate("mousewheel").base, "DOMMouseScroll");
		assert_eq!(CustomEvents::new("Mozilla/5.0 AppleWebKit/537.36 Chrome/117.0").translate("mousewheel").base, "mousewheel");
		assert_eq!(CustomEvents::new("").translate("mousewheel").condition, None);
	}

	#[test]
	fn passthrough() {
		let custom = CustomEvents::new("");
		assert_eq!(custom.translate("click"), Translation { base: "click", condition: None });
		assert!(!custom.is_custom("click"));
	}

	#[test]
	fn related_outside() {
		let dom = MemoryDom::new();
		let outer = dom.create_element("div");
		let inner = dom.create_element("span");
		let elsewhere = dom.create_element("p");
		dom.append_child(dom.document(), outer);
		dom.append_child(outer, inner);
		dom.append_child(dom.document(), elsewhere);

		let event = |related: Option<_>| {
			let mut native = MemoryEvent::new("mouseover");
			if let Some(related) = related {
				native = native.with_related_target(related);
			}
			Event::from_native(&dom, native, outer, Family::Mouse)
		};

		assert!(Condition::RelatedOutside.holds(&dom, &outer, &event(None)));
		assert!(Condition::RelatedOutside.holds(&dom, &outer, &event(Some(elsewhere))));
		assert!(!Condition::RelatedOutside.holds(&dom, &outer, &event(Some(outer))));
		assert!(!Condition::RelatedOutside.holds(&dom, &outer, &event(Some(inner))));
		assert!(Condition::RelatedOutside.holds(&dom, &dom.document(), &event(None)));
		assert!(!Condition::RelatedOutside.holds(&dom, &dom.document(), &event(Some(elsewhere))));
	}
}
