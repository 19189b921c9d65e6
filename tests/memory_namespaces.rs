mod common;

use common::{child, log, recorder};
use delegate_dom::{Events, MemoryDom, MemoryEvent, Result};

#[test]
fn removal_requires_all_requested_namespaces() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let log = log();

	let only_b = child(dom, dom.document(), "div");
	events.on(&only_b, "click.a.b", recorder(&log, "ab"))?;
	events.on(&only_b, "click.a", recorder(&log, "a"))?;
	events.off(&only_b, "click.b");
	dom.click(only_b);
	assert_eq!(*log.borrow(), ["a"]);

	let both = child(dom, dom.document(), "div");
	events.on(&both, "click.a.b", recorder(&log, "ab"))?;
	events.on(&both, "click.a", recorder(&log, "a"))?;
	events.off(&both, "click.a");
	assert_eq!(dom.listener_count(both, "click"), 0);
	Ok(())
}

#[test]
fn namespace_order_is_irrelevant() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let div = child(dom, dom.document(), "div");
	let log = log();

	events.on(&div, "click.x.y", recorder(&log, "xy"))?;
	events.off(&div, "click.y.x");
	assert!(events.registry().is_empty());
	Ok(())
}

#[test]
fn namespace_only_removal_spans_types() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let input = child(dom, dom.document(), "input");
	let log = log();

	events.on(&input, "click.b keyup.b", recorder(&log, "b"))?;
	events.on(&input, "keyup", recorder(&log, "plain"))?;
	events.off(&input, ".b");

	assert_eq!(dom.listener_count(input, "click"), 0);
	assert_eq!(dom.listener_count(input, "keyup"), 1);
	dom.dispatch(input, &MemoryEvent::new("keyup"));
	assert_eq!(*log.borrow(), ["plain"]);
	Ok(())
}

#[test]
fn off_splits_on_whitespace() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let input = child(dom, dom.document(), "input");
	let log = log();

	events.on(&input, "click keyup focus", recorder(&log, "any"))?;
	events.off(&input, " click\tkeyup\n");
	assert_eq!(dom.listener_count(input, "click"), 0);
	assert_eq!(dom.listener_count(input, "keyup"), 0);
	assert_eq!(dom.listener_count(input, "focus"), 1);
	Ok(())
}

#[test]
fn off_by_type_and_handler() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let button = child(dom, dom.document(), "button");
	let log = log();
	let first = recorder(&log, "first");
	let second = recorder(&log, "second");

	events.on(&button, "click.ns keyup", first.clone())?;
	events.on(&button, "click", second.clone())?;

	events.off_types_handler(&button, "click", &first);
	dom.click(button);
	assert_eq!(*log.borrow(), ["second"]);
	assert_eq!(dom.listener_count(button, "keyup"), 1);

	events.off_types_handler(&button, "", &first);
	assert_eq!(dom.listener_count(button, "keyup"), 0);
	assert_eq!(dom.listener_count(button, "click"), 1);
	Ok(())
}

#[test]
fn empty_type_string_removes_everything() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let button = child(dom, dom.document(), "button");
	let other = child(dom, dom.document(), "button");
	let log = log();

	events.on(&button, "click.a keyup mouseenter", recorder(&log, "button"))?;
	events.on(&other, "click", recorder(&log, "other"))?;
	events.off(&button, "  ");

	assert_eq!(dom.total_listener_count(), 1);
	assert_eq!(dom.listener_count(other, "click"), 1);

	events.off_all(&other);
	assert_eq!(dom.total_listener_count(), 0);
	Ok(())
}

#[test]
fn maps_bind_and_unbind_pairwise() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let input = child(dom, dom.document(), "input");
	let log = log();
	let on_click = recorder(&log, "click");
	let on_key = recorder(&log, "key");

	assert!(events.on_map(&input, vec![("click", on_click.clone()), ("keyup.x keydown", on_key.clone())])?);
	assert_eq!(events.listener_count(), 3);

	dom.click(input);
	dom.dispatch(input, &MemoryEvent::new("keydown"));
	assert_eq!(*log.borrow(), ["click", "key"]);

	events.off_map(&input, vec![("click", &on_click), ("keyup", &on_key)]);
	assert_eq!(dom.listener_count(input, "click"), 0);
	assert_eq!(dom.listener_count(input, "keyup"), 0);
	assert_eq!(dom.listener_count(input, "keydown"), 1);
	Ok(())
}

#[test]
fn removing_from_unbound_elements_is_a_no_op() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let bound = child(dom, dom.document(), "div");
	let unbound = child(dom, dom.document(), "div");
	let log = log();
	let handler = recorder(&log, "bound");

	events.on(&bound, "click", handler.clone())?;
	events.off(&unbound, "click");
	events.off_all(&unbound);
	events.off_handler(&unbound, &handler);
	events.off(&bound, "keyup.none");

	assert_eq!(events.registry().len(), 1);
	assert_eq!(dom.total_listener_count(), 1);
	Ok(())
}
