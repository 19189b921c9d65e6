#![allow(dead_code)]

use delegate_dom::{Arg, Event, Handler, MemoryDom, NodeRef};
use std::{
	cell::{Cell, RefCell},
	rc::Rc,
};
use tracing_subscriber::EnvFilter;

pub type Log = Rc<RefCell<Vec<&'static str>>>;

pub fn init() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_test_writer()
		.try_init()
		.ok();
}

pub fn log() -> Log {
	Rc::default()
}

/// Appends `name` to `log` on each call.
pub fn recorder(log: &Log, name: &'static str) -> Handler<MemoryDom> {
	let log = Rc::clone(log);
	Handler::new(move |_: &mut Event<MemoryDom>, _: &[Arg]| log.borrow_mut().push(name))
}

pub fn counter(calls: &Rc<Cell<usize>>) -> Handler<MemoryDom> {
	let calls = Rc::clone(calls);
	Handler::new(move |_: &mut Event<MemoryDom>, _: &[Arg]| calls.set(calls.get() + 1))
}

/// Records each call's current target and event type.
pub fn targets(seen: &Rc<RefCell<Vec<(Option<NodeRef>, String)>>>) -> Handler<MemoryDom> {
	let seen = Rc::clone(seen);
	Handler::new(move |event: &mut Event<MemoryDom>, _: &[Arg]| {
		seen.borrow_mut().push((event.current_target().copied(), event.event_type().to_owned()))
	})
}

/// Appends `child` to `parent` and returns it.
pub fn child(dom: &MemoryDom, parent: NodeRef, tag_name: &str) -> NodeRef {
	let child = dom.create_element(tag_name);
	dom.append_child(parent, child);
	child
}
