mod common;

use common::{child, counter, log, recorder};
use delegate_dom::{Arg, Binding, ElementId, Error, Event, Events, Handler, Host, MemoryDom, MemoryEvent, NativeCallback, NodeKind, NodeRef, Result};
use std::{
	cell::{Cell, RefCell},
	rc::Rc,
};

#[test]
fn plain_types_dispatch_native_events() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let form = child(dom, dom.document(), "form");
	let button = child(dom, form, "button");
	let log = log();
	let natives = Rc::new(Cell::new(0));

	events.on(&button, "click", recorder(&log, "button"))?;
	events.on(&form, "click", recorder(&log, "form"))?;
	events.on(
		&form,
		"submit",
		Handler::new({
			let natives = Rc::clone(&natives);
			move |event: &mut Event<MemoryDom>, _: &[Arg]| {
				if event.original().is_some() {
					natives.set(natives.get() + 1)
				}
			}
		}),
	)?;

	assert!(events.trigger(&button, "click"));
	assert_eq!(*log.borrow(), ["button", "form"]);

	assert!(events.trigger(&form, "submit"));
	assert_eq!(natives.get(), 1);
	Ok(())
}

#[test]
fn runtime_arguments_come_before_bound_ones() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let parent = child(dom, dom.document(), "div");
	let widget = child(dom, parent, "div");
	let seen = Rc::new(RefCell::new(Vec::new()));
	let parent_calls = Rc::new(Cell::new(0));

	events.on_with(
		&widget,
		"refresh",
		Binding::new().arg("bound"),
		Handler::new({
			let seen = Rc::clone(&seen);
			move |event: &mut Event<MemoryDom>, args: &[Arg]| {
				assert!(event.original().is_none());
				let args: Vec<_> = args.iter().filter_map(|arg| arg.downcast_ref::<&str>().copied()).collect();
				seen.borrow_mut().push(args)
			}
		}),
	)?;
	events.on(&parent, "refresh", counter(&parent_calls))?;

	assert!(events.trigger_with(&widget, "refresh", &[Rc::new("runtime") as Arg]));
	assert_eq!(*seen.borrow(), [vec!["runtime", "bound"]]);
	assert_eq!(parent_calls.get(), 0);
	Ok(())
}

#[test]
fn namespaced_triggers_call_matching_bindings_only() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let parent = child(dom, dom.document(), "div");
	let widget = child(dom, parent, "div");
	let log = log();

	events.on(&widget, "refresh.a", recorder(&log, "a"))?;
	events.on(&widget, "refresh.a.b", recorder(&log, "ab"))?;
	events.on(&widget, "refresh.b", recorder(&log, "b"))?;
	events.on(&widget, "refresh", recorder(&log, "plain"))?;
	events.on(&parent, "refresh.a", recorder(&log, "parent"))?;

	assert!(events.trigger(&widget, "refresh.a"));
	assert_eq!(*log.borrow(), ["a", "ab"]);
	Ok(())
}

#[test]
fn namespace_only_triggers_span_types() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let input = child(dom, dom.document(), "input");
	let seen = Rc::new(RefCell::new(Vec::new()));

	let handler = Handler::new({
		let seen = Rc::clone(&seen);
		move |event: &mut Event<MemoryDom>, _: &[Arg]| seen.borrow_mut().push(event.event_type().to_owned())
	});
	events.on(&input, "click.a keyup.a focus", handler)?;

	assert!(events.trigger(&input, ".a"));
	let mut seen = seen.borrow().clone();
	seen.sort();
	assert_eq!(seen, ["click", "keyup"]);
	Ok(())
}

#[test]
fn direct_triggers_consume_one_shots() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let widget = child(dom, dom.document(), "div");
	let calls = Rc::new(Cell::new(0));

	events.one(&widget, "refresh.ns", counter(&calls))?;
	events.trigger(&widget, "refresh.ns");
	events.trigger(&widget, "refresh.ns");
	assert_eq!(calls.get(), 1);
	assert_eq!(dom.total_listener_count(), 0);
	Ok(())
}

#[test]
fn immediate_stop_applies_to_direct_triggers() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let widget = child(dom, dom.document(), "div");
	let log = log();

	events.on(
		&widget,
		"refresh.ns",
		Handler::new(|event: &mut Event<MemoryDom>, _: &[Arg]| event.stop_immediate_propagation()),
	)?;
	events.on(&widget, "refresh.ns", recorder(&log, "skipped"))?;

	assert!(events.trigger(&widget, "refresh.ns"));
	assert!(log.borrow().is_empty());
	Ok(())
}

#[test]
fn triggers_without_bindings_are_harmless() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let widget = child(dom, dom.document(), "div");

	assert!(events.trigger(&widget, "refresh.ns"));
	assert!(events.trigger_with(&widget, "refresh", &[Rc::new(1_i32) as Arg]));
	assert!(events.trigger(&widget, ""));
	assert!(events.trigger(&widget, "click"));
	Ok(())
}

#[test]
fn selections_trigger_on_their_first_node() -> Result<()> {
	common::init();
	let events = Events::new(MemoryDom::new());
	let dom = events.host();
	let a = child(dom, dom.document(), "div");
	let b = child(dom, dom.document(), "div");
	let log = log();

	events.on(&a, "refresh.ns", recorder(&log, "a"))?;
	events.on(&b, "refresh.ns", recorder(&log, "b"))?;

	assert_eq!(events.select(vec![a, b]).trigger("refresh.ns"), Some(a));
	assert_eq!(*log.borrow(), ["a"]);
	assert_eq!(events.select(Vec::new()).trigger("refresh"), None);

	let text = dom.create_text("text");
	assert_eq!(events.select(vec![text, a]).trigger("refresh.ns"), None);
	Ok(())
}

/// Fails to dispatch `refuse`, delegating everything else to a [`MemoryDom`].
struct Refusing(MemoryDom);
impl Host for Refusing {
	type Node = NodeRef;
	type Event = MemoryEvent;
	type Listener = <MemoryDom as Host>::Listener;

	fn node_kind(&self, node: &NodeRef) -> NodeKind {
		self.0.node_kind(node)
	}

	fn parent_node(&self, node: &NodeRef) -> Option<NodeRef> {
		self.0.parent_node(node)
	}

	fn query_selector_all(&self, root: &NodeRef, selector: &str) -> Result<Vec<NodeRef>> {
		self.0.query_selector_all(root, selector)
	}

	fn is_disabled(&self, node: &NodeRef) -> bool {
		self.0.is_disabled(node)
	}

	fn cached_identity(&self, node: &NodeRef) -> Option<ElementId> {
		self.0.cached_identity(node)
	}

	fn cache_identity(&self, node: &NodeRef, id: ElementId) {
		self.0.cache_identity(node, id)
	}

	fn add_listener(&self, node: &NodeRef, native_type: &str, callback: NativeCallback<MemoryEvent>) -> Result<Self::Listener> {
		self.0.add_listener(node, native_type, callback)
	}

	fn remove_listener(&self, node: &NodeRef, native_type: &str, listener: Self::Listener) -> Result<()> {
		self.0.remove_listener(node, native_type, listener)
	}

	fn dispatch_synthetic(&self, node: &NodeRef, event_type: &str) -> Result<bool> {
		if event_type == "refuse" {
			return Err(Error::Host(format!("can't dispatch `{}`", event_type)));
		}
		self.0.dispatch_synthetic(node, event_type)
	}

	fn user_agent(&self) -> String {
		self.0.user_agent()
	}
}

#[test]
fn failed_native_dispatches_dont_stop_later_types() -> Result<()> {
	common::init();
	let events = Events::new(Refusing(MemoryDom::new()));
	let dom = &events.host().0;
	let button = child(dom, dom.document(), "button");
	let seen = Rc::new(RefCell::new(Vec::new()));

	events.on(
		&button,
		"click focus",
		Handler::new({
			let seen = Rc::clone(&seen);
			move |event: &mut Event<Refusing>, _: &[Arg]| seen.borrow_mut().push(event.event_type().to_owned())
		}),
	)?;

	assert!(!events.trigger(&button, "click refuse focus"));
	assert_eq!(*seen.borrow(), ["click", "focus"]);
	assert!(events.trigger(&button, "focus"));
	Ok(())
}
