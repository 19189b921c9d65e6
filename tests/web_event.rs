#![cfg(target_arch = "wasm32")]

use delegate_dom::{Arg, Event, Events, Handler, WebHost};
use std::{
	cell::{Cell, RefCell},
	rc::Rc,
	sync::Once,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, HtmlBodyElement, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

static LOG_INIT: Once = Once::new();

fn init() -> HtmlBodyElement {
	//TODO: Fail on Warning or Error.
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);
	window().unwrap().document().unwrap().body().unwrap().dyn_into::<HtmlBodyElement>().unwrap()
}

fn create(tag_name: &str, parent: &web_sys::Node) -> HtmlElement {
	let element: HtmlElement = window().unwrap().document().unwrap().create_element(tag_name).unwrap().dyn_into().unwrap();
	parent.append_child(&element).unwrap();
	element
}

fn counter(calls: &Rc<Cell<usize>>) -> Handler<WebHost> {
	let calls = Rc::clone(calls);
	Handler::new(move |event: &mut Event<WebHost>, _: &[Arg]| {
		assert!(event.original().is_some());
		calls.set(calls.get() + 1)
	})
}

#[wasm_bindgen_test]
fn click() {
	let body = init();
	let button = create("button", &body);

	let events = Events::new(WebHost::new().unwrap());
	let calls = Rc::new(Cell::new(0));

	assert_eq!(events.on(&button, "click.test", counter(&calls)), Ok(true));
	assert_eq!(calls.get(), 0);

	button.click();
	assert_eq!(calls.get(), 1);

	events.off(&button, ".test");
	assert!(!events.is_listening(&button, "click"));
	button.click();
	assert_eq!(calls.get(), 1);

	button.remove();
}

#[wasm_bindgen_test]
fn delegated_click() {
	let body = init();
	let list = create("ul", &body);
	let item = create("li", &list);
	let label = create("span", &item);
	item.set_class_name("item");

	let events = Events::new(WebHost::new().unwrap());
	let seen = Rc::new(RefCell::new(Vec::new()));
	events
		.on_delegate(
			&list,
			"click",
			".item",
			Handler::new({
				let seen = Rc::clone(&seen);
				move |event: &mut Event<WebHost>, _: &[Arg]| seen.borrow_mut().push(event.current_target().cloned())
			}),
		)
		.unwrap();

	label.click();
	list.click();
	let item: web_sys::Node = item.into();
	assert_eq!(*seen.borrow(), [Some(item)]);

	list.remove();
}

#[wasm_bindgen_test]
fn one_shot_removes_its_listener_during_dispatch() {
	let body = init();
	let button = create("button", &body);

	let events = Events::new(WebHost::new().unwrap());
	let calls = Rc::new(Cell::new(0));
	events.one(&button, "click", counter(&calls)).unwrap();

	button.click();
	button.click();
	assert_eq!(calls.get(), 1);
	assert_eq!(events.listener_count(), 0);

	button.remove();
}

#[wasm_bindgen_test]
fn trigger_dispatches_a_native_event() {
	let body = init();
	let parent = create("div", &body);
	let child = create("div", &parent);

	let events = Events::new(WebHost::new().unwrap());
	let calls = Rc::new(Cell::new(0));
	events.on(&parent, "refresh", counter(&calls)).unwrap();

	assert!(events.trigger(&child, "refresh"));
	assert_eq!(calls.get(), 1);

	parent.remove();
}
