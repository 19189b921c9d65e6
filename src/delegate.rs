//! Delegation resolution and handler wrapping.

use crate::{
	custom::Condition,
	entry::{Arg, Dispatch, Handler},
	event::Event,
	host::Host,
	Events, Result,
};
use std::rc::Rc;
use tracing::{error, trace};

/// Walks from `target` up through parent links towards `root`, returning the nearest node
/// that is in the live result of evaluating `selector` against `root`.
///
/// `root` itself never matches. Returns `Ok(None)` if `root` (or the top of the tree) is reached first.
///
/// # Errors
///
/// Iff the host rejects `selector`.
pub fn find_target<H: Host>(host: &H, target: &H::Node, root: &H::Node, selector: &str) -> Result<Option<H::Node>> {
	let candidates = host.query_selector_all(root, selector)?;
	let mut current = Some(target.clone());
	while let Some(node) = current {
		if &node == root {
			break;
		}
		if candidates.contains(&node) {
			return Ok(Some(node));
		}
		current = host.parent_node(&node);
	}
	Ok(None)
}

/// Removal performed right after the wrapped callback ran once.
pub(crate) struct OneShot<H: Host> {
	/// The full type string of the binding, namespaces included.
	pub types: String,
	pub original: Handler<H>,
}

/// Everything that goes into one [`Dispatch`].
pub(crate) struct Wrap<H: Host> {
	pub element: H::Node,
	pub handler: Handler<H>,
	pub selector: Option<String>,
	pub condition: Option<Condition>,
	/// Set as the event's type for the duration of the call, for emulated types.
	pub requested_type: Option<String>,
	pub args: Vec<Arg>,
	pub one_shot: Option<OneShot<H>>,
}
impl<H: Host> Wrap<H> {
	/// Order of checks per firing: disabled target, delegation match, boundary condition.
	/// The callback sees runtime arguments first, then the bound ones.
	pub fn into_dispatch(self) -> Dispatch<H> {
		let Self {
			element,
			handler,
			selector,
			condition,
			requested_type,
			args,
			one_shot,
		} = self;
		Rc::new(move |events: &Events<H>, event: &mut Event<H>, runtime_args: &[Arg]| {
			let host = events.host();

			let this = match &selector {
				None => element.clone(),
				Some(selector) => {
					let target = match event.target() {
						Some(target) => target.clone(),
						None => return,
					};
					if host.is_disabled(&target) {
						trace!("Delegated target is disabled. Skipping.");
						return;
					}
					match find_target(host, &target, &element, selector) {
						Ok(Some(matched)) => matched,
						Ok(None) => return,
						Err(error) => return error!("Failed to resolve delegation target: {}", error),
					}
				}
			};

			if let Some(condition) = condition {
				if !condition.holds(host, &this, event) {
					return;
				}
			}

			event.set_current_target(this);
			let native_type = requested_type.as_ref().map(|requested_type| event.replace_type(requested_type.clone()));
			if args.is_empty() {
				handler.call(event, runtime_args);
			} else {
				let all: Vec<Arg> = runtime_args.iter().chain(args.iter()).cloned().collect();
				handler.call(event, &all);
			}
			if let Some(native_type) = native_type {
				event.replace_type(native_type);
			}

			if let Some(OneShot { types, original }) = &one_shot {
				trace!(types = %types, "One-shot handler ran. Unbinding.");
				events.off_types_handler(&element, types, original);
			}
		})
	}
}
