//! The single native listener per (element, native type) and its fan-out into the registry.

use crate::{
	entry::{Arg, HandlerEntry},
	event::Event,
	events::Events,
	host::{Host, NativeCallback},
	identity::ElementId,
	Result,
};
use std::{
	panic::{self, AssertUnwindSafe},
	rc::Rc,
};
use tracing::{error, trace, trace_span, warn};

impl<H: Host> Events<H> {
	/// Installs the native listener for (`element`, `native_type`).
	///
	/// The listener only holds a weak reference to the registry state.
	pub(crate) fn install(&self, element: &H::Node, element_id: ElementId, native_type: &str) -> Result<()> {
		if self.0.listeners.borrow().contains(element_id, native_type) {
			warn!(element = %element_id, event_type = native_type, "Native listener already installed. Keeping it.");
			return Ok(());
		}

		let callback: NativeCallback<H::Event> = {
			let inner = Rc::downgrade(&self.0);
			let element = element.clone();
			let native_type = native_type.to_owned();
			Rc::new(move |native: H::Event| match inner.upgrade() {
				Some(inner) => Events(inner).handle_native(&element, element_id, &native_type, native),
				None => warn!(element = %element_id, event_type = %native_type, "Native listener outlived its registry. Ignoring."),
			})
		};
		let listener = self.0.host.add_listener(element, native_type, callback)?;
		trace!(element = %element_id, event_type = native_type, "Installed native listener.");

		let previous = self.0.listeners.borrow_mut().insert(element_id, native_type, element.clone(), listener);
		debug_assert!(previous.is_none());
		Ok(())
	}

	/// Uninstalls the native listener for (`element_id`, `native_type`), if there is one.
	pub(crate) fn uninstall(&self, element_id: ElementId, native_type: &str) {
		let installed = self.0.listeners.borrow_mut().remove(element_id, native_type);
		match installed {
			Some(installed) => match self.0.host.remove_listener(&installed.element, native_type, installed.listener) {
				Ok(()) => trace!(element = %element_id, event_type = native_type, "Uninstalled native listener."),
				Err(error) => error!(element = %element_id, event_type = native_type, "Failed to remove native listener: {}", error),
			},
			None => warn!(element = %element_id, event_type = native_type, "No native listener to uninstall. Ignoring."),
		}
	}

	/// Entry point of every native firing.
	///
	/// Normalizes `native` once and runs a snapshot of the live entries for (`element_id`, `native_type`).
	pub(crate) fn handle_native(&self, element: &H::Node, element_id: ElementId, native_type: &str, native: H::Event) {
		let span = trace_span!("handle_native", element = %element_id, event_type = native_type);
		let _enter = span.enter();

		let entries = self.0.registry.borrow().get(element_id, Some(native_type), None, false);
		let family = self.0.families.borrow_mut().family(native_type);
		let mut event = Event::from_native(&self.0.host, native, element.clone(), family);

		#[cfg(feature = "dangerous-logging")]
		trace!(target = ?event.target(), related_target = ?event.related_target(), "Normalized native event.");
		trace!(entries = entries.len(), ?family, "Dispatching.");

		self.run(&entries, &mut event, &[]);
	}

	/// Calls each live entry in order, checking for a stop of immediate propagation before each one.
	///
	/// Entries removed while this runs (including by earlier entries) are skipped.
	pub(crate) fn run(&self, entries: &[Rc<HandlerEntry<H>>], event: &mut Event<H>, args: &[Arg]) {
		for entry in entries {
			if event.is_immediate_propagation_stopped() {
				trace!("Immediate propagation stopped.");
				break;
			}
			if entry.is_removed() {
				continue;
			}
			self.invoke(entry, event, args);
		}
	}

	fn invoke(&self, entry: &HandlerEntry<H>, event: &mut Event<H>, args: &[Arg]) {
		if !self.0.config.isolates_handlers() {
			return (entry.dispatch)(self, event, args);
		}

		// An unwinding emulated-type wrapper doesn't get to restore the native type.
		let event_type = event.event_type().to_owned();
		if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| (entry.dispatch)(self, event, args))) {
			event.replace_type(event_type);
			let message = payload
				.downcast_ref::<&str>()
				.map(|message| (*message).to_owned())
				.or_else(|| payload.downcast_ref::<String>().cloned())
				.unwrap_or_else(|| "(non-string payload)".to_owned());
			error!(element = %entry.element_id, event_type = %entry.requested_type, "Handler panicked: {}", message);
		}
	}
}
