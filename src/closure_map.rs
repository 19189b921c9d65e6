use crate::{host::Host, identity::ElementId};
use core::fmt;
use hashbrown::HashMap;

/// A native listener as installed on the host.
pub(crate) struct Installed<H: Host> {
	pub element: H::Node,
	pub listener: H::Listener,
}

/// The native listeners currently installed, at most one per (element, native type).
pub(crate) struct ClosureMap<H: Host> {
	installed: HashMap<(ElementId, String), Installed<H>>,
}
impl<H: Host> ClosureMap<H> {
	pub fn new() -> Self {
		Self { installed: HashMap::new() }
	}

	/// Returns the previous listener for the same key, which the caller has to uninstall.
	pub fn insert(&mut self, element_id: ElementId, native_type: &str, element: H::Node, listener: H::Listener) -> Option<Installed<H>> {
		self.installed.insert((element_id, native_type.to_owned()), Installed { element, listener })
	}

	pub fn remove(&mut self, element_id: ElementId, native_type: &str) -> Option<Installed<H>> {
		self.installed.remove(&(element_id, native_type.to_owned()))
	}

	pub fn contains(&self, element_id: ElementId, native_type: &str) -> bool {
		self.installed.contains_key(&(element_id, native_type.to_owned()))
	}

	pub fn len(&self) -> usize {
		self.installed.len()
	}

	pub fn drain(&mut self) -> Vec<(ElementId, String, Installed<H>)> {
		self.installed.drain().map(|((element_id, native_type), installed)| (element_id, native_type, installed)).collect()
	}
}
impl<H: Host> fmt::Debug for ClosureMap<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.installed.keys()).finish()
	}
}
