use crate::host::Host;
use core::{cell::Cell, fmt};

/// Stable registry key of a DOM node, assigned on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub(crate) u64);
impl ElementId {
	#[must_use]
	pub fn get(self) -> u64 {
		self.0
	}
}
impl fmt::Display for ElementId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Hands out [`ElementId`]s from a monotonic counter and caches them in the host's per-node slot.
///
/// Identities are never reused while the map lives. The slot itself is owned by the node,
/// so dropping a node releases its identity without any teardown here.
#[derive(Debug)]
pub struct IdentityMap {
	next: Cell<u64>,
}
impl Default for IdentityMap {
	fn default() -> Self {
		Self::new()
	}
}
impl IdentityMap {
	#[must_use]
	pub fn new() -> Self {
		Self { next: Cell::new(1) }
	}

	pub fn identity_of<H: Host>(&self, host: &H, node: &H::Node) -> ElementId {
		if let Some(id) = host.cached_identity(node) {
			return id;
		}
		let id = ElementId(self.next.get());
		self.next.set(id.0 + 1);
		host.cache_identity(node, id);
		id
	}
}
