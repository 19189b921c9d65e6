use thiserror::Error;

/// Host failures that can surface while binding or dispatching.
///
/// Invalid subscriptions (text or comment nodes, `click` on disabled elements) are **not** errors.
/// They are ignored and reported as `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	/// The host rejected a delegation selector.
	#[error("invalid selector {selector:?}: {message}")]
	Selector { selector: String, message: String },

	/// The host threw while installing, removing or dispatching a native listener or event.
	#[error("host error: {0}")]
	Host(String),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
