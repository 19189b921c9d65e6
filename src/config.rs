/// Per-[`Events`](`crate::Events`) settings.
///
/// ```
/// let config = delegate_dom::Config::new().user_agent("Mozilla/5.0 Firefox/118.0").isolate_handlers(true);
/// assert!(config.isolates_handlers());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
	user_agent: Option<String>,
	isolate_handlers: bool,
}
impl Config {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides [`Host::user_agent`](`crate::Host::user_agent`) when choosing the native type behind `mousewheel`.
	#[must_use]
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());
		self
	}

	/// Catch panics per handler call and log them instead of aborting the rest of the dispatch.
	///
	/// Off by default: the first panicking handler ends the dispatch pass.
	#[must_use]
	pub fn isolate_handlers(mut self, isolate: bool) -> Self {
		self.isolate_handlers = isolate;
		self
	}

	#[must_use]
	pub fn user_agent_override(&self) -> Option<&str> {
		self.user_agent.as_deref()
	}

	#[must_use]
	pub fn isolates_handlers(&self) -> bool {
		self.isolate_handlers
	}
}
