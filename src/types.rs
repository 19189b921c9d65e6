//! Parsing of event type strings like `"click.menu keyup.menu.shortcuts"`.

/// One whitespace-separated token of a type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec<'a> {
	/// The part before the first `.`. Empty for namespace-only tokens like `".menu"`.
	pub kind: &'a str,
	/// Order-irrelevant. Empty segments are dropped.
	pub namespaces: Vec<&'a str>,
}
impl<'a> TypeSpec<'a> {
	#[must_use]
	pub fn parse(token: &'a str) -> Self {
		let mut parts = token.split('.');
		let kind = parts.next().unwrap_or_default();
		Self {
			kind,
			namespaces: parts.filter(|namespace| !namespace.is_empty()).collect(),
		}
	}

	#[must_use]
	pub fn owned_namespaces(&self) -> Vec<String> {
		self.namespaces.iter().map(|&namespace| namespace.to_owned()).collect()
	}
}

/// Splits on any whitespace, skipping empty tokens.
pub fn split(types: &str) -> impl Iterator<Item = TypeSpec<'_>> {
	types.split_whitespace().map(TypeSpec::parse)
}
