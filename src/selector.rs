//! Selector parsing and matching behind [`MemoryDom`](`crate::memory::MemoryDom`), over the `selectors` crate.
//!
//! Pseudo-classes and pseudo-elements are rejected at parse time. Everything else `selectors` supports is available.

use crate::{Error, Result};
use core::{borrow::Borrow, fmt};
use cssparser::{Parser as CssParser, ParserInput, ToCss};
use selectors::{
	matching::{self, IgnoreNthChildForInvalidation, MatchingContext, MatchingMode, NeedsSelectorFlags, QuirksMode},
	parser::{self, ParseRelative, SelectorParseErrorKind},
	Element, NthIndexCache,
};

/// Identifiers, local names and attribute values of parsed selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub(crate) struct Atom(pub String);
impl From<&str> for Atom {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Borrow<str> for Atom {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Atom {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl ToCss for Atom {
	fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
		cssparser::serialize_identifier(&self.0, dest)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DomSelectors;
impl parser::SelectorImpl for DomSelectors {
	type ExtraMatchingData<'a> = ();
	type AttrValue = Atom;
	type Identifier = Atom;
	type LocalName = Atom;
	type NamespaceUrl = ();
	type NamespacePrefix = Atom;
	type BorrowedNamespaceUrl = ();
	type BorrowedLocalName = str;
	type NonTSPseudoClass = PseudoClass;
	type PseudoElement = PseudoElement;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PseudoClass {}
impl parser::NonTSPseudoClass for PseudoClass {
	type Impl = DomSelectors;

	fn is_active_or_hover(&self) -> bool {
		match *self {}
	}

	fn is_user_action_state(&self) -> bool {
		match *self {}
	}
}
impl ToCss for PseudoClass {
	fn to_css<W: fmt::Write>(&self, _: &mut W) -> fmt::Result {
		match *self {}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PseudoElement {}
impl parser::PseudoElement for PseudoElement {
	type Impl = DomSelectors;
}
impl ToCss for PseudoElement {
	fn to_css<W: fmt::Write>(&self, _: &mut W) -> fmt::Result {
		match *self {}
	}
}

struct SelectorParser;
impl<'i> parser::Parser<'i> for SelectorParser {
	type Impl = DomSelectors;
	type Error = SelectorParseErrorKind<'i>;
}

/// A parsed, comma-separated selector group.
#[derive(Debug)]
pub(crate) struct SelectorList(parser::SelectorList<DomSelectors>);
impl SelectorList {
	/// # Errors
	///
	/// Iff `selector` isn't a valid selector list, or uses pseudo-classes or pseudo-elements.
	pub fn parse(selector: &str) -> Result<Self> {
		let mut input = ParserInput::new(selector);
		let mut parser = CssParser::new(&mut input);
		parser::SelectorList::parse(&SelectorParser, &mut parser, ParseRelative::No)
			.map(Self)
			.map_err(|error| Error::Selector {
				selector: selector.to_owned(),
				message: format!("{:?} at {}:{}", error.kind, error.location.line, error.location.column),
			})
	}

	pub fn matches<E: Element<Impl = DomSelectors>>(&self, element: &E) -> bool {
		let mut nth_index_cache = NthIndexCache::default();
		let mut context = MatchingContext::new(
			MatchingMode::Normal,
			None,
			&mut nth_index_cache,
			QuirksMode::NoQuirks,
			NeedsSelectorFlags::No,
			IgnoreNthChildForInvalidation::No,
		);
		(self.0).0.iter().any(|selector| matching::matches_selector(selector, 0, None, element, &mut context))
	}
}
