//! Element attributes.

use std::borrow::Cow;

use crate::entities::decode_entities;
use crate::name::QualName;
use crate::node::SourcePosition;

/// A single attribute as read or set.
///
/// The value is kept raw, exactly as it appeared between the quotes, so a
/// parsed document serializes back byte for byte. [`Attribute::value`]
/// resolves character references for callers that want the logical text.
/// A `None` value is a bare attribute such as `disabled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: QualName,
    name_quote: Option<char>,
    value: Option<String>,
    quote: Option<char>,
    escape_quotes: bool,
    pub(crate) ordinal: usize,
    position: SourcePosition,
}

impl Attribute {
    /// New attribute with a raw value.
    #[must_use]
    pub fn new(name: &str, value: Option<&str>) -> Self {
        Self {
            name: QualName::parse(name),
            name_quote: None,
            value: value.map(str::to_string),
            quote: None,
            escape_quotes: true,
            ordinal: 0,
            position: SourcePosition::default(),
        }
    }

    /// Record the quote character the value was written with.
    #[must_use]
    pub const fn with_quote(mut self, quote: Option<char>) -> Self {
        self.quote = quote;
        self
    }

    /// Record that the name itself was quoted, as in
    /// `<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0//EN">`.
    #[must_use]
    pub const fn with_name_quote(mut self, quote: Option<char>) -> Self {
        self.name_quote = quote;
        self
    }

    /// Record where the attribute started.
    #[must_use]
    pub const fn at(mut self, position: SourcePosition) -> Self {
        self.position = position;
        self
    }

    /// Write the value verbatim even if it contains the quote character.
    #[must_use]
    pub const fn without_quote_escaping(mut self) -> Self {
        self.escape_quotes = false;
        self
    }

    /// Qualified name, in source case.
    #[must_use]
    pub const fn name(&self) -> &QualName {
        &self.name
    }

    /// Quote around the name, if it was quoted.
    #[must_use]
    pub const fn name_quote(&self) -> Option<char> {
        self.name_quote
    }

    /// Raw value as read.
    #[must_use]
    pub fn raw_value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Value with character references resolved. Bare attributes yield `""`.
    #[must_use]
    pub fn value(&self) -> Cow<'_, str> {
        self.value.as_deref().map_or(Cow::Borrowed(""), decode_entities)
    }

    /// Quote character recorded for the value.
    #[must_use]
    pub const fn quote(&self) -> Option<char> {
        self.quote
    }

    /// Whether the recorded quote character is escaped inside the value
    /// when writing.
    #[must_use]
    pub const fn escapes_quotes(&self) -> bool {
        self.escape_quotes
    }

    /// Creation order within the document.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Where the attribute started in the source.
    #[must_use]
    pub const fn position(&self) -> SourcePosition {
        self.position
    }

    pub(crate) fn set_value(&mut self, value: Option<String>, quote: Option<char>) {
        self.value = value;
        self.quote = quote;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_value_resolves_references() {
        let attr = Attribute::new("title", Some("a &amp; b"));
        assert_eq!(attr.raw_value(), Some("a &amp; b"));
        assert_eq!(attr.value(), "a & b");
    }

    #[test]
    fn bare_attributes_have_no_raw_value() {
        let attr = Attribute::new("disabled", None);
        assert_eq!(attr.raw_value(), None);
        assert_eq!(attr.value(), "");
    }
}
