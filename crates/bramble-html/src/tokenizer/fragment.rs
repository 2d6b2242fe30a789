//! Fragments produced by the reader.

use std::borrow::Cow;
use std::cell::OnceCell;

use bramble_common::text::is_html_whitespace;
use bramble_dom::{SourcePosition, decode_entities};
use strum_macros::Display;

/// What a fragment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FragmentKind {
    /// Character data between tags.
    Text,
    /// `<name`; the raw value is the name including a leading `?` or `!`.
    TagOpen,
    /// The `>` (or `?>`) ending an opening tag.
    TagEnd,
    /// The `/>` ending a self-closing tag.
    SelfClose,
    /// A whole close tag such as `</div >`.
    TagClose,
    /// An attribute name. Quoted names carry their quote character.
    AttrName,
    /// An attribute value; raw is `None` for a bare attribute.
    AttrValue,
    /// Comment text without the `<!--`/`-->` delimiters.
    Comment,
    /// CDATA text without the `<![CDATA[`/`]]>` delimiters.
    CDataText,
}

/// Immutable snapshot of one fragment.
///
/// The raw text is exactly what appeared in the input. [`ReaderState::value`]
/// gives the logical value, computed on first use: decoded text for text and
/// attribute values, the bare element name for tags.
#[derive(Debug, Clone)]
pub struct ReaderState {
    kind: FragmentKind,
    raw: Option<String>,
    quote: Option<char>,
    position: SourcePosition,
    logical: OnceCell<Option<String>>,
}

impl ReaderState {
    /// A fragment of `kind` starting at `position`.
    #[must_use]
    pub const fn new(kind: FragmentKind, raw: Option<String>, position: SourcePosition) -> Self {
        Self {
            kind,
            raw,
            quote: None,
            position,
            logical: OnceCell::new(),
        }
    }

    /// Record the quote character around the fragment.
    #[must_use]
    pub const fn with_quote(mut self, quote: Option<char>) -> Self {
        self.quote = quote;
        self
    }

    /// What the fragment is.
    #[must_use]
    pub const fn kind(&self) -> FragmentKind {
        self.kind
    }

    /// Raw text as read; `None` for a bare attribute's value.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Quote character, for quoted names and values.
    #[must_use]
    pub const fn quote(&self) -> Option<char> {
        self.quote
    }

    /// Where the fragment started.
    #[must_use]
    pub const fn position(&self) -> SourcePosition {
        self.position
    }

    /// Whether the fragment has no raw text (a bare attribute's value).
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.raw.is_none()
    }

    /// Logical value of the fragment.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        let raw = self.raw.as_deref()?;
        let logical = self.logical.get_or_init(|| match self.kind {
            FragmentKind::Text | FragmentKind::AttrValue => match decode_entities(raw) {
                Cow::Borrowed(_) => None,
                Cow::Owned(decoded) => Some(decoded),
            },
            FragmentKind::TagClose => Some(close_tag_name(raw).to_string()),
            FragmentKind::TagOpen => raw
                .strip_prefix(['?', '!'])
                .map(str::to_string),
            _ => None,
        });
        Some(logical.as_deref().unwrap_or(raw))
    }
}

/// The element name inside a raw close tag: `</div >` gives `div`.
#[must_use]
pub fn close_tag_name(raw: &str) -> &str {
    let inner = raw.strip_prefix("</").unwrap_or(raw);
    let end = inner
        .find(|c: char| is_html_whitespace(c) || c == '>' || c == '/')
        .unwrap_or(inner.len());
    &inner[..end]
}
