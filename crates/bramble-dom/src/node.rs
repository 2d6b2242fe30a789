//! Node storage types.
//!
//! Nodes live in the [`Document`](crate::Document) arena and refer to each
//! other through [`NodeId`] indices. Structural fields are private; the
//! document's mutation API keeps parent, child and sibling links consistent
//! and invalidates cached serializations.

use std::cell::OnceCell;
use std::fmt;

use serde::Serialize;
use strum_macros::Display;

use crate::attribute::Attribute;
use crate::error::ParseError;
use crate::name::QualName;

/// Index of a node inside its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a fragment started in the decoded character stream.
///
/// Lines and columns are 1-based and count characters. `offset` is the
/// 0-based UTF-8 byte offset into the decoded text, so it can slice the
/// string that was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourcePosition {
    /// Line number.
    pub line: usize,
    /// Column number, in characters.
    pub column: usize,
    /// Byte offset from the start of the decoded text.
    pub offset: usize,
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl SourcePosition {
    /// Position of the character following `c`.
    #[must_use]
    pub const fn advance(self, c: char) -> Self {
        if c == '\n' {
            Self {
                line: self.line + 1,
                column: 1,
                offset: self.offset + 1,
            }
        } else {
            Self {
                line: self.line,
                column: self.column + 1,
                offset: self.offset + c.len_utf8(),
            }
        }
    }
}

/// Which flavor of markup an element was written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ElementKind {
    /// An ordinary element.
    #[default]
    Normal,
    /// `<?target ...?>`; attributes hold the instruction's data.
    ProcessingInstruction,
    /// A markup declaration such as `<!DOCTYPE html>`.
    Declaration,
}

/// How an element's extent ended in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Closing {
    /// No end tag was seen: closed by a sibling, an ancestor, or end of input.
    #[default]
    Implicit,
    /// Closed by a matching `</name>`.
    EndTag,
    /// Written as `<name/>`.
    SelfClosed,
}

/// Per-element overrides of the [`WriteFlags`](crate::WriteFlags) table.
/// `None` defers to the options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteHints {
    /// Override for `NO_CHILDREN`.
    pub no_children: Option<bool>,
    /// Override for `ALWAYS_CLOSE`.
    pub always_close: Option<bool>,
    /// Override for `DEFER_CLOSE_IF_EMPTY`.
    pub defer_close_if_empty: Option<bool>,
}

/// Element-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub(crate) name: QualName,
    pub(crate) kind: ElementKind,
    pub(crate) namespace: Option<String>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) closing: Closing,
    pub(crate) void: bool,
    pub(crate) hints: WriteHints,
}

impl ElementData {
    pub(crate) fn new(name: QualName, kind: ElementKind, void: bool) -> Self {
        Self {
            name,
            kind,
            namespace: None,
            attributes: Vec::new(),
            closing: Closing::Implicit,
            void,
            hints: WriteHints::default(),
        }
    }

    /// Qualified name, in source case.
    #[must_use]
    pub const fn name(&self) -> &QualName {
        &self.name
    }

    /// Markup flavor.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Namespace set directly on this element by an `xmlns` attribute.
    /// See [`Document::namespace_uri`](crate::Document::namespace_uri) for
    /// the resolved value.
    #[must_use]
    pub fn explicit_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Attributes in source order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// First attribute whose qualified name matches `name` (ASCII
    /// case-insensitive).
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name().matches(name))
    }

    /// How the element was closed.
    #[must_use]
    pub const fn closing(&self) -> Closing {
        self.closing
    }

    /// Whether the element was closed by an end tag or written self-closed.
    #[must_use]
    pub const fn is_explicitly_closed(&self) -> bool {
        matches!(self.closing, Closing::EndTag | Closing::SelfClosed)
    }

    /// Whether the element was read as a void element.
    #[must_use]
    pub const fn is_void(&self) -> bool {
        self.void
    }

    /// Serialization overrides.
    #[must_use]
    pub const fn write_hints(&self) -> WriteHints {
        self.hints
    }

    /// The `id` attribute value.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute("id").and_then(Attribute::raw_value)
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .and_then(Attribute::raw_value)
            .unwrap_or_default()
            .split_ascii_whitespace()
    }
}

/// Text node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextData {
    /// Raw text as read, with entities left encoded.
    pub text: String,
    /// Whether the text came from a `<![CDATA[...]]>` section.
    pub cdata: bool,
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The single document node at [`NodeId::ROOT`].
    Document,
    /// An element, processing instruction or declaration.
    Element(ElementData),
    /// Character data.
    Text(TextData),
    /// `<!--...-->`; holds the text between the delimiters.
    Comment(String),
    /// Synthetic leaf wrapping a non-node query result.
    QueryResult(String),
}

/// One arena slot.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) ordinal: usize,
    pub(crate) position: SourcePosition,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) outer_cache: OnceCell<String>,
    pub(crate) inner_cache: OnceCell<String>,
}

impl Node {
    pub(crate) const fn new(kind: NodeKind, ordinal: usize, position: SourcePosition) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            prev_sibling: None,
            next_sibling: None,
            ordinal,
            position,
            errors: Vec::new(),
            outer_cache: OnceCell::new(),
            inner_cache: OnceCell::new(),
        }
    }

    /// What the node is.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent node; `None` for the document and for detached nodes.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Previous sibling.
    #[must_use]
    pub const fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    /// Next sibling.
    #[must_use]
    pub const fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    /// Creation order; parsed nodes are numbered in stream order.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Where the node started in the source.
    #[must_use]
    pub const fn position(&self) -> SourcePosition {
        self.position
    }

    /// Errors recorded against this node.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Element data, if the node is an element.
    #[must_use]
    pub const fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Text data, if the node is a text node.
    #[must_use]
    pub const fn as_text(&self) -> Option<&TextData> {
        match &self.kind {
            NodeKind::Text(data) => Some(data),
            _ => None,
        }
    }

    /// Whether the node is an element whose name matches `name`.
    #[must_use]
    pub fn is_element_named(&self, name: &str) -> bool {
        self.as_element().is_some_and(|e| e.name.matches(name))
    }

    pub(crate) fn invalidate(&mut self) {
        let _ = self.outer_cache.take();
        let _ = self.inner_cache.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_advance_by_line() {
        let p = SourcePosition::default().advance('a').advance('\n').advance('b');
        assert_eq!((p.line, p.column, p.offset), (2, 2, 3));
    }

    #[test]
    fn offsets_count_bytes() {
        let p = SourcePosition::default().advance('ß').advance('\u{1F600}');
        assert_eq!((p.line, p.column, p.offset), (1, 3, 6));
    }
}
