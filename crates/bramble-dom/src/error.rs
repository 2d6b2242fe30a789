//! Parse diagnostics and DOM operation errors.
//!
//! Malformed markup never aborts a parse. Each recovery is recorded as a
//! [`ParseError`] in the document-level list and, when the recovery concerns
//! a specific node, in that node's own list as well.
//!
//! [`DomError`] is the hard-failure type of the mutation API: it is returned
//! when a caller asks for an operation that would break the tree's shape.

use std::fmt;

use serde::Serialize;
use strum_macros::Display;
use thiserror::Error;

use crate::node::{NodeId, SourcePosition};

/// Category of a recorded parse problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum ParseErrorKind {
    /// A tag was still open (or never finished) when its parent closed or
    /// input ended.
    TagNotClosed,
    /// A close tag had no matching open element.
    TagNotOpened,
    /// An attribute name appeared twice on one element.
    DuplicateAttribute,
    /// Undecodable bytes were read and the document declared no encoding.
    EncodingError,
    /// The document declared an encoding that differs from the one the
    /// stream was decoded with, and no restart was possible.
    EncodingMismatch,
    /// A prefix could not be resolved to a namespace. Reserved; the reader
    /// keeps unresolved prefixes lexically instead of reporting them.
    NamespaceNotDeclared,
}

/// One recorded parse problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Position of the offending markup.
    pub position: SourcePosition,
    /// The node the problem is attached to, if any.
    pub node: Option<NodeId>,
    /// Human-readable detail.
    pub message: String,
}

impl ParseError {
    /// A new error at `position` not yet tied to a node.
    pub fn new(kind: ParseErrorKind, position: SourcePosition, message: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            node: None,
            message: message.into(),
        }
    }

    /// Attach the error to `node`.
    #[must_use]
    pub const fn on_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.position.line, self.position.column, self.kind, self.message
        )
    }
}

/// Errors returned by the DOM mutation API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The id does not name a node of this document.
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    /// The node already has a parent; detach it before inserting it again.
    #[error("node {0} is already attached")]
    AlreadyAttached(NodeId),

    /// Inserting the node would make it its own ancestor.
    #[error("inserting {child} under {parent} would create a cycle")]
    Cycle {
        /// Prospective parent.
        parent: NodeId,
        /// Node being inserted.
        child: NodeId,
    },

    /// The node cannot hold children (text, comments, query results).
    #[error("node {0} cannot have children")]
    InvalidParent(NodeId),

    /// The node can never be placed inside a tree (documents, query results).
    #[error("node {0} cannot be inserted into a tree")]
    InvalidChild(NodeId),

    /// The reference node is not a child of the given parent.
    #[error("node {reference} is not a child of {parent}")]
    NotAChild {
        /// Expected parent.
        parent: NodeId,
        /// Node that was expected among its children.
        reference: NodeId,
    },

    /// Inserting the node would make the tree deeper than
    /// [`MAX_TREE_DEPTH`](bramble_common::MAX_TREE_DEPTH).
    #[error("inserting {child} under {parent} would nest deeper than {limit} levels")]
    TooDeep {
        /// Prospective parent.
        parent: NodeId,
        /// Node being inserted.
        child: NodeId,
        /// The depth limit.
        limit: usize,
    },

    /// The operation needs an element.
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// The operation needs a text, comment or query-result node.
    #[error("node {0} holds no character data")]
    NotCharacterData(NodeId),

    /// An attribute index was out of range.
    #[error("element {element} has no attribute at index {index}")]
    AttributeNotFound {
        /// Owning element.
        element: NodeId,
        /// Requested index.
        index: usize,
    },

    /// An element or attribute name was empty.
    #[error("invalid name `{0}`")]
    InvalidName(String),

    /// A [`DomWriter`](crate::DomWriter) call needed an open element.
    #[error("no element is open in the writer")]
    NoOpenElement,
}
