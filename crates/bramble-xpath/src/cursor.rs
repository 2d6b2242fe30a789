//! The tree-cursor contract the evaluator runs on.
//!
//! A cursor stands on one node of some tree and moves in place. The XPath
//! evaluator only ever clones cursors and moves them, so any tree that can
//! implement [`TreeCursor`] can be queried without building a second tree.

use std::borrow::Cow;
use std::cmp::Ordering;

use bramble_common::MAX_TREE_DEPTH;
use strum_macros::Display;

/// What a cursor is standing on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CursorNodeType {
    /// The top of the tree.
    Root,
    /// An element.
    Element,
    /// An attribute of an element.
    Attribute,
    /// A namespace binding in scope on an element.
    Namespace,
    /// Character data.
    Text,
    /// A comment.
    Comment,
    /// A processing instruction.
    ProcessingInstruction,
    /// A synthetic leaf holding a scalar query result.
    Scalar,
}

/// Which namespace bindings the namespace axis visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum NamespaceScope {
    /// Every binding in scope, including the implicit `xml` prefix.
    #[default]
    All,
    /// Every binding in scope except `xml`.
    ExcludeXml,
    /// Only bindings declared on the element itself.
    Local,
}

/// A movable position in a tree.
///
/// Every `move_to_*` method returns `false` and leaves the cursor where it
/// was when the move is impossible.
pub trait TreeCursor: Clone {
    /// Kind of the current node.
    fn node_type(&self) -> CursorNodeType;

    /// Local name; the prefix for namespace nodes; the target for processing
    /// instructions; empty otherwise.
    fn local_name(&self) -> Cow<'_, str>;

    /// Namespace prefix, or empty.
    fn prefix(&self) -> Cow<'_, str>;

    /// Namespace URI, or empty.
    fn namespace_uri(&self) -> Cow<'_, str>;

    /// String value as defined by XPath.
    fn value(&self) -> Cow<'_, str>;

    /// Qualified name.
    fn name(&self) -> Cow<'_, str> {
        let prefix = self.prefix();
        if prefix.is_empty() {
            self.local_name()
        } else {
            Cow::Owned(format!("{prefix}:{}", self.local_name()))
        }
    }

    /// Move to the top of the navigable tree.
    fn move_to_root(&mut self);

    /// Move to the parent (the owning element for attributes and namespace
    /// nodes).
    fn move_to_parent(&mut self) -> bool;

    /// Move to the first child.
    fn move_to_first_child(&mut self) -> bool;

    /// Move to the next sibling.
    fn move_to_next_sibling(&mut self) -> bool;

    /// Move to the previous sibling.
    fn move_to_previous_sibling(&mut self) -> bool;

    /// Move from an element to its first attribute.
    fn move_to_first_attribute(&mut self) -> bool;

    /// Move to the next attribute of the same element.
    fn move_to_next_attribute(&mut self) -> bool;

    /// Move from an element to its first namespace node in `scope`.
    fn move_to_first_namespace(&mut self, scope: NamespaceScope) -> bool;

    /// Move to the next namespace node in `scope`.
    fn move_to_next_namespace(&mut self, scope: NamespaceScope) -> bool;

    /// Whether both cursors stand on the same node.
    fn is_same_position(&self, other: &Self) -> bool;

    /// Document order of the two positions.
    fn compare_position(&self, other: &Self) -> Ordering;

    /// A synthetic leaf in the same tree whose string value is `value`.
    #[must_use]
    fn scalar(&self, value: &str) -> Self;

    /// Number of parent moves needed to reach the top.
    fn depth(&self) -> usize {
        let mut cursor = self.clone();
        let mut depth = 0;
        while depth < MAX_TREE_DEPTH && cursor.move_to_parent() {
            depth += 1;
        }
        depth
    }
}
