//! [`TreeCursor`] over a live [`Document`].
//!
//! The navigator is a small value (a document reference plus a position),
//! so cloning it is cheap and queries never copy the tree. Declarations such
//! as `<!DOCTYPE>` are invisible to it.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::ptr;
use std::rc::Rc;

use bramble_common::MAX_TREE_DEPTH;
use bramble_dom::{Attribute, Document, ElementKind, Node, NodeId, NodeKind, XML_NAMESPACE};

use crate::cursor::{CursorNodeType, NamespaceScope, TreeCursor};

/// How a navigator reports one kind of string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseFolding {
    /// As stored.
    #[default]
    Preserve,
    /// ASCII lowercase.
    Lower,
    /// ASCII uppercase.
    Upper,
}

impl CaseFolding {
    fn apply(self, s: &str) -> Cow<'_, str> {
        match self {
            Self::Preserve => Cow::Borrowed(s),
            Self::Lower if s.bytes().any(|b| b.is_ascii_uppercase()) => {
                Cow::Owned(s.to_ascii_lowercase())
            }
            Self::Upper if s.bytes().any(|b| b.is_ascii_lowercase()) => {
                Cow::Owned(s.to_ascii_uppercase())
            }
            Self::Lower | Self::Upper => Cow::Borrowed(s),
        }
    }
}

/// Case folding for the navigator's accessors.
///
/// The default lowercases local names so that `//div` finds `<DIV>`, and
/// leaves everything else as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NavigatorSettings {
    /// Applied to local names.
    pub names: CaseFolding,
    /// Applied to string values.
    pub values: CaseFolding,
    /// Applied to prefixes.
    pub prefixes: CaseFolding,
    /// Applied to namespace URIs.
    pub namespaces: CaseFolding,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            names: CaseFolding::Lower,
            values: CaseFolding::Preserve,
            prefixes: CaseFolding::Preserve,
            namespaces: CaseFolding::Preserve,
        }
    }
}

impl NavigatorSettings {
    /// Report everything exactly as stored.
    #[must_use]
    pub const fn preserve_case() -> Self {
        Self {
            names: CaseFolding::Preserve,
            values: CaseFolding::Preserve,
            prefixes: CaseFolding::Preserve,
            namespaces: CaseFolding::Preserve,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Position {
    Node(NodeId),
    Attribute {
        element: NodeId,
        index: usize,
    },
    /// A namespace declaration attribute on `owner`, in scope at `element`.
    Namespace {
        element: NodeId,
        owner: NodeId,
        index: usize,
    },
    /// The implicit `xml` binding of `element`.
    XmlNamespace {
        element: NodeId,
    },
    Scalar(Rc<str>),
}

/// What a navigator points at, detached from the document borrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedItem {
    /// A node in the tree.
    Node(NodeId),
    /// An attribute, by element and index.
    Attribute {
        /// Owning element.
        element: NodeId,
        /// Index in the element's attribute list.
        index: usize,
    },
    /// A namespace binding.
    Namespace {
        /// Element the binding is in scope on.
        element: NodeId,
        /// Bound prefix; empty for the default namespace.
        prefix: String,
        /// Namespace URI.
        uri: String,
    },
    /// A scalar query result.
    Scalar(String),
}

/// A cursor over a [`Document`].
#[derive(Debug, Clone)]
pub struct DomNavigator<'a> {
    doc: &'a Document,
    position: Position,
    root: Option<NodeId>,
    settings: NavigatorSettings,
}

impl<'a> DomNavigator<'a> {
    /// A navigator standing on `node` that can move anywhere in `doc`.
    #[must_use]
    pub fn new(doc: &'a Document, node: NodeId) -> Self {
        Self {
            doc,
            position: Position::Node(node),
            root: None,
            settings: NavigatorSettings::default(),
        }
    }

    /// Confine the navigator to the subtree of the node it stands on: it
    /// will not move above it, and `/` in queries means that node.
    #[must_use]
    pub fn with_root_boundary(mut self) -> Self {
        if let Position::Node(id) = self.position {
            self.root = Some(id);
        }
        self
    }

    /// Replace the case-folding settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: NavigatorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The document being navigated.
    #[must_use]
    pub const fn document(&self) -> &'a Document {
        self.doc
    }

    /// The tree node under the cursor, or the owning element for attributes
    /// and namespace nodes. `None` for scalars.
    #[must_use]
    pub const fn node_id(&self) -> Option<NodeId> {
        match &self.position {
            Position::Node(id)
            | Position::Attribute { element: id, .. }
            | Position::Namespace { element: id, .. }
            | Position::XmlNamespace { element: id } => Some(*id),
            Position::Scalar(_) => None,
        }
    }

    /// The attribute under the cursor.
    #[must_use]
    pub fn attribute(&self) -> Option<&'a Attribute> {
        match self.position {
            Position::Attribute { element, index } => {
                self.doc.element(element)?.attributes().get(index)
            }
            _ => None,
        }
    }

    /// What the cursor points at, as an owned value.
    #[must_use]
    pub fn item(&self) -> SelectedItem {
        match &self.position {
            Position::Node(id) => SelectedItem::Node(*id),
            Position::Attribute { element, index } => SelectedItem::Attribute {
                element: *element,
                index: *index,
            },
            Position::Namespace { element, .. } | Position::XmlNamespace { element } => {
                SelectedItem::Namespace {
                    element: *element,
                    prefix: self.local_name().into_owned(),
                    uri: self.value().into_owned(),
                }
            }
            Position::Scalar(value) => SelectedItem::Scalar(value.to_string()),
        }
    }

    fn is_visible(&self, id: NodeId) -> bool {
        match self.doc.get(id).map(Node::kind) {
            Some(NodeKind::Element(data)) => data.kind() != ElementKind::Declaration,
            Some(NodeKind::QueryResult(_)) | None => false,
            Some(_) => true,
        }
    }

    fn top(&self) -> NodeId {
        self.root.unwrap_or_else(|| self.doc.root())
    }

    // =========================================================================
    // Namespace axis
    // =========================================================================

    /// The prefix declared by a namespace attribute: `xmlns:p` gives `p`,
    /// `xmlns` gives the empty string.
    fn declared_prefix(attribute: &Attribute) -> Option<&str> {
        let name = attribute.name();
        if !name.is_namespace_declaration() {
            return None;
        }
        Some(if name.prefix().is_some() {
            name.local_name()
        } else {
            ""
        })
    }

    fn declares(&self, element: NodeId, prefix: &str) -> bool {
        self.doc.element(element).is_some_and(|data| {
            data.attributes()
                .iter()
                .any(|a| Self::declared_prefix(a).is_some_and(|p| p.eq_ignore_ascii_case(prefix)))
        })
    }

    /// Whether a declaration of `prefix` on `owner` is hidden by one on an
    /// element between `element` and `owner`.
    fn is_shadowed(&self, element: NodeId, owner: NodeId, prefix: &str) -> bool {
        std::iter::once(element)
            .chain(self.doc.ancestors(element))
            .take(MAX_TREE_DEPTH)
            .take_while(|&id| id != owner)
            .any(|id| self.declares(id, prefix))
    }

    /// First visible namespace declaration at or after (`owner`, `index`).
    fn find_namespace(
        &self,
        element: NodeId,
        mut owner: NodeId,
        mut index: usize,
        scope: NamespaceScope,
    ) -> Option<Position> {
        for _ in 0..MAX_TREE_DEPTH {
            if let Some(data) = self.doc.element(owner) {
                for (i, attribute) in data.attributes().iter().enumerate().skip(index) {
                    let Some(prefix) = Self::declared_prefix(attribute) else {
                        continue;
                    };
                    let bound = attribute.raw_value().is_some_and(|uri| !uri.is_empty());
                    if bound
                        && !prefix.eq_ignore_ascii_case("xml")
                        && !self.is_shadowed(element, owner, prefix)
                    {
                        return Some(Position::Namespace {
                            element,
                            owner,
                            index: i,
                        });
                    }
                }
            }
            if scope == NamespaceScope::Local || Some(owner) == self.root {
                break;
            }
            match self.doc.parent(owner) {
                Some(parent) => {
                    owner = parent;
                    index = 0;
                }
                None => break,
            }
        }
        (scope == NamespaceScope::All).then_some(Position::XmlNamespace { element })
    }

    // =========================================================================
    // Document order
    // =========================================================================

    /// Sort key: the pre-order rank of the node (or of the element owning
    /// an attribute or namespace), then namespaces before attributes.
    fn order_key(&self) -> (usize, [usize; 3]) {
        let rank = |id: NodeId| self.doc.tree_order(id).unwrap_or(usize::MAX);
        match &self.position {
            Position::Node(id) => (rank(*id), [0; 3]),
            Position::Namespace {
                element,
                owner,
                index,
            } => {
                let distance = self.doc.depth(*element).saturating_sub(self.doc.depth(*owner));
                (rank(*element), [1, distance, *index])
            }
            Position::XmlNamespace { element } => (rank(*element), [1, usize::MAX, 0]),
            Position::Attribute { element, index } => (rank(*element), [2, *index, 0]),
            Position::Scalar(_) => (usize::MAX, [usize::MAX; 3]),
        }
    }
}

impl TreeCursor for DomNavigator<'_> {
    fn node_type(&self) -> CursorNodeType {
        match &self.position {
            Position::Attribute { .. } => CursorNodeType::Attribute,
            Position::Namespace { .. } | Position::XmlNamespace { .. } => CursorNodeType::Namespace,
            Position::Scalar(_) => CursorNodeType::Scalar,
            Position::Node(id) => match self.doc.get(*id).map(Node::kind) {
                Some(NodeKind::Document) | None => CursorNodeType::Root,
                Some(NodeKind::Element(data)) => match data.kind() {
                    ElementKind::ProcessingInstruction => CursorNodeType::ProcessingInstruction,
                    _ => CursorNodeType::Element,
                },
                Some(NodeKind::Text(_)) => CursorNodeType::Text,
                Some(NodeKind::Comment(_)) => CursorNodeType::Comment,
                Some(NodeKind::QueryResult(_)) => CursorNodeType::Scalar,
            },
        }
    }

    fn local_name(&self) -> Cow<'_, str> {
        match &self.position {
            Position::Node(id) => self.doc.name(*id).map_or(Cow::Borrowed(""), |name| {
                self.settings.names.apply(name.local_name())
            }),
            Position::Attribute { .. } => self.attribute().map_or(Cow::Borrowed(""), |a| {
                self.settings.names.apply(a.name().local_name())
            }),
            Position::Namespace { owner, index, .. } => self
                .doc
                .element(*owner)
                .and_then(|data| data.attributes().get(*index))
                .and_then(Self::declared_prefix)
                .map_or(Cow::Borrowed(""), |p| self.settings.prefixes.apply(p)),
            Position::XmlNamespace { .. } => Cow::Borrowed("xml"),
            Position::Scalar(_) => Cow::Borrowed(""),
        }
    }

    fn prefix(&self) -> Cow<'_, str> {
        let prefix = match &self.position {
            Position::Node(id) => self.doc.name(*id).and_then(|n| n.prefix()),
            Position::Attribute { .. } => self.attribute().and_then(|a| a.name().prefix()),
            _ => None,
        };
        prefix.map_or(Cow::Borrowed(""), |p| self.settings.prefixes.apply(p))
    }

    fn namespace_uri(&self) -> Cow<'_, str> {
        let uri = match &self.position {
            Position::Node(id) => self.doc.namespace_uri(*id),
            Position::Attribute { element, .. } => self
                .attribute()
                .and_then(|a| self.doc.attribute_namespace_uri(*element, a)),
            _ => None,
        };
        uri.map_or(Cow::Borrowed(""), |u| self.settings.namespaces.apply(u))
    }

    fn value(&self) -> Cow<'_, str> {
        let folding = self.settings.values;
        match &self.position {
            Position::Scalar(value) => Cow::Borrowed(&**value),
            Position::XmlNamespace { .. } => Cow::Borrowed(XML_NAMESPACE),
            Position::Namespace { owner, index, .. } => self
                .doc
                .element(*owner)
                .and_then(|data| data.attributes().get(*index))
                .and_then(Attribute::raw_value)
                .map_or(Cow::Borrowed(""), |uri| self.settings.namespaces.apply(uri)),
            Position::Attribute { .. } => match self.attribute() {
                Some(attribute) => match attribute.value() {
                    Cow::Borrowed(value) => folding.apply(value),
                    Cow::Owned(value) => Cow::Owned(folding.apply(&value).into_owned()),
                },
                None => Cow::Borrowed(""),
            },
            Position::Node(id) => match self.doc.get(*id).map(Node::kind) {
                Some(NodeKind::Comment(text) | NodeKind::QueryResult(text)) => folding.apply(text),
                Some(NodeKind::Element(data))
                    if data.kind() == ElementKind::ProcessingInstruction =>
                {
                    let markup = self.doc.outer_html(*id);
                    let body = markup
                        .strip_prefix("<?")
                        .and_then(|m| m.strip_suffix("?>"))
                        .unwrap_or(markup);
                    let data = body
                        .strip_prefix(data.name().to_string().as_str())
                        .unwrap_or(body);
                    folding.apply(data.trim())
                }
                Some(_) => Cow::Owned(folding.apply(&self.doc.inner_text(*id)).into_owned()),
                None => Cow::Borrowed(""),
            },
        }
    }

    fn move_to_root(&mut self) {
        self.position = Position::Node(self.top());
    }

    fn move_to_parent(&mut self) -> bool {
        let parent = match &self.position {
            Position::Node(id) => {
                if Some(*id) == self.root {
                    return false;
                }
                match self.doc.parent(*id) {
                    Some(parent) => parent,
                    None => return false,
                }
            }
            Position::Attribute { element, .. }
            | Position::Namespace { element, .. }
            | Position::XmlNamespace { element } => *element,
            Position::Scalar(_) => return false,
        };
        self.position = Position::Node(parent);
        true
    }

    fn move_to_first_child(&mut self) -> bool {
        let Position::Node(id) = self.position else {
            return false;
        };
        let child = self
            .doc
            .children(id)
            .iter()
            .copied()
            .find(|&c| self.is_visible(c));
        match child {
            Some(child) => {
                self.position = Position::Node(child);
                true
            }
            None => false,
        }
    }

    fn move_to_next_sibling(&mut self) -> bool {
        let Position::Node(id) = self.position else {
            return false;
        };
        if Some(id) == self.root {
            return false;
        }
        let mut next = self.doc.next_sibling(id);
        while let Some(candidate) = next {
            if self.is_visible(candidate) {
                self.position = Position::Node(candidate);
                return true;
            }
            next = self.doc.next_sibling(candidate);
        }
        false
    }

    fn move_to_previous_sibling(&mut self) -> bool {
        let Position::Node(id) = self.position else {
            return false;
        };
        if Some(id) == self.root {
            return false;
        }
        let mut prev = self.doc.prev_sibling(id);
        while let Some(candidate) = prev {
            if self.is_visible(candidate) {
                self.position = Position::Node(candidate);
                return true;
            }
            prev = self.doc.prev_sibling(candidate);
        }
        false
    }

    fn move_to_first_attribute(&mut self) -> bool {
        let Position::Node(id) = self.position else {
            return false;
        };
        let has_attributes = self
            .doc
            .element(id)
            .is_some_and(|data| data.kind() == ElementKind::Normal && !data.attributes().is_empty());
        if has_attributes {
            self.position = Position::Attribute {
                element: id,
                index: 0,
            };
        }
        has_attributes
    }

    fn move_to_next_attribute(&mut self) -> bool {
        let Position::Attribute { element, index } = self.position else {
            return false;
        };
        let count = self.doc.element(element).map_or(0, |d| d.attributes().len());
        if index + 1 < count {
            self.position = Position::Attribute {
                element,
                index: index + 1,
            };
            true
        } else {
            false
        }
    }

    fn move_to_first_namespace(&mut self, scope: NamespaceScope) -> bool {
        let Position::Node(id) = self.position else {
            return false;
        };
        if self.doc.element(id).is_none() {
            return false;
        }
        match self.find_namespace(id, id, 0, scope) {
            Some(position) => {
                self.position = position;
                true
            }
            None => false,
        }
    }

    fn move_to_next_namespace(&mut self, scope: NamespaceScope) -> bool {
        let Position::Namespace {
            element,
            owner,
            index,
        } = self.position
        else {
            return false;
        };
        match self.find_namespace(element, owner, index + 1, scope) {
            Some(position) => {
                self.position = position;
                true
            }
            None => false,
        }
    }

    fn is_same_position(&self, other: &Self) -> bool {
        ptr::eq(self.doc, other.doc) && self.position == other.position
    }

    fn compare_position(&self, other: &Self) -> Ordering {
        if self.is_same_position(other) {
            return Ordering::Equal;
        }
        self.order_key().cmp(&other.order_key())
    }

    fn scalar(&self, value: &str) -> Self {
        Self {
            doc: self.doc,
            position: Position::Scalar(Rc::from(value)),
            root: self.root,
            settings: self.settings,
        }
    }
}
