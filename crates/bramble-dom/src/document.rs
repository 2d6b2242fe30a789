//! The document arena and its mutation API.
//!
//! Every structural change goes through [`Document`] so that three things
//! stay true at all times:
//!
//! - parent, child and sibling links agree with each other;
//! - no node is its own ancestor;
//! - cached serializations of the changed node and all of its ancestors are
//!   dropped, so the next read re-renders them.
//!
//! Nodes removed from the tree stay in the arena as detached nodes and can be
//! re-inserted.

use std::borrow::Cow;
use std::cell::OnceCell;
use std::sync::Arc;

use bramble_common::MAX_TREE_DEPTH;

use crate::attribute::Attribute;
use crate::error::{DomError, ParseError};
use crate::name::QualName;
use crate::node::{
    Closing, ElementData, ElementKind, Node, NodeId, NodeKind, SourcePosition, TextData,
    WriteHints,
};
use crate::options::{HtmlOptions, ReadFlags};

/// Where an attribute ended up after [`Document::put_attribute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSlot {
    /// Index in the element's attribute list.
    pub index: usize,
    /// The attribute that previously occupied the slot, when the name was
    /// already present.
    pub replaced: Option<Attribute>,
}

/// First-seen `html`, `head`, `body` and doctype nodes.
#[derive(Debug, Clone, Copy, Default)]
struct Landmarks {
    html: Option<NodeId>,
    head: Option<NodeId>,
    body: Option<NodeId>,
    doctype: Option<NodeId>,
}

/// An HTML document: a node arena plus document-level state.
///
/// [`NodeId::ROOT`] is the document node. Everything else is created through
/// the `create_*` methods, starts detached, and becomes part of the tree once
/// it is inserted under the root or one of its descendants.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    options: Arc<HtmlOptions>,
    errors: Vec<ParseError>,
    next_ordinal: usize,
    xhtml: bool,
    declared_encoding: Option<&'static str>,
    stream_encoding: Option<&'static str>,
    restarted: bool,
    pub(crate) declared_namespaces: Vec<(String, String)>,
    landmarks: Landmarks,
    /// Pre-order rank of every arena slot; dropped on any structural change.
    tree_order: OnceCell<Vec<usize>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document using the shared default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(HtmlOptions::shared_default())
    }

    /// An empty document using `options`.
    #[must_use]
    pub fn with_options(options: Arc<HtmlOptions>) -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document, 0, SourcePosition::default())],
            options,
            errors: Vec::new(),
            next_ordinal: 1,
            xhtml: false,
            declared_encoding: None,
            stream_encoding: None,
            restarted: false,
            declared_namespaces: Vec::new(),
            landmarks: Landmarks::default(),
            tree_order: OnceCell::new(),
        }
    }

    /// Options the document was read with; also consulted when writing.
    #[must_use]
    pub const fn options(&self) -> &Arc<HtmlOptions> {
        &self.options
    }

    /// The document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of arena slots, including detached nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::NodeNotFound(id))
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(data) => Ok(data),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    fn alloc(&mut self, kind: NodeKind, position: SourcePosition) -> NodeId {
        let id = NodeId(self.nodes.len());
        let ordinal = self.take_ordinal();
        self.nodes.push(Node::new(kind, ordinal, position));
        self.tree_order = OnceCell::new();
        id
    }

    fn take_ordinal(&mut self) -> usize {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        ordinal
    }

    /// Create a detached element. The void flag comes from the read table.
    /// Unlike parsed elements, created ones are written with an end tag.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidName`] for an empty name.
    pub fn create_element(&mut self, name: &str) -> Result<NodeId, DomError> {
        let id = self.create_element_at(name, ElementKind::Normal, SourcePosition::default())?;
        self.element_mut(id)?.closing = Closing::EndTag;
        Ok(id)
    }

    /// Create a detached element of the given kind, recording where it
    /// started in the source. Processing instructions and declarations are
    /// always void.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidName`] for an empty name.
    pub fn create_element_at(
        &mut self,
        name: &str,
        kind: ElementKind,
        position: SourcePosition,
    ) -> Result<NodeId, DomError> {
        if name.is_empty() {
            return Err(DomError::InvalidName(name.to_string()));
        }
        let void = kind != ElementKind::Normal
            || self.options.read_flags(name).contains(ReadFlags::VOID);
        let data = ElementData::new(QualName::parse(name), kind, void);
        Ok(self.alloc(NodeKind::Element(data), position))
    }

    /// Create a detached processing instruction `<?target?>`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidName`] for an empty target.
    pub fn create_processing_instruction(&mut self, target: &str) -> Result<NodeId, DomError> {
        self.create_element_at(
            target,
            ElementKind::ProcessingInstruction,
            SourcePosition::default(),
        )
    }

    /// Create a detached text node holding raw markup text. Use
    /// [`encode_text`](crate::encode_text) first for arbitrary strings.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.create_text_at(text, false, SourcePosition::default())
    }

    /// Create a detached CDATA section.
    pub fn create_cdata(&mut self, text: &str) -> NodeId {
        self.create_text_at(text, true, SourcePosition::default())
    }

    /// Create a detached text node with its source position.
    pub fn create_text_at(&mut self, text: &str, cdata: bool, position: SourcePosition) -> NodeId {
        let data = TextData {
            text: text.to_string(),
            cdata,
        };
        self.alloc(NodeKind::Text(data), position)
    }

    /// Create a detached comment.
    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.create_comment_at(data, SourcePosition::default())
    }

    /// Create a detached comment with its source position.
    pub fn create_comment_at(&mut self, data: &str, position: SourcePosition) -> NodeId {
        self.alloc(NodeKind::Comment(data.to_string()), position)
    }

    /// Create a synthetic leaf wrapping a scalar query result. Such nodes
    /// cannot be inserted into the tree.
    pub fn create_query_result(&mut self, value: &str) -> NodeId {
        self.alloc(NodeKind::QueryResult(value.to_string()), SourcePosition::default())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Parent of `id`.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Children of `id`; empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], Node::children)
    }

    /// First child of `id`.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Last child of `id`.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Next sibling of `id`.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::next_sibling)
    }

    /// Previous sibling of `id`.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::prev_sibling)
    }

    /// Element data of `id`, if it is an element.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Qualified name of `id`, if it is an element.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&QualName> {
        self.element(id).map(ElementData::name)
    }

    /// Ancestors of `id`, nearest first, bounded by [`MAX_TREE_DEPTH`].
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
            remaining: MAX_TREE_DEPTH,
        }
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Number of ancestors between `id` and the top of its tree. The document
    /// node has depth 0.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Rank of `id` in a pre-order walk of the arena: the document tree
    /// first, then each detached tree in order of its top node's slot.
    ///
    /// Computed for all nodes at once on first use and kept until the next
    /// structural change, so comparing two ranks is constant time.
    #[must_use]
    pub fn tree_order(&self, id: NodeId) -> Option<usize> {
        self.tree_order
            .get_or_init(|| self.compute_tree_order())
            .get(id.0)
            .copied()
    }

    fn compute_tree_order(&self) -> Vec<usize> {
        let mut order = vec![0; self.nodes.len()];
        let mut rank = 0;
        let tops = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(index, _)| NodeId(index));
        for top in tops {
            for id in std::iter::once(top).chain(self.descendants(top)) {
                order[id.0] = rank;
                rank += 1;
            }
        }
        order
    }

    /// Whether `ancestor` is a proper ancestor of `id`.
    #[must_use]
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Whether `id` is reachable from the document node.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == NodeId::ROOT || self.ancestors(id).any(|a| a == NodeId::ROOT)
    }

    // =========================================================================
    // Structural mutation
    // =========================================================================

    /// Append `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails if either node is missing, `parent` cannot hold children,
    /// `child` is already attached or cannot be placed in a tree, or the
    /// insertion would create a cycle or nest deeper than
    /// [`MAX_TREE_DEPTH`] ([`DomError::TooDeep`]).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        let index = self.children(parent).len();
        self.link(parent, child, index);
        Ok(())
    }

    /// Insert `child` as the first child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`append_child`](Self::append_child).
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        self.link(parent, child, 0);
        Ok(())
    }

    /// Insert `child` immediately before `reference`, a child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`append_child`](Self::append_child); also
    /// [`DomError::NotAChild`] if `reference` is not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        let index = self.child_index(parent, reference)?;
        self.link(parent, child, index);
        Ok(())
    }

    /// Insert `child` immediately after `reference`, a child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`insert_before`](Self::insert_before).
    pub fn insert_after(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        let index = self.child_index(parent, reference)?;
        self.link(parent, child, index + 1);
        Ok(())
    }

    /// Put `new_child` where `old_child` was and detach `old_child`.
    ///
    /// # Errors
    ///
    /// See [`insert_before`](Self::insert_before).
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<(), DomError> {
        self.check_insertable(parent, new_child)?;
        let index = self.child_index(parent, old_child)?;
        self.unlink(old_child);
        self.link(parent, new_child, index);
        Ok(())
    }

    /// Detach `id` (and its subtree) from its parent. Detaching a node that
    /// has no parent does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NodeNotFound`] for an unknown id.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        let _ = self.node(id)?;
        self.unlink(id);
        Ok(())
    }

    /// Copy `id`, and with `deep` its whole subtree, into new detached nodes.
    /// Errors recorded on the source nodes are not copied.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NodeNotFound`] for an unknown id and
    /// [`DomError::InvalidChild`] for the document node.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> Result<NodeId, DomError> {
        if matches!(self.node(id)?.kind, NodeKind::Document) {
            return Err(DomError::InvalidChild(id));
        }
        let copy = self.copy_node(id)?;
        if !deep {
            return Ok(copy);
        }

        let mut pending: Vec<(NodeId, NodeId)> = vec![(id, copy)];
        while let Some((from, to)) = pending.pop() {
            for child in self.children(from).to_vec() {
                let child_copy = self.copy_node(child)?;
                let index = self.children(to).len();
                self.link(to, child_copy, index);
                pending.push((child, child_copy));
            }
        }
        Ok(copy)
    }

    fn copy_node(&mut self, id: NodeId) -> Result<NodeId, DomError> {
        let source = self.node(id)?;
        let (kind, position) = (source.kind.clone(), source.position);
        let copy = self.alloc(kind, position);
        self.renumber_attributes(copy);
        Ok(copy)
    }

    fn renumber_attributes(&mut self, id: NodeId) {
        let count = self.element(id).map_or(0, |e| e.attributes.len());
        for index in 0..count {
            let ordinal = self.take_ordinal();
            if let Ok(element) = self.element_mut(id)
                && let Some(attr) = element.attributes.get_mut(index)
            {
                attr.ordinal = ordinal;
            }
        }
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_node = self.node(parent)?;
        if !matches!(parent_node.kind, NodeKind::Document | NodeKind::Element(_)) {
            return Err(DomError::InvalidParent(parent));
        }
        let child_node = self.node(child)?;
        if matches!(child_node.kind, NodeKind::Document | NodeKind::QueryResult(_)) {
            return Err(DomError::InvalidChild(child));
        }
        if child_node.parent.is_some() {
            return Err(DomError::AlreadyAttached(child));
        }
        if child == parent || self.is_ancestor_of(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }
        if self.depth(parent) + 1 + self.height(child) > MAX_TREE_DEPTH {
            return Err(DomError::TooDeep {
                parent,
                child,
                limit: MAX_TREE_DEPTH,
            });
        }
        Ok(())
    }

    /// Levels below `id`: 0 for a leaf.
    fn height(&self, id: NodeId) -> usize {
        let mut height = 0;
        let mut stack = vec![(id, 0)];
        while let Some((node_id, level)) = stack.pop() {
            height = height.max(level);
            stack.extend(self.children(node_id).iter().map(|c| (*c, level + 1)));
        }
        height
    }

    fn child_index(&self, parent: NodeId, reference: NodeId) -> Result<usize, DomError> {
        self.children(parent)
            .iter()
            .position(|c| *c == reference)
            .ok_or(DomError::NotAChild { parent, reference })
    }

    fn link(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let siblings = &mut self.nodes[parent.0].children;
        let index = index.min(siblings.len());
        let prev = index.checked_sub(1).map(|i| siblings[i]);
        let next = siblings.get(index).copied();
        siblings.insert(index, child);
        self.tree_order = OnceCell::new();

        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.prev_sibling = prev;
        node.next_sibling = next;
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = Some(child);
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = Some(child);
        }

        self.invalidate(parent);
        self.note_attached(child);
    }

    fn unlink(&mut self, child: NodeId) {
        let node = &mut self.nodes[child.0];
        let Some(parent) = node.parent.take() else {
            return;
        };
        let prev = node.prev_sibling.take();
        let next = node.next_sibling.take();

        let siblings = &mut self.nodes[parent.0].children;
        if let Some(index) = siblings.iter().position(|c| *c == child) {
            let _ = siblings.remove(index);
        }
        self.tree_order = OnceCell::new();
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = next;
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = prev;
        }

        self.invalidate(parent);
        self.note_detached(child);
    }

    /// Drop cached serializations of `id` and every ancestor.
    pub(crate) fn invalidate(&mut self, id: NodeId) {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(node_id) = current
            && steps <= MAX_TREE_DEPTH
        {
            let Some(node) = self.nodes.get_mut(node_id.0) else {
                break;
            };
            node.invalidate();
            current = node.parent;
            steps += 1;
        }
    }

    fn invalidate_all(&mut self) {
        for node in &mut self.nodes {
            node.invalidate();
        }
    }

    // =========================================================================
    // Character data
    // =========================================================================

    /// Raw character data of a text, comment or query-result node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeKind::Text(data) => Some(&data.text),
            NodeKind::Comment(data) | NodeKind::QueryResult(data) => Some(data),
            _ => None,
        }
    }

    /// Replace the raw character data of a text, comment or query-result node.
    ///
    /// # Errors
    ///
    /// Fails if `id` is missing or holds no character data.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(data) => text.clone_into(&mut data.text),
            NodeKind::Comment(data) | NodeKind::QueryResult(data) => text.clone_into(data),
            _ => return Err(DomError::NotCharacterData(id)),
        }
        self.invalidate(id);
        Ok(())
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Attribute of `element` whose qualified name matches `name`.
    #[must_use]
    pub fn attribute(&self, element: NodeId, name: &str) -> Option<&Attribute> {
        self.element(element)?.attribute(name)
    }

    /// Decoded value of an attribute; bare attributes yield `""`.
    #[must_use]
    pub fn attribute_value(&self, element: NodeId, name: &str) -> Option<Cow<'_, str>> {
        self.attribute(element, name).map(Attribute::value)
    }

    /// Set a raw attribute value, replacing an existing attribute of the same
    /// name. Returns the replaced attribute.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAnElement`] unless `element` is an element.
    pub fn set_attribute(
        &mut self,
        element: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<Option<Attribute>, DomError> {
        Ok(self.put_attribute(element, Attribute::new(name, value))?.replaced)
    }

    /// Insert `attribute`, or replace the attribute with the same local name
    /// and namespace in place. A replaced attribute keeps its position in
    /// the list.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAnElement`] unless `element` is an element, and
    /// [`DomError::InvalidName`] for an attribute with an empty local name.
    pub fn put_attribute(
        &mut self,
        element: NodeId,
        mut attribute: Attribute,
    ) -> Result<AttributeSlot, DomError> {
        let data = self.element(element).ok_or_else(|| self.not_element(element))?;
        if attribute.name().local_name().is_empty() {
            return Err(DomError::InvalidName(attribute.name().to_string()));
        }
        let existing = data
            .attributes
            .iter()
            .position(|a| self.same_attribute(element, a.name(), attribute.name()));

        let slot = if let Some(index) = existing {
            let attrs = &mut self.element_mut(element)?.attributes;
            attribute.ordinal = attrs[index].ordinal;
            let old = std::mem::replace(&mut attrs[index], attribute);
            AttributeSlot {
                index,
                replaced: Some(old),
            }
        } else {
            attribute.ordinal = self.take_ordinal();
            let attrs = &mut self.element_mut(element)?.attributes;
            attrs.push(attribute);
            AttributeSlot {
                index: attrs.len() - 1,
                replaced: None,
            }
        };

        self.refresh_explicit_namespace(element);
        self.invalidate(element);
        Ok(slot)
    }

    /// Change the raw value (and recorded quote) of the attribute at `index`.
    ///
    /// # Errors
    ///
    /// Fails if `element` is not an element or has no attribute at `index`.
    pub fn set_attribute_value_at(
        &mut self,
        element: NodeId,
        index: usize,
        value: Option<&str>,
        quote: Option<char>,
    ) -> Result<(), DomError> {
        let attr = self
            .element_mut(element)?
            .attributes
            .get_mut(index)
            .ok_or(DomError::AttributeNotFound { element, index })?;
        attr.set_value(value.map(str::to_string), quote);
        self.refresh_explicit_namespace(element);
        self.invalidate(element);
        Ok(())
    }

    /// Remove the attribute whose qualified name matches `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAnElement`] unless `element` is an element.
    pub fn remove_attribute(
        &mut self,
        element: NodeId,
        name: &str,
    ) -> Result<Option<Attribute>, DomError> {
        let attrs = &mut self.element_mut(element)?.attributes;
        let removed = attrs
            .iter()
            .position(|a| a.name().matches(name))
            .map(|index| attrs.remove(index));
        if removed.is_some() {
            self.refresh_explicit_namespace(element);
            self.invalidate(element);
        }
        Ok(removed)
    }

    fn not_element(&self, id: NodeId) -> DomError {
        if self.get(id).is_some() {
            DomError::NotAnElement(id)
        } else {
            DomError::NodeNotFound(id)
        }
    }

    /// Two attribute names collide when their local names match and their
    /// prefixes match or resolve to the same namespace.
    fn same_attribute(&self, element: NodeId, a: &QualName, b: &QualName) -> bool {
        if !a.local_name().eq_ignore_ascii_case(b.local_name()) {
            return false;
        }
        match (a.prefix(), b.prefix()) {
            (None, None) => true,
            (Some(x), Some(y)) if x.eq_ignore_ascii_case(y) => true,
            (Some(x), Some(y)) => {
                let x = self.lookup_namespace(element, x);
                x.is_some() && x == self.lookup_namespace(element, y)
            }
            _ => false,
        }
    }

    /// Re-derive the element's own namespace from its `xmlns` attribute.
    fn refresh_explicit_namespace(&mut self, element: NodeId) {
        let namespace = self
            .attribute(element, "xmlns")
            .and_then(Attribute::raw_value)
            .filter(|uri| !uri.is_empty() && !self.options.is_empty_namespace(uri))
            .map(str::to_string);
        if let Ok(data) = self.element_mut(element) {
            data.namespace = namespace;
        }
    }

    // =========================================================================
    // Element state
    // =========================================================================

    /// Record how an element was closed.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAnElement`] unless `element` is an element.
    pub fn set_closing(&mut self, element: NodeId, closing: Closing) -> Result<(), DomError> {
        self.element_mut(element)?.closing = closing;
        self.invalidate(element);
        Ok(())
    }

    /// Replace an element's serialization overrides.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAnElement`] unless `element` is an element.
    pub fn set_write_hints(&mut self, element: NodeId, hints: WriteHints) -> Result<(), DomError> {
        self.element_mut(element)?.hints = hints;
        self.invalidate(element);
        Ok(())
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Record a parse error in the document list and, when it names a node,
    /// in that node's list.
    pub fn add_error(&mut self, error: ParseError) {
        if let Some(node) = error.node.and_then(|id| self.nodes.get_mut(id.0)) {
            node.errors.push(error.clone());
        }
        self.errors.push(error);
    }

    /// All recorded parse errors in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Errors recorded against `id`.
    #[must_use]
    pub fn node_errors(&self, id: NodeId) -> &[ParseError] {
        self.get(id).map_or(&[], Node::errors)
    }

    // =========================================================================
    // Document state
    // =========================================================================

    /// Whether the document is written as XHTML.
    #[must_use]
    pub const fn is_xhtml(&self) -> bool {
        self.xhtml
    }

    /// Switch XHTML output on or off.
    pub fn set_xhtml(&mut self, xhtml: bool) {
        if self.xhtml != xhtml {
            self.xhtml = xhtml;
            self.invalidate_all();
        }
    }

    /// Encoding named by the document's own `<meta>` declaration.
    #[must_use]
    pub const fn declared_encoding(&self) -> Option<&'static str> {
        self.declared_encoding
    }

    /// Record the encoding named by the document.
    pub const fn set_declared_encoding(&mut self, encoding: Option<&'static str>) {
        self.declared_encoding = encoding;
    }

    /// Encoding the character stream was actually decoded with.
    #[must_use]
    pub const fn stream_encoding(&self) -> Option<&'static str> {
        self.stream_encoding
    }

    /// Record the encoding the stream was decoded with.
    pub const fn set_stream_encoding(&mut self, encoding: Option<&'static str>) {
        self.stream_encoding = encoding;
    }

    /// Whether parsing was restarted after an encoding declaration.
    #[must_use]
    pub const fn was_restarted(&self) -> bool {
        self.restarted
    }

    /// Record that parsing was restarted.
    pub const fn set_restarted(&mut self, restarted: bool) {
        self.restarted = restarted;
    }

    // =========================================================================
    // Landmark elements
    // =========================================================================

    /// The first `<html>` element in the tree.
    #[must_use]
    pub const fn html_element(&self) -> Option<NodeId> {
        self.landmarks.html
    }

    /// The first `<head>` element in the tree.
    #[must_use]
    pub const fn head(&self) -> Option<NodeId> {
        self.landmarks.head
    }

    /// The first `<body>` element in the tree.
    #[must_use]
    pub const fn body(&self) -> Option<NodeId> {
        self.landmarks.body
    }

    /// The first `<!DOCTYPE ...>` declaration in the tree.
    #[must_use]
    pub const fn doctype(&self) -> Option<NodeId> {
        self.landmarks.doctype
    }

    /// The first ordinary element child of the document node.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT).iter().copied().find(|id| {
            self.element(*id)
                .is_some_and(|e| e.kind() == ElementKind::Normal)
        })
    }

    fn note_attached(&mut self, subtree: NodeId) {
        if !self.is_attached(subtree) {
            return;
        }
        let found: Vec<NodeId> = std::iter::once(subtree)
            .chain(self.descendants(subtree))
            .filter(|id| self.element(*id).is_some())
            .collect();
        for id in found {
            self.note_landmark(id);
        }
    }

    fn note_landmark(&mut self, id: NodeId) {
        let Some(data) = self.element(id) else {
            return;
        };
        let (kind, name) = (data.kind(), data.name());
        let is = |tag: &str| kind == ElementKind::Normal && name.matches(tag);
        let (doctype, html, head, body) = (
            kind == ElementKind::Declaration && name.matches("doctype"),
            is("html"),
            is("head"),
            is("body"),
        );
        let slot = if doctype {
            &mut self.landmarks.doctype
        } else if html {
            &mut self.landmarks.html
        } else if head {
            &mut self.landmarks.head
        } else if body {
            &mut self.landmarks.body
        } else {
            return;
        };
        if slot.is_none() {
            *slot = Some(id);
        }
    }

    fn note_detached(&mut self, subtree: NodeId) {
        let Landmarks {
            html,
            head,
            body,
            doctype,
        } = self.landmarks;
        let affected = [html, head, body, doctype]
            .into_iter()
            .flatten()
            .any(|id| id == subtree || self.is_ancestor_of(subtree, id));
        if affected {
            self.landmarks = Landmarks::default();
            self.note_attached(NodeId::ROOT);
        }
    }
}

/// Iterator over a node's ancestors. See [`Document::ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree. See [`Document::descendants`].
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}
