//! XPath queries against a bramble [`Document`].

use std::cmp::Reverse;

use bramble_dom::{Document, NodeId};

use crate::cursor::{NamespaceScope, TreeCursor};
use crate::error::XPathError;
use crate::navigator::{DomNavigator, NavigatorSettings, SelectedItem};
use crate::xpath::{Bindings, XPathExpression, XPathValue};

/// How [`select_nodes_with`] runs a query.
#[derive(Debug, Clone, Default)]
pub struct QuerySettings {
    depth_first: bool,
    root_boundary: bool,
    navigator: NavigatorSettings,
    namespace_scope: NamespaceScope,
    namespaces: Vec<(String, String)>,
}

impl QuerySettings {
    /// Document order, whole-document navigation, default case folding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return deeper nodes first. Nodes of equal depth keep document order.
    #[must_use]
    pub const fn with_depth_first(mut self, depth_first: bool) -> Self {
        self.depth_first = depth_first;
        self
    }

    /// Treat the context node as the root: `/` refers to it and nothing
    /// above it is reachable.
    #[must_use]
    pub const fn with_root_boundary(mut self, root_boundary: bool) -> Self {
        self.root_boundary = root_boundary;
        self
    }

    /// Case folding applied by the navigator.
    #[must_use]
    pub const fn with_navigator(mut self, navigator: NavigatorSettings) -> Self {
        self.navigator = navigator;
        self
    }

    /// Which bindings `namespace::` visits.
    #[must_use]
    pub const fn with_namespace_scope(mut self, scope: NamespaceScope) -> Self {
        self.namespace_scope = scope;
        self
    }

    /// Bind a prefix for prefixed name tests.
    #[must_use]
    pub fn with_namespace(mut self, prefix: &str, uri: &str) -> Self {
        self.namespaces.push((prefix.to_string(), uri.to_string()));
        self
    }

    /// Whether results come deepest first.
    #[must_use]
    pub const fn depth_first(&self) -> bool {
        self.depth_first
    }

    /// Whether the context node acts as the root.
    #[must_use]
    pub const fn root_boundary(&self) -> bool {
        self.root_boundary
    }

    /// Navigator case folding.
    #[must_use]
    pub const fn navigator(&self) -> NavigatorSettings {
        self.navigator
    }

    fn bindings<'a>(&self) -> Bindings<DomNavigator<'a>> {
        self.namespaces
            .iter()
            .fold(Bindings::new(), |bindings, (prefix, uri)| {
                bindings.with_namespace(prefix, uri)
            })
            .with_namespace_scope(self.namespace_scope)
    }

    fn navigator_at<'a>(
        &self,
        doc: &'a Document,
        node: NodeId,
    ) -> Result<DomNavigator<'a>, XPathError> {
        if doc.get(node).is_none() {
            return Err(XPathError::NodeNotFound(node));
        }
        let navigator = DomNavigator::new(doc, node).with_settings(self.navigator);
        Ok(if self.root_boundary {
            navigator.with_root_boundary()
        } else {
            navigator
        })
    }
}

/// Evaluate `expression` with `node` as the context node.
///
/// # Errors
///
/// Returns [`XPathError`] if the expression does not parse or evaluate, or
/// [`XPathError::NodeNotFound`] if `node` is not in `doc`.
pub fn evaluate<'a>(
    doc: &'a Document,
    node: NodeId,
    expression: &str,
) -> Result<XPathValue<DomNavigator<'a>>, XPathError> {
    let settings = QuerySettings::default();
    let navigator = settings.navigator_at(doc, node)?;
    XPathExpression::compile(expression)?.evaluate(&navigator, &settings.bindings())
}

/// Select with default settings. A result that is not a node-set comes back
/// as one [`SelectedItem::Scalar`].
///
/// # Errors
///
/// See [`evaluate`].
pub fn select_nodes(
    doc: &Document,
    node: NodeId,
    expression: &str,
) -> Result<Vec<SelectedItem>, XPathError> {
    select_nodes_with(doc, node, expression, &QuerySettings::default())
}

/// Select with explicit settings.
///
/// # Errors
///
/// See [`evaluate`].
pub fn select_nodes_with(
    doc: &Document,
    node: NodeId,
    expression: &str,
    settings: &QuerySettings,
) -> Result<Vec<SelectedItem>, XPathError> {
    let navigator = settings.navigator_at(doc, node)?;
    let expression = XPathExpression::compile(expression)?;
    let mut found = expression.select(&navigator, &settings.bindings())?;
    if settings.depth_first {
        found.sort_by_key(|n| Reverse(n.depth()));
    }
    Ok(found.iter().map(DomNavigator::item).collect())
}

/// First result of [`select_nodes`].
///
/// # Errors
///
/// See [`evaluate`].
pub fn select_single_node(
    doc: &Document,
    node: NodeId,
    expression: &str,
) -> Result<Option<SelectedItem>, XPathError> {
    Ok(select_nodes(doc, node, expression)?.into_iter().next())
}

/// Turn selected items into document nodes. Tree nodes are returned as they
/// are; attribute values, namespace URIs and scalars become detached
/// [`QueryResult`](bramble_dom::NodeKind::QueryResult) leaves.
pub fn materialize(doc: &mut Document, items: &[SelectedItem]) -> Vec<NodeId> {
    items
        .iter()
        .map(|item| match item {
            SelectedItem::Node(id) => *id,
            SelectedItem::Attribute { element, index } => {
                let value = doc
                    .element(*element)
                    .and_then(|data| data.attributes().get(*index))
                    .map(|attribute| attribute.value().into_owned())
                    .unwrap_or_default();
                doc.create_query_result(&value)
            }
            SelectedItem::Namespace { uri, .. } => doc.create_query_result(uri),
            SelectedItem::Scalar(value) => doc.create_query_result(value),
        })
        .collect()
}
