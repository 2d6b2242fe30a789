//! Convenience lookups over the tree.

use std::iter;

use crate::document::Document;
use crate::entities::decode_entities;
use crate::node::{ElementData, ElementKind, Node, NodeId, NodeKind};
use crate::options::ReadFlags;

impl Document {
    /// Element children of `id`, skipping text, comments and declarations.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().copied().filter(|c| {
            self.element(*c)
                .is_some_and(|e| e.kind() == ElementKind::Normal)
        })
    }

    /// Every element under the document whose name matches `name`
    /// (ASCII case-insensitive), in document order.
    #[must_use]
    pub fn elements_by_name(&self, name: &str) -> Vec<NodeId> {
        self.descendants(NodeId::ROOT)
            .filter(|id| {
                self.element(*id).is_some_and(|e| {
                    e.kind() == ElementKind::Normal && e.name().matches(name)
                })
            })
            .collect()
    }

    /// The first element whose raw `id` attribute equals `id`.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(NodeId::ROOT)
            .find(|n| self.element(*n).and_then(ElementData::id) == Some(id))
    }

    /// Concatenated logical text of `id` and its descendants.
    ///
    /// Character references are resolved, except inside raw-text elements
    /// (`script`, `style`) and CDATA sections. Comments contribute nothing.
    #[must_use]
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node_id in iter::once(id).chain(self.descendants(id)) {
            let Some(NodeKind::Text(text)) = self.get(node_id).map(Node::kind) else {
                continue;
            };
            let raw_parent = self.parent(node_id).and_then(|p| self.name(p)).is_some_and(|name| {
                self.options()
                    .read_flags(&name.to_string())
                    .contains(ReadFlags::RAW_TEXT)
            });
            if text.cdata || raw_parent {
                out.push_str(&text.text);
            } else {
                out.push_str(&decode_entities(&text.text));
            }
        }
        out
    }
}
