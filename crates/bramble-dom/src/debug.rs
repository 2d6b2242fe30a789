//! Indented tree dumps for debugging and the command line.

use std::fmt::Write;
use std::iter;

use crate::document::Document;
use crate::node::{ElementKind, NodeId, NodeKind};

impl Document {
    /// Render the subtree at `id` as an indented outline, one node per line.
    ///
    /// Whitespace in text is made visible (`·` for spaces, `\n` for line
    /// breaks) so that layout-only text nodes can be told apart.
    #[must_use]
    pub fn tree_string(&self, id: NodeId) -> String {
        let mut out = String::new();
        let base = self.depth(id);
        for node_id in iter::once(id).chain(self.descendants(id)) {
            let Some(node) = self.get(node_id) else {
                continue;
            };
            let indent = "  ".repeat(self.depth(node_id).saturating_sub(base));
            let _ = match node.kind() {
                NodeKind::Document => writeln!(out, "{indent}Document"),
                NodeKind::Element(data) => {
                    let attrs: String = data
                        .attributes()
                        .iter()
                        .map(|a| match a.raw_value() {
                            Some(v) => format!(" {}=\"{v}\"", a.name()),
                            None => format!(" {}", a.name()),
                        })
                        .collect();
                    let sigil = match data.kind() {
                        ElementKind::Normal => "",
                        ElementKind::ProcessingInstruction => "?",
                        ElementKind::Declaration => "!",
                    };
                    writeln!(out, "{indent}<{sigil}{}{attrs}>", data.name())
                }
                NodeKind::Text(text) => {
                    let shown = text.text.replace('\n', "\\n").replace(' ', "\u{00B7}");
                    if text.cdata {
                        writeln!(out, "{indent}CDATA \"{shown}\"")
                    } else {
                        writeln!(out, "{indent}\"{shown}\"")
                    }
                }
                NodeKind::Comment(data) => writeln!(out, "{indent}<!-- {data} -->"),
                NodeKind::QueryResult(value) => writeln!(out, "{indent}= {value}"),
            };
        }
        out
    }
}
