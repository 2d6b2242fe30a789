//! Markup serialization with per-node caching.
//!
//! [`Document::outer_html`] and [`Document::inner_html`] render lazily and
//! memoize the result on the node. Mutations drop the caches of the changed
//! node and its ancestors, so repeated calls on an unchanged tree return the
//! same string without re-rendering. Rendering fills caches from the
//! deepest nodes up, so its stack use does not grow with tree depth.
//!
//! Text, comments and attribute values are written exactly as they were read.
//! Whether an element gets an end tag depends on how it was closed in the
//! source and on its [`WriteFlags`]:
//!
//! - elements closed by an end tag, or flagged `ALWAYS_CLOSE`, get one;
//! - implicitly closed elements do not, so `<p>Hi<br>there` stays as is;
//! - XHTML documents close everything and use `/>` for empty void elements.

use std::io;

use crate::attribute::Attribute;
use crate::document::Document;
use crate::node::{Closing, ElementData, ElementKind, Node, NodeId, NodeKind};
use crate::options::WriteFlags;

/// Effective write behavior of one element.
#[derive(Debug, Clone, Copy)]
struct WriteRules {
    no_children: bool,
    always_close: bool,
    defer_close_if_empty: bool,
}

impl Document {
    /// Markup of `id`, including the node itself. Unknown ids yield `""`.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> &str {
        let Some(node) = self.get(id) else {
            return "";
        };
        if node.outer_cache.get().is_none() {
            self.fill_caches(id);
        }
        node.outer_cache.get_or_init(|| self.render_outer(id, node))
    }

    /// Markup of the children of `id`.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> &str {
        let Some(node) = self.get(id) else {
            return "";
        };
        node.inner_cache.get_or_init(|| {
            self.children(id)
                .iter()
                .map(|child| self.outer_html(*child))
                .collect()
        })
    }

    /// Markup of the whole document.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.outer_html(NodeId::ROOT).to_string()
    }

    /// Write the markup of `id` to `writer` as UTF-8.
    ///
    /// # Errors
    ///
    /// Propagates any error from `writer`.
    pub fn write_html<W: io::Write>(&self, id: NodeId, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.outer_html(id).as_bytes())
    }

    /// Render the uncached part of the subtree at `id`, deepest nodes
    /// first, so that rendering any node only reads its children's caches
    /// and never recurses.
    fn fill_caches(&self, id: NodeId) {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(
                self.children(current)
                    .iter()
                    .filter(|child| self.get(**child).is_some_and(|n| n.outer_cache.get().is_none())),
            );
        }
        for node_id in order.into_iter().rev() {
            if let Some(node) = self.get(node_id) {
                let _ = node.outer_cache.get_or_init(|| self.render_outer(node_id, node));
            }
        }
    }

    fn render_outer(&self, id: NodeId, node: &Node) -> String {
        match &node.kind {
            NodeKind::Document => self.inner_html(id).to_string(),
            NodeKind::Text(text) if text.cdata => format!("<![CDATA[{}]]>", text.text),
            NodeKind::Text(text) => text.text.clone(),
            NodeKind::Comment(data) => format!("<!--{data}-->"),
            NodeKind::QueryResult(value) => value.clone(),
            NodeKind::Element(element) => self.render_element(id, element),
        }
    }

    fn render_element(&self, id: NodeId, element: &ElementData) -> String {
        let name = element.name().to_string();
        let mut out = String::with_capacity(name.len() * 2 + 16);

        match element.kind() {
            ElementKind::ProcessingInstruction => {
                out.push_str("<?");
                out.push_str(&name);
                self.write_attributes(&mut out, element);
                out.push_str("?>");
                return out;
            }
            ElementKind::Declaration => {
                out.push_str("<!");
                out.push_str(&name);
                self.write_attributes(&mut out, element);
                out.push('>');
                return out;
            }
            ElementKind::Normal => {}
        }

        out.push('<');
        out.push_str(&name);
        self.write_attributes(&mut out, element);

        let rules = self.write_rules(&name, element);
        let has_children = !self.children(id).is_empty();
        let closing = element.closing();

        if !has_children {
            if rules.no_children {
                out.push_str(if self.is_xhtml() || closing == Closing::SelfClosed {
                    "/>"
                } else {
                    ">"
                });
                return out;
            }
            if !rules.always_close
                && (closing == Closing::SelfClosed || rules.defer_close_if_empty)
            {
                out.push_str("/>");
                return out;
            }
        }

        out.push('>');
        out.push_str(self.inner_html(id));
        let end_tag = closing != Closing::Implicit
            || rules.always_close
            || rules.no_children
            || self.is_xhtml();
        if end_tag {
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
        }
        out
    }

    fn write_rules(&self, name: &str, element: &ElementData) -> WriteRules {
        let flags = self.options().write_flags(name);
        let hints = element.write_hints();
        WriteRules {
            no_children: hints
                .no_children
                .unwrap_or_else(|| flags.contains(WriteFlags::NO_CHILDREN)),
            always_close: hints
                .always_close
                .unwrap_or_else(|| flags.contains(WriteFlags::ALWAYS_CLOSE)),
            defer_close_if_empty: hints
                .defer_close_if_empty
                .unwrap_or_else(|| flags.contains(WriteFlags::DEFER_CLOSE_IF_EMPTY)),
        }
    }

    pub(crate) fn write_attributes(&self, out: &mut String, element: &ElementData) {
        for attr in element.attributes() {
            out.push(' ');
            let name = attr.name().to_string();
            match attr.name_quote() {
                Some(q) => {
                    out.push(q);
                    out.push_str(&name.replace(q, &format!("{q}{q}")));
                    out.push(q);
                }
                None => out.push_str(&name),
            }
            let Some(value) = attr.raw_value() else {
                continue;
            };
            let quote = self.choose_quote(attr, value);
            out.push('=');
            out.push(quote);
            if attr.escapes_quotes() {
                push_escaped(out, value, quote);
            } else {
                out.push_str(value);
            }
            out.push(quote);
        }
    }

    /// The recorded quote, or `"` unless only `'` avoids escaping. XHTML
    /// output always uses `"`.
    fn choose_quote(&self, attr: &Attribute, value: &str) -> char {
        if self.is_xhtml() {
            return '"';
        }
        match attr.quote() {
            Some(q) => q,
            None if value.contains('"') && !value.contains('\'') => '\'',
            None => '"',
        }
    }
}

fn push_escaped(out: &mut String, value: &str, quote: char) {
    let entity = if quote == '"' { "&quot;" } else { "&#39;" };
    for c in value.chars() {
        if c == quote {
            out.push_str(entity);
        } else {
            out.push(c);
        }
    }
}
