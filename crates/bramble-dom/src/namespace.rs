//! Namespace resolution.
//!
//! Namespaces are resolved lazily by walking from an element towards the
//! root: a prefix resolves to the nearest `xmlns:prefix` attribute, falling
//! back to document-level declarations. An unprefixed element takes the
//! namespace of the nearest `xmlns` attribute, unless that URI is one of the
//! options' empty namespaces.

use std::iter;

use crate::attribute::Attribute;
use crate::document::Document;
use crate::node::{ElementData, NodeId};

/// The namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The namespace of `xmlns` declarations themselves.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

impl Document {
    fn self_and_ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        iter::once(id).chain(self.ancestors(id))
    }

    /// Resolve `prefix` as seen from `element`.
    #[must_use]
    pub fn lookup_namespace(&self, element: NodeId, prefix: &str) -> Option<&str> {
        if prefix.eq_ignore_ascii_case("xml") {
            return Some(XML_NAMESPACE);
        }
        if prefix.eq_ignore_ascii_case("xmlns") {
            return Some(XMLNS_NAMESPACE);
        }
        let declared = self.self_and_ancestors(element).find_map(|id| {
            self.element(id)?
                .attributes()
                .iter()
                .find(|a| declares_prefix(a, prefix))
                .and_then(Attribute::raw_value)
        });
        declared.filter(|uri| !uri.is_empty()).or_else(|| {
            self.declared_namespaces
                .iter()
                .find(|(p, _)| p.eq_ignore_ascii_case(prefix))
                .map(|(_, uri)| uri.as_str())
        })
    }

    /// Find a prefix bound to `uri` as seen from `element`.
    #[must_use]
    pub fn lookup_prefix(&self, element: NodeId, uri: &str) -> Option<&str> {
        if uri == XML_NAMESPACE {
            return Some("xml");
        }
        self.in_scope_declarations(element)
            .find(|(_, u)| *u == uri)
            .map(|(p, _)| p)
            .or_else(|| {
                self.declared_namespaces
                    .iter()
                    .find(|(_, u)| u == uri)
                    .map(|(p, _)| p.as_str())
            })
    }

    /// Namespace of the element or attribute-less node `id`.
    ///
    /// Prefixed elements resolve their prefix; unprefixed elements take the
    /// namespace of the nearest element carrying an `xmlns` attribute.
    #[must_use]
    pub fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        let data = self.element(id)?;
        if let Some(prefix) = data.name().prefix() {
            return self.lookup_namespace(id, prefix);
        }
        self.self_and_ancestors(id)
            .filter_map(|a| self.element(a))
            .find(|e| e.attribute("xmlns").is_some())
            .and_then(ElementData::explicit_namespace)
    }

    /// Namespace of `attribute` on `element`. Unprefixed attributes are in
    /// no namespace; declarations are in [`XMLNS_NAMESPACE`].
    #[must_use]
    pub fn attribute_namespace_uri<'a>(
        &'a self,
        element: NodeId,
        attribute: &Attribute,
    ) -> Option<&'a str> {
        if attribute.name().is_namespace_declaration() {
            return Some(XMLNS_NAMESPACE);
        }
        let prefix = attribute.name().prefix()?;
        self.lookup_namespace(element, prefix)
    }

    /// Bind `prefix` to `uri` for the whole document. Element declarations
    /// take precedence.
    pub fn declare_namespace(&mut self, prefix: &str, uri: &str) {
        if let Some(entry) = self
            .declared_namespaces
            .iter_mut()
            .find(|(p, _)| p.eq_ignore_ascii_case(prefix))
        {
            uri.clone_into(&mut entry.1);
        } else {
            self.declared_namespaces
                .push((prefix.to_string(), uri.to_string()));
        }
    }

    /// Prefix bindings visible at `element`, nearest first, with shadowed
    /// and undeclared (`xmlns:p=""`) bindings removed. The default namespace
    /// appears with an empty prefix.
    #[must_use]
    pub fn in_scope_namespaces(&self, element: NodeId) -> Vec<(&str, &str)> {
        let mut seen: Vec<&str> = Vec::new();
        let mut bindings = Vec::new();
        for (prefix, uri) in self.in_scope_declarations_raw(element) {
            if seen.iter().any(|p| p.eq_ignore_ascii_case(prefix)) {
                continue;
            }
            seen.push(prefix);
            if !uri.is_empty() {
                bindings.push((prefix, uri));
            }
        }
        bindings
    }

    fn in_scope_declarations(&self, element: NodeId) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.in_scope_namespaces(element).into_iter()
    }

    /// Every `xmlns`/`xmlns:p` attribute from `element` upwards, unfiltered.
    fn in_scope_declarations_raw(
        &self,
        element: NodeId,
    ) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.self_and_ancestors(element)
            .filter_map(|id| self.element(id))
            .flat_map(|e| e.attributes().iter())
            .filter_map(|a| {
                let name = a.name();
                if !name.is_namespace_declaration() {
                    return None;
                }
                let prefix = if name.prefix().is_some() {
                    name.local_name()
                } else {
                    ""
                };
                Some((prefix, a.raw_value().unwrap_or_default()))
            })
    }
}

fn declares_prefix(attribute: &Attribute, prefix: &str) -> bool {
    let name = attribute.name();
    name.prefix().is_some_and(|p| p.eq_ignore_ascii_case("xmlns"))
        && name.local_name().eq_ignore_ascii_case(prefix)
}
