//! Tests for namespace resolution on elements and attributes.

use bramble_dom::{Document, NodeId, XHTML_NAMESPACE, XML_NAMESPACE, XMLNS_NAMESPACE};

const SVG: &str = "http://www.w3.org/2000/svg";
const XLINK: &str = "http://www.w3.org/1999/xlink";

fn element(doc: &mut Document, parent: NodeId, tag: &str) -> NodeId {
    let id = doc.create_element(tag).unwrap();
    doc.append_child(parent, id).unwrap();
    id
}

#[test]
fn test_default_namespace_is_inherited() {
    let mut doc = Document::new();
    let svg = element(&mut doc, NodeId::ROOT, "svg");
    let _ = doc.set_attribute(svg, "xmlns", Some(SVG)).unwrap();
    let rect = element(&mut doc, svg, "rect");

    assert_eq!(doc.namespace_uri(svg), Some(SVG));
    assert_eq!(doc.namespace_uri(rect), Some(SVG));
    assert_eq!(doc.element(svg).unwrap().explicit_namespace(), Some(SVG));
    assert_eq!(doc.element(rect).unwrap().explicit_namespace(), None);
}

#[test]
fn test_empty_namespaces_are_ignored() {
    let mut doc = Document::new();
    let html = element(&mut doc, NodeId::ROOT, "html");
    let _ = doc.set_attribute(html, "xmlns", Some(XHTML_NAMESPACE)).unwrap();
    let body = element(&mut doc, html, "body");

    assert_eq!(doc.namespace_uri(html), None);
    assert_eq!(doc.namespace_uri(body), None);
}

#[test]
fn test_prefixes_resolve_through_ancestors() {
    let mut doc = Document::new();
    let root = element(&mut doc, NodeId::ROOT, "doc");
    let _ = doc.set_attribute(root, "xmlns:xlink", Some(XLINK)).unwrap();
    let a = element(&mut doc, root, "a");
    let _ = doc.set_attribute(a, "xlink:href", Some("#t")).unwrap();

    let attr = doc.attribute(a, "xlink:href").unwrap().clone();
    assert_eq!(doc.attribute_namespace_uri(a, &attr), Some(XLINK));
    assert_eq!(doc.lookup_namespace(a, "xlink"), Some(XLINK));
    assert_eq!(doc.lookup_prefix(a, XLINK), Some("xlink"));
    assert_eq!(doc.lookup_namespace(a, "xml"), Some(XML_NAMESPACE));
    assert_eq!(doc.lookup_namespace(a, "missing"), None);
}

#[test]
fn test_declarations_are_in_the_xmlns_namespace() {
    let mut doc = Document::new();
    let root = element(&mut doc, NodeId::ROOT, "doc");
    let _ = doc.set_attribute(root, "xmlns:svg", Some(SVG)).unwrap();
    let attr = doc.attribute(root, "xmlns:svg").unwrap().clone();
    assert_eq!(doc.attribute_namespace_uri(root, &attr), Some(XMLNS_NAMESPACE));
}

#[test]
fn test_inner_declarations_shadow_outer_ones() {
    let mut doc = Document::new();
    let outer = element(&mut doc, NodeId::ROOT, "outer");
    let _ = doc.set_attribute(outer, "xmlns:p", Some("urn:outer")).unwrap();
    let inner = element(&mut doc, outer, "inner");
    let _ = doc.set_attribute(inner, "xmlns:p", Some("urn:inner")).unwrap();

    assert_eq!(doc.lookup_namespace(inner, "p"), Some("urn:inner"));
    assert_eq!(doc.in_scope_namespaces(inner), vec![("p", "urn:inner")]);
}

#[test]
fn test_document_level_declarations_are_a_fallback() {
    let mut doc = Document::new();
    doc.declare_namespace("svg", SVG);
    let rect = element(&mut doc, NodeId::ROOT, "svg:rect");
    assert_eq!(doc.namespace_uri(rect), Some(SVG));
}

#[test]
fn test_prefixed_attributes_with_same_namespace_collide() {
    let mut doc = Document::new();
    let root = element(&mut doc, NodeId::ROOT, "doc");
    let _ = doc.set_attribute(root, "xmlns:a", Some("urn:x")).unwrap();
    let _ = doc.set_attribute(root, "xmlns:b", Some("urn:x")).unwrap();
    let _ = doc.set_attribute(root, "a:k", Some("1")).unwrap();
    let replaced = doc.set_attribute(root, "b:k", Some("2")).unwrap();

    assert!(replaced.is_some());
    assert_eq!(doc.element(root).unwrap().attributes().len(), 3);
}
