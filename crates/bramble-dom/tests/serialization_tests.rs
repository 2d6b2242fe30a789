//! Tests for markup output: write flags, quoting and XHTML mode.

use std::sync::Arc;

use bramble_dom::{
    Attribute, Closing, Document, HtmlOptions, NodeId, WriteFlags, WriteHints,
};

fn element(doc: &mut Document, parent: NodeId, tag: &str) -> NodeId {
    let id = doc.create_element(tag).unwrap();
    doc.append_child(parent, id).unwrap();
    id
}

#[test]
fn test_void_elements_have_no_end_tag() {
    let mut doc = Document::new();
    let p = element(&mut doc, NodeId::ROOT, "p");
    let _ = element(&mut doc, p, "br");
    assert_eq!(doc.to_html(), "<p><br></p>");

    doc.set_xhtml(true);
    assert_eq!(doc.to_html(), "<p><br/></p>");
}

#[test]
fn test_implicitly_closed_elements_have_no_end_tag() {
    let mut doc = Document::new();
    let p = element(&mut doc, NodeId::ROOT, "p");
    doc.set_closing(p, Closing::Implicit).unwrap();
    let text = doc.create_text("Hi");
    doc.append_child(p, text).unwrap();
    assert_eq!(doc.to_html(), "<p>Hi");

    doc.set_xhtml(true);
    assert_eq!(doc.to_html(), "<p>Hi</p>");
}

#[test]
fn test_always_close_elements_get_end_tags() {
    let mut doc = Document::new();
    let script = element(&mut doc, NodeId::ROOT, "script");
    doc.set_closing(script, Closing::SelfClosed).unwrap();
    assert_eq!(doc.to_html(), "<script></script>");
}

#[test]
fn test_self_closed_and_deferred_elements() {
    let mut doc = Document::new();
    let div = element(&mut doc, NodeId::ROOT, "div");
    doc.set_closing(div, Closing::SelfClosed).unwrap();
    assert_eq!(doc.outer_html(div), "<div/>");

    let span = element(&mut doc, NodeId::ROOT, "span");
    let hints = WriteHints {
        defer_close_if_empty: Some(true),
        ..WriteHints::default()
    };
    doc.set_write_hints(span, hints).unwrap();
    assert_eq!(doc.outer_html(span), "<span/>");

    let text = doc.create_text("x");
    doc.append_child(span, text).unwrap();
    assert_eq!(doc.outer_html(span), "<span>x</span>");
}

#[test]
fn test_write_table_overrides() {
    let options = HtmlOptions::default().with_write_flags("widget", WriteFlags::NO_CHILDREN);
    let mut doc = Document::with_options(Arc::new(options));
    let _ = element(&mut doc, NodeId::ROOT, "widget");
    assert_eq!(doc.to_html(), "<widget>");
}

#[test]
fn test_attribute_quotes_are_recorded_or_chosen() {
    let mut doc = Document::new();
    let a = element(&mut doc, NodeId::ROOT, "a");
    let _ = doc
        .put_attribute(a, Attribute::new("title", Some("it's")).with_quote(Some('\'')))
        .unwrap();
    let _ = doc.set_attribute(a, "data-x", Some("say \"hi\"")).unwrap();
    let _ = doc.set_attribute(a, "hidden", None).unwrap();

    assert_eq!(
        doc.outer_html(a),
        "<a title='it&#39;s' data-x='say \"hi\"' hidden></a>"
    );
}

#[test]
fn test_quote_escaping_can_be_disabled() {
    let mut doc = Document::new();
    let a = element(&mut doc, NodeId::ROOT, "a");
    let attr = Attribute::new("onclick", Some("f(\"x\")"))
        .with_quote(Some('"'))
        .without_quote_escaping();
    let _ = doc.put_attribute(a, attr).unwrap();
    assert_eq!(doc.outer_html(a), "<a onclick=\"f(\"x\")\"></a>");
}

#[test]
fn test_xhtml_prefers_double_quotes() {
    let mut doc = Document::new();
    doc.set_xhtml(true);
    let a = element(&mut doc, NodeId::ROOT, "a");
    let _ = doc
        .put_attribute(a, Attribute::new("title", Some("a\"b")).with_quote(Some('\'')))
        .unwrap();
    assert_eq!(doc.outer_html(a), "<a title=\"a&quot;b\"></a>");
}

#[test]
fn test_comments_cdata_and_instructions() {
    let mut doc = Document::new();
    let pi = doc.create_processing_instruction("xml").unwrap();
    let _ = doc.set_attribute(pi, "version", Some("1.0")).unwrap();
    doc.append_child(NodeId::ROOT, pi).unwrap();
    let comment = doc.create_comment(" note ");
    doc.append_child(NodeId::ROOT, comment).unwrap();
    let cdata = doc.create_cdata("a < b");
    doc.append_child(NodeId::ROOT, cdata).unwrap();

    assert_eq!(
        doc.to_html(),
        "<?xml version=\"1.0\"?><!-- note --><![CDATA[a < b]]>"
    );
}

#[test]
fn test_duplicate_names_replace_in_place() {
    let mut doc = Document::new();
    let div = element(&mut doc, NodeId::ROOT, "div");
    let _ = doc.set_attribute(div, "id", Some("a")).unwrap();
    let _ = doc.set_attribute(div, "class", Some("c")).unwrap();
    let replaced = doc.set_attribute(div, "ID", Some("b")).unwrap();

    assert_eq!(replaced.and_then(|a| a.raw_value().map(str::to_string)), Some("a".to_string()));
    let data = doc.element(div).unwrap();
    assert_eq!(data.attributes().len(), 2);
    assert_eq!(data.id(), Some("b"));
    assert_eq!(doc.outer_html(div), "<div ID=\"b\" class=\"c\"></div>");
}

#[test]
fn test_inner_text_decodes_references() {
    let mut doc = Document::new();
    let p = element(&mut doc, NodeId::ROOT, "p");
    let text = doc.create_text("fish &amp; chips");
    doc.append_child(p, text).unwrap();
    let script = element(&mut doc, p, "script");
    let code = doc.create_text("a &amp;&amp; b");
    doc.append_child(script, code).unwrap();

    assert_eq!(doc.inner_text(p), "fish & chipsa &amp;&amp; b");
    assert_eq!(doc.elements_by_name("SCRIPT"), vec![script]);
}
