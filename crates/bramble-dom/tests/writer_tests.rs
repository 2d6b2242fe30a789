//! Tests for the event-based writers.

use bramble_dom::{Document, DomError, DomWriter, MarkupWriter, NodeId, TextMarkupWriter};

fn sample() -> Document {
    let mut doc = Document::new();
    let div = doc.create_element("div").unwrap();
    doc.append_child(NodeId::ROOT, div).unwrap();
    let _ = doc.set_attribute(div, "title", Some("a &amp; b")).unwrap();
    let text = doc.create_text("x &lt; y");
    doc.append_child(div, text).unwrap();
    let br = doc.create_element("br").unwrap();
    doc.append_child(div, br).unwrap();
    let comment = doc.create_comment("c");
    doc.append_child(div, comment).unwrap();
    doc
}

#[test]
fn test_text_writer_matches_markup() {
    let doc = sample();
    let mut writer = TextMarkupWriter::default();
    doc.write_to(NodeId::ROOT, &mut writer).unwrap();
    assert_eq!(writer.finish(), doc.to_html());
}

#[test]
fn test_dom_writer_copies_between_documents() {
    let source = sample();
    let mut target = Document::new();
    let written = {
        let mut writer = DomWriter::new(&mut target, NodeId::ROOT);
        source.write_to(NodeId::ROOT, &mut writer).unwrap();
        writer.written().to_vec()
    };
    assert_eq!(written.len(), 1);
    assert_eq!(target.to_html(), source.to_html());
    assert_eq!(target.attribute_value(written[0], "title").as_deref(), Some("a & b"));
}

#[test]
fn test_writers_reject_unbalanced_events() {
    let mut writer = TextMarkupWriter::default();
    assert_eq!(writer.end_element().unwrap_err(), DomError::NoOpenElement);
    writer.text("t").unwrap();
    assert_eq!(
        writer.attribute(None, "x", None, Some("1")).unwrap_err(),
        DomError::NoOpenElement
    );

    let mut doc = Document::new();
    let mut dom = DomWriter::new(&mut doc, NodeId::ROOT);
    assert_eq!(dom.end_element().unwrap_err(), DomError::NoOpenElement);
}

#[test]
fn test_dom_writer_declares_namespaces() {
    let mut doc = Document::new();
    {
        let mut writer = DomWriter::new(&mut doc, NodeId::ROOT);
        writer
            .start_element(None, "svg", Some("http://www.w3.org/2000/svg"))
            .unwrap();
        writer.start_element(None, "rect", Some("http://www.w3.org/2000/svg")).unwrap();
        writer.end_element().unwrap();
        writer.end_element().unwrap();
    }
    assert_eq!(
        doc.to_html(),
        "<svg xmlns=\"http://www.w3.org/2000/svg\"><rect></rect></svg>"
    );
}
