//! Property tests: the reader and builder accept any input.

use bramble_dom::{Document, NodeKind};
use bramble_html::parse_str;
use quickcheck_macros::quickcheck;

const TAGS: [&str; 5] = ["div", "span", "b", "em", "section"];

/// Markup driven by `ops` in which every opened element is closed.
fn nested_markup(ops: &[u8]) -> String {
    let mut out = String::new();
    let mut open = Vec::new();
    for (i, &op) in ops.iter().enumerate() {
        let tag = TAGS[usize::from(op) % TAGS.len()];
        match op % 6 {
            0 | 1 => {
                out.push_str(&format!("<{tag}>"));
                open.push(tag);
            }
            2 => {
                out.push_str(&format!("<{tag} id=\"n{i}\" class='c{op}'>"));
                open.push(tag);
            }
            3 => {
                if let Some(tag) = open.pop() {
                    out.push_str(&format!("</{tag}>"));
                }
            }
            4 => out.push_str(&format!("t{op} &amp; ")),
            _ => out.push_str(if op % 2 == 0 { "<br>" } else { "<!--c-->" }),
        }
    }
    while let Some(tag) = open.pop() {
        out.push_str(&format!("</{tag}>"));
    }
    out
}

/// Depth, name and attributes of every element, and the data of every
/// other node, in document order.
fn shape(doc: &Document) -> Vec<String> {
    doc.descendants(doc.root())
        .map(|id| {
            let depth = doc.depth(id);
            match doc.element(id) {
                Some(element) => {
                    let attrs: Vec<String> = element
                        .attributes()
                        .iter()
                        .map(|a| format!("{}={}", a.name(), a.value()))
                        .collect();
                    format!("{depth} <{}> {}", element.name(), attrs.join(" "))
                }
                None => {
                    let comment = doc
                        .get(id)
                        .is_some_and(|n| matches!(n.kind(), NodeKind::Comment(_)));
                    format!("{depth} comment={comment} {:?}", doc.text(id))
                }
            }
        })
        .collect()
}

/// Markup of the document rendered from deep copies, so no cached string
/// is reused.
fn fresh_html(doc: &mut Document) -> String {
    let tops = doc.children(doc.root()).to_vec();
    tops.into_iter()
        .map(|id| {
            let copy = doc.clone_node(id, true).unwrap();
            doc.outer_html(copy).to_string()
        })
        .collect()
}

#[quickcheck]
fn prop_parsing_never_panics(input: String) -> bool {
    let doc = parse_str(&input);
    doc.errors().iter().all(|e| input.is_char_boundary(e.position.offset))
}

#[quickcheck]
fn prop_serialization_is_stable(input: String) -> bool {
    let mut doc = parse_str(&input);
    let cached = doc.to_html();
    cached == doc.to_html() && cached == fresh_html(&mut doc)
}

#[quickcheck]
fn prop_reparsing_keeps_tree_shape(ops: Vec<u8>) -> bool {
    let doc = parse_str(&nested_markup(&ops));
    let html = doc.to_html();
    let reparsed = parse_str(&html);
    shape(&doc) == shape(&reparsed) && reparsed.to_html() == html
}

#[quickcheck]
fn prop_text_without_markup_round_trips(input: String) -> bool {
    let text: String = input.chars().filter(|&c| c != '<').collect();
    parse_str(&text).to_html() == text
}

#[quickcheck]
fn prop_markup_soup_never_panics(pieces: Vec<u8>) -> bool {
    const PARTS: [&str; 12] = [
        "<div>", "</div>", "<p", " a=\"", "'", ">", "<br/>", "<!--", "-->", "<script>", "</span>",
        "x",
    ];
    let html: String = pieces
        .iter()
        .map(|&i| PARTS[usize::from(i) % PARTS.len()])
        .collect();
    let mut doc = parse_str(&html);
    let cached = doc.to_html();
    cached == fresh_html(&mut doc)
}
