//! Integration tests for the fragment reader.

use bramble_dom::{HtmlOptions, ParseErrorKind, SourcePosition};
use bramble_html::{CharAction, FragmentKind, HtmlTokenizer, TokenizerState};

/// Helper to read `input` into `(kind, raw)` pairs.
fn fragments(input: &str) -> Vec<(FragmentKind, Option<String>)> {
    HtmlTokenizer::new(input.chars(), HtmlOptions::shared_default())
        .map(|f| (f.kind(), f.raw().map(str::to_string)))
        .collect()
}

fn frag(kind: FragmentKind, raw: &str) -> (FragmentKind, Option<String>) {
    (kind, Some(raw.to_string()))
}

#[test]
fn test_simple_element() {
    assert_eq!(
        fragments(r#"<p class="x">Hi</p>"#),
        vec![
            frag(FragmentKind::TagOpen, "p"),
            frag(FragmentKind::AttrName, "class"),
            frag(FragmentKind::AttrValue, "x"),
            frag(FragmentKind::TagEnd, ">"),
            frag(FragmentKind::Text, "Hi"),
            frag(FragmentKind::TagClose, "</p>"),
        ]
    );
}

#[test]
fn test_bare_attribute_has_null_value() {
    assert_eq!(
        fragments("<input disabled>"),
        vec![
            frag(FragmentKind::TagOpen, "input"),
            frag(FragmentKind::AttrName, "disabled"),
            (FragmentKind::AttrValue, None),
            frag(FragmentKind::TagEnd, ">"),
        ]
    );
}

#[test]
fn test_unquoted_attribute_value() {
    let mut tokenizer = HtmlTokenizer::new("<a href=x.html>".chars(), HtmlOptions::shared_default());
    let values: Vec<_> = tokenizer
        .by_ref()
        .filter(|f| f.kind() == FragmentKind::AttrValue)
        .collect();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].raw(), Some("x.html"));
    assert_eq!(values[0].quote(), None);
}

#[test]
fn test_doubled_quote_is_literal() {
    let values: Vec<_> = HtmlTokenizer::new(
        r#"<a title="say ""hi""">"#.chars(),
        HtmlOptions::shared_default(),
    )
    .filter(|f| f.kind() == FragmentKind::AttrValue)
    .collect();
    assert_eq!(values[0].raw(), Some(r#"say "hi""#));
    assert_eq!(values[0].quote(), Some('"'));
}

#[test]
fn test_self_closing_tag() {
    assert_eq!(
        fragments("<br/>"),
        vec![
            frag(FragmentKind::TagOpen, "br"),
            frag(FragmentKind::SelfClose, "/>"),
        ]
    );
}

#[test]
fn test_lone_angle_brackets_are_text() {
    assert_eq!(fragments("a < b"), vec![frag(FragmentKind::Text, "a < b")]);
    assert_eq!(fragments("<>"), vec![frag(FragmentKind::Text, "<>")]);
}

#[test]
fn test_raw_text_is_copied_verbatim() {
    assert_eq!(
        fragments("<script>if (a < b) { x = '</p>'; }</script>"),
        vec![
            frag(FragmentKind::TagOpen, "script"),
            frag(FragmentKind::TagEnd, ">"),
            frag(FragmentKind::Text, "if (a < b) { x = '</p>'; }"),
            frag(FragmentKind::TagClose, "</script>"),
        ]
    );
}

#[test]
fn test_raw_text_close_tag_is_case_insensitive() {
    let kinds: Vec<_> = fragments("<style>p{}</STYLE >")
        .into_iter()
        .map(|(kind, _)| kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            FragmentKind::TagOpen,
            FragmentKind::TagEnd,
            FragmentKind::Text,
            FragmentKind::TagClose,
        ]
    );
}

#[test]
fn test_parsed_script_type_reads_tags() {
    let opens: Vec<_> = fragments(r#"<script type="text/html"><b>x</b></script>"#)
        .into_iter()
        .filter(|(kind, _)| *kind == FragmentKind::TagOpen)
        .collect();
    assert_eq!(
        opens,
        vec![
            frag(FragmentKind::TagOpen, "script"),
            frag(FragmentKind::TagOpen, "b"),
        ]
    );
}

#[test]
fn test_comment_and_cdata() {
    assert_eq!(
        fragments("<!-- hi --><![CDATA[a<b]]>"),
        vec![
            frag(FragmentKind::Comment, " hi "),
            frag(FragmentKind::CDataText, "a<b"),
        ]
    );
}

#[test]
fn test_processing_instruction() {
    assert_eq!(
        fragments(r#"<?xml version="1.0"?>"#),
        vec![
            frag(FragmentKind::TagOpen, "?xml"),
            frag(FragmentKind::AttrName, "version"),
            frag(FragmentKind::AttrValue, "1.0"),
            frag(FragmentKind::TagEnd, "?>"),
        ]
    );
}

#[test]
fn test_doctype_declaration() {
    assert_eq!(
        fragments("<!DOCTYPE html>"),
        vec![
            frag(FragmentKind::TagOpen, "!DOCTYPE"),
            frag(FragmentKind::AttrName, "html"),
            (FragmentKind::AttrValue, None),
            frag(FragmentKind::TagEnd, ">"),
        ]
    );
}

#[test]
fn test_unterminated_tag_becomes_text() {
    let mut tokenizer =
        HtmlTokenizer::new(r#"<div class="a"#.chars(), HtmlOptions::shared_default());
    let all: Vec<_> = tokenizer.by_ref().collect();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].kind(), FragmentKind::Text);
    assert_eq!(all[0].raw(), Some(r#"<div class="a"#));
    assert_eq!(tokenizer.errors().len(), 1);
    assert_eq!(tokenizer.errors()[0].kind, ParseErrorKind::TagNotClosed);
}

#[test]
fn test_interrupted_tag_is_reread() {
    let mut tokenizer = HtmlTokenizer::new("<div <p>x".chars(), HtmlOptions::shared_default());
    let all: Vec<_> = tokenizer
        .by_ref()
        .map(|f| (f.kind(), f.raw().map(str::to_string)))
        .collect();
    assert_eq!(
        all,
        vec![
            frag(FragmentKind::Text, "<div "),
            frag(FragmentKind::TagOpen, "p"),
            frag(FragmentKind::TagEnd, ">"),
            frag(FragmentKind::Text, "x"),
        ]
    );
    assert_eq!(tokenizer.take_errors().len(), 1);
    assert!(tokenizer.errors().is_empty());
}

#[test]
fn test_unterminated_comment_is_flushed() {
    let mut tokenizer = HtmlTokenizer::new("<!-- open".chars(), HtmlOptions::shared_default());
    let all: Vec<_> = tokenizer.by_ref().collect();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].kind(), FragmentKind::Comment);
    assert_eq!(all[0].raw(), Some(" open"));
    assert_eq!(tokenizer.errors().len(), 1);
}

#[test]
fn test_positions() {
    let all: Vec<_> =
        HtmlTokenizer::new("a\n<b>".chars(), HtmlOptions::shared_default()).collect();
    assert_eq!(all[0].position(), SourcePosition::default());
    let open = all[1].position();
    assert_eq!((open.line, open.column, open.offset), (2, 1, 2));
}

#[test]
fn test_offsets_are_byte_offsets() {
    let input = "é€<b>";
    let all: Vec<_> =
        HtmlTokenizer::new(input.chars(), HtmlOptions::shared_default()).collect();
    let open = all[1].position();
    assert_eq!((open.line, open.column, open.offset), (1, 3, 5));
    assert_eq!(&input[open.offset..], "<b>");
}

#[test]
fn test_read_and_state() {
    let mut tokenizer = HtmlTokenizer::new("x<i>".chars(), HtmlOptions::shared_default());
    assert!(tokenizer.state().is_none());
    assert!(tokenizer.read());
    assert_eq!(tokenizer.state().map(|s| s.kind()), Some(FragmentKind::Text));
    assert!(tokenizer.read());
    assert_eq!(tokenizer.state().and_then(|s| s.value()), Some("i"));
    assert!(tokenizer.read());
    assert!(!tokenizer.read());
    assert!(tokenizer.state().is_none());
}

#[test]
fn test_char_hook_replaces_characters() {
    let tokenizer = HtmlTokenizer::new("axa".chars(), HtmlOptions::shared_default()).with_hook(
        Box::new(|c: char, _: TokenizerState, _: SourcePosition| {
            if c == 'x' {
                CharAction::Replace('y')
            } else {
                CharAction::Continue
            }
        }),
    );
    let texts: Vec<_> = tokenizer.map(|f| f.raw().map(str::to_string)).collect();
    assert_eq!(texts, vec![Some("aya".to_string())]);
}

#[test]
fn test_char_hook_cancels() {
    let tokenizer = HtmlTokenizer::new("ab<i>cd".chars(), HtmlOptions::shared_default())
        .with_hook(Box::new(|c: char, _: TokenizerState, _: SourcePosition| {
            if c == 'c' {
                CharAction::Cancel
            } else {
                CharAction::Continue
            }
        }));
    let kinds: Vec<_> = tokenizer.map(|f| f.kind()).collect();
    assert_eq!(
        kinds,
        vec![FragmentKind::Text, FragmentKind::TagOpen, FragmentKind::TagEnd]
    );
}

#[test]
fn test_custom_raw_text_element() {
    use bramble_dom::ReadFlags;
    use std::sync::Arc;

    let options = Arc::new(HtmlOptions::default().with_read_flags("xmp", ReadFlags::RAW_TEXT));
    let all: Vec<_> = HtmlTokenizer::new("<xmp><b></xmp>".chars(), options)
        .map(|f| f.kind())
        .collect();
    assert_eq!(
        all,
        vec![
            FragmentKind::TagOpen,
            FragmentKind::TagEnd,
            FragmentKind::Text,
            FragmentKind::TagClose,
        ]
    );
}
