//! Integration tests for decoding, BOM sniffing and the encoding restart.

use std::cell::Cell;
use std::rc::Rc;

use bramble_dom::{Document, ParseErrorKind};
use bramble_html::{
    BuildContext, BuildHook, FragmentKind, HookFlow, HtmlParser, LoadError, LoadSettings,
    ReaderState, SeekableSource, load_bytes, load_file, load_reader,
};

const LATIN1_PAGE: &[u8] =
    b"<html><head><meta charset=\"windows-1252\"></head><body><p>caf\xe9</p></body></html>";

fn paragraph_text(doc: &Document) -> String {
    doc.inner_text(doc.elements_by_name("p")[0])
}

fn error_kinds(doc: &Document) -> Vec<ParseErrorKind> {
    doc.errors().iter().map(|e| e.kind).collect()
}

#[test]
fn test_meta_declaration_restarts_seekable_source() {
    let doc = load_bytes(LATIN1_PAGE, &LoadSettings::new()).unwrap();
    assert!(doc.was_restarted());
    assert_eq!(paragraph_text(&doc), "caf\u{e9}");
    assert_eq!(doc.declared_encoding(), Some("windows-1252"));
    assert_eq!(doc.stream_encoding(), Some("windows-1252"));
    assert!(doc.errors().is_empty());

    let direct = load_bytes(
        LATIN1_PAGE,
        &LoadSettings::new().with_encoding(encoding_rs::WINDOWS_1252),
    )
    .unwrap();
    assert!(!direct.was_restarted());
    assert_eq!(direct.to_html(), doc.to_html());
}

#[test]
fn test_forward_source_records_mismatch() {
    let doc = load_reader(LATIN1_PAGE, &LoadSettings::new()).unwrap();
    assert!(!doc.was_restarted());
    assert_eq!(error_kinds(&doc), vec![ParseErrorKind::EncodingMismatch]);
    let meta = doc.elements_by_name("meta")[0];
    assert_eq!(doc.node_errors(meta).len(), 1);
    assert_eq!(doc.stream_encoding(), Some("UTF-8"));
}

#[test]
fn test_mismatch_can_be_fatal() {
    let settings = LoadSettings::new().with_fail_on_encoding_mismatch(true);
    let result = load_reader(LATIN1_PAGE, &settings);
    assert!(matches!(
        result,
        Err(LoadError::EncodingMismatch {
            declared: "windows-1252",
            actual: "UTF-8"
        })
    ));
}

#[test]
fn test_restart_can_be_disabled() {
    let settings = LoadSettings::new().with_restart_on_encoding_detect(false);
    let doc = load_bytes(LATIN1_PAGE, &settings).unwrap();
    assert!(!doc.was_restarted());
    assert_eq!(error_kinds(&doc), vec![ParseErrorKind::EncodingMismatch]);
}

#[test]
fn test_matching_declaration_does_not_restart() {
    let doc = load_bytes(
        "<meta charset=\"utf-8\"><p>\u{e9}</p>".as_bytes(),
        &LoadSettings::new(),
    )
    .unwrap();
    assert!(!doc.was_restarted());
    assert!(doc.errors().is_empty());
    assert_eq!(paragraph_text(&doc), "\u{e9}");
}

#[test]
fn test_bom_fixes_encoding() {
    let bytes = b"\xef\xbb\xbf<meta charset=\"windows-1252\"><p>\xc3\xa9</p>";
    let doc = load_bytes(bytes, &LoadSettings::new()).unwrap();
    assert!(!doc.was_restarted());
    assert!(doc.errors().is_empty());
    assert_eq!(paragraph_text(&doc), "\u{e9}");
    assert_eq!(doc.stream_encoding(), Some("UTF-8"));
    assert!(!doc.to_html().starts_with('\u{feff}'));
}

#[test]
fn test_utf16_bom() {
    let mut bytes = vec![0xff, 0xfe];
    for unit in "<p>\u{e9}</p>".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let doc = load_bytes(&bytes, &LoadSettings::new()).unwrap();
    assert_eq!(doc.stream_encoding(), Some("UTF-16LE"));
    assert_eq!(paragraph_text(&doc), "\u{e9}");
}

#[test]
fn test_undecodable_bytes_without_declaration() {
    let doc = load_bytes(b"<p>\xff</p>", &LoadSettings::new()).unwrap();
    assert_eq!(error_kinds(&doc), vec![ParseErrorKind::EncodingError]);
    let position = doc.errors()[0].position;
    assert_eq!((position.line, position.column), (1, 4));
    assert_eq!(paragraph_text(&doc), "\u{FFFD}");
}

#[test]
fn test_undecodable_bytes_can_be_fatal() {
    let settings = LoadSettings::new().with_fail_on_encoding_error(true);
    let result = load_bytes(b"<p>\xff</p>", &settings);
    assert!(matches!(
        result,
        Err(LoadError::EncodingError {
            line: 1,
            column: 4,
            ..
        })
    ));
}

#[test]
fn test_declared_encoding_suppresses_encoding_error() {
    let bytes = b"<meta charset=\"utf-8\"><p>\xff</p>";
    let doc = load_bytes(bytes, &LoadSettings::new()).unwrap();
    assert!(doc.errors().is_empty());
}

#[test]
fn test_load_file() {
    let path = std::env::temp_dir().join(format!("bramble-load-{}.html", std::process::id()));
    std::fs::write(&path, LATIN1_PAGE).unwrap();
    let doc = load_file(&path, &LoadSettings::new()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(doc.was_restarted());
    assert_eq!(paragraph_text(&doc), "caf\u{e9}");
}

#[test]
fn test_missing_file_is_io_error() {
    let result = load_file("/nonexistent/bramble/page.html", &LoadSettings::new());
    assert!(matches!(result, Err(LoadError::Io(_))));
}

struct CountMeta(Rc<Cell<usize>>);

impl BuildHook for CountMeta {
    fn before_fragment(
        &mut self,
        _document: &Document,
        fragment: &ReaderState,
        context: BuildContext,
    ) -> HookFlow {
        if fragment.kind() == FragmentKind::TagOpen && fragment.value() == Some("meta") {
            self.0.set(self.0.get() + 1);
        }
        HookFlow::Continue(context)
    }
}

#[test]
fn test_hooks_survive_restart() {
    let seen = Rc::new(Cell::new(0));
    let mut source = SeekableSource::new(std::io::Cursor::new(LATIN1_PAGE)).unwrap();
    let doc = HtmlParser::new()
        .with_build_hook(Box::new(CountMeta(Rc::clone(&seen))))
        .load(&mut source)
        .unwrap();
    assert!(doc.was_restarted());
    assert_eq!(seen.get(), 2);
}
