//! `<meta>` encoding declarations.

use bramble_common::warn_once;
use bramble_dom::{Document, NodeId};
use encoding_rs::Encoding;

/// The encoding declared by a `<meta>` element, if any.
///
/// Both `<meta charset="...">` and
/// `<meta http-equiv="Content-Type" content="text/html; charset=...">` are
/// recognized. UTF-16 labels resolve to UTF-8, since a document that could
/// be read as ASCII-compatible markup is not UTF-16. An unknown label is
/// ignored with a warning.
#[must_use]
pub fn meta_charset(document: &Document, meta: NodeId) -> Option<&'static Encoding> {
    let label = if let Some(charset) = document.attribute_value(meta, "charset") {
        charset.trim().to_string()
    } else {
        let http_equiv = document.attribute_value(meta, "http-equiv")?;
        if !http_equiv.trim().eq_ignore_ascii_case("content-type") {
            return None;
        }
        let content = document.attribute_value(meta, "content")?;
        charset_from_content(&content)?.to_string()
    };
    let encoding = Encoding::for_label(label.as_bytes());
    if encoding.is_none() {
        warn_once(
            "HTML Builder",
            &format!("ignoring unknown encoding `{label}` declared in <meta>"),
        );
    }
    encoding.map(Encoding::output_encoding)
}

/// Extract the `charset=` parameter of a `Content-Type` value.
#[must_use]
pub fn charset_from_content(content: &str) -> Option<&str> {
    let lower = content.to_ascii_lowercase();
    let start = lower.find("charset")? + "charset".len();
    let rest = content[start..].trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    let rest = rest.trim_start_matches(['"', '\'']);
    let end = rest
        .find(|c: char| c == ';' || c == '"' || c == '\'' || c.is_ascii_whitespace())
        .unwrap_or(rest.len());
    let value = &rest[..end];
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_from_content() {
        assert_eq!(
            charset_from_content("text/html; charset=windows-1252"),
            Some("windows-1252")
        );
        assert_eq!(charset_from_content("text/html;CHARSET = 'utf-8'"), Some("utf-8"));
        assert_eq!(charset_from_content("text/html"), None);
        assert_eq!(charset_from_content("text/html; charset="), None);
    }

    #[test]
    fn test_meta_charset_attribute() {
        let mut doc = Document::new();
        let meta = doc.create_element("meta").unwrap();
        let _ = doc.set_attribute(meta, "charset", Some("latin1")).unwrap();
        assert_eq!(meta_charset(&doc, meta), Some(encoding_rs::WINDOWS_1252));
    }

    #[test]
    fn test_meta_utf16_maps_to_utf8() {
        let mut doc = Document::new();
        let meta = doc.create_element("meta").unwrap();
        let _ = doc.set_attribute(meta, "charset", Some("utf-16le")).unwrap();
        assert_eq!(meta_charset(&doc, meta), Some(encoding_rs::UTF_8));
    }

    #[test]
    fn test_meta_unknown_label_is_ignored() {
        bramble_common::set_quiet(true);
        let mut doc = Document::new();
        let meta = doc.create_element("meta").unwrap();
        let _ = doc.set_attribute(meta, "charset", Some("klingon")).unwrap();
        assert_eq!(meta_charset(&doc, meta), None);

        let _ = doc.set_attribute(meta, "charset", Some(" utf-8 ")).unwrap();
        assert_eq!(meta_charset(&doc, meta), Some(encoding_rs::UTF_8));
    }

    #[test]
    fn test_meta_http_equiv() {
        let mut doc = Document::new();
        let meta = doc.create_element("meta").unwrap();
        let _ = doc
            .set_attribute(meta, "http-equiv", Some("Content-Type"))
            .unwrap();
        let _ = doc
            .set_attribute(meta, "content", Some("text/html; charset=ISO-8859-2"))
            .unwrap();
        assert_eq!(meta_charset(&doc, meta), Some(encoding_rs::ISO_8859_2));
    }
}
