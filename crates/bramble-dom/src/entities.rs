//! Character reference decoding and text escaping.
//!
//! Parsed text and attribute values are stored raw; these helpers produce the
//! logical text on demand. The named table covers the references that show
//! up in real pages; anything unknown is left exactly as written.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Named references, keyed without the `&` and `;`.
static NAMED: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("amp", "&"),
        ("AMP", "&"),
        ("lt", "<"),
        ("LT", "<"),
        ("gt", ">"),
        ("GT", ">"),
        ("quot", "\""),
        ("QUOT", "\""),
        ("apos", "'"),
        ("nbsp", "\u{A0}"),
        ("shy", "\u{AD}"),
        ("ensp", "\u{2002}"),
        ("emsp", "\u{2003}"),
        ("thinsp", "\u{2009}"),
        ("zwnj", "\u{200C}"),
        ("zwj", "\u{200D}"),
        ("lrm", "\u{200E}"),
        ("rlm", "\u{200F}"),
        ("iexcl", "\u{A1}"),
        ("cent", "\u{A2}"),
        ("pound", "\u{A3}"),
        ("curren", "\u{A4}"),
        ("yen", "\u{A5}"),
        ("euro", "\u{20AC}"),
        ("brvbar", "\u{A6}"),
        ("sect", "\u{A7}"),
        ("uml", "\u{A8}"),
        ("copy", "\u{A9}"),
        ("ordf", "\u{AA}"),
        ("laquo", "\u{AB}"),
        ("not", "\u{AC}"),
        ("reg", "\u{AE}"),
        ("macr", "\u{AF}"),
        ("deg", "\u{B0}"),
        ("plusmn", "\u{B1}"),
        ("sup2", "\u{B2}"),
        ("sup3", "\u{B3}"),
        ("acute", "\u{B4}"),
        ("micro", "\u{B5}"),
        ("para", "\u{B6}"),
        ("middot", "\u{B7}"),
        ("cedil", "\u{B8}"),
        ("sup1", "\u{B9}"),
        ("ordm", "\u{BA}"),
        ("raquo", "\u{BB}"),
        ("frac14", "\u{BC}"),
        ("frac12", "\u{BD}"),
        ("frac34", "\u{BE}"),
        ("iquest", "\u{BF}"),
        ("Agrave", "\u{C0}"),
        ("Aacute", "\u{C1}"),
        ("Acirc", "\u{C2}"),
        ("Atilde", "\u{C3}"),
        ("Auml", "\u{C4}"),
        ("Aring", "\u{C5}"),
        ("AElig", "\u{C6}"),
        ("Ccedil", "\u{C7}"),
        ("Egrave", "\u{C8}"),
        ("Eacute", "\u{C9}"),
        ("Ecirc", "\u{CA}"),
        ("Euml", "\u{CB}"),
        ("Iacute", "\u{CD}"),
        ("Ntilde", "\u{D1}"),
        ("Oacute", "\u{D3}"),
        ("Ouml", "\u{D6}"),
        ("times", "\u{D7}"),
        ("Oslash", "\u{D8}"),
        ("Uacute", "\u{DA}"),
        ("Uuml", "\u{DC}"),
        ("szlig", "\u{DF}"),
        ("agrave", "\u{E0}"),
        ("aacute", "\u{E1}"),
        ("acirc", "\u{E2}"),
        ("atilde", "\u{E3}"),
        ("auml", "\u{E4}"),
        ("aring", "\u{E5}"),
        ("aelig", "\u{E6}"),
        ("ccedil", "\u{E7}"),
        ("egrave", "\u{E8}"),
        ("eacute", "\u{E9}"),
        ("ecirc", "\u{EA}"),
        ("euml", "\u{EB}"),
        ("igrave", "\u{EC}"),
        ("iacute", "\u{ED}"),
        ("icirc", "\u{EE}"),
        ("iuml", "\u{EF}"),
        ("ntilde", "\u{F1}"),
        ("ograve", "\u{F2}"),
        ("oacute", "\u{F3}"),
        ("ocirc", "\u{F4}"),
        ("otilde", "\u{F5}"),
        ("ouml", "\u{F6}"),
        ("divide", "\u{F7}"),
        ("oslash", "\u{F8}"),
        ("ugrave", "\u{F9}"),
        ("uacute", "\u{FA}"),
        ("ucirc", "\u{FB}"),
        ("uuml", "\u{FC}"),
        ("yacute", "\u{FD}"),
        ("yuml", "\u{FF}"),
        ("ndash", "\u{2013}"),
        ("mdash", "\u{2014}"),
        ("lsquo", "\u{2018}"),
        ("rsquo", "\u{2019}"),
        ("sbquo", "\u{201A}"),
        ("ldquo", "\u{201C}"),
        ("rdquo", "\u{201D}"),
        ("bdquo", "\u{201E}"),
        ("dagger", "\u{2020}"),
        ("Dagger", "\u{2021}"),
        ("bull", "\u{2022}"),
        ("hellip", "\u{2026}"),
        ("permil", "\u{2030}"),
        ("prime", "\u{2032}"),
        ("lsaquo", "\u{2039}"),
        ("rsaquo", "\u{203A}"),
        ("trade", "\u{2122}"),
        ("larr", "\u{2190}"),
        ("uarr", "\u{2191}"),
        ("rarr", "\u{2192}"),
        ("darr", "\u{2193}"),
        ("harr", "\u{2194}"),
        ("minus", "\u{2212}"),
        ("infin", "\u{221E}"),
        ("ne", "\u{2260}"),
        ("le", "\u{2264}"),
        ("ge", "\u{2265}"),
        ("alpha", "\u{3B1}"),
        ("beta", "\u{3B2}"),
        ("gamma", "\u{3B3}"),
        ("delta", "\u{3B4}"),
        ("lambda", "\u{3BB}"),
        ("mu", "\u{3BC}"),
        ("pi", "\u{3C0}"),
        ("sigma", "\u{3C3}"),
        ("omega", "\u{3C9}"),
        ("hearts", "\u{2665}"),
    ])
});

/// References that are recognized even without the trailing semicolon.
const LEGACY: &[&str] = &[
    "amp", "AMP", "lt", "LT", "gt", "GT", "quot", "QUOT", "nbsp", "copy", "reg",
];

/// Longest reference name worth looking up.
const MAX_NAME_LEN: usize = 32;

/// Resolve a named reference (without `&` or `;`).
#[must_use]
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    NAMED.get(name).copied()
}

/// Replace character references in `raw` with the characters they name.
///
/// Unknown names and malformed numeric references are kept verbatim.
/// Numeric references outside the Unicode scalar range, or to NUL, become
/// U+FFFD.
#[must_use]
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match decode_reference(after) {
            Some((replacement, consumed)) => {
                out.push_str(&replacement);
                rest = &after[consumed..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Decode one reference at the start of `s` (the text after `&`).
/// Returns the replacement and the number of bytes consumed.
fn decode_reference(s: &str) -> Option<(Cow<'static, str>, usize)> {
    if let Some(numeric) = s.strip_prefix('#') {
        let (radix, digits_start) = match numeric.chars().next() {
            Some('x' | 'X') => (16, 2),
            _ => (10, 1),
        };
        let digits: &str = &s[digits_start..];
        let len = digits
            .find(|c: char| !c.is_digit(radix))
            .unwrap_or(digits.len());
        if len == 0 {
            return None;
        }
        let value = u32::from_str_radix(&digits[..len], radix).unwrap_or(u32::MAX);
        let c = char::from_u32(value)
            .filter(|c| *c != '\0')
            .unwrap_or('\u{FFFD}');
        let mut consumed = digits_start + len;
        if s[consumed..].starts_with(';') {
            consumed += 1;
        }
        return Some((Cow::Owned(c.to_string()), consumed));
    }

    let len = s
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(s.len());
    if len == 0 || len > MAX_NAME_LEN {
        return None;
    }
    let name = &s[..len];
    let value = lookup_entity(name)?;
    if s[len..].starts_with(';') {
        Some((Cow::Borrowed(value), len + 1))
    } else if LEGACY.contains(&name) {
        Some((Cow::Borrowed(value), len))
    } else {
        None
    }
}

/// Escape `&`, `<` and `>` so `text` can be written as character data.
#[must_use]
pub fn encode_text(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(decode_entities("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn named_and_numeric_references() {
        assert_eq!(decode_entities("a &lt; b &#38; c &#x41;"), "a < b & c A");
        assert_eq!(decode_entities("&copy;2024"), "\u{A9}2024");
    }

    #[test]
    fn legacy_names_work_without_semicolon() {
        assert_eq!(decode_entities("AT&amp T"), "AT& T");
        assert_eq!(decode_entities("&eacute"), "&eacute");
    }

    #[test]
    fn unknown_and_malformed_references_are_kept() {
        assert_eq!(decode_entities("&bogus; & &#;"), "&bogus; & &#;");
        assert_eq!(decode_entities("&#0;"), "\u{FFFD}");
        assert_eq!(decode_entities("&#99999999999;"), "\u{FFFD}");
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(encode_text("a<b & c>"), "a&lt;b &amp; c&gt;");
        assert!(matches!(encode_text("safe"), Cow::Borrowed(_)));
    }
}
