//! Small text helpers shared across crates.

use std::borrow::Cow;
use std::fmt::Write;

/// Whitespace as HTML understands it: tab, LF, FF, CR and space.
#[must_use]
pub const fn is_html_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// Treat an empty or whitespace-only string as absent.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Make `name` usable as an XML name.
///
/// Characters that cannot appear in a name are replaced by `_xHHHH_`
/// escapes, in the style of XML name encoding. Names that are already
/// valid are returned unchanged without allocating.
#[must_use]
pub fn escape_name(name: &str) -> Cow<'_, str> {
    let valid = name.chars().enumerate().all(|(i, c)| {
        if i == 0 {
            is_name_start(c)
        } else {
            is_name_char(c)
        }
    });
    if valid && !name.is_empty() {
        return Cow::Borrowed(name);
    }

    let mut out = String::with_capacity(name.len() + 8);
    for (i, c) in name.chars().enumerate() {
        let ok = if i == 0 {
            is_name_start(c)
        } else {
            is_name_char(c)
        };
        if ok {
            out.push(c);
        } else {
            let _ = write!(out, "_x{:04X}_", u32::from(c));
        }
    }
    Cow::Owned(out)
}

const fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':' || (c as u32) >= 0xC0
}

const fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-' || c == '.' || c as u32 == 0xB7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names_are_borrowed() {
        assert!(matches!(escape_name("data-id"), Cow::Borrowed("data-id")));
    }

    #[test]
    fn invalid_characters_are_escaped() {
        assert_eq!(escape_name("1a b"), "_x0031_a_x0020_b");
        assert_eq!(escape_name("\"x\""), "_x0022_x_x0022_");
    }

    #[test]
    fn blank_values_are_absent() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" a ")), Some(" a "));
        assert_eq!(non_blank(None), None);
    }
}
