//! The four XPath 1.0 value types and their conversions.

use std::fmt;

use crate::cursor::TreeCursor;

/// An XPath value. Node-sets hold cursors in document order without
/// duplicates.
#[derive(Debug, Clone)]
pub enum XPathValue<C> {
    /// `true()` / `false()`.
    Boolean(bool),
    /// IEEE 754 double.
    Number(f64),
    /// A string.
    String(String),
    /// Nodes in document order.
    NodeSet(Vec<C>),
}

impl<C: TreeCursor> XPathValue<C> {
    /// Boolean conversion (`boolean()`).
    #[must_use]
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::NodeSet(nodes) => !nodes.is_empty(),
        }
    }

    /// Number conversion (`number()`).
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Boolean(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => parse_number(s),
            Self::NodeSet(nodes) => nodes.first().map_or(f64::NAN, |n| parse_number(&n.value())),
        }
    }

    /// String conversion (`string()`).
    #[must_use]
    pub fn to_xpath_string(&self) -> String {
        match self {
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::NodeSet(nodes) => nodes
                .first()
                .map(|n| n.value().into_owned())
                .unwrap_or_default(),
        }
    }

    /// The node-set, if this is one.
    #[must_use]
    pub fn as_node_set(&self) -> Option<&[C]> {
        match self {
            Self::NodeSet(nodes) => Some(nodes),
            _ => None,
        }
    }

    /// Name of the value's type, for messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::NodeSet(_) => "node-set",
        }
    }
}

impl<C: TreeCursor> fmt::Display for XPathValue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeSet(nodes) => write!(f, "node-set({})", nodes.len()),
            other => f.write_str(&other.to_xpath_string()),
        }
    }
}

/// Format a number the way `string()` does: no exponent, integers without a
/// decimal point, `NaN`, `Infinity`, and `0` for negative zero.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n.is_sign_negative() { "-" } else { "" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{n}")
    }
}

/// Parse a string the way `number()` does: optional surrounding whitespace,
/// an optional minus sign, digits with at most one decimal point. Anything
/// else is `NaN`.
#[must_use]
pub fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let valid = !digits.is_empty()
        && digits != "."
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|&c| c == '.').count() <= 1;
    if valid {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-1.25), "-1.25");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(1e21), "1000000000000000000000");
    }

    #[test]
    fn test_parse_number() {
        assert!((parse_number(" 42 ") - 42.0).abs() < f64::EPSILON);
        assert!((parse_number("-.5") + 0.5).abs() < f64::EPSILON);
        assert!((parse_number("3.") - 3.0).abs() < f64::EPSILON);
        for bad in ["", ".", "1e3", "+1", "inf", "1.2.3", "0x10", "- 1"] {
            assert!(parse_number(bad).is_nan(), "{bad:?} should be NaN");
        }
    }
}
