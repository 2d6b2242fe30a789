//! Qualified names.

use std::fmt;

/// A possibly prefixed name such as `svg:rect` or `href`.
///
/// The name keeps the case it was written with; comparisons against tag
/// tables go through [`QualName::matches`], which ignores ASCII case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualName {
    prefix: Option<String>,
    local: String,
}

impl QualName {
    /// Split `name` at its first colon. A colon at either end is kept as part
    /// of the local name, so `:x` and `x:` have no prefix.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            _ => Self {
                prefix: None,
                local: name.to_string(),
            },
        }
    }

    /// Build a name from its parts.
    #[must_use]
    pub fn new(prefix: Option<&str>, local: &str) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
            local: local.to_string(),
        }
    }

    /// Namespace prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Local part.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Whether the qualified form equals `name`, ignoring ASCII case.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match &self.prefix {
            None => self.local.eq_ignore_ascii_case(name),
            Some(prefix) => name.split_once(':').is_some_and(|(p, l)| {
                p.eq_ignore_ascii_case(prefix) && l.eq_ignore_ascii_case(&self.local)
            }),
        }
    }

    /// Whether this is a namespace declaration name (`xmlns` or `xmlns:p`).
    #[must_use]
    pub fn is_namespace_declaration(&self) -> bool {
        match &self.prefix {
            None => self.local.eq_ignore_ascii_case("xmlns"),
            Some(prefix) => prefix.eq_ignore_ascii_case("xmlns"),
        }
    }
}

impl fmt::Display for QualName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_first_colon() {
        let name = QualName::parse("svg:rect");
        assert_eq!(name.prefix(), Some("svg"));
        assert_eq!(name.local_name(), "rect");
        assert_eq!(name.to_string(), "svg:rect");
    }

    #[test]
    fn dangling_colons_are_not_prefixes() {
        assert_eq!(QualName::parse(":x").prefix(), None);
        assert_eq!(QualName::parse("x:").local_name(), "x:");
    }

    #[test]
    fn matching_ignores_case() {
        assert!(QualName::parse("DIV").matches("div"));
        assert!(QualName::parse("Xlink:Href").matches("xlink:href"));
        assert!(!QualName::parse("href").matches("xlink:href"));
    }

    #[test]
    fn recognizes_namespace_declarations() {
        assert!(QualName::parse("xmlns").is_namespace_declaration());
        assert!(QualName::parse("xmlns:svg").is_namespace_declaration());
        assert!(!QualName::parse("svg:xmlns").is_namespace_declaration());
    }
}
