//! Per-tag read and write behavior.
//!
//! An [`HtmlOptions`] value holds two case-insensitive tables keyed by tag
//! name: one consulted by the tokenizer and tree builder while reading, one
//! consulted by the serializer while writing. It also carries the script
//! MIME types whose content is parsed as markup and the namespace URIs that
//! are treated as "no namespace".
//!
//! Options are immutable once shared; documents and readers hold them through
//! an [`Arc`], and [`HtmlOptions::shared_default`] hands out a process-wide
//! instance of the HTML defaults.

use std::collections::{HashMap, HashSet};
use std::ops::BitOr;
use std::sync::{Arc, LazyLock};

/// Flags that steer how an element is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReadFlags(u8);

impl ReadFlags {
    /// No special behavior.
    pub const NONE: Self = Self(0);
    /// The element never has children; the builder returns to the parent
    /// as soon as the opening tag ends.
    pub const VOID: Self = Self(1);
    /// Content is copied verbatim up to the matching close tag.
    pub const RAW_TEXT: Self = Self(1 << 1);
    /// The element may be closed implicitly by an ancestor's close tag
    /// without recording an error.
    pub const AUTO_CLOSE: Self = Self(1 << 2);
    /// Opening an element of the same name while this one is current closes
    /// this one first (`<li>a<li>b`).
    pub const CLOSES_SIBLING: Self = Self(1 << 3);

    /// Whether every flag in `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Both sets of flags combined.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ReadFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Flags that steer how an element is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WriteFlags(u8);

impl WriteFlags {
    /// No special behavior.
    pub const NONE: Self = Self(0);
    /// Written as a void element (`<br>`, or `<br/>` in XHTML mode).
    pub const NO_CHILDREN: Self = Self(1);
    /// An end tag is always written, even for an empty or implicitly
    /// closed element.
    pub const ALWAYS_CLOSE: Self = Self(1 << 1);
    /// Written in the short `<x/>` form when the element has no children.
    pub const DEFER_CLOSE_IF_EMPTY: Self = Self(1 << 2);

    /// Whether every flag in `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Both sets of flags combined.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for WriteFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "command", "embed", "frame", "hr", "image",
    "img", "input", "isindex", "keygen", "link", "menuitem", "meta", "param", "source", "track",
    "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

const AUTO_CLOSE_TAGS: &[&str] = &[
    "html", "head", "body", "p", "li", "dt", "dd", "option", "optgroup", "tr", "td", "th", "thead",
    "tbody", "tfoot", "colgroup", "caption", "rt", "rp",
];

const SIBLING_CLOSE_TAGS: &[&str] = &["p", "li", "dt", "dd", "option", "tr", "td", "th"];

const ALWAYS_CLOSE_TAGS: &[&str] = &["script", "style", "textarea", "title", "iframe"];

const PARSED_SCRIPT_TYPES: &[&str] = &[
    "text/html",
    "text/x-template",
    "text/ng-template",
    "text/x-handlebars-template",
];

/// Namespace URI of XHTML documents.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

static SHARED_DEFAULT: LazyLock<Arc<HtmlOptions>> =
    LazyLock::new(|| Arc::new(HtmlOptions::default()));

/// Read/write tables and related settings.
///
/// Lookups are case-insensitive: keys are stored lowercased and queries are
/// lowercased before lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    read: HashMap<String, ReadFlags>,
    write: HashMap<String, WriteFlags>,
    parsed_script_types: HashSet<String>,
    empty_namespaces: HashSet<String>,
}

impl Default for HtmlOptions {
    /// The HTML defaults: void elements, raw-text `script`/`style`, the
    /// usual optional end tags, and always-closed `script`-like elements.
    fn default() -> Self {
        let mut options = Self::empty();
        for tag in VOID_TAGS {
            options.add_read_flags(tag, ReadFlags::VOID);
            options.add_write_flags(tag, WriteFlags::NO_CHILDREN);
        }
        for tag in RAW_TEXT_TAGS {
            options.add_read_flags(tag, ReadFlags::RAW_TEXT);
        }
        for tag in AUTO_CLOSE_TAGS {
            options.add_read_flags(tag, ReadFlags::AUTO_CLOSE);
        }
        for tag in SIBLING_CLOSE_TAGS {
            options.add_read_flags(tag, ReadFlags::CLOSES_SIBLING);
        }
        for tag in ALWAYS_CLOSE_TAGS {
            options.add_write_flags(tag, WriteFlags::ALWAYS_CLOSE);
        }
        options.parsed_script_types = PARSED_SCRIPT_TYPES.iter().map(|t| (*t).to_string()).collect();
        let _ = options.empty_namespaces.insert(XHTML_NAMESPACE.to_string());
        options
    }
}

impl HtmlOptions {
    /// Options with every table empty: no void, raw-text or auto-closing
    /// elements at all. Useful for reading XML-ish markup.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            read: HashMap::new(),
            write: HashMap::new(),
            parsed_script_types: HashSet::new(),
            empty_namespaces: HashSet::new(),
        }
    }

    /// A process-wide shared instance of [`HtmlOptions::default`].
    #[must_use]
    pub fn shared_default() -> Arc<Self> {
        Arc::clone(&SHARED_DEFAULT)
    }

    /// Read flags registered for `tag`.
    #[must_use]
    pub fn read_flags(&self, tag: &str) -> ReadFlags {
        self.read.get(&tag.to_ascii_lowercase()).copied().unwrap_or_default()
    }

    /// Write flags registered for `tag`.
    #[must_use]
    pub fn write_flags(&self, tag: &str) -> WriteFlags {
        self.write.get(&tag.to_ascii_lowercase()).copied().unwrap_or_default()
    }

    /// Replace the read flags of `tag`.
    #[must_use]
    pub fn with_read_flags(mut self, tag: &str, flags: ReadFlags) -> Self {
        let _ = self.read.insert(tag.to_ascii_lowercase(), flags);
        self
    }

    /// Replace the write flags of `tag`.
    #[must_use]
    pub fn with_write_flags(mut self, tag: &str, flags: WriteFlags) -> Self {
        let _ = self.write.insert(tag.to_ascii_lowercase(), flags);
        self
    }

    /// Register an additional script MIME type whose content is parsed as
    /// markup instead of raw text.
    #[must_use]
    pub fn with_parsed_script_type(mut self, mime: &str) -> Self {
        let _ = self.parsed_script_types.insert(mime.trim().to_ascii_lowercase());
        self
    }

    /// Register a namespace URI that is treated as "no namespace".
    #[must_use]
    pub fn with_empty_namespace(mut self, uri: &str) -> Self {
        let _ = self.empty_namespaces.insert(uri.to_string());
        self
    }

    /// Whether a `<script type=...>` with this type has its content parsed.
    #[must_use]
    pub fn is_parsed_script_type(&self, mime: &str) -> bool {
        self.parsed_script_types.contains(&mime.trim().to_ascii_lowercase())
    }

    /// Whether `uri` is registered as an empty namespace.
    #[must_use]
    pub fn is_empty_namespace(&self, uri: &str) -> bool {
        self.empty_namespaces.contains(uri)
    }

    fn add_read_flags(&mut self, tag: &str, flags: ReadFlags) {
        let entry = self.read.entry(tag.to_string()).or_default();
        *entry = entry.union(flags);
    }

    fn add_write_flags(&mut self, tag: &str, flags: WriteFlags) {
        let entry = self.write.entry(tag.to_string()).or_default();
        *entry = entry.union(flags);
    }
}
