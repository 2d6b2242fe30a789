//! Mutable arena DOM for the bramble HTML toolkit.
//!
//! This crate holds the document model produced by the HTML reader:
//!
//! - [`Document`] - node arena with a checked mutation API
//! - [`HtmlOptions`] - per-tag read and write tables
//! - [`ParseError`] / [`DomError`] - recorded diagnostics and API failures
//! - Serialization with memoized [`Document::outer_html`] and
//!   [`Document::inner_html`], plus event-based [`MarkupWriter`]s
//!
//! # Design
//!
//! All nodes live in one `Vec` and refer to each other by [`NodeId`], which
//! keeps parent/child/sibling links cheap and borrow-free. Parsed text and
//! attribute values are stored raw, so a document reproduces its source
//! markup; decoded views are computed on demand.

mod attribute;
mod debug;
mod document;
mod entities;
mod error;
mod name;
mod namespace;
mod node;
mod options;
mod query;
mod serialize;
mod writer;

pub use attribute::Attribute;
pub use document::{Ancestors, AttributeSlot, Descendants, Document};
pub use entities::{decode_entities, encode_text, lookup_entity};
pub use error::{DomError, ParseError, ParseErrorKind};
pub use name::QualName;
pub use namespace::{XML_NAMESPACE, XMLNS_NAMESPACE};
pub use node::{
    Closing, ElementData, ElementKind, Node, NodeId, NodeKind, SourcePosition, TextData,
    WriteHints,
};
pub use options::{HtmlOptions, ReadFlags, WriteFlags, XHTML_NAMESPACE};
pub use writer::{DomWriter, MarkupWriter, TextMarkupWriter};
