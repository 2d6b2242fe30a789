//! Error-tolerant HTML reading for the bramble toolkit.
//!
//! # Scope
//!
//! This crate implements:
//! - **Reader** ([`HtmlTokenizer`]): a permissive state machine that turns
//!   characters into fragments and never fails
//!   - text, raw text (`script`, `style`), comments and CDATA
//!   - quoted, unquoted and bare attributes
//!   - processing instructions and declarations such as `<!DOCTYPE>`
//! - **Tree builder** ([`DocumentBuilder`]): fragments to a
//!   [`Document`](bramble_dom::Document), with auto-closing driven by
//!   [`HtmlOptions`](bramble_dom::HtmlOptions) and hooks around each fragment
//! - **Loader** ([`HtmlParser`], [`load_bytes`], [`load_file`], ...): byte
//!   decoding with BOM sniffing and a single restart when the document
//!   declares its own encoding
//!
//! # Not Implemented
//!
//! - HTML5 insertion modes, foster parenting and formatting-element
//!   reconstruction
//! - Script execution

/// Tree construction from fragments.
pub mod builder;
/// Byte sources, decoding and the restart loop.
pub mod loader;
/// The fragment reader.
pub mod tokenizer;

pub use builder::{BuildContext, BuildHook, BuildSignal, DocumentBuilder, HookFlow};
pub use loader::{
    DecodedChars, ForwardSource, HtmlParser, HtmlSource, LoadError, LoadSettings, SeekableSource,
    load, load_bytes, load_file, load_reader, parse_str, parse_str_with,
};
pub use tokenizer::{
    CharAction, CharHook, FragmentKind, HtmlTokenizer, ReaderState, TokenizerState,
    close_tag_name,
};
