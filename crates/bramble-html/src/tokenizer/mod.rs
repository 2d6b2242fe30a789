//! The HTML reader.
//!
//! A small, permissive state machine that splits markup into fragments
//! (tag names, attributes, text, comments) while keeping every character of
//! the input. It does no tree construction; see
//! [`DocumentBuilder`](crate::DocumentBuilder) for that.

mod core;
/// Fragment snapshots.
pub mod fragment;
mod helpers;
/// Character-level hooks.
pub mod hooks;

pub use self::core::{HtmlTokenizer, TokenizerState};
pub use fragment::{FragmentKind, ReaderState, close_tag_name};
pub use hooks::{CharAction, CharHook};
