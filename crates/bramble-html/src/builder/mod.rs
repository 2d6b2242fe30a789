//! Tree construction.
//!
//! [`DocumentBuilder`] drains an [`HtmlTokenizer`](crate::HtmlTokenizer)
//! into a [`Document`](bramble_dom::Document). It recovers from every kind
//! of malformed markup and records what it recovered from as parse errors.

mod core;
mod hooks;
mod meta;

pub use self::core::{BuildSignal, DocumentBuilder};
pub use hooks::{BuildContext, BuildHook, HookFlow};
pub use meta::{charset_from_content, meta_charset};
