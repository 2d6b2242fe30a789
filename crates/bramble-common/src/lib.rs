//! Shared utilities for the bramble HTML toolkit.
//!
//! - **Diagnostics** - deduplicated, colored warnings for recoverable oddities
//! - **Text helpers** - whitespace classification and name sanitizing
//! - **Limits** - depth guards shared by the DOM, the parser and the XPath layer

pub mod limits;
pub mod text;
pub mod warning;

pub use limits::{MAX_NESTING_DEPTH, MAX_TREE_DEPTH};
pub use warning::{clear_warnings, set_quiet, warn_once};
