//! Tree-cursor navigation and XPath 1.0 queries for bramble documents.
//!
//! # Scope
//!
//! This crate implements:
//! - **Cursor contract** ([`TreeCursor`]): in-place moves to parent, child,
//!   sibling, attribute and namespace positions, plus document-order
//!   comparison
//! - **DOM navigator** ([`DomNavigator`]): the contract over a live
//!   [`Document`](bramble_dom::Document), with an optional root boundary
//!   and case folding for HTML-style matching
//! - **XPath 1.0** ([`xpath`]): lexer, parser and an evaluator generic over
//!   any cursor, with all thirteen axes and the core function library
//! - **Convenience queries** ([`select_nodes`], [`select_single_node`],
//!   [`evaluate`]): scalar results come back as synthetic leaves
//!
//! # Not Implemented
//!
//! - XPath 2.0 and later
//! - Extension functions

/// The cursor contract.
pub mod cursor;
/// Query errors.
pub mod error;
/// The cursor over bramble documents.
pub mod navigator;
/// Queries against documents.
pub mod select;
pub mod xpath;

pub use cursor::{CursorNodeType, NamespaceScope, TreeCursor};
pub use error::XPathError;
pub use navigator::{CaseFolding, DomNavigator, NavigatorSettings, SelectedItem};
pub use select::{
    QuerySettings, evaluate, materialize, select_nodes, select_nodes_with, select_single_node,
};
pub use xpath::{Bindings, XPathExpression, XPathValue};
