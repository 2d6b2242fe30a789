//! XPath 1.0 over any [`TreeCursor`](crate::TreeCursor).
//!
//! - [`ast`]: parsed expressions
//! - [`lexer`]: tokens with section 3.7 disambiguation
//! - [`parser`]: recursive descent with a nesting limit
//! - [`value`]: the four value types and their conversions
//! - [`eval`]: axes, predicates, operators and the core function library

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

use std::fmt;

pub use ast::{Axis, BinaryOp, Expr, NodeTest, Step};
pub use eval::{Bindings, document_order, evaluate};
pub use parser::{MAX_EXPRESSION_DEPTH, parse};
pub use value::{XPathValue, format_number, parse_number};

use crate::cursor::TreeCursor;
use crate::error::XPathError;

/// A parsed expression that can be evaluated many times.
#[derive(Debug, Clone, PartialEq)]
pub struct XPathExpression {
    source: String,
    expr: Expr,
}

impl XPathExpression {
    /// Parse `source`.
    ///
    /// # Errors
    ///
    /// Returns [`XPathError::Syntax`] or [`XPathError::TooDeep`].
    pub fn compile(source: &str) -> Result<Self, XPathError> {
        Ok(Self {
            source: source.to_string(),
            expr: parse(source)?,
        })
    }

    /// The text the expression was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed form.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate with `context` as the context node.
    ///
    /// # Errors
    ///
    /// See [`evaluate`].
    pub fn evaluate<C: TreeCursor>(
        &self,
        context: &C,
        bindings: &Bindings<C>,
    ) -> Result<XPathValue<C>, XPathError> {
        evaluate(&self.expr, context, bindings)
    }

    /// Evaluate and return cursors: the node-set itself, or a single scalar
    /// leaf holding the string value of any other result.
    ///
    /// # Errors
    ///
    /// See [`evaluate`].
    pub fn select<C: TreeCursor>(
        &self,
        context: &C,
        bindings: &Bindings<C>,
    ) -> Result<Vec<C>, XPathError> {
        Ok(match self.evaluate(context, bindings)? {
            XPathValue::NodeSet(nodes) => nodes,
            scalar => vec![context.scalar(&scalar.to_xpath_string())],
        })
    }
}

impl fmt::Display for XPathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
