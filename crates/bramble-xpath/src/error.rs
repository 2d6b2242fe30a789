//! Query errors.

use bramble_dom::NodeId;
use thiserror::Error;

/// Why an XPath expression could not be compiled or evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XPathError {
    /// The expression is not valid XPath 1.0.
    #[error("syntax error at offset {position}: {message}")]
    Syntax {
        /// Character offset in the expression.
        position: usize,
        /// What was wrong.
        message: String,
    },

    /// The expression calls a function that does not exist.
    #[error("unknown function `{0}()`")]
    UnknownFunction(String),

    /// A function was called with the wrong number of arguments.
    #[error("`{name}()` takes {expected} argument(s), got {found}")]
    WrongArity {
        /// Function name.
        name: String,
        /// Accepted argument counts, for the message.
        expected: &'static str,
        /// Arguments given.
        found: usize,
    },

    /// A `$variable` has no value.
    #[error("unbound variable `${0}`")]
    UnboundVariable(String),

    /// A name test uses a prefix with no namespace binding.
    #[error("namespace prefix `{0}` is not bound")]
    UnboundPrefix(String),

    /// A location step or filter was applied to something other than a
    /// node-set.
    #[error("expected a node-set")]
    NotANodeSet,

    /// The expression nests deeper than the evaluator allows.
    #[error("expression nested too deeply")]
    TooDeep,

    /// The context node does not exist in the document.
    #[error("context node {0} not found")]
    NodeNotFound(NodeId),
}
