//! Parsed XPath 1.0 expressions.

use std::fmt;

use strum_macros::{Display, EnumString};

/// An XPath expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// String literal.
    Literal(String),
    /// `$name`, without the `$`.
    Variable(String),
    /// Binary operator application.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Unary minus.
    Negate(Box<Expr>),
    /// Function call.
    Call {
        /// Function name as written.
        name: String,
        /// Argument expressions.
        args: Vec<Expr>,
    },
    /// A location path. Absolute paths start at the root; an absolute path
    /// with no steps is `/` itself.
    Path {
        /// Whether the path starts with `/` or `//`.
        absolute: bool,
        /// Steps, applied left to right.
        steps: Vec<Step>,
    },
    /// A primary expression with predicates and an optional trailing path,
    /// as in `(//a)[1]/@href`.
    Filter {
        /// The filtered expression.
        primary: Box<Expr>,
        /// Predicates applied to the primary's node-set.
        predicates: Vec<Expr>,
        /// Steps applied after the predicates.
        steps: Vec<Step>,
    },
    /// `a | b`.
    Union(Box<Expr>, Box<Expr>),
}

/// Binary operators, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BinaryOp {
    /// `or`
    #[strum(serialize = "or")]
    Or,
    /// `and`
    #[strum(serialize = "and")]
    And,
    /// `=`
    #[strum(serialize = "=")]
    Eq,
    /// `!=`
    #[strum(serialize = "!=")]
    Neq,
    /// `<`
    #[strum(serialize = "<")]
    Lt,
    /// `<=`
    #[strum(serialize = "<=")]
    Lte,
    /// `>`
    #[strum(serialize = ">")]
    Gt,
    /// `>=`
    #[strum(serialize = ">=")]
    Gte,
    /// `+`
    #[strum(serialize = "+")]
    Add,
    /// `-`
    #[strum(serialize = "-")]
    Sub,
    /// `*`
    #[strum(serialize = "*")]
    Mul,
    /// `div`
    #[strum(serialize = "div")]
    Div,
    /// `mod`
    #[strum(serialize = "mod")]
    Mod,
}

/// One location step: `axis::test[predicate]...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Direction of selection.
    pub axis: Axis,
    /// Filter on the candidates' kind or name.
    pub test: NodeTest,
    /// Predicates, applied in order.
    pub predicates: Vec<Expr>,
}

impl Step {
    /// A step with no predicates.
    #[must_use]
    pub const fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: Vec::new(),
        }
    }

    /// The step `//` abbreviates.
    #[must_use]
    pub const fn descendant_or_self() -> Self {
        Self::new(Axis::DescendantOrSelf, NodeTest::Node)
    }
}

/// The thirteen XPath axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Axis {
    /// Direct children.
    Child,
    /// All descendants.
    Descendant,
    /// The parent.
    Parent,
    /// All ancestors, nearest first.
    Ancestor,
    /// Later siblings.
    FollowingSibling,
    /// Earlier siblings, nearest first.
    PrecedingSibling,
    /// Everything after in document order, minus descendants.
    Following,
    /// Everything before in document order, minus ancestors.
    Preceding,
    /// Attributes.
    Attribute,
    /// In-scope namespace bindings.
    Namespace,
    /// The context node.
    #[strum(serialize = "self")]
    SelfAxis,
    /// The context node and its descendants.
    DescendantOrSelf,
    /// The context node and its ancestors.
    AncestorOrSelf,
}

impl Axis {
    /// Whether positions along this axis count backwards in document order.
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(
            self,
            Self::Ancestor | Self::AncestorOrSelf | Self::Preceding | Self::PrecedingSibling
        )
    }
}

/// What a step keeps from its axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A name, optionally prefixed.
    Name {
        /// Prefix, resolved against the query's namespace bindings.
        prefix: Option<String>,
        /// Local name.
        local: String,
    },
    /// `*`
    Any,
    /// `prefix:*`
    AnyInNamespace(String),
    /// `node()`
    Node,
    /// `text()`
    Text,
    /// `comment()`
    Comment,
    /// `processing-instruction()` with an optional target.
    ProcessingInstruction(Option<String>),
}

impl fmt::Display for NodeTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name {
                prefix: Some(prefix),
                local,
            } => write!(f, "{prefix}:{local}"),
            Self::Name {
                prefix: None,
                local,
            } => f.write_str(local),
            Self::Any => f.write_str("*"),
            Self::AnyInNamespace(prefix) => write!(f, "{prefix}:*"),
            Self::Node => f.write_str("node()"),
            Self::Text => f.write_str("text()"),
            Self::Comment => f.write_str("comment()"),
            Self::ProcessingInstruction(None) => f.write_str("processing-instruction()"),
            Self::ProcessingInstruction(Some(target)) => {
                write!(f, "processing-instruction('{target}')")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_names() {
        assert_eq!(Axis::FollowingSibling.to_string(), "following-sibling");
        assert_eq!(Axis::SelfAxis.to_string(), "self");
        assert_eq!("descendant-or-self".parse::<Axis>(), Ok(Axis::DescendantOrSelf));
        assert_eq!("self".parse::<Axis>(), Ok(Axis::SelfAxis));
        assert!("children".parse::<Axis>().is_err());
    }

    #[test]
    fn test_reverse_axes() {
        assert!(Axis::Ancestor.is_reverse());
        assert!(Axis::PrecedingSibling.is_reverse());
        assert!(!Axis::Child.is_reverse());
        assert!(!Axis::Following.is_reverse());
    }

    #[test]
    fn test_node_test_display() {
        let name = NodeTest::Name {
            prefix: Some("svg".to_string()),
            local: "rect".to_string(),
        };
        assert_eq!(name.to_string(), "svg:rect");
        assert_eq!(NodeTest::AnyInNamespace("svg".to_string()).to_string(), "svg:*");
        assert_eq!(
            NodeTest::ProcessingInstruction(Some("php".to_string())).to_string(),
            "processing-instruction('php')"
        );
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(BinaryOp::Lte.to_string(), "<=");
        assert_eq!(BinaryOp::Mod.to_string(), "mod");
    }
}
