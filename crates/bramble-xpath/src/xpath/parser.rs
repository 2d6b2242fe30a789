//! Recursive-descent parser for XPath 1.0.
//!
//! Precedence, loosest first: `or`, `and`, equality, relational, additive,
//! multiplicative, unary minus, union, then paths and filter expressions.

use super::ast::{Axis, BinaryOp, Expr, NodeTest, Step};
use super::lexer::{Spanned, Token, tokenize};
use crate::error::XPathError;

/// Deepest nesting of parenthesised expressions, predicates, calls and
/// unary minus signs accepted.
pub const MAX_EXPRESSION_DEPTH: usize = 64;

/// Parse an expression.
///
/// # Errors
///
/// Returns [`XPathError::Syntax`] for malformed input and
/// [`XPathError::TooDeep`] when nesting exceeds [`MAX_EXPRESSION_DEPTH`].
pub fn parse(input: &str) -> Result<Expr, XPathError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(XPathError::Syntax {
            position: 0,
            message: "empty expression".to_string(),
        });
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        end: input.chars().count(),
    };
    let expr = parser.expr()?;
    if let Some(extra) = parser.peek() {
        let message = format!("unexpected `{extra}` after expression");
        return Err(parser.error(&message));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
    end: usize,
}

impl Parser {
    // =========================================================================
    // Token access
    // =========================================================================

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), XPathError> {
        if self.eat(token) {
            Ok(())
        } else {
            let message = format!("expected `{token}`, found {}", self.describe());
            Err(self.error(&message))
        }
    }

    fn describe(&self) -> String {
        self.peek()
            .map_or_else(|| "end of expression".to_string(), |t| format!("`{t}`"))
    }

    fn error(&self, message: &str) -> XPathError {
        XPathError::Syntax {
            position: self.tokens.get(self.pos).map_or(self.end, |s| s.position),
            message: message.to_string(),
        }
    }

    fn enter(&mut self) -> Result<(), XPathError> {
        self.depth += 1;
        if self.depth > MAX_EXPRESSION_DEPTH {
            Err(XPathError::TooDeep)
        } else {
            Ok(())
        }
    }

    const fn leave(&mut self) {
        self.depth -= 1;
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn expr(&mut self) -> Result<Expr, XPathError> {
        self.enter()?;
        let expr = self.or_expr();
        self.leave();
        expr
    }

    fn binary(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, XPathError>,
        operators: &[(Token, BinaryOp)],
    ) -> Result<Expr, XPathError> {
        let mut left = operand(self)?;
        'outer: loop {
            for (token, op) in operators {
                if self.eat(token) {
                    let right = operand(self)?;
                    left = Expr::Binary {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                    continue 'outer;
                }
            }
            return Ok(left);
        }
    }

    fn or_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary(Self::and_expr, &[(Token::Or, BinaryOp::Or)])
    }

    fn and_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary(Self::equality_expr, &[(Token::And, BinaryOp::And)])
    }

    fn equality_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary(
            Self::relational_expr,
            &[(Token::Equal, BinaryOp::Eq), (Token::NotEqual, BinaryOp::Neq)],
        )
    }

    fn relational_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary(
            Self::additive_expr,
            &[
                (Token::Less, BinaryOp::Lt),
                (Token::LessEqual, BinaryOp::Lte),
                (Token::Greater, BinaryOp::Gt),
                (Token::GreaterEqual, BinaryOp::Gte),
            ],
        )
    }

    fn additive_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary(
            Self::multiplicative_expr,
            &[(Token::Plus, BinaryOp::Add), (Token::Minus, BinaryOp::Sub)],
        )
    }

    fn multiplicative_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary(
            Self::unary_expr,
            &[
                (Token::Multiply, BinaryOp::Mul),
                (Token::Div, BinaryOp::Div),
                (Token::Mod, BinaryOp::Mod),
            ],
        )
    }

    fn unary_expr(&mut self) -> Result<Expr, XPathError> {
        if self.eat(&Token::Minus) {
            self.enter()?;
            let inner = self.unary_expr();
            self.leave();
            Ok(Expr::Negate(Box::new(inner?)))
        } else {
            self.union_expr()
        }
    }

    fn union_expr(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.path_expr()?;
        while self.eat(&Token::Pipe) {
            let right = self.path_expr()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // =========================================================================
    // Paths
    // =========================================================================

    fn path_expr(&mut self) -> Result<Expr, XPathError> {
        match self.peek() {
            Some(
                Token::Variable(_)
                | Token::Literal(_)
                | Token::Number(_)
                | Token::LeftParen
                | Token::FunctionName(_),
            ) => self.filter_expr(),
            Some(Token::Slash) => {
                self.pos += 1;
                let mut steps = Vec::new();
                if self.at_step_start() {
                    self.relative_path(&mut steps)?;
                }
                Ok(Expr::Path {
                    absolute: true,
                    steps,
                })
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                let mut steps = vec![Step::descendant_or_self()];
                self.relative_path(&mut steps)?;
                Ok(Expr::Path {
                    absolute: true,
                    steps,
                })
            }
            _ if self.at_step_start() => {
                let mut steps = Vec::new();
                self.relative_path(&mut steps)?;
                Ok(Expr::Path {
                    absolute: false,
                    steps,
                })
            }
            _ => {
                let message = format!("expected an expression, found {}", self.describe());
                Err(self.error(&message))
            }
        }
    }

    fn filter_expr(&mut self) -> Result<Expr, XPathError> {
        let primary = self.primary_expr()?;
        let predicates = self.predicates()?;
        let mut steps = Vec::new();
        if self.eat(&Token::DoubleSlash) {
            steps.push(Step::descendant_or_self());
            self.relative_path(&mut steps)?;
        } else if self.eat(&Token::Slash) {
            self.relative_path(&mut steps)?;
        }
        if predicates.is_empty() && steps.is_empty() {
            Ok(primary)
        } else {
            Ok(Expr::Filter {
                primary: Box::new(primary),
                predicates,
                steps,
            })
        }
    }

    fn primary_expr(&mut self) -> Result<Expr, XPathError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error("unexpected end of expression"));
        };
        match token {
            Token::Variable(name) => {
                self.pos += 1;
                Ok(Expr::Variable(name))
            }
            Token::Literal(value) => {
                self.pos += 1;
                Ok(Expr::Literal(value))
            }
            Token::Number(value) => {
                self.pos += 1;
                Ok(Expr::Number(value))
            }
            Token::LeftParen => {
                self.pos += 1;
                let inner = self.expr()?;
                self.expect(&Token::RightParen)?;
                Ok(inner)
            }
            Token::FunctionName(name) => {
                self.pos += 1;
                self.expect(&Token::LeftParen)?;
                self.enter()?;
                let args = self.arguments();
                self.leave();
                Ok(Expr::Call { name, args: args? })
            }
            other => {
                let message = format!("expected a primary expression, found `{other}`");
                Err(self.error(&message))
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, XPathError> {
        let mut args = Vec::new();
        if self.eat(&Token::RightParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RightParen)?;
            return Ok(args);
        }
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Dot
                    | Token::DotDot
                    | Token::At
                    | Token::AxisName(_)
                    | Token::NodeType(_)
                    | Token::NameTest(_)
            )
        )
    }

    fn relative_path(&mut self, steps: &mut Vec<Step>) -> Result<(), XPathError> {
        steps.push(self.step()?);
        loop {
            if self.eat(&Token::DoubleSlash) {
                steps.push(Step::descendant_or_self());
                steps.push(self.step()?);
            } else if self.eat(&Token::Slash) {
                steps.push(self.step()?);
            } else {
                return Ok(());
            }
        }
    }

    fn step(&mut self) -> Result<Step, XPathError> {
        if self.eat(&Token::Dot) {
            return Ok(Step::new(Axis::SelfAxis, NodeTest::Node));
        }
        if self.eat(&Token::DotDot) {
            return Ok(Step::new(Axis::Parent, NodeTest::Node));
        }

        let axis = if self.eat(&Token::At) {
            Axis::Attribute
        } else if let Some(Token::AxisName(name)) = self.peek() {
            let Ok(axis) = name.parse::<Axis>() else {
                let message = format!("unknown axis `{name}`");
                return Err(self.error(&message));
            };
            self.pos += 1;
            self.expect(&Token::ColonColon)?;
            axis
        } else {
            Axis::Child
        };

        let test = self.node_test()?;
        let predicates = self.predicates()?;
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn node_test(&mut self) -> Result<NodeTest, XPathError> {
        match self.peek().cloned() {
            Some(Token::NameTest(name)) => {
                self.pos += 1;
                Ok(if name == "*" {
                    NodeTest::Any
                } else if let Some((prefix, local)) = name.split_once(':') {
                    if local == "*" {
                        NodeTest::AnyInNamespace(prefix.to_string())
                    } else {
                        NodeTest::Name {
                            prefix: Some(prefix.to_string()),
                            local: local.to_string(),
                        }
                    }
                } else {
                    NodeTest::Name {
                        prefix: None,
                        local: name,
                    }
                })
            }
            Some(Token::NodeType(kind)) => {
                self.pos += 1;
                self.expect(&Token::LeftParen)?;
                let test = match kind.as_str() {
                    "node" => NodeTest::Node,
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    _ => {
                        if let Some(Token::Literal(target)) = self.peek().cloned() {
                            self.pos += 1;
                            NodeTest::ProcessingInstruction(Some(target))
                        } else {
                            NodeTest::ProcessingInstruction(None)
                        }
                    }
                };
                self.expect(&Token::RightParen)?;
                Ok(test)
            }
            _ => {
                let message = format!("expected a node test, found {}", self.describe());
                Err(self.error(&message))
            }
        }
    }

    fn predicates(&mut self) -> Result<Vec<Expr>, XPathError> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LeftBracket) {
            predicates.push(self.expr()?);
            self.expect(&Token::RightBracket)?;
        }
        Ok(predicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(local: &str) -> NodeTest {
        NodeTest::Name {
            prefix: None,
            local: local.to_string(),
        }
    }

    #[test]
    fn test_root_only() {
        assert_eq!(
            parse("/").expect("parse"),
            Expr::Path {
                absolute: true,
                steps: vec![]
            }
        );
    }

    #[test]
    fn test_abbreviated_descendant() {
        let Expr::Path { absolute, steps } = parse("//li").expect("parse") else {
            panic!("expected a path");
        };
        assert!(absolute);
        assert_eq!(steps, vec![Step::descendant_or_self(), Step::new(Axis::Child, name("li"))]);
    }

    #[test]
    fn test_abbreviated_steps() {
        let Expr::Path { steps, .. } = parse("../@href").expect("parse") else {
            panic!("expected a path");
        };
        assert_eq!(
            steps,
            vec![
                Step::new(Axis::Parent, NodeTest::Node),
                Step::new(Axis::Attribute, name("href"))
            ]
        );
    }

    #[test]
    fn test_precedence() {
        let Expr::Binary { op, right, .. } = parse("1 + 2 * 3").expect("parse") else {
            panic!("expected a binary expression");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. }));

        let Expr::Binary { op, .. } = parse("a = 1 or b").expect("parse") else {
            panic!("expected a binary expression");
        };
        assert_eq!(op, BinaryOp::Or);
    }

    #[test]
    fn test_filter_with_path() {
        let Expr::Filter {
            predicates, steps, ..
        } = parse("(//a)[1]/@href").expect("parse")
        else {
            panic!("expected a filter");
        };
        assert_eq!(predicates, vec![Expr::Number(1.0)]);
        assert_eq!(steps, vec![Step::new(Axis::Attribute, name("href"))]);
    }

    #[test]
    fn test_explicit_axes_and_tests() {
        let Expr::Path { steps, .. } =
            parse("ancestor-or-self::svg:*/processing-instruction('php')").expect("parse")
        else {
            panic!("expected a path");
        };
        assert_eq!(steps[0].axis, Axis::AncestorOrSelf);
        assert_eq!(steps[0].test, NodeTest::AnyInNamespace("svg".to_string()));
        assert_eq!(
            steps[1].test,
            NodeTest::ProcessingInstruction(Some("php".to_string()))
        );
    }

    #[test]
    fn test_syntax_errors() {
        for input in ["", "//", "a[", "count(1,", "foo::bar", "1 +", "a b"] {
            assert!(
                matches!(parse(input), Err(XPathError::Syntax { .. })),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert_eq!(parse(&deep), Err(XPathError::TooDeep));
        let negated = format!("{}1", "-".repeat(500));
        assert_eq!(parse(&negated), Err(XPathError::TooDeep));
        assert!(parse("((((1))))").is_ok());
    }
}
