//! XPath expression tokens.
//!
//! Names are classified as they are read, using the disambiguation rules of
//! XPath 1.0 section 3.7: after an operand, `*` multiplies and `and`, `or`,
//! `div`, `mod` are operators; a name before `(` is a function or node type;
//! a name before `::` is an axis.

use std::fmt;

use crate::error::XPathError;

const NODE_TYPES: [&str; 4] = ["comment", "text", "processing-instruction", "node"];

/// One lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `@`
    At,
    /// `,`
    Comma,
    /// `::`
    ColonColon,
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
    /// `|`
    Pipe,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*` as multiplication.
    Multiply,
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `and`
    And,
    /// `or`
    Or,
    /// `div`
    Div,
    /// `mod`
    Mod,
    /// Numeric literal.
    Number(f64),
    /// String literal, without quotes.
    Literal(String),
    /// `$name`, without the `$`.
    Variable(String),
    /// A name test: `name`, `prefix:name`, `prefix:*` or `*`.
    NameTest(String),
    /// A name followed by `(`.
    FunctionName(String),
    /// `node`, `text`, `comment` or `processing-instruction` before `(`.
    NodeType(String),
    /// A name followed by `::`.
    AxisName(String),
}

impl Token {
    /// Whether an operator may follow this token.
    const fn ends_operand(&self) -> bool {
        matches!(
            self,
            Self::RightParen
                | Self::RightBracket
                | Self::Dot
                | Self::DotDot
                | Self::Number(_)
                | Self::Literal(_)
                | Self::Variable(_)
                | Self::NameTest(_)
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::Dot => ".",
            Self::DotDot => "..",
            Self::At => "@",
            Self::Comma => ",",
            Self::ColonColon => "::",
            Self::Slash => "/",
            Self::DoubleSlash => "//",
            Self::Pipe => "|",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "and",
            Self::Or => "or",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Number(n) => return write!(f, "{n}"),
            Self::Literal(s) => return write!(f, "\"{s}\""),
            Self::Variable(s) => return write!(f, "${s}"),
            Self::NameTest(s) | Self::FunctionName(s) | Self::NodeType(s) | Self::AxisName(s) => {
                s.as_str()
            }
        };
        f.write_str(symbol)
    }
}

/// A token and the character offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Character offset in the expression.
    pub position: usize,
}

/// Split `input` into tokens.
///
/// # Errors
///
/// Returns [`XPathError::Syntax`] for unterminated literals and characters
/// that cannot start a token.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, XPathError> {
    let mut lexer = Lexer {
        chars: input.chars().collect(),
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<Spanned>,
}

impl Lexer {
    fn run(&mut self) -> Result<(), XPathError> {
        loop {
            while self.peek(0).is_some_and(is_xml_space) {
                self.pos += 1;
            }
            let start = self.pos;
            let Some(c) = self.peek(0) else {
                return Ok(());
            };
            let token = match c {
                '(' => self.single(Token::LeftParen),
                ')' => self.single(Token::RightParen),
                '[' => self.single(Token::LeftBracket),
                ']' => self.single(Token::RightBracket),
                '@' => self.single(Token::At),
                ',' => self.single(Token::Comma),
                '|' => self.single(Token::Pipe),
                '+' => self.single(Token::Plus),
                '-' => self.single(Token::Minus),
                '=' => self.single(Token::Equal),
                '*' => {
                    self.pos += 1;
                    if self.after_operand() {
                        Token::Multiply
                    } else {
                        Token::NameTest("*".to_string())
                    }
                }
                '/' => self.pair('/', Token::DoubleSlash, Token::Slash),
                '<' => self.pair('=', Token::LessEqual, Token::Less),
                '>' => self.pair('=', Token::GreaterEqual, Token::Greater),
                '!' if self.peek(1) == Some('=') => {
                    self.pos += 2;
                    Token::NotEqual
                }
                ':' if self.peek(1) == Some(':') => {
                    self.pos += 2;
                    Token::ColonColon
                }
                '.' if self.peek(1) == Some('.') => {
                    self.pos += 2;
                    Token::DotDot
                }
                '.' if self.peek(1).is_some_and(|d| d.is_ascii_digit()) => self.number(start)?,
                '.' => self.single(Token::Dot),
                '0'..='9' => self.number(start)?,
                '"' | '\'' => self.literal(c, start)?,
                '$' => {
                    self.pos += 1;
                    match self.qname() {
                        Some(name) => Token::Variable(name),
                        None => return Err(syntax(start, "expected a name after `$`")),
                    }
                }
                c if is_name_start(c) => self.name(),
                other => return Err(syntax(start, &format!("unexpected character `{other}`"))),
            };
            self.tokens.push(Spanned {
                token,
                position: start,
            });
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn pair(&mut self, second: char, long: Token, short: Token) -> Token {
        if self.peek(1) == Some(second) {
            self.pos += 2;
            long
        } else {
            self.pos += 1;
            short
        }
    }

    fn after_operand(&self) -> bool {
        self.tokens.last().is_some_and(|t| t.token.ends_operand())
    }

    fn next_significant(&self) -> Option<char> {
        self.chars[self.pos..].iter().copied().find(|&c| !is_xml_space(c))
    }

    fn followed_by_axis_separator(&self) -> bool {
        let rest = self.chars[self.pos..].iter().copied().skip_while(|&c| is_xml_space(c));
        rest.take(2).eq([':', ':'])
    }

    fn number(&mut self, start: usize) -> Result<Token, XPathError> {
        while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek(0) == Some('.') {
            self.pos += 1;
            while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse()
            .map(Token::Number)
            .map_err(|_| syntax(start, &format!("invalid number `{text}`")))
    }

    fn literal(&mut self, quote: char, start: usize) -> Result<Token, XPathError> {
        self.pos += 1;
        let body = self.pos;
        while self.peek(0).is_some_and(|c| c != quote) {
            self.pos += 1;
        }
        if self.peek(0).is_none() {
            return Err(syntax(start, "unterminated string literal"));
        }
        let text = self.chars[body..self.pos].iter().collect();
        self.pos += 1;
        Ok(Token::Literal(text))
    }

    /// `NCName` or `NCName:NCName`.
    fn qname(&mut self) -> Option<String> {
        let start = self.pos;
        if !self.peek(0).is_some_and(is_name_start) {
            return None;
        }
        while self.peek(0).is_some_and(is_name_char) {
            self.pos += 1;
        }
        if self.peek(0) == Some(':') && self.peek(1).is_some_and(is_name_start) {
            self.pos += 1;
            while self.peek(0).is_some_and(is_name_char) {
                self.pos += 1;
            }
        }
        Some(self.chars[start..self.pos].iter().collect())
    }

    fn name(&mut self) -> Token {
        let mut name = self.qname().unwrap_or_default();

        if self.after_operand() {
            match name.as_str() {
                "and" => return Token::And,
                "or" => return Token::Or,
                "div" => return Token::Div,
                "mod" => return Token::Mod,
                _ => {}
            }
        }

        // prefix:*
        if self.peek(0) == Some(':') && self.peek(1) == Some('*') && !name.contains(':') {
            self.pos += 2;
            name.push_str(":*");
            return Token::NameTest(name);
        }

        if self.followed_by_axis_separator() {
            return Token::AxisName(name);
        }
        if self.next_significant() == Some('(') {
            return if NODE_TYPES.contains(&name.as_str()) {
                Token::NodeType(name)
            } else {
                Token::FunctionName(name)
            };
        }
        Token::NameTest(name)
    }
}

const fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || matches!(c, '-' | '.' | '\u{B7}') || c.is_numeric()
}

fn syntax(position: usize, message: &str) -> XPathError {
    XPathError::Syntax {
        position,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .expect("tokenize")
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_star_disambiguation() {
        assert_eq!(
            kinds("* * 2"),
            vec![
                Token::NameTest("*".to_string()),
                Token::Multiply,
                Token::Number(2.0)
            ]
        );
    }

    #[test]
    fn test_operator_names() {
        assert_eq!(
            kinds("div div div"),
            vec![
                Token::NameTest("div".to_string()),
                Token::Div,
                Token::NameTest("div".to_string())
            ]
        );
    }

    #[test]
    fn test_function_axis_and_node_type() {
        assert_eq!(
            kinds("count(child::text())"),
            vec![
                Token::FunctionName("count".to_string()),
                Token::LeftParen,
                Token::AxisName("child".to_string()),
                Token::ColonColon,
                Token::NodeType("text".to_string()),
                Token::LeftParen,
                Token::RightParen,
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_prefixed_names() {
        assert_eq!(
            kinds("svg:rect | svg:*"),
            vec![
                Token::NameTest("svg:rect".to_string()),
                Token::Pipe,
                Token::NameTest("svg:*".to_string())
            ]
        );
    }

    #[test]
    fn test_numbers_and_literals() {
        assert_eq!(
            kinds(".5 + 'a' - \"b\""),
            vec![
                Token::Number(0.5),
                Token::Plus,
                Token::Literal("a".to_string()),
                Token::Minus,
                Token::Literal("b".to_string())
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("a  = $v").expect("tokenize");
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 3, 5]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            tokenize("'open"),
            Err(XPathError::Syntax { position: 0, .. })
        ));
        assert!(matches!(
            tokenize("a # b"),
            Err(XPathError::Syntax { position: 2, .. })
        ));
    }
}
