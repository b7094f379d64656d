use std::iter::Peekable;
use std::str::CharIndices;

use super::context::canonical_group;
use super::{EvaluationContext, ExpressionError, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Literal(Value),
    Field {
        /// Group name in the evaluation context.
        group: String,
        /// Identifier as written, used in error messages.
        binding: String,
        field: String,
    },
    Neg(Box<Node>),
    Binary {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
}

impl Node {
    pub(crate) fn evaluate(&self, context: &EvaluationContext) -> Result<Value, ExpressionError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Field {
                group,
                binding,
                field,
            } => context
                .lookup(group, field)
                .cloned()
                .ok_or_else(|| ExpressionError::UnboundField {
                    group: binding.clone(),
                    field: field.clone(),
                }),
            Self::Neg(inner) => match inner.evaluate(context)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(ExpressionError::Type(format!(
                    "cannot negate {} value",
                    other.type_name()
                ))),
            },
            Self::Binary { op, lhs, rhs } => {
                let lhs = lhs.evaluate(context)?;
                let rhs = rhs.evaluate(context)?;
                apply(*op, lhs, rhs)
            }
        }
    }

    pub(crate) fn collect_references<'a>(&'a self, refs: &mut Vec<(&'a str, &'a str)>) {
        match self {
            Self::Literal(_) => {}
            Self::Field { group, field, .. } => refs.push((group, field)),
            Self::Neg(inner) => inner.collect_references(refs),
            Self::Binary { lhs, rhs, .. } => {
                lhs.collect_references(refs);
                rhs.collect_references(refs);
            }
        }
    }
}

fn apply(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, ExpressionError> {
    match (op, lhs, rhs) {
        (BinaryOp::Add, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (BinaryOp::Add, a @ Value::Text(_), b) | (BinaryOp::Add, a, b @ Value::Text(_)) => {
            Ok(Value::Text(format!("{a}{b}")))
        }
        (BinaryOp::Sub, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
        (BinaryOp::Mul, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
        (BinaryOp::Div, Value::Number(_), Value::Number(b)) if b == 0.0 => {
            Err(ExpressionError::DivisionByZero)
        }
        (BinaryOp::Div, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
        (op, a, b) => Err(ExpressionError::Type(format!(
            "operator {} is not defined for {} and {}",
            op_symbol(op),
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn op_symbol(op: BinaryOp) -> char {
    match op {
        BinaryOp::Add => '+',
        BinaryOp::Sub => '-',
        BinaryOp::Mul => '*',
        BinaryOp::Div => '/',
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LBracket,
    RBracket,
    LParen,
    RParen,
}

/// Deepest allowed nesting of parentheses and unary minus.
const MAX_DEPTH: usize = 64;

/// Largest accepted expression, in tokens. Bounds the tree size, and with it
/// the recursion depth of evaluation.
const MAX_TOKENS: usize = 1024;

pub(crate) fn parse(source: &str) -> Result<Node, ExpressionError> {
    let tokens = tokenize(source)?;
    if let Some((_, offset)) = tokens.get(MAX_TOKENS) {
        return Err(parse_error(
            source,
            *offset,
            format!("expression exceeds {MAX_TOKENS} tokens"),
        ));
    }
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        depth: 0,
    };
    let node = parser.expr()?;
    if let Some((token, offset)) = parser.tokens.get(parser.pos) {
        return Err(parser.error_at(*offset, format!("unexpected {token:?}")));
    }
    Ok(node)
}

fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '+' => single(&mut chars, Token::Plus),
            '-' => single(&mut chars, Token::Minus),
            '*' => single(&mut chars, Token::Star),
            '/' => single(&mut chars, Token::Slash),
            '[' => single(&mut chars, Token::LBracket),
            ']' => single(&mut chars, Token::RBracket),
            '(' => single(&mut chars, Token::LParen),
            ')' => single(&mut chars, Token::RParen),
            '\'' | '"' => string_literal(source, &mut chars)?,
            c if c.is_ascii_digit() || c == '.' => number(source, &mut chars)?,
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                Token::Ident(ident)
            }
            other => {
                return Err(parse_error(
                    source,
                    offset,
                    format!("unexpected character '{other}'"),
                ))
            }
        };
        tokens.push((token, offset));
    }

    Ok(tokens)
}

fn single(chars: &mut Peekable<CharIndices<'_>>, token: Token) -> Token {
    chars.next();
    token
}

fn string_literal(
    source: &str,
    chars: &mut Peekable<CharIndices<'_>>,
) -> Result<Token, ExpressionError> {
    let (start, quote) = chars.next().unwrap_or((source.len(), '\''));
    let mut text = String::new();
    loop {
        match chars.next() {
            Some((_, '\\')) => match chars.next() {
                Some((_, escaped)) => text.push(escaped),
                None => break,
            },
            Some((_, c)) if c == quote => return Ok(Token::Str(text)),
            Some((_, c)) => text.push(c),
            None => break,
        }
    }
    Err(parse_error(source, start, "unterminated string literal"))
}

fn number(source: &str, chars: &mut Peekable<CharIndices<'_>>) -> Result<Token, ExpressionError> {
    let start = chars.peek().map(|&(offset, _)| offset).unwrap_or(source.len());
    let mut end = start;
    while let Some(&(offset, c)) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            end = offset + c.len_utf8();
            chars.next();
        } else {
            break;
        }
    }
    source[start..end]
        .parse::<f64>()
        .map(Token::Number)
        .map_err(|_| parse_error(source, start, format!("invalid number '{}'", &source[start..end])))
}

fn parse_error(source: &str, offset: usize, message: impl Into<String>) -> ExpressionError {
    ExpressionError::Parse {
        expression: source.to_string(),
        offset,
        message: message.into(),
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, offset)| *offset)
            .unwrap_or(self.source.len())
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> ExpressionError {
        parse_error(self.source, offset, message)
    }

    fn descend(&mut self, offset: usize) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error_at(offset, format!("nesting deeper than {MAX_DEPTH}")));
        }
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), ExpressionError> {
        let offset = self.offset();
        match self.next() {
            Some((token, _)) if token == expected => Ok(()),
            Some((token, _)) => {
                Err(self.error_at(offset, format!("expected {expected:?}, found {token:?}")))
            }
            None => Err(self.error_at(offset, format!("expected {expected:?}, found end of input"))),
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Node, ExpressionError> {
        let mut node = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(node),
            };
            self.pos += 1;
            let rhs = self.term()?;
            node = Node::Binary {
                op,
                lhs: Box::new(node),
                rhs: Box::new(rhs),
            };
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<Node, ExpressionError> {
        let mut node = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(node),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            node = Node::Binary {
                op,
                lhs: Box::new(node),
                rhs: Box::new(rhs),
            };
        }
    }

    fn unary(&mut self) -> Result<Node, ExpressionError> {
        if self.peek() == Some(&Token::Minus) {
            self.descend(self.offset())?;
            self.pos += 1;
            let inner = self.unary()?;
            self.depth -= 1;
            return Ok(Node::Neg(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Node, ExpressionError> {
        let offset = self.offset();
        match self.next() {
            Some((Token::Number(n), _)) => Ok(Node::Literal(Value::Number(n))),
            Some((Token::Str(s), _)) => Ok(Node::Literal(Value::Text(s))),
            Some((Token::Ident(ident), _)) if ident == "true" => Ok(Node::Literal(Value::Bool(true))),
            Some((Token::Ident(ident), _)) if ident == "false" => {
                Ok(Node::Literal(Value::Bool(false)))
            }
            Some((Token::Ident(ident), _)) => {
                self.expect(Token::LBracket)?;
                let key_offset = self.offset();
                let field = match self.next() {
                    Some((Token::Str(field), _)) => field,
                    _ => {
                        return Err(
                            self.error_at(key_offset, "field name must be a quoted string")
                        )
                    }
                };
                self.expect(Token::RBracket)?;
                Ok(Node::Field {
                    group: canonical_group(&ident),
                    binding: ident,
                    field,
                })
            }
            Some((Token::LParen, _)) => {
                self.descend(offset)?;
                let node = self.expr()?;
                self.expect(Token::RParen)?;
                self.depth -= 1;
                Ok(node)
            }
            Some((token, _)) => Err(self.error_at(offset, format!("unexpected {token:?}"))),
            None => Err(self.error_at(offset, "unexpected end of input")),
        }
    }
}
