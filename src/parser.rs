//! Parser for Scheme s-expressions.
//!
//! Consumes tokens from the `Tokenizer` and produces unevaluated
//! s-expressions as `SchemeValue`s. Quote sugar is expanded here, so `'x`
//! comes out as `(quote x)`.
//!
//! # Examples
//!
//! ```rust
//! use mu_scheme::parser::Parser;
//!
//! let mut parser = Parser::new("(+ 1 2) 'x");
//! assert_eq!(parser.parse().unwrap().to_string(), "(+ 1 2)");
//! assert_eq!(parser.parse().unwrap().to_string(), "(quote x)");
//! ```

use num_bigint::BigInt;

use crate::error::ParseError;
use crate::tokenizer::{Token, Tokenizer};
use crate::value::{cons, SchemeValue};

pub struct Parser {
    tokenizer: Tokenizer,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self {
            tokenizer: Tokenizer::new(source),
        }
    }

    /// Characters of the source consumed so far.
    pub fn position(&self) -> usize {
        self.tokenizer.position()
    }

    /// Parse the next s-expression.
    ///
    /// Returns `ParseError::Eof` when the input holds no further expression,
    /// and `ParseError::Incomplete` when it ends partway through one.
    pub fn parse(&mut self) -> Result<SchemeValue, ParseError> {
        match self.tokenizer.next_token()? {
            Token::Eof => Err(ParseError::Eof),
            token => self.parse_from_token(token),
        }
    }

    /// Next token, where running out of input means the expression is
    /// unfinished.
    fn next_inner_token(&mut self) -> Result<Token, ParseError> {
        match self.tokenizer.next_token()? {
            Token::Eof => Err(ParseError::Incomplete),
            token => Ok(token),
        }
    }

    fn parse_from_token(&mut self, token: Token) -> Result<SchemeValue, ParseError> {
        match token {
            Token::Number(s) => parse_number_token(&s),
            Token::String(s) => Ok(SchemeValue::string(&s)),
            Token::Boolean(b) => Ok(SchemeValue::Bool(b)),
            Token::Symbol(s) => Ok(parse_symbol_token(&s)),
            Token::LeftParen => self.parse_list(),
            Token::Quote => self.parse_quoted_expression(),
            Token::RightParen => Err(ParseError::Syntax("unexpected ')'".to_string())),
            Token::Dot => Err(ParseError::Syntax("unexpected '.'".to_string())),
            Token::Eof => Err(ParseError::Incomplete),
        }
    }

    /// Parse the expression after a `'`.
    fn parse_quoted_expression(&mut self) -> Result<SchemeValue, ParseError> {
        let token = self.next_inner_token()?;
        let quoted = self.parse_from_token(token)?;
        Ok(cons(
            SchemeValue::symbol("quote"),
            cons(quoted, SchemeValue::Nil),
        ))
    }

    /// Parse a list after its `(`, including dotted tails.
    fn parse_list(&mut self) -> Result<SchemeValue, ParseError> {
        let mut elements = Vec::new();
        let tail = loop {
            match self.next_inner_token()? {
                Token::RightParen => break SchemeValue::Nil,
                Token::Dot if elements.is_empty() => {
                    return Err(ParseError::Syntax("'.' must follow a list element".to_string()));
                }
                Token::Dot => {
                    let token = self.next_inner_token()?;
                    let tail = self.parse_from_token(token)?;
                    match self.next_inner_token()? {
                        Token::RightParen => break tail,
                        _ => {
                            return Err(ParseError::Syntax(
                                "expected one element after '.'".to_string(),
                            ))
                        }
                    }
                }
                token => elements.push(self.parse_from_token(token)?),
            }
        };
        Ok(elements
            .into_iter()
            .rev()
            .fold(tail, |list, elem| cons(elem, list)))
    }
}

fn parse_number_token(s: &str) -> Result<SchemeValue, ParseError> {
    if s.contains('.') || s.contains('e') || s.contains('E') {
        s.parse::<f64>()
            .map(SchemeValue::Float)
            .map_err(|_| ParseError::Syntax(format!("invalid numeral: {}", s)))
    } else {
        let digits = s.strip_prefix('+').unwrap_or(s);
        BigInt::parse_bytes(digits.as_bytes(), 10)
            .map(SchemeValue::Int)
            .ok_or_else(|| ParseError::Syntax(format!("invalid numeral: {}", s)))
    }
}

fn parse_symbol_token(s: &str) -> SchemeValue {
    match s {
        "nil" => SchemeValue::Nil,
        "true" => SchemeValue::Bool(true),
        "false" => SchemeValue::Bool(false),
        _ => SchemeValue::symbol(s),
    }
}

/// Parse the first expression in `source`.
pub fn read_one(source: &str) -> Result<SchemeValue, ParseError> {
    Parser::new(source).parse()
}

/// Parse every expression in `source`.
pub fn read_all(source: &str) -> Result<Vec<SchemeValue>, ParseError> {
    let mut parser = Parser::new(source);
    let mut exprs = Vec::new();
    loop {
        match parser.parse() {
            Ok(expr) => exprs.push(expr),
            Err(ParseError::Eof) => return Ok(exprs),
            Err(err) => return Err(err),
        }
    }
}
