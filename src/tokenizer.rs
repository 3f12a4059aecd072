//! Tokenizer for the Scheme interpreter.
//!
//! Converts source text into tokens according to Scheme lexical rules.
//!
//! # Examples
//!
//! ```rust
//! use mu_scheme::tokenizer::{Tokenizer, Token};
//!
//! let mut tokenizer = Tokenizer::new("hello world");
//! assert_eq!(tokenizer.next_token(), Ok(Token::Symbol("hello".to_string())));
//! assert_eq!(tokenizer.next_token(), Ok(Token::Symbol("world".to_string())));
//! assert_eq!(tokenizer.next_token(), Ok(Token::Eof));
//! ```

use crate::error::ParseError;

/// Represents a lexical token in Scheme source code.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A number literal (integer or float)
    Number(String),
    /// A symbol (identifier)
    Symbol(String),
    /// A string literal, escapes already processed
    String(String),
    /// `#t` or `#f`
    Boolean(bool),
    LeftParen,
    RightParen,
    /// Single quote (for quoted forms)
    Quote,
    /// Dot (for dotted pairs)
    Dot,
    /// End of input
    Eof,
}

/// Characters that end a symbol or number.
const DELIMITERS: &str = "()\"';";

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || DELIMITERS.contains(c)
}

/// Tokenizer over an in-memory string.
pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    /// Characters consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn read_char(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Skip whitespace and `;` comments.
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == ';' {
                while let Some(c) = self.read_char() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Read up to the next delimiter.
    fn read_atom(&mut self, first_char: char) -> String {
        let mut atom = first_char.to_string();
        while let Some(c) = self.peek_char() {
            if is_delimiter(c) {
                break;
            }
            atom.push(c);
            self.pos += 1;
        }
        atom
    }

    /// Read a string body after the opening quote, handling escapes.
    fn read_string(&mut self) -> Result<String, ParseError> {
        let mut string = String::new();
        loop {
            match self.read_char() {
                Some('"') => return Ok(string),
                Some('\\') => match self.read_char() {
                    Some('n') => string.push('\n'),
                    Some('t') => string.push('\t'),
                    Some('r') => string.push('\r'),
                    Some(c) => string.push(c),
                    None => return Err(ParseError::Incomplete),
                },
                Some(c) => string.push(c),
                None => return Err(ParseError::Incomplete),
            }
        }
    }

    /// Read the next token.
    ///
    /// An unterminated string is `ParseError::Incomplete`, since more input
    /// could still close it.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace_and_comments();
        let Some(c) = self.read_char() else {
            return Ok(Token::Eof);
        };
        let token = match c {
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '\'' => Token::Quote,
            '"' => Token::String(self.read_string()?),
            '#' => match self.read_atom(c).as_str() {
                "#t" => Token::Boolean(true),
                "#f" => Token::Boolean(false),
                other => return Err(ParseError::Syntax(format!("invalid token: {}", other))),
            },
            _ => {
                let atom = self.read_atom(c);
                if atom == "." {
                    Token::Dot
                } else if looks_numeric(&atom) {
                    Token::Number(atom)
                } else {
                    Token::Symbol(atom)
                }
            }
        };
        Ok(token)
    }
}

/// A digit, or a sign or point followed by a digit, starts a number.
fn looks_numeric(atom: &str) -> bool {
    let mut chars = atom.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('+') | Some('-') => match chars.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        },
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token().unwrap();
            if token == Token::Eof {
                return tokens;
            }
            tokens.push(token);
        }
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            tokens("hello123\"world\""),
            vec![
                Token::Symbol("hello123".to_string()),
                Token::String("world".to_string())
            ]
        );
    }

    #[test]
    fn test_whitespace_and_comments() {
        assert_eq!(
            tokens("  hello  ; comment\n  world ; trailing"),
            vec![
                Token::Symbol("hello".to_string()),
                Token::Symbol("world".to_string())
            ]
        );
    }

    #[test]
    fn test_quote_and_dot() {
        assert_eq!(
            tokens("' . ..."),
            vec![Token::Quote, Token::Dot, Token::Symbol("...".to_string())]
        );
    }

    #[test]
    fn test_numbers_and_signed_symbols() {
        assert_eq!(
            tokens("-45 +1.5 .5 - +x 1e3"),
            vec![
                Token::Number("-45".to_string()),
                Token::Number("+1.5".to_string()),
                Token::Number(".5".to_string()),
                Token::Symbol("-".to_string()),
                Token::Symbol("+x".to_string()),
                Token::Number("1e3".to_string()),
            ]
        );
    }

    #[test]
    fn test_booleans() {
        assert_eq!(
            tokens("#t #f"),
            vec![Token::Boolean(true), Token::Boolean(false)]
        );
        assert!(Tokenizer::new("#x").next_token().is_err());
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokens(r#""a\nb\"c\\""#),
            vec![Token::String("a\nb\"c\\".to_string())]
        );
        assert_eq!(
            Tokenizer::new("\"open").next_token(),
            Err(ParseError::Incomplete)
        );
    }

    #[test]
    fn test_list_delimiters() {
        assert_eq!(
            tokens("(a(b))"),
            vec![
                Token::LeftParen,
                Token::Symbol("a".to_string()),
                Token::LeftParen,
                Token::Symbol("b".to_string()),
                Token::RightParen,
                Token::RightParen,
            ]
        );
    }
}
