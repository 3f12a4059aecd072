//! Error types for the evaluator and the reader.
//!
//! The evaluator has a single error kind, [`SchemeError`]. Every failure the
//! core can signal (unbound names, malformed forms, arity problems, bad
//! formals, non-callable operators, primitive failures) is one of these, and
//! all of them are recoverable at the REPL boundary.

use std::fmt;

/// The runtime language error.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeError {
    message: String,
}

impl SchemeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn undefined_expression() -> Self {
        Self::new("Cannot evaluate an undefined expression.")
    }

    pub fn unbound(name: &str) -> Self {
        Self::new(format!("unknown identifier: {}", name))
    }

    pub fn malformed_list(expr: impl fmt::Display) -> Self {
        Self::new(format!("malformed list: {}", expr))
    }

    pub fn badly_formed(expr: impl fmt::Display) -> Self {
        Self::new(format!("badly formed expression: {}", expr))
    }

    pub fn too_few_operands(form: &str) -> Self {
        Self::new(format!("too few operands in form: {}", form))
    }

    pub fn too_many_operands(form: &str) -> Self {
        Self::new(format!("too many operands in form: {}", form))
    }

    pub fn arity_mismatch(expected: usize, got: usize) -> Self {
        Self::new(format!(
            "arity mismatch: expected {} arguments, got {}",
            expected, got
        ))
    }

    pub fn bad_formals(detail: impl fmt::Display) -> Self {
        Self::new(format!("badly formed formals: {}", detail))
    }

    pub fn bad_define(detail: impl fmt::Display) -> Self {
        Self::new(format!("bad argument to define: {}", detail))
    }

    pub fn recursion_depth() -> Self {
        Self::new("maximum recursion depth exceeded")
    }

    pub fn not_callable(value: impl fmt::Display) -> Self {
        Self::new(format!("Cannot call {}", value))
    }

    /// Re-signal a failure raised inside a primitive under its name.
    pub fn primitive(name: &str, err: SchemeError) -> Self {
        if err.message.starts_with(name) {
            err
        } else {
            Self::new(format!("{}: {}", name, err.message))
        }
    }
}

impl fmt::Display for SchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SchemeError {}

impl From<String> for SchemeError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for SchemeError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Errors produced by the reader.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Malformed input
    Syntax(String),
    /// Clean end of input, no expression started
    Eof,
    /// Input ended in the middle of an expression
    Incomplete,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax(msg) => write!(f, "syntax error: {}", msg),
            ParseError::Eof => write!(f, "end of input"),
            ParseError::Incomplete => write!(f, "unexpected end of input"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for SchemeError {
    fn from(err: ParseError) -> Self {
        SchemeError::new(err.to_string())
    }
}
