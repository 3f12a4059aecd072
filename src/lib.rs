//! A small Scheme evaluator.
//!
//! Besides the usual lexically scoped `lambda`, the language has `mu`
//! procedures, whose free variables are resolved in the environment of the
//! call rather than the one they were created in. Tail calls run in constant
//! stack space.
//!
//! Values are reference counted and there is no cycle collector. A `lambda`
//! defined inside the frame it closes over (an inner helper `define`d in a
//! procedure body) forms a cycle with that frame, and both stay allocated for
//! the rest of the session.

pub mod builtin;
pub mod env;
pub mod error;
pub mod eval;
pub mod parser;
pub mod printer;
pub mod procedure;
pub mod repl;
pub mod special_forms;
pub mod symbol;
pub mod tokenizer;
pub mod value;

pub use env::{EnvOps, EnvRef, Frame};
pub use error::{ParseError, SchemeError};
pub use eval::{create_global_frame, scheme_apply, scheme_eval, Evaluator};
pub use value::SchemeValue;
