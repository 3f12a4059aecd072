//! Procedures: primitives, lambda closures and mu closures.
//!
//! Lambda and mu procedures share one representation. The only difference is
//! which frame becomes the parent of a call frame: the frame captured when a
//! lambda was created, or the caller's frame for a mu.

use std::fmt;
use std::rc::Rc;

use crate::env::{EnvOps, EnvRef};
use crate::error::SchemeError;
use crate::value::SchemeValue;

pub type PrimitiveFn = Rc<dyn Fn(&[SchemeValue]) -> Result<SchemeValue, SchemeError>>;

/// A built-in procedure implemented in Rust.
pub struct PrimitiveProcedure {
    pub name: String,
    pub func: PrimitiveFn,
    /// Append the calling environment as a trailing argument.
    pub wants_env: bool,
}

/// Where a compound procedure's call frames are rooted.
pub enum Scope {
    /// Frame captured at creation (`lambda`). A lambda bound in the frame
    /// it captured keeps that frame alive, so such frames are never freed.
    Lexical(EnvRef),
    /// The caller's frame at call time (`mu`)
    Dynamic,
}

/// A procedure written in Scheme.
pub struct CompoundProcedure {
    pub formals: SchemeValue,
    pub body: SchemeValue,
    pub scope: Scope,
}

pub enum Procedure {
    Primitive(PrimitiveProcedure),
    Compound(CompoundProcedure),
}

impl PrimitiveProcedure {
    pub fn new<F>(name: &str, func: F, wants_env: bool) -> Self
    where
        F: Fn(&[SchemeValue]) -> Result<SchemeValue, SchemeError> + 'static,
    {
        Self {
            name: name.to_string(),
            func: Rc::new(func),
            wants_env,
        }
    }
}

impl CompoundProcedure {
    pub fn lambda(formals: SchemeValue, body: SchemeValue, env: EnvRef) -> Self {
        Self {
            formals,
            body,
            scope: Scope::Lexical(env),
        }
    }

    pub fn mu(formals: SchemeValue, body: SchemeValue) -> Self {
        Self {
            formals,
            body,
            scope: Scope::Dynamic,
        }
    }

    pub fn is_lambda(&self) -> bool {
        matches!(self.scope, Scope::Lexical(_))
    }

    /// Build the frame a call to this procedure runs in.
    pub fn call_frame(&self, caller: &EnvRef, args: &SchemeValue) -> Result<EnvRef, SchemeError> {
        let parent = match &self.scope {
            Scope::Lexical(env) => env,
            Scope::Dynamic => caller,
        };
        parent.make_call_frame(&self.formals, args)
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Procedure::Primitive(prim) => write!(f, "#[{}]", prim.name),
            Procedure::Compound(proc) => {
                let keyword = if proc.is_lambda() { "lambda" } else { "mu" };
                write!(f, "({} {} {})", keyword, proc.formals, proc.body)
            }
        }
    }
}
