//! Environment frames.
//!
//! This module provides:
//! - The `Frame` struct: symbol bindings plus an optional parent link
//! - `EnvRef`, the shared handle every closure and call frame holds
//! - `EnvOps`: lookup, define, call-frame construction, and global-frame access
//!
//! A frame's parent is fixed when the frame is created. Many children may share
//! one parent, and the parent lives as long as any of them does.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::error::SchemeError;
use crate::symbol::Symbol;
use crate::value::{list_length, SchemeValue};

/// A single environment frame containing variable bindings
#[derive(Debug)]
pub struct Frame {
    bindings: HashMap<Symbol, SchemeValue>,
    parent: Option<EnvRef>,
}

pub type EnvRef = Rc<RefCell<Frame>>;

// Tail-recursive mu calls chain call frames; unlink them one at a time.
impl Drop for Frame {
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(rc) = next {
            match Rc::try_unwrap(rc) {
                Ok(cell) => {
                    let mut frame = cell.into_inner();
                    next = frame.parent.take();
                }
                Err(_) => break,
            }
        }
    }
}

impl Frame {
    /// Create a new frame with an optional parent
    fn new(parent: Option<EnvRef>) -> Self {
        Self {
            bindings: HashMap::new(),
            parent,
        }
    }

    /// Get a binding from this frame (doesn't search parent)
    pub fn get_local(&self, symbol: &Symbol) -> Option<SchemeValue> {
        self.bindings.get(symbol).cloned()
    }

    pub fn parent(&self) -> Option<EnvRef> {
        self.parent.clone()
    }
}

/// Create the root frame of a session.
pub fn new_global_env() -> EnvRef {
    Rc::new(RefCell::new(Frame::new(None)))
}

pub trait EnvOps {
    /// Nearest binding for `symbol`, searching up the parent chain.
    fn get(&self, symbol: &Symbol) -> Option<SchemeValue>;
    /// Like `get`, but an unbound name is an error.
    fn lookup(&self, symbol: &Symbol) -> Result<SchemeValue, SchemeError>;
    /// Bind `symbol` in this frame only.
    fn define(&self, symbol: Symbol, value: SchemeValue);
    /// New empty frame whose parent is this one.
    fn extend(&self) -> EnvRef;
    /// New frame whose parent is this one, binding each formal to the
    /// argument in the same position. Lengths must match exactly.
    fn make_call_frame(
        &self,
        formals: &SchemeValue,
        args: &SchemeValue,
    ) -> Result<EnvRef, SchemeError>;
    /// The root of the parent chain.
    fn global_frame(&self) -> EnvRef;
}

impl EnvOps for EnvRef {
    fn get(&self, symbol: &Symbol) -> Option<SchemeValue> {
        let mut current = Some(self.clone());
        while let Some(frame_rc) = current {
            let frame = frame_rc.borrow();
            if let Some(value) = frame.get_local(symbol) {
                return Some(value);
            }
            current = frame.parent.clone();
        }
        None
    }

    fn lookup(&self, symbol: &Symbol) -> Result<SchemeValue, SchemeError> {
        self.get(symbol)
            .ok_or_else(|| SchemeError::unbound(symbol.name()))
    }

    fn define(&self, symbol: Symbol, value: SchemeValue) {
        self.borrow_mut().bindings.insert(symbol, value);
    }

    fn extend(&self) -> EnvRef {
        Rc::new(RefCell::new(Frame::new(Some(self.clone()))))
    }

    fn make_call_frame(
        &self,
        formals: &SchemeValue,
        args: &SchemeValue,
    ) -> Result<EnvRef, SchemeError> {
        let expected = list_length(formals)?;
        let got = list_length(args)?;
        if expected != got {
            return Err(SchemeError::arity_mismatch(expected, got));
        }

        let frame = self.extend();
        {
            let mut new_frame = frame.borrow_mut();
            let mut formals = formals;
            let mut args = args;
            while let (SchemeValue::Pair(formal), SchemeValue::Pair(arg)) = (formals, args) {
                let name = formal
                    .first
                    .as_symbol()
                    .ok_or_else(|| SchemeError::bad_formals(&formal.first))?;
                new_frame.bindings.insert(name.clone(), arg.first.clone());
                formals = &formal.second;
                args = &arg.second;
            }
        }
        trace!("call frame with {} bindings", got);
        Ok(frame)
    }

    fn global_frame(&self) -> EnvRef {
        let mut current = self.clone();
        loop {
            let parent = current.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            None => write!(f, "<Global Frame>"),
            Some(parent) => {
                let mut entries: Vec<String> = self
                    .bindings
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v))
                    .collect();
                entries.sort();
                write!(f, "<{{{}}} -> {}>", entries.join(", "), parent.borrow())
            }
        }
    }
}
