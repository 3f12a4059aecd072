//! Scheme values.
//!
//! One tagged variant type represents both source syntax and runtime data:
//! - Atoms (integers, floats, booleans, strings, the empty list)
//! - Symbols
//! - Pairs, which chain into proper lists (ending in `Nil`) or improper ones
//! - Procedures and environment frames, which only appear at runtime
//!
//! Pairs are immutable and reference counted. Because a pair can only point
//! at values that existed before it, pair chains are always acyclic, so the
//! list walkers below terminate on every input.

use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::env::EnvRef;
use crate::error::SchemeError;
use crate::procedure::Procedure;
use crate::symbol::{intern_symbol, Symbol};

/// A two-slot cell.
pub struct Pair {
    pub first: SchemeValue,
    pub second: SchemeValue,
}

// Long lists are released iteratively so dropping them can't overflow the stack.
impl Drop for Pair {
    fn drop(&mut self) {
        let mut next = std::mem::replace(&mut self.second, SchemeValue::Nil);
        while let SchemeValue::Pair(rc) = next {
            match Rc::try_unwrap(rc) {
                Ok(mut pair) => next = std::mem::replace(&mut pair.second, SchemeValue::Nil),
                Err(_) => break,
            }
        }
    }
}

#[derive(Clone)]
pub enum SchemeValue {
    /// Integer values (arbitrary precision)
    Int(BigInt),
    /// Floating-point values
    Float(f64),
    /// `#t` and `#f`
    Bool(bool),
    /// String literals
    Str(Rc<str>),
    /// Interned identifiers
    Symbol(Symbol),
    /// Cons cells for building lists and pairs
    Pair(Rc<Pair>),
    /// The empty list
    Nil,
    /// Primitive, lambda and mu procedures
    Procedure(Rc<Procedure>),
    /// A frame handed to primitives that ask for the calling environment
    Environment(EnvRef),
    /// The result of a form that produces no value
    Undefined,
}

impl SchemeValue {
    pub fn symbol(name: &str) -> Self {
        SchemeValue::Symbol(intern_symbol(name))
    }

    pub fn string(s: &str) -> Self {
        SchemeValue::Str(Rc::from(s))
    }

    pub fn int(i: impl Into<BigInt>) -> Self {
        SchemeValue::Int(i.into())
    }

    pub fn procedure(proc: Procedure) -> Self {
        SchemeValue::Procedure(Rc::new(proc))
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            SchemeValue::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<&Pair> {
        match self {
            SchemeValue::Pair(pair) => Some(pair),
            _ => None,
        }
    }

    pub fn as_procedure(&self) -> Option<&Rc<Procedure>> {
        match self {
            SchemeValue::Procedure(proc) => Some(proc),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SchemeValue::Int(i) => i.to_f64(),
            SchemeValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, SchemeValue::Nil)
    }

    pub fn is_sym(&self, name: &str) -> bool {
        matches!(self, SchemeValue::Symbol(sym) if sym.is(name))
    }
}

// ============================================================================
// EXPRESSION CLASSIFIERS
// ============================================================================

pub fn is_symbol(expr: &SchemeValue) -> bool {
    matches!(expr, SchemeValue::Symbol(_))
}

/// Check if an expression is self-evaluating.
///
/// Procedures and frames only reach the evaluator when a program builds code
/// out of runtime values (`(eval (list + 1 2))`); they evaluate to themselves.
pub fn is_self_evaluating(expr: &SchemeValue) -> bool {
    match expr {
        SchemeValue::Int(_)
        | SchemeValue::Float(_)
        | SchemeValue::Bool(_)
        | SchemeValue::Str(_)
        | SchemeValue::Nil
        | SchemeValue::Procedure(_)
        | SchemeValue::Environment(_) => true,
        SchemeValue::Symbol(_) | SchemeValue::Pair(_) | SchemeValue::Undefined => false,
    }
}

/// True for a chain of pairs terminated by `Nil` (including `Nil` itself).
pub fn is_proper_list(mut val: &SchemeValue) -> bool {
    loop {
        match val {
            SchemeValue::Pair(pair) => val = &pair.second,
            SchemeValue::Nil => return true,
            _ => return false,
        }
    }
}

/// Only `#f` is false.
pub fn is_true(val: &SchemeValue) -> bool {
    !is_false(val)
}

pub fn is_false(val: &SchemeValue) -> bool {
    matches!(val, SchemeValue::Bool(false))
}

// ============================================================================
// LIST HELPERS
// ============================================================================

pub fn cons(first: SchemeValue, second: SchemeValue) -> SchemeValue {
    SchemeValue::Pair(Rc::new(Pair { first, second }))
}

/// Number of pairs before `Nil`. Improper lists are an error rather than
/// being silently truncated.
pub fn list_length(list: &SchemeValue) -> Result<usize, SchemeError> {
    let mut len = 0;
    let mut current = list;
    loop {
        match current {
            SchemeValue::Nil => return Ok(len),
            SchemeValue::Pair(pair) => {
                len += 1;
                current = &pair.second;
            }
            _ => return Err(SchemeError::malformed_list(list)),
        }
    }
}

pub fn list_to_vec(list: &SchemeValue) -> Result<Vec<SchemeValue>, SchemeError> {
    let mut items = Vec::new();
    for item in ListIter::new(list) {
        items.push(item?);
    }
    Ok(items)
}

pub fn list_from_slice(items: &[SchemeValue]) -> SchemeValue {
    items
        .iter()
        .rev()
        .fold(SchemeValue::Nil, |tail, item| cons(item.clone(), tail))
}

pub fn list_from_vec(items: Vec<SchemeValue>) -> SchemeValue {
    items
        .into_iter()
        .rev()
        .fold(SchemeValue::Nil, |tail, item| cons(item, tail))
}

/// Map `f` over a proper list, left to right, building a new list.
pub fn list_map<F>(list: &SchemeValue, mut f: F) -> Result<SchemeValue, SchemeError>
where
    F: FnMut(&SchemeValue) -> Result<SchemeValue, SchemeError>,
{
    let mut mapped = Vec::new();
    for item in ListIter::new(list) {
        mapped.push(f(&item?)?);
    }
    Ok(list_from_vec(mapped))
}

/// Iterator over the elements of a list.
///
/// Yields an error once if the chain ends in something other than `Nil`.
pub struct ListIter<'a> {
    whole: &'a SchemeValue,
    current: Option<&'a SchemeValue>,
}

impl<'a> ListIter<'a> {
    pub fn new(start: &'a SchemeValue) -> Self {
        Self {
            whole: start,
            current: Some(start),
        }
    }
}

impl<'a> Iterator for ListIter<'a> {
    type Item = Result<SchemeValue, SchemeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.current.take()?;
        match cur {
            SchemeValue::Pair(pair) => {
                self.current = Some(&pair.second);
                Some(Ok(pair.first.clone()))
            }
            SchemeValue::Nil => None,
            _ => Some(Err(SchemeError::malformed_list(self.whole))),
        }
    }
}

// ============================================================================
// EQUALITY
// ============================================================================

/// Identity for compound values, value equality for atoms.
pub fn eq(a: &SchemeValue, b: &SchemeValue) -> bool {
    match (a, b) {
        (SchemeValue::Int(a), SchemeValue::Int(b)) => a == b,
        (SchemeValue::Float(a), SchemeValue::Float(b)) => a == b,
        (SchemeValue::Bool(a), SchemeValue::Bool(b)) => a == b,
        (SchemeValue::Symbol(a), SchemeValue::Symbol(b)) => a == b,
        (SchemeValue::Str(a), SchemeValue::Str(b)) => Rc::ptr_eq(a, b),
        (SchemeValue::Pair(a), SchemeValue::Pair(b)) => Rc::ptr_eq(a, b),
        (SchemeValue::Procedure(a), SchemeValue::Procedure(b)) => Rc::ptr_eq(a, b),
        (SchemeValue::Environment(a), SchemeValue::Environment(b)) => Rc::ptr_eq(a, b),
        (SchemeValue::Nil, SchemeValue::Nil) => true,
        (SchemeValue::Undefined, SchemeValue::Undefined) => true,
        _ => false,
    }
}

/// Structural equality.
pub fn equal(a: &SchemeValue, b: &SchemeValue) -> bool {
    match (a, b) {
        (SchemeValue::Pair(p1), SchemeValue::Pair(p2)) => {
            equal(&p1.first, &p2.first) && equal(&p1.second, &p2.second)
        }
        (SchemeValue::Str(a), SchemeValue::Str(b)) => a == b,
        _ => eq(a, b),
    }
}

impl fmt::Debug for SchemeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeValue::Int(i) => write!(f, "Int({})", i),
            SchemeValue::Float(fl) => write!(f, "Float({})", fl),
            SchemeValue::Bool(b) => write!(f, "Bool({})", b),
            SchemeValue::Str(s) => write!(f, "Str({:?})", s),
            SchemeValue::Symbol(s) => write!(f, "{:?}", s),
            SchemeValue::Pair(pair) => f
                .debug_tuple("Pair")
                .field(&pair.first)
                .field(&pair.second)
                .finish(),
            SchemeValue::Nil => write!(f, "Nil"),
            SchemeValue::Procedure(proc) => write!(f, "Procedure({})", proc),
            SchemeValue::Environment(_) => write!(f, "Environment"),
            SchemeValue::Undefined => write!(f, "Undefined"),
        }
    }
}
