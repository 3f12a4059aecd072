//! Symbol interning.
//!
//! Symbols with the same name share one allocation, so comparing two interned
//! symbols is usually a pointer check. Equality still falls back to the name,
//! which keeps symbols built by hand (or on another thread) interchangeable.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

thread_local! {
    static SYMBOL_TABLE: RefCell<SymbolTable> = RefCell::new(SymbolTable::new());
}

/// Name -> shared name table.
struct SymbolTable {
    names: HashSet<Rc<str>>,
}

impl SymbolTable {
    fn new() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    fn intern(&mut self, name: &str) -> Rc<str> {
        if let Some(existing) = self.names.get(name) {
            return existing.clone();
        }
        let shared: Rc<str> = Rc::from(name);
        self.names.insert(shared.clone());
        shared
    }
}

/// An interned identifier.
#[derive(Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is(&self, name: &str) -> bool {
        &*self.0 == name
    }
}

/// Intern a symbol (ensure only one copy exists for each name).
pub fn intern_symbol(name: &str) -> Symbol {
    SYMBOL_TABLE.with(|table| Symbol(table.borrow_mut().intern(name)))
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", &*self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_interning() {
        let sym1 = intern_symbol("foo");
        let sym2 = intern_symbol("foo");
        assert!(Rc::ptr_eq(&sym1.0, &sym2.0));

        let sym3 = intern_symbol("bar");
        assert_ne!(sym1, sym3);
    }

    #[test]
    fn test_uninterned_symbols_compare_by_name() {
        let interned = intern_symbol("baz");
        let by_hand = Symbol(Rc::from("baz"));
        assert_eq!(interned, by_hand);
        assert!(by_hand.is("baz"));
    }
}
