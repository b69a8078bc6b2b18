//! Interned identifiers.
//!
//! Source identifiers, synthesized temporary names, and assembler labels
//! all flow through the same interner so that comparisons downstream are
//! a single integer check instead of a string compare.

use std::cell::RefCell;
use std::fmt;

use crate::FxHashMap;

/// A compact handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

thread_local! {
    static INTERNER: RefCell<Interner> = RefCell::new(Interner::new());
}

struct Interner {
    strings: Vec<&'static str>,
    lookup: FxHashMap<&'static str, u32>,
}

impl Interner {
    fn new() -> Self {
        Self {
            strings: Vec::new(),
            lookup: FxHashMap::default(),
        }
    }

    fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&id) = self.lookup.get(s) {
            return Symbol(id);
        }
        let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
        let id = self.strings.len() as u32;
        self.strings.push(leaked);
        self.lookup.insert(leaked, id);
        Symbol(id)
    }

    fn resolve(&self, sym: Symbol) -> &'static str {
        self.strings[sym.0 as usize]
    }
}

impl Symbol {
    pub fn intern(s: &str) -> Self {
        INTERNER.with(|i| i.borrow_mut().intern(s))
    }

    pub fn as_str(self) -> &'static str {
        INTERNER.with(|i| i.borrow().resolve(self))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_interns_to_same_symbol() {
        let a = Symbol::intern("main");
        let b = Symbol::intern("main");
        assert_eq!(a, b);
    }

    #[test]
    fn different_strings_intern_differently() {
        let a = Symbol::intern("alpha_unique_1");
        let b = Symbol::intern("beta_unique_1");
        assert_ne!(a, b);
    }

    #[test]
    fn round_trips_through_as_str() {
        let sym = Symbol::intern("round_trip_example");
        assert_eq!(sym.as_str(), "round_trip_example");
    }
}
