//! Scope tree used for name resolution.
//!
//! A scope is a flat map from [`Symbol`] to [`SymbolKind`] plus a link to
//! its parent. Most nested blocks (if/while/do) share their parent's scope
//! outright per the language's rules; only a for-loop's pre-statement gets
//! its own overlay, pushed on entry and discarded on exit.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use td12_util::{Diagnostic, ErrorCategory, Span, Symbol};

#[derive(Clone, Debug)]
pub enum SymbolKind {
    Variable,
    Parameter,
    ReturnVariable,
    Function,
    Struct,
    Enum,
    EnumMember(i32),
}

#[derive(Clone, Debug)]
pub struct SymbolEntry {
    pub kind: SymbolKind,
    pub span: Span,
}

struct Scope {
    entries: IndexMap<Symbol, SymbolEntry>,
    parent: Option<Rc<RefCell<Scope>>>,
}

/// A handle to one level of the scope tree. Cloning shares the underlying
/// scope (and therefore its bindings) between analyzer recursions, which is
/// exactly the "shares the parent's symbol table" behavior nested blocks
/// need; [`SymbolTable::overlay`] is the one operation that creates a truly
/// new, narrower scope.
#[derive(Clone)]
pub struct SymbolTable {
    scope: Rc<RefCell<Scope>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scope: Rc::new(RefCell::new(Scope { entries: IndexMap::default(), parent: None })),
        }
    }

    /// A child scope used only for a for-loop's pre-statement declaration.
    pub fn overlay(&self) -> Self {
        Self {
            scope: Rc::new(RefCell::new(Scope {
                entries: IndexMap::default(),
                parent: Some(self.scope.clone()),
            })),
        }
    }

    pub fn declare(&self, name: Symbol, kind: SymbolKind, span: Span) -> Result<(), Diagnostic> {
        let mut scope = self.scope.borrow_mut();
        if let Some(existing) = scope.entries.get(&name) {
            return Err(Diagnostic::new(
                ErrorCategory::Semantic,
                "VariableAlreadyDeclared",
                format!("the variable '{}' was already declared", name.as_str()),
                span,
            )
            .with_context(existing.span.clone()));
        }
        scope.entries.insert(name, SymbolEntry { kind, span });
        Ok(())
    }

    pub fn resolve(&self, name: Symbol) -> Option<SymbolEntry> {
        let scope = self.scope.borrow();
        if let Some(entry) = scope.entries.get(&name) {
            return Some(entry.clone());
        }
        match &scope.parent {
            Some(parent) => SymbolTable { scope: parent.clone() }.resolve(name),
            None => None,
        }
    }

    pub fn resolve_function(&self, name: Symbol) -> Option<SymbolEntry> {
        self.resolve(name).filter(|e| matches!(e.kind, SymbolKind::Function))
    }

    pub fn undeclared(name: Symbol, span: Span) -> Diagnostic {
        Diagnostic::new(
            ErrorCategory::Semantic,
            "UndeclaredVariable",
            format!("the variable '{}' is undeclared", name.as_str()),
            span,
        )
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
