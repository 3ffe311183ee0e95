// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Lexical scopes for quantified variables and `let` bindings.

use im::HashMap;

use crate::syntax::{SortId, Term};

/// What a bound name stands for: a term and its sort. Quantified variables
/// map to [`Term::Var`]; `let` bindings map to placeholder applications.
pub type Binding = (Term, SortId);

/// One lexical scope: the bindings introduced by a single binder list.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<String, Binding>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a name. Returns false if the name is already bound in this
    /// scope; rebinding within one binder list is an error at the caller.
    pub fn bind(&mut self, name: &str, binding: Binding) -> bool {
        self.bindings.insert(name.to_string(), binding).is_none()
    }

    /// Look up a name in this scope only.
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Iterate over the bindings (in no particular order).
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Binding)> {
        self.bindings.iter()
    }
}

/// A stack of lexical scopes. Inner scopes shadow outer ones; the same name
/// may not be bound twice within a single scope.
#[derive(Debug, Default)]
pub struct Scopes {
    stack: Vec<Scope>,
}

impl Scopes {
    /// Create an empty scope stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a scope.
    pub fn push(&mut self, scope: Scope) {
        self.stack.push(scope);
    }

    /// Leave the innermost scope, returning its bindings.
    ///
    /// Panics if no scope is open; scope pushes and pops are paired by the
    /// elaborator's work stack.
    pub fn pop(&mut self) -> Scope {
        self.stack.pop().expect("scope stack underflow")
    }

    /// Look up a name, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.stack.iter().rev().find_map(|scope| scope.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowing_across_scopes() {
        let mut scopes = Scopes::new();
        let mut outer = Scope::new();
        assert!(outer.bind("x", (Term::var(0), SortId::INT)));
        scopes.push(outer);
        assert_eq!(scopes.lookup("x"), Some(&(Term::var(0), SortId::INT)));

        let mut inner = Scope::new();
        assert!(inner.bind("x", (Term::var(1), SortId::REAL)));
        scopes.push(inner);
        assert_eq!(scopes.lookup("x"), Some(&(Term::var(1), SortId::REAL)));

        scopes.pop();
        assert_eq!(scopes.lookup("x"), Some(&(Term::var(0), SortId::INT)));
        assert_eq!(scopes.lookup("y"), None);
    }

    #[test]
    fn test_duplicate_in_one_scope() {
        let mut scope = Scope::new();
        assert!(scope.bind("x", (Term::var(0), SortId::INT)));
        assert!(!scope.bind("x", (Term::var(1), SortId::INT)));
    }
}
