// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Elaboration of term and formula expressions.
//!
//! The elaborator runs an explicit work stack, so input nesting depth never
//! turns into call-stack depth. Parsing a list pushes a separator onto the
//! result stack, schedules an application step for the head, and schedules
//! the children so the first child is elaborated first; symbols therefore
//! pop their operands right to left. The application step replaces the
//! values above the separator with a single result, and an arity check
//! removes the separator.
//!
//! Quantifiers and `let` push lexical scopes here and pop them in their
//! finishing steps; `let` bodies see fresh nullary placeholder symbols for
//! the bound names, while the bound expressions are elaborated entirely in
//! the enclosing scope.

use log::warn;

use crate::builtins::{self, FormulaSymbol, Interpretation, TermSymbol};
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::scope::{Scope, Scopes};
use crate::sexp::{Atom, Sexp};
use crate::sorts;
use crate::syntax::{Binder, Formula, Literal, SortId, Symbol, Term, Value};

/// One entry on the result stack.
pub(crate) enum Entry {
    /// Marks the base of an application's operands.
    Separator,
    /// An elaborated value.
    Value(Value),
}

/// The result stack of the elaborator.
#[derive(Default)]
pub(crate) struct ResultStack {
    entries: Vec<Entry>,
}

impl ResultStack {
    fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_separator(&mut self) {
        self.entries.push(Entry::Separator);
    }

    pub(crate) fn push_value(&mut self, value: Value) {
        self.entries.push(Entry::Value(value));
    }

    pub(crate) fn push_formula(&mut self, f: Formula) {
        self.push_value(Value::Formula(f));
    }

    pub(crate) fn push_term(&mut self, sort: SortId, t: Term) {
        self.push_value(Value::Term(sort, t));
    }

    fn pop_entry(&mut self) -> Option<Entry> {
        self.entries.pop()
    }

    /// Pop the top value. Returns None and leaves the stack unchanged if the
    /// top is a separator or the stack is empty.
    pub(crate) fn pop_value(&mut self) -> Option<Value> {
        match self.entries.last() {
            Some(Entry::Value(_)) => match self.entries.pop() {
                Some(Entry::Value(v)) => Some(v),
                _ => None,
            },
            _ => None,
        }
    }

    /// Pop the top value as a sorted term.
    pub(crate) fn pop_term(&mut self) -> Option<(SortId, Term)> {
        self.pop_value().map(Value::into_term)
    }

    /// Pop all values above the separator, returned in elaboration order
    /// (first operand first).
    pub(crate) fn take_values(&mut self) -> Vec<Value> {
        let mut values = vec![];
        while let Some(v) = self.pop_value() {
            values.push(v);
        }
        values.reverse();
        values
    }

    /// The values above the separator, topmost (last operand) first.
    pub(crate) fn values_from_top(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().rev().map_while(|e| match e {
            Entry::Value(v) => Some(v),
            Entry::Separator => None,
        })
    }
}

enum Op<'e> {
    /// Elaborate one expression.
    Parse(&'e Sexp),
    /// All children are done; apply the head symbol.
    Application(&'e Sexp),
    /// The application is done; exactly one value must remain above the
    /// separator.
    CheckArity(&'e Sexp),
    /// The bound expressions of a `let` are done; open its scope.
    LetPrepareLookup(&'e Sexp),
    /// The body of a `let` is done; close its scope and build the bindings.
    LetFinish(&'e Sexp),
}

/// Elaborates expressions against an environment. One elaborator handles
/// one top-level expression; variable indices restart at zero for each.
pub struct Elaborator<'a> {
    env: &'a mut Environment,
    scopes: Scopes,
    next_var: u32,
    numerals_are_real: bool,
    annotation_warned: bool,
}

impl<'a> Elaborator<'a> {
    /// Create an elaborator. `numerals_are_real` reflects the active logic.
    pub fn new(env: &'a mut Environment, numerals_are_real: bool) -> Self {
        Elaborator {
            env,
            scopes: Scopes::new(),
            next_var: 0,
            numerals_are_real,
            annotation_warned: false,
        }
    }

    /// Carry over whether the one-time annotation warning already fired.
    pub fn set_annotation_warned(&mut self, warned: bool) {
        self.annotation_warned = warned;
    }

    /// Whether the annotation warning has fired.
    pub fn annotation_warned(&self) -> bool {
        self.annotation_warned
    }

    fn fresh_var(&mut self) -> u32 {
        let var = self.next_var;
        self.next_var += 1;
        var
    }

    /// Open a scope binding the given names to fresh variables, returning
    /// the binders in declaration order. Used for `define-fun` parameters.
    pub(crate) fn bind_parameters(
        &mut self,
        params: &[(String, SortId)],
        exp: &Sexp,
    ) -> Result<Vec<Binder>> {
        let mut scope = Scope::new();
        let mut binders = vec![];
        for (name, sort) in params {
            let var = self.fresh_var();
            binders.push(Binder { var, sort: *sort });
            if !scope.bind(name, (Term::var(var), *sort)) {
                return Err(Error::DuplicateBinding {
                    name: name.clone(),
                    expr: exp.to_string(),
                });
            }
        }
        self.scopes.push(scope);
        Ok(binders)
    }

    /// Elaborate an expression to a term or formula.
    pub fn term_or_formula(&mut self, expr: &Sexp) -> Result<Value> {
        let mut todo = vec![Op::Parse(expr)];
        let mut results = ResultStack::new();
        while let Some(op) = todo.pop() {
            match op {
                Op::Parse(exp) => self.parse(exp, &mut todo, &mut results)?,
                Op::Application(exp) => self.apply(exp, &mut results)?,
                Op::CheckArity(exp) => match (results.pop_entry(), results.pop_entry()) {
                    (Some(Entry::Value(v)), Some(Entry::Separator)) => results.push_value(v),
                    _ => return Err(Error::TooManyArguments(exp.to_string())),
                },
                Op::LetPrepareLookup(exp) => self.let_prepare(exp, &mut results)?,
                Op::LetFinish(exp) => self.let_finish(exp, &mut results)?,
            }
        }
        match (results.pop_entry(), results.pop_entry()) {
            (Some(Entry::Value(v)), None) => Ok(v),
            _ => Err(Error::MalformedExpression(expr.to_string())),
        }
    }

    fn parse<'e>(
        &mut self,
        exp: &'e Sexp,
        todo: &mut Vec<Op<'e>>,
        results: &mut ResultStack,
    ) -> Result<()> {
        let es = match exp {
            Sexp::Atom(_) => return self.apply(exp, results),
            Sexp::List(es) => es,
        };
        let head = match es.first() {
            Some(head) => head,
            None => return Err(Error::MalformedExpression(exp.to_string())),
        };
        results.push_separator();
        todo.push(Op::CheckArity(exp));
        match head.atom_s() {
            Some("forall") | Some("exists") => {
                let (binder_list, body) = match &es[1..] {
                    [binder_list, body] => (binder_list, body),
                    _ => return Err(Error::MalformedExpression(exp.to_string())),
                };
                self.quantifier_scope(exp, binder_list)?;
                todo.push(Op::Application(exp));
                todo.push(Op::Parse(body));
            }
            Some("let") => {
                let (bindings, body) = match &es[1..] {
                    [Sexp::List(bindings), body] => (bindings, body),
                    _ => return Err(Error::MalformedExpression(exp.to_string())),
                };
                todo.push(Op::LetFinish(exp));
                todo.push(Op::Parse(body));
                todo.push(Op::LetPrepareLookup(exp));
                // bound expressions elaborate in the enclosing scope,
                // first binding first
                for binding in bindings.iter().rev() {
                    let (_, bound) = binding_parts(binding, exp)?;
                    todo.push(Op::Parse(bound));
                }
            }
            Some("!") => {
                let inner = match &es[1..] {
                    [inner, ..] => inner,
                    _ => return Err(Error::MalformedExpression(exp.to_string())),
                };
                if !self.annotation_warned {
                    warn!("ignoring term annotations, in {exp} and elsewhere");
                    self.annotation_warned = true;
                }
                todo.push(Op::Parse(inner));
            }
            Some("_") => {
                return Err(Error::UnsupportedIndexedIdentifier(exp.to_string()));
            }
            _ => {
                todo.push(Op::Application(exp));
                for child in es[1..].iter().rev() {
                    todo.push(Op::Parse(child));
                }
            }
        }
        Ok(())
    }

    fn quantifier_scope(&mut self, exp: &Sexp, binder_list: &Sexp) -> Result<()> {
        let binders = binder_list
            .list()
            .ok_or_else(|| Error::MalformedExpression(exp.to_string()))?;
        let mut scope = Scope::new();
        for binder in binders {
            let (name, sort_exp) = binding_parts(binder, exp)?;
            let sort = sorts::elaborate(self.env, sort_exp)?;
            let var = self.fresh_var();
            if !scope.bind(name, (Term::var(var), sort)) {
                return Err(Error::DuplicateBinding {
                    name: name.to_string(),
                    expr: exp.to_string(),
                });
            }
        }
        self.scopes.push(scope);
        Ok(())
    }

    fn apply(&mut self, exp: &Sexp, results: &mut ResultStack) -> Result<()> {
        let head = match exp {
            Sexp::Atom(_) => exp,
            Sexp::List(es) => match es.first() {
                Some(head) => head,
                None => return Err(Error::MalformedExpression(exp.to_string())),
            },
        };
        match head {
            Sexp::List(_) => self.ranked_application(exp, head, results),
            Sexp::Atom(Atom::I(n)) => {
                if self.numerals_are_real {
                    let f = self.env.real_numeral(n);
                    results.push_term(SortId::REAL, Term::app(f, vec![]));
                } else {
                    let f = self.env.int_numeral(n);
                    results.push_term(SortId::INT, Term::app(f, vec![]));
                }
                Ok(())
            }
            Sexp::Atom(Atom::D(d)) => {
                let f = self.env.real_numeral(d);
                results.push_term(SortId::REAL, Term::app(f, vec![]));
                Ok(())
            }
            Sexp::Atom(Atom::S(name)) => self.apply_named(name, exp, results),
        }
    }

    fn apply_named(&mut self, name: &str, exp: &Sexp, results: &mut ResultStack) -> Result<()> {
        if let Some((term, sort)) = self.scopes.lookup(name) {
            results.push_term(*sort, term.clone());
            return Ok(());
        }
        if name == "_" {
            return Err(Error::UnsupportedIndexedIdentifier(exp.to_string()));
        }
        if let Some(symbol) = self.env.symbol(name) {
            return self.apply_user_symbol(name, symbol, exp, results);
        }
        if let Some(sym) = FormulaSymbol::from_name(name) {
            return builtins::apply_formula_symbol(self.env, &mut self.scopes, results, sym, exp);
        }
        if let Some(sym) = TermSymbol::from_name(name) {
            if builtins::apply_term_symbol(self.env, results, sym, exp)? {
                return Ok(());
            }
        }
        Err(Error::UnknownIdentifier(name.to_string()))
    }

    fn apply_user_symbol(
        &mut self,
        name: &str,
        symbol: Symbol,
        exp: &Sexp,
        results: &mut ResultStack,
    ) -> Result<()> {
        let err = || Error::ArityOrSortMismatch {
            symbol: name.to_string(),
            expr: exp.to_string(),
        };
        let arg_sorts = match symbol {
            Symbol::Function(f) => self.env.function(f).args.clone(),
            Symbol::Predicate(p) => self.env.predicate(p).args.clone(),
        };
        let mut args = Vec::with_capacity(arg_sorts.len());
        for expected in arg_sorts.iter().rev() {
            let (sort, t) = results.pop_term().ok_or_else(err)?;
            if sort != *expected {
                return Err(err());
            }
            args.push(t);
        }
        args.reverse();
        match symbol {
            Symbol::Function(f) => {
                let range = self.env.function(f).range;
                results.push_term(range, Term::app(f, args));
            }
            Symbol::Predicate(p) => {
                results.push_formula(Formula::lit(Literal::pred(p, args)));
            }
        }
        Ok(())
    }

    /// Handle an application whose head is itself a list: the only supported
    /// form is `((_ divisible N) t)`.
    fn ranked_application(
        &mut self,
        exp: &Sexp,
        head: &Sexp,
        results: &mut ResultStack,
    ) -> Result<()> {
        let unsupported = || Error::UnsupportedIndexedIdentifier(exp.to_string());
        let n = match head.list() {
            Some([underscore, divisible, n])
                if underscore.atom_s() == Some("_") && divisible.atom_s() == Some("divisible") =>
            {
                n.atom_i().ok_or_else(unsupported)?
            }
            _ => return Err(unsupported()),
        };
        let (sort, t) = results.pop_term().ok_or_else(|| Error::ArityOrSortMismatch {
            symbol: "divisible".to_string(),
            expr: exp.to_string(),
        })?;
        if sort != SortId::INT {
            return Err(Error::ArityOrSortMismatch {
                symbol: "divisible".to_string(),
                expr: exp.to_string(),
            });
        }
        let divisor = self.env.int_numeral(n);
        let pred = self.env.interpreted_predicate(Interpretation::IntDivides);
        results.push_formula(Formula::lit(Literal::pred(
            pred,
            vec![Term::app(divisor, vec![]), t],
        )));
        Ok(())
    }

    /// The bound expressions are on the result stack; build the scope with
    /// fresh placeholders, one per binding.
    fn let_prepare(&mut self, exp: &Sexp, results: &mut ResultStack) -> Result<()> {
        let bindings = let_bindings(exp)?;
        let sorts: Vec<SortId> = results
            .values_from_top()
            .take(bindings.len())
            .map(Value::sort)
            .collect();
        if sorts.len() != bindings.len() {
            return Err(Error::MalformedExpression(exp.to_string()));
        }
        let mut scope = Scope::new();
        // the topmost result is the last binding's expression
        for (binding, sort) in bindings.iter().rev().zip(sorts) {
            let (name, _) = binding_parts(binding, exp)?;
            let placeholder = if sort == SortId::BOOL {
                let p = self.env.fresh_predicate("sLP", vec![]);
                Term::formula(Formula::lit(Literal::pred(p, vec![])))
            } else {
                let f = self.env.fresh_function("sLF", vec![], sort);
                Term::app(f, vec![])
            };
            if !scope.bind(name, (placeholder, sort)) {
                return Err(Error::DuplicateBinding {
                    name: name.to_string(),
                    expr: exp.to_string(),
                });
            }
        }
        self.scopes.push(scope);
        Ok(())
    }

    /// The body is on top of the bound expressions; close the scope and wrap
    /// the body once per binding, first binding innermost.
    fn let_finish(&mut self, exp: &Sexp, results: &mut ResultStack) -> Result<()> {
        let bindings = let_bindings(exp)?;
        let scope = self.scopes.pop();
        let body = results
            .pop_value()
            .ok_or_else(|| Error::MalformedExpression(exp.to_string()))?;
        let (sort, mut term) = body.into_term();
        let bound = results.take_values();
        if bound.len() != bindings.len() {
            return Err(Error::MalformedExpression(exp.to_string()));
        }
        for (binding, value) in bindings.iter().zip(bound) {
            let (name, _) = binding_parts(binding, exp)?;
            let symbol = match scope.get(name) {
                Some((Term::App(f, _), _)) => Symbol::Function(*f),
                Some((Term::Formula(f), _)) => match f.as_ref() {
                    Formula::Lit(Literal {
                        atom: crate::syntax::Atom::App(p, _),
                        ..
                    }) => Symbol::Predicate(*p),
                    _ => unreachable!("let placeholder is not a nullary atom"),
                },
                _ => unreachable!("let scope lost a binding"),
            };
            let (_, bound_term) = value.into_term();
            term = Term::Let {
                symbol,
                binding: Box::new(bound_term),
                body: Box::new(term),
            };
        }
        results.push_term(sort, term);
        Ok(())
    }
}

/// Split a `(name expr)` pair, as used in binder and `let` binding lists.
fn binding_parts<'e>(binding: &'e Sexp, exp: &Sexp) -> Result<(&'e str, &'e Sexp)> {
    match binding.list() {
        Some([name, expr]) => match name.atom_s() {
            Some(name) => Ok((name, expr)),
            None => Err(Error::MalformedExpression(exp.to_string())),
        },
        _ => Err(Error::MalformedExpression(exp.to_string())),
    }
}

fn let_bindings(exp: &Sexp) -> Result<&[Sexp]> {
    match exp.list() {
        Some([_, Sexp::List(bindings), _]) => Ok(bindings),
        _ => Err(Error::MalformedExpression(exp.to_string())),
    }
}
