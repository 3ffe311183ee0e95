// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The AST for sorted first-order terms and formulas.
//!
//! Terms and formulas are kept syntactically separate, the way a downstream
//! prover wants them: a Boolean connective always has [`Formula`] operands,
//! and a function symbol always has [`Term`] arguments. The [`Value`] sum
//! mediates between the two views during elaboration.

use serde::Serialize;

/// An interned sort identifier.
///
/// Identifiers are indices into the environment's sort table; two sorts are
/// equal exactly when their identifiers are equal. `Bool`, `Int`, and `Real`
/// are interned at fixed positions when the environment is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SortId(pub(crate) u32);

impl SortId {
    /// The Boolean sort.
    pub const BOOL: SortId = SortId(0);
    /// The integer sort.
    pub const INT: SortId = SortId(1);
    /// The real sort.
    pub const REAL: SortId = SortId(2);
}

/// An identifier for a function symbol in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FunId(pub(crate) u32);

/// An identifier for a predicate symbol in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PredId(pub(crate) u32);

/// A function or predicate symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Symbol {
    /// A symbol with a non-Boolean range.
    Function(FunId),
    /// A symbol with range Bool.
    Predicate(PredId),
}

/// A first-order term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Term {
    /// A bound variable, identified by its binder index.
    Var(u32),
    /// A function application. Constants are applications of nullary symbols.
    App(FunId, Vec<Term>),
    /// A formula in term position, of sort Bool.
    Formula(Box<Formula>),
    /// If-then-else over a Boolean condition.
    Ite {
        /// The condition.
        cond: Box<Formula>,
        /// The value when the condition holds.
        then: Box<Term>,
        /// The value when it does not.
        else_: Box<Term>,
    },
    /// A let binding of a placeholder symbol, from SMT-LIB `let`.
    Let {
        /// The placeholder the body refers to.
        symbol: Symbol,
        /// The bound term.
        binding: Box<Term>,
        /// The term the binding scopes over.
        body: Box<Term>,
    },
}

impl Term {
    /// A bound variable.
    pub fn var(index: u32) -> Self {
        Term::Var(index)
    }

    /// A function application.
    pub fn app(f: FunId, args: Vec<Term>) -> Self {
        Term::App(f, args)
    }

    /// A formula wrapped into term position.
    pub fn formula(f: Formula) -> Self {
        Term::Formula(Box::new(f))
    }

    /// If-then-else.
    pub fn ite(cond: Formula, then: Term, else_: Term) -> Self {
        Term::Ite {
            cond: Box::new(cond),
            then: Box::new(then),
            else_: Box::new(else_),
        }
    }
}

/// An atomic formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Atom {
    /// Equality between two terms of the same sort.
    Eq {
        /// The shared sort of both sides.
        sort: SortId,
        /// Left-hand side.
        lhs: Term,
        /// Right-hand side.
        rhs: Term,
    },
    /// A predicate application.
    App(PredId, Vec<Term>),
}

/// An atom with a polarity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Literal {
    /// Whether the atom appears positively.
    pub positive: bool,
    /// The atom itself.
    pub atom: Atom,
}

impl Literal {
    /// A positive equality literal.
    pub fn eq(sort: SortId, lhs: Term, rhs: Term) -> Self {
        Literal {
            positive: true,
            atom: Atom::Eq { sort, lhs, rhs },
        }
    }

    /// A negative equality literal.
    pub fn neq(sort: SortId, lhs: Term, rhs: Term) -> Self {
        Literal {
            positive: false,
            atom: Atom::Eq { sort, lhs, rhs },
        }
    }

    /// A positive predicate application.
    pub fn pred(p: PredId, args: Vec<Term>) -> Self {
        Literal {
            positive: true,
            atom: Atom::App(p, args),
        }
    }
}

/// A binary connective that does not flatten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinConn {
    /// Implication.
    Implies,
    /// Exclusive or.
    Xor,
}

/// A quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quantifier {
    /// Universal.
    Forall,
    /// Existential.
    Exists,
}

/// A quantified variable with its sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Binder {
    /// The variable index the body refers to.
    pub var: u32,
    /// The variable's sort.
    pub sort: SortId,
}

/// A first-order formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Formula {
    /// Truth.
    True,
    /// Falsity.
    False,
    /// A literal.
    Lit(Literal),
    /// A Boolean-sorted term in formula position (e.g. a `let` body or an
    /// if-then-else of Boolean branches).
    BoolTerm(Term),
    /// Negation.
    Not(Box<Formula>),
    /// Conjunction.
    And(Vec<Formula>),
    /// Disjunction.
    Or(Vec<Formula>),
    /// A non-flattening binary connective.
    Binary(BinConn, Box<Formula>, Box<Formula>),
    /// A quantified formula.
    Quantified {
        /// The quantifier.
        quantifier: Quantifier,
        /// Bound variables, in declaration order.
        binders: Vec<Binder>,
        /// The body.
        body: Box<Formula>,
    },
}

impl Formula {
    /// A literal as a formula.
    pub fn lit(lit: Literal) -> Self {
        Formula::Lit(lit)
    }

    /// Negation.
    pub fn not(f: Formula) -> Self {
        Formula::Not(Box::new(f))
    }

    /// A conjunction, simplifying a singleton or empty list.
    pub fn and<I>(fs: I) -> Self
    where
        I: IntoIterator<Item = Formula>,
    {
        let mut fs: Vec<Formula> = fs.into_iter().collect();
        if fs.is_empty() {
            Formula::True
        } else if fs.len() == 1 {
            fs.remove(0)
        } else {
            Formula::And(fs)
        }
    }

    /// A disjunction, simplifying a singleton or empty list.
    pub fn or<I>(fs: I) -> Self
    where
        I: IntoIterator<Item = Formula>,
    {
        let mut fs: Vec<Formula> = fs.into_iter().collect();
        if fs.is_empty() {
            Formula::False
        } else if fs.len() == 1 {
            fs.remove(0)
        } else {
            Formula::Or(fs)
        }
    }

    /// Implication.
    pub fn implies(lhs: Formula, rhs: Formula) -> Self {
        Formula::Binary(BinConn::Implies, Box::new(lhs), Box::new(rhs))
    }

    /// Exclusive or.
    pub fn xor(lhs: Formula, rhs: Formula) -> Self {
        Formula::Binary(BinConn::Xor, Box::new(lhs), Box::new(rhs))
    }

    /// A quantified formula; with no binders this is just the body.
    pub fn quantified(quantifier: Quantifier, binders: Vec<Binder>, body: Formula) -> Self {
        if binders.is_empty() {
            body
        } else {
            Formula::Quantified {
                quantifier,
                binders,
                body: Box::new(body),
            }
        }
    }

    /// A universally quantified formula.
    pub fn forall(binders: Vec<Binder>, body: Formula) -> Self {
        Formula::quantified(Quantifier::Forall, binders, body)
    }

    /// An existentially quantified formula.
    pub fn exists(binders: Vec<Binder>, body: Formula) -> Self {
        Formula::quantified(Quantifier::Exists, binders, body)
    }
}

/// The result of elaborating one expression: a formula, or a term tagged
/// with its sort.
///
/// The two views convert into each other at Bool. Converting a formula to a
/// term wraps it in [`Term::Formula`]; converting that term back recovers
/// the original formula, so a round trip is lossless. A Boolean term that is
/// not a wrapped formula (a variable, a constant, a `select`) converts to a
/// formula by wrapping in [`Formula::BoolTerm`] and is never unwrapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Value {
    /// A formula.
    Formula(Formula),
    /// A term with its sort.
    Term(SortId, Term),
}

impl Value {
    /// The sort of this value; formulas have sort Bool.
    pub fn sort(&self) -> SortId {
        match self {
            Value::Formula(_) => SortId::BOOL,
            Value::Term(sort, _) => *sort,
        }
    }

    /// View this value as a sorted term. Total: formulas wrap.
    pub fn into_term(self) -> (SortId, Term) {
        match self {
            Value::Formula(f) => (SortId::BOOL, Term::formula(f)),
            Value::Term(sort, t) => (sort, t),
        }
    }

    /// View this value as a formula, if it has sort Bool.
    pub fn into_formula(self) -> Option<Formula> {
        match self {
            Value::Formula(f) => Some(f),
            Value::Term(SortId::BOOL, Term::Formula(f)) => Some(*f),
            Value::Term(SortId::BOOL, t) => Some(Formula::BoolTerm(t)),
            Value::Term(..) => None,
        }
    }
}

/// Why a formula unit is part of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Origin {
    /// An `assert` form.
    Assertion,
    /// The defining equality of a `define-fun`.
    Definition,
    /// A datatype exhaustiveness axiom.
    Exhaustiveness,
    /// A datatype constructor-distinctness axiom.
    Distinctness,
    /// A datatype constructor-injectivity axiom.
    Injectivity,
    /// A datatype acyclicity axiom.
    Acyclicity,
}

/// One formula in the elaborated output, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaUnit {
    /// The formula.
    pub formula: Formula,
    /// Where it came from.
    pub origin: Origin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_round_trip() {
        let f = Formula::lit(Literal::pred(PredId(0), vec![]));
        let (sort, t) = Value::Formula(f.clone()).into_term();
        assert_eq!(sort, SortId::BOOL);
        assert_eq!(Value::Term(sort, t).into_formula(), Some(f));
    }

    #[test]
    fn test_bool_term_wraps() {
        // a Boolean constant that is not a wrapped formula
        let t = Term::app(FunId(3), vec![]);
        assert_eq!(
            Value::Term(SortId::BOOL, t.clone()).into_formula(),
            Some(Formula::BoolTerm(t))
        );
        assert_eq!(Value::Term(SortId::INT, Term::var(0)).into_formula(), None);
    }

    #[test]
    fn test_smart_constructors() {
        assert_eq!(Formula::and([]), Formula::True);
        assert_eq!(Formula::or([]), Formula::False);
        assert_eq!(Formula::and([Formula::True]), Formula::True);
        assert_eq!(Formula::forall(vec![], Formula::False), Formula::False);
        let b = Binder {
            var: 0,
            sort: SortId::INT,
        };
        assert!(matches!(
            Formula::exists(vec![b], Formula::True),
            Formula::Quantified {
                quantifier: Quantifier::Exists,
                ..
            }
        ));
    }
}
