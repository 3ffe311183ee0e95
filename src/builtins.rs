// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The reserved SMT-LIB symbols and their application rules.
//!
//! Arithmetic and comparison symbols are overloaded over Int and Real;
//! the overload is picked from the sort of the first operand and every
//! operand must then agree. Chainable comparisons, n-ary `distinct`, and
//! right-associative `=>`/`xor` desugar here into the primitive
//! connectives. Each resolved overload is an interned symbol in the
//! environment, keyed by its [`Interpretation`].

use itertools::Itertools;

use crate::elaborate::ResultStack;
use crate::env::{Environment, SortData};
use crate::error::{Error, Result};
use crate::sexp::Sexp;
use crate::syntax::{Binder, Formula, Literal, SortId, Term, Value};

/// An interpreted symbol of the target logic. Int and Real overloads are
/// distinct interpretations; array operations are keyed by the array sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Interpretation {
    /// A non-negative integer constant, kept as its source text.
    IntNumeral(String),
    /// A real constant, kept as its source text.
    RealNumeral(String),
    /// Binary `+` on Int.
    IntPlus,
    /// Binary `-` on Int.
    IntMinus,
    /// Unary `-` on Int.
    IntUnaryMinus,
    /// Binary `*` on Int.
    IntMultiply,
    /// Integer `div`.
    IntQuotient,
    /// Integer `mod`.
    IntModulo,
    /// Integer `abs`.
    IntAbs,
    /// `to_real`.
    IntToReal,
    /// `(_ divisible N)`'s underlying binary predicate.
    IntDivides,
    /// Binary `+` on Real.
    RealPlus,
    /// Binary `-` on Real.
    RealMinus,
    /// Unary `-` on Real.
    RealUnaryMinus,
    /// Binary `*` on Real.
    RealMultiply,
    /// Real division `/`.
    RealQuotient,
    /// `to_int`.
    RealToInt,
    /// `is_int`.
    RealIsInt,
    /// `<` on Int.
    IntLess,
    /// `<=` on Int.
    IntLessEqual,
    /// `>` on Int.
    IntGreater,
    /// `>=` on Int.
    IntGreaterEqual,
    /// `<` on Real.
    RealLess,
    /// `<=` on Real.
    RealLessEqual,
    /// `>` on Real.
    RealGreater,
    /// `>=` on Real.
    RealGreaterEqual,
    /// `select` on the given array sort, non-Boolean values.
    ArraySelect(SortId),
    /// `select` on the given array sort with Boolean values, which is a
    /// predicate rather than a function.
    ArrayBoolSelect(SortId),
    /// `store` on the given array sort.
    ArrayStore(SortId),
}

/// A reserved symbol that produces a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaSymbol {
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `=`
    Eq,
    /// `=>`
    Implies,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
    /// `and`
    And,
    /// `distinct`
    Distinct,
    /// `exists`
    Exists,
    /// `false`
    False,
    /// `forall`
    Forall,
    /// `is_int`
    IsInt,
    /// `not`
    Not,
    /// `or`
    Or,
    /// `true`
    True,
    /// `xor`
    Xor,
}

impl FormulaSymbol {
    /// Look up a name in the reserved formula-symbol table.
    pub fn from_name(name: &str) -> Option<Self> {
        use FormulaSymbol::*;
        match name {
            "<" => Some(Less),
            "<=" => Some(LessEq),
            "=" => Some(Eq),
            "=>" => Some(Implies),
            ">" => Some(Greater),
            ">=" => Some(GreaterEq),
            "and" => Some(And),
            "distinct" => Some(Distinct),
            "exists" => Some(Exists),
            "false" => Some(False),
            "forall" => Some(Forall),
            "is_int" => Some(IsInt),
            "not" => Some(Not),
            "or" => Some(Or),
            "true" => Some(True),
            "xor" => Some(Xor),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        use FormulaSymbol::*;
        match self {
            Less => "<",
            LessEq => "<=",
            Eq => "=",
            Implies => "=>",
            Greater => ">",
            GreaterEq => ">=",
            And => "and",
            Distinct => "distinct",
            Exists => "exists",
            False => "false",
            Forall => "forall",
            IsInt => "is_int",
            Not => "not",
            Or => "or",
            True => "true",
            Xor => "xor",
        }
    }
}

/// A reserved symbol that produces a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSymbol {
    /// `*`
    Multiply,
    /// `+`
    Plus,
    /// `-`, unary or binary by argument count.
    Minus,
    /// `/` (Real only)
    Divide,
    /// `abs`
    Abs,
    /// `div` (Int only)
    Div,
    /// `ite`
    Ite,
    /// `let` (handled by the elaborator, reserved here)
    Let,
    /// `mod`
    Mod,
    /// `select`
    Select,
    /// `store`
    Store,
    /// `to_int`
    ToInt,
    /// `to_real`
    ToReal,
}

impl TermSymbol {
    /// Look up a name in the reserved term-symbol table.
    pub fn from_name(name: &str) -> Option<Self> {
        use TermSymbol::*;
        match name {
            "*" => Some(Multiply),
            "+" => Some(Plus),
            "-" => Some(Minus),
            "/" => Some(Divide),
            "abs" => Some(Abs),
            "div" => Some(Div),
            "ite" => Some(Ite),
            "let" => Some(Let),
            "mod" => Some(Mod),
            "select" => Some(Select),
            "store" => Some(Store),
            "to_int" => Some(ToInt),
            "to_real" => Some(ToReal),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        use TermSymbol::*;
        match self {
            Multiply => "*",
            Plus => "+",
            Minus => "-",
            Divide => "/",
            Abs => "abs",
            Div => "div",
            Ite => "ite",
            Let => "let",
            Mod => "mod",
            Select => "select",
            Store => "store",
            ToInt => "to_int",
            ToReal => "to_real",
        }
    }
}

/// Whether a name is reserved by the builtin tables.
pub(crate) fn is_reserved(name: &str) -> bool {
    FormulaSymbol::from_name(name).is_some() || TermSymbol::from_name(name).is_some()
}

fn mismatch(symbol: &str, exp: &Sexp) -> Error {
    Error::ArityOrSortMismatch {
        symbol: symbol.to_string(),
        expr: exp.to_string(),
    }
}

fn comparison(sym: FormulaSymbol, sort: SortId) -> Option<Interpretation> {
    use FormulaSymbol::*;
    use Interpretation::*;
    match (sym, sort) {
        (Less, SortId::INT) => Some(IntLess),
        (Less, SortId::REAL) => Some(RealLess),
        (LessEq, SortId::INT) => Some(IntLessEqual),
        (LessEq, SortId::REAL) => Some(RealLessEqual),
        (Greater, SortId::INT) => Some(IntGreater),
        (Greater, SortId::REAL) => Some(RealGreater),
        (GreaterEq, SortId::INT) => Some(IntGreaterEqual),
        (GreaterEq, SortId::REAL) => Some(RealGreaterEqual),
        _ => None,
    }
}

fn arithmetic(sym: TermSymbol, sort: SortId) -> Option<Interpretation> {
    use Interpretation::*;
    use TermSymbol::*;
    match (sym, sort) {
        (Plus, SortId::INT) => Some(IntPlus),
        (Plus, SortId::REAL) => Some(RealPlus),
        (Minus, SortId::INT) => Some(IntMinus),
        (Minus, SortId::REAL) => Some(RealMinus),
        (Multiply, SortId::INT) => Some(IntMultiply),
        (Multiply, SortId::REAL) => Some(RealMultiply),
        // `/` is Real division; integer division is spelled `div`
        (Divide, SortId::REAL) => Some(RealQuotient),
        (Div, SortId::INT) => Some(IntQuotient),
        _ => None,
    }
}

/// Pop the operands of a chainable symbol: at least two, all the same sort.
fn chainable_operands(
    results: &mut ResultStack,
    name: &str,
    exp: &Sexp,
) -> Result<(SortId, Vec<Term>)> {
    let values = results.take_values();
    if values.len() < 2 {
        return Err(mismatch(name, exp));
    }
    let sorted: Vec<(SortId, Term)> = values.into_iter().map(Value::into_term).collect();
    let sort = sorted[0].0;
    if sorted.iter().any(|&(s, _)| s != sort) {
        return Err(mismatch(name, exp));
    }
    Ok((sort, sorted.into_iter().map(|(_, t)| t).collect()))
}

/// Apply a reserved formula symbol to the results above the current
/// separator, pushing the resulting formula.
pub(crate) fn apply_formula_symbol(
    env: &mut Environment,
    scopes: &mut crate::scope::Scopes,
    results: &mut ResultStack,
    sym: FormulaSymbol,
    exp: &Sexp,
) -> Result<()> {
    use FormulaSymbol::*;
    let err = || mismatch(sym.name(), exp);
    match sym {
        True => results.push_formula(Formula::True),
        False => results.push_formula(Formula::False),
        Not => {
            let f = results
                .pop_value()
                .and_then(Value::into_formula)
                .ok_or_else(err)?;
            results.push_formula(Formula::not(f));
        }
        And | Or => {
            let values = results.take_values();
            if values.is_empty() {
                return Err(err());
            }
            let fs = values
                .into_iter()
                .map(Value::into_formula)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(err)?;
            results.push_formula(if sym == And {
                Formula::and(fs)
            } else {
                Formula::or(fs)
            });
        }
        Implies | Xor => {
            let values = results.take_values();
            if values.len() < 2 {
                return Err(err());
            }
            let fs = values
                .into_iter()
                .map(Value::into_formula)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(err)?;
            // right-associative: the last two operands pair up first
            let mut rev = fs.into_iter().rev();
            let last = rev.next().ok_or_else(err)?;
            let folded = rev.fold(last, |acc, f| {
                if sym == Implies {
                    Formula::implies(f, acc)
                } else {
                    Formula::xor(f, acc)
                }
            });
            results.push_formula(folded);
        }
        Eq => {
            let (sort, ts) = chainable_operands(results, sym.name(), exp)?;
            let lits = ts
                .windows(2)
                .map(|w| Formula::lit(Literal::eq(sort, w[0].clone(), w[1].clone())))
                .collect::<Vec<_>>();
            results.push_formula(Formula::and(lits));
        }
        Distinct => {
            let (sort, ts) = chainable_operands(results, sym.name(), exp)?;
            let lits = ts
                .iter()
                .tuple_combinations()
                .map(|(a, b)| Formula::lit(Literal::neq(sort, a.clone(), b.clone())))
                .collect::<Vec<_>>();
            results.push_formula(Formula::and(lits));
        }
        Less | LessEq | Greater | GreaterEq => {
            let (sort, ts) = chainable_operands(results, sym.name(), exp)?;
            let intp = comparison(sym, sort).ok_or_else(err)?;
            let pred = env.interpreted_predicate(intp);
            let lits = ts
                .windows(2)
                .map(|w| Formula::lit(Literal::pred(pred, vec![w[0].clone(), w[1].clone()])))
                .collect::<Vec<_>>();
            results.push_formula(Formula::and(lits));
        }
        IsInt => {
            let (sort, t) = results.pop_term().ok_or_else(err)?;
            if sort != SortId::REAL {
                return Err(err());
            }
            let pred = env.interpreted_predicate(Interpretation::RealIsInt);
            results.push_formula(Formula::lit(Literal::pred(pred, vec![t])));
        }
        Forall | Exists => {
            let body = results
                .pop_value()
                .and_then(Value::into_formula)
                .ok_or_else(err)?;
            let scope = scopes.pop();
            let mut binders = scope
                .iter()
                .map(|(_, (term, sort))| match term {
                    Term::Var(var) => Binder {
                        var: *var,
                        sort: *sort,
                    },
                    _ => unreachable!("quantifier scope binds non-variables"),
                })
                .collect::<Vec<_>>();
            // variable indices are allocated in declaration order
            binders.sort_by_key(|b| b.var);
            let quantifier = if sym == Forall {
                crate::syntax::Quantifier::Forall
            } else {
                crate::syntax::Quantifier::Exists
            };
            results.push_formula(Formula::quantified(quantifier, binders, body));
        }
    }
    Ok(())
}

/// Apply a reserved term symbol, pushing the resulting term. Returns false
/// for `let`, which is reserved but never applied here.
pub(crate) fn apply_term_symbol(
    env: &mut Environment,
    results: &mut ResultStack,
    sym: TermSymbol,
    exp: &Sexp,
) -> Result<bool> {
    use TermSymbol::*;
    let err = || mismatch(sym.name(), exp);
    match sym {
        Let => return Ok(false),
        Ite => {
            let (else_sort, else_) = results.pop_term().ok_or_else(err)?;
            let (then_sort, then) = results.pop_term().ok_or_else(err)?;
            let cond = results
                .pop_value()
                .and_then(Value::into_formula)
                .ok_or_else(err)?;
            if then_sort != else_sort {
                return Err(err());
            }
            results.push_term(then_sort, Term::ite(cond, then, else_));
        }
        ToReal => {
            let (sort, t) = results.pop_term().ok_or_else(err)?;
            if sort != SortId::INT {
                return Err(err());
            }
            let f = env.interpreted_function(Interpretation::IntToReal);
            results.push_term(SortId::REAL, Term::app(f, vec![t]));
        }
        ToInt => {
            let (sort, t) = results.pop_term().ok_or_else(err)?;
            if sort != SortId::REAL {
                return Err(err());
            }
            let f = env.interpreted_function(Interpretation::RealToInt);
            results.push_term(SortId::INT, Term::app(f, vec![t]));
        }
        Abs => {
            let (sort, t) = results.pop_term().ok_or_else(err)?;
            if sort != SortId::INT {
                return Err(err());
            }
            let f = env.interpreted_function(Interpretation::IntAbs);
            results.push_term(SortId::INT, Term::app(f, vec![t]));
        }
        Mod => {
            let (b_sort, b) = results.pop_term().ok_or_else(err)?;
            let (a_sort, a) = results.pop_term().ok_or_else(err)?;
            if a_sort != SortId::INT || b_sort != SortId::INT {
                return Err(err());
            }
            let f = env.interpreted_function(Interpretation::IntModulo);
            results.push_term(SortId::INT, Term::app(f, vec![a, b]));
        }
        Select => {
            let (index_sort, index) = results.pop_term().ok_or_else(err)?;
            let (array_sort, array) = results.pop_term().ok_or_else(err)?;
            let (expected_index, value_sort) = match env.sort_data(array_sort) {
                SortData::Array { index, value } => (*index, *value),
                _ => return Err(err()),
            };
            if index_sort != expected_index {
                return Err(err());
            }
            if value_sort == SortId::BOOL {
                // a Boolean-valued array is read through a predicate
                let p = env.interpreted_predicate(Interpretation::ArrayBoolSelect(array_sort));
                results.push_formula(Formula::lit(Literal::pred(p, vec![array, index])));
            } else {
                let f = env.interpreted_function(Interpretation::ArraySelect(array_sort));
                results.push_term(value_sort, Term::app(f, vec![array, index]));
            }
        }
        Store => {
            let (value_sort, value) = results.pop_term().ok_or_else(err)?;
            let (index_sort, index) = results.pop_term().ok_or_else(err)?;
            let (array_sort, array) = results.pop_term().ok_or_else(err)?;
            let (expected_index, expected_value) = match env.sort_data(array_sort) {
                SortData::Array { index, value } => (*index, *value),
                _ => return Err(err()),
            };
            if index_sort != expected_index || value_sort != expected_value {
                return Err(err());
            }
            let f = env.interpreted_function(Interpretation::ArrayStore(array_sort));
            results.push_term(array_sort, Term::app(f, vec![array, index, value]));
        }
        Plus | Minus | Multiply | Divide | Div => {
            let values = results.take_values();
            if values.is_empty() {
                return Err(err());
            }
            let sorted: Vec<(SortId, Term)> = values.into_iter().map(Value::into_term).collect();
            let sort = sorted[0].0;
            if sorted.len() == 1 {
                // `-` with one argument is unary minus
                if sym != Minus {
                    return Err(err());
                }
                let intp = match sort {
                    SortId::INT => Interpretation::IntUnaryMinus,
                    SortId::REAL => Interpretation::RealUnaryMinus,
                    _ => return Err(err()),
                };
                let f = env.interpreted_function(intp);
                let (_, t) = sorted.into_iter().next().ok_or_else(err)?;
                results.push_term(sort, Term::app(f, vec![t]));
            } else {
                if sorted.iter().any(|&(s, _)| s != sort) {
                    return Err(err());
                }
                let intp = arithmetic(sym, sort).ok_or_else(err)?;
                let f = env.interpreted_function(intp);
                let mut ts = sorted.into_iter().map(|(_, t)| t);
                let first = ts.next().ok_or_else(err)?;
                let folded = ts.fold(first, |acc, t| Term::app(f, vec![acc, t]));
                results.push_term(sort, folded);
            }
        }
    }
    Ok(true)
}
