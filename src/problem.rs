// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The benchmark driver: elaborates a sequence of top-level forms.
//!
//! A [`Problem`] accumulates declarations in its environment and formulas
//! in its unit list, in input order. Processing stops at `check-sat` or
//! `exit`; content after `check-sat` other than a final `(exit)` is
//! ignored with a warning.

use log::warn;

use crate::datatypes;
use crate::elaborate::Elaborator;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::logic::SmtLogic;
use crate::sexp::{self, Sexp};
use crate::sorts;
use crate::syntax::{Binder, Formula, FormulaUnit, Literal, Origin, SortId, Symbol, Term, Value};

/// Switches for the derived datatype axioms.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Emit constructor distinctness and injectivity axioms. A downstream
    /// prover with built-in datatype reasoning can discharge these itself.
    pub inference_axioms: bool,
    /// Emit the acyclicity encoding for recursive datatypes.
    pub acyclicity_axioms: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            inference_axioms: true,
            acyclicity_axioms: true,
        }
    }
}

enum Control {
    Continue,
    CheckSat,
    Exit,
}

/// An elaborated benchmark.
#[derive(Debug)]
pub struct Problem {
    /// The symbol environment, owning every declared and interned symbol.
    pub env: Environment,
    /// The output formulas, in input order.
    pub units: Vec<FormulaUnit>,
    /// The declared logic, if a `set-logic` form was seen.
    pub logic: Option<SmtLogic>,
    /// The value of `(set-info :status ...)`, if present.
    pub status: Option<String>,
    /// The value of `(set-info :source ...)`, if present.
    pub source: Option<String>,
    options: Options,
    numerals_are_real: bool,
    annotation_warned: bool,
}

impl Problem {
    /// Elaborate a benchmark from its source text with default options.
    pub fn parse(text: &str) -> Result<Problem> {
        Self::parse_with_options(text, Options::default())
    }

    /// Elaborate a benchmark from its source text.
    pub fn parse_with_options(text: &str, options: Options) -> Result<Problem> {
        let forms = sexp::parse_many(text)?;
        Self::from_forms(&forms, options)
    }

    /// Elaborate a benchmark from already-parsed top-level forms.
    pub fn from_forms(forms: &[Sexp], options: Options) -> Result<Problem> {
        let mut problem = Problem {
            env: Environment::new(),
            units: vec![],
            logic: None,
            status: None,
            source: None,
            options,
            numerals_are_real: false,
            annotation_warned: false,
        };
        for (i, form) in forms.iter().enumerate() {
            match problem.read_form(form)? {
                Control::Continue => {}
                Control::Exit => break,
                Control::CheckSat => {
                    let rest = &forms[i + 1..];
                    let only_exit = match rest {
                        [] => true,
                        [only] => only
                            .app()
                            .map_or(false, |(head, args)| head == "exit" && args.is_empty()),
                        _ => false,
                    };
                    if !only_exit {
                        warn!("ignoring the rest of the input after check-sat");
                    }
                    break;
                }
            }
        }
        Ok(problem)
    }

    fn read_form(&mut self, form: &Sexp) -> Result<Control> {
        let unrecognized = || Error::UnrecognizedForm(form.to_string());
        let (head, args) = form.app().ok_or_else(unrecognized)?;
        match (head, args) {
            ("set-logic", [name]) => {
                if self.logic.is_some() {
                    return Err(Error::RepeatedSetLogic);
                }
                let name = name.atom_s().ok_or_else(unrecognized)?;
                let logic = SmtLogic::from_name(name)?;
                if logic.is_bitvector() {
                    return Err(Error::UnsupportedLogic(name.to_string()));
                }
                self.numerals_are_real = logic.numerals_are_real();
                self.logic = Some(logic);
            }
            ("set-info", [key, value]) => match key.atom_s() {
                Some(":status") => self.status = Some(value.to_string()),
                Some(":source") => self.source = Some(value.to_string()),
                _ => {}
            },
            ("declare-sort", [name, arity]) => {
                let name = name.atom_s().ok_or_else(unrecognized)?;
                let arity = arity
                    .atom_i()
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(unrecognized)?;
                self.env.declare_sort(name, arity)?;
            }
            ("define-sort", [name, params, body]) => {
                let name = name.atom_s().ok_or_else(unrecognized)?;
                let params = params
                    .list()
                    .ok_or_else(unrecognized)?
                    .iter()
                    .map(|p| p.atom_s().map(str::to_string).ok_or_else(unrecognized))
                    .collect::<Result<Vec<_>>>()?;
                self.env.define_sort(name, params, body.clone())?;
            }
            ("declare-fun", [name, arg_list, range]) => {
                let name = name.atom_s().ok_or_else(unrecognized)?;
                let args = arg_list
                    .list()
                    .ok_or_else(unrecognized)?
                    .iter()
                    .map(|s| sorts::elaborate(&mut self.env, s))
                    .collect::<Result<Vec<_>>>()?;
                let range = sorts::elaborate(&mut self.env, range)?;
                self.env.declare_symbol(name, args, range)?;
            }
            ("declare-const", [name, range]) => {
                let name = name.atom_s().ok_or_else(unrecognized)?;
                let range = sorts::elaborate(&mut self.env, range)?;
                self.env.declare_symbol(name, vec![], range)?;
            }
            ("define-fun", [name, params, range, body]) => {
                self.define_fun(form, name, params, range, body)?;
            }
            ("declare-datatypes", [params, decls]) => {
                let units =
                    datatypes::declare_datatypes(&mut self.env, &self.options, params, decls, false)?;
                self.units.extend(units);
            }
            ("declare-codatatypes", [params, decls]) => {
                let units =
                    datatypes::declare_datatypes(&mut self.env, &self.options, params, decls, true)?;
                self.units.extend(units);
            }
            ("assert", [body]) => {
                let value = self.elaborate(body, &[])?.1;
                let formula = value
                    .into_formula()
                    .ok_or_else(|| Error::AssertedNonBoolean(body.to_string()))?;
                self.units.push(FormulaUnit {
                    formula,
                    origin: Origin::Assertion,
                });
            }
            ("check-sat", []) => return Ok(Control::CheckSat),
            ("exit", []) => return Ok(Control::Exit),
            _ => return Err(unrecognized()),
        }
        Ok(Control::Continue)
    }

    /// Elaborate an expression, optionally under parameter bindings.
    /// Returns the binders for the parameters along with the value.
    fn elaborate(
        &mut self,
        body: &Sexp,
        params: &[(String, SortId)],
    ) -> Result<(Vec<Binder>, Value)> {
        let mut elaborator = Elaborator::new(&mut self.env, self.numerals_are_real);
        elaborator.set_annotation_warned(self.annotation_warned);
        let binders = if params.is_empty() {
            vec![]
        } else {
            elaborator.bind_parameters(params, body)?
        };
        let result = elaborator.term_or_formula(body);
        self.annotation_warned = elaborator.annotation_warned();
        Ok((binders, result?))
    }

    fn define_fun(
        &mut self,
        form: &Sexp,
        name: &Sexp,
        params: &Sexp,
        range: &Sexp,
        body: &Sexp,
    ) -> Result<()> {
        let unrecognized = || Error::UnrecognizedForm(form.to_string());
        let name = name.atom_s().ok_or_else(unrecognized)?.to_string();
        let params = params
            .list()
            .ok_or_else(unrecognized)?
            .iter()
            .map(|p| match p.list() {
                Some([pname, sort_exp]) => {
                    let pname = pname.atom_s().ok_or_else(unrecognized)?;
                    let sort = sorts::elaborate(&mut self.env, sort_exp)?;
                    Ok((pname.to_string(), sort))
                }
                _ => Err(unrecognized()),
            })
            .collect::<Result<Vec<_>>>()?;
        let range_sort = sorts::elaborate(&mut self.env, range)?;

        // the body cannot refer to the function: it is declared afterwards
        let (binders, value) = self.elaborate(body, &params)?;
        let (body_sort, body_term) = value.into_term();
        if body_sort != range_sort {
            return Err(Error::DefinitionSortMismatch {
                name,
                expected: self.env.sort_name(range_sort).to_string(),
                found: self.env.sort_name(body_sort).to_string(),
            });
        }

        let arg_sorts = params.iter().map(|&(_, sort)| sort).collect();
        let symbol = self.env.declare_symbol(&name, arg_sorts, range_sort)?;
        let param_terms: Vec<Term> = binders.iter().map(|b| Term::var(b.var)).collect();
        let lhs = match symbol {
            Symbol::Function(f) => Term::app(f, param_terms),
            Symbol::Predicate(p) => Term::formula(Formula::lit(Literal::pred(p, param_terms))),
        };
        let defining = Formula::lit(Literal::eq(range_sort, lhs, body_term));
        self.units.push(FormulaUnit {
            formula: Formula::forall(binders, defining),
            origin: Origin::Definition,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Quantifier;

    #[test]
    fn test_small_benchmark() {
        let problem = Problem::parse(
            r#"
            (set-logic QF_UFLIA)
            (set-info :status unsat)
            (declare-sort V 0)
            (declare-fun value (V) Int)
            (declare-const v V)
            (assert (> (value v) 0))
            (assert (< (value v) 0))
            (check-sat)
            (exit)
            "#,
        )
        .unwrap();
        assert_eq!(problem.logic, Some(SmtLogic::QF_UFLIA));
        assert_eq!(problem.status.as_deref(), Some("unsat"));
        assert_eq!(problem.units.len(), 2);
        assert!(problem
            .units
            .iter()
            .all(|u| u.origin == Origin::Assertion));
    }

    #[test]
    fn test_set_logic_rules() {
        assert_eq!(
            Problem::parse("(set-logic QF_UF) (set-logic QF_UF)").unwrap_err(),
            Error::RepeatedSetLogic
        );
        assert_eq!(
            Problem::parse("(set-logic QF_BV)").unwrap_err(),
            Error::UnsupportedLogic("QF_BV".to_string())
        );
        assert_eq!(
            Problem::parse("(set-logic QF_FP)").unwrap_err(),
            Error::UnrecognizedLogic("QF_FP".to_string())
        );
    }

    #[test]
    fn test_real_logic_numerals() {
        let problem = Problem::parse(
            r#"
            (set-logic QF_LRA)
            (declare-const x Real)
            (assert (= x 1))
            "#,
        )
        .unwrap();
        assert_eq!(problem.units.len(), 1);
        // the same benchmark without the logic mis-sorts the numeral
        assert!(matches!(
            Problem::parse("(declare-const x Real) (assert (= x 1))"),
            Err(Error::ArityOrSortMismatch { .. })
        ));
    }

    #[test]
    fn test_numerals_wider_than_machine_integers() {
        // 2^64 does not fit in a u64, but the numeral is legal
        let problem =
            Problem::parse("(declare-const x Int) (assert (= x 18446744073709551616))").unwrap();
        assert_eq!(problem.units.len(), 1);
    }

    #[test]
    fn test_set_info_arity() {
        assert_eq!(
            Problem::parse("(set-info :status)").unwrap_err(),
            Error::UnrecognizedForm("(set-info :status)".to_string())
        );
        // unknown keys of the right shape stay ignored
        assert!(Problem::parse("(set-info :smt-lib-version 2.6)").is_ok());
    }

    #[test]
    fn test_check_sat_truncates() {
        // an error after check-sat is never reached
        let problem = Problem::parse(
            r#"
            (declare-const p Bool)
            (assert p)
            (check-sat)
            (assert undeclared)
            "#,
        )
        .unwrap();
        assert_eq!(problem.units.len(), 1);
    }

    #[test]
    fn test_define_fun_quantifies() {
        let problem = Problem::parse(
            r#"
            (define-fun inc ((x Int)) Int (+ x 1))
            (assert (= (inc 2) 3))
            "#,
        )
        .unwrap();
        assert_eq!(problem.units.len(), 2);
        assert_eq!(problem.units[0].origin, Origin::Definition);
        match &problem.units[0].formula {
            Formula::Quantified {
                quantifier: Quantifier::Forall,
                binders,
                body,
            } => {
                assert_eq!(binders.len(), 1);
                assert!(matches!(body.as_ref(), Formula::Lit(_)));
            }
            f => panic!("expected a quantified definition, got {f:?}"),
        }
    }

    #[test]
    fn test_define_fun_nullary_predicate() {
        let problem = Problem::parse("(define-fun p () Bool (and true true))").unwrap();
        // p() = true, at sort Bool, with no quantifier
        assert!(matches!(problem.units[0].formula, Formula::Lit(_)));
        assert!(matches!(problem.env.symbol("p"), Some(Symbol::Predicate(_))));
    }

    #[test]
    fn test_define_fun_is_not_recursive() {
        assert_eq!(
            Problem::parse("(define-fun f ((x Int)) Int (f x))").unwrap_err(),
            Error::UnknownIdentifier("f".to_string())
        );
    }

    #[test]
    fn test_define_fun_body_sort_checked() {
        assert!(matches!(
            Problem::parse("(define-fun f ((x Int)) Real x)"),
            Err(Error::DefinitionSortMismatch { .. })
        ));
    }

    #[test]
    fn test_assert_requires_bool() {
        assert_eq!(
            Problem::parse("(assert 3)").unwrap_err(),
            Error::AssertedNonBoolean("3".to_string())
        );
    }

    #[test]
    fn test_unrecognized_form() {
        assert_eq!(
            Problem::parse("(push 1)").unwrap_err(),
            Error::UnrecognizedForm("(push 1)".to_string())
        );
    }

    #[test]
    fn test_define_sort_use() {
        let problem = Problem::parse(
            r#"
            (define-sort IntArray () (Array Int Int))
            (declare-const a IntArray)
            (assert (= (select a 0) 1))
            "#,
        )
        .unwrap();
        assert_eq!(problem.units.len(), 1);
    }

    #[test]
    fn test_datatype_units_interleave_in_order() {
        let problem = Problem::parse(
            r#"
            (assert true)
            (declare-datatypes () ((pair (mk (fst Int) (snd Int)))))
            (assert (= (fst (mk 1 2)) 1))
            "#,
        )
        .unwrap();
        let origins: Vec<Origin> = problem.units.iter().map(|u| u.origin).collect();
        assert_eq!(
            origins,
            vec![
                Origin::Assertion,
                Origin::Exhaustiveness,
                Origin::Injectivity,
                Origin::Assertion,
            ]
        );
    }
}
