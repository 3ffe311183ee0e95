// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Declaration of datatype groups and derivation of their axioms.
//!
//! Declaration runs in two phases so the datatypes of a group can refer to
//! each other: all sorts of the group are declared first, then constructor
//! and destructor signatures are elaborated and registered. Between the
//! phases the group is checked for well-foundedness: some constructor of
//! each datatype must be able to terminate. Codatatypes are exempt.
//!
//! Every datatype gets an exhaustiveness axiom. Constructor distinctness
//! and injectivity, and an acyclicity encoding through a fresh strict
//! subterm predicate, are emitted unless switched off in [`Options`].

use fxhash::FxHashSet;
use itertools::Itertools;

use crate::env::{Constructor, ConstructorArg, Environment, TermAlgebra};
use crate::error::{Error, Result};
use crate::problem::Options;
use crate::sexp::Sexp;
use crate::sorts;
use crate::syntax::{
    Binder, Formula, FormulaUnit, Literal, Origin, SortId, Symbol, Term,
};

struct CtorDesc {
    name: String,
    /// Destructor names with the argument sorts, in declaration order.
    args: Vec<(String, SortId)>,
}

struct AlgebraDesc {
    name: String,
    sort: SortId,
    ctors: Vec<CtorDesc>,
}

/// Declare a group of mutually recursive (co)datatypes and derive their
/// axioms. `params` is the sort-parameter list, which must be empty; `decls`
/// is the list of datatype declarations.
pub fn declare_datatypes(
    env: &mut Environment,
    options: &Options,
    params: &Sexp,
    decls: &Sexp,
    co: bool,
) -> Result<Vec<FormulaUnit>> {
    match params.list() {
        Some([]) => {}
        _ => return Err(Error::ParametricDatatype(params.to_string())),
    }
    let decls = decls
        .list()
        .ok_or_else(|| Error::MalformedExpression(decls.to_string()))?;

    // phase one: declare every sort of the group
    let mut descs = vec![];
    for decl in decls {
        let (head, ctors) = match decl.list() {
            Some([head, ctors @ ..]) => (head, ctors),
            _ => return Err(Error::MalformedExpression(decl.to_string())),
        };
        let name = head
            .atom_s()
            .ok_or_else(|| Error::MalformedExpression(decl.to_string()))?;
        env.declare_sort(name, 0)?;
        let sort = sorts::elaborate(env, head)?;
        descs.push((name.to_string(), sort, ctors));
    }

    // phase two: elaborate constructor signatures; mutual references now
    // resolve
    let mut descs = {
        let mut out = vec![];
        for (name, sort, ctors) in descs {
            let ctors = ctors
                .iter()
                .map(|c| constructor_desc(env, c))
                .collect::<Result<Vec<_>>>()?;
            out.push(AlgebraDesc { name, sort, ctors });
        }
        out
    };

    if !co {
        check_well_founded(env, &descs)?;
    }

    let mut units = vec![];
    for desc in descs.drain(..) {
        let algebra = register(env, desc, co)?;
        units.push(exhaustiveness(&algebra));
        if options.inference_axioms {
            if algebra.constructors.len() >= 2 {
                units.push(distinctness(&algebra));
            }
            if algebra.constructors.iter().any(|c| !c.args.is_empty()) {
                units.push(injectivity(&algebra));
            }
        }
        if options.acyclicity_axioms && !co {
            if let Some(unit) = acyclicity(env, &algebra) {
                units.push(unit);
            }
        }
        env.add_term_algebra(algebra);
    }
    Ok(units)
}

fn constructor_desc(env: &mut Environment, ctor: &Sexp) -> Result<CtorDesc> {
    match ctor {
        Sexp::Atom(_) => {
            let name = ctor
                .atom_s()
                .ok_or_else(|| Error::MalformedExpression(ctor.to_string()))?;
            Ok(CtorDesc {
                name: name.to_string(),
                args: vec![],
            })
        }
        Sexp::List(es) => {
            let (head, args) = match es.split_first() {
                Some((head, args)) => (head, args),
                None => return Err(Error::MalformedExpression(ctor.to_string())),
            };
            let name = head
                .atom_s()
                .ok_or_else(|| Error::MalformedExpression(ctor.to_string()))?;
            let args = args
                .iter()
                .map(|arg| match arg.list() {
                    Some([dtor, sort_exp]) => {
                        let dtor = dtor
                            .atom_s()
                            .ok_or_else(|| Error::MalformedExpression(arg.to_string()))?;
                        let sort = sorts::elaborate(env, sort_exp)?;
                        Ok((dtor.to_string(), sort))
                    }
                    _ => Err(Error::MalformedExpression(arg.to_string())),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(CtorDesc {
                name: name.to_string(),
                args,
            })
        }
    }
}

/// A datatype is well-founded when some constructor has only well-founded
/// argument sorts. Sorts outside the group count as well-founded unless
/// they belong to a previously declared codatatype; within the group the
/// set grows to a fixpoint.
fn check_well_founded(env: &Environment, descs: &[AlgebraDesc]) -> Result<()> {
    let group: FxHashSet<SortId> = descs.iter().map(|d| d.sort).collect();
    let mut founded: FxHashSet<SortId> = FxHashSet::default();
    loop {
        let mut changed = false;
        for desc in descs {
            if founded.contains(&desc.sort) {
                continue;
            }
            let ok = desc.ctors.iter().any(|c| {
                c.args.iter().all(|&(_, sort)| {
                    if founded.contains(&sort) {
                        true
                    } else if group.contains(&sort) {
                        false
                    } else if let Some(algebra) = env.term_algebra(sort) {
                        !algebra.co
                    } else {
                        true
                    }
                })
            });
            if ok {
                founded.insert(desc.sort);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    for desc in descs {
        if !founded.contains(&desc.sort) {
            return Err(Error::IllFoundedDatatype(desc.name.clone()));
        }
    }
    Ok(())
}

fn register(env: &mut Environment, desc: AlgebraDesc, co: bool) -> Result<TermAlgebra> {
    let mut constructors = vec![];
    for ctor in desc.ctors {
        let mut args = vec![];
        for (dtor, sort) in &ctor.args {
            let destructor = env.declare_symbol(dtor, vec![desc.sort], *sort)?;
            args.push(ConstructorArg {
                destructor,
                sort: *sort,
            });
        }
        let arg_sorts = args.iter().map(|a| a.sort).collect();
        let symbol = match env.declare_symbol_full(&ctor.name, arg_sorts, desc.sort, true)? {
            Symbol::Function(f) => f,
            Symbol::Predicate(_) => unreachable!("constructor range is a datatype sort"),
        };
        constructors.push(Constructor {
            name: ctor.name,
            symbol,
            args,
        });
    }
    Ok(TermAlgebra {
        sort: desc.sort,
        co,
        constructors,
    })
}

/// Every value of the datatype is built by some constructor:
/// `forall x. x = c1(d11(x), ...) \/ ... \/ x = cn(...)`.
fn exhaustiveness(algebra: &TermAlgebra) -> FormulaUnit {
    let x = Term::var(0);
    let disjuncts = algebra
        .constructors
        .iter()
        .map(|c| {
            let args = c
                .args
                .iter()
                .map(|a| match a.destructor {
                    Symbol::Function(f) => Term::app(f, vec![x.clone()]),
                    Symbol::Predicate(p) => {
                        Term::formula(Formula::lit(Literal::pred(p, vec![x.clone()])))
                    }
                })
                .collect();
            Formula::lit(Literal::eq(
                algebra.sort,
                x.clone(),
                Term::app(c.symbol, args),
            ))
        })
        .collect::<Vec<_>>();
    FormulaUnit {
        formula: Formula::forall(
            vec![Binder {
                var: 0,
                sort: algebra.sort,
            }],
            Formula::or(disjuncts),
        ),
        origin: Origin::Exhaustiveness,
    }
}

/// Applications of different constructors are distinct, pairwise.
fn distinctness(algebra: &TermAlgebra) -> FormulaUnit {
    let mut next_var = 0;
    let mut binders = vec![];
    let apps = algebra
        .constructors
        .iter()
        .map(|c| {
            let args = c
                .args
                .iter()
                .map(|a| {
                    let var = next_var;
                    next_var += 1;
                    binders.push(Binder { var, sort: a.sort });
                    Term::var(var)
                })
                .collect();
            Term::app(c.symbol, args)
        })
        .collect::<Vec<_>>();
    let lits = apps
        .iter()
        .tuple_combinations()
        .map(|(a, b)| Formula::lit(Literal::neq(algebra.sort, a.clone(), b.clone())))
        .collect::<Vec<_>>();
    FormulaUnit {
        formula: Formula::forall(binders, Formula::and(lits)),
        origin: Origin::Distinctness,
    }
}

/// Equal constructor applications have equal arguments, one quantified
/// implication per constructor with arguments.
fn injectivity(algebra: &TermAlgebra) -> FormulaUnit {
    let conjuncts = algebra
        .constructors
        .iter()
        .filter(|c| !c.args.is_empty())
        .map(|c| {
            let mut binders = vec![];
            let mut xs = vec![];
            let mut ys = vec![];
            for (i, a) in c.args.iter().enumerate() {
                let (x, y) = (2 * i as u32, 2 * i as u32 + 1);
                binders.push(Binder { var: x, sort: a.sort });
                binders.push(Binder { var: y, sort: a.sort });
                xs.push(Term::var(x));
                ys.push(Term::var(y));
            }
            let premise = Formula::lit(Literal::eq(
                algebra.sort,
                Term::app(c.symbol, xs.clone()),
                Term::app(c.symbol, ys.clone()),
            ));
            let conclusion = Formula::and(c.args.iter().enumerate().map(|(i, a)| {
                Formula::lit(Literal::eq(a.sort, xs[i].clone(), ys[i].clone()))
            }));
            Formula::forall(binders, Formula::implies(premise, conclusion))
        })
        .collect::<Vec<_>>();
    FormulaUnit {
        formula: Formula::and(conjuncts),
        origin: Origin::Injectivity,
    }
}

/// No value is its own strict subterm. A fresh subterm predicate relates
/// each same-sort constructor argument to the constructed value and is
/// transitive and irreflexive. Recursion through other sorts is not covered
/// by this encoding.
fn acyclicity(env: &mut Environment, algebra: &TermAlgebra) -> Option<FormulaUnit> {
    let recursive = algebra
        .constructors
        .iter()
        .any(|c| c.args.iter().any(|a| a.sort == algebra.sort));
    if !recursive {
        return None;
    }
    let sort = algebra.sort;
    let sub = env.fresh_predicate("sSub", vec![sort, sort]);
    let mut conjuncts = vec![];
    for c in &algebra.constructors {
        if !c.args.iter().any(|a| a.sort == sort) {
            continue;
        }
        let binders: Vec<Binder> = c
            .args
            .iter()
            .enumerate()
            .map(|(i, a)| Binder {
                var: i as u32,
                sort: a.sort,
            })
            .collect();
        let app = Term::app(
            c.symbol,
            (0..c.args.len()).map(|i| Term::var(i as u32)).collect(),
        );
        for (i, a) in c.args.iter().enumerate() {
            if a.sort == sort {
                conjuncts.push(Formula::forall(
                    binders.clone(),
                    Formula::lit(Literal::pred(sub, vec![Term::var(i as u32), app.clone()])),
                ));
            }
        }
    }
    let (x, y, z) = (Term::var(0), Term::var(1), Term::var(2));
    let binder = |var| Binder { var, sort };
    conjuncts.push(Formula::forall(
        vec![binder(0), binder(1), binder(2)],
        Formula::implies(
            Formula::and([
                Formula::lit(Literal::pred(sub, vec![x.clone(), y.clone()])),
                Formula::lit(Literal::pred(sub, vec![y.clone(), z.clone()])),
            ]),
            Formula::lit(Literal::pred(sub, vec![x.clone(), z])),
        ),
    ));
    conjuncts.push(Formula::forall(
        vec![binder(0)],
        Formula::not(Formula::lit(Literal::pred(sub, vec![x.clone(), x]))),
    ));
    Some(FormulaUnit {
        formula: Formula::and(conjuncts),
        origin: Origin::Acyclicity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parse;

    fn declare(env: &mut Environment, options: &Options, src: &str) -> Result<Vec<FormulaUnit>> {
        let form = parse(src).unwrap();
        let (head, args) = form.app().unwrap();
        let co = head == "declare-codatatypes";
        declare_datatypes(env, options, &args[0], &args[1], co)
    }

    const NAT_LIST: &str = "(declare-datatypes () \
         ((nat (zero) (succ (pred nat))) \
          (list (nil) (cons (head nat) (tail list)))))";

    #[test]
    fn test_nat_list_axioms() {
        let mut env = Environment::new();
        let units = declare(&mut env, &Options::default(), NAT_LIST).unwrap();
        let origins: Vec<Origin> = units.iter().map(|u| u.origin).collect();
        assert_eq!(
            origins,
            vec![
                Origin::Exhaustiveness,
                Origin::Distinctness,
                Origin::Injectivity,
                Origin::Acyclicity,
                Origin::Exhaustiveness,
                Origin::Distinctness,
                Origin::Injectivity,
                Origin::Acyclicity,
            ]
        );
        // constructors and destructors are ordinary symbols now
        assert!(env.symbol("cons").is_some());
        assert!(env.symbol("tail").is_some());
        assert_eq!(env.term_algebras().len(), 2);
        let list = env.symbol("nil").map(|s| match s {
            Symbol::Function(f) => env.function(f).range,
            Symbol::Predicate(_) => panic!("nil is a function"),
        });
        assert_eq!(list.map(|s| env.term_algebra(s).is_some()), Some(true));
    }

    #[test]
    fn test_exhaustiveness_shape() {
        let mut env = Environment::new();
        let units = declare(&mut env, &Options::default(), NAT_LIST).unwrap();
        // forall x:nat. x = zero \/ x = succ(pred(x))
        match &units[0].formula {
            Formula::Quantified { binders, body, .. } => {
                assert_eq!(binders.len(), 1);
                match body.as_ref() {
                    Formula::Or(disjuncts) => {
                        assert_eq!(disjuncts.len(), 2);
                        for d in disjuncts {
                            match d {
                                Formula::Lit(Literal {
                                    positive: true,
                                    atom: crate::syntax::Atom::Eq { lhs, .. },
                                }) => assert_eq!(lhs, &Term::var(0)),
                                f => panic!("expected an equality disjunct, got {f:?}"),
                            }
                        }
                    }
                    f => panic!("expected a disjunction, got {f:?}"),
                }
            }
            f => panic!("expected a quantified axiom, got {f:?}"),
        }
    }

    #[test]
    fn test_inference_axioms_can_be_suppressed() {
        let mut env = Environment::new();
        let options = Options {
            inference_axioms: false,
            acyclicity_axioms: false,
        };
        let units = declare(&mut env, &options, NAT_LIST).unwrap();
        assert!(units.iter().all(|u| u.origin == Origin::Exhaustiveness));
    }

    #[test]
    fn test_ill_founded_rejected() {
        let mut env = Environment::new();
        let result = declare(
            &mut env,
            &Options::default(),
            "(declare-datatypes () ((loop (roll (unroll loop)))))",
        );
        assert_eq!(result, Err(Error::IllFoundedDatatype("loop".to_string())));
    }

    #[test]
    fn test_mutual_recursion_well_founded() {
        let mut env = Environment::new();
        // tree bottoms out through forest's nil
        let units = declare(
            &mut env,
            &Options::default(),
            "(declare-datatypes () \
               ((tree (node (children forest))) \
                (forest (fnil) (fcons (first tree) (rest forest)))))",
        )
        .unwrap();
        assert!(!units.is_empty());
    }

    #[test]
    fn test_mutual_ill_founded_rejected() {
        let mut env = Environment::new();
        let result = declare(
            &mut env,
            &Options::default(),
            "(declare-datatypes () \
               ((a (mka (geta b))) \
                (b (mkb (getb a)))))",
        );
        assert_eq!(result, Err(Error::IllFoundedDatatype("a".to_string())));
    }

    #[test]
    fn test_codatatype_exempt() {
        let mut env = Environment::new();
        let units = declare(
            &mut env,
            &Options::default(),
            "(declare-codatatypes () ((stream (scons (shead Int) (stail stream)))))",
        )
        .unwrap();
        // no acyclicity for codatatypes
        assert!(units.iter().all(|u| u.origin != Origin::Acyclicity));
    }

    #[test]
    fn test_parametric_rejected() {
        let mut env = Environment::new();
        let result = declare(
            &mut env,
            &Options::default(),
            "(declare-datatypes (T) ((box (mk (unbox T)))))",
        );
        assert!(matches!(result, Err(Error::ParametricDatatype(_))));
    }

    #[test]
    fn test_redeclared_constructor_rejected() {
        let mut env = Environment::new();
        env.declare_symbol("zero", vec![], SortId::INT).unwrap();
        let result = declare(
            &mut env,
            &Options::default(),
            "(declare-datatypes () ((nat (zero) (succ (pred nat)))))",
        );
        assert_eq!(result, Err(Error::RedeclaredSymbol("zero".to_string())));
    }

    #[test]
    fn test_bool_destructor_is_predicate() {
        let mut env = Environment::new();
        declare(
            &mut env,
            &Options::default(),
            "(declare-datatypes () ((wrap (mk (flag Bool)))))",
        )
        .unwrap();
        assert!(matches!(env.symbol("flag"), Some(Symbol::Predicate(_))));
    }
}
