// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Elaboration of sort expressions into interned sort identifiers.
//!
//! The elaborator is an explicit work-stack machine, so arbitrarily nested
//! sort expressions never recurse on the input structure. Sort macros from
//! `define-sort` are expanded here, at each use site: expansion pushes a
//! lookup table for the macro's parameters and a cycle guard naming the
//! macro, both popped when its body is done.

use im::HashMap;

use crate::env::{Environment, SortData};
use crate::error::{Error, Result};
use crate::sexp::Sexp;
use crate::syntax::SortId;

enum Op<'a> {
    /// Elaborate one sort expression.
    Parse(&'a Sexp),
    /// Leave a macro expansion: drop its parameter table and cycle guard.
    PopLookup,
    /// An application is done; exactly one sort must sit above the separator.
    CheckArity(&'a Sexp),
}

enum Res {
    /// Marks the base of an application's arguments.
    Separator,
    /// A resolved sort.
    Sort(SortId),
}

/// Elaborate a sort expression to an interned sort identifier.
pub fn elaborate<'a>(env: &'a mut Environment, expr: &'a Sexp) -> Result<SortId> {
    // split the borrow: the interning table is written while the macro and
    // declaration tables are only read
    let Environment {
        ref mut sort_table,
        ref declared_sorts,
        ref sort_macros,
        ..
    } = *env;

    let mut todo = vec![Op::Parse(expr)];
    let mut results: Vec<Res> = vec![];
    // parameter tables of the macro expansions currently open, innermost last
    let mut lookups: Vec<HashMap<String, SortId>> = vec![];
    // names of those macros, for cycle detection
    let mut forbidden: Vec<String> = vec![];

    let pop_sort = |results: &mut Vec<Res>, name: &str| match results.pop() {
        Some(Res::Sort(s)) => Ok(s),
        _ => Err(Error::MalformedSort(name.to_string())),
    };

    while let Some(op) = todo.pop() {
        match op {
            Op::Parse(exp) => match exp {
                Sexp::List(es) => {
                    if es.is_empty() {
                        return Err(Error::MalformedSort(exp.to_string()));
                    }
                    results.push(Res::Separator);
                    todo.push(Op::CheckArity(exp));
                    // the head is parsed last, after its arguments resolve
                    for e in es {
                        todo.push(Op::Parse(e));
                    }
                }
                Sexp::Atom(_) => {
                    let name = match exp.atom_s() {
                        Some(name) => name,
                        None => return Err(Error::UnknownSort(exp.to_string())),
                    };
                    // macro parameters shadow everything, but only within
                    // their own expansion
                    if let Some(&sort) = lookups.last().and_then(|table| table.get(name)) {
                        results.push(Res::Sort(sort));
                    } else if forbidden.iter().any(|f| f == name) {
                        return Err(Error::CircularSortDefinition(name.to_string()));
                    } else if let Some(&arity) = declared_sorts.get(name) {
                        let mut args = vec![];
                        for _ in 0..arity {
                            args.push(pop_sort(&mut results, name)?);
                        }
                        let canonical = if args.is_empty() {
                            name.to_string()
                        } else {
                            let args = args
                                .iter()
                                .map(|&s| sort_table.name(s).to_string())
                                .collect::<Vec<_>>()
                                .join(" ");
                            format!("({name} {args})")
                        };
                        results.push(Res::Sort(sort_table.intern(canonical, SortData::Uninterpreted)));
                    } else if let Some(makro) = sort_macros.get(name) {
                        let mut table = HashMap::new();
                        for param in &makro.params {
                            let sort = pop_sort(&mut results, name)?;
                            table.insert(param.clone(), sort);
                        }
                        lookups.push(table);
                        forbidden.push(name.to_string());
                        todo.push(Op::PopLookup);
                        todo.push(Op::Parse(&makro.body));
                    } else {
                        match name {
                            "Bool" => results.push(Res::Sort(SortId::BOOL)),
                            "Int" => results.push(Res::Sort(SortId::INT)),
                            "Real" => results.push(Res::Sort(SortId::REAL)),
                            "Array" => {
                                let index = pop_sort(&mut results, name)?;
                                let value = pop_sort(&mut results, name)?;
                                results.push(Res::Sort(sort_table.array(index, value)));
                            }
                            _ => return Err(Error::UnknownSort(name.to_string())),
                        }
                    }
                }
            },
            Op::PopLookup => {
                lookups.pop();
                forbidden.pop();
            }
            Op::CheckArity(exp) => match (results.pop(), results.pop()) {
                (Some(Res::Sort(sort)), Some(Res::Separator)) => results.push(Res::Sort(sort)),
                _ => return Err(Error::MalformedSort(exp.to_string())),
            },
        }
    }

    match (results.pop(), results.pop()) {
        (Some(Res::Sort(sort)), None) => Ok(sort),
        _ => Err(Error::MalformedSort(expr.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parse;

    fn elab(env: &mut Environment, s: &str) -> Result<SortId> {
        let e = parse(s).unwrap();
        elaborate(env, &e)
    }

    #[test]
    fn test_builtin_sorts() {
        let mut env = Environment::new();
        assert_eq!(elab(&mut env, "Bool"), Ok(SortId::BOOL));
        assert_eq!(elab(&mut env, "Int"), Ok(SortId::INT));
        assert_eq!(elab(&mut env, "Real"), Ok(SortId::REAL));
    }

    #[test]
    fn test_round_trip_identity() {
        // elaborating the same expression twice yields the same identifier
        let mut env = Environment::new();
        env.declare_sort("Pair", 2).unwrap();
        let a = elab(&mut env, "(Pair Int (Array Int Real))").unwrap();
        let b = elab(&mut env, "(Pair Int (Array Int Real))").unwrap();
        assert_eq!(a, b);
        let c = elab(&mut env, "(Pair Int (Array Int Bool))").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_declared_sort_arity() {
        let mut env = Environment::new();
        env.declare_sort("Pair", 2).unwrap();
        assert!(elab(&mut env, "(Pair Int Real)").is_ok());
        assert_eq!(
            elab(&mut env, "(Pair Int)"),
            Err(Error::MalformedSort("Pair".to_string()))
        );
        assert_eq!(
            elab(&mut env, "(Pair Int Real Bool)"),
            Err(Error::MalformedSort("(Pair Int Real Bool)".to_string()))
        );
    }

    #[test]
    fn test_macro_matches_direct_elaboration() {
        let mut env = Environment::new();
        env.define_sort(
            "IntArr",
            vec!["X".to_string()],
            parse("(Array Int X)").unwrap(),
        )
        .unwrap();
        let via_macro = elab(&mut env, "(IntArr Real)").unwrap();
        let direct = elab(&mut env, "(Array Int Real)").unwrap();
        assert_eq!(via_macro, direct);
    }

    #[test]
    fn test_nested_macros() {
        let mut env = Environment::new();
        env.define_sort(
            "Arr",
            vec!["K".to_string(), "V".to_string()],
            parse("(Array K V)").unwrap(),
        )
        .unwrap();
        env.define_sort(
            "IntTo",
            vec!["V".to_string()],
            parse("(Arr Int V)").unwrap(),
        )
        .unwrap();
        let a = elab(&mut env, "(IntTo Bool)").unwrap();
        let b = elab(&mut env, "(Array Int Bool)").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_circular_macro() {
        let mut env = Environment::new();
        env.define_sort("A", vec![], parse("(Array Int A)").unwrap())
            .unwrap();
        assert_eq!(
            elab(&mut env, "A"),
            Err(Error::CircularSortDefinition("A".to_string()))
        );
    }

    #[test]
    fn test_mutual_circular_macros() {
        let mut env = Environment::new();
        env.define_sort("A", vec![], parse("B").unwrap()).unwrap();
        env.define_sort("B", vec![], parse("A").unwrap()).unwrap();
        assert_eq!(
            elab(&mut env, "A"),
            Err(Error::CircularSortDefinition("A".to_string()))
        );
    }

    #[test]
    fn test_unknown_and_malformed() {
        let mut env = Environment::new();
        assert_eq!(
            elab(&mut env, "Qux"),
            Err(Error::UnknownSort("Qux".to_string()))
        );
        assert_eq!(
            elab(&mut env, "()"),
            Err(Error::MalformedSort("()".to_string()))
        );
        assert_eq!(
            elab(&mut env, "17"),
            Err(Error::UnknownSort("17".to_string()))
        );
        assert!(elab(&mut env, "(Array Int)").is_err());
    }
}
