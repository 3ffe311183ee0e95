// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! End-to-end elaboration of complete benchmarks.

use smt2front::error::Error;
use smt2front::problem::{Options, Problem};
use smt2front::syntax::{Formula, Origin};

#[test]
fn elaborates_a_full_benchmark() {
    let problem = Problem::parse(
        r#"
        (set-logic UFDTLIA)
        (set-info :source |hand-written regression input|)
        (set-info :status unknown)

        (declare-sort process 0)
        (define-sort registry () (Array process Int))

        (declare-datatypes ()
          ((queue (empty)
                  (enqueue (front process) (back queue)))))

        (declare-fun priority (process) Int)
        (declare-const root process)
        (declare-const reg registry)

        (define-fun boosted ((p process)) Int (+ (priority p) 1))

        (assert (forall ((p process))
          (=> (distinct p root) (> (boosted p) 0))))
        (assert (exists ((q queue))
          (= q (enqueue root empty))))
        (assert (let ((r (select reg root)))
          (and (<= 0 r) ((_ divisible 4) r))))

        (check-sat)
        (exit)
        "#,
    )
    .unwrap();

    assert_eq!(problem.status.as_deref(), Some("unknown"));
    assert!(problem.source.is_some());

    let origins: Vec<Origin> = problem.units.iter().map(|u| u.origin).collect();
    assert_eq!(
        origins,
        vec![
            // queue declaration
            Origin::Exhaustiveness,
            Origin::Distinctness,
            Origin::Injectivity,
            Origin::Acyclicity,
            // boosted
            Origin::Definition,
            // the three asserts
            Origin::Assertion,
            Origin::Assertion,
            Origin::Assertion,
        ]
    );

    // the quantified assertion survived as a quantifier over one binder
    match &problem.units[5].formula {
        Formula::Quantified { binders, .. } => assert_eq!(binders.len(), 1),
        f => panic!("expected a quantified assertion, got {f:?}"),
    }
}

#[test]
fn axiom_emission_respects_options() {
    let text = r#"
        (declare-datatypes ()
          ((nat (zero) (succ (pred nat)))))
        (assert true)
    "#;
    let noisy = Problem::parse(text).unwrap();
    assert!(noisy.units.iter().any(|u| u.origin == Origin::Distinctness));
    assert!(noisy.units.iter().any(|u| u.origin == Origin::Acyclicity));

    let quiet = Problem::parse_with_options(
        text,
        Options {
            inference_axioms: false,
            acyclicity_axioms: false,
        },
    )
    .unwrap();
    let origins: Vec<Origin> = quiet.units.iter().map(|u| u.origin).collect();
    assert_eq!(origins, vec![Origin::Exhaustiveness, Origin::Assertion]);
}

#[test]
fn errors_carry_the_offending_text() {
    let err = Problem::parse("(assert (foo 1))").unwrap_err();
    assert_eq!(err, Error::UnknownIdentifier("foo".to_string()));
    assert_eq!(
        err.to_string(),
        "unrecognized term identifier foo"
    );

    let err = Problem::parse("(declare-fun f (Widget) Int)").unwrap_err();
    assert_eq!(err, Error::UnknownSort("Widget".to_string()));
}
