// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! An SMT-LIB 2 front end for a sorted first-order prover.
//!
//! [`problem::Problem::parse`] elaborates a benchmark's top-level forms
//! into an ordered sequence of sorted formulas over a symbol environment,
//! ready for a downstream prover: sorts are interned, overloaded builtins
//! are resolved against their operand sorts, datatype declarations produce
//! their characteristic axioms, and `let`/quantifier scoping is resolved.

// configure clippy
#![allow(clippy::needless_return)]
#![allow(clippy::large_enum_variant)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::type_complexity)]
#![deny(clippy::uninlined_format_args)]
#![warn(missing_docs)]

pub mod builtins;
pub mod datatypes;
pub mod elaborate;
pub mod env;
pub mod error;
pub mod logic;
pub mod problem;
pub mod scope;
pub mod sexp;
pub mod sorts;
pub mod syntax;
