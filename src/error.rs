// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Errors reported while elaborating a benchmark.
//!
//! Every variant carries enough of the offending input (usually the printed
//! s-expression) to be reported to the user without further context. All
//! elaboration entry points return [`Result`]; an error aborts the current
//! benchmark.

use thiserror::Error;

/// An error encountered while elaborating an SMT-LIB benchmark.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The s-expression reader rejected the input text.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// A sort expression that is neither a known atom nor a well-formed
    /// application.
    #[error("malformed sort expression {0}")]
    MalformedSort(String),
    /// A sort identifier that names no built-in, declared sort, macro, or
    /// bound macro parameter.
    #[error("unknown sort identifier {0}")]
    UnknownSort(String),
    /// A sort macro whose expansion reaches itself.
    #[error("circular definition of sort {0}")]
    CircularSortDefinition(String),
    /// A name declared twice, in any combination of sort, macro, and
    /// function declarations.
    #[error("redeclaring symbol {0}")]
    RedeclaredSymbol(String),
    /// Wrong argument count or argument sorts at an application site.
    #[error("not enough arguments or wrong sorts for {symbol} application {expr}")]
    ArityOrSortMismatch {
        /// The symbol being applied.
        symbol: String,
        /// The full application expression.
        expr: String,
    },
    /// More results than one expression should produce; extra arguments to a
    /// nullary or already-saturated symbol.
    #[error("too many arguments in {0}")]
    TooManyArguments(String),
    /// An identifier in term position that resolves to nothing.
    #[error("unrecognized term identifier {0}")]
    UnknownIdentifier(String),
    /// An expression whose shape matches no term or formula production.
    #[error("malformed expression {0}")]
    MalformedExpression(String),
    /// An indexed identifier other than `(_ divisible N)`.
    #[error("unsupported indexed identifier in {0}")]
    UnsupportedIndexedIdentifier(String),
    /// A recognized logic this front end does not handle (bit-vectors).
    #[error("unsupported logic {0}")]
    UnsupportedLogic(String),
    /// A logic name missing from the SMT-LIB logic table.
    #[error("unrecognized logic {0}")]
    UnrecognizedLogic(String),
    /// A second `set-logic` form.
    #[error("set-logic appears more than once")]
    RepeatedSetLogic,
    /// A datatype none of whose constructors can terminate.
    #[error("datatype {0} is not well-founded")]
    IllFoundedDatatype(String),
    /// A datatype group with a non-empty sort-parameter list.
    #[error("parametric datatype declarations are not supported: {0}")]
    ParametricDatatype(String),
    /// The same name bound twice in one binder list.
    #[error("duplicate binding of {name} in {expr}")]
    DuplicateBinding {
        /// The rebound name.
        name: String,
        /// The binder list or quantifier expression.
        expr: String,
    },
    /// An `assert` whose body elaborated to a non-Boolean term.
    #[error("asserted expression of non-boolean sort: {0}")]
    AssertedNonBoolean(String),
    /// A `define-fun` whose body sort differs from the declared range.
    #[error("body of {name} has sort {found} but {expected} was declared")]
    DefinitionSortMismatch {
        /// The function being defined.
        name: String,
        /// The declared range sort.
        expected: String,
        /// The sort the body elaborated to.
        found: String,
    },
    /// A top-level form this front end does not recognize.
    #[error("unrecognized top-level form {0}")]
    UnrecognizedForm(String),
}

/// Alias for `Result` with the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
