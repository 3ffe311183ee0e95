// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! A custom s-expression data type and parsing.
//!
//! The grammar covers the concrete syntax of SMT-LIB 2 benchmarks: unquoted
//! symbols, string and pipe-quoted atoms, numerals, and decimals. Comments
//! run from `;` to the end of the line and are treated as whitespace.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// An atom in an s-expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Atom {
    /// A numeral, kept as its source text so width is unbounded. SMT-LIB
    /// numerals are unsigned; negative constants are spelled with unary `-`.
    I(String),
    /// A decimal, kept as its source text.
    D(String),
    /// A symbol, keyword, or quoted string (quotes retained).
    S(String),
}

/// An s-expression: an atom or a parenthesized list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Sexp {
    /// A leaf.
    Atom(Atom),
    /// A list of s-expressions.
    List(Vec<Sexp>),
}

/// Construct a symbol atom s-expression.
pub fn atom_s(s: &str) -> Sexp {
    Sexp::Atom(Atom::S(s.to_string()))
}

/// Construct a numeral atom s-expression.
pub fn atom_i(i: usize) -> Sexp {
    Sexp::Atom(Atom::I(i.to_string()))
}

/// Construct a list s-expression.
pub fn sexp_l<I>(i: I) -> Sexp
where
    I: IntoIterator<Item = Sexp>,
{
    Sexp::List(i.into_iter().collect())
}

/// Construct an "application": a list headed by a symbol.
pub fn app<I>(head: &str, args: I) -> Sexp
where
    I: IntoIterator<Item = Sexp>,
{
    sexp_l([atom_s(head)].into_iter().chain(args))
}

impl Sexp {
    /// Get the list of this s-expression, if it is a list.
    pub fn list(&self) -> Option<&[Sexp]> {
        match self {
            Sexp::Atom(_) => None,
            Sexp::List(ss) => Some(ss),
        }
    }

    /// Get the symbol of this s-expression, if it is a symbol atom.
    pub fn atom_s(&self) -> Option<&str> {
        match self {
            Sexp::Atom(Atom::S(s)) => Some(s),
            _ => None,
        }
    }

    /// Get the numeral text of this s-expression, if it is a numeral atom.
    pub fn atom_i(&self) -> Option<&str> {
        match self {
            Sexp::Atom(Atom::I(i)) => Some(i),
            _ => None,
        }
    }

    /// View this s-expression as a head symbol applied to arguments.
    pub fn app(&self) -> Option<(&str, &[Sexp])> {
        match self {
            Sexp::List(ss) => match ss.split_first() {
                Some((head, args)) => head.atom_s().map(|head| (head, args)),
                None => None,
            },
            Sexp::Atom(_) => None,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Atom::I(i) => write!(f, "{i}"),
            Atom::D(d) => write!(f, "{d}"),
            Atom::S(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Sexp::Atom(a) => write!(f, "{a}"),
            Sexp::List(ss) => {
                write!(f, "(")?;
                for (i, s) in ss.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{s}")?;
                }
                write!(f, ")")
            }
        }
    }
}

peg::parser! {
grammar parser() for str {
    rule ident_start() = ['a'..='z' | 'A'..='Z' | '_' | '~' | '!' | '@' | '$' | '%' | '^' | '&' | '*' | '-' | '+' | '=' | '<' | '>' | '.' | '?' | '/' | ':' ]

    rule ident_char() = ident_start() / ['0'..='9']

    rule unquoted_atom() -> Atom
        = s:$(quiet!{ident_start() ident_char()*} / expected!("atom"))
        { Atom::S(s.to_string()) }

    rule quoted_atom() -> Atom
        = "\"" s:$([^ '"']*) "\""
        { Atom::S(format!("\"{s}\"")) }

    rule pipe_quoted_atom() -> Atom
        = "|" s:$([^ '|']*) "|"
        { Atom::S(format!("|{s}|")) }

    rule decimal_atom() -> Atom
        = s:$(['0'..='9']+ "." ['0'..='9']+)
        { Atom::D(s.to_string()) }

    rule int_atom() -> Atom
        = s:$(['0'..='9']+)
        { Atom::I(s.to_string()) }

    rule atom() -> Atom
        = quoted_atom() / pipe_quoted_atom() / decimal_atom() / int_atom() / unquoted_atom()

    rule comment() = quiet!{";" [^ '\n']* (['\n'] / ![_])}

    rule ws() = quiet!{([' ' | '\t' | '\r' | '\n'] / comment())*}

    rule list() -> Sexp
        = "(" ws() ss:(sexp() ** ws()) ws() ")"
        { Sexp::List(ss) }

    rule sexp() -> Sexp
        = a:atom() { Sexp::Atom(a) }
        / list()

    pub rule sexp_whole() -> Sexp
        = ws() s:sexp() ws() { s }

    pub rule sexps() -> Vec<Sexp>
        = ws() ss:(sexp() ** ws()) ws() { ss }
}
}

/// Parse a single s-expression, which must span the entire input.
pub fn parse(s: &str) -> Result<Sexp> {
    parser::sexp_whole(s).map_err(|err| Error::Syntax(err.to_string()))
}

/// Parse a sequence of whitespace-separated s-expressions.
pub fn parse_many(s: &str) -> Result<Vec<Sexp>> {
    parser::sexps(s).map_err(|err| Error::Syntax(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_atoms() {
        assert_eq!(parse("x1"), Ok(atom_s("x1")));
        assert_eq!(parse("12"), Ok(atom_i(12)));
        assert_eq!(parse("1.5"), Ok(Sexp::Atom(Atom::D("1.5".to_string()))));
        assert_eq!(parse("-"), Ok(atom_s("-")));
        assert_eq!(parse("=>"), Ok(atom_s("=>")));
        assert_eq!(parse("|hello world|"), Ok(atom_s("|hello world|")));
        assert_eq!(parse("\"a string\""), Ok(atom_s("\"a string\"")));
    }

    #[test]
    fn test_parse_lists() {
        assert_eq!(
            parse("(and p q)"),
            Ok(app("and", [atom_s("p"), atom_s("q")]))
        );
        assert_eq!(
            parse("(select a 2)"),
            Ok(app("select", [atom_s("a"), atom_i(2)]))
        );
        assert_eq!(parse("()"), Ok(sexp_l([])));
        assert!(parse("(f x").is_err());
        assert!(parse("(f x))").is_err());
    }

    #[test]
    fn test_comments_are_whitespace() {
        let ss = parse_many(
            r#"; a header comment
(declare-fun p () Bool) ; trailing
(assert p)"#,
        )
        .unwrap();
        assert_eq!(ss.len(), 2);
        assert_eq!(ss[1], app("assert", [atom_s("p")]));
    }

    #[test]
    fn test_numerals_keep_their_text() {
        let e = parse("18446744073709551616").unwrap();
        assert_eq!(e.atom_i(), Some("18446744073709551616"));
        insta::assert_display_snapshot!(e, @"18446744073709551616");
    }

    #[test]
    fn test_display() {
        let e = parse("(assert (= (f x) 3))").unwrap();
        insta::assert_display_snapshot!(e, @"(assert (= (f x) 3))");
        let e = parse("( store  a  0  1.25 )").unwrap();
        insta::assert_display_snapshot!(e, @"(store a 0 1.25)");
    }

    #[test]
    fn test_accessors() {
        let e = parse("(declare-sort S 0)").unwrap();
        let (head, args) = e.app().unwrap();
        assert_eq!(head, "declare-sort");
        assert_eq!(args[0].atom_s(), Some("S"));
        assert_eq!(args[1].atom_i(), Some("0"));
        assert_eq!(e.list().map(|l| l.len()), Some(3));
    }
}
