// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The symbol environment: every name the benchmark can refer to.
//!
//! The environment owns the interned sort table, user sort and function
//! declarations, sort macros, the interpreted symbols created on demand by
//! the builtin dispatcher, and the registered datatypes. It is threaded
//! through elaboration by `&mut` reference; all tables are append-only.

use fxhash::FxHashMap;

use crate::builtins::{self, Interpretation};
use crate::error::{Error, Result};
use crate::sexp::Sexp;
use crate::syntax::{FunId, PredId, SortId, Symbol};

/// What an interned sort is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortData {
    /// Bool, Int, or Real.
    Builtin,
    /// An application of a user-declared sort symbol.
    Uninterpreted,
    /// An array sort.
    Array {
        /// The index sort.
        index: SortId,
        /// The value sort.
        value: SortId,
    },
}

#[derive(Debug, Clone)]
struct SortEntry {
    name: String,
    data: SortData,
}

/// The sort interning table. Sorts are identified by their canonical name,
/// so structurally equal sorts always receive the same identifier.
#[derive(Debug)]
pub(crate) struct SortTable {
    entries: Vec<SortEntry>,
    by_name: FxHashMap<String, SortId>,
}

impl SortTable {
    fn new() -> Self {
        let mut table = SortTable {
            entries: vec![],
            by_name: FxHashMap::default(),
        };
        assert_eq!(table.intern("Bool".to_string(), SortData::Builtin), SortId::BOOL);
        assert_eq!(table.intern("Int".to_string(), SortData::Builtin), SortId::INT);
        assert_eq!(table.intern("Real".to_string(), SortData::Builtin), SortId::REAL);
        table
    }

    pub(crate) fn intern(&mut self, name: String, data: SortData) -> SortId {
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        let id = SortId(self.entries.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.entries.push(SortEntry { name, data });
        id
    }

    pub(crate) fn array(&mut self, index: SortId, value: SortId) -> SortId {
        let name = format!("(Array {} {})", self.name(index), self.name(value));
        self.intern(name, SortData::Array { index, value })
    }

    pub(crate) fn name(&self, id: SortId) -> &str {
        &self.entries[id.0 as usize].name
    }

    pub(crate) fn data(&self, id: SortId) -> &SortData {
        &self.entries[id.0 as usize].data
    }
}

/// A `define-sort` macro: parameter names and an unexpanded body.
#[derive(Debug, Clone)]
pub(crate) struct SortMacro {
    pub(crate) params: Vec<String>,
    pub(crate) body: Sexp,
}

/// The declaration of a function symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    /// The symbol's name.
    pub name: String,
    /// Argument sorts.
    pub args: Vec<SortId>,
    /// The range sort (never Bool).
    pub range: SortId,
    /// Whether this symbol is a datatype constructor.
    pub constructor: bool,
}

/// The declaration of a predicate symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateDecl {
    /// The symbol's name.
    pub name: String,
    /// Argument sorts.
    pub args: Vec<SortId>,
}

/// One argument of a datatype constructor.
#[derive(Debug, Clone)]
pub struct ConstructorArg {
    /// The destructor symbol for this argument.
    pub destructor: Symbol,
    /// The argument's sort.
    pub sort: SortId,
}

/// A datatype constructor with its declared symbol.
#[derive(Debug, Clone)]
pub struct Constructor {
    /// The constructor's name.
    pub name: String,
    /// The constructor's function symbol.
    pub symbol: FunId,
    /// Its arguments, in declaration order.
    pub args: Vec<ConstructorArg>,
}

/// A declared (co)datatype.
#[derive(Debug, Clone)]
pub struct TermAlgebra {
    /// The datatype's sort.
    pub sort: SortId,
    /// Whether this is a codatatype (exempt from well-foundedness).
    pub co: bool,
    /// Constructors in declaration order.
    pub constructors: Vec<Constructor>,
}

/// The symbol environment for one benchmark.
#[derive(Debug)]
pub struct Environment {
    pub(crate) sort_table: SortTable,
    /// Declared sort symbols with their arities.
    pub(crate) declared_sorts: FxHashMap<String, usize>,
    pub(crate) sort_macros: FxHashMap<String, SortMacro>,
    functions: Vec<FunctionDecl>,
    predicates: Vec<PredicateDecl>,
    /// User-visible function and predicate names.
    symbols: FxHashMap<String, Symbol>,
    interpreted: FxHashMap<Interpretation, Symbol>,
    term_algebras: Vec<TermAlgebra>,
    algebra_sorts: FxHashMap<SortId, usize>,
    fresh_counter: u32,
}

impl Environment {
    /// Create an environment with the built-in sorts interned.
    pub fn new() -> Self {
        Environment {
            sort_table: SortTable::new(),
            declared_sorts: FxHashMap::default(),
            sort_macros: FxHashMap::default(),
            functions: vec![],
            predicates: vec![],
            symbols: FxHashMap::default(),
            interpreted: FxHashMap::default(),
            term_algebras: vec![],
            algebra_sorts: FxHashMap::default(),
            fresh_counter: 0,
        }
    }

    // ------------------------------------------------------------------
    // sorts

    /// The canonical name of an interned sort.
    pub fn sort_name(&self, id: SortId) -> &str {
        self.sort_table.name(id)
    }

    /// What an interned sort is.
    pub fn sort_data(&self, id: SortId) -> &SortData {
        self.sort_table.data(id)
    }

    /// Intern the array sort with the given index and value sorts.
    pub fn array_sort(&mut self, index: SortId, value: SortId) -> SortId {
        self.sort_table.array(index, value)
    }

    /// Whether a name denotes a built-in sort, a declared sort, or a macro.
    pub fn is_known_sort_symbol(&self, name: &str) -> bool {
        matches!(name, "Bool" | "Int" | "Real" | "Array")
            || self.declared_sorts.contains_key(name)
            || self.sort_macros.contains_key(name)
    }

    /// Whether a name denotes a reserved word or a declared function or
    /// predicate symbol.
    pub fn is_known_function_symbol(&self, name: &str) -> bool {
        builtins::is_reserved(name) || self.symbols.contains_key(name)
    }

    fn check_fresh_name(&self, name: &str) -> Result<()> {
        // one namespace: sorts, macros, and functions may not collide
        if self.is_known_sort_symbol(name) || self.is_known_function_symbol(name) {
            return Err(Error::RedeclaredSymbol(name.to_string()));
        }
        Ok(())
    }

    /// Declare an uninterpreted sort symbol of the given arity.
    pub fn declare_sort(&mut self, name: &str, arity: usize) -> Result<()> {
        self.check_fresh_name(name)?;
        self.declared_sorts.insert(name.to_string(), arity);
        Ok(())
    }

    /// Record a `define-sort` macro. The body is kept unexpanded and is
    /// elaborated at each use site.
    pub fn define_sort(&mut self, name: &str, params: Vec<String>, body: Sexp) -> Result<()> {
        self.check_fresh_name(name)?;
        self.sort_macros
            .insert(name.to_string(), SortMacro { params, body });
        Ok(())
    }

    // ------------------------------------------------------------------
    // functions and predicates

    /// Declare a user function symbol. A Boolean range produces a predicate.
    pub fn declare_symbol(&mut self, name: &str, args: Vec<SortId>, range: SortId) -> Result<Symbol> {
        self.declare_symbol_full(name, args, range, false)
    }

    pub(crate) fn declare_symbol_full(
        &mut self,
        name: &str,
        args: Vec<SortId>,
        range: SortId,
        constructor: bool,
    ) -> Result<Symbol> {
        self.check_fresh_name(name)?;
        let symbol = if range == SortId::BOOL {
            Symbol::Predicate(self.add_predicate(name.to_string(), args))
        } else {
            Symbol::Function(self.add_function(name.to_string(), args, range, constructor))
        };
        self.symbols.insert(name.to_string(), symbol);
        Ok(symbol)
    }

    fn add_function(&mut self, name: String, args: Vec<SortId>, range: SortId, constructor: bool) -> FunId {
        let id = FunId(self.functions.len() as u32);
        self.functions.push(FunctionDecl {
            name,
            args,
            range,
            constructor,
        });
        id
    }

    fn add_predicate(&mut self, name: String, args: Vec<SortId>) -> PredId {
        let id = PredId(self.predicates.len() as u32);
        self.predicates.push(PredicateDecl { name, args });
        id
    }

    /// Look up a declared function or predicate by name.
    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name).copied()
    }

    /// The declaration of a function symbol.
    pub fn function(&self, id: FunId) -> &FunctionDecl {
        &self.functions[id.0 as usize]
    }

    /// The declaration of a predicate symbol.
    pub fn predicate(&self, id: PredId) -> &PredicateDecl {
        &self.predicates[id.0 as usize]
    }

    /// A fresh function symbol, invisible to name lookup.
    pub fn fresh_function(&mut self, prefix: &str, args: Vec<SortId>, range: SortId) -> FunId {
        let name = format!("{prefix}{}", self.fresh_counter);
        self.fresh_counter += 1;
        self.add_function(name, args, range, false)
    }

    /// A fresh predicate symbol, invisible to name lookup.
    pub fn fresh_predicate(&mut self, prefix: &str, args: Vec<SortId>) -> PredId {
        let name = format!("{prefix}{}", self.fresh_counter);
        self.fresh_counter += 1;
        self.add_predicate(name, args)
    }

    // ------------------------------------------------------------------
    // interpreted symbols

    /// The function symbol for an interpretation, interning it on first use.
    pub fn interpreted_function(&mut self, intp: Interpretation) -> FunId {
        if let Some(&symbol) = self.interpreted.get(&intp) {
            match symbol {
                Symbol::Function(f) => return f,
                Symbol::Predicate(_) => unreachable!("interpretation changed kind"),
            }
        }
        let (name, args, range) = self.function_interpretation_signature(&intp);
        let f = self.add_function(name, args, range, false);
        self.interpreted.insert(intp, Symbol::Function(f));
        f
    }

    /// The predicate symbol for an interpretation, interning it on first use.
    pub fn interpreted_predicate(&mut self, intp: Interpretation) -> PredId {
        if let Some(&symbol) = self.interpreted.get(&intp) {
            match symbol {
                Symbol::Predicate(p) => return p,
                Symbol::Function(_) => unreachable!("interpretation changed kind"),
            }
        }
        let (name, args) = self.predicate_interpretation_signature(&intp);
        let p = self.add_predicate(name, args);
        self.interpreted.insert(intp, Symbol::Predicate(p));
        p
    }

    /// The nullary constant for an integer numeral.
    pub fn int_numeral(&mut self, text: &str) -> FunId {
        self.interpreted_function(Interpretation::IntNumeral(text.to_string()))
    }

    /// The nullary constant for a real numeral or decimal.
    pub fn real_numeral(&mut self, text: &str) -> FunId {
        self.interpreted_function(Interpretation::RealNumeral(text.to_string()))
    }

    fn function_interpretation_signature(
        &self,
        intp: &Interpretation,
    ) -> (String, Vec<SortId>, SortId) {
        use Interpretation::*;
        let (int2, real2) = (vec![SortId::INT; 2], vec![SortId::REAL; 2]);
        match intp {
            IntNumeral(n) => (n.clone(), vec![], SortId::INT),
            RealNumeral(s) => (s.clone(), vec![], SortId::REAL),
            IntPlus => ("$plus_int".to_string(), int2, SortId::INT),
            IntMinus => ("$minus_int".to_string(), int2, SortId::INT),
            IntUnaryMinus => ("$uminus_int".to_string(), vec![SortId::INT], SortId::INT),
            IntMultiply => ("$times_int".to_string(), int2, SortId::INT),
            IntQuotient => ("$div_int".to_string(), int2, SortId::INT),
            IntModulo => ("$mod_int".to_string(), int2, SortId::INT),
            IntAbs => ("$abs_int".to_string(), vec![SortId::INT], SortId::INT),
            IntToReal => ("$to_real".to_string(), vec![SortId::INT], SortId::REAL),
            RealPlus => ("$plus_real".to_string(), real2, SortId::REAL),
            RealMinus => ("$minus_real".to_string(), real2, SortId::REAL),
            RealUnaryMinus => ("$uminus_real".to_string(), vec![SortId::REAL], SortId::REAL),
            RealMultiply => ("$times_real".to_string(), real2, SortId::REAL),
            RealQuotient => ("$divide_real".to_string(), real2, SortId::REAL),
            RealToInt => ("$to_int".to_string(), vec![SortId::REAL], SortId::INT),
            ArraySelect(array) => {
                let (index, value) = self.array_parts(*array);
                (
                    format!("$select{}", self.sort_name(*array)),
                    vec![*array, index],
                    value,
                )
            }
            ArrayStore(array) => {
                let (index, value) = self.array_parts(*array);
                (
                    format!("$store{}", self.sort_name(*array)),
                    vec![*array, index, value],
                    *array,
                )
            }
            IntLess | IntLessEqual | IntGreater | IntGreaterEqual | RealLess | RealLessEqual
            | RealGreater | RealGreaterEqual | RealIsInt | IntDivides | ArrayBoolSelect(_) => {
                unreachable!("predicate interpretation used as a function")
            }
        }
    }

    fn predicate_interpretation_signature(&self, intp: &Interpretation) -> (String, Vec<SortId>) {
        use Interpretation::*;
        let (int2, real2) = (vec![SortId::INT; 2], vec![SortId::REAL; 2]);
        match intp {
            IntLess => ("$less_int".to_string(), int2),
            IntLessEqual => ("$lesseq_int".to_string(), int2),
            IntGreater => ("$greater_int".to_string(), int2),
            IntGreaterEqual => ("$greatereq_int".to_string(), int2),
            RealLess => ("$less_real".to_string(), real2),
            RealLessEqual => ("$lesseq_real".to_string(), real2),
            RealGreater => ("$greater_real".to_string(), real2),
            RealGreaterEqual => ("$greatereq_real".to_string(), real2),
            RealIsInt => ("$is_int".to_string(), vec![SortId::REAL]),
            IntDivides => ("$divides_int".to_string(), int2),
            ArrayBoolSelect(array) => {
                let (index, _) = self.array_parts(*array);
                (format!("$select{}", self.sort_name(*array)), vec![*array, index])
            }
            _ => unreachable!("function interpretation used as a predicate"),
        }
    }

    fn array_parts(&self, array: SortId) -> (SortId, SortId) {
        match self.sort_table.data(array) {
            SortData::Array { index, value } => (*index, *value),
            _ => unreachable!("array interpretation keyed by non-array sort"),
        }
    }

    // ------------------------------------------------------------------
    // datatypes

    /// Register a declared datatype.
    pub fn add_term_algebra(&mut self, algebra: TermAlgebra) {
        self.algebra_sorts.insert(algebra.sort, self.term_algebras.len());
        self.term_algebras.push(algebra);
    }

    /// All registered datatypes, in declaration order.
    pub fn term_algebras(&self) -> &[TermAlgebra] {
        &self.term_algebras
    }

    /// The registered datatype for a sort, if there is one.
    pub fn term_algebra(&self, sort: SortId) -> Option<&TermAlgebra> {
        self.algebra_sorts.get(&sort).map(|&i| &self.term_algebras[i])
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sorts_preinterned() {
        let env = Environment::new();
        assert_eq!(env.sort_name(SortId::BOOL), "Bool");
        assert_eq!(env.sort_name(SortId::INT), "Int");
        assert_eq!(env.sort_name(SortId::REAL), "Real");
    }

    #[test]
    fn test_array_sorts_intern_structurally() {
        let mut env = Environment::new();
        let a1 = env.array_sort(SortId::INT, SortId::REAL);
        let a2 = env.array_sort(SortId::INT, SortId::REAL);
        let a3 = env.array_sort(SortId::INT, SortId::BOOL);
        assert_eq!(a1, a2);
        assert_ne!(a1, a3);
        assert_eq!(env.sort_name(a1), "(Array Int Real)");
    }

    #[test]
    fn test_redeclaration_is_checked_across_namespaces() {
        let mut env = Environment::new();
        env.declare_sort("S", 0).unwrap();
        assert_eq!(
            env.declare_sort("S", 1),
            Err(Error::RedeclaredSymbol("S".to_string()))
        );
        // sorts and functions share one namespace
        assert_eq!(
            env.declare_symbol("S", vec![], SortId::INT),
            Err(Error::RedeclaredSymbol("S".to_string()))
        );
        assert_eq!(
            env.declare_sort("Bool", 0),
            Err(Error::RedeclaredSymbol("Bool".to_string()))
        );
        assert_eq!(
            env.declare_symbol("and", vec![], SortId::INT),
            Err(Error::RedeclaredSymbol("and".to_string()))
        );
    }

    #[test]
    fn test_bool_range_declares_predicate() {
        let mut env = Environment::new();
        let p = env.declare_symbol("p", vec![SortId::INT], SortId::BOOL).unwrap();
        assert!(matches!(p, Symbol::Predicate(_)));
        let f = env.declare_symbol("f", vec![SortId::INT], SortId::INT).unwrap();
        assert!(matches!(f, Symbol::Function(_)));
        assert_eq!(env.symbol("p"), Some(p));
        assert_eq!(env.symbol("q"), None);
    }

    #[test]
    fn test_interpreted_symbols_intern_once() {
        let mut env = Environment::new();
        let f1 = env.interpreted_function(Interpretation::IntPlus);
        let f2 = env.interpreted_function(Interpretation::IntPlus);
        let g = env.interpreted_function(Interpretation::RealPlus);
        assert_eq!(f1, f2);
        assert_ne!(f1, g);
        assert_eq!(env.function(f1).args, vec![SortId::INT, SortId::INT]);
        assert_eq!(env.function(g).range, SortId::REAL);
        let five = env.int_numeral("5");
        assert_eq!(five, env.int_numeral("5"));
        assert_eq!(env.function(five).name, "5");
        assert_eq!(env.function(five).range, SortId::INT);
        // wider than any machine integer
        let big = env.int_numeral("123456789123456789123456789123456789");
        assert_eq!(
            env.function(big).name,
            "123456789123456789123456789123456789"
        );
    }

    #[test]
    fn test_fresh_symbols_are_invisible() {
        let mut env = Environment::new();
        let f = env.fresh_function("sLF", vec![], SortId::INT);
        assert_eq!(env.function(f).name, "sLF0");
        assert!(env.symbol("sLF0").is_none());
        let p = env.fresh_predicate("sLP", vec![]);
        assert_eq!(env.predicate(p).name, "sLP1");
    }
}
