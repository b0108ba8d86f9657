//! Runtime context
//!
//! A `Runtime` owns one heap, its symbol table and its global environment.
//! Every reader and evaluator entry point takes it by `&mut`, so independent
//! runtimes can coexist but a single one is never shared between threads.
//!
//! Besides the two permanent roots (global environment and symbol table),
//! the runtime keeps a stack of transient roots: values that are in flight
//! while one read or eval is running. Whoever pushes onto it truncates it
//! back before returning, on success and on error alike, so the stack is
//! empty between top-level forms.

use std::str::Chars;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gc;
use crate::heap::Heap;
use crate::language::{Cell, SymbolId, Value};
use crate::parser::Reader;
use crate::stdlib::{self, Native};
use crate::symbols::{INITIAL_SYMBOLS, SymbolTable, sym};

pub struct Runtime {
    pub(crate) heap: Heap,
    pub(crate) symbols: SymbolTable,
    pub(crate) global: Value,
    pub(crate) roots: Vec<Value>,
    pub(crate) natives: Vec<Native>,
    truth: Value,
    config: Config,
}

impl Runtime {
    /// Build a runtime: intern the initial symbols, bind the natives and the
    /// boolean literals in the global environment.
    pub fn new(config: Config) -> Result<Self> {
        let mut rt = Runtime {
            heap: Heap::new(config.heap_cells),
            symbols: SymbolTable::new(config.max_symbols),
            global: Value::Nil,
            roots: Vec::new(),
            natives: Vec::new(),
            truth: Value::Nil,
            config,
        };

        for name in INITIAL_SYMBOLS {
            rt.intern(name)?;
        }
        rt.truth = rt.canonical_symbol(sym::T)?;

        stdlib::register_stdlib(&mut rt)?;

        let f = rt.canonical_symbol(sym::F)?;
        rt.define_global(f, f)?;
        rt.define_global(rt.truth, rt.truth)?;

        Ok(rt)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// The global environment list.
    pub fn global(&self) -> Value {
        self.global
    }

    /// A reader over `text` honoring this runtime's token length bound.
    pub fn reader<'a>(&self, text: &'a str) -> Reader<Chars<'a>> {
        Reader::with_max_token_length(text.chars(), self.config.max_token_length)
    }

    // ========================================================================
    // Allocation and collection
    // ========================================================================

    /// Allocate a cell, collecting once if the free list is empty.
    ///
    /// The payload of `cell` is rooted during that collection, so callers
    /// may pass freshly made values straight in.
    pub(crate) fn alloc(&mut self, cell: Cell) -> Result<Value> {
        if self.heap.is_exhausted() {
            let base = self.roots.len();
            self.roots.extend(cell.children());
            self.collect();
            self.roots.truncate(base);
        }
        self.heap.allocate(cell)
    }

    /// Run a full mark-and-sweep cycle now. Returns the cells reclaimed.
    pub fn collect(&mut self) -> usize {
        let permanent = [self.global, self.symbols.entries()];
        gc::collect(
            &mut self.heap,
            permanent.into_iter().chain(self.roots.iter().copied()),
        )
    }

    /// Number of transient roots currently pinned. Zero between top-level forms.
    pub fn pinned(&self) -> usize {
        self.roots.len()
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn cons(&mut self, first: Value, rest: Value) -> Result<Value> {
        self.alloc(Cell::Pair { first, rest })
    }

    /// A number cell. Only finite numbers exist, so every number prints in
    /// a form the reader accepts.
    pub fn number(&mut self, n: f64) -> Result<Value> {
        if !n.is_finite() {
            return Err(Error::out_of_range(n));
        }
        self.alloc(Cell::Number(n))
    }

    /// A fresh symbol cell for `id`.
    pub fn symbol(&mut self, id: SymbolId) -> Result<Value> {
        self.alloc(Cell::Symbol(id))
    }

    /// Build a proper list from `items`.
    pub fn list(&mut self, items: &[Value]) -> Result<Value> {
        let base = self.roots.len();
        self.roots.extend_from_slice(items);
        let mut result = Ok(Value::Nil);
        for &item in items.iter().rev() {
            result = result.and_then(|rest| self.cons(item, rest));
        }
        self.roots.truncate(base);
        result
    }

    /// `T` for true, `Nil` for false.
    pub fn boolean(&self, b: bool) -> Value {
        if b { self.truth } else { Value::Nil }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The cell behind a value, `None` for `Nil`.
    pub fn cell(&self, value: Value) -> Result<Option<Cell>> {
        match value {
            Value::Nil => Ok(None),
            Value::Cell(r) => self.heap.get(r).map(Some),
        }
    }

    pub fn car(&self, value: Value) -> Result<Value> {
        match self.cell(value)? {
            Some(Cell::Pair { first, .. }) => Ok(first),
            Some(other) => Err(Error::type_error(format!("CAR of a {}", other.tag()))),
            None => Err(Error::type_error("CAR of NIL")),
        }
    }

    pub fn cdr(&self, value: Value) -> Result<Value> {
        match self.cell(value)? {
            Some(Cell::Pair { rest, .. }) => Ok(rest),
            Some(other) => Err(Error::type_error(format!("CDR of a {}", other.tag()))),
            None => Err(Error::type_error("CDR of NIL")),
        }
    }

    /// Replace the tail of a pair. Used to grow lists front to back.
    pub(crate) fn set_rest(&mut self, pair: Value, rest: Value) -> Result<()> {
        match (pair, self.cell(pair)?) {
            (Value::Cell(r), Some(Cell::Pair { first, .. })) => {
                self.heap.set(r, Cell::Pair { first, rest })
            }
            _ => Err(Error::type_error("cannot set the tail of a non-pair")),
        }
    }

    pub fn symbol_id(&self, value: Value) -> Result<Option<SymbolId>> {
        match self.cell(value)? {
            Some(Cell::Symbol(id)) => Ok(Some(id)),
            _ => Ok(None),
        }
    }

    pub fn number_value(&self, value: Value) -> Result<Option<f64>> {
        match self.cell(value)? {
            Some(Cell::Number(n)) => Ok(Some(n)),
            _ => Ok(None),
        }
    }

    /// Only the symbol `T` is true.
    pub fn is_truthy(&self, value: Value) -> Result<bool> {
        Ok(matches!(self.cell(value)?, Some(Cell::Symbol(sym::T))))
    }

    /// `Nil` and every non-pair.
    pub fn is_atom(&self, value: Value) -> Result<bool> {
        Ok(!matches!(self.cell(value)?, Some(Cell::Pair { .. })))
    }

    /// Shallow equality: numbers and symbols by value, lambdas by identity.
    /// Anything else, pairs and `Nil` included, is never `eq`.
    pub fn eq(&self, a: Value, b: Value) -> Result<bool> {
        Ok(match (self.cell(a)?, self.cell(b)?) {
            (Some(Cell::Number(x)), Some(Cell::Number(y))) => x == y,
            (Some(Cell::Symbol(x)), Some(Cell::Symbol(y))) => x == y,
            (Some(Cell::Lambda { .. }), Some(Cell::Lambda { .. })) => a == b,
            _ => false,
        })
    }

    /// Elements of a proper list.
    pub fn list_to_vec(&self, list: Value) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut current = list;
        while !current.is_nil() {
            match self.cell(current)? {
                Some(Cell::Pair { first, rest }) => {
                    items.push(first);
                    current = rest;
                }
                _ => return Err(Error::type_error("expected a proper list")),
            }
        }
        Ok(items)
    }

    /// Length of a proper list.
    pub fn list_length(&self, list: Value) -> Result<usize> {
        let mut count = 0;
        let mut current = list;
        while !current.is_nil() {
            current = self.cdr(current)?;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn runtime() -> Runtime {
        Runtime::new(Config::default()).unwrap()
    }

    #[test]
    fn test_cons_car_cdr() {
        let mut rt = runtime();
        let a = rt.number(1.0).unwrap();
        let b = rt.number(2.0).unwrap();
        let pair = rt.cons(a, b).unwrap();
        assert_eq!(rt.car(pair).unwrap(), a);
        assert_eq!(rt.cdr(pair).unwrap(), b);
    }

    #[test]
    fn test_car_of_nil_is_type_error() {
        let rt = runtime();
        assert_eq!(rt.car(Value::Nil).unwrap_err().kind, ErrorKind::Type);
        assert_eq!(rt.cdr(Value::Nil).unwrap_err().kind, ErrorKind::Type);
    }

    #[test]
    fn test_car_of_atom_is_type_error() {
        let mut rt = runtime();
        let n = rt.number(3.0).unwrap();
        let err = rt.car(n).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
        assert!(err.message.contains("number"));
    }

    #[test]
    fn test_list_round_trip() {
        let mut rt = runtime();
        let items: Vec<Value> = (0..4).map(|i| rt.number(i as f64).unwrap()).collect();
        let list = rt.list(&items).unwrap();
        assert_eq!(rt.list_to_vec(list).unwrap(), items);
        assert_eq!(rt.list_length(list).unwrap(), 4);
    }

    #[test]
    fn test_list_survives_collection_mid_build() {
        let mut rt = Runtime::new(Config::default().with_heap_cells(512)).unwrap();
        // Fill the heap with garbage until only one cell is left after the items
        while rt.heap().free_count() > 4 {
            rt.number(0.0).unwrap();
        }
        let items: Vec<Value> = (1..=3).map(|i| rt.number(i as f64).unwrap()).collect();
        let list = rt.list(&items).unwrap();

        let values: Vec<f64> = rt
            .list_to_vec(list)
            .unwrap()
            .into_iter()
            .map(|v| rt.number_value(v).unwrap().unwrap())
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert!(rt.heap().free_count() > 4);
    }

    #[test]
    fn test_eq_semantics() {
        let mut rt = runtime();
        let one = rt.number(1.0).unwrap();
        let also_one = rt.number(1.0).unwrap();
        assert!(rt.eq(one, also_one).unwrap());

        let x = rt.symbol(sym::T).unwrap();
        let y = rt.symbol(sym::T).unwrap();
        assert!(rt.eq(x, y).unwrap());
        assert!(!rt.eq(one, x).unwrap());

        let p = rt.cons(one, Value::Nil).unwrap();
        assert!(!rt.eq(p, p).unwrap());
        assert!(!rt.eq(Value::Nil, Value::Nil).unwrap());
    }

    #[test]
    fn test_truthiness() {
        let mut rt = runtime();
        let t = rt.symbol(sym::T).unwrap();
        let f = rt.symbol(sym::F).unwrap();
        let zero = rt.number(0.0).unwrap();
        assert!(rt.is_truthy(t).unwrap());
        assert!(!rt.is_truthy(f).unwrap());
        assert!(!rt.is_truthy(zero).unwrap());
        assert!(!rt.is_truthy(Value::Nil).unwrap());
        assert!(rt.is_truthy(rt.boolean(true)).unwrap());
        assert!(rt.boolean(false).is_nil());
    }

    #[test]
    fn test_truthiness_of_reclaimed_cell_is_an_error() {
        let mut rt = runtime();
        let t = rt.symbol(sym::T).unwrap();
        rt.collect();
        let err = rt.is_truthy(t).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DanglingReference);
    }

    #[test]
    fn test_only_finite_numbers() {
        let mut rt = runtime();
        for n in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert_eq!(rt.number(n).unwrap_err().kind, ErrorKind::Range);
        }
        assert_eq!(rt.pinned(), 0);
    }

    #[test]
    fn test_config_is_kept() {
        let rt = Runtime::new(Config::default().with_max_token_length(12)).unwrap();
        assert_eq!(rt.config().max_token_length, 12);
    }

    #[test]
    fn test_roots_empty_after_startup() {
        let rt = runtime();
        assert_eq!(rt.pinned(), 0);
    }

    #[test]
    fn test_startup_fails_on_tiny_heap() {
        let err = Runtime::new(Config::default().with_heap_cells(8)).err().unwrap();
        assert_eq!(err.kind, ErrorKind::HeapExhausted);
    }
}
