//! Symbol table
//!
//! Symbols are interned to small integer ids. The table proper is a heap
//! list of `(Symbol . Name)` pairs, which makes it one of the collector's
//! two permanent roots; the name strings themselves live in a per-runtime
//! string interner and `Name` cells hold its keys. An `FxHashMap` indexes
//! names to ids so interning does not walk the list.
//!
//! The reader uppercases symbol tokens before they get here. Interning
//! folds ASCII case as well, so embedders calling `intern("car")` get the
//! same id the reader would.

use rustc_hash::FxHashMap;
use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

use crate::error::{Error, Result};
use crate::heap::Heap;
use crate::language::{Cell, SymbolId, Value};
use crate::runtime::Runtime;

/// Well-known symbol ids, interned at startup in this order.
pub mod sym {
    use crate::language::SymbolId;

    pub const COND: SymbolId = SymbolId(0);
    pub const DEFINE: SymbolId = SymbolId(1);
    pub const LABEL: SymbolId = SymbolId(2);
    pub const LAMBDA: SymbolId = SymbolId(3);
    pub const QUOTE: SymbolId = SymbolId(4);
    pub const EVAL: SymbolId = SymbolId(5);
    pub const APPLY: SymbolId = SymbolId(6);
    pub const CONS: SymbolId = SymbolId(7);
    pub const CAR: SymbolId = SymbolId(8);
    pub const CDR: SymbolId = SymbolId(9);
    pub const EQ: SymbolId = SymbolId(10);
    pub const ATOM: SymbolId = SymbolId(11);
    pub const NULL: SymbolId = SymbolId(12);
    pub const NOT: SymbolId = SymbolId(13);
    pub const PLUS: SymbolId = SymbolId(14);
    pub const MINUS: SymbolId = SymbolId(15);
    pub const TIMES: SymbolId = SymbolId(16);
    pub const DIVIDE: SymbolId = SymbolId(17);
    pub const LESS: SymbolId = SymbolId(18);
    pub const GREATER: SymbolId = SymbolId(19);
    pub const F: SymbolId = SymbolId(20);
    pub const T: SymbolId = SymbolId(21);
}

/// Must match the ids in [`sym`].
pub(crate) const INITIAL_SYMBOLS: &[&str] = &[
    // Special forms
    "COND", "DEFINE", "LABEL", "LAMBDA", "QUOTE",
    // Natives
    "EVAL", "APPLY", "CONS", "CAR", "CDR", "EQ", "ATOM", "NULL", "NOT", "+", "-", "*", "/", "<",
    ">",
    // Booleans
    "F", "T",
];

pub struct SymbolTable {
    names: StringInterner<DefaultBackend>,
    ids: FxHashMap<DefaultSymbol, SymbolId>,
    entries: Value,
    limit: usize,
}

impl SymbolTable {
    pub fn new(limit: usize) -> Self {
        SymbolTable {
            names: StringInterner::default(),
            ids: FxHashMap::default(),
            entries: Value::Nil,
            limit,
        }
    }

    /// Number of interned symbols.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Id of an already interned name.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        let key = self.names.get(name.to_ascii_uppercase())?;
        self.ids.get(&key).copied()
    }

    /// The `(Symbol . Name)` list. A collector root.
    pub fn entries(&self) -> Value {
        self.entries
    }

    /// Pick the id the next new name will get, storing the name text.
    fn prepare(&mut self, name: &str) -> Result<(SymbolId, DefaultSymbol)> {
        if self.ids.len() >= self.limit {
            return Err(Error::symbol_space_exhausted(self.limit, name));
        }
        let key = self.names.get_or_intern(name);
        Ok((SymbolId(self.ids.len() as u32), key))
    }

    fn commit(&mut self, id: SymbolId, key: DefaultSymbol, entries: Value) {
        self.ids.insert(key, id);
        self.entries = entries;
    }

    /// Find the table entry for `id`: the canonical symbol cell and its name key.
    fn entry(&self, heap: &Heap, id: SymbolId) -> Result<(Value, DefaultSymbol)> {
        let mut current = self.entries;
        while let Value::Cell(r) = current {
            let Cell::Pair { first, rest } = heap.get(r)? else {
                break;
            };
            if let Some((ident, found, key)) = decode_entry(heap, first)?
                && found == id
            {
                return Ok((ident, key));
            }
            current = rest;
        }
        Err(Error::unknown_symbol(id.0))
    }

    /// Name of an interned symbol.
    pub fn name_of<'a>(&'a self, heap: &Heap, id: SymbolId) -> Result<&'a str> {
        let (_, key) = self.entry(heap, id)?;
        self.names
            .resolve(key)
            .ok_or_else(|| Error::unknown_symbol(id.0))
    }
}

/// Split a `(Symbol . Name)` entry.
fn decode_entry(heap: &Heap, entry: Value) -> Result<Option<(Value, SymbolId, DefaultSymbol)>> {
    let Value::Cell(e) = entry else {
        return Ok(None);
    };
    let Cell::Pair { first: ident, rest: word } = heap.get(e)? else {
        return Ok(None);
    };
    let (Value::Cell(i), Value::Cell(w)) = (ident, word) else {
        return Ok(None);
    };
    match (heap.get(i)?, heap.get(w)?) {
        (Cell::Symbol(id), Cell::Name(key)) => Ok(Some((ident, id, key))),
        _ => Ok(None),
    }
}

// ============================================================================
// Runtime entry points
// ============================================================================

impl Runtime {
    /// Intern `name`, returning its id. Interning a known name never grows
    /// the table.
    pub fn intern(&mut self, name: &str) -> Result<SymbolId> {
        let name = name.to_ascii_uppercase();
        if let Some(id) = self.symbols.lookup(&name) {
            return Ok(id);
        }

        let (id, key) = self.symbols.prepare(&name)?;
        let base = self.roots.len();
        let entries = self.link_symbol(id, key);
        self.roots.truncate(base);

        self.symbols.commit(id, key, entries?);
        Ok(id)
    }

    fn link_symbol(&mut self, id: SymbolId, key: DefaultSymbol) -> Result<Value> {
        let ident = self.alloc(Cell::Symbol(id))?;
        self.roots.push(ident);
        let word = self.alloc(Cell::Name(key))?;
        let entry = self.cons(ident, word)?;
        let entries = self.symbols.entries();
        self.cons(entry, entries)
    }

    /// Name of an interned symbol.
    pub fn name_of(&self, id: SymbolId) -> Result<&str> {
        self.symbols.name_of(&self.heap, id)
    }

    /// The symbol cell owned by the table for `id`.
    pub(crate) fn canonical_symbol(&self, id: SymbolId) -> Result<Value> {
        self.symbols.entry(&self.heap, id).map(|(ident, _)| ident)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }
}
