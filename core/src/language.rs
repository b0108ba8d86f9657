use string_interner::DefaultSymbol;

// ============================================================================
// Handles
// ============================================================================

/// Interned symbol identifier, unique for the lifetime of a runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Index into a runtime's native function registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeId(pub u32);

/// Handle to a heap slot.
///
/// The generation is bumped every time the slot is reclaimed, so a handle
/// kept past a collection that freed its cell no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    index: u32,
    generation: u32,
}

impl CellRef {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        CellRef { index, generation }
    }

    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

// ============================================================================
// Core Type System
// ============================================================================

/// A Lisp value: the empty list, or a handle to a heap cell.
///
/// Values are plain `Copy` handles. The heap owns every cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Value {
    #[default]
    Nil,
    Cell(CellRef),
}

impl Value {
    pub fn is_nil(self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_cell(self) -> Option<CellRef> {
        match self {
            Value::Cell(r) => Some(r),
            Value::Nil => None,
        }
    }
}

/// Contents of one heap slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    /// On the free list; `next` is the following free slot
    Free { next: Option<u32> },
    Number(f64),
    Symbol(SymbolId),
    Pair { first: Value, rest: Value },
    /// `(body . (formals . environment))`
    Lambda { first: Value, rest: Value },
    Native(NativeId),
    /// Symbol table payload; never appears in program data
    Name(DefaultSymbol),
}

impl Cell {
    /// Values this cell keeps alive.
    pub fn children(&self) -> [Value; 2] {
        match *self {
            Cell::Pair { first, rest } | Cell::Lambda { first, rest } => [first, rest],
            _ => [Value::Nil, Value::Nil],
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Cell::Pair { .. })
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Cell::Free { .. })
    }

    /// Name of the cell's tag, for error messages.
    pub fn tag(&self) -> &'static str {
        match self {
            Cell::Free { .. } => "free cell",
            Cell::Number(_) => "number",
            Cell::Symbol(_) => "symbol",
            Cell::Pair { .. } => "pair",
            Cell::Lambda { .. } => "lambda",
            Cell::Native(_) => "native function",
            Cell::Name(_) => "name",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_is_default() {
        assert_eq!(Value::default(), Value::Nil);
        assert!(Value::Nil.is_nil());
        assert_eq!(Value::Nil.as_cell(), None);
    }

    #[test]
    fn test_children() {
        let a = Value::Cell(CellRef::new(1, 0));
        let b = Value::Cell(CellRef::new(2, 0));
        assert_eq!(Cell::Pair { first: a, rest: b }.children(), [a, b]);
        assert_eq!(Cell::Lambda { first: b, rest: a }.children(), [b, a]);
        assert_eq!(Cell::Number(1.0).children(), [Value::Nil, Value::Nil]);
    }
}
