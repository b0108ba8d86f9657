//! Reader and evaluator error types.

use std::fmt;

/// Categories of failure raised while reading or evaluating a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unbalanced or malformed input
    Syntax,
    /// Input ended inside an open list
    UnexpectedEnd,
    /// Symbol with no binding in scope
    UnboundSymbol,
    /// Application of something that is not a function
    NotCallable,
    /// Operation applied to a value of the wrong tag
    Type,
    /// Lambda called with fewer arguments than formals
    TooFewArguments,
    /// Native operation called with the wrong number of arguments
    ArityMismatch,
    /// Division by a zero argument
    DivideByZero,
    /// Arithmetic result that is infinite or not a number
    Range,
    /// No symbol ids left
    SymbolSpaceExhausted,
    /// No heap cells left, even after collection
    HeapExhausted,
    /// Symbol id without a table entry
    UnknownSymbol,
    /// Handle to a cell that has since been reclaimed
    DanglingReference,
}

impl ErrorKind {
    /// Fatal kinds cannot be recovered from at the top level: the heap and
    /// the symbol space never shrink, so the next form would fail the same way.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            ErrorKind::HeapExhausted | ErrorKind::SymbolSpaceExhausted
        )
    }
}

/// A failure with a human-readable message.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn syntax(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, what)
    }

    pub fn unexpected_end() -> Self {
        Self::new(ErrorKind::UnexpectedEnd, "unexpected end of input")
    }

    pub fn unbound(name: impl fmt::Display) -> Self {
        Self::new(ErrorKind::UnboundSymbol, format!("unbound symbol: {name}"))
    }

    pub fn not_callable(what: impl fmt::Display) -> Self {
        Self::new(ErrorKind::NotCallable, format!("not callable: {what}"))
    }

    pub fn type_error(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, what)
    }

    pub fn too_few_arguments(expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::TooFewArguments,
            format!("too few arguments: expected {expected}, got {got}"),
        )
    }

    pub fn arity(name: &str, expected: &str, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("{name}: expected {expected} argument(s), got {got}"),
        )
    }

    pub fn divide_by_zero() -> Self {
        Self::new(ErrorKind::DivideByZero, "divide by zero")
    }

    pub fn out_of_range(n: f64) -> Self {
        Self::new(ErrorKind::Range, format!("number out of range: {n}"))
    }

    pub fn symbol_space_exhausted(limit: usize, name: &str) -> Self {
        Self::new(
            ErrorKind::SymbolSpaceExhausted,
            format!("symbol space exhausted ({limit} symbols) while interning {name}"),
        )
    }

    pub fn heap_exhausted(capacity: usize) -> Self {
        Self::new(
            ErrorKind::HeapExhausted,
            format!("heap exhausted ({capacity} cells)"),
        )
    }

    pub fn unknown_symbol(id: u32) -> Self {
        Self::new(ErrorKind::UnknownSymbol, format!("no symbol with id {id}"))
    }

    pub fn dangling(index: usize) -> Self {
        Self::new(
            ErrorKind::DanglingReference,
            format!("reference to reclaimed cell {index}"),
        )
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<Error> for String {
    fn from(err: Error) -> String {
        err.to_string()
    }
}
