//! Lersp: a small Lisp over a fixed-capacity, garbage-collected cell heap.
//!
//! A [`Runtime`] owns the heap, the symbol table and the global environment.
//! Text is read into heap data with a [`Reader`], evaluated with
//! [`Runtime::eval`], and printed with [`Runtime::display`]:
//!
//! ```
//! use lersp::{Config, Runtime};
//!
//! let mut rt = Runtime::new(Config::default()).unwrap();
//! let value = rt.eval_str("((lambda (x) (* x x)) 7)").unwrap();
//! assert_eq!(rt.display(value).to_string(), "49");
//! ```

pub mod config;
pub mod environment;
pub mod error;
pub mod gc;
pub mod heap;
pub mod interpreter;
pub mod language;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod runtime;
pub mod stdlib;
pub mod symbols;

// Re-export commonly used items for convenience
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use heap::Heap;
pub use language::{Cell, CellRef, NativeId, SymbolId, Value};
pub use lexer::{Lexer, Token};
pub use parser::{Reader, parse};
pub use printer::Printed;
pub use runtime::Runtime;
pub use stdlib::{Native, NativeFn};
pub use symbols::{SymbolTable, sym};
