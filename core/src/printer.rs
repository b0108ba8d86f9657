//! Textual rendering of values
//!
//! Output reads back as the same structure for everything but lambdas and
//! natives, which print as opaque `#<...>` forms.

use std::fmt;

use crate::language::{Cell, Value};
use crate::runtime::Runtime;

/// A value paired with the runtime that owns it, ready to format.
pub struct Printed<'a> {
    rt: &'a Runtime,
    value: Value,
}

impl Runtime {
    pub fn display(&self, value: Value) -> Printed<'_> {
        Printed { rt: self, value }
    }
}

impl fmt::Display for Printed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(self.rt, self.value, f)
    }
}

fn write_value(rt: &Runtime, value: Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let cell = match rt.cell(value) {
        Ok(Some(cell)) => cell,
        Ok(None) => return write!(f, "NIL"),
        Err(_) => return write!(f, "#<DANGLING>"),
    };

    match cell {
        Cell::Number(n) => write!(f, "{n}"),
        Cell::Symbol(id) => match rt.name_of(id) {
            Ok(name) => write!(f, "{name}"),
            Err(_) => write!(f, "#<SYMBOL {}>", id.0),
        },
        Cell::Pair { first, rest } => write_list(rt, first, rest, f),
        Cell::Lambda { rest, .. } => {
            write!(f, "#<LAMBDA ")?;
            let formals = rt.car(rest).unwrap_or(Value::Nil);
            write_value(rt, formals, f)?;
            write!(f, ">")
        }
        Cell::Native(id) => match rt.native(id).and_then(|n| rt.name_of(n.name)) {
            Ok(name) => write!(f, "#<NATIVE {name}>"),
            Err(_) => write!(f, "#<NATIVE>"),
        },
        Cell::Name(_) => write!(f, "#<NAME>"),
        Cell::Free { .. } => write!(f, "#<FREE>"),
    }
}

fn write_list(
    rt: &Runtime,
    first: Value,
    rest: Value,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    write!(f, "(")?;
    write_value(rt, first, f)?;

    let mut current = rest;
    loop {
        match rt.cell(current) {
            Ok(None) => break,
            Ok(Some(Cell::Pair { first, rest })) => {
                write!(f, " ")?;
                write_value(rt, first, f)?;
                current = rest;
            }
            // Improper tail
            _ => {
                write!(f, " . ")?;
                write_value(rt, current, f)?;
                break;
            }
        }
    }

    write!(f, ")")
}
