//! Native operations
//!
//! The primitives bound in the global environment at startup. Every native
//! receives its arguments already evaluated, as a slice, and checks its own
//! arity.

use crate::error::{Error, Result};
use crate::language::{Cell, NativeId, SymbolId, Value};
use crate::runtime::Runtime;
use crate::symbols::sym;

/// Signature of a native operation.
pub type NativeFn = fn(&mut Runtime, &[Value]) -> Result<Value>;

/// A registered native: the symbol it was bound under and its code.
#[derive(Clone, Copy)]
pub struct Native {
    pub name: SymbolId,
    pub func: NativeFn,
}

const STDLIB: &[(SymbolId, NativeFn)] = &[
    (sym::EVAL, eval),
    (sym::APPLY, apply),
    (sym::CONS, cons),
    (sym::CAR, car),
    (sym::CDR, cdr),
    (sym::EQ, eq),
    (sym::ATOM, atom),
    (sym::NULL, null),
    (sym::NOT, not),
    (sym::PLUS, add),
    (sym::MINUS, sub),
    (sym::TIMES, mul),
    (sym::DIVIDE, div),
    (sym::LESS, less),
    (sym::GREATER, greater),
];

/// Bind every built-in native in the global environment.
pub fn register_stdlib(rt: &mut Runtime) -> Result<()> {
    for &(name, func) in STDLIB {
        rt.bind_native(name, func)?;
    }
    Ok(())
}

// ============================================================================
// Registry
// ============================================================================

impl Runtime {
    /// Bind a Rust function globally under `name`.
    pub fn register_native(&mut self, name: &str, func: NativeFn) -> Result<SymbolId> {
        let id = self.intern(name)?;
        self.bind_native(id, func)?;
        Ok(id)
    }

    fn bind_native(&mut self, name: SymbolId, func: NativeFn) -> Result<()> {
        let index = NativeId(self.natives.len() as u32);
        self.natives.push(Native { name, func });

        let cell = self.alloc(Cell::Native(index))?;
        let symbol = self.canonical_symbol(name)?;
        self.define_global(symbol, cell)
    }

    pub(crate) fn native(&self, id: NativeId) -> Result<Native> {
        self.natives
            .get(id.0 as usize)
            .copied()
            .ok_or_else(|| Error::not_callable(format!("native #{}", id.0)))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn expect(name: &str, args: &[Value], count: usize) -> Result<()> {
    if args.len() != count {
        return Err(Error::arity(name, &count.to_string(), args.len()));
    }
    Ok(())
}

fn numbers(rt: &Runtime, name: &str, args: &[Value]) -> Result<Vec<f64>> {
    args.iter()
        .map(|&arg| {
            rt.number_value(arg)?.ok_or_else(|| {
                Error::type_error(format!("{name}: expected a number, got {}", rt.display(arg)))
            })
        })
        .collect()
}

// ============================================================================
// List operations
// ============================================================================

fn cons(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    expect("CONS", args, 2)?;
    rt.cons(args[0], args[1])
}

fn car(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    expect("CAR", args, 1)?;
    rt.car(args[0])
}

fn cdr(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    expect("CDR", args, 1)?;
    rt.cdr(args[0])
}

// ============================================================================
// Predicates
// ============================================================================

fn eq(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    expect("EQ", args, 2)?;
    let same = rt.eq(args[0], args[1])?;
    Ok(rt.boolean(same))
}

fn atom(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    expect("ATOM", args, 1)?;
    let is_atom = rt.is_atom(args[0])?;
    Ok(rt.boolean(is_atom))
}

fn null(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    expect("NULL", args, 1)?;
    Ok(rt.boolean(args[0].is_nil()))
}

fn not(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    expect("NOT", args, 1)?;
    let truthy = rt.is_truthy(args[0])?;
    Ok(rt.boolean(!truthy))
}

// ============================================================================
// Arithmetic
// ============================================================================

fn add(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    let sum = numbers(rt, "+", args)?.into_iter().sum();
    rt.number(sum)
}

fn mul(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    let product = numbers(rt, "*", args)?.into_iter().product();
    rt.number(product)
}

fn sub(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    let nums = numbers(rt, "-", args)?;
    let result = match nums.as_slice() {
        [] => return Err(Error::arity("-", "at least 1", 0)),
        [x] => -x,
        [first, rest @ ..] => rest.iter().fold(*first, |acc, n| acc - n),
    };
    rt.number(result)
}

fn div(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    let nums = numbers(rt, "/", args)?;
    if nums.contains(&0.0) {
        return Err(Error::divide_by_zero());
    }
    let result = match nums.as_slice() {
        [] => 1.0,
        [x] => 1.0 / x,
        [first, rest @ ..] => rest.iter().fold(*first, |acc, n| acc / n),
    };
    rt.number(result)
}

fn compare(
    rt: &mut Runtime,
    name: &str,
    args: &[Value],
    op: fn(f64, f64) -> bool,
) -> Result<Value> {
    expect(name, args, 2)?;
    let nums = numbers(rt, name, args)?;
    Ok(rt.boolean(op(nums[0], nums[1])))
}

fn less(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    compare(rt, "<", args, |a, b| a < b)
}

fn greater(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    compare(rt, ">", args, |a, b| a > b)
}

// ============================================================================
// Evaluation
// ============================================================================

/// `(EVAL expr)` evaluates a datum at top level.
fn eval(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    expect("EVAL", args, 1)?;
    rt.eval_global(args[0])
}

/// `(APPLY f args)`
fn apply(rt: &mut Runtime, args: &[Value]) -> Result<Value> {
    expect("APPLY", args, 2)?;
    rt.apply(args[0], args[1])
}
