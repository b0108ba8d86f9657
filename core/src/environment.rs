//! Environments
//!
//! An environment is a heap list of `(Symbol . Value)` bindings, newest
//! first. The global environment is the list held by the runtime. A lexical
//! environment is a chain of argument bindings ending in the environment the
//! lambda captured; `Nil` stands for the top level, and every lookup that
//! runs off the end of the lexical frames continues into the global list.
//! That fallback is what lets a function named with `LABEL` call itself.

use log::warn;

use crate::error::{Error, Result};
use crate::language::{Cell, SymbolId, Value};
use crate::runtime::Runtime;

impl Runtime {
    /// Value bound to `id`, searching `env` first and then the globals.
    pub fn lookup(&self, id: SymbolId, env: Value) -> Result<Value> {
        if let Some(value) = self.find_binding(id, env)? {
            return Ok(value);
        }
        if let Some(value) = self.find_binding(id, self.global)? {
            return Ok(value);
        }
        let name = self.name_of(id).unwrap_or("?");
        Err(Error::unbound(name))
    }

    /// Newest binding for `id` in a single binding list.
    fn find_binding(&self, id: SymbolId, env: Value) -> Result<Option<Value>> {
        let mut current = env;
        while !current.is_nil() {
            let binding = self.car(current)?;
            if let Some(Cell::Pair { first, rest }) = self.cell(binding)?
                && self.symbol_id(first)? == Some(id)
            {
                return Ok(Some(rest));
            }
            current = self.cdr(current)?;
        }
        Ok(None)
    }

    /// Push `(name . value)` onto `env`.
    pub(crate) fn bind(&mut self, env: Value, name: Value, value: Value) -> Result<Value> {
        let base = self.roots.len();
        self.roots.push(env);
        let result = self
            .cons(name, value)
            .and_then(|binding| self.cons(binding, env));
        self.roots.truncate(base);
        result
    }

    /// Add a global binding. Later bindings shadow earlier ones.
    pub(crate) fn define_global(&mut self, name: Value, value: Value) -> Result<()> {
        self.global = self.bind(self.global, name, value)?;
        Ok(())
    }

    /// Bind `name` globally, interning it first.
    pub fn define(&mut self, name: &str, value: Value) -> Result<()> {
        let base = self.roots.len();
        self.roots.push(value);
        let result = self.intern(name).and_then(|id| {
            let symbol = self.symbol(id)?;
            self.define_global(symbol, value)
        });
        self.roots.truncate(base);
        result
    }

    /// Extend `captured` with one binding per formal.
    ///
    /// Fewer actuals than formals is an error; surplus actuals are ignored
    /// with a warning.
    pub(crate) fn bind_arguments(
        &mut self,
        formals: Value,
        args: Value,
        captured: Value,
    ) -> Result<Value> {
        let base = self.roots.len();
        self.roots.push(captured);
        let result = self.bind_each(formals, args, captured, base);
        self.roots.truncate(base);
        result
    }

    fn bind_each(
        &mut self,
        formals: Value,
        args: Value,
        captured: Value,
        slot: usize,
    ) -> Result<Value> {
        let mut env = captured;
        let mut names = formals;
        let mut values = args;
        let mut bound = 0;

        while !names.is_nil() {
            if values.is_nil() {
                let expected = self.list_length(formals)?;
                return Err(Error::too_few_arguments(expected, bound));
            }
            let name = self.car(names)?;
            let value = self.car(values)?;
            env = self.bind(env, name, value)?;
            self.roots[slot] = env;

            names = self.cdr(names)?;
            values = self.cdr(values)?;
            bound += 1;
        }

        if !values.is_nil() {
            let extra = self.list_length(values)?;
            warn!("{extra} surplus argument(s) ignored, function takes {bound}");
        }
        Ok(env)
    }
}
