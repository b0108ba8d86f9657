use log::trace;

use crate::error::{Error, Result};
use crate::language::{Cell, Value};
use crate::runtime::Runtime;
use crate::symbols::sym;

// ============================================================================
// Evaluator
// ============================================================================

impl Runtime {
    /// Evaluate `expr` in `env`. `Nil` as the environment means top level.
    pub fn eval(&mut self, expr: Value, env: Value) -> Result<Value> {
        let base = self.roots.len();
        self.roots.push(expr);
        self.roots.push(env);
        let result = self.eval_form(expr, env);
        self.roots.truncate(base);
        result
    }

    /// Evaluate `expr` at top level.
    pub fn eval_global(&mut self, expr: Value) -> Result<Value> {
        self.eval(expr, Value::Nil)
    }

    /// Read and evaluate every form in `source`, returning the last value
    /// (`Nil` when there are none).
    pub fn eval_str(&mut self, source: &str) -> Result<Value> {
        let mut reader = self.reader(source);
        let base = self.roots.len();
        self.roots.push(Value::Nil);

        let mut result = Ok(Value::Nil);
        loop {
            let value = match reader.read_one(self) {
                Ok(Some(form)) => self.eval_global(form),
                Ok(None) => break,
                Err(e) => Err(e),
            };
            match value {
                Ok(value) => {
                    self.roots[base] = value;
                    result = Ok(value);
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        self.roots.truncate(base);
        result
    }

    fn eval_form(&mut self, expr: Value, env: Value) -> Result<Value> {
        let Some(cell) = self.cell(expr)? else {
            return Ok(Value::Nil);
        };

        match cell {
            // Self-evaluating forms
            Cell::Number(_) | Cell::Lambda { .. } | Cell::Native(_) => Ok(expr),

            Cell::Symbol(id) => self.lookup(id, env),

            Cell::Pair { first, rest } => {
                if let Some(id) = self.symbol_id(first)? {
                    match id {
                        sym::QUOTE => return self.car(rest),
                        sym::COND => return self.eval_cond(rest, env),
                        sym::LABEL | sym::DEFINE => return self.eval_label(rest, env),
                        sym::LAMBDA => return self.make_lambda(rest, env),
                        _ => {}
                    }
                }

                // Function application
                let base = self.roots.len();
                let result = self.eval_application(first, rest, env, base);
                self.roots.truncate(base);
                result
            }

            Cell::Name(_) | Cell::Free { .. } => Err(Error::type_error(format!(
                "cannot evaluate a {}",
                cell.tag()
            ))),
        }
    }

    fn eval_application(
        &mut self,
        operator: Value,
        operands: Value,
        env: Value,
        base: usize,
    ) -> Result<Value> {
        let callable = self.eval_form(operator, env)?;
        self.roots.push(callable);
        let args = self.eval_list(operands, env)?;
        self.roots.truncate(base);
        self.apply(callable, args)
    }

    /// Evaluate each element of `exprs` into a fresh list, in order.
    fn eval_list(&mut self, exprs: Value, env: Value) -> Result<Value> {
        let slot = self.roots.len();
        self.roots.push(Value::Nil);
        let result = self.eval_each(exprs, env, slot);
        self.roots.truncate(slot);
        result
    }

    fn eval_each(&mut self, exprs: Value, env: Value, slot: usize) -> Result<Value> {
        let mut head = Value::Nil;
        let mut tail = Value::Nil;
        let mut current = exprs;

        while !current.is_nil() {
            let expr = self.car(current)?;
            let value = self.eval_form(expr, env)?;
            let pair = self.cons(value, Value::Nil)?;
            if head.is_nil() {
                head = pair;
                self.roots[slot] = head;
            } else {
                self.set_rest(tail, pair)?;
            }
            tail = pair;
            current = self.cdr(current)?;
        }
        Ok(head)
    }

    /// `(COND (test result) ...)`: the result of the first clause whose test
    /// is truthy, or `Nil`.
    fn eval_cond(&mut self, clauses: Value, env: Value) -> Result<Value> {
        let mut current = clauses;
        while !current.is_nil() {
            let clause = self.car(current)?;
            let test = self.car(clause)?;
            let outcome = self.eval_form(test, env)?;
            if self.is_truthy(outcome)? {
                let body = self.cdr(clause)?;
                let result = self.car(body)?;
                return self.eval_form(result, env);
            }
            current = self.cdr(current)?;
        }
        Ok(Value::Nil)
    }

    /// `(LABEL name expr)`: bind the value of `expr` globally.
    fn eval_label(&mut self, args: Value, env: Value) -> Result<Value> {
        let name = self.car(args)?;
        if self.symbol_id(name)?.is_none() {
            return Err(Error::type_error("LABEL: name must be a symbol"));
        }
        let rest = self.cdr(args)?;
        let expr = self.car(rest)?;
        let value = self.eval_form(expr, env)?;
        self.define_global(name, value)?;
        Ok(value)
    }

    /// `(LAMBDA formals body)` closes over `env`.
    ///
    /// Stored as `(body . (formals . env))` in a lambda cell.
    fn make_lambda(&mut self, args: Value, env: Value) -> Result<Value> {
        let formals = self.car(args)?;
        let rest = self.cdr(args)?;
        let body = self.car(rest)?;

        let mut current = formals;
        while !current.is_nil() {
            let Some(Cell::Pair { first, rest }) = self.cell(current)? else {
                return Err(Error::type_error("LAMBDA: formals must be a proper list"));
            };
            if self.symbol_id(first)?.is_none() {
                return Err(Error::type_error("LAMBDA: formals must be symbols"));
            }
            current = rest;
        }

        let base = self.roots.len();
        self.roots.push(body);
        let closure = self.cons(formals, env);
        self.roots.truncate(base);

        self.alloc(Cell::Lambda {
            first: body,
            rest: closure?,
        })
    }

    // ========================================================================
    // Application
    // ========================================================================

    /// Call `callable` with an already evaluated argument list.
    pub fn apply(&mut self, callable: Value, args: Value) -> Result<Value> {
        let base = self.roots.len();
        self.roots.push(callable);
        self.roots.push(args);
        let result = self.apply_rooted(callable, args);
        self.roots.truncate(base);
        result
    }

    fn apply_rooted(&mut self, callable: Value, args: Value) -> Result<Value> {
        match self.cell(callable)? {
            Some(Cell::Native(id)) => {
                let native = self.native(id)?;
                let argv = self.list_to_vec(args)?;
                trace!("apply {} to {} argument(s)", self.display(callable), argv.len());
                (native.func)(self, &argv)
            }
            Some(Cell::Lambda { first: body, rest }) => {
                let formals = self.car(rest)?;
                let captured = self.cdr(rest)?;
                trace!("apply {} to {}", self.display(callable), self.display(args));
                let env = self.bind_arguments(formals, args, captured)?;
                self.eval(body, env)
            }
            _ => Err(Error::not_callable(self.display(callable))),
        }
    }
}
