//! The evaluator.
//!
//! `scheme_eval` is a loop over (expression, environment) pairs. Each step
//! either finishes with a value or names the next expression to run, which is
//! how tail calls (procedure bodies, the chosen `if` branch, the last
//! expression of `begin`, ...) run in constant stack space. Operators and
//! operands are evaluated by ordinary recursive calls since they are never in
//! tail position. That nesting is capped at `MAX_EVAL_DEPTH`, past which
//! evaluation fails with an error instead of exhausting the native stack.

use std::cell::Cell;

use log::{debug, trace};

use crate::builtin::register_builtins;
use crate::builtin::fileio::load_primitive;
use crate::env::{new_global_env, EnvOps, EnvRef};
use crate::error::SchemeError;
use crate::parser::read_all;
use crate::procedure::{PrimitiveProcedure, Procedure};
use crate::special_forms::special_form;
use crate::symbol::intern_symbol;
use crate::value::{is_proper_list, is_self_evaluating, list_map, list_to_vec, SchemeValue};

/// Result of one evaluation step.
#[derive(Debug)]
pub enum Trampoline {
    /// Evaluation is finished
    Value(SchemeValue),
    /// Continue with this expression in this environment
    Eval(SchemeValue, EnvRef),
}

/// Nested `scheme_eval` calls allowed on one thread.
pub const MAX_EVAL_DEPTH: usize = 1000;

thread_local! {
    static EVAL_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Holds one level of evaluation depth until dropped.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<Self, SchemeError> {
        let depth = EVAL_DEPTH.with(|d| d.get());
        if depth >= MAX_EVAL_DEPTH {
            debug!("evaluation depth limit {} reached", MAX_EVAL_DEPTH);
            return Err(SchemeError::recursion_depth());
        }
        EVAL_DEPTH.with(|d| d.set(depth + 1));
        Ok(DepthGuard)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        EVAL_DEPTH.with(|d| d.set(d.get() - 1));
    }
}

/// Evaluate `expr` in `env`.
pub fn scheme_eval(expr: &SchemeValue, env: &EnvRef) -> Result<SchemeValue, SchemeError> {
    let _depth = DepthGuard::enter()?;
    let mut expr = expr.clone();
    let mut env = env.clone();
    loop {
        match eval_step(&expr, &env)? {
            Trampoline::Value(value) => return Ok(value),
            Trampoline::Eval(next_expr, next_env) => {
                trace!("tail call: {}", next_expr);
                expr = next_expr;
                env = next_env;
            }
        }
    }
}

fn eval_step(expr: &SchemeValue, env: &EnvRef) -> Result<Trampoline, SchemeError> {
    match expr {
        SchemeValue::Undefined => return Err(SchemeError::undefined_expression()),
        SchemeValue::Symbol(sym) => return Ok(Trampoline::Value(env.lookup(sym)?)),
        _ if is_self_evaluating(expr) => return Ok(Trampoline::Value(expr.clone())),
        _ => {}
    }

    if !is_proper_list(expr) {
        return Err(SchemeError::malformed_list(expr));
    }
    let Some(combination) = expr.as_pair() else {
        return Err(SchemeError::malformed_list(expr));
    };

    // Keywords are recognized by name, whatever the head symbol is bound to
    if let SchemeValue::Symbol(head) = &combination.first {
        if let Some(handler) = special_form(head.name()) {
            return handler(&combination.second, env);
        }
    }

    let procedure = scheme_eval(&combination.first, env)?;
    let args = list_map(&combination.second, |operand| scheme_eval(operand, env))?;
    apply_procedure(&procedure, &args, env)
}

/// Apply `procedure` to already evaluated `args`. A compound procedure's body
/// is handed back unevaluated, in its new call frame.
pub fn apply_procedure(
    procedure: &SchemeValue,
    args: &SchemeValue,
    env: &EnvRef,
) -> Result<Trampoline, SchemeError> {
    let Some(proc) = procedure.as_procedure() else {
        return Err(SchemeError::not_callable(procedure));
    };
    match proc.as_ref() {
        Procedure::Primitive(prim) => Ok(Trampoline::Value(apply_primitive(prim, args, env)?)),
        Procedure::Compound(compound) => {
            let frame = compound.call_frame(env, args)?;
            Ok(Trampoline::Eval(compound.body.clone(), frame))
        }
    }
}

/// Apply `procedure` and run it to completion.
pub fn scheme_apply(
    procedure: &SchemeValue,
    args: &SchemeValue,
    env: &EnvRef,
) -> Result<SchemeValue, SchemeError> {
    match apply_procedure(procedure, args, env)? {
        Trampoline::Value(value) => Ok(value),
        Trampoline::Eval(body, frame) => scheme_eval(&body, &frame),
    }
}

pub fn apply_primitive(
    prim: &PrimitiveProcedure,
    args: &SchemeValue,
    env: &EnvRef,
) -> Result<SchemeValue, SchemeError> {
    let mut arguments = list_to_vec(args)?;
    if prim.wants_env {
        arguments.push(SchemeValue::Environment(env.clone()));
    }
    (prim.func)(&arguments).map_err(|err| SchemeError::primitive(&prim.name, err))
}

// ============================================================================
// EVAL, APPLY AND THE GLOBAL FRAME
// ============================================================================

/// Split the trailing environment off the arguments of a primitive
/// registered with `wants_env`.
pub fn split_env(args: &[SchemeValue]) -> Result<(&[SchemeValue], &EnvRef), SchemeError> {
    match args.split_last() {
        Some((SchemeValue::Environment(env), rest)) => Ok((rest, env)),
        _ => Err(SchemeError::new("missing calling environment")),
    }
}

fn eval_primitive(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    let (args, env) = split_env(args)?;
    match args {
        [expr] => scheme_eval(expr, env),
        _ => Err(SchemeError::new(format!(
            "expects exactly 1 argument, got {}",
            args.len()
        ))),
    }
}

fn apply_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    let (args, env) = split_env(args)?;
    match args {
        [procedure, operands] if is_proper_list(operands) => {
            scheme_apply(procedure, operands, env)
        }
        [_, operands] => Err(SchemeError::new(format!(
            "argument list expected, got {}",
            operands
        ))),
        _ => Err(SchemeError::new(format!(
            "expects exactly 2 arguments, got {}",
            args.len()
        ))),
    }
}

type NativeFn = fn(&[SchemeValue]) -> Result<SchemeValue, SchemeError>;

/// Build a global frame holding every primitive.
pub fn create_global_frame() -> EnvRef {
    let env = new_global_env();
    let env_primitives: [(&str, NativeFn); 3] = [
        ("eval", eval_primitive),
        ("apply", apply_builtin),
        ("load", load_primitive),
    ];
    for (name, func) in env_primitives {
        env.define(
            intern_symbol(name),
            SchemeValue::procedure(Procedure::Primitive(PrimitiveProcedure::new(
                name, func, true,
            ))),
        );
    }
    register_builtins(&env);
    env
}

/// An interpreter session: one global frame shared by every evaluation.
pub struct Evaluator {
    global: EnvRef,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            global: create_global_frame(),
        }
    }

    pub fn global_env(&self) -> &EnvRef {
        &self.global
    }

    pub fn eval(&self, expr: &SchemeValue) -> Result<SchemeValue, SchemeError> {
        scheme_eval(expr, &self.global)
    }

    /// Read and evaluate every expression in `source`, returning the last
    /// value (`Undefined` when the source is empty).
    pub fn eval_string(&self, source: &str) -> Result<SchemeValue, SchemeError> {
        let mut result = SchemeValue::Undefined;
        for expr in read_all(source)? {
            result = self.eval(&expr)?;
        }
        Ok(result)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_str(evaluator: &Evaluator, code: &str) -> String {
        evaluator.eval_string(code).unwrap().to_string()
    }

    #[test]
    fn test_self_evaluating_and_symbols() {
        let evaluator = Evaluator::new();
        assert_eq!(eval_str(&evaluator, "42"), "42");
        assert_eq!(eval_str(&evaluator, "\"hi\""), "\"hi\"");
        assert_eq!(eval_str(&evaluator, "#f"), "#f");
        assert_eq!(eval_str(&evaluator, "()"), "()");
        assert_eq!(eval_str(&evaluator, "(define x 5) x"), "5");
    }

    #[test]
    fn test_undefined_cannot_be_evaluated() {
        let evaluator = Evaluator::new();
        let err = evaluator.eval(&SchemeValue::Undefined).unwrap_err();
        assert_eq!(err.message(), "Cannot evaluate an undefined expression.");
    }

    #[test]
    fn test_malformed_combination() {
        let evaluator = Evaluator::new();
        let err = evaluator.eval_string("(+ 1 . 2)").unwrap_err();
        assert!(err.message().contains("malformed list"));
    }

    #[test]
    fn test_not_callable() {
        let evaluator = Evaluator::new();
        let err = evaluator.eval_string("(1 2 3)").unwrap_err();
        assert_eq!(err.message(), "Cannot call 1");
    }

    #[test]
    fn test_compound_application_is_deferred() {
        let evaluator = Evaluator::new();
        let square = evaluator.eval_string("(lambda (x) (* x x))").unwrap();
        let args = crate::value::list_from_vec(vec![SchemeValue::int(4)]);
        match apply_procedure(&square, &args, evaluator.global_env()).unwrap() {
            Trampoline::Eval(body, frame) => {
                assert_eq!(body.to_string(), "(* x x)");
                assert_eq!(frame.borrow().to_string(), "<{x: 4} -> <Global Frame>>");
            }
            Trampoline::Value(v) => panic!("expected deferred body, got {}", v),
        }
        assert_eq!(
            scheme_apply(&square, &args, evaluator.global_env()).unwrap().to_string(),
            "16"
        );
    }

    #[test]
    fn test_eval_and_apply_primitives() {
        let evaluator = Evaluator::new();
        assert_eq!(eval_str(&evaluator, "(eval '(+ 1 2))"), "3");
        assert_eq!(eval_str(&evaluator, "(apply + '(1 2 3))"), "6");
        assert_eq!(eval_str(&evaluator, "(eval (list + 1 2))"), "3");
        let err = evaluator.eval_string("(apply + 1)").unwrap_err();
        assert!(err.message().starts_with("apply:"));
        let err = evaluator.eval_string("(eval 1 2)").unwrap_err();
        assert_eq!(err.message(), "eval: expects exactly 1 argument, got 2");
    }

    #[test]
    fn test_deep_recursion_is_an_error() {
        let evaluator = Evaluator::new();
        evaluator
            .eval_string("(define (f n) (if (= n 0) 0 (+ 1 (f (- n 1)))))")
            .unwrap();
        assert_eq!(eval_str(&evaluator, "(f 500)"), "500");
        let err = evaluator.eval_string("(f 100000)").unwrap_err();
        assert_eq!(err.message(), "maximum recursion depth exceeded");
        // The depth count is back to zero after the error
        assert_eq!(EVAL_DEPTH.with(|d| d.get()), 0);
        assert_eq!(eval_str(&evaluator, "(+ 1 1)"), "2");
        assert_eq!(eval_str(&evaluator, "(f 500)"), "500");
    }

    #[test]
    fn test_eval_uses_caller_environment() {
        let evaluator = Evaluator::new();
        let code = "(define (f y) (eval 'y)) (f 9)";
        assert_eq!(eval_str(&evaluator, code), "9");
    }

    #[test]
    fn test_special_form_names_are_not_shadowed() {
        let evaluator = Evaluator::new();
        assert_eq!(eval_str(&evaluator, "(define if 3) (if #t 1 2)"), "1");
    }
}
