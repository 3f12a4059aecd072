//! Special forms.
//!
//! Each handler receives the unevaluated operand list (the cdr of the form)
//! and the current environment. Handlers for forms whose last operand is in
//! tail position hand that operand back as `Trampoline::Eval` instead of
//! evaluating it, so the evaluator loop runs it without growing the stack.

use crate::env::{EnvOps, EnvRef};
use crate::error::SchemeError;
use crate::eval::{scheme_eval, Trampoline};
use crate::procedure::{CompoundProcedure, Procedure};
use crate::value::{cons, is_proper_list, is_true, list_from_vec, list_to_vec, SchemeValue};
use std::collections::HashSet;

pub type SpecialFormFn = fn(&SchemeValue, &EnvRef) -> Result<Trampoline, SchemeError>;

/// Find the handler for a form keyword.
pub fn special_form(name: &str) -> Option<SpecialFormFn> {
    let handler: SpecialFormFn = match name {
        "quote" => do_quote_form,
        "if" => do_if_form,
        "and" => do_and_form,
        "or" => do_or_form,
        "cond" => do_cond_form,
        "begin" => do_begin_form,
        "let" => do_let_form,
        "lambda" => do_lambda_form,
        "mu" => do_mu_form,
        "define" => do_define_form,
        _ => return None,
    };
    Some(handler)
}

// ============================================================================
// STRUCTURE CHECKS
// ============================================================================

/// Check that the operands `expr` of the form named `keyword` are a proper
/// list whose length is at least `min` and, if given, at most `max`. Returns
/// the elements.
pub fn check_form(
    keyword: &str,
    expr: &SchemeValue,
    min: usize,
    max: Option<usize>,
) -> Result<Vec<SchemeValue>, SchemeError> {
    let form = || cons(SchemeValue::symbol(keyword), expr.clone()).to_string();
    if !is_proper_list(expr) {
        return Err(SchemeError::badly_formed(form()));
    }
    let items = list_to_vec(expr)?;
    if items.len() < min {
        return Err(SchemeError::too_few_operands(&form()));
    }
    if let Some(max) = max {
        if items.len() > max {
            return Err(SchemeError::too_many_operands(&form()));
        }
    }
    Ok(items)
}

/// Check that `formals` is a proper list of distinct symbols.
pub fn check_formals(formals: &SchemeValue) -> Result<(), SchemeError> {
    if !is_proper_list(formals) {
        return Err(SchemeError::bad_formals(formals));
    }
    let mut seen = HashSet::new();
    for formal in list_to_vec(formals)? {
        let sym = formal
            .as_symbol()
            .ok_or_else(|| SchemeError::bad_formals(formals))?;
        if !seen.insert(sym.clone()) {
            return Err(SchemeError::bad_formals(format!(
                "{} (duplicate parameter {})",
                formals, sym
            )));
        }
    }
    Ok(())
}

// ============================================================================
// VALUE-PRODUCING FORMS
// ============================================================================

pub fn do_quote_form(vals: &SchemeValue, _env: &EnvRef) -> Result<Trampoline, SchemeError> {
    let operands = check_form("quote", vals, 1, Some(1))?;
    Ok(Trampoline::Value(operands[0].clone()))
}

/// Formals and body of a `lambda`/`mu`: several body expressions are
/// wrapped in an implicit `begin`.
fn formals_and_body(
    keyword: &str,
    vals: &SchemeValue,
) -> Result<(SchemeValue, SchemeValue), SchemeError> {
    let operands = check_form(keyword, vals, 2, None)?;
    let formals = operands[0].clone();
    check_formals(&formals)?;
    let body = if operands.len() == 2 {
        operands[1].clone()
    } else {
        let rest = list_from_vec(operands[1..].to_vec());
        cons(SchemeValue::symbol("begin"), rest)
    };
    Ok((formals, body))
}

pub fn make_lambda(vals: &SchemeValue, env: &EnvRef) -> Result<SchemeValue, SchemeError> {
    let (formals, body) = formals_and_body("lambda", vals)?;
    Ok(SchemeValue::procedure(Procedure::Compound(
        CompoundProcedure::lambda(formals, body, env.clone()),
    )))
}

pub fn do_lambda_form(vals: &SchemeValue, env: &EnvRef) -> Result<Trampoline, SchemeError> {
    Ok(Trampoline::Value(make_lambda(vals, env)?))
}

pub fn do_mu_form(vals: &SchemeValue, _env: &EnvRef) -> Result<Trampoline, SchemeError> {
    let (formals, body) = formals_and_body("mu", vals)?;
    Ok(Trampoline::Value(SchemeValue::procedure(Procedure::Compound(
        CompoundProcedure::mu(formals, body),
    ))))
}

/// `(define name expr)` or `(define (name . params) body...)`.
pub fn do_define_form(vals: &SchemeValue, env: &EnvRef) -> Result<Trampoline, SchemeError> {
    let operands = check_form("define", vals, 2, None)?;
    match &operands[0] {
        SchemeValue::Symbol(name) => {
            check_form("define", vals, 2, Some(2))?;
            let value = scheme_eval(&operands[1], env)?;
            env.define(name.clone(), value);
            Ok(Trampoline::Value(SchemeValue::Symbol(name.clone())))
        }
        SchemeValue::Pair(target) => {
            let name = target
                .first
                .as_symbol()
                .ok_or_else(|| SchemeError::bad_define(&target.first))?
                .clone();
            let body = list_from_vec(operands[1..].to_vec());
            let lambda = make_lambda(&cons(target.second.clone(), body), env)?;
            env.define(name.clone(), lambda);
            Ok(Trampoline::Value(SchemeValue::Symbol(name)))
        }
        other => Err(SchemeError::bad_define(other)),
    }
}

// ============================================================================
// TAIL-POSITION FORMS
// ============================================================================

pub fn do_if_form(vals: &SchemeValue, env: &EnvRef) -> Result<Trampoline, SchemeError> {
    let operands = check_form("if", vals, 3, Some(3))?;
    let test = scheme_eval(&operands[0], env)?;
    let branch = if is_true(&test) { &operands[1] } else { &operands[2] };
    Ok(Trampoline::Eval(branch.clone(), env.clone()))
}

pub fn do_and_form(vals: &SchemeValue, env: &EnvRef) -> Result<Trampoline, SchemeError> {
    let operands = check_form("and", vals, 0, None)?;
    let Some((last, init)) = operands.split_last() else {
        return Ok(Trampoline::Value(SchemeValue::Bool(true)));
    };
    for operand in init {
        if !is_true(&scheme_eval(operand, env)?) {
            return Ok(Trampoline::Value(SchemeValue::Bool(false)));
        }
    }
    Ok(Trampoline::Eval(last.clone(), env.clone()))
}

/// Only `#f` is false, so handing the last operand to the loop yields
/// either its (true) value or `#f`.
pub fn do_or_form(vals: &SchemeValue, env: &EnvRef) -> Result<Trampoline, SchemeError> {
    let operands = check_form("or", vals, 0, None)?;
    let Some((last, init)) = operands.split_last() else {
        return Ok(Trampoline::Value(SchemeValue::Bool(false)));
    };
    for operand in init {
        let value = scheme_eval(operand, env)?;
        if is_true(&value) {
            return Ok(Trampoline::Value(value));
        }
    }
    Ok(Trampoline::Eval(last.clone(), env.clone()))
}

pub fn do_cond_form(vals: &SchemeValue, env: &EnvRef) -> Result<Trampoline, SchemeError> {
    let clauses = check_form("cond", vals, 0, None)?;
    let num_clauses = clauses.len();
    for (i, clause) in clauses.iter().enumerate() {
        let Some(clause) = clause.as_pair().filter(|_| is_proper_list(clause)) else {
            return Err(SchemeError::badly_formed(clause));
        };
        let test = if clause.first.is_sym("else") {
            if i < num_clauses - 1 {
                return Err(SchemeError::new("else must be last"));
            }
            if clause.second.is_nil() {
                return Err(SchemeError::new("badly formed else clause"));
            }
            SchemeValue::Bool(true)
        } else {
            scheme_eval(&clause.first, env)?
        };
        if is_true(&test) {
            if clause.second.is_nil() {
                return Ok(Trampoline::Value(test));
            }
            return do_begin_form(&clause.second, env);
        }
    }
    Ok(Trampoline::Value(SchemeValue::Undefined))
}

pub fn do_begin_form(vals: &SchemeValue, env: &EnvRef) -> Result<Trampoline, SchemeError> {
    let operands = check_form("begin", vals, 1, None)?;
    eval_all_but_last(&operands, env)
}

/// `(let ((name expr) ...) body...)`. Every `expr` is evaluated in the outer
/// environment before the new frame exists.
pub fn do_let_form(vals: &SchemeValue, env: &EnvRef) -> Result<Trampoline, SchemeError> {
    let operands = check_form("let", vals, 2, None)?;
    let bindings = &operands[0];
    if !is_proper_list(bindings) {
        return Err(SchemeError::new(format!("bad bindings list in let form: {}", bindings)));
    }

    let mut names = Vec::new();
    let mut values = Vec::new();
    for binding in list_to_vec(bindings)? {
        let pair = check_form("let", &binding, 2, Some(2))
            .map_err(|_| SchemeError::new(format!("bad binding in let form: {}", binding)))?;
        names.push(pair[0].clone());
        values.push(scheme_eval(&pair[1], env)?);
    }
    let names = list_from_vec(names);
    check_formals(&names)?;
    let new_env = env.make_call_frame(&names, &list_from_vec(values))?;

    eval_all_but_last(&operands[1..], &new_env)
}

/// Evaluate every expression but the last for effect and hand the last one
/// back to the evaluator loop.
fn eval_all_but_last(exprs: &[SchemeValue], env: &EnvRef) -> Result<Trampoline, SchemeError> {
    let Some((last, init)) = exprs.split_last() else {
        return Err(SchemeError::too_few_operands("(begin)"));
    };
    for expr in init {
        scheme_eval(expr, env)?;
    }
    Ok(Trampoline::Eval(last.clone(), env.clone()))
}
