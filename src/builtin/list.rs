use super::expect_args;
use crate::env::EnvRef;
use crate::error::SchemeError;
use crate::value::{cons, is_proper_list, list_from_slice, list_length, list_to_vec, SchemeValue};

/// Builtin function: (car pair)
pub fn car_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 1)?;
    match &args[0] {
        SchemeValue::Pair(pair) => Ok(pair.first.clone()),
        _ => Err(SchemeError::new("argument must be a pair")),
    }
}

/// Builtin function: (cdr pair)
pub fn cdr_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 1)?;
    match &args[0] {
        SchemeValue::Pair(pair) => Ok(pair.second.clone()),
        _ => Err(SchemeError::new("argument must be a pair")),
    }
}

/// Builtin function: (cons first second)
pub fn cons_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 2)?;
    Ok(cons(args[0].clone(), args[1].clone()))
}

/// Builtin function: (list arg1 arg2 ...)
pub fn list_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    Ok(list_from_slice(args))
}

/// Builtin function: (append list1 list2 ... last)
///
/// Every argument but the last is copied; the last becomes the shared tail
/// and need not be a list.
pub fn append_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    let Some((last, init)) = args.split_last() else {
        return Ok(SchemeValue::Nil);
    };
    let mut items = Vec::new();
    for list in init {
        if !is_proper_list(list) {
            return Err(SchemeError::new(format!("argument must be a list, got {}", list)));
        }
        items.extend(list_to_vec(list)?);
    }
    Ok(items
        .into_iter()
        .rev()
        .fold(last.clone(), |tail, item| cons(item, tail)))
}

/// Builtin function: (length list)
pub fn length_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 1)?;
    if !is_proper_list(&args[0]) {
        return Err(SchemeError::new(format!("argument must be a list, got {}", args[0])));
    }
    Ok(SchemeValue::int(list_length(&args[0])?))
}

pub fn register_list_builtins(env: &EnvRef) {
    register_builtin_family!(env,
        "car" => car_builtin,
        "cdr" => cdr_builtin,
        "cons" => cons_builtin,
        "list" => list_builtin,
        "append" => append_builtin,
        "length" => length_builtin,
    );
}
