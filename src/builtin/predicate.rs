use super::expect_args;
use crate::env::EnvRef;
use crate::error::SchemeError;
use crate::value::{self, is_false, is_proper_list, SchemeValue};

/// Unary type test sharing the arity check.
fn type_test(
    args: &[SchemeValue],
    test: fn(&SchemeValue) -> bool,
) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 1)?;
    Ok(SchemeValue::Bool(test(&args[0])))
}

pub fn null_q(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    type_test(args, SchemeValue::is_nil)
}

pub fn pair_q(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    type_test(args, |v| matches!(v, SchemeValue::Pair(_)))
}

pub fn list_q(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    type_test(args, is_proper_list)
}

pub fn number_q(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    type_test(args, |v| matches!(v, SchemeValue::Int(_) | SchemeValue::Float(_)))
}

/// Floats with no fractional part count as integers.
pub fn integer_q(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    type_test(args, |v| match v {
        SchemeValue::Int(_) => true,
        SchemeValue::Float(f) => f.is_finite() && f.fract() == 0.0,
        _ => false,
    })
}

pub fn symbol_q(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    type_test(args, value::is_symbol)
}

pub fn string_q(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    type_test(args, |v| matches!(v, SchemeValue::Str(_)))
}

pub fn boolean_q(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    type_test(args, |v| matches!(v, SchemeValue::Bool(_)))
}

pub fn procedure_q(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    type_test(args, |v| matches!(v, SchemeValue::Procedure(_)))
}

/// Booleans, numbers, symbols, strings and the empty list.
pub fn atom_q(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    type_test(args, |v| {
        matches!(
            v,
            SchemeValue::Bool(_)
                | SchemeValue::Int(_)
                | SchemeValue::Float(_)
                | SchemeValue::Symbol(_)
                | SchemeValue::Str(_)
                | SchemeValue::Nil
        )
    })
}

pub fn not_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    type_test(args, is_false)
}

pub fn eq_q(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 2)?;
    Ok(SchemeValue::Bool(value::eq(&args[0], &args[1])))
}

pub fn equal_q(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 2)?;
    Ok(SchemeValue::Bool(value::equal(&args[0], &args[1])))
}

pub fn register_predicate_builtins(env: &EnvRef) {
    register_builtin_family!(env,
        "null?" => null_q,
        "pair?" => pair_q,
        "list?" => list_q,
        "number?" => number_q,
        "integer?" => integer_q,
        "symbol?" => symbol_q,
        "string?" => string_q,
        "boolean?" => boolean_q,
        "procedure?" => procedure_q,
        "atom?" => atom_q,
        "not" => not_builtin,
        "eq?" => eq_q,
        "equal?" => equal_q,
    );
}
