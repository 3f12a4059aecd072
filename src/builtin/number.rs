use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use super::{expect_args, expect_min_args};
use crate::env::EnvRef;
use crate::error::SchemeError;
use crate::value::SchemeValue;

fn as_number(val: &SchemeValue) -> Result<f64, SchemeError> {
    val.as_f64()
        .ok_or_else(|| SchemeError::new(format!("expected a number, got {}", val)))
}

fn as_integer(val: &SchemeValue) -> Result<&BigInt, SchemeError> {
    match val {
        SchemeValue::Int(i) => Ok(i),
        _ => Err(SchemeError::new(format!("expected an integer, got {}", val))),
    }
}

/// Integer arithmetic while both sides are integers, float otherwise.
fn combine(
    a: &SchemeValue,
    b: &SchemeValue,
    int_op: fn(&BigInt, &BigInt) -> BigInt,
    float_op: fn(f64, f64) -> f64,
) -> Result<SchemeValue, SchemeError> {
    match (a, b) {
        (SchemeValue::Int(x), SchemeValue::Int(y)) => Ok(SchemeValue::Int(int_op(x, y))),
        _ => Ok(SchemeValue::Float(float_op(as_number(a)?, as_number(b)?))),
    }
}

pub fn plus_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    args.iter().try_fold(SchemeValue::int(0), |sum, arg| {
        combine(&sum, arg, |x, y| x + y, |x, y| x + y)
    })
}

pub fn minus_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_min_args(args, 1)?;
    if args.len() == 1 {
        // Unary minus
        return combine(&SchemeValue::int(0), &args[0], |x, y| x - y, |x, y| x - y);
    }
    as_number(&args[0])?;
    args[1..].iter().try_fold(args[0].clone(), |result, arg| {
        combine(&result, arg, |x, y| x - y, |x, y| x - y)
    })
}

pub fn times_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    args.iter().try_fold(SchemeValue::int(1), |product, arg| {
        combine(&product, arg, |x, y| x * y, |x, y| x * y)
    })
}

fn divide(a: &SchemeValue, b: &SchemeValue) -> Result<SchemeValue, SchemeError> {
    if as_number(b)? == 0.0 {
        return Err(SchemeError::new("division by zero"));
    }
    match (a, b) {
        (SchemeValue::Int(x), SchemeValue::Int(y)) if (x % y).is_zero() => {
            Ok(SchemeValue::Int(x / y))
        }
        _ => Ok(SchemeValue::Float(as_number(a)? / as_number(b)?)),
    }
}

/// `/` stays exact when the division is exact.
pub fn div_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_min_args(args, 1)?;
    if args.len() == 1 {
        return divide(&SchemeValue::int(1), &args[0]);
    }
    as_number(&args[0])?;
    args[1..]
        .iter()
        .try_fold(args[0].clone(), |result, arg| divide(&result, arg))
}

fn integer_operands(args: &[SchemeValue]) -> Result<(&BigInt, &BigInt), SchemeError> {
    expect_args(args, 2)?;
    let a = as_integer(&args[0])?;
    let b = as_integer(&args[1])?;
    if b.is_zero() {
        return Err(SchemeError::new("division by zero"));
    }
    Ok((a, b))
}

/// Truncates toward zero.
pub fn quotient_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    let (a, b) = integer_operands(args)?;
    Ok(SchemeValue::Int(a / b))
}

/// Sign follows the dividend.
pub fn remainder_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    let (a, b) = integer_operands(args)?;
    Ok(SchemeValue::Int(a % b))
}

/// Sign follows the divisor.
pub fn modulo_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    let (a, b) = integer_operands(args)?;
    let r = a % b;
    if !r.is_zero() && r.is_negative() != b.is_negative() {
        Ok(SchemeValue::Int(r + b))
    } else {
        Ok(SchemeValue::Int(r))
    }
}

pub fn abs_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 1)?;
    match &args[0] {
        SchemeValue::Int(i) => Ok(SchemeValue::Int(i.abs())),
        other => Ok(SchemeValue::Float(as_number(other)?.abs())),
    }
}

pub fn expt_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 2)?;
    if let (SchemeValue::Int(base), SchemeValue::Int(power)) = (&args[0], &args[1]) {
        if let Some(power) = power.to_u32() {
            return Ok(SchemeValue::Int(base.pow(power)));
        }
    }
    Ok(SchemeValue::Float(as_number(&args[0])?.powf(as_number(&args[1])?)))
}

fn compare(a: &SchemeValue, b: &SchemeValue) -> Result<Ordering, SchemeError> {
    match (a, b) {
        (SchemeValue::Int(x), SchemeValue::Int(y)) => Ok(x.cmp(y)),
        _ => as_number(a)?
            .partial_cmp(&as_number(b)?)
            .ok_or_else(|| SchemeError::new("cannot compare NaN")),
    }
}

/// True when every adjacent pair of arguments satisfies `holds`.
fn compare_chain(
    args: &[SchemeValue],
    holds: fn(Ordering) -> bool,
) -> Result<SchemeValue, SchemeError> {
    expect_min_args(args, 2)?;
    let mut result = true;
    for window in args.windows(2) {
        // Keep going after a failed comparison so every argument is type checked
        if !holds(compare(&window[0], &window[1])?) {
            result = false;
        }
    }
    Ok(SchemeValue::Bool(result))
}

pub fn eq_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    compare_chain(args, |o| o == Ordering::Equal)
}

pub fn lt_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    compare_chain(args, |o| o == Ordering::Less)
}

pub fn gt_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    compare_chain(args, |o| o == Ordering::Greater)
}

pub fn le_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    compare_chain(args, |o| o != Ordering::Greater)
}

pub fn ge_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    compare_chain(args, |o| o != Ordering::Less)
}

pub fn even_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 1)?;
    let n = as_integer(&args[0])?;
    Ok(SchemeValue::Bool((n % BigInt::from(2)).is_zero()))
}

pub fn odd_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 1)?;
    let n = as_integer(&args[0])?;
    Ok(SchemeValue::Bool(!(n % BigInt::from(2)).is_zero()))
}

pub fn zero_builtin(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 1)?;
    Ok(SchemeValue::Bool(as_number(&args[0])? == 0.0))
}

pub fn register_number_builtins(env: &EnvRef) {
    register_builtin_family!(env,
        "+" => plus_builtin,
        "-" => minus_builtin,
        "*" => times_builtin,
        "/" => div_builtin,
        "quotient" => quotient_builtin,
        "remainder" => remainder_builtin,
        "modulo" => modulo_builtin,
        "abs" => abs_builtin,
        "expt" => expt_builtin,
        "=" => eq_builtin,
        "<" => lt_builtin,
        ">" => gt_builtin,
        "<=" => le_builtin,
        ">=" => ge_builtin,
        "even?" => even_builtin,
        "odd?" => odd_builtin,
        "zero?" => zero_builtin,
    );
}
