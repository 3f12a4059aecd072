//! The primitive library.
//!
//! Every primitive takes its evaluated arguments as a slice and returns a
//! value or a `SchemeError`. Errors raised here carry no prefix; the
//! evaluator adds the primitive's name when it re-signals them.

use crate::env::EnvRef;
use crate::error::SchemeError;
use crate::value::SchemeValue;

macro_rules! register_builtin_family {
    ($env:expr, $($name:expr => $func:expr),* $(,)?) => {
        $(
            $crate::env::EnvOps::define(
                $env,
                $crate::symbol::intern_symbol($name),
                $crate::value::SchemeValue::procedure($crate::procedure::Procedure::Primitive(
                    $crate::procedure::PrimitiveProcedure::new($name, $func, false),
                )),
            );
        )*
    };
}

pub mod display;
pub mod fileio;
pub mod list;
pub mod number;
pub mod predicate;

/// Install every primitive that does not need the calling environment.
pub fn register_builtins(env: &EnvRef) {
    number::register_number_builtins(env);
    list::register_list_builtins(env);
    predicate::register_predicate_builtins(env);
    display::register_display_builtins(env);
}

pub(crate) fn expect_args(args: &[SchemeValue], count: usize) -> Result<(), SchemeError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(SchemeError::new(format!(
            "expects exactly {} argument{}, got {}",
            count,
            if count == 1 { "" } else { "s" },
            args.len()
        )))
    }
}

pub(crate) fn expect_min_args(args: &[SchemeValue], min: usize) -> Result<(), SchemeError> {
    if args.len() >= min {
        Ok(())
    } else {
        Err(SchemeError::new(format!(
            "expects at least {} argument{}, got {}",
            min,
            if min == 1 { "" } else { "s" },
            args.len()
        )))
    }
}
