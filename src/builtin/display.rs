//! Output primitives. Everything goes to stdout and is flushed immediately so
//! output interleaves correctly with the REPL prompt.

use std::io::{self, Write};

use super::expect_args;
use crate::env::EnvRef;
use crate::error::SchemeError;
use crate::printer::{display_value, print_value};
use crate::value::SchemeValue;

fn emit(text: &str) -> Result<SchemeValue, SchemeError> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(|e| SchemeError::new(format!("write failed: {}", e)))?;
    Ok(SchemeValue::Undefined)
}

/// (display obj): strings without quotes, no trailing newline
pub fn display(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 1)?;
    emit(&display_value(&args[0]))
}

/// (print obj): readable form followed by a newline
pub fn print(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 1)?;
    emit(&format!("{}\n", print_value(&args[0])))
}

pub fn newline(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    expect_args(args, 0)?;
    emit("\n")
}

pub fn register_display_builtins(env: &EnvRef) {
    register_builtin_family!(env,
        "display" => display,
        "print" => print,
        "newline" => newline,
    );
}
