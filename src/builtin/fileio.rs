//! File loading.

use std::fs;
use std::path::PathBuf;

use log::{debug, warn};

use crate::env::{EnvOps, EnvRef};
use crate::error::{ParseError, SchemeError};
use crate::eval::{scheme_eval, split_env};
use crate::parser::Parser;
use crate::value::SchemeValue;

/// Resolve a `load` argument to a readable path, trying `<name>.scm` when
/// `name` itself does not exist.
pub fn resolve_source(name: &str) -> Result<PathBuf, SchemeError> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Ok(path);
    }
    let with_extension = PathBuf::from(format!("{}.scm", name));
    if with_extension.is_file() {
        return Ok(with_extension);
    }
    Err(SchemeError::new(format!("could not open file '{}'", name)))
}

/// Evaluate every expression of `source` in `env`.
///
/// An expression that fails is reported on stderr and loading carries on
/// with the next one. A syntax error ends the load since the rest of the
/// text can't be read reliably. Returns the number of expressions that
/// raised errors.
pub fn load_source(source: &str, origin: &str, env: &EnvRef) -> Result<usize, SchemeError> {
    let mut parser = Parser::new(source);
    let mut failures = 0;
    loop {
        let expr = match parser.parse() {
            Ok(expr) => expr,
            Err(ParseError::Eof) => break,
            Err(err) => return Err(SchemeError::new(format!("{}: {}", origin, err))),
        };
        if let Err(err) = scheme_eval(&expr, env) {
            warn!("{}: error evaluating {}: {}", origin, expr, err);
            eprintln!("Error: {}", err);
            failures += 1;
        }
    }
    Ok(failures)
}

/// Read and evaluate a file in the global frame.
pub fn load_file(name: &str, env: &EnvRef) -> Result<usize, SchemeError> {
    let path = resolve_source(name)?;
    let source = fs::read_to_string(&path)
        .map_err(|e| SchemeError::new(format!("could not read file '{}': {}", path.display(), e)))?;
    debug!("loading {}", path.display());
    let failures = load_source(&source, &path.display().to_string(), &env.global_frame())?;
    debug!("loaded {} ({} failed expressions)", path.display(), failures);
    Ok(failures)
}

/// Builtin function: (load filename)
///
/// Takes a symbol or a string. Registered to receive the calling
/// environment, but always evaluates in the global frame.
pub fn load_primitive(args: &[SchemeValue]) -> Result<SchemeValue, SchemeError> {
    let (args, env) = split_env(args)?;
    let name = match args {
        [SchemeValue::Symbol(sym)] => sym.name().to_string(),
        [SchemeValue::Str(s)] => s.to_string(),
        [other] => {
            return Err(SchemeError::new(format!(
                "argument must be a symbol or string, got {}",
                other
            )))
        }
        _ => {
            return Err(SchemeError::new(format!(
                "expected exactly 1 argument, got {}",
                args.len()
            )))
        }
    };
    load_file(&name, env)?;
    Ok(SchemeValue::Undefined)
}
