//! Read-eval-print loop.

use std::io::{self, BufRead, Write};

use log::debug;

use crate::env::EnvRef;
use crate::error::ParseError;
use crate::eval::scheme_eval;
use crate::parser::Parser;
use crate::value::SchemeValue;

const CONTINUATION_PROMPT: &str = "... ";

/// Read lines from `input`, evaluate each complete expression in `env` and
/// write results to `output`.
///
/// Expressions are evaluated one at a time as they are read, and an
/// unfinished expression is buffered until later lines complete it. No
/// prompt is written when `prompt` is `None` (non-interactive input). Errors
/// are reported as `Error: <msg>` and the loop carries on. Returns at end of
/// input.
pub fn read_eval_print_loop(
    mut input: impl BufRead,
    mut output: impl Write,
    env: &EnvRef,
    prompt: Option<&str>,
) -> io::Result<()> {
    debug!("REPL session started");
    let mut buffer = String::new();
    loop {
        if let Some(prompt) = prompt {
            let shown = if buffer.trim().is_empty() { prompt } else { CONTINUATION_PROMPT };
            write!(output, "{}", shown)?;
            output.flush()?;
        }

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            if !buffer.trim().is_empty() {
                writeln!(output, "Error: {}", ParseError::Incomplete)?;
            }
            break;
        }
        buffer.push_str(&line);

        // Each expression runs as soon as it is read. An unfinished one is
        // kept for the next line.
        let mut parser = Parser::new(&buffer);
        let mut pending = String::new();
        loop {
            let start = parser.position();
            match parser.parse() {
                Ok(expr) => match scheme_eval(&expr, env) {
                    Ok(SchemeValue::Undefined) => {}
                    Ok(value) => writeln!(output, "{}", value)?,
                    Err(err) => {
                        // The rest of the input line is dropped
                        writeln!(output, "Error: {}", err)?;
                        break;
                    }
                },
                Err(ParseError::Eof) => break,
                Err(ParseError::Incomplete) => {
                    pending = buffer.chars().skip(start).collect();
                    break;
                }
                Err(err) => {
                    writeln!(output, "Error: {}", err)?;
                    break;
                }
            }
        }
        buffer = pending;
        output.flush()?;
    }
    debug!("REPL session ended");
    Ok(())
}
