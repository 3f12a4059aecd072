use std::fs::File;
use std::io::{self, BufReader};
use std::process;

use argh::FromArgs;
use log::debug;

use mu_scheme::builtin::fileio::load_file;
use mu_scheme::repl::read_eval_print_loop;
use mu_scheme::Evaluator;

#[derive(FromArgs)]
/// A Scheme interpreter with lexical and dynamic procedures
struct Args {
    /// files to load before the REPL starts (can be repeated)
    #[argh(option, short = 'f')]
    file: Vec<String>,
    /// exit after file loading, do not enter REPL
    #[argh(switch, short = 'q')]
    quit: bool,
    /// run this file as REPL input instead of reading stdin
    #[argh(positional)]
    script: Option<String>,
}

fn main() {
    env_logger::init();
    let args: Args = argh::from_env();
    let evaluator = Evaluator::new();

    for filename in &args.file {
        if let Err(e) = load_file(filename, evaluator.global_env()) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    if args.quit {
        return;
    }

    let result = match &args.script {
        Some(path) => {
            let file = match File::open(path) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("Error: could not open file '{}': {}", path, e);
                    process::exit(1);
                }
            };
            debug!("running {}", path);
            read_eval_print_loop(BufReader::new(file), io::stdout(), evaluator.global_env(), None)
        }
        None => read_eval_print_loop(
            io::stdin().lock(),
            io::stdout(),
            evaluator.global_env(),
            Some("scm> "),
        ),
    };

    if let Err(e) = result {
        eprintln!("I/O error: {}", e);
        process::exit(1);
    }
}
