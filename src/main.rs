//! Conso front-end CLI
//!
//! Usage: conso <input.cns> [--dump-tokens] [--trace] [--dump-symbols]

use clap::Parser;
use conso::parser::ACCEPTED_MESSAGE;
use conso::semantic::SEMANTIC_OK_MESSAGE;
use conso::{compile, CompilerConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "conso")]
#[command(version = "0.1.0")]
#[command(about = "Conso front end - lexical, syntax and semantic checks", long_about = None)]
struct Args {
    /// Input Conso source file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Print the token stream
    #[arg(long, default_value_t = false)]
    dump_tokens: bool,

    /// Print the parser's step trace
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Print the symbol table after analysis
    #[arg(long, default_value_t = false)]
    dump_symbols: bool,

    /// Longest identifier the lexer accepts
    #[arg(long, value_name = "N")]
    max_identifier_len: Option<usize>,

    /// Iteration ceiling for analyzer scan loops
    #[arg(long, value_name = "N")]
    scan_limit: Option<usize>,

    /// Deepest block or expression nesting the analyzer follows
    #[arg(long, value_name = "N")]
    max_nesting: Option<usize>,

    /// Keep going past lexical and syntax errors
    #[arg(long, default_value_t = false)]
    keep_going: bool,

    /// Log stage boundaries (RUST_LOG overrides)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> CompilerConfig {
        let defaults = CompilerConfig::default();
        CompilerConfig {
            max_identifier_len: self.max_identifier_len.unwrap_or(defaults.max_identifier_len),
            scan_limit: self.scan_limit.unwrap_or(defaults.scan_limit),
            max_nesting: self.max_nesting.unwrap_or(defaults.max_nesting),
            halt_on_lexical_errors: !self.keep_going,
            analyze_rejected: self.keep_going,
            ..defaults
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let source = match std::fs::read_to_string(&args.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: could not read file '{}': {}", args.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = compile(&source, &args.config());

    if args.dump_tokens {
        for token in &result.tokens {
            println!("{token}");
        }
    }
    if args.trace {
        if let Some(parse) = &result.parse {
            for line in &parse.trace {
                println!("{line}");
            }
        }
    }

    for diagnostic in result.diagnostics() {
        eprintln!("{diagnostic}");
    }
    if result.parse.as_ref().is_some_and(|p| p.accepted) {
        println!("{ACCEPTED_MESSAGE}");
    }
    if let Some(analysis) = &result.analysis {
        if analysis.accepted {
            println!("{SEMANTIC_OK_MESSAGE}");
        }
        if args.dump_symbols {
            print!("{}", analysis.symbols);
        }
    }

    if result.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
