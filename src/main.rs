//! stackc CLI
//!
//! A thin driver around the library:
//!
//! ```text
//! stackc lex <file>     Tokenize and print the raw token stream
//! stackc parse <file>   Parse and print the resolved AST
//! ```
//!
//! Passing `-` (or no file) reads from stdin. Errors are rendered as
//! diagnostics on stderr.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser as ClapParser, Subcommand};

use stackc::diagnostics::Diagnostic;
use stackc::{scan, DiagnosticEmitter};

/// The stacklang compiler front end.
#[derive(ClapParser)]
#[command(name = "stackc")]
#[command(version)]
#[command(about = "The stacklang compiler front end", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize source and print the raw token stream
    Lex {
        /// Source file, or `-` for stdin
        file: Option<PathBuf>,
    },
    /// Parse source and print the resolved AST
    Parse {
        /// Source file, or `-` for stdin
        file: Option<PathBuf>,
    },
}

fn read_source(file: &Option<PathBuf>) -> std::io::Result<(String, String)> {
    match file {
        Some(path) if path.as_os_str() != "-" => {
            let source = std::fs::read_to_string(path)?;
            Ok((path.display().to_string(), source))
        }
        _ => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(("<stdin>".to_string(), source))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let file = match &cli.command {
        Commands::Lex { file } | Commands::Parse { file } => file,
    };
    let (filename, source) = match read_source(file) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match &cli.command {
        Commands::Lex { .. } => match scan(&source) {
            Ok(tokens) => {
                for token in &tokens {
                    println!("{token}");
                }
                ExitCode::SUCCESS
            }
            Err(err) => {
                let emitter = DiagnosticEmitter::new(&filename, &source);
                emitter.emit(&Diagnostic::from(&err));
                ExitCode::FAILURE
            }
        },
        Commands::Parse { .. } => match stackc::parse(&source) {
            Ok(unit) => {
                print!("{}", unit.dump());
                ExitCode::SUCCESS
            }
            Err(err) => {
                let emitter = DiagnosticEmitter::new(&filename, &source);
                emitter.emit(&Diagnostic::from(&err));
                ExitCode::FAILURE
            }
        },
    }
}
