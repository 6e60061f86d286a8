//! chococ - command-line driver for the checker.
//!
//! The driver is a thin shell around the library pipeline described in
//! [`choco_ast`] and [`choco_check`]: read one source file, parse it,
//! run the checker, then either print the collected diagnostics or dump
//! the annotated tree as JSON. Exit codes and output formatting live
//! here because they are host concerns the core checker deliberately
//! stays out of.

pub mod json;

use std::fs;
use std::path::PathBuf;

use clap::Parser as ClapParser;
use tracing::{debug, info};

/// Command-line configuration, parsed with `clap`.
#[derive(ClapParser, Debug)]
#[command(name = "chococ", version, about = "Type checker for a small statically-typed, Python-like language")]
pub struct Config {
    /// Source file to check
    pub input: PathBuf,

    /// Dump the annotated AST as JSON instead of printing diagnostics
    #[arg(long)]
    pub emit_ast: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// The `tracing` filter directive implied by the verbosity count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("could not read {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("could not write {0}: {1}")]
    WriteOutput(PathBuf, std::io::Error),

    #[error("{0}")]
    Parse(#[from] choco_ast::ParseError),
}

/// What happened on a successful run, for the caller to translate into
/// an exit code.
pub enum Outcome {
    Clean,
    HadErrors(usize),
}

/// Runs the full read -> parse -> check -> report pipeline described by
/// `config`. Parse failures and I/O failures are returned as `Err`;
/// a program that parses but fails the checker is `Ok(Outcome::HadErrors)`
/// so the caller can still inspect/emit the (partially) annotated tree.
pub fn run(config: &Config) -> Result<Outcome, DriverError> {
    info!(path = %config.input.display(), "reading source");
    let source =
        fs::read_to_string(&config.input).map_err(|e| DriverError::Io(config.input.clone(), e))?;

    debug!(bytes = source.len(), "parsing");
    let mut program = choco_ast::parse_program(&source)?;

    debug!(
        declarations = program.declarations.len(),
        statements = program.statements.len(),
        "running checker"
    );
    let errors = choco_check::check_program(&mut program);

    if config.emit_ast {
        let value = json::program_to_json(&program);
        let text = serde_json::to_string_pretty(&value).expect("json serialization is infallible");
        write_output(config, &text)?;
    } else if !errors.is_empty() {
        let report = format_diagnostics(&config.input, &errors);
        write_output(config, &report)?;
    }

    if errors.is_empty() {
        Ok(Outcome::Clean)
    } else {
        Ok(Outcome::HadErrors(errors.len()))
    }
}

fn write_output(config: &Config, text: &str) -> Result<(), DriverError> {
    match &config.output {
        Some(path) => fs::write(path, text).map_err(|e| DriverError::WriteOutput(path.clone(), e)),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn format_diagnostics(path: &std::path::Path, errors: &[choco_ast::ErrorEntry]) -> String {
    errors
        .iter()
        .map(|e| format!("{}:{}:{}: {}", path.display(), e.location.line, e.location.column, e.message))
        .collect::<Vec<_>>()
        .join("\n")
}
