//! Command-line driver for the Nova compiler.
//!
//! Owns all filesystem and process-exit concerns; the pipeline crates
//! (`nova-lex`, `nova-par`, `nova-sem`, `nova-gen`) are pure and never
//! touch the outside world.

pub mod cli;
mod error;

pub use cli::{Cli, Target};
pub use error::CompileError;

use std::fs;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the global `tracing` subscriber. Debug-level output when
/// `-v/--verbose` is set, info-level otherwise.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Lexes, parses, type-checks, and generates assembly for `source`. Pure:
/// no filesystem access, matching the core pipeline's batch, single-pass
/// design.
pub fn compile(source: &str) -> Result<String, CompileError> {
    debug!(bytes = source.len(), "lexing");
    let tokens = nova_lex::Lexer::tokenize(source)?;
    debug!(tokens = tokens.len(), "parsing");
    let mut program = nova_par::Parser::parse(tokens)?;
    debug!(functions = program.functions.len(), "type checking");
    nova_sem::check(&mut program)?;
    debug!("generating assembly");
    let asm = nova_gen::generate(&program);
    info!(lines = asm.lines().count(), "compilation finished");
    Ok(asm)
}

/// Runs the full driver: reads `cli.input`, compiles it, writes the
/// result to `cli.output`. Rejects `--target arm64` before touching the
/// pipeline at all, since that backend does not exist.
pub fn run(cli: &Cli) -> Result<(), CompileError> {
    if cli.target == Target::Arm64 {
        return Err(CompileError::UnsupportedTarget(cli.target));
    }
    let source = fs::read_to_string(&cli.input)
        .map_err(|e| CompileError::Io(cli.input.clone(), e))?;
    let asm = compile(&source)?;
    fs::write(&cli.output, asm).map_err(|e| CompileError::Io(cli.output.clone(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_minimal_program() {
        let asm = compile(r#"fn main() { print("hello"); }"#).unwrap();
        assert!(asm.contains(".globl main"));
        assert!(asm.contains("call puts"));
    }

    #[test]
    fn surfaces_a_lex_error() {
        let err = compile("fn main() { let x = @; }").unwrap_err();
        assert!(matches!(err, CompileError::Lex(_)));
    }

    #[test]
    fn surfaces_a_parse_error() {
        let err = compile("fn main( {}").unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
    }

    #[test]
    fn surfaces_a_type_error() {
        let err = compile("fn main() { let x: int = true; }").unwrap_err();
        assert!(matches!(err, CompileError::Type(_)));
    }
}
