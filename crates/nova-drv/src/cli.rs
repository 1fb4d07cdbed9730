use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    #[value(name = "x86_64")]
    X86_64,
    #[value(name = "arm64")]
    Arm64,
}

/// Compiles a single Nova source file to x86-64 GNU-as assembly.
#[derive(Debug, Parser)]
#[command(name = "novac", version, about)]
pub struct Cli {
    /// Nova source file to compile.
    pub input: PathBuf,

    /// Output assembly path.
    #[arg(short, long, default_value = "out.s")]
    pub output: PathBuf,

    /// Target backend. Only x86_64 is implemented.
    #[arg(long, value_enum, default_value = "x86_64")]
    pub target: Target,

    /// Enable debug-level logging.
    #[arg(short, long, global = true, env = "NOVAC_VERBOSE")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_cli_surface() {
        let cli = Cli::parse_from(["novac", "prog.nv"]);
        assert_eq!(cli.output, PathBuf::from("out.s"));
        assert_eq!(cli.target, Target::X86_64);
        assert!(!cli.verbose);
    }

    #[test]
    fn output_and_target_flags_parse() {
        let cli = Cli::parse_from(["novac", "prog.nv", "-o", "a.s", "--target", "arm64"]);
        assert_eq!(cli.output, PathBuf::from("a.s"));
        assert_eq!(cli.target, Target::Arm64);
    }

    #[test]
    fn verbose_flag_parses() {
        let cli = Cli::parse_from(["novac", "prog.nv", "-v"]);
        assert!(cli.verbose);
    }
}
