//! Ember CLI: compile scripts into artifacts and run them.
//!
//! `ember compile` writes the container bytes of a script to a file,
//! `ember run` executes such a file through the cached-artifact path, and
//! `ember eval` compiles and runs a script directly.

#![warn(missing_docs)]

mod compile;
mod eval;
mod pipeline;
mod run;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Ember: precompiled script artifacts.
#[derive(Parser, Debug)]
#[command(name = "ember", version, about = "Ember script artifact tool")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to an `ember.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a script into an artifact file.
    Compile(CompileArgs),
    /// Run an artifact file and print its result.
    Run(RunArgs),
    /// Compile and run a script without producing an artifact.
    Eval(EvalArgs),
}

/// Arguments for `ember compile`.
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Script to compile.
    #[arg(long = "in")]
    pub input: PathBuf,

    /// Where to write the artifact.
    #[arg(long)]
    pub out: PathBuf,

    /// Output format for compile diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for `ember run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Artifact file produced by `ember compile`.
    pub file: PathBuf,
}

/// Arguments for `ember eval`.
#[derive(Parser, Debug)]
pub struct EvalArgs {
    /// Script to run.
    pub file: PathBuf,

    /// Output format for compile diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a config file.
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    tracing::debug!(command = ?cli.command, "ember starting");

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Compile(ref args) => compile::run(args, &global),
        Command::Run(ref args) => run::run(args, &global),
        Command::Eval(ref args) => eval::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the log subscriber. `EMBER_LOG` overrides the level the flags
/// select.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("EMBER_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_level(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_compile() {
        let cli = Cli::parse_from(["ember", "compile", "--in", "app.js", "--out", "app.bin"]);
        match cli.command {
            Command::Compile(ref args) => {
                assert_eq!(args.input, PathBuf::from("app.js"));
                assert_eq!(args.out, PathBuf::from("app.bin"));
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn compile_requires_both_paths() {
        assert!(Cli::try_parse_from(["ember", "compile", "--in", "app.js"]).is_err());
    }

    #[test]
    fn parse_run() {
        let cli = Cli::parse_from(["ember", "run", "app.bin"]);
        match cli.command {
            Command::Run(ref args) => assert_eq!(args.file, PathBuf::from("app.bin")),
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn parse_eval_json() {
        let cli = Cli::parse_from(["ember", "eval", "app.js", "--format", "json"]);
        match cli.command {
            Command::Eval(ref args) => {
                assert_eq!(args.file, PathBuf::from("app.js"));
                assert_eq!(args.format, ReportFormat::Json);
            }
            _ => panic!("expected Eval command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["ember", "--quiet", "--config", "/tmp/ember.toml", "run", "a"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/ember.toml")));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["ember", "eval", "a.js", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn log_levels() {
        assert_eq!(default_level(false, false), "warn");
        assert_eq!(default_level(true, false), "debug");
        assert_eq!(default_level(true, true), "error");
    }
}
