//! natprint CLI — computes, stores, and compares native project fingerprints.
//!
//! Provides `natprint fingerprint` to build and store a fingerprint,
//! `natprint hash` for the aggregate hash alone, `natprint sources` to inspect
//! the normalized sources, and `natprint diff` to compare a stored fingerprint
//! with another one or with the current project tree.

#![warn(missing_docs)]

mod diff;
mod fingerprint;
mod logging;
mod pipeline;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// natprint — deterministic fingerprints of a project's native surface.
#[derive(Parser, Debug)]
#[command(name = "natprint", version, about = "Native project fingerprinting")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `natprint.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the project fingerprint and print or store it as JSON.
    Fingerprint(FingerprintArgs),
    /// Print the aggregate project hash.
    Hash(ProjectArgs),
    /// Print the normalized sources without hashing them.
    Sources(ProjectArgs),
    /// Compare a stored fingerprint with another one or the current tree.
    Diff(DiffArgs),
}

/// Overrides applied on top of `natprint.toml`.
#[derive(Args, Debug, Default, Clone)]
pub struct OverrideArgs {
    /// Platforms to fingerprint (`android`, `ios`); replaces the configured set.
    #[arg(long, num_args = 1..)]
    pub platform: Vec<String>,

    /// Source-skip flags to add (e.g., `--skip git-ignore`).
    #[arg(long, num_args = 1..)]
    pub skip: Vec<String>,

    /// Extra gitignore-style patterns to exclude.
    #[arg(long, num_args = 1..)]
    pub ignore_path: Vec<String>,

    /// Number of hashing workers.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Record per-file hashes for directory sources.
    #[arg(long)]
    pub debug: bool,

    /// Abort when any collaborator fails.
    #[arg(long)]
    pub fatal_discovery: bool,
}

/// A project root plus option overrides.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project root directory.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Option overrides.
    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Arguments for the `natprint fingerprint` subcommand.
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Project to fingerprint.
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Write the fingerprint to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `natprint diff` subcommand.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Stored fingerprint to compare from.
    pub before: PathBuf,

    /// Stored fingerprint to compare to; the current tree is built if omitted.
    #[arg(conflicts_with = "root")]
    pub after: Option<PathBuf>,

    /// Output format for the diff entries.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Project whose current tree is compared when no AFTER file is given.
    #[command(flatten)]
    pub project: DiffProjectArgs,
}

/// Project arguments for `diff`, where the root is a flag rather than positional.
#[derive(Args, Debug)]
pub struct DiffProjectArgs {
    /// Project root directory.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Option overrides.
    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Output format for diff entries and diagnostics.
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
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    logging::init_logging(cli.quiet, cli.verbose, color);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Fingerprint(ref args) => fingerprint::run(args, &global),
        Command::Hash(ref args) => fingerprint::run_hash(args, &global),
        Command::Sources(ref args) => fingerprint::run_sources(args, &global),
        Command::Diff(ref args) => diff::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(pipeline::EXIT_ERROR);
        }
    }
}
