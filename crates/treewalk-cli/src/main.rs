//! treewalk CLI tool.
//!
//! Usage:
//! ```bash
//! treewalk check [OPTIONS] [PATH]
//! treewalk list-checks
//! treewalk init [--force]
//! ```
//!
//! `check` exits with 1 when violations at or above the failure severity
//! were reported, and with 2 when the run could not start.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use treewalk_checks::Preset;

mod commands;
mod config_resolver;

/// Single-pass AST checker for Rust sources
#[derive(Parser)]
#[command(name = "treewalk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a file or directory tree
    Check {
        /// File or directory to check
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Exclude glob patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Worker threads (0 uses every core, 1 runs sequentially)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Ignore the configured cache file
        #[arg(long)]
        no_cache: bool,

        /// Preset used when no configuration file is found
        #[arg(long, value_enum, default_value = "recommended")]
        preset: PresetArg,
    },

    /// List available checks and presets
    ListChecks,

    /// Write a starter treewalk.toml into the current directory
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for violations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Grouped, human-readable output.
    #[default]
    Text,
    /// One line per violation.
    Compact,
    /// A single JSON document.
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum PresetArg {
    Minimal,
    Recommended,
    Strict,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Minimal => Self::Minimal,
            PresetArg::Recommended => Self::Recommended,
            PresetArg::Strict => Self::Strict,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    // Reports go to stdout, so logs use stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check {
            path,
            format,
            exclude,
            threads,
            no_cache,
            preset,
        } => commands::check::run(&commands::check::CheckArgs {
            path,
            format,
            exclude,
            threads,
            no_cache,
            preset: preset.into(),
            config: cli.config,
        }),
        Commands::ListChecks => {
            commands::list_checks::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(std::path::Path::new("."), force).map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(2)
        }
    }
}
