//! CLI module for cli-replay
//!
//! Thin `clap` presenter over `cli-replay-core`: a `clap::Parser` entry
//! point plus one dispatch arm per subcommand in `commands`.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use cli_replay_core::error::ReplayError;
use cli_replay_core::report::ReportFormat;
use std::path::PathBuf;

/// `clap`-facing mirror of [`ReportFormat`] — `ValueEnum` can't be derived
/// directly on a type defined in another crate (orphan rule), so the CLI
/// owns this small local enum and converts at the dispatch boundary.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
    Junit,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Junit => ReportFormat::Junit,
        }
    }
}

#[derive(Parser)]
#[command(name = "cli-replay")]
#[command(about = "Scenario-driven CLI replay engine for hermetic integration tests")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Increase verbosity (can be used multiple times: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scenario against a command, verify it, and report the result
    Run {
        /// Path to the scenario file
        scenario: PathBuf,

        /// Session identifier; generated if omitted
        #[arg(long)]
        session: Option<String>,

        /// Command to run under replay, and its arguments
        #[arg(required = true, last = true)]
        command: Vec<String>,

        /// Report format for the post-run verification summary
        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,
    },

    /// Verify an existing session's final state without replaying anything
    Verify {
        /// Path to the scenario file
        scenario: PathBuf,

        /// Session identifier to verify (empty for the sessionless state file)
        #[arg(long, default_value = "")]
        session: String,

        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,
    },

    /// Remove expired session state and intercept directories
    Clean {
        /// Scenario file (single-directory mode) or directory root (with --recursive)
        path: PathBuf,

        /// Walk `path` recursively, cleaning every `.cli-replay/` found
        #[arg(long)]
        recursive: bool,

        /// Override the TTL instead of reading it from the scenario's `session.ttl`
        #[arg(long)]
        ttl: Option<String>,
    },

    /// Load and validate a scenario, printing its flattened step list
    Check {
        /// Path to the scenario file
        scenario: PathBuf,
    },
}

/// Main CLI entry point.
pub fn run_cli() -> Result<(), ReplayError> {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);

    match cli.command {
        Commands::Run {
            scenario,
            session,
            command,
            format,
        } => commands::run::execute(&scenario, session, &command, format.into()),

        Commands::Verify {
            scenario,
            session,
            format,
        } => commands::verify::execute(&scenario, &session, format.into()),

        Commands::Clean {
            path,
            recursive,
            ttl,
        } => commands::clean::execute(&path, recursive, ttl.as_deref()),

        Commands::Check { scenario } => commands::check::execute(&scenario),
    }
}
