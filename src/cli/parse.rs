//! CLI parse: clap types for the cascade harness. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Cascade harness - run reconciliation scenarios and inspect their batches
#[derive(Parser)]
#[command(name = "cascade")]
#[command(about = "Run component reconciliation scenarios and inspect render batches")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the available scenarios
    Scenarios,
    /// Run one scenario, or every scenario with --all
    Run {
        /// Scenario name (see `cascade scenarios`)
        #[arg(required_unless_present = "all")]
        scenario: Option<String>,
        /// Run every scenario
        #[arg(long, conflicts_with = "scenario")]
        all: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
