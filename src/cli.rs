use std::path::PathBuf;

use clap::Parser;

use crate::client::DEFAULT_SERVER;
use crate::cmd::Commands;
use crate::fields::DEFAULT_STRATEGY;

/// Stage tasks, send them to a prioritization service and review the scores.
/// Runs the terminal workspace when no subcommand is given.
#[derive(Parser)]
#[command(name = "taskprio", version, about = "Task prioritization workspace")]
pub struct Cli {
    /// Base URL of the scoring service (endpoints are <URL>/analyze/ and <URL>/suggest/).
    #[arg(long, global = true, default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Scoring strategy forwarded to the service, e.g. smart_balance | fastest_wins | high_impact | deadline_driven.
    #[arg(long, global = true, default_value = DEFAULT_STRATEGY)]
    pub strategy: String,

    /// Append log output to this file (the UI logs nowhere otherwise).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Log level filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
