//! # taskprio - Task Prioritization Workspace
//!
//! Stage tasks locally, send them to a remote prioritization service and
//! review the scored results and suggestions, from an interactive terminal
//! user interface (TUI) or from scriptable subcommands.
//!
//! ## Key Features
//!
//! - **Two ways to stage**: a manual-entry form or a pasted JSON array of tasks
//! - **Scoring on demand**: the staged list is posted to `<server>/analyze/` with a strategy
//! - **Suggestions**: the service's top picks from `<server>/suggest/`
//! - **Priority bands**: High (70+), Medium (40+) and Low, colour-coded in the TUI
//! - **Natural due dates**: `tomorrow`, `in 3d`, `next friday` become YYYY-MM-DD
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the workspace against a local service
//! taskprio
//!
//! # Score a task file from the command line
//! taskprio sample > tasks.json
//! taskprio analyze tasks.json --strategy deadline_driven
//!
//! # Ask for the top picks of the last analysis
//! taskprio suggest --json
//! ```
//!
//! Set `RUST_LOG` or `--log-level` to control logging. The TUI logs only when
//! `--log-file` is given.

use clap::Parser;
use tokio::runtime::Builder;

pub mod cli;
pub mod client;
pub mod cmd;
pub mod fields;
pub mod intake;
pub mod logging;
pub mod render;
pub mod staging;
pub mod status;
pub mod task;
pub mod workspace;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use client::{HttpScoringClient, HttpScoringClientConfig};
use cmd::*;
use logging::LogTarget;

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Ui);

    // The TUI owns the terminal, so it never logs to stderr.
    let target = match command {
        Commands::Ui => LogTarget::FileOrSink(cli.log_file.as_deref()),
        _ => LogTarget::Stderr,
    };
    logging::init(&cli.log_level, target);

    // Commands that never touch the service
    match command {
        Commands::Sample => {
            cmd_sample();
            return;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
            return;
        }
        _ => {}
    }

    let runtime = match Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    let client = match HttpScoringClient::new(HttpScoringClientConfig {
        base_url: cli.server,
    }) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {e}");
            std::process::exit(1);
        }
    };

    match command {
        Commands::Ui => cmd_ui(&runtime, client, &cli.strategy),
        Commands::Analyze { input, json } => {
            cmd_analyze(&runtime, &client, &cli.strategy, &input, json)
        }
        Commands::Suggest { json } => cmd_suggest(&runtime, &client, json),
        Commands::Sample | Commands::Completions { .. } => {}
    }
}
