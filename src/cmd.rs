//! Command implementations for the CLI interface.
//!
//! Each handler drives a fresh `Workspace` the same way the terminal UI does,
//! then prints the rendered rows. Failures go to stderr with exit status 1.

use std::io::Read;
use std::sync::Arc;

use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde::Serialize;
use tokio::runtime::Runtime;

use crate::client::{HttpScoringClient, ScoringService};
use crate::intake::SAMPLE_TASKS_JSON;
use crate::render::{print_results, print_suggestions};
use crate::tui::run::run_tui;
use crate::workspace::Workspace;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the terminal workspace (default).
    Ui,

    /// Load a JSON array of tasks and score it.
    Analyze {
        /// JSON file to load, or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,
        /// Print the scored tasks as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the service's top picks from its last analysis.
    Suggest {
        /// Print the suggestions as JSON instead of a list.
        #[arg(long)]
        json: bool,
    },

    /// Print the sample task list, ready to pipe into `analyze`.
    Sample,

    /// Generate shell completion scripts.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal user interface.
pub fn cmd_ui(runtime: &Runtime, client: HttpScoringClient, strategy: &str) {
    let server = client.base_url().to_string();
    let service: Arc<dyn ScoringService> = Arc::new(client);
    if let Err(e) = run_tui(runtime.handle().clone(), service, &server, strategy) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Bulk-load tasks from a file or stdin and print the analysis.
pub fn cmd_analyze(
    runtime: &Runtime,
    client: &HttpScoringClient,
    strategy: &str,
    input: &str,
    json: bool,
) {
    let text = match read_input(input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Failed to read {input}: {e}");
            std::process::exit(1);
        }
    };

    let mut ws = Workspace::new(strategy);
    if !ws.load_bulk(&text) {
        exit_with_status(&ws);
    }
    runtime.block_on(ws.analyze(client));
    if ws.status().is_error() {
        exit_with_status(&ws);
    }

    if json {
        print_json(&ws.scored_tasks());
    } else {
        print_results(&ws.result_rows());
        println!();
        println!("{}", ws.status().message());
    }
}

/// Fetch and print suggestions.
pub fn cmd_suggest(runtime: &Runtime, client: &HttpScoringClient, json: bool) {
    let mut ws = Workspace::default();
    runtime.block_on(ws.suggest(client));
    if ws.status().is_error() {
        exit_with_status(&ws);
    }

    if json {
        print_json(&ws.suggestions());
    } else {
        print_suggestions(&ws.suggestion_rows());
    }
}

/// Print the sample task list.
pub fn cmd_sample() {
    println!("{SAMPLE_TASKS_JSON}");
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

fn read_input(input: &str) -> std::io::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Failed to encode output: {e}");
            std::process::exit(1);
        }
    }
}

fn exit_with_status(ws: &Workspace) -> ! {
    eprintln!("{}", ws.status().message());
    std::process::exit(1);
}
