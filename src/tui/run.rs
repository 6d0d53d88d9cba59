//! TUI entry point and terminal setup.

use std::io;
use std::sync::Arc;

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tokio::runtime::Handle;

use crate::client::ScoringService;
use crate::tui::app::App;

/// Initialise and run the terminal workspace until the user quits.
///
/// Service requests are spawned on `runtime`; the UI loop itself stays on the
/// calling thread.
pub fn run_tui(
    runtime: Handle,
    service: Arc<dyn ScoringService>,
    server: &str,
    strategy: &str,
) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(runtime, service, server, strategy);
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}
