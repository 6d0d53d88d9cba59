//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns a [`Workspace`], routes
//! key presses to the form, the paste buffer and the workspace actions, and
//! renders every panel. Service requests run on the tokio runtime; their
//! outcomes come back over a channel and are applied on the UI thread.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::client::ScoringService;
use crate::fields::next_strategy;
use crate::render::Rendered;
use crate::tui::{
    colors::{band_color, DARK_PURPLE, DARK_RED, GOLD},
    enums::{AppState, Focus},
    task_form::{TaskForm, FIELD_LABELS},
    utils::centered_rect,
};
use crate::workspace::{ServiceOutcome, ServiceRequest, Workspace};

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    focus: Focus,
    workspace: Workspace,
    form: TaskForm,
    paste: String,
    server: String,
    service: Arc<dyn ScoringService>,
    runtime: Handle,
    outcome_tx: UnboundedSender<ServiceOutcome>,
    outcome_rx: UnboundedReceiver<ServiceOutcome>,
    results_state: TableState,
}

impl App {
    pub fn new(
        runtime: Handle,
        service: Arc<dyn ScoringService>,
        server: &str,
        strategy: &str,
    ) -> Self {
        let (outcome_tx, outcome_rx) = unbounded_channel();
        Self {
            state: AppState::Workspace,
            focus: Focus::Form,
            workspace: Workspace::new(strategy),
            form: TaskForm::default(),
            paste: String::new(),
            server: server.to_string(),
            service,
            runtime,
            outcome_tx,
            outcome_rx,
            results_state: TableState::default(),
        }
    }

    /// Run a request on the runtime and post its outcome back to the UI.
    fn dispatch(&self, request: ServiceRequest) {
        let service = Arc::clone(&self.service);
        let tx = self.outcome_tx.clone();
        self.runtime.spawn(async move {
            let outcome = request.send(service.as_ref()).await;
            if tx.send(outcome).is_err() {
                debug!("outcome dropped, UI already closed");
            }
        });
    }

    /// Apply every outcome that has arrived since the last tick.
    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.workspace.finish(outcome);
            self.results_state.select(None);
        }
    }

    fn trigger_analyze(&mut self) {
        if let Some(request) = self.workspace.begin_analyze() {
            self.dispatch(request);
        }
    }

    fn trigger_suggest(&mut self) {
        if let Some(request) = self.workspace.begin_suggest() {
            self.dispatch(request);
        }
    }

    fn add_task(&mut self) {
        let mut entry = self.form.to_entry();
        if self.workspace.add_manual(&mut entry) {
            self.form = TaskForm::from_entry(&entry);
            self.results_state.select(None);
        }
    }

    fn clear_form(&mut self) {
        let mut entry = self.form.to_entry();
        self.workspace.clear_form(&mut entry);
        self.form = TaskForm::from_entry(&entry);
    }

    fn load_paste(&mut self) {
        if self.workspace.load_bulk(&self.paste) {
            self.results_state.select(None);
        }
    }

    fn cycle_strategy(&mut self) {
        let next = next_strategy(self.workspace.strategy());
        self.workspace.set_strategy(next);
    }

    fn select_result(&mut self, down: bool) {
        let len = match self.workspace.result_rows() {
            Rendered::Rows(rows) => rows.len(),
            Rendered::Placeholder(_) => 0,
        };
        if len == 0 {
            self.results_state.select(None);
            return;
        }
        let next = match self.results_state.selected() {
            None => 0,
            Some(i) if down => (i + 1).min(len - 1),
            Some(i) => i.saturating_sub(1),
        };
        self.results_state.select(Some(next));
    }

    /// Handle one key press. Returns true if the application should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.state == AppState::Help {
            self.state = AppState::Workspace;
            return false;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return true,
                KeyCode::Char('a') => self.trigger_analyze(),
                KeyCode::Char('g') => self.trigger_suggest(),
                KeyCode::Char('l') => self.load_paste(),
                KeyCode::Char('e') => self.workspace.load_sample(&mut self.paste),
                KeyCode::Char('u') => self.paste.clear(),
                KeyCode::Char('t') => self.cycle_strategy(),
                KeyCode::Char('r') => self.clear_form(),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::F(1) => self.state = AppState::Help,
            KeyCode::F(2) => self.focus = self.focus.toggle(),
            KeyCode::Up => self.select_result(false),
            KeyCode::Down => self.select_result(true),
            _ => match self.focus {
                Focus::Form => self.handle_form_key(key.code),
                Focus::Paste => self.handle_paste_key(key.code),
            },
        }
        false
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.add_task(),
            KeyCode::Tab => self.form.next_field(),
            KeyCode::BackTab => self.form.prev_field(),
            KeyCode::Backspace => self.form.handle_backspace(),
            KeyCode::Delete => self.form.handle_delete(),
            KeyCode::Left => self.form.handle_left_right(false),
            KeyCode::Right => self.form.handle_left_right(true),
            KeyCode::Home => self.form.handle_home_end(false),
            KeyCode::End => self.form.handle_home_end(true),
            KeyCode::Char(c) => self.form.handle_char(c),
            _ => {}
        }
    }

    fn handle_paste_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.paste.push('\n'),
            KeyCode::Tab => self.paste.push_str("  "),
            KeyCode::Backspace => {
                self.paste.pop();
            }
            KeyCode::Char(c) => self.paste.push(c),
            _ => {}
        }
    }

    /// Bracketed paste goes to whichever widget has focus.
    fn handle_paste_event(&mut self, text: &str) {
        if self.state == AppState::Help {
            return;
        }
        match self.focus {
            Focus::Form => self.form.handle_paste(text),
            Focus::Paste => self.paste.push_str(&text.replace("\r\n", "\n").replace('\r', "\n")),
        }
    }

    /// Poll for and handle terminal events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(self.handle_key(key));
                }
                Event::Paste(text) => self.handle_paste_event(&text),
                _ => {}
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let context = format!(
            "Server: {}  Strategy: {}  Staged: {}",
            self.server,
            self.workspace.strategy(),
            self.workspace.store().len()
        );
        let header_text = vec![Line::from(vec![
            Span::styled("TASK PRIORITIZER", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                context,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ])];
        let header = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_form(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3); 5])
            .split(area);

        let form_focused = self.focus == Focus::Form && self.state == AppState::Workspace;
        for (i, field) in self.form.fields().into_iter().enumerate() {
            let style = if form_focused && field.active {
                Style::default().fg(GOLD)
            } else {
                Style::default()
            };
            let input = Paragraph::new(field.value.as_str()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(FIELD_LABELS[i])
                    .border_style(style),
            );
            f.render_widget(input, chunks[i]);
        }

        if form_focused {
            let chunk = chunks[self.form.current_field];
            let field = self.form.current();
            f.set_cursor_position((chunk.x + field.cursor as u16 + 1, chunk.y + 1));
        }
    }

    fn render_paste(&self, f: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Paste && self.state == AppState::Workspace;
        let style = if focused {
            Style::default().fg(GOLD)
        } else {
            Style::default()
        };

        // Keep the end of the buffer in view.
        let lines: Vec<&str> = self.paste.split('\n').collect();
        let inner_height = area.height.saturating_sub(2) as usize;
        let offset = lines.len().saturating_sub(inner_height.max(1));

        let paragraph = Paragraph::new(self.paste.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Bulk JSON (F2 focus, Ctrl-L load, Ctrl-E sample, Ctrl-U clear)")
                    .border_style(style),
            )
            .scroll((offset as u16, 0));
        f.render_widget(paragraph, area);

        if focused {
            let last = lines.last().map_or(0, |l| l.chars().count());
            let row = lines.len().saturating_sub(1 + offset);
            f.set_cursor_position((area.x + last as u16 + 1, area.y + row as u16 + 1));
        }
    }

    fn render_results(&mut self, f: &mut Frame, area: Rect) {
        let title = format!("Results ({})", self.workspace.strategy());
        let rows = match self.workspace.result_rows() {
            Rendered::Placeholder(text) => {
                self.results_state.select(None);
                render_placeholder(f, area, &title, text);
                return;
            }
            Rendered::Rows(rows) => rows,
        };

        let header_cells = ["Title", "Score", "Priority", "Details", "Explanation"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(DARK_PURPLE).fg(Color::White))
            .height(1);

        let table_rows: Vec<Row> = rows
            .into_iter()
            .map(|row| {
                let color = band_color(row.band);
                let label = row.band_label();
                Row::new(vec![
                    Cell::from(row.title),
                    Cell::from(row.score)
                        .style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
                    Cell::from(label).style(Style::default().fg(color)),
                    Cell::from(row.meta),
                    Cell::from(row.explanation),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(16),    // Title
            Constraint::Length(7),  // Score
            Constraint::Length(8),  // Priority
            Constraint::Length(36), // Details
            Constraint::Min(20),    // Explanation
        ];

        let table = Table::new(table_rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.results_state);
    }

    fn render_suggestions(&self, f: &mut Frame, area: Rect) {
        let title = "Suggestions (Ctrl-G)";
        let rows = match self.workspace.suggestion_rows() {
            Rendered::Placeholder(text) => {
                render_placeholder(f, area, title, text);
                return;
            }
            Rendered::Rows(rows) => rows,
        };

        let mut lines = Vec::new();
        for (i, row) in rows.into_iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}. {}", i + 1, row.title),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(row.score, Style::default().fg(Color::Cyan)),
            ]));
            lines.push(Line::from(format!("   {}", row.why)));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    /// Render the help popup with keyboard shortcuts.
    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(vec![Span::styled("Task Prioritizer Help", bold)]),
            Line::from(""),
            Line::from(vec![Span::styled("Staging:", bold)]),
            Line::from("  Tab/Shift+Tab  Move between form fields"),
            Line::from("  Enter          Add the task in the form"),
            Line::from("  Ctrl+R         Clear the form and the status line"),
            Line::from("  F2             Switch between form and bulk JSON"),
            Line::from("  Ctrl+L         Load the bulk JSON (replaces staged tasks)"),
            Line::from("  Ctrl+E         Paste the sample tasks"),
            Line::from("  Ctrl+U         Clear the bulk JSON"),
            Line::from(""),
            Line::from(vec![Span::styled("Scoring:", bold)]),
            Line::from("  Ctrl+A         Analyze staged tasks"),
            Line::from("  Ctrl+G         Fetch suggestions"),
            Line::from("  Ctrl+T         Cycle strategy"),
            Line::from("  \u{2191}/\u{2193}            Move through results"),
            Line::from(""),
            Line::from(vec![Span::styled("Due Date Formats:", bold)]),
            Line::from("  YYYY-MM-DD     Specific date (e.g., 2025-12-25)"),
            Line::from("  today          Today's date"),
            Line::from("  tomorrow       Tomorrow's date"),
            Line::from("  in 3d / in 2w  Days or weeks from today"),
            Line::from("  next friday    Next weekday by name"),
            Line::from(""),
            Line::from("  F1 Help   Esc/Ctrl+C Quit"),
        ];

        let popup = centered_rect(70, 80, area);
        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help - Press any key to return"),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, popup);
        f.render_widget(paragraph, popup);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status = self.workspace.status();
        let busy = self.workspace.is_busy();

        let mut spans = Vec::new();
        if busy {
            spans.push(Span::styled(
                " Working\u{2026} ",
                Style::default().add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
            ));
        }
        if !status.message().is_empty() {
            spans.push(Span::styled(
                format!(" {} ", status.message()),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        let hints = if busy {
            "| Analyze/Suggest disabled while busy | F1 Help | Esc Quit"
        } else {
            "| Ctrl+A Analyze | Ctrl+G Suggest | Ctrl+T Strategy | F1 Help | Esc Quit"
        };
        spans.push(Span::raw(hints));

        let bg = if status.is_error() { DARK_RED } else { DARK_PURPLE };
        let bar = Paragraph::new(Line::from(spans))
            .style(Style::default().bg(bg).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(bar, area);
    }

    /// Main render function laying out every panel.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(15), Constraint::Min(3)])
            .split(body[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(body[1]);

        self.render_header(f, chunks[0]);
        self.render_form(f, left[0]);
        self.render_paste(f, left[1]);
        self.render_results(f, right[0]);
        self.render_suggestions(f, right[1]);
        self.render_status_bar(f, chunks[2]);

        if self.state == AppState::Help {
            self.render_help(f, chunks[1]);
        }
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.drain_outcomes();
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

fn render_placeholder(f: &mut Frame, area: Rect, title: &str, text: &str) {
    let paragraph = Paragraph::new(text)
        .style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
