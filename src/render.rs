//! Presentation mapping from tasks and service responses to display rows.
//!
//! Everything here is pure: the TUI draws the rows into tables, the CLI
//! prints them with [`print_results`] and [`print_suggestions`].

use crate::fields::PriorityBand;
use crate::task::{ResultEntry, ScoredTask, Suggestion, TaskRecord};

pub const NO_RESULTS: &str = "No results yet. Click Analyze to score your tasks.";
pub const NO_SUGGESTIONS: &str = "No suggestions yet. Run Analyze first.";
pub const NO_TITLE: &str = "(no title)";
pub const NO_DUE_DATE: &str = "No due date";
pub const STAGED_MARKER: &str = "Staged, not analyzed";
/// Band label for rows that have not been scored.
pub const PENDING_LABEL: &str = "Pending";

/// Either a fixed placeholder or one row per input item.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<R> {
    Placeholder(&'static str),
    Rows(Vec<R>),
}

/// A displayed task line.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub title: String,
    pub meta: String,
    pub score: String,
    /// `None` while the task is staged but not analyzed.
    pub band: Option<PriorityBand>,
    pub explanation: String,
}

impl TaskRow {
    pub fn band_label(&self) -> &'static str {
        self.band.map_or(PENDING_LABEL, PriorityBand::label)
    }
}

/// A displayed suggestion line.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRow {
    pub title: String,
    pub score: String,
    pub why: String,
}

/// Priority band for a score; absent scores band as 0.
pub fn priority_band(score: Option<f64>) -> PriorityBand {
    PriorityBand::from_score(score)
}

/// Wrap every staged record as a not-yet-analyzed result entry.
pub fn staged_entries(records: &[TaskRecord]) -> Vec<ResultEntry> {
    records.iter().cloned().map(ResultEntry::Staged).collect()
}

/// Render the results list, or the placeholder when there is nothing to show.
pub fn render_results(list: Option<&[ResultEntry]>) -> Rendered<TaskRow> {
    match list {
        Some(entries) if !entries.is_empty() => {
            Rendered::Rows(entries.iter().map(result_row).collect())
        }
        _ => Rendered::Placeholder(NO_RESULTS),
    }
}

/// Render suggestions in service order, or the placeholder.
pub fn render_suggestions(list: Option<&[Suggestion]>) -> Rendered<SuggestionRow> {
    match list {
        Some(items) if !items.is_empty() => Rendered::Rows(
            items
                .iter()
                .map(|s| SuggestionRow {
                    title: title_or_placeholder(s.title.as_deref()),
                    score: format_score(s.score),
                    why: s.why.clone().unwrap_or_default(),
                })
                .collect(),
        ),
        _ => Rendered::Placeholder(NO_SUGGESTIONS),
    }
}

fn result_row(entry: &ResultEntry) -> TaskRow {
    match entry {
        ResultEntry::Staged(record) => TaskRow {
            title: title_or_placeholder(Some(record.title.as_str())),
            meta: meta_line(
                record.due_date.as_deref(),
                Some(record.estimated_hours),
                Some(record.importance),
            ),
            score: format_score(None),
            band: None,
            explanation: STAGED_MARKER.to_string(),
        },
        ResultEntry::Scored(task) => scored_row(task),
    }
}

fn scored_row(task: &ScoredTask) -> TaskRow {
    TaskRow {
        title: title_or_placeholder(task.title.as_deref()),
        meta: meta_line(task.due_date.as_deref(), task.estimated_hours, task.importance),
        score: format_score(task.score),
        band: Some(priority_band(task.score)),
        explanation: task.explanation.clone().unwrap_or_default(),
    }
}

fn title_or_placeholder(title: Option<&str>) -> String {
    match title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => NO_TITLE.to_string(),
    }
}

fn meta_line(due: Option<&str>, hours: Option<f64>, importance: Option<i64>) -> String {
    let due = match due.filter(|d| !d.is_empty()) {
        Some(d) => format!("Due: {d}"),
        None => NO_DUE_DATE.to_string(),
    };
    format!(
        "{due} | Est: {}h | Importance: {}",
        format_number(hours.unwrap_or(0.0)),
        importance.unwrap_or(5)
    )
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), format_number)
}

/// Format a number without a trailing ".0" for whole values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Print result rows as a plain table.
pub fn print_results(rendered: &Rendered<TaskRow>) {
    let rows = match rendered {
        Rendered::Placeholder(text) => {
            println!("{text}");
            return;
        }
        Rendered::Rows(rows) => rows,
    };
    println!("{:<7} {:<8} {:<32} {}", "Score", "Priority", "Title", "Details");
    for row in rows {
        println!(
            "{:<7} {:<8} {:<32} {}",
            row.score,
            row.band_label(),
            truncate(&row.title, 32),
            row.meta
        );
        if !row.explanation.is_empty() {
            println!("{:<17}{}", "", row.explanation);
        }
    }
}

/// Print suggestion rows, numbered from 1.
pub fn print_suggestions(rendered: &Rendered<SuggestionRow>) {
    match rendered {
        Rendered::Placeholder(text) => println!("{text}"),
        Rendered::Rows(rows) => {
            for (i, row) in rows.iter().enumerate() {
                println!("{}. {} (score {})", i + 1, row.title, row.score);
                if !row.why.is_empty() {
                    println!("   {}", row.why);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scored(score: Option<f64>) -> ResultEntry {
        ResultEntry::Scored(ScoredTask {
            title: Some("Task".into()),
            score,
            ..ScoredTask::default()
        })
    }

    fn rows(rendered: Rendered<TaskRow>) -> Vec<TaskRow> {
        match rendered {
            Rendered::Rows(rows) => rows,
            Rendered::Placeholder(p) => panic!("unexpected placeholder {p}"),
        }
    }

    #[test]
    fn empty_or_absent_results_show_placeholder() {
        assert_eq!(render_results(Some(&[][..])), Rendered::Placeholder(NO_RESULTS));
        assert_eq!(render_results(None), Rendered::Placeholder(NO_RESULTS));
    }

    #[test]
    fn empty_or_absent_suggestions_show_placeholder() {
        assert_eq!(render_suggestions(Some(&[][..])), Rendered::Placeholder(NO_SUGGESTIONS));
        assert_eq!(render_suggestions(None), Rendered::Placeholder(NO_SUGGESTIONS));
    }

    #[test]
    fn scored_rows_keep_input_order_and_band() {
        let entries = vec![scored(Some(70.0)), scored(Some(69.9)), scored(Some(39.9))];
        let bands: Vec<_> = rows(render_results(Some(entries.as_slice())))
            .iter()
            .map(|r| r.band_label())
            .collect();
        assert_eq!(bands, vec!["High", "Medium", "Low"]);
    }

    #[test]
    fn missing_fields_use_display_defaults() {
        let entries = vec![ResultEntry::Scored(ScoredTask::default())];
        let rendered = rows(render_results(Some(entries.as_slice())));
        let row = &rendered[0];
        assert_eq!(row.title, NO_TITLE);
        assert_eq!(row.meta, "No due date | Est: 0h | Importance: 5");
        assert_eq!(row.score, "-");
        assert_eq!(row.band, Some(PriorityBand::Low));
        assert_eq!(row.explanation, "");
    }

    #[test]
    fn due_prefix_only_when_a_date_is_present() {
        let entries = vec![ResultEntry::Scored(ScoredTask {
            due_date: Some("2025-12-01".into()),
            estimated_hours: Some(3.0),
            importance: Some(8),
            ..ScoredTask::default()
        })];
        let rendered = rows(render_results(Some(entries.as_slice())));
        assert_eq!(rendered[0].meta, "Due: 2025-12-01 | Est: 3h | Importance: 8");
    }

    #[test]
    fn staged_rows_are_pending_not_zero() {
        let record = TaskRecord::from_raw(&json!({"title": "Draft", "estimated_hours": 2.5}), 1);
        let entries = staged_entries(&[record]);
        let rendered = rows(render_results(Some(entries.as_slice())));
        let row = &rendered[0];
        assert_eq!(row.title, "Draft");
        assert_eq!(row.meta, "No due date | Est: 2.5h | Importance: 5");
        assert_eq!(row.score, "-");
        assert_eq!(row.band, None);
        assert_eq!(row.band_label(), PENDING_LABEL);
        assert_eq!(row.explanation, STAGED_MARKER);
    }

    #[test]
    fn suggestion_rows_carry_rationale() {
        let items = vec![Suggestion {
            id: Some(1),
            title: Some("Fix login bug".into()),
            score: Some(81.25),
            why: Some("Due soon".into()),
        }];
        let Rendered::Rows(rows) = render_suggestions(Some(items.as_slice())) else {
            panic!("expected rows");
        };
        assert_eq!(
            rows[0],
            SuggestionRow {
                title: "Fix login bug".into(),
                score: "81.25".into(),
                why: "Due soon".into(),
            }
        );
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
