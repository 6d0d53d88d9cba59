//! Input adapters that turn user input into task records.
//!
//! Two independent producers feed the staging store: the manual-entry form
//! (one validated record at a time) and pasted bulk JSON (a whole list,
//! coerced best-effort). Both report failures as `IntakeError`.

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde_json::Value;
use thiserror::Error;

use crate::task::{TaskRecord, DEFAULT_ESTIMATED_HOURS, DEFAULT_IMPORTANCE};

/// Illustrative bulk input offered by the sample loader.
pub const SAMPLE_TASKS_JSON: &str = r#"[
  {
    "id": 1,
    "title": "Fix login bug",
    "due_date": "2025-11-30",
    "estimated_hours": 3,
    "importance": 8,
    "dependencies": []
  },
  {
    "id": 2,
    "title": "Write release notes",
    "due_date": "2025-12-05",
    "estimated_hours": 1,
    "importance": 5,
    "dependencies": [1]
  },
  {
    "id": 3,
    "title": "Refactor billing module",
    "due_date": null,
    "estimated_hours": 8,
    "importance": 6,
    "dependencies": []
  }
]"#;

/// Reasons an input adapter refuses its input.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Title is required")]
    MissingTitle,
    #[error("no JSON provided")]
    Empty,
    #[error("{0}")]
    Syntax(#[from] serde_json::Error),
    #[error("expected a JSON array of tasks")]
    NotAnArray,
    #[error("No task id left after {0}; load a list with smaller ids")]
    IdsExhausted(i64),
}

/// Raw text of the five manual-entry form fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualEntry {
    pub title: String,
    pub due_date: String,
    pub estimated_hours: String,
    pub importance: String,
    pub dependencies: String,
}

impl Default for ManualEntry {
    /// The form's cleared state.
    fn default() -> Self {
        Self {
            title: String::new(),
            due_date: String::new(),
            estimated_hours: "1".to_string(),
            importance: "5".to_string(),
            dependencies: String::new(),
        }
    }
}

impl ManualEntry {
    /// Validate the form and build a record with the given id.
    pub fn to_record(&self, id: i64) -> Result<TaskRecord, IntakeError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(IntakeError::MissingTitle);
        }

        let due = self.due_date.trim();
        let due_date = if due.is_empty() {
            None
        } else {
            // Unrecognised text goes through untouched; the service judges it.
            Some(
                parse_due_input(due)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| due.to_string()),
            )
        };

        // Zero and unreadable values fall back to the form defaults.
        let estimated_hours = leading_number(&self.estimated_hours)
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(DEFAULT_ESTIMATED_HOURS);

        let importance = leading_integer(&self.importance)
            .filter(|i| *i > 0)
            .unwrap_or(DEFAULT_IMPORTANCE);

        Ok(TaskRecord {
            id,
            title: title.to_string(),
            due_date,
            estimated_hours,
            importance,
            dependencies: parse_dependency_list(&self.dependencies),
        })
    }
}

/// Split a comma-separated id list, dropping tokens that do not start with
/// an integer.
pub fn parse_dependency_list(s: &str) -> Vec<i64> {
    s.split(',').filter_map(leading_integer).collect()
}

/// Length of the optional sign plus the run of ASCII digits at the start.
fn signed_digits_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    sign + bytes[sign..].iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Integer at the start of `s`, ignoring anything after it
/// ("7.5" is 7, "12 tasks" is 12).
pub fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    s[..signed_digits_len(s)].parse().ok()
}

/// Decimal number at the start of `s`, ignoring anything after it
/// ("2h" is 2, "1.5 hours" is 1.5).
pub fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = signed_digits_len(s);
    if s.as_bytes().get(end) == Some(&b'.') {
        end += 1 + s.as_bytes()[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
    }
    if !s[..end].bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s[..end].parse().ok()
}

/// Parse pasted text into records, one per array element.
///
/// Element ids default to their 1-based position. Duplicate ids in the input
/// are kept as separate records.
pub fn parse_bulk_json(text: &str) -> Result<Vec<TaskRecord>, IntakeError> {
    if text.trim().is_empty() {
        return Err(IntakeError::Empty);
    }
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(items
            .iter()
            .enumerate()
            .map(|(i, raw)| TaskRecord::from_raw(raw, i + 1))
            .collect()),
        _ => Err(IntakeError::NotAnArray),
    }
}

/// Parse human-readable due date input relative to the local date.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday", "next monday", "this friday", "fri"
/// - "end of week" / "eow", "end of month" / "eom", "weekend"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD"
pub fn parse_due_input(s: &str) -> Option<NaiveDate> {
    parse_due_input_from(s, Local::now().date_naive())
}

/// Same as [`parse_due_input`], anchored on an explicit `today`.
pub fn parse_due_input_from(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let days_from_monday = today.weekday().num_days_from_monday() as i64;

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => return Some(today + Duration::days(6 - days_from_monday)),
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            return NaiveDate::from_ymd_opt(year, month, 1).map(|d| d - Duration::days(1));
        }
        "this weekend" | "weekend" => {
            return Some(today + Duration::days((5 - days_from_monday).rem_euclid(7)));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        let unit_start = rest.char_indices().last().map_or(0, |(i, _)| i);
        let (amount, unit) = rest.split_at(unit_start);
        if let Ok(n) = amount.trim().parse::<i64>() {
            match unit {
                "d" => return Some(today + Duration::days(n)),
                "w" => return Some(today + Duration::weeks(n)),
                // Approximate: 30 days per month
                "m" => return Some(today + Duration::days(n * 30)),
                _ => {}
            }
        }
    }

    let (next_week, day) = if let Some(d) = s.strip_prefix("next ") {
        (true, d)
    } else if let Some(d) = s.strip_prefix("this ") {
        (false, d)
    } else {
        (false, s.as_str())
    };
    if let Some(target) = weekday_index(day) {
        let ahead = (target - days_from_monday).rem_euclid(7);
        let ahead = if next_week { ahead + 7 } else { ahead };
        return Some(today + Duration::days(ahead));
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

fn weekday_index(name: &str) -> Option<i64> {
    let idx = match name {
        "monday" | "mon" => 0,
        "tuesday" | "tue" => 1,
        "wednesday" | "wed" => 2,
        "thursday" | "thu" => 3,
        "friday" | "fri" => 4,
        "saturday" | "sat" => 5,
        "sunday" | "sun" => 6,
        _ => return None,
    };
    Some(idx)
}
