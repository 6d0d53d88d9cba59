//! Task data structures and their defaulting rules.
//!
//! This module defines the `TaskRecord` staged locally and sent for scoring,
//! together with the lenient shapes decoded from the scoring service
//! (`ScoredTask`, `Suggestion`).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Hours assumed when none are given or the input is not a number.
pub const DEFAULT_ESTIMATED_HOURS: f64 = 1.0;
/// Importance assumed when none is given or the input is not positive.
pub const DEFAULT_IMPORTANCE: i64 = 5;

/// A staged work item, exactly as it is posted to the analyze endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    pub title: String,
    pub due_date: Option<String>,
    pub estimated_hours: f64,
    pub importance: i64,
    pub dependencies: Vec<i64>,
}

impl TaskRecord {
    /// Build a well-formed record from a JSON value of unknown shape.
    ///
    /// `position` is the 1-based index of the value in its source array and
    /// becomes the id when the value carries no usable one. Never fails: any
    /// field that is missing or cannot be coerced takes its default.
    pub fn from_raw(raw: &Value, position: usize) -> Self {
        let field = |name: &str| raw.as_object().and_then(|o| o.get(name));

        let id = field("id")
            .and_then(coerce_integer)
            .unwrap_or(position as i64);

        let title = field("title")
            .and_then(coerce_text)
            .unwrap_or_else(|| format!("Task {id}"));

        let due_date = field("due_date").and_then(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        });

        let estimated_hours = field("estimated_hours")
            .and_then(coerce_number)
            .filter(|h| *h >= 0.0)
            .unwrap_or(DEFAULT_ESTIMATED_HOURS);

        let importance = field("importance")
            .and_then(coerce_truncated)
            .filter(|i| *i > 0)
            .unwrap_or(DEFAULT_IMPORTANCE);

        let dependencies = match field("dependencies") {
            Some(Value::Array(items)) => items.iter().filter_map(coerce_integer).collect(),
            _ => Vec::new(),
        };

        TaskRecord {
            id,
            title,
            due_date,
            estimated_hours,
            importance,
            dependencies,
        }
    }
}

/// A task as returned by the analyze endpoint.
///
/// Every field is optional on the wire; values of the wrong type decode as
/// absent rather than failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredTask {
    #[serde(default, deserialize_with = "lenient_integer")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub estimated_hours: Option<f64>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub importance: Option<i64>,
    #[serde(default, deserialize_with = "lenient_integer_list")]
    pub dependencies: Vec<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub explanation: Option<String>,
}

/// A ranked suggestion from the suggest endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default, deserialize_with = "lenient_integer")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub why: Option<String>,
}

/// One entry of the results list.
///
/// Staged entries have not been scored yet; they are kept apart from scored
/// ones so a real score of 0 is never confused with "not analyzed".
#[derive(Debug, Clone, PartialEq)]
pub enum ResultEntry {
    Staged(TaskRecord),
    Scored(ScoredTask),
}

/// Integer from a JSON integer, an integral float, or a string holding one.
pub fn coerce_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer with any fractional part dropped ("7.8" becomes 7).
fn coerce_truncated(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

fn coerce_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|f| f.is_finite())
}

fn coerce_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(Value::as_f64))
}

fn lenient_integer<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.as_ref().and_then(coerce_integer))
}

fn lenient_integer_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<i64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items.iter().filter_map(coerce_integer).collect(),
        _ => Vec::new(),
    })
}
