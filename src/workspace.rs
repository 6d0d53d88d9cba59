//! The staging and analysis workflow behind both the TUI and the CLI.
//!
//! A `Workspace` owns the staging store, the status channel, the shared busy
//! flag and whatever results are currently displayed. Every user action is a
//! method that runs to completion: it may mutate the store, replace the
//! displayed lists and overwrite the status.
//!
//! Requests to the scoring service are split in three steps so the caller
//! decides where the I/O runs:
//!
//! 1. `begin_analyze` / `begin_suggest` validate, enter the busy state and
//!    hand back a [`ServiceRequest`].
//! 2. [`ServiceRequest::send`] talks to a [`ScoringService`].
//! 3. `finish` leaves the busy state and applies the [`ServiceOutcome`].

use tracing::{debug, info, warn};

use crate::client::{AnalyzeResponse, ScoringService, ServiceError, SuggestResponse};
use crate::fields::DEFAULT_STRATEGY;
use crate::intake::{parse_bulk_json, IntakeError, ManualEntry, SAMPLE_TASKS_JSON};
use crate::render::{
    render_results, render_suggestions, staged_entries, Rendered, SuggestionRow, TaskRow,
};
use crate::staging::StagingStore;
use crate::status::StatusChannel;
use crate::task::{ResultEntry, ScoredTask, Suggestion, TaskRecord};

/// Work to perform against the scoring service.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceRequest {
    Analyze {
        strategy: String,
        tasks: Vec<TaskRecord>,
    },
    Suggest,
}

/// Completion of a [`ServiceRequest`].
#[derive(Debug)]
pub enum ServiceOutcome {
    Analyzed(Result<AnalyzeResponse, ServiceError>),
    Suggested(Result<SuggestResponse, ServiceError>),
}

impl ServiceRequest {
    /// Perform the request. Runs to completion; there is no cancellation.
    pub async fn send<S: ScoringService + ?Sized>(self, service: &S) -> ServiceOutcome {
        match self {
            ServiceRequest::Analyze { strategy, tasks } => {
                ServiceOutcome::Analyzed(service.analyze(&strategy, &tasks).await)
            }
            ServiceRequest::Suggest => ServiceOutcome::Suggested(service.suggest().await),
        }
    }
}

/// Staging store, status line and displayed results for one session.
#[derive(Debug)]
pub struct Workspace {
    store: StagingStore,
    status: StatusChannel,
    busy: bool,
    strategy: String,
    results: Option<Vec<ResultEntry>>,
    suggestions: Option<Vec<Suggestion>>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(DEFAULT_STRATEGY)
    }
}

impl Workspace {
    /// Create an empty workspace. A blank strategy falls back to the default.
    pub fn new(strategy: &str) -> Self {
        let mut ws = Workspace {
            store: StagingStore::new(),
            status: StatusChannel::default(),
            busy: false,
            strategy: String::new(),
            results: None,
            suggestions: None,
        };
        ws.set_strategy(strategy);
        ws
    }

    pub fn store(&self) -> &StagingStore {
        &self.store
    }

    pub fn status(&self) -> &StatusChannel {
        &self.status
    }

    /// True while an analyze or suggest request is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn set_strategy(&mut self, strategy: &str) {
        let strategy = strategy.trim();
        self.strategy = if strategy.is_empty() {
            DEFAULT_STRATEGY.to_string()
        } else {
            strategy.to_string()
        };
    }

    /// Rows for the results panel.
    pub fn result_rows(&self) -> Rendered<TaskRow> {
        render_results(self.results.as_deref())
    }

    /// Rows for the suggestions panel.
    pub fn suggestion_rows(&self) -> Rendered<SuggestionRow> {
        render_suggestions(self.suggestions.as_deref())
    }

    /// Stage one task from the manual-entry form.
    ///
    /// On success the form is reset to its defaults and the staged list is
    /// redisplayed as not analyzed. Returns whether a task was added.
    pub fn add_manual(&mut self, form: &mut ManualEntry) -> bool {
        let record = match self.store.next_id() {
            Some(id) => form.to_record(id),
            None => Err(IntakeError::IdsExhausted(self.store.max_id().unwrap_or(i64::MAX))),
        };
        match record {
            Ok(record) => {
                let title = record.title.clone();
                debug!(id = record.id, %title, "staging manual task");
                self.store.add(record);
                self.status.info(format!("Added task \"{title}\""));
                *form = ManualEntry::default();
                self.show_staged();
                true
            }
            Err(e) => {
                self.status.error(e.to_string());
                false
            }
        }
    }

    /// Reset the form to its defaults and blank the status line.
    pub fn clear_form(&mut self, form: &mut ManualEntry) {
        *form = ManualEntry::default();
        self.status.clear();
    }

    /// Replace the staged list with tasks parsed from pasted JSON.
    ///
    /// Leaves the store untouched when the text is not a JSON array.
    /// Returns whether the store was replaced.
    pub fn load_bulk(&mut self, text: &str) -> bool {
        match parse_bulk_json(text) {
            Ok(records) => {
                let count = records.len();
                info!(count, "bulk tasks loaded");
                self.store.replace_all(records);
                self.status.info(format!("Loaded {count} tasks"));
                self.show_staged();
                true
            }
            Err(e) => {
                self.status.error(format!("Invalid JSON: {e}"));
                false
            }
        }
    }

    /// Fill a paste buffer with the sample task list. The store is untouched.
    pub fn load_sample(&mut self, buffer: &mut String) {
        buffer.clear();
        buffer.push_str(SAMPLE_TASKS_JSON);
        self.status.info("Sample tasks pasted; load them to stage");
    }

    fn show_staged(&mut self) {
        self.results = Some(staged_entries(self.store.snapshot()));
    }

    /// Start an analysis of the staged tasks.
    ///
    /// Returns `None` without entering the busy state when another request is
    /// in flight or nothing is staged.
    pub fn begin_analyze(&mut self) -> Option<ServiceRequest> {
        if self.busy {
            debug!("analyze ignored while busy");
            return None;
        }
        if self.store.is_empty() {
            self.status.error("No tasks to analyze. Add or load tasks first.");
            return None;
        }
        self.busy = true;
        info!(strategy = %self.strategy, count = self.store.len(), "analyze started");
        Some(ServiceRequest::Analyze {
            strategy: self.strategy.clone(),
            tasks: self.store.snapshot().to_vec(),
        })
    }

    /// Start fetching suggestions. `None` while another request is in flight.
    pub fn begin_suggest(&mut self) -> Option<ServiceRequest> {
        if self.busy {
            debug!("suggest ignored while busy");
            return None;
        }
        self.busy = true;
        info!("suggest started");
        Some(ServiceRequest::Suggest)
    }

    /// Leave the busy state and apply a request's outcome.
    ///
    /// Failures keep whatever was displayed before.
    pub fn finish(&mut self, outcome: ServiceOutcome) {
        self.busy = false;
        match outcome {
            ServiceOutcome::Analyzed(Ok(response)) => {
                let count = response.tasks.len();
                self.results = Some(response.tasks.into_iter().map(ResultEntry::Scored).collect());
                self.status.info(format!("Analyzed {count} tasks ({})", self.strategy));
            }
            ServiceOutcome::Analyzed(Err(e)) => {
                warn!(error = %e, "analyze failed");
                self.status.error(format!("Analysis failed: {e}"));
            }
            ServiceOutcome::Suggested(Ok(response)) => {
                let count = response.suggestions.len();
                self.suggestions = Some(response.suggestions);
                self.status.info(format!("Loaded {count} suggestions"));
            }
            ServiceOutcome::Suggested(Err(e)) => {
                warn!(error = %e, "suggest failed");
                self.status.error(format!("Suggestions failed: {e}"));
            }
        }
    }

    /// Analyze inline: begin, await the service, finish.
    pub async fn analyze<S: ScoringService + ?Sized>(&mut self, service: &S) {
        if let Some(request) = self.begin_analyze() {
            let outcome = request.send(service).await;
            self.finish(outcome);
        }
    }

    /// Fetch suggestions inline: begin, await the service, finish.
    pub async fn suggest<S: ScoringService + ?Sized>(&mut self, service: &S) {
        if let Some(request) = self.begin_suggest() {
            let outcome = request.send(service).await;
            self.finish(outcome);
        }
    }

    /// Scored tasks currently displayed, if the last analysis succeeded.
    pub fn scored_tasks(&self) -> Vec<&ScoredTask> {
        self.results
            .iter()
            .flatten()
            .filter_map(|entry| match entry {
                ResultEntry::Scored(task) => Some(task),
                ResultEntry::Staged(_) => None,
            })
            .collect()
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        self.suggestions.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ServerDetail;
    use crate::fields::PriorityBand;
    use crate::render::{NO_RESULTS, STAGED_MARKER};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted in-memory service; each call pops the next canned reply.
    #[derive(Default)]
    struct ScriptedService {
        analyze_replies: Mutex<VecDeque<Result<AnalyzeResponse, ServiceError>>>,
        suggest_replies: Mutex<VecDeque<Result<SuggestResponse, ServiceError>>>,
        calls: AtomicUsize,
        last_strategy: Mutex<Option<String>>,
        last_tasks: Mutex<Vec<TaskRecord>>,
    }

    impl ScriptedService {
        fn with_analyze(reply: Result<AnalyzeResponse, ServiceError>) -> Self {
            let svc = Self::default();
            svc.analyze_replies.lock().unwrap().push_back(reply);
            svc
        }

        fn with_suggest(reply: Result<SuggestResponse, ServiceError>) -> Self {
            let svc = Self::default();
            svc.suggest_replies.lock().unwrap().push_back(reply);
            svc
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ScoringService for ScriptedService {
        async fn analyze(
            &self,
            strategy: &str,
            tasks: &[TaskRecord],
        ) -> Result<AnalyzeResponse, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_strategy.lock().unwrap() = Some(strategy.to_string());
            *self.last_tasks.lock().unwrap() = tasks.to_vec();
            self.analyze_replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected analyze call")
        }

        async fn suggest(&self) -> Result<SuggestResponse, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.suggest_replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected suggest call")
        }
    }

    fn titled(title: &str) -> ManualEntry {
        ManualEntry {
            title: title.to_string(),
            ..ManualEntry::default()
        }
    }

    fn scored(title: &str, score: f64) -> ScoredTask {
        ScoredTask {
            title: Some(title.to_string()),
            score: Some(score),
            explanation: Some("weighted".to_string()),
            ..ScoredTask::default()
        }
    }

    fn result_rows(ws: &Workspace) -> Vec<TaskRow> {
        match ws.result_rows() {
            Rendered::Rows(rows) => rows,
            Rendered::Placeholder(p) => panic!("unexpected placeholder {p}"),
        }
    }

    #[test]
    fn manual_add_appends_with_fresh_id_and_resets_form() {
        let mut ws = Workspace::default();
        ws.load_bulk(r#"[{"id": 4}, {"id": 2}]"#);

        let mut form = ManualEntry {
            title: "Write docs".into(),
            estimated_hours: "3".into(),
            importance: "9".into(),
            dependencies: "4,2".into(),
            ..ManualEntry::default()
        };
        assert!(ws.add_manual(&mut form));

        assert_eq!(ws.store().len(), 3);
        let added = ws.store().snapshot().last().unwrap();
        assert_eq!(added.id, 5);
        assert_eq!(added.dependencies, vec![4, 2]);
        assert_eq!(form, ManualEntry::default());
        assert!(!ws.status().is_error());
        assert!(ws.status().message().contains("Write docs"));
    }

    #[test]
    fn manual_add_on_empty_store_starts_at_one() {
        let mut ws = Workspace::default();
        assert!(ws.add_manual(&mut titled("First")));
        assert_eq!(ws.store().snapshot()[0].id, 1);
    }

    #[test]
    fn blank_title_leaves_store_and_form_untouched() {
        let mut ws = Workspace::default();
        ws.add_manual(&mut titled("Keep"));
        let mut form = ManualEntry {
            title: "   ".into(),
            importance: "8".into(),
            ..ManualEntry::default()
        };
        assert!(!ws.add_manual(&mut form));
        assert_eq!(ws.store().len(), 1);
        assert_eq!(form.importance, "8");
        assert!(ws.status().is_error());
    }

    #[test]
    fn manual_add_after_the_largest_id_reports_instead_of_wrapping() {
        let mut ws = Workspace::default();
        assert!(ws.load_bulk(r#"[{"id": 9223372036854775807, "title": "last"}]"#));
        let mut form = titled("next");
        assert!(!ws.add_manual(&mut form));
        assert_eq!(ws.store().len(), 1);
        assert_eq!(form.title, "next");
        assert!(ws.status().is_error());
        assert!(ws.status().message().starts_with("No task id left"));
    }

    #[test]
    fn clear_form_resets_fields_and_blanks_status() {
        let mut ws = Workspace::default();
        ws.add_manual(&mut titled("   "));
        assert!(ws.status().is_error());
        let mut form = ManualEntry {
            title: "Draft".into(),
            importance: "9".into(),
            ..ManualEntry::default()
        };
        ws.clear_form(&mut form);
        assert_eq!(form, ManualEntry::default());
        assert_eq!(ws.status().message(), "");
        assert!(!ws.status().is_error());
        assert!(ws.store().is_empty());
    }

    #[test]
    fn staging_redisplays_every_task_as_not_analyzed() {
        let mut ws = Workspace::default();
        ws.add_manual(&mut titled("One"));
        ws.add_manual(&mut titled("Two"));
        let rows = result_rows(&ws);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.band.is_none() && r.explanation == STAGED_MARKER));
    }

    #[test]
    fn bulk_load_replaces_store_and_reports_count() {
        let mut ws = Workspace::default();
        ws.add_manual(&mut titled("Old"));
        assert!(ws.load_bulk(r#"[{"title":"A"},{"title":"B","id":5}]"#));
        let ids: Vec<i64> = ws.store().snapshot().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 5]);
        assert_eq!(ws.status().message(), "Loaded 2 tasks");
    }

    #[test]
    fn bulk_load_keeps_duplicate_ids() {
        let mut ws = Workspace::default();
        ws.load_bulk(r#"[{"id":3},{"id":3}]"#);
        assert_eq!(ws.store().len(), 2);
    }

    #[test]
    fn invalid_bulk_input_keeps_store() {
        let mut ws = Workspace::default();
        ws.add_manual(&mut titled("Stay"));
        for text in ["not json", "{}", ""] {
            assert!(!ws.load_bulk(text));
            assert_eq!(ws.store().len(), 1);
            assert!(ws.status().is_error());
            assert!(ws.status().message().starts_with("Invalid JSON"));
        }
    }

    #[test]
    fn sample_loader_only_touches_the_buffer() {
        let mut ws = Workspace::default();
        let mut buffer = "old text".to_string();
        ws.load_sample(&mut buffer);
        assert_eq!(buffer, SAMPLE_TASKS_JSON);
        assert!(ws.store().is_empty());
    }

    #[tokio::test]
    async fn analyze_on_empty_store_never_calls_service() {
        let svc = ScriptedService::default();
        let mut ws = Workspace::default();
        ws.analyze(&svc).await;
        assert_eq!(svc.calls(), 0);
        assert!(!ws.is_busy());
        assert!(ws.status().is_error());
    }

    #[test]
    fn begin_analyze_sets_busy_and_blocks_second_request() {
        let mut ws = Workspace::default();
        ws.add_manual(&mut titled("A"));
        let request = ws.begin_analyze();
        assert!(matches!(request, Some(ServiceRequest::Analyze { .. })));
        assert!(ws.is_busy());
        assert_eq!(ws.begin_suggest(), None);
        assert_eq!(ws.begin_analyze(), None);

        ws.finish(ServiceOutcome::Analyzed(Ok(AnalyzeResponse::default())));
        assert!(!ws.is_busy());
        assert!(ws.begin_suggest().is_some());
    }

    #[tokio::test]
    async fn analyze_sends_snapshot_and_strategy_then_renders() {
        let svc = ScriptedService::with_analyze(Ok(AnalyzeResponse {
            tasks: vec![scored("A", 82.0), scored("B", 41.5)],
        }));
        let mut ws = Workspace::new("high_impact");
        ws.load_bulk(r#"[{"title":"A"},{"title":"B"}]"#);

        ws.analyze(&svc).await;

        assert_eq!(svc.last_strategy.lock().unwrap().as_deref(), Some("high_impact"));
        assert_eq!(svc.last_tasks.lock().unwrap().len(), 2);
        assert!(!ws.is_busy());
        assert_eq!(ws.status().message(), "Analyzed 2 tasks (high_impact)");
        let bands: Vec<_> = result_rows(&ws).iter().map(|r| r.band).collect();
        assert_eq!(bands, vec![Some(PriorityBand::High), Some(PriorityBand::Medium)]);
    }

    #[tokio::test]
    async fn blank_strategy_falls_back_to_default() {
        let svc = ScriptedService::with_analyze(Ok(AnalyzeResponse::default()));
        let mut ws = Workspace::new("  ");
        ws.add_manual(&mut titled("A"));
        ws.analyze(&svc).await;
        assert_eq!(svc.last_strategy.lock().unwrap().as_deref(), Some(DEFAULT_STRATEGY));
    }

    #[tokio::test]
    async fn empty_analysis_shows_placeholder() {
        let svc = ScriptedService::with_analyze(Ok(AnalyzeResponse::default()));
        let mut ws = Workspace::default();
        ws.add_manual(&mut titled("A"));
        ws.analyze(&svc).await;
        assert_eq!(ws.result_rows(), Rendered::Placeholder(NO_RESULTS));
        assert!(!ws.status().is_error());
    }

    #[tokio::test]
    async fn transport_failure_keeps_previous_results() {
        let svc = ScriptedService::default();
        svc.analyze_replies
            .lock()
            .unwrap()
            .push_back(Ok(AnalyzeResponse { tasks: vec![scored("A", 75.0)] }));
        svc.analyze_replies
            .lock()
            .unwrap()
            .push_back(Err(ServiceError::Transport("connection refused".into())));

        let mut ws = Workspace::default();
        ws.add_manual(&mut titled("A"));
        ws.analyze(&svc).await;
        let before = ws.result_rows();

        ws.analyze(&svc).await;

        assert_eq!(ws.result_rows(), before);
        assert!(!ws.is_busy());
        assert!(ws.status().is_error());
        assert_eq!(ws.status().message(), "Analysis failed: connection refused");
    }

    #[tokio::test]
    async fn server_errors_report_detail_or_generic_text() {
        let svc = ScriptedService::default();
        svc.analyze_replies.lock().unwrap().push_back(Err(ServiceError::Server {
            status: 400,
            detail: ServerDetail::Detail("Circular dependency detected".into()),
        }));
        svc.analyze_replies.lock().unwrap().push_back(Err(ServiceError::Server {
            status: 500,
            detail: ServerDetail::Generic,
        }));
        let mut ws = Workspace::default();
        ws.add_manual(&mut titled("A"));

        ws.analyze(&svc).await;
        assert_eq!(ws.status().message(), "Analysis failed: Circular dependency detected");
        ws.analyze(&svc).await;
        assert_eq!(ws.status().message(), "Analysis failed: Server error");
    }

    #[tokio::test]
    async fn suggest_renders_in_order_without_store_precondition() {
        let svc = ScriptedService::with_suggest(Ok(SuggestResponse {
            suggestions: vec![
                Suggestion {
                    title: Some("First".into()),
                    score: Some(90.0),
                    why: Some("Due tomorrow".into()),
                    ..Suggestion::default()
                },
                Suggestion {
                    title: Some("Second".into()),
                    ..Suggestion::default()
                },
            ],
        }));
        let mut ws = Workspace::default();
        ws.suggest(&svc).await;

        let Rendered::Rows(rows) = ws.suggestion_rows() else {
            panic!("expected suggestions");
        };
        assert_eq!(rows[0].title, "First");
        assert_eq!(rows[1].score, "-");
        assert_eq!(ws.status().message(), "Loaded 2 suggestions");
        assert!(ws.store().is_empty());
    }

    #[tokio::test]
    async fn suggest_failure_clears_busy_and_reports() {
        let svc = ScriptedService::with_suggest(Err(ServiceError::Server {
            status: 400,
            detail: ServerDetail::Detail("No analysis available.".into()),
        }));
        let mut ws = Workspace::default();
        ws.suggest(&svc).await;
        assert!(!ws.is_busy());
        assert!(ws.status().is_error());
        assert_eq!(ws.status().message(), "Suggestions failed: No analysis available.");
    }
}
