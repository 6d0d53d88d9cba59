//! HTTP client for the remote scoring service.
//!
//! The `ScoringService` trait is the seam the workspace talks to; the
//! `HttpScoringClient` implements it over reqwest. Response decoding is kept
//! in free functions so the error contract is testable without a server.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::task::{ScoredTask, Suggestion, TaskRecord};

/// Base URL used when none is configured.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000/api/tasks";
/// Text shown when a failing response carries no usable detail.
pub const GENERIC_SERVER_ERROR: &str = "Server error";

/// Detail extracted from a non-success response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerDetail {
    /// The body held a `detail` string.
    Detail(String),
    /// The body was missing, not JSON, or had no `detail`.
    Generic,
}

impl std::fmt::Display for ServerDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerDetail::Detail(text) => f.write_str(text),
            ServerDetail::Generic => f.write_str(GENERIC_SERVER_ERROR),
        }
    }
}

/// Scoring service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Transport(String),
    #[error("{detail}")]
    Server { status: u16, detail: ServerDetail },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Success body of the analyze endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tasks: Vec<ScoredTask>,
}

/// Success body of the suggest endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

/// Scoring service trait
#[async_trait]
pub trait ScoringService: Send + Sync {
    /// Score a batch of tasks under the named strategy.
    async fn analyze(
        &self,
        strategy: &str,
        tasks: &[TaskRecord],
    ) -> Result<AnalyzeResponse, ServiceError>;

    /// Fetch ranked suggestions from the last analysis.
    async fn suggest(&self) -> Result<SuggestResponse, ServiceError>;
}

/// HTTP scoring client config
#[derive(Debug, Clone)]
pub struct HttpScoringClientConfig {
    pub base_url: String,
}

impl HttpScoringClientConfig {
    pub fn analyze_url(&self) -> String {
        format!("{}/analyze/", self.base_url.trim_end_matches('/'))
    }

    pub fn suggest_url(&self) -> String {
        format!("{}/suggest/", self.base_url.trim_end_matches('/'))
    }
}

/// Scoring client speaking JSON over HTTP.
pub struct HttpScoringClient {
    client: reqwest::Client,
    config: HttpScoringClientConfig,
}

impl HttpScoringClient {
    pub fn new(config: HttpScoringClientConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Use an already configured reqwest client.
    pub fn with_client(client: reqwest::Client, config: HttpScoringClientConfig) -> Self {
        Self { client, config }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn read(response: reqwest::Response) -> Result<(StatusCode, String), ServiceError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok((status, body))
    }
}

#[async_trait]
impl ScoringService for HttpScoringClient {
    async fn analyze(
        &self,
        strategy: &str,
        tasks: &[TaskRecord],
    ) -> Result<AnalyzeResponse, ServiceError> {
        let url = self.config.analyze_url();
        debug!(%url, strategy, count = tasks.len(), "posting tasks for analysis");
        let response = self
            .client
            .post(&url)
            .query(&[("strategy", strategy)])
            .json(tasks)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        let (status, body) = Self::read(response).await?;
        let parsed = decode_response::<AnalyzeResponse>(status, &body);
        match &parsed {
            Ok(r) => info!(status = status.as_u16(), scored = r.tasks.len(), "analysis received"),
            Err(e) => warn!(status = status.as_u16(), error = %e, "analysis failed"),
        }
        parsed
    }

    async fn suggest(&self) -> Result<SuggestResponse, ServiceError> {
        let url = self.config.suggest_url();
        debug!(%url, "requesting suggestions");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        let (status, body) = Self::read(response).await?;
        let parsed = decode_response::<SuggestResponse>(status, &body);
        match &parsed {
            Ok(r) => info!(
                status = status.as_u16(),
                suggestions = r.suggestions.len(),
                "suggestions received"
            ),
            Err(e) => warn!(status = status.as_u16(), error = %e, "suggestions failed"),
        }
        parsed
    }
}

/// Map a status code and raw body onto the response contract.
///
/// Non-success statuses become `ServiceError::Server` with a best-effort
/// detail. Success bodies must be JSON objects; missing list keys decode as
/// empty lists.
pub fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<T, ServiceError> {
    if !status.is_success() {
        return Err(ServiceError::Server {
            status: status.as_u16(),
            detail: parse_error_detail(body),
        });
    }
    serde_json::from_str(body).map_err(|e| ServiceError::Malformed(e.to_string()))
}

/// Extract the `detail` string from an error body, if there is one.
pub fn parse_error_detail(body: &str) -> ServerDetail {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Some(Value::String(text)),
        }) if !text.trim().is_empty() => ServerDetail::Detail(text),
        _ => ServerDetail::Generic,
    }
}
