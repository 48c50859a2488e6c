use std::fmt;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;

use crate::api::DEFAULT_SCORES_PORT;
use crate::records::{ErrorResponse, QueryScope, ScoreRecord, ScoreSubmission, SubmitResponse};

/// Failures talking to the score service. All of them are non-fatal to the
/// game: the host falls back to its cached leaderboards and moves on.
#[derive(Debug)]
pub enum ScoreServiceError {
    Transport(String),
    /// The service refused the submission (validation failure).
    Rejected(String),
    Status(u16),
    Malformed(String),
}

impl fmt::Display for ScoreServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreServiceError::Transport(msg) => write!(f, "score service unreachable: {msg}"),
            ScoreServiceError::Rejected(msg) => write!(f, "score service rejected: {msg}"),
            ScoreServiceError::Status(code) => {
                write!(f, "score service returned unexpected status {code}")
            }
            ScoreServiceError::Malformed(msg) => {
                write!(f, "score service sent a malformed response: {msg}")
            }
        }
    }
}

impl std::error::Error for ScoreServiceError {}

pub fn scope_param(scope: QueryScope) -> &'static str {
    match scope {
        QueryScope::Today => "today",
        QueryScope::Week => "week",
        QueryScope::All => "all",
    }
}

/// HTTP client for the score service.
pub struct ScoreServiceClient {
    base_url: String,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl ScoreServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    pub fn from_env() -> Self {
        let base = std::env::var("BLOCKFALL_SCORES_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{DEFAULT_SCORES_PORT}"));
        Self::new(base)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a finished game, returning the record as stored.
    pub async fn submit(
        &self,
        submission: &ScoreSubmission,
    ) -> Result<ScoreRecord, ScoreServiceError> {
        let body = serde_json::to_vec(submission)
            .map_err(|e| ScoreServiceError::Malformed(e.to_string()))?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("{}/api/scores", self.base_url))
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| ScoreServiceError::Transport(e.to_string()))?;

        let (status, bytes) = self.send(request).await?;
        match status {
            StatusCode::CREATED => {
                let parsed: SubmitResponse = serde_json::from_slice(&bytes)
                    .map_err(|e| ScoreServiceError::Malformed(e.to_string()))?;
                if !parsed.success {
                    return Err(ScoreServiceError::Rejected(
                        "service reported failure".to_string(),
                    ));
                }
                Ok(parsed.score)
            }
            StatusCode::BAD_REQUEST => {
                let message = serde_json::from_slice::<ErrorResponse>(&bytes)
                    .map(|e| e.error)
                    .unwrap_or_else(|_| "submission rejected".to_string());
                Err(ScoreServiceError::Rejected(message))
            }
            other => Err(ScoreServiceError::Status(other.as_u16())),
        }
    }

    /// Fetch the top scores for a scope, best first.
    pub async fn top_scores(
        &self,
        scope: QueryScope,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, ScoreServiceError> {
        let uri = format!(
            "{}/api/scores?type={}&limit={}",
            self.base_url,
            scope_param(scope),
            limit
        );
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Full::default())
            .map_err(|e| ScoreServiceError::Transport(e.to_string()))?;

        let (status, bytes) = self.send(request).await?;
        if status != StatusCode::OK {
            return Err(ScoreServiceError::Status(status.as_u16()));
        }
        serde_json::from_slice(&bytes).map_err(|e| ScoreServiceError::Malformed(e.to_string()))
    }

    async fn send(
        &self,
        request: Request<Full<Bytes>>,
    ) -> Result<(StatusCode, Bytes), ScoreServiceError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ScoreServiceError::Transport(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ScoreServiceError::Transport(e.to_string()))?
            .to_bytes();
        Ok((status, bytes))
    }
}
