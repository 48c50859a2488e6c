use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::records::{
    DEFAULT_QUERY_LIMIT, ErrorResponse, Leaderboard, QueryScope, ScoreRecord, ScoreSubmission,
    SubmitResponse,
};
use crate::store::{ScoreStore, StoreError};

pub const DEFAULT_SCORES_PORT: u16 = 4000;

/// Listen address for the score service. An explicit addr wins over a port
/// override; anything unparsable falls back to the default.
pub fn resolve_addr<F>(mut get_env: F) -> SocketAddr
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = get_env("BLOCKFALL_SCORES_ADDR") {
        if let Ok(addr) = raw.parse() {
            return addr;
        }
    }

    let port = get_env("BLOCKFALL_SCORES_PORT")
        .and_then(|raw| raw.parse::<u16>().ok())
        .filter(|&port| port != 0)
        .unwrap_or(DEFAULT_SCORES_PORT);

    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<ScoreStore>>,
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct ScoresQuery {
    /// Scope selector, matching the browser client's `type` parameter.
    #[serde(rename = "type")]
    pub scope: Option<String>,
    pub limit: Option<usize>,
}

async fn list_scores(
    State(state): State<AppState>,
    Query(query): Query<ScoresQuery>,
) -> Json<Vec<ScoreRecord>> {
    let scope = QueryScope::from_param(query.scope.as_deref());
    // Non-positive limits fall back to the default rather than emptying
    // the board.
    let limit = query
        .limit
        .filter(|&limit| limit > 0)
        .unwrap_or(DEFAULT_QUERY_LIMIT);
    let store = state.store.lock().expect("score store mutex poisoned");
    Json(store.query(scope, limit, Utc::now().date_naive()))
}

async fn submit_score(
    State(state): State<AppState>,
    Json(submission): Json<ScoreSubmission>,
) -> Result<(StatusCode, Json<SubmitResponse>), (StatusCode, Json<ErrorResponse>)> {
    let mut store = state.store.lock().expect("score store mutex poisoned");
    match store.append(&submission, Utc::now()) {
        Ok(record) => Ok((
            StatusCode::CREATED,
            Json(SubmitResponse {
                success: true,
                score: record,
            }),
        )),
        Err(StoreError::Rejected(err)) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )),
        Err(StoreError::Io(err)) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("failed to persist score: {err}"),
            }),
        )),
    }
}

/// The score service router. Unrouted methods on `/api/scores` get a 405
/// from the router itself.
pub fn router(store: ScoreStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/scores", get(list_scores).post(submit_score))
        .with_state(AppState {
            store: Arc::new(Mutex::new(store)),
        })
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tower::ServiceExt;

    static PATH_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn unique_store_path(tag: &str) -> PathBuf {
        let n = PATH_COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "blockfall_api_test_{}_{}_{}.json",
            tag,
            std::process::id(),
            n
        ))
    }

    fn test_router(tag: &str) -> (Router, PathBuf) {
        let path = unique_store_path(tag);
        (router(ScoreStore::open(path.clone())), path)
    }

    fn submission_json(username: &str, email: &str, score: u32) -> String {
        serde_json::to_string(&ScoreSubmission {
            username: username.to_string(),
            email: email.to_string(),
            score,
            level: 2,
            lines: 12,
        })
        .unwrap()
    }

    fn post_scores(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/scores")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_responds_ok() {
        let (app, path) = test_router("health");
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn submit_returns_created_with_the_stored_record() {
        let (app, path) = test_router("submit");
        let response = app
            .oneshot(post_scores(submission_json("  ada  ", "ada@example.com", 700)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let parsed: SubmitResponse = body_json(response).await;
        assert!(parsed.success);
        assert_eq!(parsed.score.username, "ada");
        assert_eq!(parsed.score.score, 700);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn submit_rejects_a_blank_username() {
        let (app, path) = test_router("reject");
        let response = app
            .oneshot(post_scores(submission_json("   ", "ada@example.com", 700)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let parsed: ErrorResponse = body_json(response).await;
        assert!(parsed.error.contains("username"));
        assert!(!path.exists());

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn unrouted_methods_get_405() {
        let (app, path) = test_router("methods");
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/scores")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn list_returns_todays_scores_sorted_and_limited() {
        let (app, path) = test_router("list");
        for (i, score) in [300u32, 900, 600].into_iter().enumerate() {
            let response = app
                .clone()
                .oneshot(post_scores(submission_json(
                    &format!("p{i}"),
                    &format!("p{i}@example.com"),
                    score,
                )))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/scores?type=today&limit=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let records: Vec<ScoreRecord> = body_json(response).await;
        let scores: Vec<u32> = records.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![900, 600]);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn zero_limit_falls_back_to_the_default() {
        let (app, path) = test_router("zero_limit");
        let response = app
            .clone()
            .oneshot(post_scores(submission_json("ada", "ada@example.com", 500)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/scores?type=all&limit=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let records: Vec<ScoreRecord> = body_json(response).await;
        assert_eq!(records.len(), 1);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn same_player_same_day_keeps_only_the_latest() {
        let (app, path) = test_router("dedupe");
        for score in [900u32, 200] {
            let response = app
                .clone()
                .oneshot(post_scores(submission_json("ada", "ada@example.com", score)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/scores?type=all")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let records: Vec<ScoreRecord> = body_json(response).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, 200);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn resolve_addr_defaults_to_localhost_4000() {
        let addr = resolve_addr(|_| None);
        assert_eq!(addr, "127.0.0.1:4000".parse().unwrap());
    }

    #[test]
    fn resolve_addr_prefers_the_explicit_addr() {
        let addr = resolve_addr(|key| match key {
            "BLOCKFALL_SCORES_ADDR" => Some("0.0.0.0:9000".to_string()),
            "BLOCKFALL_SCORES_PORT" => Some("5000".to_string()),
            _ => None,
        });
        assert_eq!(addr, "0.0.0.0:9000".parse().unwrap());
    }

    #[test]
    fn resolve_addr_uses_the_port_override() {
        let addr = resolve_addr(|key| match key {
            "BLOCKFALL_SCORES_PORT" => Some("5000".to_string()),
            _ => None,
        });
        assert_eq!(addr, "127.0.0.1:5000".parse().unwrap());
    }

    #[test]
    fn resolve_addr_ignores_invalid_overrides() {
        let addr = resolve_addr(|key| match key {
            "BLOCKFALL_SCORES_ADDR" => Some("not an addr".to_string()),
            "BLOCKFALL_SCORES_PORT" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(addr, "127.0.0.1:4000".parse().unwrap());
    }
}
