use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, warn};

use crate::error::AppError;
use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/save", post(save_submission))
        .with_state(state)
}

/// Accept one survey submission.
///
/// The body is read raw rather than through the `Json` extractor so that empty and
/// malformed bodies get the same `{"error": ...}` shape as validation failures.
async fn save_submission(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>, AppError> {
    let pipeline = Arc::clone(&state.pipeline);
    tokio::task::spawn_blocking(move || pipeline.accept(&body))
        .await
        .map_err(|e| AppError::Worker(e.to_string()))??;
    Ok(Json(StatusResponse { status: "ok" }))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = if self.is_client_error() {
            warn!(error = %self, "submission rejected");
            (StatusCode::BAD_REQUEST, self.to_string())
        } else {
            error!(error = %self, "submission failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    use crate::pipeline::Stores;
    use crate::validate::REQUIRED_FIELDS;

    fn state() -> AppState {
        let (stores, _) = Stores::in_memory();
        AppState::new(Arc::new(Pipeline::new(stores)))
    }

    async fn call(state: &AppState, body: &[u8]) -> (StatusCode, Value) {
        let response = save_submission(State(state.clone()), Bytes::copy_from_slice(body))
            .await
            .into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn complete_body() -> Vec<u8> {
        let fields: serde_json::Map<String, Value> = REQUIRED_FIELDS
            .iter()
            .map(|f| (f.to_string(), json!("answer")))
            .collect();
        serde_json::to_vec(&fields).unwrap()
    }

    #[tokio::test]
    async fn valid_submission_returns_ok_status() {
        let state = state();
        let (status, body) = call(&state, &complete_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
        assert_eq!(state.pipeline.stores().responses.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_body_is_bad_request() {
        let (status, body) = call(&state(), b"   ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No input"}));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (status, body) = call(&state(), b"{\"fullName\": ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid JSON"}));
    }

    #[tokio::test]
    async fn missing_field_is_named_in_the_error() {
        let state = state();
        let (status, body) = call(&state, br#"{"fullName": "Ada", "role": ""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing field: role"}));
        assert!(state.pipeline.stores().responses.is_empty().unwrap());
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = AppError::Worker("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
