use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::error;

use crate::errors::PipelineError;
use crate::pipeline::{PipelineRunner, RunOutcome, RunRequest};

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub pipeline: PipelineRunner,
}

pub type SharedState = Arc<AppState>;

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        if err.is_validation() {
            ApiError::BadRequest(err.to_string())
        } else {
            error!(error = %err, "pipeline run failed");
            ApiError::Internal(err.to_string())
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/execute", post(execute))
        .route("/health", get(health_check))
        .route("/", get(root))
}

// ── Handlers ──────────────────────────────────────────────────────────

/// Run the full generate-screen-execute retry loop for one prompt.
async fn execute(
    State(state): State<SharedState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunOutcome>, ApiError> {
    let outcome = state.pipeline.run(&request).await?;
    Ok(Json(outcome))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "rexec"}))
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "rexec",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "execute": "POST /execute",
            "health": "GET /health",
        },
    }))
}
