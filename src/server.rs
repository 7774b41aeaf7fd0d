//! Transcription proxy HTTP server.
//!
//! Browser clients cannot call the speech recognizer directly without
//! exposing the API key, so the gateway serves a small proxy:
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/speech-to-text` | Forward base64 audio to the recognizer |
//! | `GET`  | `/health` | Liveness probe (returns version) |
//!
//! # Error Contract
//!
//! All error responses use the same JSON schema:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "audio.content must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `upstream` (502), `internal` (500).
//! A missing speech API key surfaces as `internal` at request time; the
//! server itself starts fine without one.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted: the proxy exists for
//! browser-based clients.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::speech::Transcriber;

/// Shared state for the route handlers.
#[derive(Clone)]
pub struct AppState {
    transcriber: Arc<Transcriber>,
}

impl AppState {
    pub fn new(transcriber: Transcriber) -> Self {
        Self {
            transcriber: Arc::new(transcriber),
        }
    }
}

/// Starts the transcription proxy on `[server].bind`.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let transcriber = Transcriber::new(&config.speech)?;
    let app = router(AppState::new(transcriber));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "transcription proxy listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router; separated from [`run_server`] so tests can drive it
/// on an ephemeral port.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/speech-to-text", post(handle_transcribe))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn upstream_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_GATEWAY,
        code: "upstream".to_string(),
        message: message.into(),
    }
}

fn internal_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// A missing key is a deployment problem (500); everything else that goes
/// wrong talking to the recognizer is an upstream failure (502).
fn classify_transcribe_error(err: anyhow::Error) -> AppError {
    let msg = err.to_string();
    if msg.contains("API key") {
        internal_error(msg)
    } else {
        upstream_error(msg)
    }
}

// ============ POST /api/speech-to-text ============

#[derive(Deserialize)]
struct TranscribeRequest {
    audio: AudioContent,
}

#[derive(Deserialize)]
struct AudioContent {
    content: String,
}

#[derive(Serialize)]
struct TranscribeResponse {
    text: String,
}

async fn handle_transcribe(
    State(state): State<AppState>,
    Json(request): Json<TranscribeRequest>,
) -> Result<Json<TranscribeResponse>, AppError> {
    if request.audio.content.trim().is_empty() {
        return Err(bad_request("audio.content must not be empty"));
    }

    let text = state
        .transcriber
        .transcribe_base64(&request.audio.content)
        .await
        .map_err(classify_transcribe_error)?;

    Ok(Json(TranscribeResponse { text }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
