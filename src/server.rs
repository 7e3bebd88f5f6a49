//! HTTP surface over a shared [`Solver`].
//!
//! | Route                    | Method | Body                     |
//! |--------------------------|--------|--------------------------|
//! | `/api/health`            | GET    |                          |
//! | `/api/process-text`      | POST   | JSON `{text, filename?}` |
//! | `/api/process-file`      | POST   | multipart, field `file`  |
//! | `/api/status/{job_id}`   | GET    |                          |
//!
//! Every failure is a JSON [`ErrorBody`] with the status code from
//! [`SolveError::status_code`].

use crate::artifact::Artifact;
use crate::error::{FieldError, SolveError};
use crate::output::ErrorBody;
use crate::request::ProcessTextRequest;
use crate::solver::Solver;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, warn, Level};

/// Multipart framing allowance on top of the upload limit.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Name of the multipart field carrying the question paper.
pub const FILE_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pub solver: Arc<Solver>,
}

impl AppState {
    pub fn new(solver: Arc<Solver>) -> Self {
        Self { solver }
    }
}

impl IntoResponse for SolveError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(kind = ?self.kind(), "{}", self);
        } else {
            warn!(kind = ?self.kind(), "{}", self);
        }
        (status, Json(ErrorBody::from(&self))).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.solver.config().max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/process-text", post(process_text_handler))
        .route("/api/process-file", post(process_file_handler))
        .route("/api/status/{job_id}", get(job_status_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn health_handler(State(state): State<AppState>) -> Response {
    let solver = Arc::clone(&state.solver);
    match tokio::spawn(async move { solver.health().await }).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            error!(error = %e, "Health probe task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::with_cause(
                    "Service health check failed",
                    e.to_string(),
                )),
            )
                .into_response()
        }
    }
}

async fn process_text_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, SolveError> {
    let Json(body) = payload.map_err(|rejection| SolveError::Validation {
        errors: vec![FieldError::new(&[], "invalid_json", rejection.body_text())],
    })?;

    let request = ProcessTextRequest::from_json(&body)?;
    let envelope = state.solver.process_text(request).await?;
    Ok(Json(envelope).into_response())
}

#[tracing::instrument(skip(state, multipart))]
async fn process_file_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, Response> {
    // Not a multipart body at all: there is no file to process.
    let artifact = match multipart {
        Ok(mut multipart) => read_file_field(&mut multipart).await?,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "Request is not multipart");
            None
        }
    };

    let envelope = state
        .solver
        .process_file(artifact)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(envelope).into_response())
}

/// Pull the `file` field out of a multipart body; other fields are skipped.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<Artifact>, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(multipart_failure(e)),
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(multipart_failure)?;

        tracing::debug!(filename = %filename, content_type = %content_type, bytes = data.len(), "File received");
        return Ok(Some(Artifact::new(data.to_vec(), content_type, filename)));
    }
}

fn multipart_failure(e: MultipartError) -> Response {
    let status = e.status();
    warn!(status = %status, error = %e.body_text(), "Failed to read multipart body");
    let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "File is too large".to_string()
    } else {
        format!("Failed to read upload: {}", e.body_text())
    };
    (status, Json(ErrorBody::new(message))).into_response()
}

async fn job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    Json(state.solver.job_status(&job_id)).into_response()
}
