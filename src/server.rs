//! HTTP surface: the upload endpoint, static serving, and response shapes.
//!
//! | Route | Handler |
//! |---|---|
//! | `POST /upload` | [`upload`]: intake → renditions → JSON response |
//! | `GET <url_prefix>/...` | `tower_http::services::ServeDir` over the upload root |
//!
//! Every failure is converted here, at the outermost boundary, into one of
//! the JSON error shapes; nothing below this module knows about HTTP.

use crate::config::{IntakeConfig, ServerConfig, effective_threads};
use crate::imaging::{ImageBackend, RenditionConfig};
use crate::intake::{IntakeError, receive_files};
use crate::naming::{self, Clock};
use crate::process::{RenditionSet, generate_renditions};
use crate::storage::UploadLayout;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const MSG_UPLOADED: &str = "Files uploaded and resized successfully!";
pub const MSG_NO_FILES: &str = "No files uploaded!";
pub const MSG_RESIZE_FAILED: &str = "Error resizing images";
pub const MSG_UPLOAD_FAILED: &str = "Error uploading files";

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to prepare upload directories under {root}: {source}")]
    Storage {
        root: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared, read-only state for request handlers.
pub struct AppState {
    pub layout: UploadLayout,
    pub intake: IntakeConfig,
    pub renditions: RenditionConfig,
    pub backend: Arc<dyn ImageBackend>,
    /// Shared by every request; bounds renders running at once.
    pub render_permits: Arc<Semaphore>,
    pub clock: Clock,
}

impl AppState {
    pub fn new(config: &ServerConfig, backend: Arc<dyn ImageBackend>) -> Self {
        Self {
            layout: UploadLayout::from_config(&config.storage),
            intake: config.intake.clone(),
            renditions: RenditionConfig::from(&config.renditions),
            backend,
            render_permits: Arc::new(Semaphore::new(effective_threads(&config.processing))),
            clock: naming::system_millis,
        }
    }
}

/// Successful upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub files: Vec<RenditionSet>,
}

/// JSON error body: `{ "message": ..., "error": ... }`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Failure of a request, rendered as a JSON [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    error: Option<String>,
}

impl ApiError {
    const fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            error: None,
        }
    }

    fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub const fn no_files() -> Self {
        Self::new(StatusCode::BAD_REQUEST, MSG_NO_FILES)
    }

    pub fn resize_failed(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_RESIZE_FAILED).with_error(error)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::UnexpectedField(field) => {
                Self::new(StatusCode::BAD_REQUEST, "Unexpected field").with_error(field)
            }
            IntakeError::Multipart(err) => {
                Self::new(err.status(), "Malformed upload").with_error(err.body_text())
            }
            err @ IntakeError::Stage { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_UPLOAD_FAILED)
                    .with_error(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
            error: self.error,
        };
        (self.status, Json(body)).into_response()
    }
}

/// `POST /upload`.
///
/// A request that is not multipart at all carries no files, so it gets the
/// same 400 as an empty multipart body.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::no_files());
    };

    let outcome = receive_files(&mut multipart, &state.layout, &state.intake, state.clock)
        .await
        .inspect_err(|err| warn!(error = %err, "upload intake failed"))?;

    if outcome.received == 0 {
        return Err(ApiError::no_files());
    }
    info!(
        received = outcome.received,
        accepted = outcome.accepted.len(),
        "files received"
    );

    let files = generate_renditions(
        Arc::clone(&state.backend),
        Arc::clone(&state.render_permits),
        &outcome.accepted,
        &state.layout,
        &state.renditions,
    )
    .await
    .map_err(|err| {
        error!(error = %err, "error resizing images");
        ApiError::resize_failed(err.to_string())
    })?;

    Ok(Json(UploadResponse {
        message: MSG_UPLOADED,
        files,
    }))
}

/// Build the application router over shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = match state.intake.max_request_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };
    let uploads = ServeDir::new(state.layout.root());
    let prefix = state.layout.url_prefix().to_string();

    Router::new()
        .route("/upload", post(upload))
        .nest_service(&prefix, uploads)
        .layer(body_limit)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Prepare the upload directories, bind, and serve until the process exits.
pub async fn serve(
    config: &ServerConfig,
    backend: Arc<dyn ImageBackend>,
) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new(config, backend));
    state
        .layout
        .ensure_dirs()
        .map_err(|source| ServerError::Storage {
            root: state.layout.root().display().to_string(),
            source,
        })?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!("server is running on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
