//! Request intake: multipart parsing, type filtering, and staging.
//!
//! Each file part on the configured field is counted, checked against the
//! MIME allow-list, and, when accepted, streamed to
//! `<root>/<millis>-<original-name>`. Rejected parts are skipped without an
//! error and leave nothing on disk. Parts without a filename are plain form
//! fields and are ignored.
//!
//! The file cap is enforced on received files, before filtering, so an
//! eleventh file fails the request even when it would have been rejected.

use crate::config::IntakeConfig;
use crate::naming::{self, Clock};
use crate::storage::UploadLayout;
use axum::extract::multipart::{Field, Multipart, MultipartError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
    /// A file arrived on a field other than the upload field, or past the cap.
    #[error("Unexpected field")]
    UnexpectedField(String),
    #[error("failed to stage {path}: {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One accepted upload, staged on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    /// Generated `<millis>-<original-name>` filename, shared by all renditions.
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    /// Bytes written to the staged file.
    pub size: u64,
    pub path: PathBuf,
}

/// What intake saw in one request.
#[derive(Debug, Default)]
pub struct IntakeOutcome {
    /// File parts received, before type filtering.
    pub received: usize,
    /// Files that passed the filter, in request order.
    pub accepted: Vec<UploadedFile>,
}

/// Whether a part's declared content type is on the allow-list.
///
/// The comparison is exact: no parameters, no case folding.
pub fn is_accepted_mime(mime: Option<&str>, allowed: &[String]) -> bool {
    mime.is_some_and(|mime| allowed.iter().any(|a| a == mime))
}

/// Read every part of a multipart request, staging the accepted files.
pub async fn receive_files(
    multipart: &mut Multipart,
    layout: &UploadLayout,
    config: &IntakeConfig,
    clock: Clock,
) -> Result<IntakeOutcome, IntakeError> {
    let mut outcome = IntakeOutcome::default();

    while let Some(mut field) = multipart.next_field().await? {
        let Some(original_name) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
        else {
            continue;
        };

        let field_name = field.name().unwrap_or_default().to_owned();
        if field_name != config.field || outcome.received >= config.max_files {
            return Err(IntakeError::UnexpectedField(field_name));
        }
        outcome.received += 1;

        let mime_type = field.content_type().map(str::to_owned);
        if !is_accepted_mime(mime_type.as_deref(), &config.allowed_types) {
            debug!(
                file = %original_name,
                mime = mime_type.as_deref().unwrap_or("none"),
                "skipping file with unsupported type"
            );
            continue;
        }

        let filename = naming::staged_name(&original_name, clock());
        let path = layout.staged_path(&filename);
        let size = stage_field(&mut field, &path).await?;
        debug!(file = %filename, size, "staged upload");

        outcome.accepted.push(UploadedFile {
            filename,
            original_name,
            mime_type: mime_type.unwrap_or_default(),
            size,
            path,
        });
    }

    Ok(outcome)
}

/// Stream one field's body to `path`, returning the byte count.
async fn stage_field(field: &mut Field<'_>, path: &Path) -> Result<u64, IntakeError> {
    let stage_err = |source| IntakeError::Stage {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(path).await.map_err(stage_err)?;
    let mut size = 0u64;
    while let Some(chunk) = field.chunk().await? {
        size += chunk.len() as u64;
        file.write_all(&chunk).await.map_err(stage_err)?;
    }
    file.flush().await.map_err(stage_err)?;
    Ok(size)
}
