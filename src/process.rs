//! Rendition generation for a batch of staged uploads.
//!
//! For each accepted upload, two renditions are derived from the staged
//! original, each by an independent chain: extract the configured region
//! (600×600 from the top-left corner by default), scale it to the target
//! width, encode.
//!
//! ## Output Structure
//!
//! ```text
//! uploads/
//! ├── 1700000000123-cat.jpg          # staged by intake
//! ├── mobile/1700000000123-cat.jpg   # crop → 480 wide
//! └── desktop/1700000000123-cat.jpg  # crop → 1920 wide (upscaled)
//! ```
//!
//! ## Concurrency
//!
//! Every rendition runs on tokio's blocking pool, gated by a semaphore so at
//! most `processing.max_processes` renders hold a thread at once. Other
//! blocking work (file staging, static serving) never queues behind them.
//! The two renditions of one file are joined together, and all files are
//! joined as a batch; results come back positionally, so the batch keeps
//! request order no matter which file finishes first.
//!
//! The batch is all-or-nothing: the first failure fails it. Renditions
//! already running are not cancelled and may still land on disk afterwards;
//! nothing is rolled back.

use crate::config::RenditionsConfig;
use crate::imaging::{
    BackendError, CropRegion, ImageBackend, Quality, RenditionConfig, RenditionKind,
    RenditionParams, plan_rendition,
};
use crate::intake::UploadedFile;
use crate::storage::UploadLayout;
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{AcquireError, Semaphore};
use tracing::debug;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Imaging(#[from] BackendError),
    #[error("rendition task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("rendition limiter closed: {0}")]
    Limiter(#[from] AcquireError),
}

impl From<&RenditionsConfig> for RenditionConfig {
    fn from(config: &RenditionsConfig) -> Self {
        Self {
            crop: CropRegion::top_left(config.crop[0], config.crop[1]),
            mobile_width: config.mobile_width,
            desktop_width: config.desktop_width,
            quality: Quality::new(config.quality),
        }
    }
}

/// Root-relative URLs of one upload and its renditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenditionSet {
    pub original: String,
    pub mobile: String,
    pub desktop: String,
}

impl RenditionSet {
    pub fn for_file(layout: &UploadLayout, filename: &str) -> Self {
        Self {
            original: layout.original_url(filename),
            mobile: layout.rendition_url(RenditionKind::Mobile, filename),
            desktop: layout.rendition_url(RenditionKind::Desktop, filename),
        }
    }
}

/// One [`RenditionSet`] per accepted file, in request order.
pub type BatchResult = Vec<RenditionSet>;

/// Plan the mobile and desktop renditions of one staged upload.
///
/// Both read the staged original and write under the same filename in their
/// own directory.
pub fn plan_renditions(
    file: &UploadedFile,
    layout: &UploadLayout,
    config: &RenditionConfig,
) -> [RenditionParams; 2] {
    RenditionKind::ALL.map(|kind| {
        let output = layout.rendition_path(kind, &file.filename);
        plan_rendition(kind, &file.path, &output, config)
    })
}

/// Generate mobile and desktop renditions for every file in the batch.
///
/// `permits` bounds how many renders run at once across every batch that
/// shares it.
pub async fn generate_renditions(
    backend: Arc<dyn ImageBackend>,
    permits: Arc<Semaphore>,
    files: &[UploadedFile],
    layout: &UploadLayout,
    config: &RenditionConfig,
) -> Result<BatchResult, ProcessError> {
    let tasks = files.iter().map(|file| {
        let set = RenditionSet::for_file(layout, &file.filename);
        let [mobile, desktop] = plan_renditions(file, layout, config)
            .map(|params| render_blocking(Arc::clone(&backend), Arc::clone(&permits), params));
        async move {
            tokio::try_join!(mobile, desktop)?;
            Ok::<_, ProcessError>(set)
        }
    });

    try_join_all(tasks).await
}

/// Run one rendition on the blocking pool once a permit is free.
async fn render_blocking(
    backend: Arc<dyn ImageBackend>,
    permits: Arc<Semaphore>,
    params: RenditionParams,
) -> Result<(), ProcessError> {
    let permit = permits.acquire_owned().await?;

    let params = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        backend.render(&params).map(|()| params)
    })
    .await??;

    debug!(
        kind = %params.kind,
        output = %params.output.display(),
        width = params.width,
        height = params.height,
        "rendition written"
    );
    Ok(())
}
