//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify and render.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the pure-Rust
//! `image` crate. Backends are shared across the blocking pool, so they must
//! be `Send + Sync`.

use super::params::{CropRegion, RenditionParams};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("bad extract area: {crop} exceeds {width}x{height} image")]
    ExtractOutOfBounds {
        crop: CropRegion,
        width: u32,
        height: u32,
    },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend: Send + Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Execute one rendition: decode the source, extract the crop region,
    /// scale it, and encode the result to `params.output`.
    ///
    /// An out-of-bounds crop fails with [`BackendError::ExtractOutOfBounds`].
    fn render(&self, params: &RenditionParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{Quality, RenditionKind};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock backend that records renders without executing them.
    /// Uses Mutex (not RefCell) so it is Sync and can be shared with the
    /// blocking pool.
    #[derive(Default)]
    pub struct MockBackend {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// Source file names whose renders fail with an out-of-bounds crop.
        pub failing_sources: Mutex<Vec<String>>,
        /// Per source file name, how long a render blocks before recording.
        pub delays: Mutex<HashMap<String, Duration>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Render {
            kind: RenditionKind,
            source: String,
            output: String,
            crop: CropRegion,
            width: u32,
            height: u32,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail every render whose source file name ends with `name`.
        pub fn failing_on(self, name: &str) -> Self {
            self.failing_sources.lock().unwrap().push(name.to_string());
            self
        }

        /// Sleep before rendering any source whose file name ends with `name`.
        pub fn delayed_on(self, name: &str, delay: Duration) -> Self {
            self.delays.lock().unwrap().insert(name.to_string(), delay);
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        /// Rendered output paths, in completion order.
        pub fn rendered_outputs(&self) -> Vec<String> {
            self.get_operations()
                .into_iter()
                .map(|op| match op {
                    RecordedOp::Render { output, .. } => output,
                })
                .collect()
        }

        /// Most renders that were ever running at the same time.
        pub fn peak_concurrency(&self) -> usize {
            self.peak_in_flight.load(Ordering::SeqCst)
        }

        fn render_recorded(&self, params: &RenditionParams) -> Result<(), BackendError> {
            let source = params.source.to_string_lossy().to_string();

            let delay = self
                .delays
                .lock()
                .unwrap()
                .iter()
                .find(|(name, _)| source.ends_with(name.as_str()))
                .map(|(_, delay)| *delay);
            if let Some(delay) = delay {
                std::thread::sleep(delay);
            }

            if self
                .failing_sources
                .lock()
                .unwrap()
                .iter()
                .any(|name| source.ends_with(name.as_str()))
            {
                return Err(BackendError::ExtractOutOfBounds {
                    crop: params.crop,
                    width: 300,
                    height: 300,
                });
            }

            self.operations.lock().unwrap().push(RecordedOp::Render {
                kind: params.kind,
                source,
                output: params.output.to_string_lossy().to_string(),
                crop: params.crop,
                width: params.width,
                height: params.height,
                quality: params.quality.value(),
            });
            Ok(())
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            Err(BackendError::ProcessingFailed(format!(
                "mock backend cannot identify {}",
                path.display()
            )))
        }

        fn render(&self, params: &RenditionParams) -> Result<(), BackendError> {
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
            let result = self.render_recorded(params);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn sample_params(source: &str) -> RenditionParams {
        RenditionParams {
            kind: RenditionKind::Mobile,
            source: source.into(),
            output: "/uploads/mobile/1-a.jpg".into(),
            crop: CropRegion::top_left(600, 600),
            width: 480,
            height: 480,
            quality: Quality::new(80),
        }
    }

    #[test]
    fn mock_records_render() {
        let backend = MockBackend::new();

        backend.render(&sample_params("/uploads/1-a.jpg")).unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        let RecordedOp::Render {
            kind,
            width,
            height,
            quality,
            ..
        } = &ops[0];
        assert_eq!(*kind, RenditionKind::Mobile);
        assert_eq!((*width, *height), (480, 480));
        assert_eq!(*quality, 80);
    }

    #[test]
    fn mock_fails_configured_sources() {
        let backend = MockBackend::new().failing_on("small.png");

        let err = backend
            .render(&sample_params("/uploads/1-small.png"))
            .unwrap_err();
        assert!(matches!(err, BackendError::ExtractOutOfBounds { .. }));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn mock_tracks_peak_concurrency() {
        let backend = MockBackend::new();

        backend.render(&sample_params("/uploads/1-a.jpg")).unwrap();
        backend.render(&sample_params("/uploads/2-b.jpg")).unwrap();

        assert_eq!(backend.peak_concurrency(), 1);
    }

    #[test]
    fn extract_error_message_names_region_and_image() {
        let err = BackendError::ExtractOutOfBounds {
            crop: CropRegion::top_left(600, 600),
            width: 300,
            height: 200,
        };
        assert_eq!(
            err.to_string(),
            "bad extract area: 600x600 at (0, 0) exceeds 300x200 image"
        );
    }
}
