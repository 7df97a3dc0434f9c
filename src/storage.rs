//! Upload root layout on disk and the URLs it is served under.
//!
//! ```text
//! uploads/
//! ├── 1700000000123-cat.jpg          # staged original
//! ├── mobile/1700000000123-cat.jpg   # mobile rendition
//! └── desktop/1700000000123-cat.jpg  # desktop rendition
//! ```
//!
//! The layout is the only persisted state: there is no index, and nothing
//! is ever deleted.

use crate::config::StorageConfig;
use crate::imaging::RenditionKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLayout {
    root: PathBuf,
    url_prefix: String,
}

impl UploadLayout {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.root, &config.url_prefix)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// URL path the root is served under, without a trailing slash.
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Create the root and every rendition directory.
    ///
    /// Idempotent; call once before accepting requests.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for kind in RenditionKind::ALL {
            std::fs::create_dir_all(self.rendition_dir(kind))?;
        }
        Ok(())
    }

    pub fn staged_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    pub fn rendition_dir(&self, kind: RenditionKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn rendition_path(&self, kind: RenditionKind, filename: &str) -> PathBuf {
        self.rendition_dir(kind).join(filename)
    }

    pub fn original_url(&self, filename: &str) -> String {
        format!("{}/{}", self.url_prefix, filename)
    }

    pub fn rendition_url(&self, kind: RenditionKind, filename: &str) -> String {
        format!("{}/{}/{}", self.url_prefix, kind.dir_name(), filename)
    }
}
