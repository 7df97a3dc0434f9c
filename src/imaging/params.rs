//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides which renditions to create) and the [`backend`](super::backend)
//! (which does the actual pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 80). Clamped on construction.
//! - [`CropRegion`]: Rectangle extracted from the source before scaling.
//! - [`RenditionKind`]: Which derived variant a rendition is (mobile, desktop).
//! - [`RenditionParams`]: Everything one rendition needs: source, output, crop,
//!   target size, quality.

use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Rectangle extracted from a source image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Region of the given size anchored at the top-left corner.
    pub fn top_left(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
        }
    }
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.left, self.top
        )
    }
}

/// The derived variants produced for every accepted upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenditionKind {
    Mobile,
    Desktop,
}

impl RenditionKind {
    pub const ALL: [RenditionKind; 2] = [RenditionKind::Mobile, RenditionKind::Desktop];

    /// Subdirectory of the upload root holding this variant.
    pub fn dir_name(self) -> &'static str {
        match self {
            RenditionKind::Mobile => "mobile",
            RenditionKind::Desktop => "desktop",
        }
    }
}

impl fmt::Display for RenditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Parameters for one crop-then-scale rendition.
#[derive(Debug, Clone, PartialEq)]
pub struct RenditionParams {
    pub kind: RenditionKind,
    pub source: PathBuf,
    pub output: PathBuf,
    pub crop: CropRegion,
    /// Final dimensions after scaling the cropped region.
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}
