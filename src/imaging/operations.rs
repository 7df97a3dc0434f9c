//! High-level image operations.
//!
//! Turns rendition settings into [`RenditionParams`] for the backend. Nothing
//! here touches pixels or the filesystem.

use super::calculations::scale_to_width;
use super::params::{CropRegion, Quality, RenditionKind, RenditionParams};
use std::path::Path;

/// Configuration for rendition generation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenditionConfig {
    /// Region extracted from every source before scaling.
    pub crop: CropRegion,
    pub mobile_width: u32,
    pub desktop_width: u32,
    pub quality: Quality,
}

impl RenditionConfig {
    /// Output width for a rendition kind.
    pub fn width_for(&self, kind: RenditionKind) -> u32 {
        match kind {
            RenditionKind::Mobile => self.mobile_width,
            RenditionKind::Desktop => self.desktop_width,
        }
    }
}

impl Default for RenditionConfig {
    fn default() -> Self {
        Self {
            crop: CropRegion::top_left(600, 600),
            mobile_width: 480,
            desktop_width: 1920,
            quality: Quality::default(),
        }
    }
}

/// Plan a rendition without executing it.
///
/// The output height follows the crop's aspect ratio; the crop itself is
/// carried in the params so every rendition re-extracts it from the source.
pub fn plan_rendition(
    kind: RenditionKind,
    source: &Path,
    output: &Path,
    config: &RenditionConfig,
) -> RenditionParams {
    let (width, height) = scale_to_width(
        (config.crop.width, config.crop.height),
        config.width_for(kind),
    );

    RenditionParams {
        kind,
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        crop: config.crop,
        width,
        height,
        quality: config.quality,
    }
}
