//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::ImageReader` with content sniffing |
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Extract | `DynamicImage::crop_imm`, bounds checked first |
//! | Scale | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality from params) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::crop_fits;
use super::params::{Quality, RenditionParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open an image, detecting its format from content rather than extension.
fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?)
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Decode {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Load and decode an image from disk, returning the detected source format.
fn load_image(path: &Path) -> Result<(DynamicImage, Option<ImageFormat>), BackendError> {
    let reader = open_reader(path)?;
    let format = reader.format();
    let img = reader.decode().map_err(|e| decode_error(path, e))?;
    Ok((img, format))
}

/// Pick the encoder for an output path.
///
/// The extension decides; when it names no format we can encode, the
/// source's detected format is reused.
fn output_format(path: &Path, source: Option<ImageFormat>) -> Result<ImageFormat, BackendError> {
    let encodable = |format: &ImageFormat| matches!(format, ImageFormat::Jpeg | ImageFormat::Png);

    ImageFormat::from_path(path)
        .ok()
        .filter(encodable)
        .or(source.filter(encodable))
        .ok_or_else(|| {
            BackendError::ProcessingFailed(format!(
                "Unsupported output format: {}",
                path.display()
            ))
        })
}

/// Encode and save an image in the given format.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: ImageFormat,
    quality: Quality,
) -> Result<(), BackendError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    let result = match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(writer, quality.value() as u8)),
        ImageFormat::Png => img.write_with_encoder(PngEncoder::new(writer)),
        other => {
            return Err(BackendError::ProcessingFailed(format!(
                "Unsupported output format: {other:?}"
            )));
        }
    };

    result.map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to encode {}: {}", path.display(), e))
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?
            .into_dimensions()
            .map_err(|e| decode_error(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn render(&self, params: &RenditionParams) -> Result<(), BackendError> {
        let (img, source_format) = load_image(&params.source)?;

        let (width, height) = (img.width(), img.height());
        if !crop_fits(&params.crop, (width, height)) {
            return Err(BackendError::ExtractOutOfBounds {
                crop: params.crop,
                width,
                height,
            });
        }

        let crop = params.crop;
        let extracted = img.crop_imm(crop.left, crop.top, crop.width, crop.height);
        let scaled = extracted.resize_exact(params.width, params.height, FilterType::Lanczos3);

        let format = output_format(&params.output, source_format)?;
        save_image(&scaled, &params.output, format, params.quality)
    }
}
