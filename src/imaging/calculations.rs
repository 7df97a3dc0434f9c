//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::CropRegion;

/// Calculate output dimensions when scaling to a fixed width.
///
/// The height follows the source aspect ratio, rounded to the nearest pixel
/// and never below 1. Upscaling is allowed: a 600px region scaled to 1920px
/// simply grows.
///
/// # Arguments
/// * `source` - Dimensions being scaled (width, height)
/// * `target_width` - Requested output width in pixels
///
/// # Returns
/// * `(width, height)` - Output dimensions
pub fn scale_to_width(source: (u32, u32), target_width: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return (target_width, src_h.max(1));
    }
    let ratio = target_width as f64 / src_w as f64;
    let height = (src_h as f64 * ratio).round().max(1.0) as u32;
    (target_width, height)
}

/// Whether `crop` lies entirely inside an image of the given dimensions.
pub fn crop_fits(crop: &CropRegion, image: (u32, u32)) -> bool {
    let (img_w, img_h) = image;
    let right = crop.left.checked_add(crop.width);
    let bottom = crop.top.checked_add(crop.height);
    crop.width > 0
        && crop.height > 0
        && right.is_some_and(|r| r <= img_w)
        && bottom.is_some_and(|b| b <= img_h)
}
