//! Image processing, pure Rust, zero system dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Extract** | `crop_imm` after an explicit bounds check |
//! | **Scale** | `resize_exact` with Lanczos3 |
//! | **Encode** | JPEG / PNG chosen from the output extension |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Rendition planning from settings (pure)

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{RenditionConfig, plan_rendition};
pub use params::{CropRegion, Quality, RenditionKind, RenditionParams};
pub use rust_backend::RustBackend;
