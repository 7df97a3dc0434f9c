//! Shared test utilities for the unit test suite.
//!
//! Provides in-memory test images and hand-built multipart requests so
//! intake, imaging, and pipeline tests can run without fixture files.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let jpeg = jpeg_bytes(1024, 1024);
//! let request = multipart_request(&[
//!     FilePart::new("files", "cat.jpg", "image/jpeg", &jpeg),
//!     FilePart::text("caption", "a cat"),
//! ]);
//! ```

use axum::body::Body;
use axum::http::{Request, header};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

pub const BOUNDARY: &str = "----responsive-uploads-test-boundary";

// =========================================================================
// Test images
// =========================================================================

/// Encode a gradient image so crops and scales produce distinct pixels.
fn encode_gradient(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, format)
        .unwrap();
    buf.into_inner()
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_gradient(width, height, ImageFormat::Jpeg)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_gradient(width, height, ImageFormat::Png)
}

pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    std::fs::write(path, png_bytes(width, height)).unwrap();
}

// =========================================================================
// Multipart bodies
// =========================================================================

/// One part of a hand-built `multipart/form-data` body.
pub struct FilePart<'a> {
    pub field: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> FilePart<'a> {
    pub fn new(field: &'a str, filename: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            field,
            filename: Some(filename),
            content_type: Some(content_type),
            data,
        }
    }

    /// A plain form field with no filename.
    pub fn text(field: &'a str, value: &'a str) -> Self {
        Self {
            field,
            filename: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

pub fn multipart_body(parts: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.field);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{filename}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// `POST /upload` carrying the given parts.
pub fn multipart_request(parts: &[FilePart<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}
