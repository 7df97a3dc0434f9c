//! # Responsive Uploads
//!
//! A single-endpoint image ingestion service. Clients `POST` up to ten images
//! to `/upload`; each accepted image is stored as-is and two renditions are
//! derived from it, one sized for mobile and one for desktop. The response
//! lists root-relative URLs for all three files, and everything under the
//! upload root is served back statically.
//!
//! # Architecture: One Linear Pipeline
//!
//! ```text
//! 1. Intake      multipart   →  uploads/<millis>-<name>        (filter + stage)
//! 2. Renditions  staged      →  uploads/{mobile,desktop}/...   (crop + scale)
//! 3. Respond     renditions  →  { message, files: [...] }      (all or nothing)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`intake`] | Stage 1: reads the multipart body, filters by MIME type, stages accepted files |
//! | [`process`] | Stage 2: fans rendition work out to the blocking pool and joins it in order |
//! | [`server`] | Stage 3 and the HTTP surface: router, upload handler, JSON error shapes |
//! | [`imaging`] | Pure-Rust image operations: identify, crop, scale, encode |
//! | [`storage`] | Upload root layout on disk and the URLs it is served under |
//! | [`naming`] | `<millis>-<name>` staged filename convention |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## All-or-Nothing Batches
//!
//! Uploads in one request are independent, but the response is not: if any
//! rendition fails, the request fails with a 500 and no URLs are returned.
//! Files already written stay on disk. There is no rollback and no cleanup.
//!
//! ## Fixed Top-Left Crop
//!
//! Both renditions start from the same 600×600 region at the top-left corner
//! of the original. The desktop rendition scales that region up to 1920px,
//! which adds no detail. Images smaller than the crop fail rather than
//! being padded or skipped.
//!
//! ## Silent Type Filtering
//!
//! Files whose declared type is not PNG or JPEG are dropped without an error.
//! A request whose files are all dropped succeeds with an empty list.
//!
//! ## The Filesystem Is the Database
//!
//! No index, no metadata store. The staged filename ties an original to its
//! renditions, and the directory layout is the only persisted state.

pub mod config;
pub mod imaging;
pub mod intake;
pub mod logging;
pub mod naming;
pub mod process;
pub mod server;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;
