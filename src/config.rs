//! Server configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Every option has a
//! stock default; running without a config file gives the standard service:
//! port 3000, `uploads/` as the upload root, up to 10 PNG/JPEG files per
//! request, and 480px / 1920px renditions of a 600×600 top-left crop.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//!
//! [storage]
//! root = "uploads"           # Originals land here; renditions in mobile/ and desktop/
//! url_prefix = "/uploads"    # URL path the upload root is served under
//!
//! [intake]
//! field = "files"            # Multipart field carrying the files
//! max_files = 10
//! allowed_types = ["image/png", "image/jpeg", "image/jpg"]
//! # max_request_bytes = 52428800   # Omit for no request body limit
//!
//! [renditions]
//! crop = [600, 600]          # width, height of the top-left region
//! mobile_width = 480
//! desktop_width = 1920
//! quality = 80               # JPEG quality (1-100)
//!
//! [processing]
//! # max_processes = 4        # Parallel renders (omit for auto = CPU cores)
//!
//! [logging]
//! level = "info"             # Overridden by RUST_LOG when set
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [server]
//! port = 8080
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Server configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listening address.
    pub server: ListenConfig,
    /// Where uploads and renditions are stored and served from.
    pub storage: StorageConfig,
    /// Multipart intake rules (field name, file cap, MIME allow-list).
    pub intake: IntakeConfig,
    /// Crop region, rendition widths, encoding quality.
    pub renditions: RenditionsConfig,
    /// Worker pool sizing for image work.
    pub processing: ProcessingConfig,
    /// Log filter.
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.root must not be empty".into(),
            ));
        }
        let prefix = self.storage.url_prefix.trim_end_matches('/');
        if !prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "storage.url_prefix must start with '/' and must not be the site root".into(),
            ));
        }
        if self.intake.field.is_empty() {
            return Err(ConfigError::Validation(
                "intake.field must not be empty".into(),
            ));
        }
        if self.intake.max_files == 0 {
            return Err(ConfigError::Validation(
                "intake.max_files must be at least 1".into(),
            ));
        }
        if self.intake.allowed_types.is_empty() {
            return Err(ConfigError::Validation(
                "intake.allowed_types must not be empty".into(),
            ));
        }
        if self.renditions.crop[0] == 0 || self.renditions.crop[1] == 0 {
            return Err(ConfigError::Validation(
                "renditions.crop values must be non-zero".into(),
            ));
        }
        if self.renditions.mobile_width == 0 || self.renditions.desktop_width == 0 {
            return Err(ConfigError::Validation(
                "renditions widths must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.renditions.quality) {
            return Err(ConfigError::Validation(
                "renditions.quality must be 1-100".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Listening address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Upload storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding staged originals; `mobile/` and `desktop/` live inside it.
    pub root: String,
    /// URL path prefix the root is served under, e.g. `/uploads`.
    pub url_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "uploads".to_string(),
            url_prefix: "/uploads".to_string(),
        }
    }
}

/// Multipart intake rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntakeConfig {
    /// Name of the multipart field that carries files.
    pub field: String,
    /// Maximum number of files per request, counted before type filtering.
    pub max_files: usize,
    /// Exact MIME types accepted; anything else is skipped silently.
    pub allowed_types: Vec<String>,
    /// Request body limit in bytes. `None` disables the limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_request_bytes: Option<usize>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            field: "files".to_string(),
            max_files: 10,
            allowed_types: vec![
                "image/png".to_string(),
                "image/jpeg".to_string(),
                "image/jpg".to_string(),
            ],
            max_request_bytes: None,
        }
    }
}

/// Rendition generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenditionsConfig {
    /// Size of the region taken from the top-left corner, as `[width, height]`.
    pub crop: [u32; 2],
    /// Width of the mobile rendition.
    pub mobile_width: u32,
    /// Width of the desktop rendition.
    pub desktop_width: u32,
    /// JPEG encoding quality (1 = worst, 100 = best). PNG output is lossless.
    pub quality: u32,
}

impl Default for RenditionsConfig {
    fn default() -> Self {
        Self {
            crop: [600, 600],
            mobile_width: 480,
            desktop_width: 1920,
            quality: 80,
        }
    }
}

/// Rendition concurrency settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of renditions encoded at the same time.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective number of parallel renders from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.min(cores))
        .unwrap_or(cores)
        .max(1)
}

/// Log filter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ServerConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ServerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ServerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Responsive Uploads Configuration
# ================================
#
# All options are optional. Remove or comment out anything you don't need
# to change; stock defaults apply to missing keys. Unknown keys are errors.

# ---------------------------------------------------------------------------
# Listening address
# ---------------------------------------------------------------------------
[server]
host = "0.0.0.0"
port = 3000

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
# Originals are staged as <root>/<millis>-<original-name>; renditions use
# the same name under <root>/mobile/ and <root>/desktop/. Everything under
# the root is served read-only at <url_prefix>/...
[storage]
root = "uploads"
url_prefix = "/uploads"

# ---------------------------------------------------------------------------
# Intake
# ---------------------------------------------------------------------------
# Files whose Content-Type is not listed are skipped without an error.
[intake]
field = "files"
max_files = 10
allowed_types = ["image/png", "image/jpeg", "image/jpg"]
# Request body limit in bytes. Leave unset for no limit.
# max_request_bytes = 52428800

# ---------------------------------------------------------------------------
# Renditions
# ---------------------------------------------------------------------------
# Each rendition extracts `crop` from the top-left corner of the original,
# then scales it to the configured width (height keeps the crop's aspect).
# Images smaller than the crop fail the whole upload batch.
[renditions]
crop = [600, 600]
mobile_width = 480
desktop_width = 1920
quality = 80

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
# Renditions encoded in parallel. Omit for auto (= CPU cores).
# Values above the core count are clamped down.
[processing]
# max_processes = 4

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
# A tracing filter directive; RUST_LOG takes precedence when set.
[logging]
level = "info"
"##
}
