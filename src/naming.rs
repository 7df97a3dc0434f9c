//! Staged filename convention: `<millis>-<original-name>`.
//!
//! Every accepted upload is stored under a name built from the moment its
//! destination was resolved (milliseconds since the Unix epoch) and the name
//! the client sent. The same name is reused for the mobile and desktop
//! renditions, so one filename identifies all three files of an upload:
//!
//! - `cat.jpg` at `1700000000123` → `1700000000123-cat.jpg`
//!
//! Two files with identical names resolved within the same millisecond
//! collide; the later write wins. Nothing here detects that.

/// Source of ingest timestamps, in milliseconds since the Unix epoch.
pub type Clock = fn() -> i64;

/// Wall-clock [`Clock`].
pub fn system_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Final path component of a client-supplied filename.
///
/// Clients normally send a bare name, but nothing stops them from sending
/// `../../etc/x`; only the last component is ever used on disk.
pub fn client_basename(original: &str) -> &str {
    original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(original)
}

/// Build the staged filename for an upload.
pub fn staged_name(original: &str, millis: i64) -> String {
    format!("{}-{}", millis, client_basename(original))
}

/// Result of parsing a staged filename like `1700000000123-cat.jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStagedName<'a> {
    pub millis: i64,
    pub original: &'a str,
}

/// Split a staged filename back into its timestamp and original name.
///
/// Returns `None` when the name does not start with `<digits>-`.
pub fn parse_staged_name(name: &str) -> Option<ParsedStagedName<'_>> {
    let (prefix, original) = name.split_once('-')?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(ParsedStagedName {
        millis: prefix.parse().ok()?,
        original,
    })
}
