//! Storing uploaded files under the media root.

use crate::config::CollisionPolicy;
use crate::error::Scan2PdfError;
use crate::pipeline::input::ensure_dir;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

static RE_UNSAFE_FILENAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^-\w.]").unwrap());

/// Reduce a client-supplied filename to something safe to join onto a
/// directory.
///
/// Directory components (either separator) are dropped, surrounding
/// whitespace is trimmed, inner spaces become `_`, and anything outside
/// `[-\w.]` is removed. Returns `None` when nothing usable is left.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let spaced = base.trim().replace(' ', "_");
    let cleaned = RE_UNSAFE_FILENAME_CHARS.replace_all(&spaced, "");
    match cleaned.as_ref() {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Write an uploaded body to `dir/<sanitised name>`, creating `dir` first.
pub async fn save_upload(
    dir: &Path,
    filename: &str,
    data: &[u8],
    policy: CollisionPolicy,
) -> Result<PathBuf, Scan2PdfError> {
    let name = sanitize_filename(filename).ok_or_else(|| {
        Scan2PdfError::Validation(format!("Invalid upload filename: '{filename}'"))
    })?;

    ensure_dir(dir)?;
    let path = policy.resolve(dir.join(name))?;

    tokio::fs::write(&path, data)
        .await
        .map_err(|source| Scan2PdfError::OutputWriteFailed {
            path: path.clone(),
            source,
        })?;

    debug!("Saved upload ({} bytes) to {}", data.len(), path.display());
    Ok(path)
}
