//! Input resolution: turn a local path or a remote URL into a local file.
//!
//! Remote files are fetched with a single GET bounded by the configured
//! timeout. Any failure (timeout, refused connection, non-2xx status) is a
//! [`Scan2PdfError::Retrieval`] and nothing is retried. The body is written
//! to a temp file next to the destination and renamed into place, so a
//! failed write never leaves a truncated file under the final name.

use crate::config::CollisionPolicy;
use crate::error::Scan2PdfError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Filename used when the URL path has no usable last segment.
pub const FALLBACK_DOWNLOAD_NAME: &str = "download";

/// Where a request's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A file already on the local filesystem.
    LocalPath(PathBuf),
    /// An `http://` or `https://` URL to fetch first.
    RemoteUrl(String),
}

impl Input {
    /// Classify a user-supplied string as a URL or a local path.
    pub fn parse(raw: &str) -> Self {
        if is_url(raw) {
            Input::RemoteUrl(raw.to_string())
        } else {
            Input::LocalPath(PathBuf::from(raw))
        }
    }
}

impl From<PathBuf> for Input {
    fn from(p: PathBuf) -> Self {
        Input::LocalPath(p)
    }
}

impl From<&Path> for Input {
    fn from(p: &Path) -> Self {
        Input::LocalPath(p.to_path_buf())
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// A file fetched from a URL.
#[derive(Debug, Clone)]
pub struct Downloaded {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Fetch `url` into `save_path`, or into `download_dir/<last URL segment>`.
///
/// An explicit `save_path` is written as given. A derived destination goes
/// through `policy` before the request is sent. Bodies larger than
/// `max_bytes` are rejected as a [`Scan2PdfError::Retrieval`].
pub async fn fetch(
    url: &str,
    download_dir: &Path,
    save_path: Option<&Path>,
    timeout_secs: u64,
    max_bytes: u64,
    policy: CollisionPolicy,
) -> Result<Downloaded, Scan2PdfError> {
    info!("Downloading from: {}", url);

    let retrieval = |reason: String| Scan2PdfError::Retrieval {
        url: url.to_string(),
        reason,
    };
    let transfer_error = |e: reqwest::Error| {
        if e.is_timeout() {
            retrieval(format!("timed out after {timeout_secs}s"))
        } else {
            retrieval(e.to_string())
        }
    };
    let too_large = || retrieval(format!("response exceeds the {max_bytes} byte limit"));

    let parsed = reqwest::Url::parse(url).map_err(|e| retrieval(format!("invalid URL: {e}")))?;

    let dest = match save_path {
        Some(p) => p.to_path_buf(),
        None => {
            ensure_dir(download_dir)?;
            policy.resolve(download_dir.join(filename_from_url(&parsed)))?
        }
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| retrieval(e.to_string()))?;

    let mut response = client.get(parsed).send().await.map_err(transfer_error)?;

    if !response.status().is_success() {
        return Err(retrieval(format!("HTTP {}", response.status())));
    }
    if response.content_length().is_some_and(|len| len > max_bytes) {
        return Err(too_large());
    }

    // Content-Length may be absent or wrong; enforce the cap on what arrives.
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(transfer_error)? {
        if (body.len() + chunk.len()) as u64 > max_bytes {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }

    let bytes = body.len() as u64;
    let target = dest.clone();
    tokio::task::spawn_blocking(move || write_atomically(&target, &body))
        .await
        .map_err(|e| Scan2PdfError::Internal(format!("Download write task panicked: {e}")))?
        .map_err(|source| Scan2PdfError::OutputWriteFailed {
            path: dest.clone(),
            source,
        })?;

    info!("Downloaded {} bytes to: {}", bytes, dest.display());
    Ok(Downloaded { path: dest, bytes })
}

/// Last non-empty path segment of the URL, or [`FALLBACK_DOWNLOAD_NAME`].
pub fn filename_from_url(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|last| !last.is_empty() && *last != "." && *last != "..")
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_DOWNLOAD_NAME.to_string())
}

/// Create `dir` (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), Scan2PdfError> {
    std::fs::create_dir_all(dir).map_err(|source| Scan2PdfError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_atomically(dest: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.persist(dest).map_err(|e| e.error)?;
    debug!("Persisted {}", dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url("ftp://example.com/doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn input_parse_picks_variant() {
        assert_eq!(
            Input::parse("https://example.com/scan.png"),
            Input::RemoteUrl("https://example.com/scan.png".into())
        );
        assert_eq!(
            Input::parse("input/doc.pdf"),
            Input::LocalPath(PathBuf::from("input/doc.pdf"))
        );
    }

    #[test]
    fn filename_is_last_segment() {
        let url = reqwest::Url::parse(
            "https://github.com/fraponyo94/Text-Extraction-Scanned-Pdf/raw/master/sample-scanned-pdfs/pdf_sample2.pdf",
        )
        .unwrap();
        assert_eq!(filename_from_url(&url), "pdf_sample2.pdf");
    }

    #[test]
    fn filename_ignores_query_string() {
        let url = reqwest::Url::parse("https://example.com/files/scan.jpg?token=abc").unwrap();
        assert_eq!(filename_from_url(&url), "scan.jpg");
    }

    #[test]
    fn filename_falls_back_without_segment() {
        let url = reqwest::Url::parse("https://example.com/files/").unwrap();
        assert_eq!(filename_from_url(&url), FALLBACK_DOWNLOAD_NAME);
        let url = reqwest::Url::parse("https://example.com").unwrap();
        assert_eq!(filename_from_url(&url), FALLBACK_DOWNLOAD_NAME);
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("scan.pdf");
        std::fs::write(&dest, b"old").unwrap();
        write_atomically(&dest, b"new").unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn invalid_url_is_retrieval_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = fetch(
            "http://",
            dir.path(),
            None,
            5,
            1024,
            CollisionPolicy::Overwrite,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Scan2PdfError::Retrieval { .. }), "got {err:?}");
    }
}
