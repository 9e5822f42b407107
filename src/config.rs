//! Configuration types for the ingestion and dispatch workflow.
//!
//! All workflow behaviour is controlled through [`ProcessorConfig`], built
//! via its [`ProcessorConfigBuilder`] or taken from
//! [`ProcessorConfig::default()`].

use crate::error::Scan2PdfError;
use crate::options::OcrOptions;
use crate::pipeline::engine::OcrEngine;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default cap on a remote download body.
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Configuration for a [`crate::Processor`].
///
/// # Example
/// ```rust
/// use scan2pdf::{CollisionPolicy, ProcessorConfig};
///
/// let config = ProcessorConfig::builder()
///     .output_dir("media/output")
///     .download_timeout_secs(60)
///     .collision_policy(CollisionPolicy::Version)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ProcessorConfig {
    /// Directory receiving every derived `<stem>_OCR.pdf`. Created if absent.
    /// Default: `output`.
    pub output_dir: PathBuf,

    /// Directory receiving downloaded inputs. `None` means `output_dir`,
    /// which is where downloads have always landed.
    pub download_dir: Option<PathBuf>,

    /// Timeout for remote fetches, in seconds. Default: 30.
    ///
    /// Applies to the download only. The OCR engine call has no timeout.
    pub download_timeout_secs: u64,

    /// Largest accepted download body, in bytes. Default: 50 MiB.
    pub max_download_bytes: u64,

    /// Path or name of the `ocrmypdf` executable. Default: `ocrmypdf`.
    pub engine_binary: String,

    /// Pre-constructed engine. Takes precedence over `engine_binary`.
    pub engine: Option<Arc<dyn OcrEngine>>,

    /// Options every request starts from before caller overrides are applied.
    /// Default: [`OcrOptions::default()`].
    pub default_options: OcrOptions,

    /// What to do when a derived destination already exists. Default: overwrite.
    pub collision_policy: CollisionPolicy,

    /// Optional observer for download and OCR events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            download_dir: None,
            download_timeout_secs: 30,
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
            engine_binary: "ocrmypdf".to_string(),
            engine: None,
            default_options: OcrOptions::default(),
            collision_policy: CollisionPolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ProcessorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorConfig")
            .field("output_dir", &self.output_dir)
            .field("download_dir", &self.download_dir)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("max_download_bytes", &self.max_download_bytes)
            .field("engine_binary", &self.engine_binary)
            .field("engine", &self.engine.as_ref().map(|_| "<dyn OcrEngine>"))
            .field("default_options", &self.default_options)
            .field("collision_policy", &self.collision_policy)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn WorkflowProgressCallback>"),
            )
            .finish()
    }
}

impl ProcessorConfig {
    /// Create a new builder for `ProcessorConfig`.
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder {
            config: Self::default(),
        }
    }

    /// Directory downloads are written to.
    pub fn download_dir(&self) -> &Path {
        self.download_dir.as_deref().unwrap_or(&self.output_dir)
    }
}

/// Builder for [`ProcessorConfig`].
#[derive(Debug)]
pub struct ProcessorConfigBuilder {
    config: ProcessorConfig,
}

impl ProcessorConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.download_dir = Some(dir.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs.max(1);
        self
    }

    pub fn max_download_bytes(mut self, bytes: u64) -> Self {
        self.config.max_download_bytes = bytes.max(1);
        self
    }

    pub fn engine_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.engine_binary = binary.into();
        self
    }

    pub fn engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    pub fn default_options(mut self, options: OcrOptions) -> Self {
        self.config.default_options = options;
        self
    }

    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.config.collision_policy = policy;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ProcessorConfig, Scan2PdfError> {
        let c = &self.config;
        if c.output_dir.as_os_str().is_empty() {
            return Err(Scan2PdfError::InvalidConfig(
                "Output directory must not be empty".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(Scan2PdfError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        if c.engine.is_none() && c.engine_binary.trim().is_empty() {
            return Err(Scan2PdfError::InvalidConfig(
                "Engine binary must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Behaviour when a derived output or download path already exists.
///
/// Only paths the workflow derives itself are affected. A path the caller
/// passes explicitly is always written as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Replace the existing file and log a warning. (default)
    #[default]
    Overwrite,
    /// Refuse with [`Scan2PdfError::OutputExists`].
    Fail,
    /// Pick the first free `<stem>_N.<ext>`, starting at 1.
    Version,
}

impl CollisionPolicy {
    /// Resolve `candidate` against the filesystem according to the policy.
    pub fn resolve(&self, candidate: PathBuf) -> Result<PathBuf, Scan2PdfError> {
        if !candidate.exists() {
            return Ok(candidate);
        }
        match self {
            CollisionPolicy::Overwrite => {
                tracing::warn!("Overwriting existing file: {}", candidate.display());
                Ok(candidate)
            }
            CollisionPolicy::Fail => Err(Scan2PdfError::OutputExists { path: candidate }),
            CollisionPolicy::Version => Ok(next_free_version(&candidate)),
        }
    }
}

fn next_free_version(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    let mut n = 1u32;
    loop {
        let name = match &ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ProcessorConfig::default();
        assert_eq!(c.output_dir, PathBuf::from("output"));
        assert_eq!(c.download_dir(), Path::new("output"));
        assert_eq!(c.download_timeout_secs, 30);
        assert_eq!(c.max_download_bytes, DEFAULT_MAX_DOWNLOAD_BYTES);
        assert_eq!(c.engine_binary, "ocrmypdf");
        assert_eq!(c.collision_policy, CollisionPolicy::Overwrite);
        assert_eq!(c.default_options, OcrOptions::default());
    }

    #[test]
    fn builder_clamps_timeout() {
        let c = ProcessorConfig::builder()
            .download_timeout_secs(0)
            .build()
            .unwrap();
        assert_eq!(c.download_timeout_secs, 1);
    }

    #[test]
    fn builder_clamps_download_cap() {
        let c = ProcessorConfig::builder()
            .max_download_bytes(0)
            .build()
            .unwrap();
        assert_eq!(c.max_download_bytes, 1);
    }

    #[test]
    fn builder_rejects_empty_output_dir() {
        let err = ProcessorConfig::builder().output_dir("").build().unwrap_err();
        assert!(matches!(err, Scan2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_blank_engine_binary() {
        let err = ProcessorConfig::builder()
            .engine_binary("  ")
            .build()
            .unwrap_err();
        assert!(matches!(err, Scan2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn explicit_download_dir_wins() {
        let c = ProcessorConfig::builder()
            .output_dir("out")
            .download_dir("downloads")
            .build()
            .unwrap();
        assert_eq!(c.download_dir(), Path::new("downloads"));
    }

    #[test]
    fn collision_free_path_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("scan_OCR.pdf");
        for policy in [
            CollisionPolicy::Overwrite,
            CollisionPolicy::Fail,
            CollisionPolicy::Version,
        ] {
            assert_eq!(policy.resolve(p.clone()).unwrap(), p);
        }
    }

    #[test]
    fn collision_policies_on_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("scan_OCR.pdf");
        std::fs::write(&p, b"old").unwrap();

        assert_eq!(CollisionPolicy::Overwrite.resolve(p.clone()).unwrap(), p);
        assert!(matches!(
            CollisionPolicy::Fail.resolve(p.clone()),
            Err(Scan2PdfError::OutputExists { .. })
        ));
        assert_eq!(
            CollisionPolicy::Version.resolve(p.clone()).unwrap(),
            dir.path().join("scan_OCR_1.pdf")
        );

        std::fs::write(dir.path().join("scan_OCR_1.pdf"), b"old").unwrap();
        assert_eq!(
            CollisionPolicy::Version.resolve(p).unwrap(),
            dir.path().join("scan_OCR_2.pdf")
        );
    }
}
