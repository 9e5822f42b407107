//! Workflow entry points: classify, merge options, dispatch to the engine.
//!
//! A [`Processor`] holds an immutable [`ProcessorConfig`] and a resolved
//! engine. It keeps no per-request state, so one instance can be shared
//! across threads and web requests. Each call runs its steps strictly in
//! sequence (fetch, classify, OCR) and fails fast on the first error.

use crate::config::ProcessorConfig;
use crate::error::{EngineError, Scan2PdfError};
use crate::options::{merge_options, OcrOptions, OptionOverrides};
use crate::pipeline::classify::{classify, FileKind};
use crate::pipeline::engine::{OcrEngine, OcrmypdfEngine};
use crate::pipeline::input::{self, Input};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Suffix appended to the input's stem to name the output PDF.
pub const OUTPUT_SUFFIX: &str = "_OCR";

/// Runs the ingestion and dispatch workflow.
///
/// # Example
/// ```rust,no_run
/// use scan2pdf::{OptionOverrides, Processor, ProcessorConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let processor = Processor::new(ProcessorConfig::default())?;
/// let output = processor
///     .dispatch("input/doc.pdf", None, &OptionOverrides::new())
///     .await?;
/// println!("{}", output.display());
/// # Ok(())
/// # }
/// ```
pub struct Processor {
    config: ProcessorConfig,
    engine: Arc<dyn OcrEngine>,
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("config", &self.config)
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl Processor {
    /// Build a processor, creating the output directory if it is missing.
    pub fn new(config: ProcessorConfig) -> Result<Self, Scan2PdfError> {
        input::ensure_dir(&config.output_dir)?;
        let engine = resolve_engine(&config);
        debug!(
            "Processor ready: engine={}, output_dir={}",
            engine.name(),
            config.output_dir.display()
        );
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Fetch `url` to a local file.
    ///
    /// Destination is `save_path` when given, else the last URL segment
    /// inside the download directory.
    pub async fn fetch(&self, url: &str, save_path: Option<&Path>) -> Result<PathBuf, Scan2PdfError> {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_download_start(url);
        }
        let downloaded = match input::fetch(
            url,
            self.config.download_dir(),
            save_path,
            self.config.download_timeout_secs,
            self.config.max_download_bytes,
            self.config.collision_policy,
        )
        .await
        {
            Ok(d) => d,
            Err(e) => {
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_download_error(url, &e.to_string());
                }
                return Err(e);
            }
        };
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_download_complete(&downloaded.path, downloaded.bytes);
        }
        Ok(downloaded.path)
    }

    /// Overlay `overrides` on this processor's default options.
    pub fn merge_options(&self, overrides: &OptionOverrides) -> OcrOptions {
        merge_options(&self.config.default_options, overrides)
    }

    /// The output path used when the caller does not give one:
    /// `<output_dir>/<stem>_OCR.pdf`.
    pub fn default_output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.config
            .output_dir
            .join(format!("{stem}{OUTPUT_SUFFIX}.pdf"))
    }

    /// Classify `input`, then OCR it if it is an image or a PDF.
    ///
    /// # Errors
    /// - [`Scan2PdfError::UnsupportedFormat`] before any engine call
    /// - [`Scan2PdfError::FileNotFound`] when the input is missing
    /// - [`Scan2PdfError::Engine`] with the engine's own failure
    pub async fn dispatch(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        overrides: &OptionOverrides,
    ) -> Result<PathBuf, Scan2PdfError> {
        let input = input.as_ref();
        match classify(input) {
            FileKind::Unsupported => self.fail(Scan2PdfError::UnsupportedFormat {
                path: input.to_path_buf(),
            }),
            kind => self.run(input, kind, output, overrides).await,
        }
    }

    /// OCR an image. Any other kind is rejected without calling the engine.
    pub async fn process_image(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        overrides: &OptionOverrides,
    ) -> Result<PathBuf, Scan2PdfError> {
        self.process_expecting(input.as_ref(), FileKind::Image, output, overrides)
            .await
    }

    /// OCR a PDF. Any other kind is rejected without calling the engine.
    pub async fn process_pdf(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        overrides: &OptionOverrides,
    ) -> Result<PathBuf, Scan2PdfError> {
        self.process_expecting(input.as_ref(), FileKind::Pdf, output, overrides)
            .await
    }

    /// Fetch `url`, then [`dispatch`](Self::dispatch) the downloaded file.
    ///
    /// A failed fetch returns before the engine is ever touched.
    pub async fn process_from_url(
        &self,
        url: &str,
        output: Option<&Path>,
        overrides: &OptionOverrides,
    ) -> Result<PathBuf, Scan2PdfError> {
        let downloaded = self.fetch(url, None).await?;
        self.dispatch(&downloaded, output, overrides).await
    }

    /// Route a tagged [`Input`] to [`dispatch`](Self::dispatch) or
    /// [`process_from_url`](Self::process_from_url).
    pub async fn process(
        &self,
        input: &Input,
        output: Option<&Path>,
        overrides: &OptionOverrides,
    ) -> Result<PathBuf, Scan2PdfError> {
        match input {
            Input::LocalPath(path) => self.dispatch(path, output, overrides).await,
            Input::RemoteUrl(url) => self.process_from_url(url, output, overrides).await,
        }
    }

    /// Synchronous wrapper around [`process`](Self::process).
    ///
    /// Creates a temporary tokio runtime internally; do not call it from
    /// inside an async context.
    pub fn process_sync(
        &self,
        input: &Input,
        output: Option<&Path>,
        overrides: &OptionOverrides,
    ) -> Result<PathBuf, Scan2PdfError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| Scan2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.process(input, output, overrides))
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    async fn process_expecting(
        &self,
        input: &Path,
        expected: FileKind,
        output: Option<&Path>,
        overrides: &OptionOverrides,
    ) -> Result<PathBuf, Scan2PdfError> {
        let kind = classify(input);
        if kind != expected {
            return self.fail(Scan2PdfError::KindMismatch {
                path: input.to_path_buf(),
                expected,
            });
        }
        self.run(input, kind, output, overrides).await
    }

    async fn run(
        &self,
        input: &Path,
        kind: FileKind,
        output: Option<&Path>,
        overrides: &OptionOverrides,
    ) -> Result<PathBuf, Scan2PdfError> {
        if !input.is_file() {
            return self.fail(Scan2PdfError::FileNotFound {
                path: input.to_path_buf(),
            });
        }

        let output = match output {
            Some(p) => p.to_path_buf(),
            None => match self
                .config
                .collision_policy
                .resolve(self.default_output_path(input))
            {
                Ok(p) => p,
                Err(e) => return self.fail(e),
            },
        };
        let options = self.merge_options(overrides);

        info!("OCR {} ({}) → {}", input.display(), kind, output.display());
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_ocr_start(input, kind);
        }

        let start = Instant::now();
        let engine = Arc::clone(&self.engine);
        let (src, dst) = (input.to_path_buf(), output.clone());
        let result = tokio::task::spawn_blocking(move || engine.ocr(&src, &dst, &options))
            .await
            .map_err(|e| EngineError::Other(format!("engine task panicked: {e}")))
            .and_then(|r| r);

        match result {
            Ok(()) => {
                info!(
                    "OCR complete: {} in {}ms",
                    output.display(),
                    start.elapsed().as_millis()
                );
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_ocr_complete(&output);
                }
                Ok(output)
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Report a failed OCR step to the progress callback and return it.
    fn fail<T>(&self, error: Scan2PdfError) -> Result<T, Scan2PdfError> {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_ocr_error(&error.to_string());
        }
        Err(error)
    }
}

/// Pick the engine: a pre-built one from the config, else `ocrmypdf` at the
/// configured binary path.
fn resolve_engine(config: &ProcessorConfig) -> Arc<dyn OcrEngine> {
    match config.engine {
        Some(ref engine) => Arc::clone(engine),
        None => Arc::new(OcrmypdfEngine::new(config.engine_binary.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor_in(dir: &Path) -> Processor {
        let config = ProcessorConfig::builder()
            .output_dir(dir.join("output"))
            .build()
            .unwrap();
        Processor::new(config).unwrap()
    }

    #[test]
    fn new_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let _p = processor_in(dir.path());
        assert!(dir.path().join("output").is_dir());
    }

    #[test]
    fn default_output_path_appends_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let p = processor_in(dir.path());
        let out = p.default_output_path(Path::new("scan.jpg"));
        assert_eq!(out, dir.path().join("output").join("scan_OCR.pdf"));
        assert_eq!(out.file_stem().unwrap(), "scan_OCR");
        assert_eq!(out.extension().unwrap(), "pdf");
    }

    #[test]
    fn default_output_never_equals_input() {
        let dir = tempfile::tempdir().unwrap();
        let p = processor_in(dir.path());
        let input = dir.path().join("output").join("doc.pdf");
        assert_ne!(p.default_output_path(&input), input);
    }

    #[test]
    fn default_engine_is_ocrmypdf() {
        let dir = tempfile::tempdir().unwrap();
        let p = processor_in(dir.path());
        assert_eq!(p.engine.name(), "ocrmypdf");
    }
}
