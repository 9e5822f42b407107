//! The external OCR engine seam.
//!
//! [`OcrEngine`] is the single contract the workflow needs: take an input
//! path, an output path and an option set, and leave a searchable PDF at the
//! output path or return an [`EngineError`]. The call is blocking; the
//! workflow runs it on tokio's blocking pool.
//!
//! [`OcrmypdfEngine`] fulfils the contract by running the `ocrmypdf`
//! command-line tool.

use crate::error::EngineError;
use crate::options::{OcrOptions, OptionValue, PROGRESS_INDICATOR};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Lines of engine stderr kept in [`EngineError::Failed`].
const STDERR_TAIL_LINES: usize = 20;

/// Something that turns an image or PDF into a searchable PDF.
pub trait OcrEngine: Send + Sync {
    /// Run OCR on `input`, writing the searchable PDF to `output`.
    fn ocr(&self, input: &Path, output: &Path, options: &OcrOptions) -> Result<(), EngineError>;

    /// Short name used in log lines.
    fn name(&self) -> &str {
        "ocr-engine"
    }
}

/// Runs the `ocrmypdf` executable.
#[derive(Debug, Clone)]
pub struct OcrmypdfEngine {
    binary: String,
}

impl Default for OcrmypdfEngine {
    fn default() -> Self {
        Self::new("ocrmypdf")
    }
}

impl OcrmypdfEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Whether the binary can be spawned and answers `--version`.
    pub fn is_available(&self) -> bool {
        self.version().is_some()
    }

    /// The engine's reported version, if it runs at all.
    pub fn version(&self) -> Option<String> {
        let output = Command::new(&self.binary).arg("--version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl OcrEngine for OcrmypdfEngine {
    fn ocr(&self, input: &Path, output: &Path, options: &OcrOptions) -> Result<(), EngineError> {
        let args = build_args(input, output, options);
        debug!("{} {:?}", self.binary, args);

        let result = Command::new(&self.binary).args(&args).output();
        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EngineError::NotInstalled {
                    binary: self.binary.clone(),
                });
            }
            Err(e) => return Err(EngineError::Io(e)),
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(EngineError::Failed {
                code: out.status.code().unwrap_or(-1),
                stderr: stderr_tail(&stderr),
            });
        }

        if !output.exists() {
            return Err(EngineError::MissingOutput {
                path: output.to_path_buf(),
            });
        }

        info!("ocrmypdf wrote {}", output.display());
        Ok(())
    }

    fn name(&self) -> &str {
        "ocrmypdf"
    }
}

/// Translate an option set into `ocrmypdf` command-line arguments.
///
/// * `true` flags become `--key-with-dashes`; `false` flags are omitted.
/// * `progress_indicator` maps onto ocrmypdf's progress bar: only `false`
///   emits anything (`--no-progress-bar`).
/// * Any other value becomes `--key value`.
///
/// Input and output paths come last.
pub fn build_args(input: &Path, output: &Path, options: &OcrOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(options.len() + 2);

    for (key, value) in options.iter() {
        let flag = format!("--{}", key.replace('_', "-"));
        match (key, value) {
            (PROGRESS_INDICATOR, OptionValue::Bool(true)) => {}
            (PROGRESS_INDICATOR, OptionValue::Bool(false)) => {
                args.push("--no-progress-bar".into());
            }
            (_, OptionValue::Bool(true)) => args.push(flag.into()),
            (_, OptionValue::Bool(false)) => {}
            (_, other) => {
                args.push(flag.into());
                args.push(other.to_string().into());
            }
        }
    }

    args.push(input.as_os_str().to_owned());
    args.push(output.as_os_str().to_owned());
    args
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
