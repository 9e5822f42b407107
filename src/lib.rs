//! # scan2pdf
//!
//! Turn scanned images and PDFs into searchable PDFs with
//! [ocrmypdf](https://ocrmypdf.readthedocs.io/).
//!
//! All OCR work (deskewing, rotation detection, text-layer embedding) is done
//! by the external engine. This crate decides *what* to hand it: it resolves
//! a local path or downloads a URL, classifies the file by extension, overlays
//! caller options on a fixed default set, and names the output.
//!
//! ## Pipeline Overview
//!
//! ```text
//! path / URL / upload
//!  │
//!  ├─ 1. Input     local file, or GET with a 30 s timeout
//!  ├─ 2. Classify  .jpg .jpeg .png .bmp .tiff .tif → image, .pdf → PDF
//!  ├─ 3. Options   defaults ⊕ overrides
//!  ├─ 4. Engine    ocrmypdf <flags> <input> <output>  (spawn_blocking)
//!  └─ 5. Output    <output_dir>/<stem>_OCR.pdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scan2pdf::{Input, OptionOverrides, Processor, ProcessorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let processor = Processor::new(ProcessorConfig::default())?;
//!     let input = Input::parse("https://example.com/scans/page1.png");
//!     let output = processor.process(&input, None, &OptionOverrides::new()).await?;
//!     println!("searchable PDF: {}", output.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `scan2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! The web adapter in [`server`] is always compiled; run it with
//! `scan2pdf serve` or mount [`server::create_router`] in your own app.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CollisionPolicy, ProcessorConfig, ProcessorConfigBuilder};
pub use error::{EngineError, Scan2PdfError};
pub use options::{merge_options, parse_override, OcrOptions, OptionOverrides, OptionValue};
pub use pipeline::classify::{classify, FileKind};
pub use pipeline::engine::{OcrEngine, OcrmypdfEngine};
pub use pipeline::input::Input;
pub use process::Processor;
pub use progress::{NoopProgressCallback, ProgressCallback, WorkflowProgressCallback};
