//! Pipeline stages for turning a scan into a searchable PDF.
//!
//! ```text
//! input ──▶ classify ──▶ engine
//! (URL/path)  (extension)  (ocrmypdf)
//! ```
//!
//! 1. [`input`]   : resolve a local path or fetch a URL to a local file
//! 2. [`classify`]: image, PDF or unsupported, by extension only
//! 3. [`engine`]  : hand the file and the merged options to the OCR engine
//!
//! Option merging lives in [`crate::options`]; the stages are strung
//! together by [`crate::process::Processor`].

pub mod classify;
pub mod engine;
pub mod input;
