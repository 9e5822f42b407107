//! Extension-based file classification.
//!
//! Only the filename suffix is inspected; file contents are never read. A
//! scan saved as `page.pdf` that is really a PNG is classified as a PDF and
//! the engine reports the problem.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Image extensions the engine accepts (lower-case, without the dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// PDF extensions (lower-case, without the dot).
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// What a file is, judging by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
    Unsupported,
}

impl FileKind {
    /// Article-prefixed name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            FileKind::Image => "an image",
            FileKind::Pdf => "a PDF",
            FileKind::Unsupported => "a supported file",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FileKind::Unsupported)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileKind::Image => "image",
            FileKind::Pdf => "pdf",
            FileKind::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// Classify `path` by its extension, case-insensitively.
pub fn classify(path: impl AsRef<Path>) -> FileKind {
    let ext = match path.as_ref().extension().and_then(|e| e.to_str()) {
        Some(e) => e.to_ascii_lowercase(),
        None => return FileKind::Unsupported,
    };

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Image
    } else if PDF_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Pdf
    } else {
        FileKind::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extensions_any_case() {
        for ext in IMAGE_EXTENSIONS {
            assert_eq!(classify(format!("scan.{ext}")), FileKind::Image, "{ext}");
            let upper = ext.to_ascii_uppercase();
            assert_eq!(classify(format!("scan.{upper}")), FileKind::Image, "{upper}");
        }
        assert_eq!(classify("Photo.JpEg"), FileKind::Image);
    }

    #[test]
    fn pdf_any_case() {
        assert_eq!(classify("doc.pdf"), FileKind::Pdf);
        assert_eq!(classify("DOC.PDF"), FileKind::Pdf);
        assert_eq!(classify("/tmp/input/report.Pdf"), FileKind::Pdf);
    }

    #[test]
    fn everything_else_is_unsupported() {
        assert_eq!(classify("notes.txt"), FileKind::Unsupported);
        assert_eq!(classify("archive.tar.gz"), FileKind::Unsupported);
        assert_eq!(classify("README"), FileKind::Unsupported);
        assert_eq!(classify(".pdf"), FileKind::Unsupported);
        assert_eq!(classify(""), FileKind::Unsupported);
    }

    #[test]
    fn only_last_extension_counts() {
        assert_eq!(classify("scan.pdf.txt"), FileKind::Unsupported);
        assert_eq!(classify("scan.txt.png"), FileKind::Image);
    }
}
