//! Error types for the graphical-abstract library.
//!
//! Every pipeline stage returns `Result<_, ConvertError>` and propagates with
//! `?`; nothing is caught mid-pipeline. The binary reports the error once and
//! exits with status 1.
//!
//! Variants are fine-grained so messages can be actionable, while
//! [`ConvertError::kind`] folds them into the four coarse [`ErrorKind`]s
//! callers usually branch on.

use std::path::PathBuf;
use thiserror::Error;

/// Installation guidance shown when no PDF renderer is available.
pub const RENDERER_INSTALL_HINT: &str = "\
Install a PDF renderer, then run again:\n\
  • PDFium: download libpdfium for your platform from\n\
    https://github.com/bblanchon/pdfium-binaries/releases and set\n\
    PDFIUM_LIB_PATH=/path/to/libpdfium\n\
  • Poppler (pdftoppm):\n\
      Mac:     brew install poppler\n\
      Linux:   apt-get install poppler-utils\n\
      Windows: https://github.com/oschwartz10612/poppler-windows/releases\n\
Alternatively, convert your PDF to an image format first using another tool,\n\
or keep it as vector output with --preserve-vector --pdf-only.";

/// Coarse classification of a [`ConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File missing or unreadable, not a PDF, zero-page PDF, undecodable image.
    InvalidInput,
    /// `preserve_vector` requested without `pdf_only`.
    UnsupportedCombination,
    /// No PDF rasteriser is installed and no fallback can produce an image.
    RenderingUnavailable,
    /// Any other codec, transform, or write failure.
    ProcessingFailure,
}

/// All errors returned by the graphical-abstract library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file '{path}' not found.\nCheck the path exists and is a regular file.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file has a `.pdf` extension but does not start with `%PDF`.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The PDF object graph cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The PDF parsed but contains no pages.
    #[error("Input PDF '{path}' has no pages")]
    EmptyPdf { path: PathBuf },

    /// Page 1 has no usable media box.
    #[error("Page 1 of '{path}' has no usable media box: {detail}")]
    InvalidMediaBox { path: PathBuf, detail: String },

    /// The raster image could not be decoded.
    #[error("Error opening input file '{path}': {detail}")]
    DecodeFailed { path: PathBuf, detail: String },

    // ── Option errors ─────────────────────────────────────────────────────
    /// Vector preservation only makes sense when raster outputs are skipped.
    #[error(
        "--preserve-vector requires --pdf-only to avoid rasterization.\n\
Please add the --pdf-only option when using --preserve-vector."
    )]
    UnsupportedCombination,

    // ── Rendering errors ──────────────────────────────────────────────────
    /// No PDF rasteriser is available.
    #[error("Cannot convert PDF to image: no PDF renderer is available.\n{hint}")]
    RenderingUnavailable { hint: String },

    /// The renderer was available but failed on this document.
    #[error("Rasterisation failed for page 1 ({renderer}): {detail}")]
    RasterisationFailed { renderer: String, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// TIFF or PNG encoding failed.
    #[error("Failed to encode {format} output '{path}': {detail}")]
    EncodeFailed {
        format: &'static str,
        path: PathBuf,
        detail: String,
    },

    /// Building or serialising an output PDF failed.
    #[error("Failed to build PDF output: {0}")]
    PdfWriteFailed(String),

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Classify this error into one of the four [`ErrorKind`]s.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::FileNotFound { .. }
            | ConvertError::PermissionDenied { .. }
            | ConvertError::NotAPdf { .. }
            | ConvertError::CorruptPdf { .. }
            | ConvertError::EmptyPdf { .. }
            | ConvertError::InvalidMediaBox { .. }
            | ConvertError::DecodeFailed { .. } => ErrorKind::InvalidInput,
            ConvertError::UnsupportedCombination => ErrorKind::UnsupportedCombination,
            ConvertError::RenderingUnavailable { .. } => ErrorKind::RenderingUnavailable,
            ConvertError::RasterisationFailed { .. }
            | ConvertError::EncodeFailed { .. }
            | ConvertError::PdfWriteFailed(_)
            | ConvertError::OutputWriteFailed { .. }
            | ConvertError::Internal(_) => ErrorKind::ProcessingFailure,
        }
    }

    /// Shorthand for [`ConvertError::RenderingUnavailable`] with the standard hint.
    pub fn rendering_unavailable() -> Self {
        ConvertError::RenderingUnavailable {
            hint: RENDERER_INSTALL_HINT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_combination_mentions_both_flags() {
        let msg = ConvertError::UnsupportedCombination.to_string();
        assert!(msg.contains("--preserve-vector"), "got: {msg}");
        assert!(msg.contains("--pdf-only"), "got: {msg}");
    }

    #[test]
    fn rendering_unavailable_carries_install_guidance() {
        let e = ConvertError::rendering_unavailable();
        let msg = e.to_string();
        assert!(msg.contains("PDFIUM_LIB_PATH"), "got: {msg}");
        assert!(msg.contains("poppler"), "got: {msg}");
        assert_eq!(e.kind(), ErrorKind::RenderingUnavailable);
    }

    #[test]
    fn input_errors_classify_as_invalid_input() {
        let e = ConvertError::EmptyPdf {
            path: PathBuf::from("blank.pdf"),
        };
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
        assert!(e.to_string().contains("no pages"));

        let e = ConvertError::FileNotFound {
            path: PathBuf::from("missing.png"),
        };
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
        assert!(e.to_string().contains("missing.png"));
    }

    #[test]
    fn write_errors_classify_as_processing_failure() {
        let e = ConvertError::OutputWriteFailed {
            path: PathBuf::from("/ro/out.png"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(e.kind(), ErrorKind::ProcessingFailure);
        assert!(e.to_string().contains("/ro/out.png"));
    }
}
