//! # graphical-abstract
//!
//! Normalise a figure (TIFF, PDF, JPEG or PNG) into a journal-ready graphical
//! abstract: a 1200×1200 px square at 300 dpi, written as TIFF, PNG and PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input
//!  │
//!  ├─ 1. Route      extension + flags → vector PDF, rasterised PDF, or image
//!  ├─ 2. Rasterise  PDF page 1 at 300 dpi (PDFium or pdftoppm, optional)
//!  ├─ 3. Normalise  fit longer side to 1200 px, centre on white
//!  └─ 4. Write      TIFF (LZW) + PNG (pHYs) + PDF (288 pt page)
//! ```
//!
//! With `preserve_vector` a PDF's first page is instead placed on a 288 pt
//! page through a transform matrix, keeping text and paths as vectors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graphical_abstract::{convert, detect_renderer, ConversionConfig, RenderBackend};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .maybe_renderer(detect_renderer(RenderBackend::Auto))
//!         .build()?;
//!     let report = convert("figure.pdf", &config)?;
//!     for artifact in &report.artifacts {
//!         println!("{} saved: {}", artifact.format, artifact.path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `convert` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! graphical-abstract = { version = "0.5", default-features = false }
//! ```
//!
//! ## PDF Rendering
//!
//! Rasterising a PDF needs either a PDFium shared library (found via
//! `PDFIUM_LIB_PATH`, a per-user cache directory, the executable's directory,
//! or the system search path) or poppler's `pdftoppm` on `PATH`. Without one,
//! PDF input fails with [`ConvertError::RenderingUnavailable`] unless
//! `preserve_vector` is set.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, RenderBackend};
pub use convert::{convert, plan};
pub use error::{ConvertError, ErrorKind};
pub use output::{Artifact, ConversionMode, ConversionReport, OutputFormat};
pub use pipeline::normalize::{Canvas, Placement};
pub use pipeline::render::{detect as detect_renderer, PageRenderer};
pub use pipeline::vector::VectorTransform;
