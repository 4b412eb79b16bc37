//! Configuration types for graphical-abstract conversion.
//!
//! The output geometry is fixed: every artifact is a 1200 px square at
//! 300 dpi (a 288 pt page). Only the output selection and the optional PDF
//! renderer vary between runs, and both live in [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`].

use crate::error::ConvertError;
use crate::pipeline::render::PageRenderer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ── Fixed geometry ───────────────────────────────────────────────────────

/// Side length of the output canvas in pixels.
pub const CANVAS_PX: u32 = 1200;

/// Resolution embedded in every output, and used when rasterising PDFs.
pub const TARGET_DPI: u32 = 300;

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Side length of the output PDF page in points: 1200 / 300 * 72 = 288.
pub const TARGET_PT: f32 = CANVAS_PX as f32 / TARGET_DPI as f32 * POINTS_PER_INCH;

/// Configuration for a single conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use graphical_abstract::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .pdf_only(true)
///     .preserve_vector(true)
///     .build()
///     .unwrap();
/// assert!(config.preserve_vector);
/// ```
#[derive(Clone, Default)]
pub struct ConversionConfig {
    /// Reposition a PDF's first page as vectors instead of rasterising it.
    ///
    /// Only meaningful for PDF input and only valid together with
    /// [`pdf_only`](Self::pdf_only). Ignored (with a warning) for raster input.
    pub preserve_vector: bool,

    /// Write only the PDF artifact; skip TIFF and PNG.
    pub pdf_only: bool,

    /// PDF rasteriser used for PDF input without `preserve_vector`.
    ///
    /// `None` is the "unavailable" state: rasterising a PDF then fails with
    /// [`ConvertError::RenderingUnavailable`]. Detect one at startup with
    /// [`crate::pipeline::render::detect`].
    pub renderer: Option<Arc<dyn PageRenderer>>,
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("preserve_vector", &self.preserve_vector)
            .field("pdf_only", &self.pdf_only)
            .field("renderer", &self.renderer.as_ref().map(|r| r.name()))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Reject flag combinations that cannot be honoured.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.preserve_vector && !self.pdf_only {
            return Err(ConvertError::UnsupportedCombination);
        }
        Ok(())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn preserve_vector(mut self, v: bool) -> Self {
        self.config.preserve_vector = v;
        self
    }

    pub fn pdf_only(mut self, v: bool) -> Self {
        self.config.pdf_only = v;
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    /// Set or clear the renderer from a detection result.
    pub fn maybe_renderer(mut self, renderer: Option<Arc<dyn PageRenderer>>) -> Self {
        self.config.renderer = renderer;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which PDF rasteriser to look for at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderBackend {
    /// PDFium if it can be bound, else poppler's `pdftoppm`. (default)
    #[default]
    Auto,
    /// PDFium only.
    Pdfium,
    /// Poppler's `pdftoppm` only.
    Pdftoppm,
    /// Never rasterise; PDF input needs `preserve_vector`.
    None,
}
