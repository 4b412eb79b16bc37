//! PDF rasterisation: render page 1 to a `DynamicImage` at 300 dpi.
//!
//! Rendering is an optional capability. [`detect`] probes for a backend once
//! at startup and the result is injected through
//! [`crate::ConversionConfig::renderer`]; `None` means unavailable.
//!
//! ## Fallback
//!
//! When the renderer fails on the original file (unusual page trees,
//! incremental updates, broken xref tables) we copy page 1 into a fresh
//! single-page PDF and try again. Re-serialising through `lopdf` often
//! yields a file the renderer accepts. The intermediate file is a
//! [`NamedTempFile`], removed when it drops on every exit path.

use crate::config::{RenderBackend, TARGET_DPI};
use crate::error::ConvertError;
use crate::pipeline::pdf;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info, warn};

/// A capability that rasterises the first page of a PDF file.
pub trait PageRenderer {
    /// Short backend name for logs and error messages.
    fn name(&self) -> &str;

    /// Render page 1 of `pdf_path` at `dpi`.
    fn render_first_page(&self, pdf_path: &Path, dpi: u32) -> Result<DynamicImage, ConvertError>;
}

/// Probe for a renderer according to `backend`.
///
/// Never fails: an unavailable backend is logged at debug level and yields
/// `None`.
pub fn detect(backend: RenderBackend) -> Option<Arc<dyn PageRenderer>> {
    let found: Option<Arc<dyn PageRenderer>> = match backend {
        RenderBackend::None => None,
        RenderBackend::Pdfium => PdfiumRenderer::bind().map(|r| Arc::new(r) as Arc<dyn PageRenderer>),
        RenderBackend::Pdftoppm => {
            PdftoppmRenderer::probe().map(|r| Arc::new(r) as Arc<dyn PageRenderer>)
        }
        RenderBackend::Auto => PdfiumRenderer::bind()
            .map(|r| Arc::new(r) as Arc<dyn PageRenderer>)
            .or_else(|| PdftoppmRenderer::probe().map(|r| Arc::new(r) as Arc<dyn PageRenderer>)),
    };

    match &found {
        Some(r) => info!("PDF renderer: {}", r.name()),
        None => info!("No PDF renderer available ({:?})", backend),
    }
    found
}

/// Rasterise page 1 of `pdf_path` at [`TARGET_DPI`].
pub fn rasterize_first_page(
    pdf_path: &Path,
    renderer: Option<&dyn PageRenderer>,
) -> Result<DynamicImage, ConvertError> {
    if let Some(r) = renderer {
        info!("Converting PDF to image using {}", r.name());
        match r.render_first_page(pdf_path, TARGET_DPI) {
            Ok(image) => return Ok(image),
            Err(e) => warn!("{} conversion failed: {}; falling back to page copy", r.name(), e),
        }
    }

    let intermediate = extract_first_page(pdf_path)?;
    debug!("Intermediate single-page PDF: {}", intermediate.path().display());

    match renderer {
        Some(r) => r.render_first_page(intermediate.path(), TARGET_DPI),
        None => Err(ConvertError::rendering_unavailable()),
    }
}

/// Copy page 1 of `pdf_path` into a new single-page PDF temp file.
pub fn extract_first_page(pdf_path: &Path) -> Result<NamedTempFile, ConvertError> {
    let mut doc = pdf::load(pdf_path)?;
    let page_id = pdf::first_page_id(&doc, pdf_path)?;
    pdf::isolate_page(&mut doc, page_id)?;
    let bytes = pdf::to_bytes(&mut doc)?;

    let mut file = tempfile::Builder::new()
        .prefix("graphical-abstract-page1-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| ConvertError::Internal(format!("tempfile: {e}")))?;
    file.write_all(&bytes)
        .and_then(|_| file.flush())
        .map_err(|e| ConvertError::OutputWriteFailed {
            path: file.path().to_path_buf(),
            source: e,
        })?;
    Ok(file)
}

// ── PDFium ───────────────────────────────────────────────────────────────

/// Renders through a PDFium library found by `pdfium-locate`.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
}

impl PdfiumRenderer {
    /// Bind to an installed PDFium, or `None` when there is none.
    pub fn bind() -> Option<Self> {
        match pdfium_locate::bind_pdfium() {
            Ok(pdfium) => Some(Self { pdfium }),
            Err(e) => {
                debug!("PDFium unavailable: {}", e);
                None
            }
        }
    }

    pub fn new(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }
}

impl PageRenderer for PdfiumRenderer {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn render_first_page(&self, pdf_path: &Path, dpi: u32) -> Result<DynamicImage, ConvertError> {
        let failed = |detail: String| ConvertError::RasterisationFailed {
            renderer: "pdfium".to_string(),
            detail,
        };

        let document = self
            .pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| failed(format!("{:?}", e)))?;
        let page = document
            .pages()
            .get(0)
            .map_err(|e| failed(format!("{:?}", e)))?;

        let render_config =
            PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / crate::config::POINTS_PER_INCH);
        let image = page
            .render_with_config(&render_config)
            .map_err(|e| failed(format!("{:?}", e)))?
            .as_image();

        debug!("Rendered page 1 → {}x{} px", image.width(), image.height());
        Ok(image)
    }
}

// ── Poppler ──────────────────────────────────────────────────────────────

/// Renders by shelling out to poppler's `pdftoppm`.
pub struct PdftoppmRenderer {
    program: String,
}

impl PdftoppmRenderer {
    /// `Some` when `pdftoppm` can be spawned from `PATH`.
    pub fn probe() -> Option<Self> {
        Self::probe_program("pdftoppm")
    }

    /// `Some` when `program -v` can be spawned. The exit status is ignored:
    /// older poppler releases exit non-zero after printing the version.
    pub fn probe_program(program: &str) -> Option<Self> {
        match Command::new(program).arg("-v").output() {
            Ok(_) => Some(Self {
                program: program.to_string(),
            }),
            Err(e) => {
                debug!("{} unavailable: {}", program, e);
                None
            }
        }
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn name(&self) -> &str {
        "pdftoppm"
    }

    fn render_first_page(&self, pdf_path: &Path, dpi: u32) -> Result<DynamicImage, ConvertError> {
        let failed = |detail: String| ConvertError::RasterisationFailed {
            renderer: "pdftoppm".to_string(),
            detail,
        };

        let temp_dir = TempDir::new().map_err(|e| ConvertError::Internal(format!("tempdir: {e}")))?;
        let prefix = temp_dir.path().join("page");

        let output = Command::new(&self.program)
            .args(["-png", "-r", &dpi.to_string(), "-f", "1", "-l", "1", "-singlefile"])
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .map_err(|e| failed(e.to_string()))?;

        if !output.status.success() {
            return Err(failed(String::from_utf8_lossy(&output.stderr).trim().to_string()));
        }

        // -singlefile writes exactly `<prefix>.png`.
        let png_path = prefix.with_extension("png");
        let image = image::open(&png_path).map_err(|e| failed(e.to_string()))?;
        debug!("Rendered page 1 → {}x{} px", image.width(), image.height());
        Ok(image)
    }
}
