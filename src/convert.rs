//! Conversion entry points.
//!
//! [`convert`] picks one of three routes from the input's extension and the
//! two flags, then runs it to completion:
//!
//! ```text
//! .pdf + preserve_vector ──▶ vector::reposition_first_page ──▶ PDF
//! .pdf                   ──▶ render ──▶ normalize ──▶ write ──▶ TIFF, PNG, PDF
//! image                  ──▶ decode ──▶ normalize ──▶ write ──▶ TIFF, PNG, PDF
//! ```
//!
//! The flag combination is checked before the input is touched, so a bad
//! combination never writes anything.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::output::{artifact_path, Artifact, ConversionMode, ConversionReport, OutputFormat};
use crate::pipeline::input::{self, InputKind, ResolvedInput};
use crate::pipeline::{normalize, render, vector, write};
use image::{DynamicImage, ImageReader};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Decide which route [`convert`] will take, without touching the filesystem.
///
/// # Errors
/// [`ConvertError::UnsupportedCombination`] when `preserve_vector` is set
/// without `pdf_only`, whatever the input type.
pub fn plan(path: impl AsRef<Path>, config: &ConversionConfig) -> Result<ConversionMode, ConvertError> {
    config.validate()?;

    let mode = match (InputKind::of(path.as_ref()), config.preserve_vector) {
        (InputKind::Pdf, true) => ConversionMode::VectorPdf,
        (InputKind::Pdf, false) => ConversionMode::RasterizedPdf,
        (InputKind::Raster, _) => ConversionMode::Raster,
    };
    Ok(mode)
}

/// Convert `path` into normalised 1200×1200 px, 300 dpi artifacts written
/// next to it.
///
/// # Example
/// ```rust,no_run
/// use graphical_abstract::{convert, ConversionConfig};
///
/// let config = ConversionConfig::builder().pdf_only(true).build()?;
/// let report = convert("figure.png", &config)?;
/// for artifact in &report.artifacts {
///     println!("{} saved: {}", artifact.format, artifact.path.display());
/// }
/// # Ok::<(), graphical_abstract::ConvertError>(())
/// ```
///
/// # Errors
/// Any [`ConvertError`]; see [`ConvertError::kind`] for the coarse
/// classification. Nothing is written when the flags are rejected or the
/// input cannot be read. A failure mid-write may leave earlier artifacts.
pub fn convert(path: impl AsRef<Path>, config: &ConversionConfig) -> Result<ConversionReport, ConvertError> {
    let start = Instant::now();
    let path = path.as_ref();

    // ── Step 1: Route ────────────────────────────────────────────────────
    let mode = plan(path, config)?;

    // ── Step 2: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(path)?;
    info!("Starting conversion: {} ({:?})", path.display(), mode);

    if config.preserve_vector && resolved.kind == InputKind::Raster {
        warn!(
            "--preserve-vector has no effect on raster input '{}'; converting as an image",
            path.display()
        );
    }

    // ── Step 3: Run the chosen route ─────────────────────────────────────
    let mut report = match mode {
        ConversionMode::VectorPdf => convert_vector(&resolved)?,
        ConversionMode::RasterizedPdf => {
            let page = render::rasterize_first_page(&resolved.path, config.renderer.as_deref())?;
            convert_bitmap(&resolved, mode, &page, config.pdf_only)?
        }
        ConversionMode::Raster => {
            let source = decode_image(&resolved.path)?;
            convert_bitmap(&resolved, mode, &source, config.pdf_only)?
        }
    };

    report.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Conversion complete: {} artifact(s) in {}ms",
        report.artifacts.len(),
        report.duration_ms
    );
    Ok(report)
}

fn convert_vector(resolved: &ResolvedInput) -> Result<ConversionReport, ConvertError> {
    let output = artifact_path(&resolved.output_dir, &resolved.stem, OutputFormat::Pdf);
    let transform = vector::reposition_first_page(&resolved.path, &output)?;
    debug!(scale = transform.scale, "Vector page repositioned");

    Ok(ConversionReport {
        input: resolved.path.clone(),
        mode: ConversionMode::VectorPdf,
        artifacts: vec![Artifact {
            format: OutputFormat::Pdf,
            path: output,
            vector: true,
        }],
        source_size: None,
        placement: None,
        duration_ms: 0,
    })
}

fn convert_bitmap(
    resolved: &ResolvedInput,
    mode: ConversionMode,
    source: &DynamicImage,
    pdf_only: bool,
) -> Result<ConversionReport, ConvertError> {
    let canvas = normalize::normalize(source);
    let artifacts = write::write_outputs(&canvas, &resolved.output_dir, &resolved.stem, pdf_only)?;

    Ok(ConversionReport {
        input: resolved.path.clone(),
        mode,
        artifacts,
        source_size: Some((source.width(), source.height())),
        placement: Some(canvas.placement()),
        duration_ms: 0,
    })
}

/// Decode a raster file, sniffing the format from its content.
pub fn decode_image(path: &Path) -> Result<DynamicImage, ConvertError> {
    let failed = |detail: String| ConvertError::DecodeFailed {
        path: path.to_path_buf(),
        detail,
    };

    let image = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| failed(e.to_string()))?
        .decode()
        .map_err(|e| failed(e.to_string()))?;

    debug!(
        w = image.width(),
        h = image.height(),
        color = ?image.color(),
        "Decoded {}",
        path.display()
    );
    Ok(image)
}
