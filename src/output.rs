//! Result types describing what a conversion wrote.

use crate::pipeline::normalize::Placement;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Suffix appended to the input stem for every artifact.
pub const ARTIFACT_SUFFIX: &str = "_1200px_300dpi";

/// An output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Tiff,
    Png,
    Pdf,
}

impl OutputFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Tiff => "tiff",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
        }
    }

    /// Upper-case label used in status lines.
    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Tiff => "TIFF",
            OutputFormat::Png => "PNG",
            OutputFormat::Pdf => "PDF",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `{dir}/{stem}_1200px_300dpi.{ext}`
pub fn artifact_path(dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{stem}{ARTIFACT_SUFFIX}.{}", format.extension()))
}

/// Which route the orchestrator took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionMode {
    /// PDF page 1 repositioned as vectors; single PDF output.
    VectorPdf,
    /// PDF page 1 rasterised, then normalised and written.
    RasterizedPdf,
    /// Raster image decoded, then normalised and written.
    Raster,
}

/// A file written by the conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub format: OutputFormat,
    pub path: PathBuf,
    /// `true` when the PDF keeps the source's vector content.
    #[serde(default)]
    pub vector: bool,
}

/// Summary of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub mode: ConversionMode,
    /// Artifacts in the order they were written.
    pub artifacts: Vec<Artifact>,
    /// Source pixel size before normalisation (raster modes only).
    pub source_size: Option<(u32, u32)>,
    /// Where the scaled image sits on the canvas (raster modes only).
    pub placement: Option<Placement>,
    pub duration_ms: u64,
}

impl ConversionReport {
    /// Path of the artifact with the given format, if it was written.
    pub fn artifact(&self, format: OutputFormat) -> Option<&Path> {
        self.artifacts
            .iter()
            .find(|a| a.format == format)
            .map(|a| a.path.as_path())
    }
}
