//! Input resolution: validate a user-supplied path and classify it.
//!
//! Classification is by extension only (`.pdf`, any case, is a PDF;
//! everything else goes to the image decoder). Content checks happen later:
//! PDFs are checked for the `%PDF` magic when loaded, and raster formats are
//! sniffed by the decoder.

use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What the orchestrator does with an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Raster,
}

impl InputKind {
    /// Classify `path` by its extension, case-insensitively.
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => InputKind::Pdf,
            _ => InputKind::Raster,
        }
    }
}

/// A checked input file plus where its artifacts go.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub kind: InputKind,
    /// Directory the artifacts are written to: the input's own directory,
    /// or `.` for a bare file name.
    pub output_dir: PathBuf,
    /// File name without its final extension.
    pub stem: String,
}

/// Check that `path` is an existing, readable regular file.
pub fn resolve_input(path: &Path) -> Result<ResolvedInput, ConvertError> {
    let metadata = std::fs::metadata(path).map_err(|e| not_readable(path, e))?;
    if !metadata.is_file() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    // Opening is the only portable readability check.
    std::fs::File::open(path).map_err(|e| not_readable(path, e))?;

    let resolved = ResolvedInput {
        path: path.to_path_buf(),
        kind: InputKind::of(path),
        output_dir: output_dir(path),
        stem: stem(path),
    };
    debug!(
        kind = ?resolved.kind,
        out = %resolved.output_dir.display(),
        "Resolved input: {}",
        path.display()
    );
    Ok(resolved)
}

fn not_readable(path: &Path, e: std::io::Error) -> ConvertError {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ConvertError::FileNotFound {
            path: path.to_path_buf(),
        },
    }
}

/// The input's parent directory, `.` when it has none.
pub fn output_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// The file name without its final extension.
pub fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}
