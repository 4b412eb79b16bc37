//! # pdfium-locate
//!
//! Find and bind an already-installed [PDFium](https://pdfium.googlesource.com/pdfium/)
//! library for `pdfium-render`, without touching the network.
//!
//! Rasterising PDFs is an optional capability for its callers: when no
//! library can be found, [`bind_pdfium`] returns [`LocateError::NotFound`]
//! listing every place that was searched, and the caller decides how to
//! degrade.
//!
//! ## Search order
//!
//! 1. `PDFIUM_LIB_PATH`: explicit path to the library file.
//! 2. The per-user cache directory, see [`pdfium_cache_dir`].
//! 3. The directory containing the running executable.
//! 4. The operating system's library search path
//!    (`LD_LIBRARY_PATH`, `DYLD_LIBRARY_PATH`, `PATH`, …).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pdfium_locate::{bind_pdfium, locate_pdfium_library};
//!
//! if let Some(path) = locate_pdfium_library() {
//!     println!("pdfium found at {}", path.display());
//! }
//! let pdfium = bind_pdfium().expect("PDFium unavailable");
//! ```
//!
//! ## Platform support
//!
//! | OS      | Library               |
//! |---------|-----------------------|
//! | macOS   | `libpdfium.dylib`     |
//! | Linux   | `libpdfium.so`        |
//! | Windows | `pdfium.dll`          |

use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Environment variable pointing directly at a pdfium library file.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Environment variable overriding the cache directory root.
pub const CACHE_DIR_ENV: &str = "PDFIUM_LOCATE_CACHE_DIR";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by pdfium-locate operations.
#[derive(Error, Debug)]
pub enum LocateError {
    /// The current OS has no known pdfium library name.
    #[error("Unsupported platform: {os}")]
    UnsupportedPlatform { os: String },

    /// No candidate location held a loadable library.
    #[error("PDFium library not found (searched: {})", format_searched(.searched))]
    NotFound { searched: Vec<PathBuf> },

    /// A library file exists but `pdfium-render` could not load it.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },
}

fn format_searched(searched: &[PathBuf]) -> String {
    if searched.is_empty() {
        return "system library path".to_string();
    }
    let mut parts: Vec<String> = searched.iter().map(|p| p.display().to_string()).collect();
    parts.push("system library path".to_string());
    parts.join(", ")
}

// ── Platform metadata ────────────────────────────────────────────────────────

/// Platform-specific file name of the pdfium shared library.
pub fn library_file_name() -> Result<&'static str, LocateError> {
    match std::env::consts::OS {
        "macos" => Ok("libpdfium.dylib"),
        "linux" | "freebsd" | "openbsd" | "netbsd" | "android" => Ok("libpdfium.so"),
        "windows" => Ok("pdfium.dll"),
        os => Err(LocateError::UnsupportedPlatform { os: os.to_string() }),
    }
}

// ── Cache directory resolution ───────────────────────────────────────────────

/// Returns the per-user directory where a pdfium library may be kept.
///
/// Default locations:
/// - **macOS**: `~/Library/Caches/graphical-abstract/pdfium/`
/// - **Linux**: `~/.cache/graphical-abstract/pdfium/`
/// - **Windows**: `%LOCALAPPDATA%\graphical-abstract\pdfium\`
///
/// Override by setting `PDFIUM_LOCATE_CACHE_DIR`.
pub fn pdfium_cache_dir() -> PathBuf {
    if let Ok(override_dir) = std::env::var(CACHE_DIR_ENV) {
        return PathBuf::from(override_dir).join("pdfium");
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("graphical-abstract").join("pdfium")
}

/// Candidate library files, in search order. Files may not exist.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(env_path) = std::env::var(LIB_PATH_ENV) {
        if !env_path.is_empty() {
            candidates.push(PathBuf::from(env_path));
        }
    }

    if let Ok(lib_name) = library_file_name() {
        candidates.push(pdfium_cache_dir().join(lib_name));

        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            candidates.push(exe_dir.join(lib_name));
        }
    }

    candidates
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Returns the first candidate library file that exists on disk.
///
/// Does not consult the system library path; a `None` here does not mean
/// [`bind_pdfium`] will fail.
pub fn locate_pdfium_library() -> Option<PathBuf> {
    candidate_paths().into_iter().find(|p| p.is_file())
}

/// Binds to the first loadable pdfium library.
///
/// Tries every existing file from [`candidate_paths`] in order, then the
/// system library path. Bind failures on individual candidates are skipped.
pub fn bind_pdfium() -> Result<Pdfium, LocateError> {
    let searched = candidate_paths();

    for path in searched.iter().filter(|p| p.is_file()) {
        match bind_pdfium_from_path(path) {
            Ok(pdfium) => return Ok(pdfium),
            Err(e) => eprintln!("pdfium-locate: skipping {}: {e}", path.display()),
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|_| LocateError::NotFound { searched })
}

/// Binds to a pdfium library at an explicit `path`.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, LocateError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| LocateError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
