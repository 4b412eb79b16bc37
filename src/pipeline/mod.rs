//! Pipeline stages for graphical-abstract normalisation.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable on its own and the rendering backend can change without touching
//! the other stages.
//!
//! ## Data Flow
//!
//! ```text
//!          ┌──▶ vector ─────────────────────────────▶ PDF (vector)
//! input ───┼──▶ render ──▶ normalize ──▶ write ──▶ TIFF, PNG, PDF
//!          └──▶ (decode) ─┘
//! ```
//!
//! 1. [`input`]:     validate the path and classify it as PDF or raster
//! 2. [`render`]:    rasterise PDF page 1 at 300 dpi through an optional
//!    [`render::PageRenderer`], with a single-page-copy fallback
//! 3. [`normalize`]: scale to fit 1200×1200 and centre on white
//! 4. [`write`]:     encode TIFF, PNG and PDF with 300 dpi metadata
//! 5. [`vector`]:    reposition PDF page 1 onto a 288 pt page as vectors
//!
//! [`pdf`] holds the `lopdf` helpers that `render` and `vector` share.

pub mod input;
pub mod normalize;
pub mod pdf;
pub mod render;
pub mod vector;
pub mod write;
