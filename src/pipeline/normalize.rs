//! Raster normalisation: any decoded bitmap → 1200×1200 white RGB canvas.
//!
//! The longer side of the source maps to exactly [`CANVAS_PX`]; the shorter
//! side is scaled proportionally and the remainder is white padding split
//! evenly (integer division may leave the extra pixel on the right/bottom).
//!
//! Transparent sources are composited onto white *before* the alpha channel
//! is dropped. Dropping alpha first would expose whatever colour the encoder
//! stored under fully transparent pixels, typically black fringes.

use crate::config::CANVAS_PX;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Position of the scaled source on the canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub width: u32,
    pub height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl Placement {
    /// Fit a `src_width × src_height` image into the canvas.
    pub fn fit(src_width: u32, src_height: u32) -> Self {
        let src_width = src_width.max(1);
        let src_height = src_height.max(1);

        let (width, height) = if src_width >= src_height {
            (CANVAS_PX, scale_side(src_height, src_width))
        } else {
            (scale_side(src_width, src_height), CANVAS_PX)
        };

        Self {
            width,
            height,
            offset_x: (CANVAS_PX - width) / 2,
            offset_y: (CANVAS_PX - height) / 2,
        }
    }

    /// White columns to the right of the image.
    pub fn right_padding(&self) -> u32 {
        CANVAS_PX - self.offset_x - self.width
    }

    /// White rows below the image.
    pub fn bottom_padding(&self) -> u32 {
        CANVAS_PX - self.offset_y - self.height
    }
}

/// `round(CANVAS_PX * short / long)`, never zero.
fn scale_side(short: u32, long: u32) -> u32 {
    let scaled = (CANVAS_PX as f64 * short as f64 / long as f64).round() as u32;
    scaled.clamp(1, CANVAS_PX)
}

/// A normalised 1200×1200 RGB bitmap.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
    placement: Placement,
}

impl Canvas {
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

/// Scale `source` to fit the canvas, centred on white.
pub fn normalize(source: &DynamicImage) -> Canvas {
    let rgb = flatten_onto_white(source);
    let placement = Placement::fit(rgb.width(), rgb.height());

    debug!(
        src_w = rgb.width(),
        src_h = rgb.height(),
        w = placement.width,
        h = placement.height,
        x = placement.offset_x,
        y = placement.offset_y,
        "Normalising onto {}px canvas",
        CANVAS_PX
    );

    let resized = if (rgb.width(), rgb.height()) == (placement.width, placement.height) {
        rgb
    } else {
        imageops::resize(&rgb, placement.width, placement.height, FilterType::Lanczos3)
    };

    let mut image = RgbImage::from_pixel(CANVAS_PX, CANVAS_PX, WHITE);
    imageops::replace(
        &mut image,
        &resized,
        placement.offset_x as i64,
        placement.offset_y as i64,
    );

    Canvas { image, placement }
}

/// Convert to RGB8, compositing any alpha channel over white.
pub fn flatten_onto_white(source: &DynamicImage) -> RgbImage {
    if !source.color().has_alpha() {
        return source.to_rgb8();
    }

    let rgba = source.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let alpha = src[3] as u32;
        for c in 0..3 {
            let blended = (src[c] as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
            dst[c] = blended as u8;
        }
    }
    out
}
