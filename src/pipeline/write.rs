//! Multi-format writer: one normalised canvas → TIFF, PNG and PDF files.
//!
//! Every artifact carries 300 dpi resolution metadata so a 1200 px canvas
//! prints at exactly 4 inches:
//!
//! | Format | Metadata |
//! |--------|----------|
//! | TIFF   | `XResolution = YResolution = 300/1`, `ResolutionUnit = Inch`, LZW |
//! | PNG    | `pHYs` 11811 px/m (advisory; many viewers ignore it) |
//! | PDF    | 288 pt page, image drawn full-page |

use crate::config::{POINTS_PER_INCH, TARGET_DPI};
use crate::error::ConvertError;
use crate::output::{artifact_path, Artifact, OutputFormat};
use crate::pipeline::normalize::Canvas;
use crate::pipeline::pdf;
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tiff::encoder::{colortype, compression::Lzw, Rational, TiffEncoder};
use tiff::tags::ResolutionUnit;
use tracing::info;

/// 300 dpi expressed in pixels per metre, rounded (300 / 0.0254 = 11811.02).
pub const PIXELS_PER_METRE: u32 = 11811;

/// Resource name of the canvas image on the PDF page.
const IMAGE_NAME: &str = "Im1";

/// Write the canvas in every requested format, TIFF then PNG then PDF.
///
/// PDF is always written; `pdf_only` skips TIFF and PNG.
pub fn write_outputs(
    canvas: &Canvas,
    dir: &Path,
    stem: &str,
    pdf_only: bool,
) -> Result<Vec<Artifact>, ConvertError> {
    let mut artifacts = Vec::with_capacity(3);

    if !pdf_only {
        let path = artifact_path(dir, stem, OutputFormat::Tiff);
        write_tiff(canvas.image(), &path)?;
        artifacts.push(Artifact {
            format: OutputFormat::Tiff,
            path,
            vector: false,
        });

        let path = artifact_path(dir, stem, OutputFormat::Png);
        write_png(canvas.image(), &path)?;
        artifacts.push(Artifact {
            format: OutputFormat::Png,
            path,
            vector: false,
        });
    }

    let path = artifact_path(dir, stem, OutputFormat::Pdf);
    write_pdf(canvas.image(), &path)?;
    artifacts.push(Artifact {
        format: OutputFormat::Pdf,
        path,
        vector: false,
    });

    Ok(artifacts)
}

fn create(path: &Path) -> Result<BufWriter<File>, ConvertError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| ConvertError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// RGB8 TIFF, LZW-compressed, 300 dpi.
pub fn write_tiff(image: &RgbImage, path: &Path) -> Result<(), ConvertError> {
    let failed = |e: tiff::TiffError| ConvertError::EncodeFailed {
        format: "TIFF",
        path: path.to_path_buf(),
        detail: e.to_string(),
    };

    let mut encoder = TiffEncoder::new(create(path)?).map_err(failed)?;
    let mut tiff = encoder
        .new_image_with_compression::<colortype::RGB8, _>(image.width(), image.height(), Lzw::default())
        .map_err(failed)?;

    tiff.resolution_unit(ResolutionUnit::Inch);
    tiff.x_resolution(Rational { n: TARGET_DPI, d: 1 });
    tiff.y_resolution(Rational { n: TARGET_DPI, d: 1 });
    tiff.write_data(image.as_raw()).map_err(failed)?;

    info!("TIFF written: {}", path.display());
    Ok(())
}

/// RGB8 PNG with a 300 dpi `pHYs` chunk.
pub fn write_png(image: &RgbImage, path: &Path) -> Result<(), ConvertError> {
    let failed = |e: png::EncodingError| ConvertError::EncodeFailed {
        format: "PNG",
        path: path.to_path_buf(),
        detail: e.to_string(),
    };

    let mut encoder = png::Encoder::new(create(path)?, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: PIXELS_PER_METRE,
        yppu: PIXELS_PER_METRE,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder.write_header().map_err(failed)?;
    writer.write_image_data(image.as_raw()).map_err(failed)?;
    writer.finish().map_err(failed)?;

    info!("PNG written: {}", path.display());
    Ok(())
}

/// Single 288 pt page showing the canvas edge to edge.
pub fn write_pdf(image: &RgbImage, path: &Path) -> Result<(), ConvertError> {
    let mut doc = image_document(image)?;
    pdf::save(&mut doc, path)?;
    info!("PDF written: {}", path.display());
    Ok(())
}

/// Build the one-page document for [`write_pdf`].
fn image_document(image: &RgbImage) -> Result<Document, ConvertError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width() as i64,
            "Height" => image.height() as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        },
        image.as_raw().clone(),
    ));

    // 300 dpi pixel density; a 1200 px canvas gives a 288 pt page.
    let width_pt = image.width() as f32 / TARGET_DPI as f32 * POINTS_PER_INCH;
    let height_pt = image.height() as f32 / TARGET_DPI as f32 * POINTS_PER_INCH;

    let real = |v: f32| Object::from(v);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![real(width_pt), real(0.0), real(0.0), real(height_pt), real(0.0), real(0.0)],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| ConvertError::PdfWriteFailed(format!("encode page content: {e}")))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![real(0.0), real(0.0), real(width_pt), real(height_pt)],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { IMAGE_NAME => image_id },
        },
    });

    pdf::set_single_page_tree(&mut doc, pages_id, page_id);
    Ok(doc)
}
