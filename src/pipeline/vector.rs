//! Vector repositioning: place a PDF's first page on a 288 pt square page
//! without rasterising it.
//!
//! The original page's content stream becomes a Form XObject (its BBox is the
//! original media box, so nothing outside the page leaks in), drawn on the new
//! page through a uniform `cm` matrix. Text stays text and paths stay paths.

use crate::config::TARGET_PT;
use crate::error::ConvertError;
use crate::pipeline::pdf::{self, MediaBox};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Resource name of the wrapped original page.
const FORM_NAME: &str = "Pg1";

/// Uniform scale plus translation mapping the original page onto the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorTransform {
    pub scale: f32,
    /// Width of the original page after scaling, in points.
    pub width: f32,
    /// Height of the original page after scaling, in points.
    pub height: f32,
    /// Left inset of the scaled page on the target.
    pub offset_x: f32,
    /// Bottom inset of the scaled page on the target.
    pub offset_y: f32,
    /// `cm` translation; the inset minus the scaled media-box origin.
    pub translate_x: f32,
    pub translate_y: f32,
}

impl VectorTransform {
    /// Fit `media` into a `TARGET_PT` square, centred.
    pub fn fit(media: MediaBox) -> Self {
        let scale = TARGET_PT / media.width().max(media.height());
        let width = media.width() * scale;
        let height = media.height() * scale;
        let offset_x = (TARGET_PT - width) / 2.0;
        let offset_y = (TARGET_PT - height) / 2.0;

        Self {
            scale,
            width,
            height,
            offset_x,
            offset_y,
            translate_x: offset_x - media.llx * scale,
            translate_y: offset_y - media.lly * scale,
        }
    }

    /// The `[a b c d e f]` operands of the `cm` operator.
    pub fn matrix(&self) -> [f32; 6] {
        [
            self.scale,
            0.0,
            0.0,
            self.scale,
            self.translate_x,
            self.translate_y,
        ]
    }
}

/// Read `input`, reposition page 1, and write a single-page PDF to `output`.
pub fn reposition_first_page(input: &Path, output: &Path) -> Result<VectorTransform, ConvertError> {
    info!("Processing PDF with vector preservation: {}", input.display());

    let mut doc = pdf::load(input)?;
    let transform = reposition_document(&mut doc, input)?;
    pdf::save(&mut doc, output)?;

    info!("Vector PDF written: {}", output.display());
    Ok(transform)
}

/// Rewrite `doc` in place so its only page is page 1 on a `TARGET_PT` square.
///
/// `source` is only used in error messages.
pub fn reposition_document(doc: &mut Document, source: &Path) -> Result<VectorTransform, ConvertError> {
    let page_id = pdf::first_page_id(doc, source)?;
    let media = pdf::media_box(doc, page_id, source)?;
    let transform = VectorTransform::fit(media);
    debug!(
        orig_w = media.width(),
        orig_h = media.height(),
        scale = transform.scale,
        x = transform.offset_x,
        y = transform.offset_y,
        "Vector transform"
    );

    let resources = pdf::inherited_attribute(doc, page_id, b"Resources")
        .cloned()
        .unwrap_or_else(|| Object::Dictionary(dictionary! {}));
    let content = pdf::page_content(doc, page_id, source)?;

    let form = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "FormType" => 1_i64,
            "BBox" => media.to_object(),
            "Resources" => resources,
        },
        content,
    );
    let form_id = doc.add_object(form);

    let page_content = target_page_content(&transform)?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, page_content));

    let target = MediaBox {
        llx: 0.0,
        lly: 0.0,
        urx: TARGET_PT,
        ury: TARGET_PT,
    };
    let pages_id = doc.new_object_id();
    let new_page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => target.to_object(),
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { FORM_NAME => form_id },
        },
    });

    pdf::set_single_page_tree(doc, pages_id, new_page_id);
    doc.prune_objects();
    Ok(transform)
}

/// White background, then the original page through the transform.
fn target_page_content(transform: &VectorTransform) -> Result<Vec<u8>, ConvertError> {
    let real = |v: f32| Object::from(v);
    let operations = vec![
        Operation::new("q", vec![]),
        Operation::new("rg", vec![real(1.0), real(1.0), real(1.0)]),
        Operation::new("re", vec![real(0.0), real(0.0), real(TARGET_PT), real(TARGET_PT)]),
        Operation::new("f", vec![]),
        Operation::new("Q", vec![]),
        Operation::new("q", vec![]),
        Operation::new("cm", transform.matrix().into_iter().map(real).collect()),
        Operation::new("Do", vec![Object::Name(FORM_NAME.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ];
    Content { operations }
        .encode()
        .map_err(|e| ConvertError::PdfWriteFailed(format!("encode page content: {e}")))
}
