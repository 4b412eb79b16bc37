//! PDF object-graph helpers shared by the rasteriser fallback and the vector
//! repositioner, built on `lopdf`.
//!
//! Both paths need "page 1 and nothing else": the fallback writes it out as a
//! standalone single-page PDF, the repositioner wraps it in a new page.
//! Rather than deep-cloning page 1 into a fresh document, we rebuild the page
//! tree of the loaded document around the page we want and let
//! [`Document::prune_objects`] drop everything no longer reachable.

use crate::error::ConvertError;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Attributes a page inherits from its `/Pages` ancestors (PDF 32000 §7.7.3.4).
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Readers accept junk before the `%PDF-` header within the first KiB.
const HEADER_SEARCH_LEN: usize = 1024;

/// Upper bound on `/Parent` hops, guarding against cyclic page trees.
const MAX_TREE_DEPTH: usize = 64;

/// A page's media box in PDF user space (points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl MediaBox {
    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    pub fn to_object(self) -> Object {
        Object::Array(vec![
            Object::from(self.llx),
            Object::from(self.lly),
            Object::from(self.urx),
            Object::from(self.ury),
        ])
    }
}

/// Load a PDF, checking the `%PDF` magic first so non-PDFs get a clear error.
pub fn load(path: &Path) -> Result<Document, ConvertError> {
    let mut magic = [0u8; 4];
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ConvertError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;
    let mut head = Vec::with_capacity(HEADER_SEARCH_LEN);
    file.take(HEADER_SEARCH_LEN as u64)
        .read_to_end(&mut head)
        .map_err(|e| ConvertError::CorruptPdf {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    if !head.is_empty() && !has_pdf_header(&head) {
        let n = head.len().min(4);
        magic[..n].copy_from_slice(&head[..n]);
        return Err(ConvertError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    let document = Document::load(path).map_err(|e| ConvertError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    debug!(pages = document.get_pages().len(), "PDF loaded: {}", path.display());
    Ok(document)
}

/// `true` when `head` contains `%PDF-`.
pub fn has_pdf_header(head: &[u8]) -> bool {
    head.windows(5).any(|w| w == b"%PDF-")
}

/// Object id of page 1.
pub fn first_page_id(doc: &Document, path: &Path) -> Result<ObjectId, ConvertError> {
    doc.get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| ConvertError::EmptyPdf {
            path: path.to_path_buf(),
        })
}

/// Follow a reference to its target; non-references are returned as-is.
pub fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

/// Look up `key` on the page, walking up `/Parent` links when absent.
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Decoded content of a page, its `/Contents` streams joined by newlines.
///
/// A stream whose filter cannot be decoded is an error rather than being
/// passed through still encoded.
pub fn page_content(doc: &Document, page_id: ObjectId, path: &Path) -> Result<Vec<u8>, ConvertError> {
    let corrupt = |detail: String| ConvertError::CorruptPdf {
        path: path.to_path_buf(),
        detail,
    };

    let mut content = Vec::new();
    for id in doc.get_page_contents(page_id) {
        let stream = doc
            .get_object(id)
            .and_then(Object::as_stream)
            .map_err(|e| corrupt(format!("page 1 content {id:?}: {e}")))?;
        if stream.dict.get(b"Filter").is_ok() {
            let decoded = stream
                .decompressed_content()
                .map_err(|e| corrupt(format!("cannot decode page 1 content {id:?}: {e}")))?;
            content.extend_from_slice(&decoded);
        } else {
            content.extend_from_slice(&stream.content);
        }
        content.push(b'\n');
    }
    Ok(content)
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Page media box, inherited and normalised so `ll` is below-left of `ur`.
pub fn media_box(doc: &Document, page_id: ObjectId, path: &Path) -> Result<MediaBox, ConvertError> {
    let invalid = |detail: &str| ConvertError::InvalidMediaBox {
        path: path.to_path_buf(),
        detail: detail.to_string(),
    };

    let object = inherited_attribute(doc, page_id, b"MediaBox")
        .ok_or_else(|| invalid("no /MediaBox on the page or its ancestors"))?;
    let array = resolve(doc, object)
        .as_array()
        .map_err(|_| invalid("/MediaBox is not an array"))?;
    if array.len() != 4 {
        return Err(invalid("/MediaBox must have four numbers"));
    }

    let mut coords = [0f32; 4];
    for (slot, item) in coords.iter_mut().zip(array) {
        *slot = number(resolve(doc, item)).ok_or_else(|| invalid("/MediaBox entry is not a number"))?;
    }

    let media = MediaBox {
        llx: coords[0].min(coords[2]),
        lly: coords[1].min(coords[3]),
        urx: coords[0].max(coords[2]),
        ury: coords[1].max(coords[3]),
    };
    if media.width() <= 0.0 || media.height() <= 0.0 {
        return Err(invalid("/MediaBox has zero area"));
    }
    Ok(media)
}

/// Replace the document's page tree with a single `/Pages` node holding
/// `page_id`, then prune unreachable objects.
///
/// Inheritable attributes are copied onto the page first so detaching it from
/// its old ancestors loses nothing.
pub fn isolate_page(doc: &mut Document, page_id: ObjectId) -> Result<(), ConvertError> {
    let inherited: Vec<(&[u8], Object)> = INHERITABLE
        .iter()
        .filter_map(|key| inherited_attribute(doc, page_id, key).map(|v| (*key, v.clone())))
        .collect();

    let pages_id = doc.new_object_id();
    {
        let page = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| ConvertError::PdfWriteFailed(format!("page 1 is not a dictionary: {e}")))?;
        for (key, value) in inherited {
            page.set(key, value);
        }
        page.set("Parent", Object::Reference(pages_id));
    }

    set_single_page_tree(doc, pages_id, page_id);
    doc.prune_objects();
    Ok(())
}

/// Install `/Pages` at `pages_id` containing only `page_id`, and point a fresh
/// catalog at it.
pub fn set_single_page_tree(doc: &mut Document, pages_id: ObjectId, page_id: ObjectId) {
    let pages: Dictionary = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => 1_i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
}

/// Serialise with Flate-compressed streams.
pub fn to_bytes(doc: &mut Document) -> Result<Vec<u8>, ConvertError> {
    doc.compress();
    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| ConvertError::PdfWriteFailed(e.to_string()))?;
    Ok(buf)
}

/// Serialise `doc` and write it to `path`.
pub fn save(doc: &mut Document, path: &Path) -> Result<(), ConvertError> {
    let bytes = to_bytes(doc)?;
    std::fs::write(path, bytes).map_err(|e| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
