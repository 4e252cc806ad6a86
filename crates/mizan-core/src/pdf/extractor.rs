//! PDF text and page-image extraction using lopdf and pdf-extract.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF content extractor.
///
/// Embedded text comes from pdf-extract; page scans come from decoding
/// the image XObjects the page references. Scanned legal documents
/// carry one full-page scan per page, so the largest image on a page is
/// treated as its rasterization. The DPI argument is accepted for the
/// rendering contract but embedded scans are returned at their stored
/// resolution.
#[derive(Debug)]
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Open a PDF from a file path.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| PdfError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut extractor = Self::new();
        extractor.load(&data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("no document loaded".to_string()))
    }

    /// Object id of a 0-based page index.
    fn page_id(&self, index: usize) -> Result<ObjectId> {
        let doc = self.document()?;
        let number = u32::try_from(index + 1).map_err(|_| PdfError::InvalidPage(index))?;
        doc.get_pages()
            .get(&number)
            .copied()
            .ok_or(PdfError::InvalidPage(index))
    }

    /// Decode every image XObject referenced by a page.
    fn page_images(&self, index: usize) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let page_id = self.page_id(index)?;

        let mut images = Vec::new();
        if let Some(resources) = self.page_resources(doc, page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobjects))) = doc.dereference(xobjects) {
                    for (_name, reference) in xobjects.iter() {
                        if let Ok((_, object)) = doc.dereference(reference) {
                            if let Some(image) = decode_image_object(doc, object) {
                                images.push(image);
                            }
                        }
                    }
                }
            }
        }

        debug!("decoded {} images on page {}", images.len(), index);
        Ok(images)
    }

    /// Resources dictionary for a page, walking up the page tree for
    /// inherited entries.
    fn page_resources(&self, doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
        let mut node_id = page_id;
        loop {
            let node = doc.get_object(node_id).ok()?;
            let Object::Dictionary(dict) = node else {
                return None;
            };

            if let Ok(resources) = dict.get(b"Resources") {
                if let Ok((_, Object::Dictionary(resources))) = doc.dereference(resources) {
                    return Some(resources.clone());
                }
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => node_id = *parent_id,
                _ => return None,
            }
        }
    }

    /// Every decodable image in the document, in object order. Used as a
    /// fallback when a page's scan is not reachable through its own
    /// resources.
    fn document_images(&self) -> Vec<DynamicImage> {
        let Ok(doc) = self.document() else {
            return Vec::new();
        };
        doc.objects
            .values()
            .filter_map(|object| decode_image_object(doc, object))
            .collect()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            // Empty-password encryption is common on published gazettes.
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len())
            .unwrap_or(0)
    }

    fn extract_pages_text(&self) -> Result<Vec<String>> {
        self.document()?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        Ok(pages)
    }

    fn extract_page_text(&self, index: usize) -> Result<String> {
        let pages = self.extract_pages_text()?;
        pages
            .into_iter()
            .nth(index)
            .ok_or(PdfError::InvalidPage(index))
    }

    fn render_page(&self, index: usize, _dpi: u32) -> Result<DynamicImage> {
        if index >= self.page_count() {
            return Err(PdfError::InvalidPage(index));
        }

        // Prefer the largest image the page itself references.
        let page_scan = self
            .page_images(index)?
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()));
        if let Some(scan) = page_scan {
            return Ok(scan);
        }

        // Some generators park page scans in shared resources; fall back
        // to document object order.
        let mut document_images = self.document_images();
        if index < document_images.len() {
            return Ok(document_images.swap_remove(index));
        }

        Err(PdfError::ImageExtraction(format!(
            "no scan image found for page {}",
            index
        )))
    }
}

/// Decode a stream object into an image, when it is an image XObject in
/// a supported encoding (JPEG via DCTDecode, or raw 8-bit RGB/Gray).
fn decode_image_object(doc: &Document, object: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = object else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
    trace!("image object: {}x{}", width, height);

    if let Ok(filter) = dict.get(b"Filter") {
        let filter_name = match filter {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(array) => array.first().and_then(|o| o.as_name().ok()),
            _ => None,
        };

        if let Some(name) = filter_name {
            if name == b"DCTDecode" {
                // JPEG stream; decode the raw content directly.
                return image::load_from_memory_with_format(
                    &stream.content,
                    image::ImageFormat::Jpeg,
                )
                .ok();
            }
            if name == b"JPXDecode" || name == b"CCITTFaxDecode" || name == b"JBIG2Decode" {
                trace!("unsupported image filter");
                return None;
            }
        }
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(array) => array.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("unsupported bits per component: {}", bits);
        return None;
    }

    decode_raw_samples(&data, width, height, color_space)
}

/// Expand raw 8-bit RGB or grayscale samples into an RGBA image.
fn decode_raw_samples(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
) -> Option<DynamicImage> {
    let pixels = (width as usize) * (height as usize);
    let mut rgba = Vec::with_capacity(pixels * 4);

    let is_rgb = color_space == b"DeviceRGB" || color_space == b"RGB";
    let is_gray = color_space == b"DeviceGray" || color_space == b"G";

    if is_rgb && data.len() >= pixels * 3 {
        for chunk in data[..pixels * 3].chunks_exact(3) {
            rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
        }
    } else if is_gray && data.len() >= pixels {
        for &gray in &data[..pixels] {
            rgba.extend_from_slice(&[gray, gray, gray, 255]);
        }
    } else {
        trace!(
            "could not decode raw image: colorspace={:?}, len={}",
            String::from_utf8_lossy(color_space),
            data.len()
        );
        return None;
    }

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}
