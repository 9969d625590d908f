//! Embedded raster image extraction.
//!
//! Walks every page in document order and decodes each `/XObject` image
//! in the page's resource dictionary, preserving native resolution. An
//! individual image that cannot be decoded is skipped with a warning;
//! only a document that cannot be opened at all is fatal.

use crate::text::load_document;
use image::RgbImage;
use lopdf::{Dictionary, Document, Object, Stream};
use pdfsim_core::{PdfSimError, Result};
use std::path::Path;

/// Extract every decodable embedded image of `path`, in document
/// traversal order (page order, then resource-dictionary order within
/// the page).
///
/// A document with no embedded images yields an empty vector, which is
/// valid input for the caller to guard before invoking the image
/// metric.
///
/// # Errors
///
/// Returns [`PdfSimError::Extraction`] when the document itself cannot
/// be opened or is encrypted.
pub fn extract_images(path: &Path) -> Result<Vec<RgbImage>> {
    let doc = load_document(path)?;
    let mut images = Vec::new();

    for (page_num, page_id) in doc.get_pages() {
        let Some(resources) = page_resources(&doc, page_id) else {
            continue;
        };
        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .and_then(|obj| resolve_dict(&doc, obj))
        else {
            continue;
        };
        for (name, entry) in xobjects.iter() {
            let Some(stream) = resolve_stream(&doc, entry) else {
                continue;
            };
            if !is_image(stream) {
                continue;
            }
            match decode_image(stream) {
                Ok(img) => images.push(img),
                Err(e) => log::warn!(
                    "skipping image {} on page {page_num} of {}: {e}",
                    String::from_utf8_lossy(name),
                    path.display()
                ),
            }
        }
    }

    Ok(images)
}

/// Resource dictionary for a page, following the `Parent` chain for
/// inherited resources.
fn page_resources(doc: &Document, page_id: lopdf::ObjectId) -> Option<&Dictionary> {
    let mut dict = doc.get_object(page_id).ok()?.as_dict().ok()?;
    loop {
        if let Ok(resources) = dict.get(b"Resources") {
            return resolve_dict(doc, resources);
        }
        let parent = dict.get(b"Parent").ok()?;
        dict = match parent {
            Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok()?,
            Object::Dictionary(d) => d,
            _ => return None,
        };
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj) {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn resolve_stream<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Stream> {
    match resolve(doc, obj) {
        Object::Stream(stream) => Some(stream),
        _ => None,
    }
}

fn is_image(stream: &Stream) -> bool {
    matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

/// Name of the image stream's (last) decode filter, if any.
fn filter_name(dict: &Dictionary) -> Option<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => Some(name.clone()),
        Ok(Object::Array(filters)) => filters.iter().rev().find_map(|f| match f {
            Object::Name(name) => Some(name.clone()),
            _ => None,
        }),
        _ => None,
    }
}

fn dimension(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    match dict.get(key) {
        Ok(Object::Integer(v)) if *v > 0 => Ok(*v as u32),
        _ => Err(PdfSimError::Extraction(format!(
            "missing or invalid /{}",
            String::from_utf8_lossy(key)
        ))),
    }
}

/// Decode one image XObject into a 3-channel buffer at native
/// resolution.
fn decode_image(stream: &Stream) -> Result<RgbImage> {
    let dict = &stream.dict;
    let filter = filter_name(dict);

    match filter.as_deref() {
        Some(b"DCTDecode") | Some(b"JPXDecode") => {
            let decoded = image::load_from_memory(&stream.content)
                .map_err(|e| PdfSimError::Extraction(format!("undecodable image data: {e}")))?;
            Ok(decoded.to_rgb8())
        }
        Some(b"FlateDecode") | None => {
            let data = if filter.is_some() {
                stream.decompressed_content().map_err(|e| {
                    PdfSimError::Extraction(format!("undecodable image stream: {e}"))
                })?
            } else {
                stream.content.clone()
            };
            raw_samples_to_rgb(dict, data)
        }
        Some(other) => Err(PdfSimError::Extraction(format!(
            "unsupported image filter {}",
            String::from_utf8_lossy(other)
        ))),
    }
}

/// Interpret raw 8-bit samples as DeviceRGB or DeviceGray pixels.
fn raw_samples_to_rgb(dict: &Dictionary, data: Vec<u8>) -> Result<RgbImage> {
    let width = dimension(dict, b"Width")?;
    let height = dimension(dict, b"Height")?;
    let bits = match dict.get(b"BitsPerComponent") {
        Ok(Object::Integer(v)) => *v,
        _ => 8,
    };
    if bits != 8 {
        return Err(PdfSimError::Extraction(format!(
            "unsupported bit depth {bits}"
        )));
    }

    let color_space = match resolve_name(dict.get(b"ColorSpace").ok()) {
        Some(name) => name,
        None => {
            return Err(PdfSimError::Extraction(
                "missing or non-name /ColorSpace".to_string(),
            ))
        }
    };

    let pixels = (width as usize) * (height as usize);
    match color_space.as_slice() {
        b"DeviceRGB" => {
            let expected = pixels * 3;
            if data.len() < expected {
                return Err(PdfSimError::Extraction(format!(
                    "truncated RGB data: {} of {expected} bytes",
                    data.len()
                )));
            }
            let mut data = data;
            data.truncate(expected);
            RgbImage::from_raw(width, height, data)
                .ok_or_else(|| PdfSimError::Extraction("invalid RGB buffer".to_string()))
        }
        b"DeviceGray" => {
            if data.len() < pixels {
                return Err(PdfSimError::Extraction(format!(
                    "truncated grayscale data: {} of {pixels} bytes",
                    data.len()
                )));
            }
            let mut rgb = Vec::with_capacity(pixels * 3);
            for &sample in &data[..pixels] {
                rgb.extend_from_slice(&[sample, sample, sample]);
            }
            RgbImage::from_raw(width, height, rgb)
                .ok_or_else(|| PdfSimError::Extraction("invalid grayscale buffer".to_string()))
        }
        other => Err(PdfSimError::Extraction(format!(
            "unsupported color space {}",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn resolve_name(obj: Option<&Object>) -> Option<Vec<u8>> {
    match obj {
        Some(Object::Name(name)) => Some(name.clone()),
        _ => None,
    }
}
