//! Layout-aware PDF text extraction.
//!
//! The downstream text metric compares raw character sequences, so
//! extraction has to reproduce reading order rather than content-stream
//! order. Each text-showing operation is recorded at its text-space
//! position; fragments on a page are then sorted top-to-bottom and
//! left-to-right before being joined.
//!
//! Only the text-positioning subset of the content operator set is
//! interpreted (`BT`/`ET`, `Td`, `TD`, `TL`, `Tm`, `T*`, `Tj`, `'`,
//! `"`, `TJ`). String operands are decoded as UTF-16BE when they carry
//! a byte-order mark and as Latin-1 otherwise; CID-keyed font programs
//! are not resolved.

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use pdfsim_core::{PdfSimError, Result};
use std::path::Path;

/// Fragments whose vertical positions differ by no more than this many
/// text-space units are placed on the same output line.
const LINE_TOLERANCE: f32 = 2.0;

/// A run of shown text anchored at its text-space position.
#[derive(Debug)]
struct Fragment {
    x: f32,
    y: f32,
    text: String,
}

/// Extract the full text of `path`, pages concatenated in page order.
///
/// Extraction is deterministic: re-extracting an unchanged file yields
/// byte-identical output. Pages whose content streams cannot be decoded
/// are skipped with a warning; their text is absent from the result.
///
/// # Errors
///
/// Returns [`PdfSimError::Extraction`] when the document cannot be
/// opened, is structurally invalid, or is encrypted.
pub fn extract_text(path: &Path) -> Result<String> {
    let doc = load_document(path)?;
    let mut pages = Vec::new();
    for (page_num, page_id) in doc.get_pages() {
        match extract_page(&doc, page_id) {
            Ok(text) => pages.push(text),
            Err(e) => log::warn!("skipping page {page_num} of {}: {e}", path.display()),
        }
    }
    Ok(pages.join("\n"))
}

/// Open a document, rejecting anything unreadable or encrypted.
pub(crate) fn load_document(path: &Path) -> Result<Document> {
    let doc = Document::load(path)
        .map_err(|e| PdfSimError::Extraction(format!("{}: {e}", path.display())))?;
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(PdfSimError::Extraction(format!(
            "{}: document is encrypted and denies extraction",
            path.display()
        )));
    }
    Ok(doc)
}

fn extract_page(doc: &Document, page_id: ObjectId) -> Result<String> {
    let data = doc
        .get_page_content(page_id)
        .map_err(|e| PdfSimError::Extraction(format!("unreadable content stream: {e}")))?;
    let content = Content::decode(&data)
        .map_err(|e| PdfSimError::Extraction(format!("undecodable content stream: {e}")))?;

    let mut fragments: Vec<Fragment> = Vec::new();
    // Current text position and the start of the current line, both in
    // unrotated text space. Good enough for ordering; no font metrics.
    let (mut x, mut y) = (0.0_f32, 0.0_f32);
    let (mut line_x, mut line_y) = (0.0_f32, 0.0_f32);
    let mut leading = 0.0_f32;

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => {
                x = 0.0;
                y = 0.0;
                line_x = 0.0;
                line_y = 0.0;
            }
            "Td" => {
                if let [tx, ty] = numbers(&op.operands)[..] {
                    line_x += tx;
                    line_y += ty;
                    x = line_x;
                    y = line_y;
                }
            }
            "TD" => {
                if let [tx, ty] = numbers(&op.operands)[..] {
                    leading = -ty;
                    line_x += tx;
                    line_y += ty;
                    x = line_x;
                    y = line_y;
                }
            }
            "TL" => {
                if let [tl] = numbers(&op.operands)[..] {
                    leading = tl;
                }
            }
            "Tm" => {
                let nums = numbers(&op.operands);
                if nums.len() == 6 {
                    line_x = nums[4];
                    line_y = nums[5];
                    x = line_x;
                    y = line_y;
                }
            }
            "T*" => {
                line_y -= leading;
                x = line_x;
                y = line_y;
            }
            "Tj" => {
                push_fragment(&mut fragments, x, y, collect_text(&op.operands));
            }
            "'" => {
                line_y -= leading;
                x = line_x;
                y = line_y;
                push_fragment(&mut fragments, x, y, collect_text(&op.operands));
            }
            "\"" => {
                line_y -= leading;
                x = line_x;
                y = line_y;
                // Operands are word spacing, char spacing, string.
                let text = collect_text(op.operands.get(2..).unwrap_or(&[]));
                push_fragment(&mut fragments, x, y, text);
            }
            "TJ" => {
                push_fragment(&mut fragments, x, y, collect_text(&op.operands));
            }
            _ => {}
        }
    }

    Ok(assemble_lines(fragments))
}

fn push_fragment(fragments: &mut Vec<Fragment>, x: f32, y: f32, text: String) {
    if !text.is_empty() {
        fragments.push(Fragment { x, y, text });
    }
}

/// Numeric operands, in order; non-numbers are dropped.
fn numbers(operands: &[Object]) -> Vec<f32> {
    operands
        .iter()
        .filter_map(|obj| match obj {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r),
            _ => None,
        })
        .collect()
}

/// Decode the string operands of a text-showing operation.
///
/// `TJ` arrays interleave strings with kerning adjustments; a large
/// negative adjustment conventionally stands in for an inter-word gap.
fn collect_text(operands: &[Object]) -> String {
    let mut text = String::new();
    for operand in operands {
        match operand {
            Object::String(bytes, _) => text.push_str(&decode_string(bytes)),
            Object::Array(items) => text.push_str(&collect_text(items)),
            Object::Integer(i) if *i < -100 => text.push(' '),
            Object::Real(r) if *r < -100.0 => text.push(' '),
            _ => {}
        }
    }
    text
}

fn decode_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        // UTF-16BE with byte-order mark.
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Order fragments into reading order and join them.
///
/// Fragments are grouped into lines top-to-bottom (descending `y`, with
/// [`LINE_TOLERANCE`]), ordered left-to-right within a line, joined
/// with single spaces, and lines joined with newlines.
fn assemble_lines(mut fragments: Vec<Fragment>) -> String {
    fragments.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<Vec<Fragment>> = Vec::new();
    let mut current_y = f32::INFINITY;
    for fragment in fragments {
        if lines.is_empty() || (current_y - fragment.y).abs() > LINE_TOLERANCE {
            current_y = fragment.y;
            lines.push(Vec::new());
        }
        lines.last_mut().expect("line pushed above").push(fragment);
    }

    let mut out = String::new();
    for (i, mut line) in lines.into_iter().enumerate() {
        line.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        if i > 0 {
            out.push('\n');
        }
        for (j, fragment) in line.iter().enumerate() {
            if j > 0 {
                out.push(' ');
            }
            out.push_str(&fragment.text);
        }
    }
    out
}
