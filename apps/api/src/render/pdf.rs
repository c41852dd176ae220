//! PDF backend. One PDF page per layout page, one bordered white card per slot,
//! with the word wrapped and centred on the card face.
//!
//! Layout coordinates are millimetres from the top-left corner; PDF user space is
//! points from the bottom-left corner, so every y is flipped against the page height.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use crate::layout::{CardSlot, Document};
use crate::render::font_metrics::{fit_text, measure_str, CAP_HEIGHT_EM, MM_PER_PT};
use crate::render::{PageSettings, RenderError};

const FONT_RESOURCE: &[u8] = b"F1";

fn pt(mm: f64) -> f32 {
    (mm / MM_PER_PT) as f32
}

fn real(v: f32) -> Object {
    Object::Real(v)
}

/// Renders `document` to PDF bytes.
///
/// An empty document still produces a single blank page, since a PDF needs at least one.
pub fn render_pdf(document: &Document, settings: &PageSettings) -> Result<Vec<u8>, RenderError> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica-Bold".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![(
            FONT_RESOURCE.to_vec(),
            Object::Reference(font_id),
        )])),
    )]));

    let empty: [CardSlot; 0] = [];
    let page_slots: Vec<&[CardSlot]> = if document.pages.is_empty() {
        vec![&empty[..]]
    } else {
        document.pages.iter().map(|p| p.slots.as_slice()).collect()
    };

    let mut page_ids: Vec<ObjectId> = Vec::with_capacity(page_slots.len());
    for slots in page_slots {
        let content = Content {
            operations: page_operations(slots, settings),
        };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Pdf(format!("content encoding failed: {e}")))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    real(pt(settings.page_width_mm)),
                    real(pt(settings.page_height_mm)),
                ]),
            ),
            ("Resources", Object::Reference(resources_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_ids.len() as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RenderError::Pdf(format!("save failed: {e}")))?;

    debug!(
        "Rendered {} card(s) onto {} PDF page(s), {} bytes",
        document.slots().count(),
        page_ids.len(),
        buffer.len()
    );
    Ok(buffer)
}

fn page_operations(slots: &[CardSlot], settings: &PageSettings) -> Vec<Operation> {
    let mut ops = Vec::new();
    for slot in slots {
        card_frame(&mut ops, slot, settings);
        card_text(&mut ops, slot, settings);
    }
    ops
}

/// White-filled rectangle with a black border.
fn card_frame(ops: &mut Vec<Operation>, slot: &CardSlot, settings: &PageSettings) {
    let bottom_mm = settings.page_height_mm - slot.y_mm - slot.height_mm;
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("w", vec![real(settings.border_width_pt as f32)]));
    ops.push(Operation::new("RG", vec![real(0.0), real(0.0), real(0.0)]));
    ops.push(Operation::new("rg", vec![real(1.0), real(1.0), real(1.0)]));
    ops.push(Operation::new(
        "re",
        vec![
            real(pt(slot.x_mm)),
            real(pt(bottom_mm)),
            real(pt(slot.width_mm)),
            real(pt(slot.height_mm)),
        ],
    ));
    ops.push(Operation::new("B", vec![]));
    ops.push(Operation::new("Q", vec![]));
}

/// Each wrapped line centred horizontally; the block of lines centred vertically.
fn card_text(ops: &mut Vec<Operation>, slot: &CardSlot, settings: &PageSettings) {
    let fitted = fit_text(&slot.word, slot.width_mm, slot.height_mm, settings);
    let font_mm = fitted.font_size_mm();
    let block_top_mm = slot.y_mm + (slot.height_mm - fitted.block_height_mm()) / 2.0;

    for (i, line) in fitted.lines.iter().enumerate() {
        let line_width_mm = measure_str(line) * font_mm;
        let x_mm = slot.x_mm + (slot.width_mm - line_width_mm) / 2.0;
        let line_top_mm = block_top_mm + i as f64 * fitted.line_height_mm;
        let baseline_mm =
            line_top_mm + fitted.line_height_mm / 2.0 + CAP_HEIGHT_EM * font_mm / 2.0;

        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]));
        ops.push(Operation::new(
            "Tf",
            vec![
                Object::Name(FONT_RESOURCE.to_vec()),
                real(fitted.font_size_pt as f32),
            ],
        ));
        ops.push(Operation::new(
            "Td",
            vec![
                real(pt(x_mm)),
                real(pt(settings.page_height_mm - baseline_mm)),
            ],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi_bytes(line), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
}

/// Printable ASCII passes through; anything else becomes '?'.
fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) { c as u8 } else { b'?' })
        .collect()
}
