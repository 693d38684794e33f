//! Document-level watermarking

use crate::document::PdfDocument;
use crate::font::WatermarkFont;
use crate::identity::compose_user_watermark;
use crate::page::{plan_page_runs, render_overlay};
use crate::request::{WatermarkRequest, WatermarkStyle};
use crate::Result;
use tracing::{debug, info};

/// Overlay `request` onto every page of a PDF and return the new document
///
/// Pages are processed in order, each with its own geometry. Any failure
/// aborts the whole call; no partial output is produced.
///
/// # Example
/// ```ignore
/// let request = WatermarkRequest::new(vec!["CONFIDENTIAL".to_string()]);
/// let output = apply_watermark(&pdf_bytes, &request)?;
/// ```
pub fn apply_watermark(pdf_bytes: &[u8], request: &WatermarkRequest) -> Result<Vec<u8>> {
    request.validate()?;

    let mut doc = PdfDocument::open_from_bytes(pdf_bytes)?;
    let mut font = WatermarkFont::load(&request.font)?;
    let style = &request.style;

    let lines: Vec<String> = request
        .lines
        .iter()
        .map(|line| font.prepare_line(line))
        .collect();
    for line in &lines {
        font.record_usage(line);
    }

    // One font and two opacity states shared by every page
    let font_id = doc.reserve_object_id();
    let primary_gs = doc.add_opacity_state(style.opacity);
    let tile_gs = doc.add_opacity_state(style.tile_opacity());

    let page_ids = doc.page_ids();
    info!(
        pages = page_ids.len(),
        lines = lines.len(),
        "applying watermark"
    );

    for (index, page_id) in page_ids.into_iter().enumerate() {
        let page_box = doc.page_box(page_id)?;
        let runs = plan_page_runs(&lines, &font, style, page_box.geometry());
        debug!(
            page = index + 1,
            width = page_box.width,
            height = page_box.height,
            runs = runs.len(),
            "watermarking page"
        );

        let resources = doc.register_overlay_resources(page_id, font_id, primary_gs, tile_gs)?;
        let overlay = render_overlay(&runs, &font, &resources, style, page_box.origin());
        doc.append_overlay(page_id, &overlay)?;
    }

    font.embed(doc.inner_mut(), font_id)?;
    doc.to_bytes()
}

/// Watermark a PDF with a user's name, department and optional timestamp
pub fn watermark_with_identity(
    pdf_bytes: &[u8],
    full_name: &str,
    department: &str,
    include_timestamp: bool,
) -> Result<Vec<u8>> {
    watermark_with_identity_styled(
        pdf_bytes,
        full_name,
        department,
        include_timestamp,
        WatermarkStyle::default(),
    )
}

/// [`watermark_with_identity`] with custom styling
pub fn watermark_with_identity_styled(
    pdf_bytes: &[u8],
    full_name: &str,
    department: &str,
    include_timestamp: bool,
    style: WatermarkStyle,
) -> Result<Vec<u8>> {
    let lines = compose_user_watermark(full_name, department, include_timestamp);
    let request = WatermarkRequest::new(lines).with_style(style);
    apply_watermark(pdf_bytes, &request)
}
