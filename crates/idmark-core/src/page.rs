//! Per-page watermark planning and overlay rendering

use crate::font::{GlyphMetrics, WatermarkFont};
use crate::layout::{compute_anchor, line_origins, measure_line, PageGeometry, Point};
use crate::request::WatermarkStyle;
use crate::text::{fmt_num, generate_text_operators, TextRenderContext};
use crate::tiling::plan_tiles;

/// Which copy of the block a run belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// The centred block at full size and opacity
    Primary,
    /// A reduced copy on the surrounding grid
    Tile,
}

/// One line of text drawn at one position
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub origin: Point,
    pub font_size: f64,
    pub layer: Layer,
}

/// Resource names the overlay refers to on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayResources {
    /// Font resource name
    pub font: String,
    /// ExtGState for the primary block
    pub primary_gs: String,
    /// ExtGState for the tiles
    pub tile_gs: String,
}

/// Every text run for one page, primary block first then tiles
///
/// Tile lines are measured at the tile font size and re-centred on the
/// tile anchor; their vertical step reuses the primary block height and
/// line spacing.
pub fn plan_page_runs<M: GlyphMetrics + ?Sized>(
    lines: &[String],
    metrics: &M,
    style: &WatermarkStyle,
    page: PageGeometry,
) -> Vec<TextRun> {
    let layout = compute_anchor(
        lines,
        metrics,
        style.font_size,
        style.line_spacing,
        style.angle,
        page,
    );

    let mut runs: Vec<TextRun> = lines
        .iter()
        .zip(&layout.lines)
        .map(|(text, origin)| TextRun {
            text: text.clone(),
            origin: *origin,
            font_size: style.font_size,
            layer: Layer::Primary,
        })
        .collect();

    let tiles = plan_tiles(layout.base, page, style.tile_spacing);
    if tiles.is_empty() {
        return runs;
    }

    let tile_font_size = style.tile_font_size();
    let tile_widths: Vec<f64> = lines
        .iter()
        .map(|line| measure_line(metrics, line, tile_font_size))
        .collect();

    for tile in tiles {
        let origins = line_origins(
            tile.x,
            tile.y,
            &tile_widths,
            layout.size.height,
            style.line_spacing,
            style.angle,
        );
        runs.extend(lines.iter().zip(origins).map(|(text, origin)| TextRun {
            text: text.clone(),
            origin,
            font_size: tile_font_size,
            layer: Layer::Tile,
        }));
    }

    runs
}

/// Content stream operators drawing every run
///
/// The output is wrapped in its own `q`/`Q`. When the page box does not
/// start at the origin, the overlay is translated onto it first.
pub fn render_overlay(
    runs: &[TextRun],
    font: &WatermarkFont,
    resources: &OverlayResources,
    style: &WatermarkStyle,
    box_origin: Point,
) -> Vec<u8> {
    let mut ops = Vec::new();
    ops.extend_from_slice(b"q\n");
    if box_origin != Point::default() {
        ops.extend_from_slice(
            format!(
                "1 0 0 1 {} {} cm\n",
                fmt_num(box_origin.x),
                fmt_num(box_origin.y)
            )
            .as_bytes(),
        );
    }

    for run in runs {
        let gstate_resource = match run.layer {
            Layer::Primary => &resources.primary_gs,
            Layer::Tile => &resources.tile_gs,
        };
        let ctx = TextRenderContext {
            font_resource: resources.font.clone(),
            gstate_resource: gstate_resource.clone(),
            font_size: run.font_size,
            color: style.color,
            angle_degrees: style.angle,
        };
        ops.extend(generate_text_operators(
            &font.encode(&run.text),
            run.origin,
            &ctx,
        ));
    }

    ops.extend_from_slice(b"Q\n");
    ops
}
