//! Text rendering operators

use crate::layout::Point;
use crate::request::Color;

/// Context for rendering one watermark line
#[derive(Debug, Clone, PartialEq)]
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "WmF1")
    pub font_resource: String,
    /// ExtGState resource name carrying the opacity (e.g., "WmGS1")
    pub gstate_resource: String,
    /// Font size in points
    pub font_size: f64,
    /// Fill color
    pub color: Color,
    /// Rotation in degrees, counter-clockwise
    pub angle_degrees: f64,
}

/// Generate PDF operators that draw one rotated line
///
/// The line is drawn inside its own `q`/`Q` pair with the opacity state
/// applied, and the text matrix both rotates and positions it:
///
/// ```text
/// q /GS gs r g b rg BT /F size Tf cos sin -sin cos x y Tm <text> Tj ET Q
/// ```
///
/// # Arguments
/// * `encoded` - Encoded string operand, literal `(..)` or hex `<..>`
/// * `origin` - Draw origin in page space
/// * `ctx` - Text rendering context
pub fn generate_text_operators(encoded: &str, origin: Point, ctx: &TextRenderContext) -> Vec<u8> {
    let (sin, cos) = ctx.angle_degrees.to_radians().sin_cos();
    let mut ops = String::new();

    ops.push_str("q\n");
    ops.push_str(&format!("/{} gs\n", ctx.gstate_resource));

    // Non-stroking fill color
    ops.push_str(&format!(
        "{} {} {} rg\n",
        fmt_num(f64::from(ctx.color.r)),
        fmt_num(f64::from(ctx.color.g)),
        fmt_num(f64::from(ctx.color.b))
    ));

    ops.push_str("BT\n");
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_resource, fmt_num(ctx.font_size)));

    // Rotation and translation in one text matrix
    ops.push_str(&format!(
        "{} {} {} {} {} {} Tm\n",
        fmt_num(cos),
        fmt_num(sin),
        fmt_num(-sin),
        fmt_num(cos),
        fmt_num(origin.x),
        fmt_num(origin.y)
    ));

    ops.push_str(&format!("{encoded} Tj\n"));
    ops.push_str("ET\n");
    ops.push_str("Q\n");

    ops.into_bytes()
}

/// Format a number for a content stream
///
/// Up to four decimals, trailing zeros dropped, never `-0`.
pub(crate) fn fmt_num(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let formatted = format!("{rounded:.4}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
