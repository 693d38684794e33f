//! Rotated block layout
//!
//! All coordinates are PDF user-space points with the origin at the page's
//! lower-left corner.

use crate::font::GlyphMetrics;
use tracing::warn;

/// Estimated advance of one character, in ems, when the font cannot measure it
pub const ESTIMATED_CHAR_WIDTH_EM: f64 = 0.6;

/// A point in page space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
}

impl PageGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Check if a point lies within `[0, width] x [0, height]`
    pub fn contains(&self, point: Point) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

/// Unrotated extent of a text block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSize {
    pub width: f64,
    pub height: f64,
}

/// Result of laying out the primary block on a page
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    /// Block anchor, chosen so the rotated bounding box is centred
    pub base: Point,
    /// Draw origin of each line, top line first
    pub lines: Vec<Point>,
    /// Measured width of each line in points
    pub widths: Vec<f64>,
    /// Unrotated block extent
    pub size: BlockSize,
}

/// Measure a line, estimating from its character count if the font can't
pub fn measure_line<M: GlyphMetrics + ?Sized>(metrics: &M, line: &str, font_size: f64) -> f64 {
    match metrics.width_of(line, font_size) {
        Ok(width) => width,
        Err(err) => {
            let estimate = line.chars().count() as f64 * font_size * ESTIMATED_CHAR_WIDTH_EM;
            warn!(%err, line, estimate, "estimating line width");
            estimate
        }
    }
}

/// Height of a block of `line_count` lines
///
/// The first line contributes a full font size, each further line adds the
/// gap between baselines beyond one font size.
pub fn block_height(line_count: usize, font_size: f64, line_spacing: f64) -> f64 {
    let n = line_count as f64;
    n * font_size + (n - 1.0).max(0.0) * (line_spacing - font_size)
}

/// Anchor that puts the centre of a rotated block on `center`
///
/// The text primitive rotates about its draw origin, so the origin is
/// pulled back by half of the rotated box diagonal.
pub fn rotated_anchor(center: Point, size: BlockSize, angle_degrees: f64) -> Point {
    let theta = angle_degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let offset_x = (size.width * cos + size.height * sin) / 2.0;
    let offset_y = (size.width * sin - size.height * cos) / 2.0;
    Point::new(center.x - offset_x, center.y - offset_y)
}

/// Draw origin of each line of a block
///
/// Lines step down from `y_ref + block_height / 2` by `line_spacing`; each
/// line is re-centred horizontally on `x_ref` by half its rotated width.
/// This corrects the horizontal placement of each line but not its full
/// rotated offset.
pub fn line_origins(
    x_ref: f64,
    y_ref: f64,
    widths: &[f64],
    block_height: f64,
    line_spacing: f64,
    angle_degrees: f64,
) -> Vec<Point> {
    let cos = angle_degrees.to_radians().cos();
    widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let y = y_ref + block_height / 2.0 - i as f64 * line_spacing;
            let x = x_ref - (width * cos) / 2.0;
            Point::new(x, y)
        })
        .collect()
}

/// Lay out the primary block centred on a page
pub fn compute_anchor<M: GlyphMetrics + ?Sized>(
    lines: &[String],
    metrics: &M,
    font_size: f64,
    line_spacing: f64,
    angle_degrees: f64,
    page: PageGeometry,
) -> BlockLayout {
    let widths: Vec<f64> = lines
        .iter()
        .map(|line| measure_line(metrics, line, font_size))
        .collect();

    let size = BlockSize {
        width: widths.iter().copied().fold(0.0, f64::max),
        height: block_height(lines.len(), font_size, line_spacing),
    };

    let center = page.center();
    let base = rotated_anchor(center, size, angle_degrees);
    let origins = line_origins(
        center.x,
        base.y,
        &widths,
        size.height,
        line_spacing,
        angle_degrees,
    );

    BlockLayout {
        base,
        lines: origins,
        widths,
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::UnsupportedGlyph;

    /// Every character is 10 points wide at any size; '#' is unsupported
    struct FixedMetrics;

    impl GlyphMetrics for FixedMetrics {
        fn width_of(
            &self,
            text: &str,
            _font_size: f64,
        ) -> std::result::Result<f64, UnsupportedGlyph> {
            match text.chars().find(|&c| c == '#') {
                Some(c) => Err(UnsupportedGlyph(c)),
                None => Ok(text.chars().count() as f64 * 10.0),
            }
        }

        fn supports(&self, c: char) -> bool {
            c != '#'
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_block_height() {
        assert_eq!(block_height(1, 42.0, 50.0), 42.0);
        assert_eq!(block_height(3, 42.0, 50.0), 142.0);
        assert_eq!(block_height(2, 10.0, 10.0), 20.0);
    }

    #[test]
    fn test_measure_line_fallback() {
        assert_eq!(measure_line(&FixedMetrics, "abc", 12.0), 30.0);
        // 4 chars * 20pt * 0.6
        assert!(close(measure_line(&FixedMetrics, "ab#c", 20.0), 48.0));
    }

    #[test]
    fn test_rotated_anchor_no_rotation() {
        let anchor = rotated_anchor(
            Point::new(300.0, 400.0),
            BlockSize {
                width: 100.0,
                height: 40.0,
            },
            0.0,
        );
        assert!(close(anchor.x, 250.0));
        assert!(close(anchor.y, 420.0));
    }

    #[test]
    fn test_compute_anchor_recovers_page_center() {
        let page = PageGeometry::new(595.0, 842.0);
        let text = lines(&["Nguyen Van Anh", "Phong Ke toan", "01/02/2024 09:30:00"]);
        let layout = compute_anchor(&text, &FixedMetrics, 42.0, 50.0, -45.0, page);

        // Reverse the offset algebra
        let theta = (-45.0f64).to_radians();
        let offset_x = (layout.size.width * theta.cos() + layout.size.height * theta.sin()) / 2.0;
        let offset_y = (layout.size.width * theta.sin() - layout.size.height * theta.cos()) / 2.0;
        assert!(close(layout.base.x + offset_x, 297.5));
        assert!(close(layout.base.y + offset_y, 421.0));

        assert_eq!(layout.size.width, 190.0);
        assert_eq!(layout.size.height, 142.0);
    }

    #[test]
    fn test_compute_anchor_line_positions() {
        let page = PageGeometry::new(595.0, 842.0);
        let text = lines(&["aaaa", "bb", "cccccc"]);
        let layout = compute_anchor(&text, &FixedMetrics, 42.0, 50.0, -45.0, page);
        let cos = (-45.0f64).to_radians().cos();

        assert_eq!(layout.lines.len(), 3);
        for (i, origin) in layout.lines.iter().enumerate() {
            let expected_y = layout.base.y + layout.size.height / 2.0 - i as f64 * 50.0;
            let expected_x = 297.5 - layout.widths[i] * cos / 2.0;
            assert!(close(origin.y, expected_y));
            assert!(close(origin.x, expected_x));
        }
        // Top line is highest
        assert!(layout.lines[0].y > layout.lines[2].y);
    }

    #[test]
    fn test_compute_anchor_unsupported_glyph_is_estimated() {
        let page = PageGeometry::new(200.0, 200.0);
        let text = lines(&["ok", "n#pe"]);
        let layout = compute_anchor(&text, &FixedMetrics, 10.0, 12.0, 0.0, page);
        assert_eq!(layout.widths[0], 20.0);
        assert!(close(layout.widths[1], 24.0));
    }

    #[test]
    fn test_page_contains() {
        let page = PageGeometry::new(100.0, 50.0);
        assert!(page.contains(Point::new(0.0, 0.0)));
        assert!(page.contains(Point::new(100.0, 50.0)));
        assert!(!page.contains(Point::new(-0.1, 10.0)));
        assert!(!page.contains(Point::new(10.0, 50.1)));
    }
}
