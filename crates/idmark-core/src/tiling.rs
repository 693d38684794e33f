//! Tiled copies of the primary block

use crate::layout::{PageGeometry, Point};

/// Default grid step between tiles in points
pub const DEFAULT_TILE_SPACING: f64 = 200.0;

/// Font size of a tile relative to the primary block
pub const TILE_FONT_SCALE: f64 = 0.8;

/// Opacity of a tile relative to the primary block
pub const TILE_OPACITY_SCALE: f64 = 0.6;

/// Anchors of the tiles surrounding the primary block
///
/// Walks the 3x3 grid around `base` (skipping the centre cell, which is the
/// primary block) and keeps only anchors inside the page, so at most 8
/// tiles are returned.
pub fn plan_tiles(base: Point, page: PageGeometry, spacing: f64) -> Vec<Point> {
    let mut tiles = Vec::with_capacity(8);
    for i in -1i32..=1 {
        for j in -1i32..=1 {
            if i == 0 && j == 0 {
                continue;
            }
            let candidate = Point::new(
                base.x + f64::from(i) * spacing,
                base.y + f64::from(j) * spacing,
            );
            if page.contains(candidate) {
                tiles.push(candidate);
            }
        }
    }
    tiles
}
