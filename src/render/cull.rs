use crate::tileset::{TilesetKind, TilesetTable};
use macroquad::prelude::*;

/// Cells kept around the view on each axis. Tiles stand on their cell's
/// bottom-left corner and may grow up and to the right past it, so the
/// padding has to cover the largest tile a layer can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CullMargin {
    pub x: usize,
    pub y: usize,
}

impl Default for CullMargin {
    fn default() -> Self {
        CullMargin { x: 1, y: 1 }
    }
}

impl CullMargin {
    /// Margin for the tallest and widest tile any of `tilesets` draws,
    /// never less than one cell.
    pub fn for_tilesets(tilesets: &TilesetTable, tile_size: Vec2) -> Self {
        if tile_size.x <= 0.0 || tile_size.y <= 0.0 {
            return Self::default();
        }
        let (mut max_w, mut max_h) = (0u32, 0u32);
        for ts in tilesets.iter() {
            max_w = max_w.max(ts.tile_w);
            max_h = max_h.max(ts.tile_h);
            if let TilesetKind::Collection { images } = &ts.kind {
                for img in images.values() {
                    max_w = max_w.max(img.width);
                    max_h = max_h.max(img.height);
                }
            }
        }
        let cells = |px: u32, cell: f32| ((px as f32 / cell).ceil() as usize).max(1);
        CullMargin {
            x: cells(max_w, tile_size.x),
            y: cells(max_h, tile_size.y),
        }
    }
}

/// Half-open cell range `[start, end)` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileRegion {
    pub start_x: usize,
    pub start_y: usize,
    pub end_x: usize,
    pub end_y: usize,
}

impl TileRegion {
    pub fn is_empty(&self) -> bool {
        self.start_x >= self.end_x || self.start_y >= self.end_y
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.start_x..self.end_x).contains(&x) && (self.start_y..self.end_y).contains(&y)
    }

    /// Row-major cells of the region.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (sx, ex) = (self.start_x, self.end_x);
        (self.start_y..self.end_y).flat_map(move |y| (sx..ex).map(move |x| (x, y)))
    }
}

/// Cells of a `width`×`height` grid that intersect `view` (world pixels),
/// padded by `margin` and clipped to the grid.
pub fn visible_region(
    view: Rect,
    tile_size: Vec2,
    width: usize,
    height: usize,
    margin: CullMargin,
) -> TileRegion {
    if tile_size.x <= 0.0 || tile_size.y <= 0.0 {
        return TileRegion::default();
    }

    let axis = |lo: f32, len: f32, cell: f32, pad: usize, limit: usize| {
        let start = (lo / cell).floor() as i64 - pad as i64;
        let end = ((lo + len) / cell).ceil() as i64 + pad as i64;
        let clip = |v: i64| v.clamp(0, limit as i64) as usize;
        (clip(start), clip(end))
    };

    let (start_x, end_x) = axis(view.x, view.w, tile_size.x, margin.x, width);
    let (start_y, end_y) = axis(view.y, view.h, tile_size.y, margin.y, height);
    TileRegion {
        start_x,
        start_y,
        end_x,
        end_y,
    }
}
