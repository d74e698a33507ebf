use macroquad::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileId(pub u32);

pub const FLIP_H: u32 = 0x8000_0000; // bit 31
pub const FLIP_V: u32 = 0x4000_0000; // bit 30
pub const FLIP_D: u32 = 0x2000_0000; // bit 29
pub const GID_MASK: u32 = 0x1FFF_FFFF; // keep lower 29 bits (bit 28 is free)

impl TileId {
    pub const EMPTY: TileId = TileId(0);

    #[inline] pub fn raw(self) -> u32 { self.0 }
    #[inline] pub fn clean(self) -> u32 { self.0 & GID_MASK }
    #[inline] pub fn is_empty(self) -> bool { self.clean() == 0 }
    #[inline] pub fn flip_h(self) -> bool { (self.0 & FLIP_H) != 0 }
    #[inline] pub fn flip_v(self) -> bool { (self.0 & FLIP_V) != 0 }
    #[inline] pub fn flip_d(self) -> bool { (self.0 & FLIP_D) != 0 }

    /// Drops the orientation bits. Flips are not applied when drawing.
    #[inline]
    pub fn stripped(self) -> TileId {
        TileId(self.clean())
    }
}

/// A cell on the map grid. Signed so that a step off the left/top edge is
/// still representable before the bounds check rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        TileCoord { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        TileCoord::new(self.x + dx, self.y + dy)
    }

    /// Cell containing the pixel `p`.
    #[inline]
    pub fn from_pixel(p: Vec2, tile_size: Vec2) -> Self {
        TileCoord::new(
            (p.x / tile_size.x).floor() as i32,
            (p.y / tile_size.y).floor() as i32,
        )
    }

    #[inline]
    pub fn top_left_px(self, tile_size: Vec2) -> Vec2 {
        vec2(self.x as f32 * tile_size.x, self.y as f32 * tile_size.y)
    }

    #[inline]
    pub fn center_px(self, tile_size: Vec2) -> Vec2 {
        vec2(
            (self.x as f32 + 0.5) * tile_size.x,
            (self.y as f32 + 0.5) * tile_size.y,
        )
    }

    /// Pixel rectangle covered by this cell.
    #[inline]
    pub fn px_rect(self, tile_size: Vec2) -> Rect {
        let tl = self.top_left_px(tile_size);
        Rect::new(tl.x, tl.y, tile_size.x, tile_size.y)
    }
}

/// Inclusive on every edge, so a point sitting exactly on the border of an
/// interaction area still counts as inside.
#[inline]
pub fn point_in_rect(p: Vec2, r: &Rect) -> bool {
    p.x >= r.x && p.x <= r.x + r.w && p.y >= r.y && p.y <= r.y + r.h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_all_three_flip_bits() {
        let id = TileId(FLIP_H | FLIP_V | FLIP_D | 42);
        assert_eq!(id.clean(), 42);
        assert!(id.flip_h() && id.flip_v() && id.flip_d());
        assert_eq!(id.stripped(), TileId(42));
    }

    #[test]
    fn flag_only_id_is_empty() {
        assert!(TileId(FLIP_H).is_empty());
        assert!(!TileId(1).is_empty());
    }

    #[test]
    fn from_pixel_floors_negative_coordinates() {
        let ts = vec2(16.0, 16.0);
        assert_eq!(TileCoord::from_pixel(vec2(-1.0, 15.9), ts), TileCoord::new(-1, 0));
        assert_eq!(TileCoord::from_pixel(vec2(32.0, 33.0), ts), TileCoord::new(2, 2));
    }

    #[test]
    fn point_on_rect_border_is_inside() {
        let r = Rect::new(80.0, 80.0, 16.0, 16.0);
        assert!(point_in_rect(vec2(96.0, 96.0), &r));
        assert!(point_in_rect(vec2(80.0, 88.0), &r));
        assert!(!point_in_rect(vec2(96.5, 88.0), &r));
    }
}
