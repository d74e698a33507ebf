use crate::spatial::TileCoord;
use macroquad::prelude::*;

/// Size of the on-screen area the world is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
}

impl Viewport {
    /// Non-positive zoom falls back to 1.
    pub fn effective_zoom(&self) -> f32 {
        if self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        }
    }

    /// World pixels visible at this zoom.
    pub fn world_size(&self) -> Vec2 {
        vec2(self.width, self.height) / self.effective_zoom()
    }
}

/// Top-left world pixel shown at the top-left of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub origin: Vec2,
    pub zoom: f32,
    pub view: Vec2,
}

impl Camera {
    /// Centers on `player`, then clamps so nothing past the map edge shows.
    /// A map smaller than the view pins the camera to the origin.
    pub fn follow(player: TileCoord, tile_size: Vec2, map_px: Vec2, viewport: Viewport) -> Self {
        let view = viewport.world_size();
        let target = player.center_px(tile_size) - view / 2.0;
        let max = (map_px - view).max(Vec2::ZERO);
        Camera {
            origin: target.clamp(Vec2::ZERO, max),
            zoom: viewport.effective_zoom(),
            view,
        }
    }

    #[inline]
    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        (p - self.origin) * self.zoom
    }

    pub fn rect_to_screen(&self, r: Rect) -> Rect {
        let tl = self.world_to_screen(vec2(r.x, r.y));
        Rect::new(tl.x, tl.y, r.w * self.zoom, r.h * self.zoom)
    }

    /// World-space rectangle the camera shows.
    pub fn world_rect(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.view.x, self.view.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: Vec2 = Vec2::new(16.0, 16.0);

    fn viewport() -> Viewport {
        Viewport { width: 240.0, height: 180.0, zoom: 1.5 }
    }

    #[test]
    fn centers_on_player_away_from_edges() {
        // 50x50 map of 16px tiles, view is 160x120 world px
        let cam = Camera::follow(TileCoord::new(20, 20), TS, vec2(800.0, 800.0), viewport());
        assert_eq!(cam.view, vec2(160.0, 120.0));
        assert_eq!(cam.origin, vec2(328.0 - 80.0, 328.0 - 60.0));
        assert_eq!(cam.zoom, 1.5);
    }

    #[test]
    fn clamps_at_both_edges() {
        let map = vec2(800.0, 800.0);
        let cam = Camera::follow(TileCoord::new(0, 0), TS, map, viewport());
        assert_eq!(cam.origin, Vec2::ZERO);
        let cam = Camera::follow(TileCoord::new(49, 49), TS, map, viewport());
        assert_eq!(cam.origin, vec2(640.0, 680.0));
    }

    #[test]
    fn small_map_pins_to_origin() {
        let cam = Camera::follow(TileCoord::new(3, 3), TS, vec2(64.0, 64.0), viewport());
        assert_eq!(cam.origin, Vec2::ZERO);
    }

    #[test]
    fn world_to_screen_applies_origin_then_zoom() {
        let cam = Camera { origin: vec2(10.0, 20.0), zoom: 2.0, view: vec2(100.0, 100.0) };
        assert_eq!(cam.world_to_screen(vec2(15.0, 20.0)), vec2(10.0, 0.0));
        assert_eq!(
            cam.rect_to_screen(Rect::new(10.0, 20.0, 16.0, 8.0)),
            Rect::new(0.0, 0.0, 32.0, 16.0)
        );
    }
}
