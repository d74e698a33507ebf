//! Frame planning and the macroquad executor.

mod command;
mod cull;
mod plan;
mod textures;

pub use command::{DrawCommand, SpriteKind, TileSource};
pub use cull::{visible_region, CullMargin, TileRegion};
pub use plan::{plan_frame, sprite_dest, FrameInput};
pub use textures::TextureStore;

use crate::camera::Camera;
use macroquad::prelude::*;
use tracing::debug;

const HUD_BOX: Rect = Rect { x: 10.0, y: 10.0, w: 160.0, h: 28.0 };
const HUD_TEXT_POS: Vec2 = Vec2::new(18.0, 30.0);
const AREA_FILL: Color = Color::new(1.0, 0.41, 0.71, 0.25);
const AREA_STROKE: Color = Color::new(1.0, 0.41, 0.71, 0.9);

/// Start/stop state of the per-frame drawing. Animation time is measured
/// from the start instant; nothing is drawn while stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderLoop {
    started_at_ms: Option<u64>,
}

impl RenderLoop {
    /// Starting an already running loop keeps the original start instant.
    pub fn start(&mut self, now_ms: u64) {
        if self.started_at_ms.is_none() {
            self.started_at_ms = Some(now_ms);
            debug!(now_ms, "render_loop_started");
        }
    }

    pub fn stop(&mut self) {
        if self.started_at_ms.take().is_some() {
            debug!("render_loop_stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at_ms.is_some()
    }

    /// `None` while stopped.
    pub fn elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        self.started_at_ms.map(|start| now_ms.saturating_sub(start))
    }
}

/// Draws planned commands with the loaded textures.
pub struct Renderer {
    textures: TextureStore,
}

impl Renderer {
    pub fn new(textures: TextureStore) -> Self {
        Self { textures }
    }

    pub fn draw(&self, commands: &[DrawCommand], camera: &Camera) {
        for cmd in commands {
            match cmd {
                DrawCommand::Tile {
                    source,
                    src,
                    dest,
                    opacity,
                } => {
                    if let Some(tex) = self.textures.tile(*source) {
                        let tint = Color::new(1.0, 1.0, 1.0, *opacity);
                        draw_textured(tex, *src, camera.rect_to_screen(*dest), tint);
                    }
                }
                DrawCommand::Sprite { kind, dest } => {
                    if let Some(tex) = self.textures.sprite(*kind) {
                        draw_textured(tex, None, camera.rect_to_screen(*dest), WHITE);
                    }
                }
                DrawCommand::AreaOutline { rect } => {
                    let r = camera.rect_to_screen(*rect);
                    draw_rectangle(r.x, r.y, r.w, r.h, AREA_FILL);
                    draw_rectangle_lines(r.x, r.y, r.w, r.h, 2.0, AREA_STROKE);
                }
                DrawCommand::Hud { hearts, required } => draw_hud(*hearts, *required),
                DrawCommand::Message { text } => draw_message(text),
                DrawCommand::WinModal { text } => draw_win_modal(text),
            }
        }
    }
}

fn draw_textured(tex: &Texture2D, source: Option<Rect>, dest: Rect, tint: Color) {
    draw_texture_ex(
        tex,
        dest.x,
        dest.y,
        tint,
        DrawTextureParams {
            dest_size: Some(vec2(dest.w, dest.h)),
            source,
            ..Default::default()
        },
    );
}

fn draw_hud(hearts: u32, required: u32) {
    draw_rectangle(
        HUD_BOX.x,
        HUD_BOX.y,
        HUD_BOX.w,
        HUD_BOX.h,
        Color::new(1.0, 1.0, 1.0, 0.8),
    );
    draw_text(
        &format!("Hearts {hearts}/{required}"),
        HUD_TEXT_POS.x,
        HUD_TEXT_POS.y,
        22.0,
        BLACK,
    );
}

fn draw_message(text: &str) {
    let h = 44.0;
    let top = screen_height() - h;
    draw_rectangle(0.0, top, screen_width(), h, Color::new(0.0, 0.0, 0.0, 0.6));
    draw_text(text, 16.0, top + 29.0, 26.0, WHITE);
}

fn draw_win_modal(text: &str) {
    let (sw, sh) = (screen_width(), screen_height());
    draw_rectangle(0.0, 0.0, sw, sh, Color::new(0.0, 0.0, 0.0, 0.5));

    let (w, h) = (420.0, 160.0);
    let (x, y) = ((sw - w) / 2.0, (sh - h) / 2.0);
    draw_rectangle(x, y, w, h, Color::new(1.0, 0.94, 0.96, 1.0));
    draw_rectangle_lines(x, y, w, h, 3.0, AREA_STROKE);

    let centered = |line: &str, size: u16, baseline: f32, color: Color| {
        let dims = measure_text(line, None, size, 1.0);
        draw_text(line, x + (w - dims.width) / 2.0, baseline, size as f32, color);
    };
    centered(text, 30, y + 64.0, BLACK);
    centered("Press Enter for the menu", 20, y + 120.0, DARKGRAY);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_loop_measures_from_first_start() {
        let mut rl = RenderLoop::default();
        assert!(!rl.is_running());
        assert_eq!(rl.elapsed_ms(500), None);

        rl.start(1_000);
        rl.start(1_200);
        assert!(rl.is_running());
        assert_eq!(rl.elapsed_ms(1_250), Some(250));

        rl.stop();
        assert!(!rl.is_running());
        assert_eq!(rl.elapsed_ms(2_000), None);

        rl.start(3_000);
        assert_eq!(rl.elapsed_ms(3_100), Some(100));
    }
}
