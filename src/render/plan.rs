//! Builds the frame as a flat list of draw commands. Nothing here touches
//! the GPU or mutates game state, so the whole frame can be inspected in
//! tests.

use super::command::{DrawCommand, SpriteKind, TileSource};
use super::cull::{visible_region, CullMargin};
use crate::camera::Camera;
use crate::entities::EntityClass;
use crate::map::Map;
use crate::session::{Facing, Session};
use crate::spatial::{TileCoord, TileId};
use crate::tileset::TilesetTable;
use macroquad::prelude::*;

/// Sprite sizes in tiles.
const HEART_SIZE: Vec2 = Vec2::new(1.0, 1.0);
const FLOWER_SIZE: Vec2 = Vec2::new(1.0, 1.0);
const NPC_SIZE: Vec2 = Vec2::new(2.0, 2.0);
const PLAYER_SIZE: Vec2 = Vec2::new(2.0, 2.0);
const PLAYER_SIZE_WIDE: Vec2 = Vec2::new(2.3, 2.3);

pub struct FrameInput<'a> {
    pub map: &'a Map,
    pub session: &'a Session,
    pub camera: &'a Camera,
    /// Milliseconds since the render loop started.
    pub elapsed_ms: u64,
    pub hearts_required: u32,
    pub debug_areas: bool,
}

pub fn plan_frame(input: &FrameInput) -> Vec<DrawCommand> {
    let mut out = Vec::new();
    plan_tile_layers(input, &mut out);
    plan_tile_objects(input, &mut out);
    plan_sprites(input, &mut out);
    if input.debug_areas {
        plan_debug_areas(input, &mut out);
    }
    plan_overlays(input, &mut out);
    out
}

/// Bottom-centers a sprite of `size` tiles on `cell`.
pub fn sprite_dest(cell: TileCoord, size: Vec2, tile_size: Vec2) -> Rect {
    let w = size.x * tile_size.x;
    let h = size.y * tile_size.y;
    let base = cell.top_left_px(tile_size);
    Rect::new(
        base.x + tile_size.x / 2.0 - w / 2.0,
        base.y + tile_size.y - h,
        w,
        h,
    )
}

fn player_sprite(facing: Facing) -> (SpriteKind, Vec2) {
    match facing {
        Facing::Up => (SpriteKind::PlayerUp, PLAYER_SIZE),
        Facing::Down => (SpriteKind::PlayerDown, PLAYER_SIZE_WIDE),
        Facing::Left => (SpriteKind::PlayerLeft, PLAYER_SIZE_WIDE),
        Facing::Right => (SpriteKind::PlayerRight, PLAYER_SIZE),
    }
}

fn plan_tile_layers(input: &FrameInput, out: &mut Vec<DrawCommand>) {
    let map = input.map;
    let tile = map.tile_size();
    let margin = CullMargin::for_tilesets(&map.tilesets, tile);

    for layer in map.tile_layers().filter(|l| l.visible) {
        let mut view = input.camera.world_rect();
        view.x -= layer.offset.x;
        view.y -= layer.offset.y;
        let region = visible_region(view, tile, layer.width, layer.height, margin);

        for (x, y) in region.cells() {
            let gid = layer.gid_at(x, y);
            if gid.is_empty() {
                continue;
            }
            let shown = map.tilesets.animated_gid(gid, input.elapsed_ms);
            let cell_px = vec2(x as f32 * tile.x, y as f32 * tile.y) + layer.offset;
            if let Some(cmd) = layer_tile(&map.tilesets, shown, cell_px, tile, layer.opacity) {
                out.push(cmd);
            }
        }
    }
}

/// A tile-layer cell: sheet tiles fill the cell, collection tiles keep the
/// tileset's tile size and stand on the cell's bottom edge.
fn layer_tile(
    tilesets: &TilesetTable,
    gid: TileId,
    cell_px: Vec2,
    tile: Vec2,
    opacity: f32,
) -> Option<DrawCommand> {
    let (index, local) = tilesets.index_for_gid(gid)?;
    let ts = tilesets.get(index)?;

    if ts.is_collection() {
        ts.tile_image(local)?;
        let (w, h) = (ts.tile_w as f32, ts.tile_h as f32);
        return Some(DrawCommand::Tile {
            source: TileSource::Image { tileset: index, local },
            src: None,
            dest: Rect::new(cell_px.x, cell_px.y - (h - tile.y), w, h),
            opacity,
        });
    }

    let src = ts.source_rect(local)?;
    Some(DrawCommand::Tile {
        source: TileSource::Sheet { tileset: index },
        src: Some(src),
        dest: Rect::new(cell_px.x, cell_px.y, tile.x, tile.y),
        opacity,
    })
}

fn plan_tile_objects(input: &FrameInput, out: &mut Vec<DrawCommand>) {
    let map = input.map;
    let view = input.camera.world_rect();

    for layer in map.object_layers().filter(|l| l.visible) {
        for obj in layer.objects.iter().filter(|o| o.visible) {
            // interactive objects are drawn as sprites from session state
            if EntityClass::of(obj).is_some() {
                continue;
            }
            let Some(gid) = obj.gid() else {
                continue;
            };
            let shown = map.tilesets.animated_gid(TileId(gid), input.elapsed_ms);
            let Some((index, local)) = map.tilesets.index_for_gid(shown) else {
                continue;
            };
            let Some(ts) = map.tilesets.get(index) else {
                continue;
            };

            let left = obj.x + layer.offset.x;
            let bottom = obj.y + layer.offset.y;
            let cmd = if let Some(img) = ts.tile_image(local) {
                let (w, h) = (img.width as f32, img.height as f32);
                DrawCommand::Tile {
                    source: TileSource::Image { tileset: index, local },
                    src: None,
                    dest: Rect::new(left, bottom - h, w, h),
                    opacity: 1.0,
                }
            } else if let Some(src) = ts.source_rect(local) {
                let (w, h) = (ts.tile_w as f32, ts.tile_h as f32);
                DrawCommand::Tile {
                    source: TileSource::Sheet { tileset: index },
                    src: Some(src),
                    dest: Rect::new(left, bottom - h, w, h),
                    opacity: 1.0,
                }
            } else {
                continue;
            };

            if let DrawCommand::Tile { dest, .. } = &cmd {
                if !dest.overlaps(&view) {
                    continue;
                }
            }
            out.push(cmd);
        }
    }
}

fn plan_sprites(input: &FrameInput, out: &mut Vec<DrawCommand>) {
    let tile = input.map.tile_size();
    let session = input.session;

    for cell in session.hearts().keys() {
        out.push(DrawCommand::Sprite {
            kind: SpriteKind::Heart,
            dest: sprite_dest(*cell, HEART_SIZE, tile),
        });
    }

    if let Some(npc) = session.npc() {
        out.push(DrawCommand::Sprite {
            kind: SpriteKind::Npc,
            dest: sprite_dest(npc.cell, NPC_SIZE, tile),
        });
    }

    let player = session.player();
    let (kind, size) = player_sprite(player.facing);
    out.push(DrawCommand::Sprite {
        kind,
        dest: sprite_dest(player.cell, size, tile),
    });

    if session.has_flower() {
        out.push(DrawCommand::Sprite {
            kind: SpriteKind::Flower,
            dest: sprite_dest(player.cell.offset(0, -1), FLOWER_SIZE, tile),
        });
    }
}

fn plan_debug_areas(input: &FrameInput, out: &mut Vec<DrawCommand>) {
    let session = input.session;
    let areas = [
        session.shop().and_then(|s| s.area),
        session.npc().and_then(|n| n.area),
    ];
    out.extend(
        areas
            .into_iter()
            .flatten()
            .map(|rect| DrawCommand::AreaOutline { rect }),
    );
}

fn plan_overlays(input: &FrameInput, out: &mut Vec<DrawCommand>) {
    let session = input.session;
    out.push(DrawCommand::Hud {
        hearts: session.hearts_count(),
        required: input.hearts_required,
    });
    if !session.message().is_empty() {
        out.push(DrawCommand::Message {
            text: session.message().to_owned(),
        });
    }
    if session.win_modal_visible() {
        out.push(DrawCommand::WinModal {
            text: session.message().to_owned(),
        });
    }
}
