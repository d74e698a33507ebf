use macroquad::prelude::*;

/// Which texture a tile is cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileSource {
    /// The shared sheet image of tileset `tileset` (index in the table).
    Sheet { tileset: usize },
    /// The per-tile image of a collection tileset.
    Image { tileset: usize, local: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    PlayerUp,
    PlayerDown,
    PlayerLeft,
    PlayerRight,
    Npc,
    Heart,
    Flower,
}

/// One draw call. World-space commands carry map pixels and are moved
/// through the camera by the executor; HUD commands are screen-space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Tile {
        source: TileSource,
        /// Sub-rectangle of a sheet; `None` draws the whole image.
        src: Option<Rect>,
        dest: Rect,
        opacity: f32,
    },
    Sprite {
        kind: SpriteKind,
        dest: Rect,
    },
    AreaOutline {
        rect: Rect,
    },
    Hud {
        hearts: u32,
        required: u32,
    },
    Message {
        text: String,
    },
    WinModal {
        text: String,
    },
}
