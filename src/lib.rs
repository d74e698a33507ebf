//! Tiled-map adventure for Macroquad: collect hearts, buy a flower at the
//! shop, deliver it to the NPC.

pub mod camera;
pub mod collision;
pub mod config;
pub mod dialog;
pub mod entities;
mod error;
pub mod game;
pub mod ir_map;
pub mod loader;
pub mod map;
pub mod render;
pub mod session;
pub mod shell;
pub mod spatial;
pub mod tileset;

pub use camera::{Camera, Viewport};
pub use collision::CollisionGrid;
pub use config::{EngineConfig, FootprintConfig, SpritePaths, WindowConfig};
pub use dialog::DialogPool;
pub use entities::{Entities, EntityClass, Npc, Placement, Shop};
pub use error::{ConfigError, MapError};
pub use game::{HeartsGame, Input, World};
pub use ir_map::{IrObject, IrObjectShape, Properties, PropertyValue};
pub use map::{Map, ObjectLayer, TileLayer};
pub use render::{DrawCommand, RenderLoop, Renderer, TextureStore};
pub use session::{Facing, Interaction, MoveOutcome, Session};
pub use shell::{NullShell, Screen, Shell};
pub use spatial::{TileCoord, TileId};
pub use tileset::{Tileset, TilesetKind, TilesetTable};
