use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables for the hearts game. Every field has a default, so a config file
/// only needs the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub map_path: PathBuf,
    /// Object layer scanned for the player, hearts, NPC and shop.
    pub object_layer: String,
    pub camera_zoom: f32,
    pub move_cooldown_ms: u64,
    pub footprint: FootprintConfig,
    /// Shown in the HUD as the target count.
    pub hearts_required: u32,
    pub heart_dialogs: Vec<String>,
    pub sprites: SpritePaths,
    /// Outline shop/NPC interaction areas.
    pub debug_areas: bool,
    pub window: WindowConfig,
}

/// Collision strip for tall decorative tile-objects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintConfig {
    /// Pixels measured up from the object's base that block movement.
    pub strip_height: f32,
    /// Pixels trimmed from both the left and right edge.
    pub inset_x: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpritePaths {
    pub player_up: PathBuf,
    pub player_down: PathBuf,
    pub player_left: PathBuf,
    pub player_right: PathBuf,
    pub npc: PathBuf,
    pub heart: PathBuf,
    pub flower: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: i32,
    pub height: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            map_path: PathBuf::from("assets/maps/winter_map_final.tmj"),
            object_layer: "Objects".into(),
            camera_zoom: 1.5,
            move_cooldown_ms: 120,
            footprint: FootprintConfig::default(),
            hearts_required: 8,
            heart_dialogs: [
                "My beautiful princess",
                "Your cuddles are the world to me",
                "So grateful for you",
                "Looking into your baby blues is literal heaven",
                "The sweetest girl in the universe",
                "The most perfect polar bear paws I've ever seen",
                "I LOVE YOU SO MUCH",
                "The luckiest bear in the world",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            sprites: SpritePaths::default(),
            debug_areas: true,
            window: WindowConfig::default(),
        }
    }
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            strip_height: 14.0,
            inset_x: 2.0,
        }
    }
}

impl Default for SpritePaths {
    fn default() -> Self {
        Self {
            player_up: "assets/sprites/pbear_up_blue.png".into(),
            player_down: "assets/sprites/pbear_down_blue.png".into(),
            player_left: "assets/sprites/pbear_left_blue.png".into(),
            player_right: "assets/sprites/pbear_right_blue.png".into(),
            npc: "assets/sprites/pbear_down_pink.png".into(),
            heart: "assets/sprites/heart.png".into(),
            flower: "assets/sprites/flower.png".into(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Hearts".into(),
            width: 1280,
            height: 720,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Json {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw, path)
    }

    /// Loads `path` when it exists, otherwise falls back to the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
