use super::command::{SpriteKind, TileSource};
use crate::config::SpritePaths;
use crate::error::MapError;
use crate::map::Map;
use crate::tileset::TilesetKind;
use macroquad::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Every texture a frame can ask for, loaded up front. A missing or
/// undecodable image fails the whole load.
#[derive(Default)]
pub struct TextureStore {
    sheets: HashMap<usize, Texture2D>,
    images: HashMap<(usize, u32), Texture2D>,
    sprites: HashMap<SpriteKind, Texture2D>,
}

impl TextureStore {
    pub async fn load(map: &Map, sprites: &SpritePaths) -> Result<Self, MapError> {
        let mut cache = TextureCache::default();
        let mut store = TextureStore::default();

        for (i, ts) in map.tilesets.iter().enumerate() {
            match &ts.kind {
                TilesetKind::Sheet { image, .. } => {
                    store.sheets.insert(i, cache.get(image).await?);
                }
                TilesetKind::Collection { images } => {
                    for (&local, img) in images {
                        store.images.insert((i, local), cache.get(&img.path).await?);
                    }
                }
            }
        }

        let sprite_paths = [
            (SpriteKind::PlayerUp, &sprites.player_up),
            (SpriteKind::PlayerDown, &sprites.player_down),
            (SpriteKind::PlayerLeft, &sprites.player_left),
            (SpriteKind::PlayerRight, &sprites.player_right),
            (SpriteKind::Npc, &sprites.npc),
            (SpriteKind::Heart, &sprites.heart),
            (SpriteKind::Flower, &sprites.flower),
        ];
        for (kind, path) in sprite_paths {
            store.sprites.insert(kind, cache.get(path).await?);
        }

        info!(
            sheets = store.sheets.len(),
            tile_images = store.images.len(),
            files = cache.loaded.len(),
            "textures_loaded"
        );
        Ok(store)
    }

    pub fn tile(&self, source: TileSource) -> Option<&Texture2D> {
        match source {
            TileSource::Sheet { tileset } => self.sheets.get(&tileset),
            TileSource::Image { tileset, local } => self.images.get(&(tileset, local)),
        }
    }

    pub fn sprite(&self, kind: SpriteKind) -> Option<&Texture2D> {
        self.sprites.get(&kind)
    }
}

/// Loads each file once even when several tiles or sprites share it.
#[derive(Default)]
struct TextureCache {
    loaded: HashMap<PathBuf, Texture2D>,
}

impl TextureCache {
    async fn get(&mut self, path: &Path) -> Result<Texture2D, MapError> {
        if let Some(tex) = self.loaded.get(path) {
            return Ok(tex.clone());
        }
        let tex = load_one(path).await?;
        self.loaded.insert(path.to_path_buf(), tex.clone());
        Ok(tex)
    }
}

async fn load_one(path: &Path) -> Result<Texture2D, MapError> {
    let texture_error = |message: String| MapError::Texture {
        path: path.to_path_buf(),
        message,
    };
    let name = path
        .to_str()
        .ok_or_else(|| texture_error("path is not valid UTF-8".into()))?;
    let tex = load_texture(name)
        .await
        .map_err(|e| texture_error(e.to_string()))?;
    tex.set_filter(FilterMode::Nearest);
    Ok(tex)
}
