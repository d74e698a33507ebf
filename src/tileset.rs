//! Resolved tilesets: sheet vs collection classification, per-tile metadata,
//! gid lookup and animated-frame selection.

use crate::error::MapError;
use crate::ir_map::{AnimationFrame, IrImage, IrTileset, Properties};
use crate::spatial::TileId;
use macroquad::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Pixel source of a tileset.
#[derive(Debug, Clone, PartialEq)]
pub enum TilesetKind {
    /// One shared image sliced on a fixed grid.
    Sheet {
        image: PathBuf,
        columns: u32,
        tile_count: u32,
        spacing: u32,
        margin: u32,
    },
    /// Every tile id has its own image.
    Collection { images: BTreeMap<u32, TileImage> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default)]
pub struct TileMeta {
    pub collides: bool,
    pub animation: Vec<AnimationFrame>,
    pub properties: Properties,
}

#[derive(Debug, Clone)]
pub struct Tileset {
    pub name: String,
    pub first_gid: u32,
    pub tile_w: u32,
    pub tile_h: u32,
    pub kind: TilesetKind,
    tiles: HashMap<u32, TileMeta>,
}

/// `floor((image_w - 2*margin + spacing) / (tile_w + spacing))`, never negative.
pub fn computed_columns(image_w: u32, tile_w: u32, spacing: u32, margin: u32) -> u32 {
    let step = tile_w as i64 + spacing as i64;
    if image_w == 0 || step <= 0 {
        return 0;
    }
    let usable = image_w as i64 - 2 * margin as i64 + spacing as i64;
    (usable / step).max(0) as u32
}

fn image_path(base_dir: &Path, img: &IrImage) -> PathBuf {
    base_dir.join(&img.source)
}

impl Tileset {
    pub fn resolve(ir: IrTileset) -> Result<Self, MapError> {
        if ir.tile_w == 0 || ir.tile_h == 0 {
            return Err(MapError::malformed(&ir.origin, "tile width and height must be non-zero"));
        }

        let columns = if ir.columns > 0 {
            ir.columns
        } else {
            ir.image
                .as_ref()
                .map(|img| computed_columns(img.width, ir.tile_w, ir.spacing, ir.margin))
                .unwrap_or(0)
        };

        let has_tile_images = ir.tiles.iter().any(|t| t.image.is_some());

        let kind = if columns == 0 && has_tile_images {
            let images = ir
                .tiles
                .iter()
                .filter_map(|t| {
                    t.image.as_ref().map(|img| {
                        (
                            t.id,
                            TileImage {
                                path: image_path(&ir.base_dir, img),
                                width: if img.width > 0 { img.width } else { ir.tile_w },
                                height: if img.height > 0 { img.height } else { ir.tile_h },
                            },
                        )
                    })
                })
                .collect();
            TilesetKind::Collection { images }
        } else {
            let Some(img) = ir.image.as_ref() else {
                return Err(MapError::malformed(&ir.origin, "sheet tileset has no <image>"));
            };
            if columns == 0 {
                return Err(MapError::malformed(
                    &ir.origin,
                    "sheet tileset declares no columns and its image width is unknown",
                ));
            }
            let rows = computed_columns(img.height, ir.tile_h, ir.spacing, ir.margin);
            let capacity = if rows > 0 { Some(columns * rows) } else { None };
            let tile_count = match (ir.tilecount, capacity) {
                (0, Some(cap)) => cap,
                (declared, Some(cap)) => declared.min(cap),
                (declared, None) => declared,
            };
            TilesetKind::Sheet {
                image: image_path(&ir.base_dir, img),
                columns,
                tile_count,
                spacing: ir.spacing,
                margin: ir.margin,
            }
        };

        let tiles = ir
            .tiles
            .into_iter()
            .map(|t| {
                let meta = TileMeta {
                    collides: t.properties.get_bool("collides").unwrap_or(false),
                    animation: t.animation,
                    properties: t.properties,
                };
                (t.id, meta)
            })
            .collect();

        let tileset = Tileset {
            name: ir.name,
            first_gid: ir.first_gid,
            tile_w: ir.tile_w,
            tile_h: ir.tile_h,
            kind,
            tiles,
        };
        tileset.check_animation_frames(&ir.origin)?;
        Ok(tileset)
    }

    /// Every frame must name a tile this tileset owns.
    fn check_animation_frames(&self, origin: &Path) -> Result<(), MapError> {
        let span = self.id_span();
        for (id, meta) in &self.tiles {
            if let Some(frame) = meta.animation.iter().find(|f| f.tile_id >= span) {
                return Err(MapError::malformed(
                    origin,
                    format!(
                        "animation of tile {id} uses tile {} but the tileset has {span} tiles",
                        frame.tile_id
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, TilesetKind::Collection { .. })
    }

    /// Number of local ids this tileset owns, counting from 0.
    pub fn id_span(&self) -> u32 {
        let declared = match &self.kind {
            TilesetKind::Sheet { tile_count, .. } => *tile_count,
            TilesetKind::Collection { images } => images.keys().next_back().map_or(0, |k| k + 1),
        };
        let meta = self.tiles.keys().max().map_or(0, |k| k + 1);
        declared.max(meta)
    }

    pub fn last_gid(&self) -> u32 {
        self.first_gid + self.id_span().saturating_sub(1)
    }

    pub fn tile(&self, local: u32) -> Option<&TileMeta> {
        self.tiles.get(&local)
    }

    pub fn collides(&self, local: u32) -> bool {
        self.tile(local).is_some_and(|t| t.collides)
    }

    pub fn animation(&self, local: u32) -> Option<&[AnimationFrame]> {
        self.tile(local)
            .map(|t| t.animation.as_slice())
            .filter(|a| !a.is_empty())
    }

    /// Source rectangle inside the sheet image. `None` for collection
    /// tilesets and for ids past the end of the sheet.
    pub fn source_rect(&self, local: u32) -> Option<Rect> {
        let TilesetKind::Sheet {
            columns,
            tile_count,
            spacing,
            margin,
            ..
        } = &self.kind
        else {
            return None;
        };
        if *columns == 0 || local >= *tile_count {
            return None;
        }
        let col = local % columns;
        let row = local / columns;
        let sx = margin + col * (self.tile_w + spacing);
        let sy = margin + row * (self.tile_h + spacing);
        Some(Rect::new(
            sx as f32,
            sy as f32,
            self.tile_w as f32,
            self.tile_h as f32,
        ))
    }

    pub fn tile_image(&self, local: u32) -> Option<&TileImage> {
        match &self.kind {
            TilesetKind::Collection { images } => images.get(&local),
            TilesetKind::Sheet { .. } => None,
        }
    }

    /// Local id to display for `local` at `elapsed_ms` since the engine
    /// started. Unanimated tiles, and animations whose total duration is 0,
    /// resolve to themselves.
    pub fn animated_local(&self, local: u32, elapsed_ms: u64) -> u32 {
        let Some(frames) = self.animation(local) else {
            return local;
        };
        let total: u64 = frames.iter().map(|f| f.duration_ms as u64).sum();
        if total == 0 {
            return local;
        }
        let t = elapsed_ms % total;
        let mut acc = 0u64;
        for frame in frames {
            acc += frame.duration_ms as u64;
            if t < acc {
                return frame.tile_id;
            }
        }
        local
    }
}

/// All tilesets of a map, ordered by `first_gid`.
#[derive(Debug, Clone, Default)]
pub struct TilesetTable {
    tilesets: Vec<Tileset>,
}

impl TilesetTable {
    pub fn new(mut tilesets: Vec<Tileset>) -> Self {
        tilesets.sort_by_key(|t| t.first_gid);
        TilesetTable { tilesets }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tileset> {
        self.tilesets.iter()
    }

    pub fn len(&self) -> usize {
        self.tilesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tilesets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tileset> {
        self.tilesets.get(index)
    }

    pub fn max_gid(&self) -> u32 {
        self.tilesets.iter().map(Tileset::last_gid).max().unwrap_or(0)
    }

    /// Index of the tileset owning `gid` (flags stripped) and the local id.
    #[inline]
    pub fn index_for_gid(&self, gid: TileId) -> Option<(usize, u32)> {
        let clean = gid.clean();
        if clean == 0 {
            return None;
        }
        let idx = self.tilesets.partition_point(|t| t.first_gid <= clean);
        let idx = idx.checked_sub(1)?;
        Some((idx, clean - self.tilesets[idx].first_gid))
    }

    #[inline]
    pub fn ts_for_gid(&self, gid: TileId) -> Option<(&Tileset, u32)> {
        self.index_for_gid(gid)
            .map(|(idx, local)| (&self.tilesets[idx], local))
    }

    pub fn collides(&self, gid: TileId) -> bool {
        self.ts_for_gid(gid).is_some_and(|(ts, local)| ts.collides(local))
    }

    /// Gid actually shown for `gid` at `elapsed_ms`, flags stripped.
    pub fn animated_gid(&self, gid: TileId, elapsed_ms: u64) -> TileId {
        match self.ts_for_gid(gid) {
            Some((ts, local)) => TileId(ts.first_gid + ts.animated_local(local, elapsed_ms)),
            None => gid.stripped(),
        }
    }
}
