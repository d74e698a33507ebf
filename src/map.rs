use crate::error::MapError;
use crate::ir_map::*;
use crate::loader::json_loader::decode_map_file_to_ir;
use crate::spatial::TileId;
use crate::tileset::{Tileset, TilesetTable};
use macroquad::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// A fully resolved map: layers in draw order plus tilesets ready for gid
/// lookup. No GPU state lives here, textures are loaded separately by
/// [`crate::TextureStore`].
#[derive(Debug, Clone)]
pub struct Map {
    pub width: usize,
    pub height: usize,
    pub tile_w: u32,
    pub tile_h: u32,
    pub properties: Properties,
    pub layers: Vec<IrLayer>,
    pub tilesets: TilesetTable,
    pub base_dir: PathBuf,
}

/// Borrowed view of one object layer.
#[derive(Debug, Clone, Copy)]
pub struct ObjectLayer<'m> {
    pub name: &'m str,
    pub visible: bool,
    pub offset: Vec2,
    pub objects: &'m [IrObject],
}

/// Borrowed view of one tile layer.
#[derive(Debug, Clone, Copy)]
pub struct TileLayer<'m> {
    pub name: &'m str,
    pub visible: bool,
    pub opacity: f32,
    pub offset: Vec2,
    pub width: usize,
    pub height: usize,
    pub data: &'m [u32],
}

impl TileLayer<'_> {
    pub fn gid_at(&self, x: usize, y: usize) -> TileId {
        if x >= self.width || y >= self.height {
            return TileId::EMPTY;
        }
        TileId(self.data[y * self.width + x])
    }
}

impl Map {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let (ir, base) = decode_map_file_to_ir(path.as_ref())?;
        Self::from_ir(ir, &base)
    }

    pub fn from_ir(ir: IrMap, base_dir: &Path) -> Result<Self, MapError> {
        if ir.width == 0 || ir.height == 0 {
            return Err(MapError::InvalidMap("map dimensions must be non-zero".into()));
        }
        if ir.tile_w == 0 || ir.tile_h == 0 {
            return Err(MapError::InvalidMap("tile size must be non-zero".into()));
        }

        let tilesets = ir
            .tilesets
            .into_iter()
            .map(Tileset::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        let tilesets = TilesetTable::new(tilesets);

        validate_gids(&ir.layers, &tilesets)?;

        info!(
            width = ir.width,
            height = ir.height,
            layers = ir.layers.len(),
            tilesets = tilesets.len(),
            "map_resolved"
        );

        Ok(Self {
            width: ir.width,
            height: ir.height,
            tile_w: ir.tile_w,
            tile_h: ir.tile_h,
            properties: ir.properties,
            layers: ir.layers,
            tilesets,
            base_dir: base_dir.to_path_buf(),
        })
    }

    #[inline]
    pub fn tile_size(&self) -> Vec2 {
        vec2(self.tile_w as f32, self.tile_h as f32)
    }

    pub fn pixel_size(&self) -> Vec2 {
        vec2(
            self.width as f32 * self.tile_w as f32,
            self.height as f32 * self.tile_h as f32,
        )
    }

    #[inline]
    pub fn ts_for_gid(&self, gid: TileId) -> Option<(&Tileset, u32)> {
        self.tilesets.ts_for_gid(gid)
    }

    pub fn tile_layers(&self) -> impl Iterator<Item = TileLayer<'_>> {
        self.layers.iter().filter_map(|l| match &l.kind {
            IrLayerKind::Tiles {
                width,
                height,
                data,
            } => Some(TileLayer {
                name: &l.name,
                visible: l.visible,
                opacity: l.opacity,
                offset: l.offset,
                width: *width,
                height: *height,
                data,
            }),
            _ => None,
        })
    }

    pub fn object_layers(&self) -> impl Iterator<Item = ObjectLayer<'_>> {
        self.layers.iter().filter_map(|l| match &l.kind {
            IrLayerKind::Objects { objects } => Some(ObjectLayer {
                name: &l.name,
                visible: l.visible,
                offset: l.offset,
                objects,
            }),
            _ => None,
        })
    }

    pub fn object_layer(&self, name: &str) -> Option<ObjectLayer<'_>> {
        self.object_layers().find(|l| l.name == name)
    }

    pub fn objects(&self) -> impl Iterator<Item = &IrObject> {
        self.object_layers().flat_map(|l| l.objects.iter())
    }
}

fn validate_gids(layers: &[IrLayer], tilesets: &TilesetTable) -> Result<(), MapError> {
    let max_gid = tilesets.max_gid();
    let owns = |gid: TileId| {
        tilesets
            .ts_for_gid(gid)
            .is_some_and(|(ts, local)| local < ts.id_span())
    };

    for layer in layers {
        match &layer.kind {
            IrLayerKind::Tiles { data, .. } => {
                for &raw in data {
                    let gid = TileId(raw);
                    if !gid.is_empty() && !owns(gid) {
                        return Err(MapError::InvalidTileGid {
                            layer: layer.name.clone(),
                            gid: gid.clean(),
                            max_gid,
                        });
                    }
                }
            }
            IrLayerKind::Objects { objects } => {
                for obj in objects {
                    if let Some(raw) = obj.gid() {
                        let gid = TileId(raw);
                        if gid.is_empty() || !owns(gid) {
                            return Err(MapError::InvalidObjectGid {
                                layer: layer.name.clone(),
                                object_id: obj.id,
                                gid: gid.clean(),
                                max_gid,
                            });
                        }
                    }
                }
            }
            IrLayerKind::Unsupported => {}
        }
    }
    Ok(())
}
