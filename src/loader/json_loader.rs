// src/loader/json_loader.rs
use crate::error::MapError;
use crate::ir_map::*;
use crate::loader::tsx_loader::parse_tsx;
use macroquad::prelude::*;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: Vec<u32>,
    #[serde(default)]
    width: usize,
    #[serde(default)]
    height: usize,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default = "one")]
    opacity: f32,
    #[serde(default)]
    offsetx: f32,
    #[serde(default)]
    offsety: f32,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" when absent
    #[serde(default)]
    properties: Vec<JsonProperty>,
    #[serde(default)]
    objects: Vec<JsonObject>,
}

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}

#[derive(Deserialize)]
struct JsonTilesetRef {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    inline: JsonTileset,
}

#[derive(Deserialize)]
struct JsonMap {
    width: usize,
    height: usize,
    tilewidth: u32,
    tileheight: u32,
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

/// Shared by embedded tilesets and external `.json`/`.tsj` descriptors.
#[derive(Deserialize, Default)]
struct JsonTileset {
    #[serde(default)]
    name: String,
    #[serde(default)]
    tilewidth: u32,
    #[serde(default)]
    tileheight: u32,
    #[serde(default)]
    tilecount: u32,
    #[serde(default)]
    columns: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    imagewidth: u32,
    #[serde(default)]
    imageheight: u32,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    properties: Vec<JsonProperty>,
    #[serde(default)]
    tiles: Vec<JsonTile>,
}

#[derive(Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    value: JsonValue,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    rotation: f32,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    point: bool,
    #[serde(default)]
    ellipse: bool,
    #[serde(default)]
    polygon: Vec<JsonObjectPoint>,
    #[serde(default)]
    polyline: Vec<JsonObjectPoint>,
    #[serde(default)]
    gid: Option<u32>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonObjectPoint {
    x: f32,
    y: f32,
}

#[derive(Deserialize)]
struct JsonTile {
    id: u32,
    #[serde(default)]
    properties: Vec<JsonProperty>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    imagewidth: u32,
    #[serde(default)]
    imageheight: u32,
    #[serde(default)]
    animation: Vec<JsonFrame>,
}

#[derive(Deserialize)]
struct JsonFrame {
    tileid: u32,
    duration: u32,
}

fn json_property_to_ir(prop: JsonProperty) -> Result<Option<(String, PropertyValue)>, MapError> {
    let JsonProperty { name, kind, value } = prop;

    let parsed = match kind.as_deref() {
        Some("bool") => value.as_bool().map(PropertyValue::Bool),
        Some("int") | Some("object") => value.as_i64().map(PropertyValue::I64),
        Some("float") => value.as_f64().map(|n| PropertyValue::F32(n as f32)),
        Some("string") | Some("file") | Some("color") | Some("class") => {
            value.as_str().map(|s| PropertyValue::String(s.to_owned()))
        }
        Some(other) => {
            return Err(MapError::UnsupportedPropertyType {
                name,
                kind: other.to_owned(),
            });
        }
        None => {
            if let Some(v) = value.as_bool() {
                Some(PropertyValue::Bool(v))
            } else if let Some(v) = value.as_i64() {
                Some(PropertyValue::I64(v))
            } else if let Some(v) = value.as_f64() {
                Some(PropertyValue::F32(v as f32))
            } else {
                value.as_str().map(|s| PropertyValue::String(s.to_owned()))
            }
        }
    };

    Ok(parsed.map(|value| (name, value)))
}

fn properties_from_json(props: Vec<JsonProperty>) -> Result<Properties, MapError> {
    let mut out = Properties::new();
    for p in props {
        if let Some((name, value)) = json_property_to_ir(p)? {
            out.insert(name, value);
        }
    }
    Ok(out)
}

fn object_to_ir(obj: JsonObject) -> Result<IrObject, MapError> {
    let shape = if let Some(gid) = obj.gid {
        IrObjectShape::Tile { gid }
    } else if obj.point {
        IrObjectShape::Point
    } else if obj.ellipse {
        IrObjectShape::Ellipse
    } else if !obj.polygon.is_empty() {
        IrObjectShape::Polygon(obj.polygon.into_iter().map(|p| vec2(p.x, p.y)).collect())
    } else if !obj.polyline.is_empty() {
        IrObjectShape::Polyline(obj.polyline.into_iter().map(|p| vec2(p.x, p.y)).collect())
    } else {
        IrObjectShape::Rectangle
    };

    let class_name = if !obj.class.is_empty() {
        obj.class
    } else {
        obj.kind
    };

    Ok(IrObject {
        id: obj.id,
        name: obj.name,
        class_name,
        x: obj.x,
        y: obj.y,
        width: obj.width,
        height: obj.height,
        rotation: obj.rotation,
        visible: obj.visible,
        shape,
        properties: properties_from_json(obj.properties)?,
    })
}

fn image_from_json(source: Option<String>, width: u32, height: u32) -> Option<IrImage> {
    source
        .filter(|s| !s.is_empty())
        .map(|source| IrImage { source, width, height })
}

fn tileset_to_ir(
    ts: JsonTileset,
    first_gid: u32,
    base_dir: &Path,
    origin: &Path,
) -> Result<IrTileset, MapError> {
    let tiles = ts
        .tiles
        .into_iter()
        .map(|tile| -> Result<IrTileMetadata, MapError> {
            Ok(IrTileMetadata {
                id: tile.id,
                properties: properties_from_json(tile.properties)?,
                image: image_from_json(tile.image, tile.imagewidth, tile.imageheight),
                animation: tile
                    .animation
                    .into_iter()
                    .map(|f| AnimationFrame {
                        tile_id: f.tileid,
                        duration_ms: f.duration,
                    })
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IrTileset {
        first_gid,
        name: ts.name,
        base_dir: base_dir.to_path_buf(),
        origin: origin.to_path_buf(),
        tile_w: ts.tilewidth,
        tile_h: ts.tileheight,
        tilecount: ts.tilecount,
        columns: ts.columns,
        spacing: ts.spacing,
        margin: ts.margin,
        image: image_from_json(ts.image, ts.imagewidth, ts.imageheight),
        properties: properties_from_json(ts.properties)?,
        tiles,
    })
}

fn read_text(path: &Path) -> Result<String, MapError> {
    std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"))
}

fn load_external_tileset(
    source: &str,
    first_gid: u32,
    map_dir: &Path,
) -> Result<IrTileset, MapError> {
    let ts_path = map_dir.join(source);
    let ext = ts_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let ts_dir = parent_dir(&ts_path);

    match ext.as_deref() {
        Some("tsx") | Some("xml") => {
            let raw = read_text(&ts_path)?;
            parse_tsx(&raw, &ts_path, first_gid)
        }
        Some("json") | Some("tsj") => {
            let raw = read_text(&ts_path)?;
            let ext: JsonTileset =
                serde_json::from_str(&raw).map_err(|source| MapError::Json {
                    path: ts_path.clone(),
                    source,
                })?;
            tileset_to_ir(ext, first_gid, &ts_dir, &ts_path)
        }
        _ => Err(MapError::InvalidMap(format!(
            "External tileset must be .tsx or .json: {source}"
        ))),
    }
}

/// Reads a Tiled JSON map plus every external tileset it references.
/// Images are not touched here; their paths stay relative to each
/// tileset's `base_dir`.
pub fn decode_map_file_to_ir(path: impl AsRef<Path>) -> Result<(IrMap, PathBuf), MapError> {
    let p = path.as_ref();
    let ext = p.extension().and_then(|e| e.to_str());
    if !matches!(ext, Some("json") | Some("tmj")) {
        return Err(MapError::InvalidMap(format!(
            "Map file must be a JSON file: {}",
            p.display()
        )));
    }

    let txt = read_text(p)?;
    let j: JsonMap = serde_json::from_str(&txt).map_err(|source| MapError::Json {
        path: p.to_path_buf(),
        source,
    })?;

    let map_dir = parent_dir(p);

    // Build IR tilesets
    let mut ir_tilesets = Vec::with_capacity(j.tilesets.len());
    for ts in j.tilesets {
        let ir = match ts.source.as_deref() {
            Some(source) => load_external_tileset(source, ts.firstgid, &map_dir)?,
            None => tileset_to_ir(ts.inline, ts.firstgid, &map_dir, p)?,
        };
        debug!(first_gid = ir.first_gid, name = %ir.name, "tileset_decoded");
        ir_tilesets.push(ir);
    }

    // Sort by first_gid so gid lookup can binary search
    ir_tilesets.sort_by_key(|t| t.first_gid);

    // Build IR layers
    let mut ir_layers = Vec::with_capacity(j.layers.len());
    for l in j.layers {
        let properties = properties_from_json(l.properties)?;
        let layer_kind = match l.kind.as_deref().unwrap_or("tilelayer") {
            "tilelayer" => {
                let width = if l.width == 0 { j.width } else { l.width };
                let height = if l.height == 0 { j.height } else { l.height };
                if l.data.len() != width * height {
                    return Err(MapError::InvalidLayerSize {
                        layer: l.name,
                        expected: width * height,
                        actual: l.data.len(),
                    });
                }
                IrLayerKind::Tiles {
                    width,
                    height,
                    data: l.data,
                }
            }
            "objectgroup" => IrLayerKind::Objects {
                objects: l
                    .objects
                    .into_iter()
                    .map(object_to_ir)
                    .collect::<Result<Vec<_>, _>>()?,
            },
            _ => IrLayerKind::Unsupported,
        };
        ir_layers.push(IrLayer {
            name: l.name,
            visible: l.visible,
            opacity: l.opacity,
            offset: vec2(l.offsetx, l.offsety),
            properties,
            kind: layer_kind,
        });
    }

    Ok((
        IrMap {
            width: j.width,
            height: j.height,
            tile_w: j.tilewidth,
            tile_h: j.tileheight,
            properties: properties_from_json(j.properties)?,
            tilesets: ir_tilesets,
            layers: ir_layers,
        },
        map_dir,
    ))
}
