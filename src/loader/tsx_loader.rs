// src/loader/tsx_loader.rs
use crate::error::MapError;
use crate::ir_map::*;
use roxmltree::{Document, Node};
use std::path::{Path, PathBuf};
use std::str::FromStr;

fn attr<T: FromStr>(node: Node, name: &str, path: &Path) -> Result<Option<T>, MapError> {
    match node.attribute(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            MapError::malformed(
                path,
                format!("<{}> attribute {name}=\"{raw}\" is not a valid number", node.tag_name().name()),
            )
        }),
    }
}

fn required_attr<T: FromStr>(node: Node, name: &str, path: &Path) -> Result<T, MapError> {
    attr(node, name, path)?.ok_or_else(|| {
        MapError::malformed(
            path,
            format!("<{}> is missing required attribute {name}", node.tag_name().name()),
        )
    })
}

fn child<'a, 'i>(node: Node<'a, 'i>, tag: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|c| c.has_tag_name(tag))
}

fn image_from_xml(node: Node, path: &Path) -> Result<Option<IrImage>, MapError> {
    let Some(img) = child(node, "image") else {
        return Ok(None);
    };
    let Some(source) = img.attribute("source").filter(|s| !s.is_empty()) else {
        return Err(MapError::malformed(path, "<image> has no source"));
    };
    Ok(Some(IrImage {
        source: source.to_owned(),
        width: attr(img, "width", path)?.unwrap_or(0),
        height: attr(img, "height", path)?.unwrap_or(0),
    }))
}

fn property_from_xml(node: Node, path: &Path) -> Result<Option<(String, PropertyValue)>, MapError> {
    let name = required_attr::<String>(node, "name", path)?;
    let raw = node
        .attribute("value")
        .or_else(|| node.text())
        .unwrap_or_default()
        .to_owned();
    let invalid = |kind: &str| {
        MapError::malformed(path, format!("property '{name}' is not a valid {kind}: {raw}"))
    };

    let value = match node.attribute("type").unwrap_or("string") {
        "bool" => PropertyValue::Bool(raw.trim() == "true"),
        "int" | "object" => PropertyValue::I64(raw.trim().parse().map_err(|_| invalid("int"))?),
        "float" => PropertyValue::F32(raw.trim().parse().map_err(|_| invalid("float"))?),
        "string" | "file" | "color" => PropertyValue::String(raw),
        // Class-typed properties nest further <properties>; nothing here reads them.
        "class" => return Ok(None),
        other => {
            return Err(MapError::UnsupportedPropertyType {
                name,
                kind: other.to_owned(),
            })
        }
    };
    Ok(Some((name, value)))
}

fn properties_from_xml(node: Node, path: &Path) -> Result<Properties, MapError> {
    let mut out = Properties::new();
    if let Some(props) = child(node, "properties") {
        for p in props.children().filter(|c| c.has_tag_name("property")) {
            if let Some((name, value)) = property_from_xml(p, path)? {
                out.insert(name, value);
            }
        }
    }
    Ok(out)
}

fn animation_from_xml(node: Node, path: &Path) -> Result<Vec<AnimationFrame>, MapError> {
    let Some(anim) = child(node, "animation") else {
        return Ok(Vec::new());
    };
    anim.children()
        .filter(|c| c.has_tag_name("frame"))
        .map(|frame| -> Result<AnimationFrame, MapError> {
            Ok(AnimationFrame {
                tile_id: required_attr(frame, "tileid", path)?,
                duration_ms: required_attr(frame, "duration", path)?,
            })
        })
        .collect()
}

/// Parses a Tiled `.tsx` descriptor. `path` is the descriptor's own
/// location; relative image sources inside it resolve against its directory.
pub fn parse_tsx(raw: &str, path: &Path, first_gid: u32) -> Result<IrTileset, MapError> {
    let doc = Document::parse(raw).map_err(|source| MapError::Xml {
        path: path.to_path_buf(),
        source,
    })?;

    let root = doc.root_element();
    let ts = if root.has_tag_name("tileset") {
        root
    } else {
        root.descendants()
            .find(|n| n.has_tag_name("tileset"))
            .ok_or_else(|| MapError::malformed(path, "no <tileset> element"))?
    };

    let tiles = ts
        .children()
        .filter(|c| c.has_tag_name("tile"))
        .map(|tile| -> Result<IrTileMetadata, MapError> {
            Ok(IrTileMetadata {
                id: required_attr(tile, "id", path)?,
                properties: properties_from_xml(tile, path)?,
                image: image_from_xml(tile, path)?,
                animation: animation_from_xml(tile, path)?,
            })
        })
        .collect::<Result<Vec<_>, MapError>>()?;

    Ok(IrTileset {
        first_gid,
        name: ts.attribute("name").unwrap_or_default().to_owned(),
        base_dir: path
            .parent()
            .map(|d| d.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./")),
        origin: path.to_path_buf(),
        tile_w: required_attr(ts, "tilewidth", path)?,
        tile_h: required_attr(ts, "tileheight", path)?,
        tilecount: attr(ts, "tilecount", path)?.unwrap_or(0),
        columns: attr(ts, "columns", path)?.unwrap_or(0),
        spacing: attr(ts, "spacing", path)?.unwrap_or(0),
        margin: attr(ts, "margin", path)?.unwrap_or(0),
        image: image_from_xml(ts, path)?,
        properties: properties_from_xml(ts, path)?,
        tiles,
    })
}
