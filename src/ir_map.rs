// src/ir_map.rs
use macroquad::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;

/// Canonical, format-agnostic map.
#[derive(Debug, Clone)]
pub struct IrMap {
    pub width: usize,
    pub height: usize,
    pub tile_w: u32,
    pub tile_h: u32,
    pub properties: Properties,
    pub tilesets: Vec<IrTileset>, // must be sorted by first_gid
    pub layers: Vec<IrLayer>,     // draw order: array order
}

/// Raw tileset geometry as declared by the map or its external descriptor.
/// Sheet vs collection is decided later by [`crate::Tileset::resolve`].
#[derive(Debug, Clone)]
pub struct IrTileset {
    pub first_gid: u32,
    pub name: String,
    /// Where the descriptor lives; relative image paths are joined onto it.
    pub base_dir: PathBuf,
    /// The descriptor file, or the map file for embedded tilesets.
    pub origin: PathBuf,
    pub tile_w: u32,
    pub tile_h: u32,
    pub tilecount: u32,
    pub columns: u32, // 0 if not declared
    pub spacing: u32, // 0 if not used
    pub margin: u32,  // 0 if not used
    pub image: Option<IrImage>,
    pub properties: Properties,
    pub tiles: Vec<IrTileMetadata>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrImage {
    pub source: String,
    pub width: u32,  // 0 if not declared
    pub height: u32, // 0 if not declared
}

#[derive(Debug, Clone)]
pub struct IrTileMetadata {
    pub id: u32,
    pub properties: Properties,
    pub image: Option<IrImage>,
    pub animation: Vec<AnimationFrame>,
}

/// One step of a tile animation. Durations are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame {
    pub tile_id: u32,
    pub duration_ms: u32,
}

#[derive(Debug, Clone)]
pub enum IrLayerKind {
    Tiles {
        width: usize,
        height: usize,
        data: Vec<u32>, // raw GIDs (including flip flags ok)
    },
    Objects {
        objects: Vec<IrObject>,
    },
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct IrLayer {
    pub name: String,
    pub visible: bool,
    pub opacity: f32,
    pub offset: Vec2, // world offset for this layer
    pub properties: Properties,
    pub kind: IrLayerKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrObjectShape {
    /// Tile-object; `(x, y)` is its bottom-left corner.
    Tile { gid: u32 },
    Point,
    Rectangle,
    Ellipse,
    Polygon(Vec<Vec2>),
    Polyline(Vec<Vec2>),
}

#[derive(Debug, Clone)]
pub struct IrObject {
    pub id: u32,
    pub name: String,
    pub class_name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub visible: bool,
    pub shape: IrObjectShape,
    pub properties: Properties,
}

impl IrObject {
    pub fn gid(&self) -> Option<u32> {
        match self.shape {
            IrObjectShape::Tile { gid } => Some(gid),
            _ => None,
        }
    }

    /// The tag used for classification: class, then type, then name.
    pub fn tag(&self) -> String {
        [self.class_name.trim(), self.name.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    I64(i64),
    F32(f32),
    String(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(HashMap<String, PropertyValue>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, value: PropertyValue) {
        self.0.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(b) => Some(*b),
            PropertyValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropertyValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get_i64(name).and_then(|v| i32::try_from(v).ok())
    }

    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            PropertyValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// Any numeric reading of the property, including numeric strings.
    pub fn get_number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            PropertyValue::I64(v) => Some(*v as f64),
            PropertyValue::F32(v) => Some(*v as f64),
            PropertyValue::String(s) => s.trim().parse().ok(),
            PropertyValue::Bool(_) => None,
        }
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(class_name: &str, name: &str) -> IrObject {
        IrObject {
            id: 1,
            name: name.to_owned(),
            class_name: class_name.to_owned(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            visible: true,
            shape: IrObjectShape::Point,
            properties: Properties::new(),
        }
    }

    #[test]
    fn tag_prefers_class_then_name() {
        assert_eq!(object(" Heart ", "ignored").tag(), "heart");
        assert_eq!(object("", "FlowerShop").tag(), "flowershop");
        assert_eq!(object("  ", "").tag(), "");
    }

    #[test]
    fn number_reads_ints_floats_and_numeric_strings() {
        let mut props = Properties::new();
        props.insert("a".into(), PropertyValue::I64(2));
        props.insert("b".into(), PropertyValue::F32(1.5));
        props.insert("c".into(), PropertyValue::String(" 4 ".into()));
        props.insert("d".into(), PropertyValue::Bool(true));
        assert_eq!(props.get_number("a"), Some(2.0));
        assert_eq!(props.get_number("b"), Some(1.5));
        assert_eq!(props.get_number("c"), Some(4.0));
        assert_eq!(props.get_number("d"), None);
        assert_eq!(props.get_number("missing"), None);
    }
}
