//! Turns the placed objects of the designated object layer into game
//! entities. This is the only place free-form class tags are looked at, and
//! the only place the three Tiled placement conventions are distinguished.

use crate::ir_map::{IrObject, IrObjectShape};
use crate::map::Map;
use crate::spatial::TileCoord;
use macroquad::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info};

const DEFAULT_NPC_DIALOG: &str = "Hi... I'd love a flower";
const DEFAULT_NPC_SUCCESS: &str = "OMG thank you!";
const DEFAULT_SHOP_DIALOG: &str = "Bring me more hearts";
const DEFAULT_SHOP_SUCCESS: &str = "You bought a flower";
const DEFAULT_SHOP_COST: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    Player,
    Heart,
    Npc,
    Shop,
}

impl EntityClass {
    /// Maps an already lowercased tag. Unknown tags are decorations.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "player" | "pookgirl" => Some(EntityClass::Player),
            "heart" => Some(EntityClass::Heart),
            "npc" | "pookboy" => Some(EntityClass::Npc),
            "shop" | "flowershop" => Some(EntityClass::Shop),
            _ => None,
        }
    }

    pub fn of(obj: &IrObject) -> Option<Self> {
        Self::from_tag(&obj.tag())
    }
}

/// Where an object sits once its placement convention is normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Anchor cell: the cell under the object's base.
    pub cell: TileCoord,
    /// Interaction area in map pixels, for rectangle and point objects.
    pub area: Option<Rect>,
}

impl Placement {
    /// `layer_offset` is the owning layer's pixel offset, so entities land
    /// where the layer is drawn.
    pub fn of(obj: &IrObject, layer_offset: Vec2, tile_size: Vec2) -> Self {
        let (tw, th) = (tile_size.x, tile_size.y);
        let (x, y) = (obj.x + layer_offset.x, obj.y + layer_offset.y);
        let has_rect = obj.width > 0.0 && obj.height > 0.0;
        match obj.shape {
            // (x, y) is the bottom-left corner
            IrObjectShape::Tile { .. } => Placement {
                cell: TileCoord::new((x / tw).floor() as i32, ((y - 1.0) / th).floor() as i32),
                area: None,
            },
            // (x, y) is the top-left corner
            _ if has_rect => Placement {
                cell: TileCoord::new(
                    ((x + obj.width / 2.0) / tw).floor() as i32,
                    ((y + obj.height - 1.0) / th).floor() as i32,
                ),
                area: Some(Rect::new(x, y, obj.width, obj.height)),
            },
            _ => Placement {
                cell: TileCoord::new((x / tw).floor() as i32, ((y - 1.0) / th).floor() as i32),
                area: Some(Rect::new(x - tw, y - th * 2.0, tw * 2.0, th * 2.0)),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Npc {
    pub cell: TileCoord,
    pub area: Option<Rect>,
    pub dialog: String,
    pub success_dialog: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shop {
    pub cell: TileCoord,
    pub area: Option<Rect>,
    pub cost: u32,
    pub dialog: String,
    pub success_dialog: String,
}

/// Everything the extractor found on the object layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entities {
    pub spawn: TileCoord,
    pub hearts: BTreeMap<TileCoord, u32>,
    pub npc: Option<Npc>,
    pub shop: Option<Shop>,
}

fn string_prop(obj: &IrObject, name: &str, default: &str) -> String {
    obj.properties
        .get_string(name)
        .unwrap_or(default)
        .to_owned()
}

fn count_prop(obj: &IrObject, name: &str, default: u32) -> u32 {
    obj.properties
        .get_number(name)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map_or(default, |n| n as u32)
}

impl Entities {
    pub fn extract(map: &Map, layer_name: &str) -> Self {
        let mut out = Entities::default();
        let Some(layer) = map.object_layer(layer_name) else {
            info!(layer = layer_name, "object_layer_missing");
            return out;
        };

        let tile_size = map.tile_size();
        for obj in layer.objects {
            let Some(class) = EntityClass::of(obj) else {
                continue;
            };
            let placement = Placement::of(obj, layer.offset, tile_size);

            match class {
                EntityClass::Player => out.spawn = placement.cell,
                EntityClass::Heart => {
                    out.hearts.insert(placement.cell, count_prop(obj, "value", 1));
                }
                EntityClass::Npc => {
                    out.npc = Some(Npc {
                        cell: placement.cell,
                        area: placement.area,
                        dialog: string_prop(obj, "dialog", DEFAULT_NPC_DIALOG),
                        success_dialog: string_prop(obj, "successDialog", DEFAULT_NPC_SUCCESS),
                    });
                }
                EntityClass::Shop => {
                    out.shop = Some(Shop {
                        cell: placement.cell,
                        area: placement.area,
                        cost: count_prop(obj, "cost", DEFAULT_SHOP_COST),
                        dialog: string_prop(obj, "dialog", DEFAULT_SHOP_DIALOG),
                        success_dialog: string_prop(obj, "successDialog", DEFAULT_SHOP_SUCCESS),
                    });
                }
            }
        }

        debug!(npc = ?out.npc, shop = ?out.shop, "interactables_extracted");
        info!(
            spawn_x = out.spawn.x,
            spawn_y = out.spawn.y,
            hearts = out.hearts.len(),
            "entities_extracted"
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir_map::{Properties, PropertyValue};

    const TS: Vec2 = Vec2::new(16.0, 16.0);

    fn obj(shape: IrObjectShape, x: f32, y: f32, w: f32, h: f32) -> IrObject {
        IrObject {
            id: 1,
            name: String::new(),
            class_name: String::new(),
            x,
            y,
            width: w,
            height: h,
            rotation: 0.0,
            visible: true,
            shape,
            properties: Properties::new(),
        }
    }

    #[test]
    fn classes_are_case_insensitive_and_closed() {
        let mut o = obj(IrObjectShape::Point, 0.0, 0.0, 0.0, 0.0);
        o.class_name = "FlowerShop".into();
        assert_eq!(EntityClass::of(&o), Some(EntityClass::Shop));
        o.class_name = "PookGirl".into();
        assert_eq!(EntityClass::of(&o), Some(EntityClass::Player));
        o.class_name = String::new();
        o.name = "Heart".into();
        assert_eq!(EntityClass::of(&o), Some(EntityClass::Heart));
        o.name = "tree".into();
        assert_eq!(EntityClass::of(&o), None);
    }

    #[test]
    fn tile_object_anchors_on_bottom_left() {
        let p = Placement::of(&obj(IrObjectShape::Tile { gid: 1 }, 48.0, 64.0, 16.0, 16.0), Vec2::ZERO, TS);
        assert_eq!(p.cell, TileCoord::new(3, 3));
        assert_eq!(p.area, None);

        // a base exactly on a cell boundary still belongs to the cell above it
        let p = Placement::of(&obj(IrObjectShape::Tile { gid: 1 }, 50.0, 65.0, 16.0, 16.0), Vec2::ZERO, TS);
        assert_eq!(p.cell, TileCoord::new(3, 4));
    }

    #[test]
    fn rectangle_keeps_its_full_area() {
        let p = Placement::of(&obj(IrObjectShape::Rectangle, 80.0, 64.0, 32.0, 32.0), Vec2::ZERO, TS);
        assert_eq!(p.area, Some(Rect::new(80.0, 64.0, 32.0, 32.0)));
        assert_eq!(p.cell, TileCoord::new(6, 5));
    }

    #[test]
    fn point_becomes_two_by_two_tile_box() {
        let p = Placement::of(&obj(IrObjectShape::Point, 40.0, 48.0, 0.0, 0.0), Vec2::ZERO, TS);
        assert_eq!(p.area, Some(Rect::new(24.0, 16.0, 32.0, 32.0)));
        assert_eq!(p.cell, TileCoord::new(2, 2));
    }

    #[test]
    fn layer_offset_moves_the_anchor_and_area() {
        let shift = vec2(16.0, -16.0);
        let p = Placement::of(&obj(IrObjectShape::Tile { gid: 1 }, 48.0, 64.0, 16.0, 16.0), shift, TS);
        assert_eq!(p.cell, TileCoord::new(4, 2));

        let p = Placement::of(&obj(IrObjectShape::Point, 40.0, 48.0, 0.0, 0.0), shift, TS);
        assert_eq!(p.area, Some(Rect::new(40.0, 0.0, 32.0, 32.0)));
        assert_eq!(p.cell, TileCoord::new(3, 1));
    }

    #[test]
    fn numeric_props_fall_back_on_garbage() {
        let mut o = obj(IrObjectShape::Point, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(count_prop(&o, "cost", 3), 3);
        o.properties.insert("cost".into(), PropertyValue::String("2".into()));
        assert_eq!(count_prop(&o, "cost", 3), 2);
        o.properties.insert("cost".into(), PropertyValue::I64(-4));
        assert_eq!(count_prop(&o, "cost", 3), 3);
        o.properties.insert("value".into(), PropertyValue::I64(10_000_000_000));
        assert_eq!(count_prop(&o, "value", 1), u32::MAX);
    }
}
