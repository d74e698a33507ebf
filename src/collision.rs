use crate::config::FootprintConfig;
use crate::entities::EntityClass;
use crate::map::Map;
use crate::spatial::{TileCoord, TileId};
use std::collections::BTreeMap;
use tracing::debug;

/// Static walkability of the map, one flag per cell (`true` = blocked).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionGrid {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
}

impl CollisionGrid {
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            blocked: vec![false; width * height],
        }
    }

    /// Builds the grid from colliding tiles and trimmed tile-object
    /// footprints, then clears every cell that still holds a heart.
    pub fn build(
        map: &Map,
        hearts: &BTreeMap<TileCoord, u32>,
        footprint: &FootprintConfig,
    ) -> Self {
        let mut grid = Self::empty(map.width, map.height);
        grid.mark_colliding_tiles(map);
        grid.mark_object_footprints(map, footprint);
        grid.clear_cells(hearts.keys().copied());

        debug!(
            blocked = grid.blocked.iter().filter(|b| **b).count(),
            "collision_grid_built"
        );
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, cell: TileCoord) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    fn index(&self, cell: TileCoord) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.y as usize * self.width + cell.x as usize)
    }

    /// Out-of-bounds cells are reported as not blocked; callers bound-check
    /// separately so the two rejections stay distinguishable.
    pub fn is_blocked(&self, cell: TileCoord) -> bool {
        self.index(cell).is_some_and(|i| self.blocked[i])
    }

    pub fn set_blocked(&mut self, cell: TileCoord, blocked: bool) {
        if let Some(i) = self.index(cell) {
            self.blocked[i] = blocked;
        }
    }

    pub fn clear_cells(&mut self, cells: impl IntoIterator<Item = TileCoord>) {
        for cell in cells {
            self.set_blocked(cell, false);
        }
    }

    fn mark_colliding_tiles(&mut self, map: &Map) {
        let tile = map.tile_size();
        for layer in map.tile_layers().filter(|l| l.visible) {
            // a layer drawn off the grid blocks the cells its tiles mostly cover
            let dx = (layer.offset.x / tile.x).round() as i32;
            let dy = (layer.offset.y / tile.y).round() as i32;
            for (i, &raw) in layer.data.iter().enumerate() {
                let gid = TileId(raw);
                if gid.is_empty() || !map.tilesets.collides(gid) {
                    continue;
                }
                let cell = TileCoord::new((i % layer.width) as i32 + dx, (i / layer.width) as i32 + dy);
                self.set_blocked(cell, true);
            }
        }
    }

    fn mark_object_footprints(&mut self, map: &Map, footprint: &FootprintConfig) {
        let tw = map.tile_w as f32;
        let th = map.tile_h as f32;

        for layer in map.object_layers().filter(|l| l.visible) {
            for obj in layer.objects {
                if obj.gid().is_none() || EntityClass::of(obj).is_some() {
                    continue;
                }

                let w = if obj.width > 0.0 { obj.width } else { tw };
                let h = if obj.height > 0.0 { obj.height } else { th };

                // x is the left edge, y the bottom edge
                let x = obj.x + layer.offset.x;
                let y = obj.y + layer.offset.y;
                let left = x + footprint.inset_x;
                let right = x + w - footprint.inset_x;
                let bottom = y;
                let top = y - footprint.strip_height.min(h);
                if right <= left {
                    continue;
                }

                let start_x = (left / tw).floor() as i32;
                let end_x = ((right - 1.0) / tw).floor() as i32;
                let start_y = (top / th).floor() as i32;
                let end_y = ((bottom - 1.0) / th).floor() as i32;

                for ty in start_y..=end_y {
                    for tx in start_x..=end_x {
                        self.set_blocked(TileCoord::new(tx, ty), true);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir_map::*;
    use macroquad::prelude::*;
    use std::path::{Path, PathBuf};

    fn tile_object(class_name: &str, x: f32, y: f32, w: f32, h: f32) -> IrObject {
        IrObject {
            id: 0,
            name: String::new(),
            class_name: class_name.into(),
            x,
            y,
            width: w,
            height: h,
            rotation: 0.0,
            visible: true,
            shape: IrObjectShape::Tile { gid: 1 },
            properties: Properties::new(),
        }
    }

    fn map_with(ground: Vec<u32>, objects: Vec<IrObject>) -> Map {
        map_with_offsets(ground, objects, Vec2::ZERO, Vec2::ZERO)
    }

    fn map_with_offsets(
        ground: Vec<u32>,
        objects: Vec<IrObject>,
        ground_offset: Vec2,
        objects_offset: Vec2,
    ) -> Map {
        let mut wall = IrTileMetadata {
            id: 1,
            properties: Properties::new(),
            image: None,
            animation: Vec::new(),
        };
        wall.properties.insert("collides".into(), PropertyValue::Bool(true));
        let ir = IrMap {
            width: 4,
            height: 4,
            tile_w: 16,
            tile_h: 16,
            properties: Properties::new(),
            tilesets: vec![IrTileset {
                first_gid: 1,
                name: "t".into(),
                base_dir: PathBuf::from("."),
                origin: PathBuf::from("t.tsx"),
                tile_w: 16,
                tile_h: 16,
                tilecount: 4,
                columns: 2,
                spacing: 0,
                margin: 0,
                image: Some(IrImage { source: "t.png".into(), width: 32, height: 32 }),
                properties: Properties::new(),
                tiles: vec![wall],
            }],
            layers: vec![
                IrLayer {
                    name: "ground".into(),
                    visible: true,
                    opacity: 1.0,
                    offset: ground_offset,
                    properties: Properties::new(),
                    kind: IrLayerKind::Tiles { width: 4, height: 4, data: ground },
                },
                IrLayer {
                    name: "Objects".into(),
                    visible: true,
                    opacity: 1.0,
                    offset: objects_offset,
                    properties: Properties::new(),
                    kind: IrLayerKind::Objects { objects },
                },
            ],
        };
        Map::from_ir(ir, Path::new(".")).expect("map")
    }

    fn blocked_cells(grid: &CollisionGrid) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                if grid.is_blocked(TileCoord::new(x, y)) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn colliding_tiles_block_their_cells() {
        // gid 2 is local id 1, the wall
        let mut ground = vec![1; 16];
        ground[5] = 2;
        ground[15] = 2 | crate::spatial::FLIP_H;
        let map = map_with(ground, vec![]);
        let grid = CollisionGrid::build(&map, &BTreeMap::new(), &FootprintConfig::default());
        assert_eq!(blocked_cells(&grid), vec![(1, 1), (3, 3)]);
    }

    #[test]
    fn tall_decoration_only_blocks_its_feet() {
        // 32x48 tree standing with its base at y=64, x from 16 to 48
        let map = map_with(vec![0; 16], vec![tile_object("tree", 16.0, 64.0, 32.0, 48.0)]);
        let grid = CollisionGrid::build(&map, &BTreeMap::new(), &FootprintConfig::default());
        assert_eq!(blocked_cells(&grid), vec![(1, 3), (2, 3)]);
    }

    #[test]
    fn layer_offsets_move_what_blocks() {
        let mut ground = vec![0; 16];
        ground[0] = 2;
        let rock = tile_object("rock", 0.0, 16.0, 16.0, 16.0);
        let map = map_with_offsets(ground, vec![rock], vec2(16.0, 0.0), vec2(32.0, 16.0));
        let grid = CollisionGrid::build(&map, &BTreeMap::new(), &FootprintConfig::default());
        assert_eq!(blocked_cells(&grid), vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn inset_can_swallow_narrow_objects() {
        let map = map_with(vec![0; 16], vec![tile_object("post", 0.0, 16.0, 4.0, 16.0)]);
        let grid = CollisionGrid::build(&map, &BTreeMap::new(), &FootprintConfig::default());
        assert!(blocked_cells(&grid).is_empty());
    }

    #[test]
    fn interactive_classes_never_collide() {
        let objects = ["heart", "Player", "pookgirl", "npc", "pookboy", "shop", "FlowerShop"]
            .into_iter()
            .map(|c| tile_object(c, 16.0, 32.0, 16.0, 16.0))
            .collect();
        let map = map_with(vec![0; 16], objects);
        let grid = CollisionGrid::build(&map, &BTreeMap::new(), &FootprintConfig::default());
        assert!(blocked_cells(&grid).is_empty());
    }

    #[test]
    fn heart_cells_stay_walkable_under_scenery() {
        let mut ground = vec![0; 16];
        ground[2 * 4 + 2] = 2;
        let map = map_with(ground, vec![tile_object("rock", 0.0, 16.0, 16.0, 16.0)]);
        let hearts = BTreeMap::from([(TileCoord::new(2, 2), 1), (TileCoord::new(0, 0), 1)]);
        let grid = CollisionGrid::build(&map, &hearts, &FootprintConfig::default());
        for cell in hearts.keys() {
            assert!(!grid.is_blocked(*cell));
        }
        assert!(blocked_cells(&grid).is_empty());
    }

    #[test]
    fn footprint_is_clipped_to_the_grid() {
        // base sits below the map, so the whole strip falls outside it
        let map = map_with(vec![0; 16], vec![tile_object("wall", -32.0, 200.0, 200.0, 300.0)]);
        let grid = CollisionGrid::build(&map, &BTreeMap::new(), &FootprintConfig::default());
        assert!(blocked_cells(&grid).is_empty());

        // base on the last row, spilling past the left and right edges
        let map = map_with(vec![0; 16], vec![tile_object("wall", -32.0, 64.0, 200.0, 300.0)]);
        let grid = CollisionGrid::build(&map, &BTreeMap::new(), &FootprintConfig::default());
        assert_eq!(blocked_cells(&grid), vec![(0, 3), (1, 3), (2, 3), (3, 3)]);
        assert!(!grid.is_blocked(TileCoord::new(-1, 3)));
        assert!(!grid.in_bounds(TileCoord::new(4, 0)));
    }
}
