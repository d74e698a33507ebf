// tests/game_tests.rs

use hearts_tiled::game::{apply_input, Input};
use hearts_tiled::{
    EngineConfig, Facing, Interaction, Map, MoveOutcome, NullShell, Screen, TileCoord, World,
};
use std::fs;
use std::path::PathBuf;

const GROUND_TSX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset name="ground" tilewidth="16" tileheight="16" tilecount="4" columns="2">
  <image source="ground.png" width="32" height="32"/>
  <tile id="1">
    <properties>
      <property name="collides" type="bool" value="true"/>
    </properties>
  </tile>
</tileset>
"#;

/// 10x10 map: spawn (0,0), hearts at (3,3) and (5,7), shop area over
/// (5,5) costing 2, NPC standing on (8,8), a wall at (9,0).
fn scenario_map() -> (tempfile::TempDir, PathBuf) {
    let mut ground = vec![1u32; 100];
    ground[9] = 2;
    let data = ground
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let json = format!(
        r#"{{
          "width": 10, "height": 10, "tilewidth": 16, "tileheight": 16,
          "tilesets": [{{"firstgid": 1, "source": "ground.tsx"}}],
          "layers": [
            {{"type": "tilelayer", "name": "ground", "data": [{data}]}},
            {{"type": "objectgroup", "name": "Objects", "objects": [
              {{"id": 1, "class": "player", "gid": 1, "x": 0, "y": 16, "width": 16, "height": 16}},
              {{"id": 2, "class": "heart", "gid": 1, "x": 48, "y": 64, "width": 16, "height": 16}},
              {{"id": 3, "name": "Heart", "gid": 1, "x": 80, "y": 128, "width": 16, "height": 16}},
              {{"id": 4, "class": "shop", "x": 80, "y": 80, "width": 16, "height": 16,
                "properties": [
                  {{"name": "cost", "type": "int", "value": 2}},
                  {{"name": "dialog", "type": "string", "value": "Two hearts, please"}},
                  {{"name": "successDialog", "type": "string", "value": "Here is your flower"}}
                ]}},
              {{"id": 5, "class": "npc", "gid": 1, "x": 128, "y": 144, "width": 16, "height": 16,
                "properties": [
                  {{"name": "dialog", "type": "string", "value": "Got a flower?"}},
                  {{"name": "successDialog", "type": "string", "value": "For me?!"}}
                ]}},
              {{"id": 6, "class": "rock", "gid": 2, "x": 16, "y": 160, "width": 16, "height": 16}}
            ]}}
          ]
        }}"#
    );

    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("ground.tsx"), GROUND_TSX).expect("write tsx");
    let path = dir.path().join("map.json");
    fs::write(&path, json).expect("write map");
    (dir, path)
}

struct Walker {
    now: u64,
}

impl Walker {
    fn step(&mut self, session: &mut hearts_tiled::Session, world: &World, facing: Facing) -> MoveOutcome {
        self.now += 200;
        session.try_move(facing, self.now, &world.grid)
    }

    fn walk(&mut self, session: &mut hearts_tiled::Session, world: &World, facing: Facing, n: usize) {
        for _ in 0..n {
            let out = self.step(session, world, facing);
            assert!(matches!(out, MoveOutcome::Moved { .. }), "stuck: {out:?}");
        }
    }
}

fn world() -> (tempfile::TempDir, World) {
    let (dir, path) = scenario_map();
    let map = Map::load(&path).expect("map loads");
    let world = World::build(map, &EngineConfig::default());
    (dir, world)
}

#[test]
fn world_is_extracted_from_the_object_layer() {
    let (_dir, world) = world();
    let e = &world.entities;

    assert_eq!(e.spawn, TileCoord::new(0, 0));
    assert_eq!(
        e.hearts.keys().copied().collect::<Vec<_>>(),
        vec![TileCoord::new(3, 3), TileCoord::new(5, 7)]
    );
    let shop = e.shop.as_ref().expect("shop");
    assert_eq!(shop.cell, TileCoord::new(5, 5));
    assert_eq!(shop.cost, 2);
    let npc = e.npc.as_ref().expect("npc");
    assert_eq!(npc.cell, TileCoord::new(8, 8));
    assert_eq!(npc.area, None);

    // the wall tile and the rock's footprint block, interactive objects don't
    assert!(world.grid.is_blocked(TileCoord::new(9, 0)));
    assert!(world.grid.is_blocked(TileCoord::new(1, 9)));
    assert!(!world.grid.is_blocked(TileCoord::new(8, 8)));
    for cell in e.hearts.keys() {
        assert!(!world.grid.is_blocked(*cell));
    }
}

#[test]
fn full_run_from_spawn_to_win() {
    let (_dir, world) = world();
    let config = EngineConfig::default();
    let mut s = world.new_session(&config, "Mia");
    let mut w = Walker { now: 0 };
    assert!(s.message().starts_with("Mia"));

    // first heart
    w.walk(&mut s, &world, Facing::Right, 3);
    w.walk(&mut s, &world, Facing::Down, 3);
    assert_eq!(s.hearts_count(), 1);
    assert!(config.heart_dialogs.iter().any(|l| l == s.message()));

    // shop turns us away with one heart
    w.walk(&mut s, &world, Facing::Right, 2);
    let out = w.step(&mut s, &world, Facing::Down);
    assert!(matches!(out, MoveOutcome::Moved { .. }));
    let out = w.step(&mut s, &world, Facing::Down);
    assert_eq!(
        out,
        MoveOutcome::Moved {
            picked_up: None,
            interactions: vec![Interaction::NeedMoreHearts { have: 1, cost: 2 }],
        }
    );
    assert_eq!(s.player().cell, TileCoord::new(5, 5));
    assert_eq!(s.message(), "Two hearts, please");
    assert!(!s.has_flower());

    // second heart, then back to the shop
    w.walk(&mut s, &world, Facing::Down, 2);
    assert_eq!(s.hearts_count(), 2);
    w.walk(&mut s, &world, Facing::Up, 2);
    assert_eq!(s.hearts_count(), 0);
    assert!(s.has_flower());
    assert_eq!(s.message(), "Here is your flower");

    // deliver
    w.walk(&mut s, &world, Facing::Right, 3);
    w.walk(&mut s, &world, Facing::Down, 2);
    assert!(!s.won());
    let out = w.step(&mut s, &world, Facing::Down);
    assert_eq!(
        out,
        MoveOutcome::Moved {
            picked_up: None,
            interactions: vec![Interaction::Delivered],
        }
    );
    assert_eq!(s.message(), "For me?!");
    assert!(s.won());
    assert!(!s.input_enabled());
    assert_eq!(w.step(&mut s, &world, Facing::Up), MoveOutcome::Disabled);

    let mut shell = NullShell::default();
    assert!(apply_input(&mut s, &world.grid, &mut shell, Input::DismissModal, w.now));
    assert_eq!(shell.current, Some(Screen::Menu));
}

#[test]
fn walls_and_edges_only_turn_the_player() {
    let (_dir, world) = world();
    let mut s = world.new_session(&EngineConfig::default(), "");
    let mut w = Walker { now: 0 };

    assert_eq!(w.step(&mut s, &world, Facing::Up), MoveOutcome::OutOfBounds);
    assert_eq!(s.player().cell, TileCoord::new(0, 0));
    assert_eq!(s.player().facing, Facing::Up);

    w.walk(&mut s, &world, Facing::Right, 8);
    assert_eq!(w.step(&mut s, &world, Facing::Right), MoveOutcome::Blocked);
    assert_eq!(s.player().cell, TileCoord::new(8, 0));
    assert_eq!(s.player().facing, Facing::Right);
}

#[test]
fn restarting_brings_every_heart_back() {
    let (_dir, world) = world();
    let config = EngineConfig::default();
    let mut s = world.new_session(&config, "");
    let mut w = Walker { now: 0 };
    w.walk(&mut s, &world, Facing::Right, 3);
    w.walk(&mut s, &world, Facing::Down, 3);
    assert_eq!(s.hearts().len(), 1);

    let fresh = world.new_session(&config, "");
    assert_eq!(fresh.hearts().len(), 2);
    assert_eq!(fresh.hearts_count(), 0);
    assert_eq!(fresh.player().cell, TileCoord::new(0, 0));
}
