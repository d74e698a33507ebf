//! Per-session game state and the movement/interaction state machine.

use crate::collision::CollisionGrid;
use crate::config::EngineConfig;
use crate::dialog::DialogPool;
use crate::entities::{Entities, Npc, Shop};
use crate::spatial::{point_in_rect, TileCoord};
use macroquad::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const OUT_OF_BOUNDS_HINT: &str = "You can't go that way";
pub const ALREADY_BOUGHT: &str = "You already bought it";
pub const NOTHING_HERE: &str = "Nothing to interact with here";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::Up => (0, -1),
            Facing::Down => (0, 1),
            Facing::Left => (-1, 0),
            Facing::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerState {
    pub cell: TileCoord,
    pub facing: Facing,
}

/// What a shop or NPC visit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Purchased { cost: u32 },
    NeedMoreHearts { have: u32, cost: u32 },
    AlreadyBought,
    NpcRequest,
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Input is off after the win.
    Disabled,
    /// Dropped: the previous attempt was less than the cooldown ago.
    CoolingDown,
    OutOfBounds,
    Blocked,
    Moved {
        picked_up: Option<u32>,
        interactions: Vec<Interaction>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    player: PlayerState,
    hearts: BTreeMap<TileCoord, u32>,
    hearts_count: u32,
    has_flower: bool,
    npc: Option<Npc>,
    shop: Option<Shop>,
    tile_size: Vec2,
    cooldown_ms: u64,
    last_move_at: Option<u64>,
    input_enabled: bool,
    won: bool,
    win_modal_visible: bool,
    message: String,
    heart_lines: DialogPool,
}

impl Session {
    pub fn new(entities: &Entities, tile_size: Vec2, config: &EngineConfig) -> Self {
        Self {
            player: PlayerState {
                cell: entities.spawn,
                facing: Facing::Down,
            },
            hearts: entities.hearts.clone(),
            hearts_count: 0,
            has_flower: false,
            npc: entities.npc.clone(),
            shop: entities.shop.clone(),
            tile_size,
            cooldown_ms: config.move_cooldown_ms,
            last_move_at: None,
            input_enabled: true,
            won: false,
            win_modal_visible: false,
            message: String::new(),
            heart_lines: DialogPool::new(config.heart_dialogs.clone()),
        }
    }

    pub fn player(&self) -> PlayerState {
        self.player
    }

    pub fn hearts(&self) -> &BTreeMap<TileCoord, u32> {
        &self.hearts
    }

    pub fn hearts_count(&self) -> u32 {
        self.hearts_count
    }

    pub fn has_flower(&self) -> bool {
        self.has_flower
    }

    pub fn npc(&self) -> Option<&Npc> {
        self.npc.as_ref()
    }

    pub fn shop(&self) -> Option<&Shop> {
        self.shop.as_ref()
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn win_modal_visible(&self) -> bool {
        self.win_modal_visible
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = text.into();
    }

    /// Pixel area that triggers the NPC when the player's center enters it.
    pub fn npc_trigger(&self) -> Option<Rect> {
        self.npc
            .as_ref()
            .map(|n| n.area.unwrap_or_else(|| n.cell.px_rect(self.tile_size)))
    }

    pub fn shop_trigger(&self) -> Option<Rect> {
        self.shop
            .as_ref()
            .map(|s| s.area.unwrap_or_else(|| s.cell.px_rect(self.tile_size)))
    }

    /// One grid step toward `facing`, at `now_ms`.
    pub fn try_move(&mut self, facing: Facing, now_ms: u64, grid: &CollisionGrid) -> MoveOutcome {
        if !self.input_enabled {
            return MoveOutcome::Disabled;
        }
        if let Some(last) = self.last_move_at {
            if now_ms.saturating_sub(last) < self.cooldown_ms {
                return MoveOutcome::CoolingDown;
            }
        }
        self.last_move_at = Some(now_ms);
        self.player.facing = facing;

        let (dx, dy) = facing.delta();
        let next = self.player.cell.offset(dx, dy);

        if !grid.in_bounds(next) {
            self.set_message(OUT_OF_BOUNDS_HINT);
            return MoveOutcome::OutOfBounds;
        }
        if grid.is_blocked(next) {
            return MoveOutcome::Blocked;
        }

        self.player.cell = next;
        let picked_up = self.pick_up(next);
        let interactions = self.auto_interact();
        MoveOutcome::Moved {
            picked_up,
            interactions,
        }
    }

    fn pick_up(&mut self, cell: TileCoord) -> Option<u32> {
        let value = self.hearts.remove(&cell)?;
        self.hearts_count = self.hearts_count.saturating_add(value);
        let line = self
            .heart_lines
            .draw()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("+{value}"));
        self.set_message(line);
        debug!(x = cell.x, y = cell.y, value, total = self.hearts_count, "heart_collected");
        Some(value)
    }

    fn auto_interact(&mut self) -> Vec<Interaction> {
        let center = self.player.cell.center_px(self.tile_size);
        let mut out = Vec::new();

        if self.shop_trigger().is_some_and(|r| point_in_rect(center, &r)) {
            out.extend(self.visit_shop());
        }
        if self.npc_trigger().is_some_and(|r| point_in_rect(center, &r)) {
            out.extend(self.visit_npc());
        }
        out
    }

    /// Talks to whatever stands on the cell the player is facing.
    pub fn interact(&mut self) -> Option<Interaction> {
        if !self.input_enabled {
            return None;
        }
        let (dx, dy) = self.player.facing.delta();
        let target = self.player.cell.offset(dx, dy);

        if self.shop.as_ref().is_some_and(|s| s.cell == target) {
            return self.visit_shop();
        }
        if self.npc.as_ref().is_some_and(|n| n.cell == target) {
            return self.visit_npc();
        }
        self.set_message(NOTHING_HERE);
        None
    }

    fn visit_shop(&mut self) -> Option<Interaction> {
        let shop = self.shop.as_ref()?;
        let (cost, dialog, success) = (shop.cost, shop.dialog.clone(), shop.success_dialog.clone());

        let interaction = if self.has_flower {
            self.set_message(ALREADY_BOUGHT);
            Interaction::AlreadyBought
        } else if self.hearts_count >= cost {
            self.hearts_count -= cost;
            self.has_flower = true;
            self.set_message(success);
            info!(cost, remaining = self.hearts_count, "flower_purchased");
            Interaction::Purchased { cost }
        } else {
            self.set_message(dialog);
            Interaction::NeedMoreHearts {
                have: self.hearts_count,
                cost,
            }
        };
        Some(interaction)
    }

    fn visit_npc(&mut self) -> Option<Interaction> {
        let npc = self.npc.as_ref()?;
        let (dialog, success) = (npc.dialog.clone(), npc.success_dialog.clone());

        if self.has_flower {
            self.set_message(success);
            self.won = true;
            self.win_modal_visible = true;
            self.input_enabled = false;
            info!(hearts = self.hearts_count, "flower_delivered");
            Some(Interaction::Delivered)
        } else {
            self.set_message(dialog);
            Some(Interaction::NpcRequest)
        }
    }

    /// Hides the win modal. Returns whether it was showing.
    pub fn dismiss_win_modal(&mut self) -> bool {
        std::mem::replace(&mut self.win_modal_visible, false)
    }
}
