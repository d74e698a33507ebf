//! Wires loading, the session state machine and rendering into one game
//! driven from macroquad's frame loop.

use crate::camera::{Camera, Viewport};
use crate::collision::CollisionGrid;
use crate::config::EngineConfig;
use crate::entities::Entities;
use crate::error::MapError;
use crate::map::Map;
use crate::render::{plan_frame, FrameInput, RenderLoop, Renderer, TextureStore};
use crate::session::{Facing, MoveOutcome, Session};
use crate::shell::{Screen, Shell};
use anyhow::Context;
use macroquad::prelude::*;
use tracing::{debug, error, info};

/// Milliseconds on macroquad's clock.
pub fn now_ms() -> u64 {
    (get_time() * 1000.0) as u64
}

pub fn opening_line(display_name: &str) -> String {
    let name = display_name.trim();
    if name.is_empty() {
        "Collect hearts, buy a flower, deliver it!".to_owned()
    } else {
        format!("{name}: collect hearts, buy a flower, deliver it!")
    }
}

/// Static side of a loaded level.
#[derive(Debug, Clone)]
pub struct World {
    pub map: Map,
    pub grid: CollisionGrid,
    pub entities: Entities,
}

impl World {
    pub fn build(map: Map, config: &EngineConfig) -> Self {
        let entities = Entities::extract(&map, &config.object_layer);
        let grid = CollisionGrid::build(&map, &entities.hearts, &config.footprint);
        World {
            map,
            grid,
            entities,
        }
    }

    pub fn load(config: &EngineConfig) -> Result<Self, MapError> {
        let map = Map::load(&config.map_path)?;
        Ok(Self::build(map, config))
    }

    /// Fresh session with the opening line already showing.
    pub fn new_session(&self, config: &EngineConfig, display_name: &str) -> Session {
        let mut session = Session::new(&self.entities, self.map.tile_size(), config);
        session.set_message(opening_line(display_name));
        session
    }
}

/// One player action for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Move(Facing),
    Interact,
    DismissModal,
}

/// Applies `input` to the session. Dismissing a visible win modal hands
/// control back to the shell's menu and returns `true`.
pub fn apply_input(
    session: &mut Session,
    grid: &CollisionGrid,
    shell: &mut impl Shell,
    input: Input,
    now_ms: u64,
) -> bool {
    match input {
        Input::Move(facing) => {
            let outcome = session.try_move(facing, now_ms, grid);
            if !matches!(outcome, MoveOutcome::CoolingDown | MoveOutcome::Disabled) {
                debug!(?facing, ?outcome, "move");
            }
            false
        }
        Input::Interact => {
            let result = session.interact();
            debug!(?result, "interact");
            false
        }
        Input::DismissModal => {
            if session.dismiss_win_modal() {
                shell.show_screen(Screen::Menu);
                true
            } else {
                false
            }
        }
    }
}

/// Keyboard state for this frame. Held arrows keep producing moves and the
/// session's cooldown paces them.
fn poll_inputs(modal_visible: bool) -> Vec<Input> {
    if modal_visible {
        let dismiss = is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::Escape);
        return if dismiss { vec![Input::DismissModal] } else { Vec::new() };
    }

    let mut inputs = Vec::new();
    let arrows = [
        (KeyCode::Up, Facing::Up),
        (KeyCode::Down, Facing::Down),
        (KeyCode::Left, Facing::Left),
        (KeyCode::Right, Facing::Right),
    ];
    if let Some((_, facing)) = arrows.into_iter().find(|(key, _)| is_key_down(*key)) {
        inputs.push(Input::Move(facing));
    }
    if is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::Enter) {
        inputs.push(Input::Interact);
    }
    inputs
}

pub struct HeartsGame<S: Shell> {
    config: EngineConfig,
    shell: S,
    world: World,
    session: Session,
    renderer: Renderer,
    render_loop: RenderLoop,
}

impl<S: Shell> HeartsGame<S> {
    /// Loads the map and every texture, then starts the session and the
    /// render loop. Failures are logged before being returned.
    pub async fn start(config: EngineConfig, mut shell: S) -> anyhow::Result<Self> {
        let (world, textures) = Self::load(&config).await.inspect_err(|e| {
            let chain = format!("{e:#}");
            error!(error = %chain, "game_start_failed");
        })?;

        shell.start_background_music();
        let session = world.new_session(&config, shell.display_name());
        let mut render_loop = RenderLoop::default();
        render_loop.start(now_ms());
        shell.show_screen(Screen::Game);

        info!(
            map = %config.map_path.display(),
            hearts = world.entities.hearts.len(),
            "game_started"
        );
        Ok(Self {
            config,
            shell,
            world,
            session,
            renderer: Renderer::new(textures),
            render_loop,
        })
    }

    async fn load(config: &EngineConfig) -> anyhow::Result<(World, TextureStore)> {
        let world = World::load(config)
            .with_context(|| format!("loading map {}", config.map_path.display()))?;
        let textures = TextureStore::load(&world.map, &config.sprites)
            .await
            .context("loading textures")?;
        Ok((world, textures))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    /// Throws away the session and starts over on the same map.
    pub fn restart(&mut self) {
        self.session = self.world.new_session(&self.config, self.shell.display_name());
        self.render_loop.stop();
        self.render_loop.start(now_ms());
        self.shell.show_screen(Screen::Game);
        info!("game_restarted");
    }

    pub fn stop(&mut self) {
        self.render_loop.stop();
    }

    /// Input then drawing for one frame. Does nothing once stopped.
    pub fn frame(&mut self) {
        if !self.render_loop.is_running() {
            return;
        }
        let now = now_ms();
        for input in poll_inputs(self.session.win_modal_visible()) {
            let to_menu = apply_input(&mut self.session, &self.world.grid, &mut self.shell, input, now);
            if to_menu {
                self.render_loop.stop();
                return;
            }
        }
        self.draw(now);
    }

    pub fn draw(&self, now_ms: u64) {
        let Some(elapsed_ms) = self.render_loop.elapsed_ms(now_ms) else {
            return;
        };
        let viewport = Viewport {
            width: screen_width(),
            height: screen_height(),
            zoom: self.config.camera_zoom,
        };
        let map = &self.world.map;
        let camera = Camera::follow(
            self.session.player().cell,
            map.tile_size(),
            map.pixel_size(),
            viewport,
        );
        let commands = plan_frame(&FrameInput {
            map,
            session: &self.session,
            camera: &camera,
            elapsed_ms,
            hearts_required: self.config.hearts_required,
            debug_areas: self.config.debug_areas,
        });
        self.renderer.draw(&commands, &camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Npc, Shop};
    use crate::shell::NullShell;
    use crate::spatial::TileCoord;
    use std::collections::BTreeMap;

    fn session_near_win() -> (Session, CollisionGrid) {
        let entities = Entities {
            spawn: TileCoord::new(0, 0),
            hearts: BTreeMap::from([(TileCoord::new(1, 0), 5)]),
            npc: Some(Npc {
                cell: TileCoord::new(3, 0),
                area: None,
                dialog: "bring it".into(),
                success_dialog: "yay".into(),
            }),
            shop: Some(Shop {
                cell: TileCoord::new(2, 0),
                area: None,
                cost: 5,
                dialog: "more".into(),
                success_dialog: "sold".into(),
            }),
        };
        let session = Session::new(&entities, vec2(16.0, 16.0), &EngineConfig::default());
        (session, CollisionGrid::empty(4, 1))
    }

    #[test]
    fn opening_line_mentions_the_player() {
        assert_eq!(opening_line("  Mia "), "Mia: collect hearts, buy a flower, deliver it!");
        assert_eq!(opening_line(""), "Collect hearts, buy a flower, deliver it!");
    }

    #[test]
    fn dismissing_the_win_modal_returns_to_menu() {
        let (mut session, grid) = session_near_win();
        let mut shell = NullShell::default();

        // nothing to dismiss yet
        assert!(!apply_input(&mut session, &grid, &mut shell, Input::DismissModal, 0));
        assert_eq!(shell.current, None);

        for (i, facing) in [Facing::Right; 3].into_iter().enumerate() {
            apply_input(&mut session, &grid, &mut shell, Input::Move(facing), i as u64 * 200);
        }
        assert!(session.won());
        assert_eq!(session.message(), "yay");

        assert!(apply_input(&mut session, &grid, &mut shell, Input::DismissModal, 1_000));
        assert_eq!(shell.current, Some(Screen::Menu));
        assert!(!session.win_modal_visible());
    }
}
