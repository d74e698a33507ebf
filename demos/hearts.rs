use hearts_tiled::{EngineConfig, HeartsGame, Screen, Shell};
use macroquad::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV_VAR: &str = "HEARTS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "hearts.json";

fn config_path() -> String {
    std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned())
}

fn load_config() -> anyhow::Result<EngineConfig> {
    Ok(EngineConfig::load_or_default(config_path())?)
}

fn window_conf() -> Conf {
    let window = load_config().unwrap_or_default().window;
    Conf {
        window_title: window.title,
        window_width: window.width,
        window_height: window.height,
        ..Default::default()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Desktop host: a one-line menu and no audio.
struct DesktopShell {
    name: String,
    screen: Screen,
}

impl Shell for DesktopShell {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn show_screen(&mut self, screen: Screen) {
        info!(?screen, "show_screen");
        self.screen = screen;
    }

    fn start_background_music(&mut self) {
        info!("background music is not available in the desktop demo");
    }
}

fn draw_status(text: &str) {
    draw_text(text, 20.0, screen_height() / 2.0, 28.0, WHITE);
}

#[macroquad::main(window_conf)]
async fn main() {
    init_tracing();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            let chain = format!("{e:#}");
            error!(error = %chain, "config_load_failed");
            EngineConfig::default()
        }
    };
    let shell = DesktopShell {
        name: std::env::var("USER").unwrap_or_default(),
        screen: Screen::Menu,
    };

    let mut game = match HeartsGame::start(config, shell).await {
        Ok(game) => game,
        Err(e) => {
            let status = format!("Could not start: {e:#}");
            loop {
                clear_background(BLACK);
                draw_status(&status);
                next_frame().await;
            }
        }
    };

    loop {
        clear_background(BLACK);
        match game.shell().screen {
            Screen::Game => game.frame(),
            Screen::Menu => {
                draw_status("Press Enter to play again");
                if is_key_pressed(KeyCode::Enter) {
                    game.restart();
                }
            }
        }
        next_frame().await;
    }
}
