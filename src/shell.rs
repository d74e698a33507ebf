/// Screens owned by the host application around the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Game,
}

/// What the game needs from whatever hosts it.
pub trait Shell {
    /// Name the player picked, used in the opening line.
    fn display_name(&self) -> &str;
    fn show_screen(&mut self, screen: Screen);
    fn start_background_music(&mut self);
}

/// Host with no surrounding screens or audio.
#[derive(Debug, Clone, Default)]
pub struct NullShell {
    pub name: String,
    pub current: Option<Screen>,
    pub music_started: bool,
}

impl Shell for NullShell {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn show_screen(&mut self, screen: Screen) {
        self.current = Some(screen);
    }

    fn start_background_music(&mut self) {
        self.music_started = true;
    }
}
