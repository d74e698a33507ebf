use macroquad::rand::gen_range;

/// Lines handed out without replacement. Once every line has been shown
/// the pool refills.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogPool {
    lines: Vec<String>,
    remaining: Vec<usize>,
}

impl DialogPool {
    pub fn new(lines: Vec<String>) -> Self {
        let remaining = (0..lines.len()).collect();
        Self { lines, remaining }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Random line using macroquad's global generator.
    pub fn draw(&mut self) -> Option<&str> {
        self.draw_with(|n| gen_range(0, n))
    }

    /// `pick(n)` chooses an index in `0..n` among the lines not yet shown;
    /// out-of-range picks are clamped.
    pub fn draw_with(&mut self, pick: impl FnOnce(usize) -> usize) -> Option<&str> {
        if self.lines.is_empty() {
            return None;
        }
        if self.remaining.is_empty() {
            self.remaining = (0..self.lines.len()).collect();
        }
        let i = pick(self.remaining.len()).min(self.remaining.len() - 1);
        let line = self.remaining.swap_remove(i);
        Some(self.lines[line].as_str())
    }
}
