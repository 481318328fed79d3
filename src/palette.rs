use std::fmt;

use ratatui::style::{Color, Style};

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

/// One color in two renderings: a ratatui color for the form and an ANSI escape for stderr.
#[derive(Clone, Copy, Debug)]
pub struct PaletteColor {
    tui: Color,
    ansi: &'static str,
}

impl PaletteColor {
    const fn new(tui: Color, ansi: &'static str) -> Self {
        Self { tui, ansi }
    }

    pub fn fg(self) -> Style {
        Style::default().fg(self.tui)
    }

    pub fn bg(self) -> Style {
        Style::default().bg(self.tui)
    }

    pub fn paint(self, value: impl fmt::Display) -> String {
        format!("{}{value}{RESET}", self.ansi)
    }
}

pub struct Palette;

impl Palette {
    /// Panel titles, focused borders, the selected grade.
    pub const ACCENT: PaletteColor = PaletteColor::new(Color::Blue, "\x1b[34m");
    /// The form title and the grade echoed by `generate`.
    pub const INFO: PaletteColor = PaletteColor::new(Color::Cyan, "\x1b[36m");
    pub const SUCCESS: PaletteColor = PaletteColor::new(Color::Green, "\x1b[32m");
    /// Missing learning targets, disabled logging.
    pub const WARNING: PaletteColor = PaletteColor::new(Color::Yellow, "\x1b[33m");
    pub const DANGER: PaletteColor = PaletteColor::new(Color::Red, "\x1b[31m");
    pub const BORDER: PaletteColor = PaletteColor::new(Color::Gray, "\x1b[90m");

    pub fn dim(value: impl fmt::Display) -> String {
        format!("{DIM}{value}{RESET}")
    }
}
