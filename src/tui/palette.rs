//! Monochrome palette for the lyric view

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub accent: Color,
    pub border: Color,
    pub error: Color,
}

impl Palette {
    pub const MONO: Self = Self {
        fg_primary: Color::Rgb(255, 255, 255),   // #ffffff
        fg_secondary: Color::Rgb(136, 136, 136), // #888888
        accent: Color::Rgb(255, 255, 255),       // #ffffff
        border: Color::Rgb(64, 64, 64),          // #404040
        error: Color::Rgb(224, 108, 117),        // #e06c75
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::MONO
    }
}
