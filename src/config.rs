//! Viewer configuration.

use crate::{
    canvas::{BLANK, Color, INK},
    glyph::{FontHeight, line_rows},
    input::{DEFAULT_LONG_PRESS_TICKS, Keymap},
    layout::chars_per_line_for,
};

/// Keypad scan period, in milliseconds.
pub const DEFAULT_TICK_MS: u32 = 20;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ViewerConfig {
    pub font_height: FontHeight,
    /// Extra blank rows between text rows.
    pub line_spacing: u8,
    pub foreground: Color,
    pub background: Color,
    pub tick_ms: u32,
    pub long_press_ticks: u32,
    pub keymap: Keymap,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            font_height: FontHeight::Px16,
            line_spacing: 0,
            foreground: INK,
            background: BLANK,
            tick_ms: DEFAULT_TICK_MS,
            long_press_ticks: DEFAULT_LONG_PRESS_TICKS,
            keymap: Keymap::default(),
        }
    }
}

impl ViewerConfig {
    pub const fn with_font_height(mut self, font_height: FontHeight) -> Self {
        self.font_height = font_height;
        self
    }

    pub const fn with_line_spacing(mut self, line_spacing: u8) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    pub const fn with_colors(mut self, foreground: Color, background: Color) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }

    pub const fn with_tick_ms(mut self, tick_ms: u32) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    pub const fn with_long_press_ticks(mut self, long_press_ticks: u32) -> Self {
        self.long_press_ticks = long_press_ticks;
        self
    }

    pub const fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Pixel pitch of one text row.
    pub const fn line_height(&self) -> usize {
        line_rows(self.font_height) + self.line_spacing as usize
    }

    /// Bytes per display line on a canvas `width` pixels wide.
    pub const fn chars_per_line(&self, width: usize) -> usize {
        chars_per_line_for(width, self.font_height.advance() as usize)
    }

    /// Text rows on a canvas `height` pixels tall.
    pub const fn lines_per_page(&self, height: usize) -> usize {
        let rows = height / self.line_height();
        if rows == 0 { 1 } else { rows }
    }
}
