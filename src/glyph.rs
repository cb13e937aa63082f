//! Bitmap glyph blitting for single-byte ASCII and double-byte codes.
//!
//! Font tables live in flash and are handed in by the board:
//!
//! - ASCII tables hold one entry per character from `' '` onwards, `rows`
//!   bytes per entry, one byte per row, MSB is the leftmost of 8 columns.
//! - The double-byte table is a packed 94x94 row/cell grid of 16x16 glyphs,
//!   32 bytes each (two bytes per row, MSB first).

use core::fmt::{self, Write as _};

use heapless::String;

use crate::canvas::{Canvas, Color, FlushTarget, span_end};

/// Width of every ASCII glyph cell.
pub const ASCII_COLUMNS: usize = 8;
/// Side of a double-byte glyph.
pub const DOUBLE_BYTE_SIZE: usize = 16;
/// Bytes per double-byte glyph.
pub const DOUBLE_BYTE_GLYPH_BYTES: usize = 32;
/// Horizontal advance of a double-byte glyph.
pub const DOUBLE_BYTE_ADVANCE: i32 = 16;
/// Capacity of the formatted-text scratch buffer.
pub const FORMAT_BUFFER_BYTES: usize = 256;

const GRID_SIDE: usize = 94;
const CODE_BASE: usize = 0xA1;

/// Selectable ASCII font height.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FontHeight {
    Px8,
    Px12,
    Px16,
}

impl FontHeight {
    pub const fn from_px(px: u8) -> Option<Self> {
        match px {
            8 => Some(Self::Px8),
            12 => Some(Self::Px12),
            16 => Some(Self::Px16),
            _ => None,
        }
    }

    pub const fn rows(self) -> usize {
        match self {
            Self::Px8 => 8,
            Self::Px12 => 12,
            Self::Px16 => 16,
        }
    }

    /// Pen advance after one ASCII glyph.
    pub const fn advance(self) -> i32 {
        match self {
            Self::Px16 => 8,
            Self::Px8 | Self::Px12 => 6,
        }
    }
}

/// Font tables available to the renderer.
#[derive(Clone, Copy, Debug, Default)]
pub struct FontSet<'a> {
    pub ascii_8: &'a [u8],
    pub ascii_12: &'a [u8],
    pub ascii_16: &'a [u8],
    pub double_byte: &'a [u8],
}

impl<'a> FontSet<'a> {
    pub const fn ascii(&self, height: FontHeight) -> &'a [u8] {
        match height {
            FontHeight::Px8 => self.ascii_8,
            FontHeight::Px12 => self.ascii_12,
            FontHeight::Px16 => self.ascii_16,
        }
    }
}

/// Byte offset of a double-byte glyph inside the packed table.
///
/// The high byte selects the row and the low byte the cell, both counted from
/// `0xA1`. Bytes below the base have no glyph.
pub fn double_byte_offset(code: u16) -> Option<usize> {
    let [high, low] = code.to_be_bytes();
    let row = (high as usize).checked_sub(CODE_BASE)?;
    let cell = (low as usize).checked_sub(CODE_BASE)?;
    Some((GRID_SIDE * row + cell) * DOUBLE_BYTE_GLYPH_BYTES)
}

#[derive(Clone, Copy, Debug)]
pub struct GlyphRenderer<'a> {
    fonts: FontSet<'a>,
}

impl<'a> GlyphRenderer<'a> {
    pub const fn new(fonts: FontSet<'a>) -> Self {
        Self { fonts }
    }

    pub const fn fonts(&self) -> &FontSet<'a> {
        &self.fonts
    }

    /// Draws one printable ASCII character. Anything outside `' '..='~'`, or
    /// past the end of the selected table, is skipped.
    pub fn draw_ascii<F: FlushTarget>(
        &self,
        canvas: &mut Canvas<F>,
        x: i32,
        y: i32,
        ch: u8,
        height: FontHeight,
        fg: Color,
        bg: Option<Color>,
    ) {
        if self.blit_ascii(canvas, x, y, ch, height, fg, bg) {
            canvas.flush_rows(y, span_end(y, height.rows()));
        }
    }

    /// Draws one 16x16 double-byte glyph. Codes without a complete glyph in
    /// the table are skipped.
    pub fn draw_double<F: FlushTarget>(
        &self,
        canvas: &mut Canvas<F>,
        x: i32,
        y: i32,
        code: u16,
        fg: Color,
        bg: Option<Color>,
    ) {
        if self.blit_double(canvas, x, y, code, fg, bg) {
            canvas.flush_rows(y, span_end(y, DOUBLE_BYTE_SIZE));
        }
    }

    /// Draws a mixed single/double-byte string on one row and returns the pen
    /// position after the last glyph.
    ///
    /// A byte `>= 0x80` pairs with the byte after it into one big-endian code.
    /// Drawing stops once the pen passes the canvas width; nothing wraps.
    pub fn draw_string<F: FlushTarget>(
        &self,
        canvas: &mut Canvas<F>,
        x: i32,
        y: i32,
        height: FontHeight,
        fg: Color,
        bg: Option<Color>,
        bytes: &[u8],
    ) -> i32 {
        let end = self.blit_string(canvas, x, y, height, fg, bg, bytes);
        canvas.flush_rows(y, span_end(y, line_rows(height)));
        end
    }

    /// Formats into a fixed scratch buffer and draws the result like
    /// [`GlyphRenderer::draw_string`]. Output longer than
    /// [`FORMAT_BUFFER_BYTES`] is cut off.
    pub fn draw_fmt<F: FlushTarget>(
        &self,
        canvas: &mut Canvas<F>,
        x: i32,
        y: i32,
        height: FontHeight,
        fg: Color,
        bg: Option<Color>,
        args: fmt::Arguments<'_>,
    ) -> i32 {
        let end = self.blit_fmt(canvas, x, y, height, fg, bg, args);
        canvas.flush_rows(y, span_end(y, line_rows(height)));
        end
    }

    /// [`GlyphRenderer::draw_fmt`] without the flush.
    pub(crate) fn blit_fmt<F: FlushTarget>(
        &self,
        canvas: &mut Canvas<F>,
        x: i32,
        y: i32,
        height: FontHeight,
        fg: Color,
        bg: Option<Color>,
        args: fmt::Arguments<'_>,
    ) -> i32 {
        let mut text = String::<FORMAT_BUFFER_BYTES>::new();
        let _ = Truncating(&mut text).write_fmt(args);
        self.blit_string(canvas, x, y, height, fg, bg, text.as_bytes())
    }

    /// [`GlyphRenderer::draw_string`] without the flush.
    pub(crate) fn blit_string<F: FlushTarget>(
        &self,
        canvas: &mut Canvas<F>,
        x: i32,
        y: i32,
        height: FontHeight,
        fg: Color,
        bg: Option<Color>,
        bytes: &[u8],
    ) -> i32 {
        let limit = canvas.width() as i32;
        let mut pen = x;
        let mut index = 0usize;

        while index < bytes.len() {
            let lead = bytes[index];
            if lead < 0x80 {
                self.blit_ascii(canvas, pen, y, lead, height, fg, bg);
                pen = pen.saturating_add(height.advance());
                index += 1;
            } else {
                let trail = bytes.get(index + 1).copied().unwrap_or(0);
                self.blit_double(canvas, pen, y, u16::from_be_bytes([lead, trail]), fg, bg);
                pen = pen.saturating_add(DOUBLE_BYTE_ADVANCE);
                index += 2;
            }

            if pen > limit {
                break;
            }
        }

        pen
    }

    fn blit_ascii<F: FlushTarget>(
        &self,
        canvas: &mut Canvas<F>,
        x: i32,
        y: i32,
        ch: u8,
        height: FontHeight,
        fg: Color,
        bg: Option<Color>,
    ) -> bool {
        if !(b' '..=b'~').contains(&ch) {
            return false;
        }

        let rows = height.rows();
        let start = (ch - b' ') as usize * rows;
        let Some(glyph) = self.fonts.ascii(height).get(start..start + rows) else {
            return false;
        };

        for (row, &bits) in glyph.iter().enumerate() {
            blit_byte(canvas, x, y.saturating_add(row as i32), bits, fg, bg);
        }
        true
    }

    fn blit_double<F: FlushTarget>(
        &self,
        canvas: &mut Canvas<F>,
        x: i32,
        y: i32,
        code: u16,
        fg: Color,
        bg: Option<Color>,
    ) -> bool {
        let Some(offset) = double_byte_offset(code) else {
            return false;
        };
        let Some(glyph) = self
            .fonts
            .double_byte
            .get(offset..offset + DOUBLE_BYTE_GLYPH_BYTES)
        else {
            return false;
        };

        for (row, pair) in glyph.chunks_exact(2).enumerate() {
            let py = y.saturating_add(row as i32);
            blit_byte(canvas, x, py, pair[0], fg, bg);
            blit_byte(canvas, x.saturating_add(ASCII_COLUMNS as i32), py, pair[1], fg, bg);
        }
        true
    }
}

/// Height of a text row able to hold both glyph kinds.
pub const fn line_rows(height: FontHeight) -> usize {
    let rows = height.rows();
    if rows > DOUBLE_BYTE_SIZE {
        rows
    } else {
        DOUBLE_BYTE_SIZE
    }
}

fn blit_byte<F: FlushTarget>(
    canvas: &mut Canvas<F>,
    x: i32,
    y: i32,
    bits: u8,
    fg: Color,
    bg: Option<Color>,
) {
    for column in 0..ASCII_COLUMNS {
        let px = x.saturating_add(column as i32);
        if (bits << column) & 0x80 != 0 {
            canvas.plot(px, y, fg);
        } else if let Some(bg) = bg {
            canvas.plot(px, y, bg);
        }
    }
}

struct Truncating<'b, const N: usize>(&'b mut String<N>);

impl<const N: usize> fmt::Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.0.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}
