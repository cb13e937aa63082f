//! Indexed framebuffer with bounded drawing primitives.
//!
//! Pixels are one byte each, addressed `x + y * width`. Every mutation goes
//! through [`Canvas::plot`], which drops out-of-bounds writes and writes into a
//! released buffer, so callers never need to clip themselves.

use alloc::vec::Vec;

use log::{info, warn};

/// 8-bit indexed color.
pub type Color = u8;

/// Color a fresh buffer is filled with.
pub const BLANK: Color = 0xFF;
/// Default ink color.
pub const INK: Color = 0x00;

/// Inclusive rectangle in canvas coordinates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl Rect {
    pub const fn width(&self) -> usize {
        self.x1 - self.x0 + 1
    }

    pub const fn height(&self) -> usize {
        self.y1 - self.y0 + 1
    }
}

/// Transfers a region of the canvas to the physical display.
///
/// `rows` holds whole canvas rows `rect.y0..=rect.y1`, row-major, starting at
/// `(rect.x0, rect.y0)`. The call is synchronous.
pub trait FlushTarget {
    fn flush(&mut self, rows: &[u8], rect: Rect);
}

impl<F> FlushTarget for F
where
    F: FnMut(&[u8], Rect),
{
    fn flush(&mut self, rows: &[u8], rect: Rect) {
        self(rows, rect)
    }
}

/// Backing storage of a canvas.
///
/// An external low-memory handler may tear the heap buffer down or move the
/// canvas onto a statically placed emergency region between ticks.
enum Backing {
    Owned(Vec<u8>),
    Fallback(&'static mut [u8]),
    Released,
}

pub struct Canvas<F> {
    width: usize,
    height: usize,
    backing: Backing,
    flush: F,
    repaint_requested: bool,
}

impl<F> Canvas<F>
where
    F: FlushTarget,
{
    /// Allocates a blank buffer and pushes it to the display once.
    ///
    /// When the buffer cannot be allocated the canvas starts released and all
    /// drawing is a no-op until [`Canvas::restore`] succeeds.
    pub fn new(width: usize, height: usize, flush: F) -> Self {
        let backing = match blank_buffer(width * height) {
            Some(buffer) => Backing::Owned(buffer),
            None => {
                warn!("canvas: cannot allocate {}x{} buffer", width, height);
                Backing::Released
            }
        };

        let mut canvas = Self {
            width,
            height,
            backing,
            flush,
            repaint_requested: false,
        };
        canvas.flush_all();
        canvas
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_released(&self) -> bool {
        matches!(self.backing, Backing::Released)
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.backing, Backing::Fallback(_))
    }

    /// Current pixels, `None` while released.
    pub fn pixels(&self) -> Option<&[u8]> {
        pixels_of(&self.backing, self.width * self.height)
    }

    /// Reads one pixel.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels().map(|pixels| pixels[x + y * self.width])
    }

    pub fn flush_target(&self) -> &F {
        &self.flush
    }

    pub fn flush_target_mut(&mut self) -> &mut F {
        &mut self.flush
    }

    /// Sets one pixel and flushes its row.
    pub fn point(&mut self, x: i32, y: i32, color: Color) {
        self.plot(x, y, color);
        self.flush_rows(y, y);
    }

    /// Draws a line segment and flushes the rows it spans.
    ///
    /// Horizontal and vertical segments are drawn inclusively and expect
    /// `x0 <= x1` / `y0 <= y1`. Any other segment goes through a running-error
    /// rasterizer that only steps right and down: it requires `x0 < x1`
    /// (callers normalize endpoints first), plots `x1 - x0` pixels and does not
    /// plot the end point itself.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        self.plot_line(x0, y0, x1, y1, color);
        self.flush_rows(y0, y1);
    }

    /// Draws an optionally filled, optionally bordered box with inclusive
    /// corners. `None` leaves that part untouched.
    pub fn draw_box(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        border: Option<Color>,
        fill: Option<Color>,
    ) {
        if let Some(fill) = fill {
            for y in y0.max(0)..=y1.min(self.last_row()) {
                self.plot_line(x0, y, x1, y, fill);
            }
        }

        if let Some(border) = border {
            self.plot_line(x0, y0, x1, y0, border);
            self.plot_line(x0, y1, x1, y1, border);
            self.plot_line(x0, y0, x0, y1, border);
            self.plot_line(x1, y0, x1, y1, border);
        }

        self.flush_rows(y0, y1);
    }

    /// Copies a row-major `width x height` bitmap to `(x0, y0)`.
    ///
    /// Pixels missing from a short `pixels` slice are skipped.
    pub fn bitmap(&mut self, x0: i32, y0: i32, width: usize, height: usize, pixels: &[u8]) {
        if width == 0 || height == 0 {
            return;
        }

        for (index, &color) in pixels.iter().take(width.saturating_mul(height)).enumerate() {
            let x = i64::from(x0) + (index % width) as i64;
            let y = i64::from(y0) + (index / width) as i64;
            if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
                self.plot(x, y, color);
            }
        }

        self.flush_rows(y0, span_end(y0, height));
    }

    /// Fills the whole canvas and flushes it.
    pub fn clear(&mut self, color: Color) {
        self.fill(color);
        self.flush_all();
    }

    /// Drops the heap buffer (or detaches the fallback region).
    pub fn release(&mut self) {
        if !self.is_released() {
            info!("canvas: buffer released");
        }
        self.backing = Backing::Released;
    }

    /// Reallocates a blank heap buffer after [`Canvas::release`].
    ///
    /// Returns `true` when the canvas holds a buffer afterwards. A successful
    /// reallocation requests a repaint, see [`Canvas::take_repaint_request`].
    pub fn restore(&mut self) -> bool {
        if !self.is_released() {
            return true;
        }

        match blank_buffer(self.width * self.height) {
            Some(buffer) => {
                info!("canvas: buffer restored");
                self.backing = Backing::Owned(buffer);
                self.repaint_requested = true;
                true
            }
            None => {
                warn!("canvas: restore failed, still released");
                false
            }
        }
    }

    /// Moves drawing onto a fixed emergency region.
    ///
    /// Regions smaller than the canvas are rejected. The region is blanked and
    /// a repaint is requested.
    pub fn use_fallback(&mut self, region: &'static mut [u8]) -> bool {
        let len = self.width * self.height;
        if region.len() < len {
            warn!(
                "canvas: fallback region too small ({} < {})",
                region.len(),
                len
            );
            return false;
        }

        region[..len].fill(BLANK);
        info!("canvas: switched to fallback region");
        self.backing = Backing::Fallback(region);
        self.repaint_requested = true;
        true
    }

    /// Returns and clears the pending repaint flag.
    pub fn take_repaint_request(&mut self) -> bool {
        core::mem::take(&mut self.repaint_requested)
    }

    /// Pushes the whole canvas to the display.
    pub fn flush_all(&mut self) {
        self.flush_rows(0, self.height as i32 - 1);
    }

    pub(crate) fn plot(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 {
            return;
        }

        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }

        let index = x + y * self.width;
        if let Some(pixels) = pixels_of_mut(&mut self.backing, self.width * self.height) {
            pixels[index] = color;
        }
    }

    pub(crate) fn fill(&mut self, color: Color) {
        if let Some(pixels) = pixels_of_mut(&mut self.backing, self.width * self.height) {
            pixels.fill(color);
        }
    }

    /// Flushes rows between `y0` and `y1` (either order), clipped to the
    /// canvas.
    pub(crate) fn flush_rows(&mut self, y0: i32, y1: i32) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        let top = y0.min(y1).max(0) as usize;
        let bottom = y0.max(y1);
        if bottom < 0 || top >= self.height {
            return;
        }
        let bottom = (bottom as usize).min(self.height - 1);

        let Some(pixels) = pixels_of(&self.backing, self.width * self.height) else {
            return;
        };

        let rows = &pixels[top * self.width..(bottom + 1) * self.width];
        self.flush.flush(
            rows,
            Rect {
                x0: 0,
                y0: top,
                x1: self.width - 1,
                y1: bottom,
            },
        );
    }

    fn plot_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        if y0 == y1 {
            for x in x0.max(0)..=x1.min(self.last_column()) {
                self.plot(x, y0, color);
            }
            return;
        }

        if x0 == x1 {
            for y in y0.max(0)..=y1.min(self.last_row()) {
                self.plot(x0, y, color);
            }
            return;
        }

        // Widened so far-off endpoints cannot overflow the error term.
        let dx = i64::from(x1) - i64::from(x0);
        let dy = i64::from(y1) - i64::from(y0);
        let mut error = -dx;
        let (mut x, mut y) = (i64::from(x0), i64::from(y0));
        let (right, bottom) = (i64::from(self.last_column()), i64::from(self.last_row()));

        for _ in 0..dx {
            // x and y never decrease.
            if x > right || y > bottom {
                break;
            }
            // Both stay within [x0, x1) and [y0, y1], so they fit in i32.
            self.plot(x as i32, y as i32, color);
            x += 1;
            error += 2 * dy;
            if error >= 0 {
                y += 1;
                error -= 2 * dx;
            }
        }
    }

    fn last_column(&self) -> i32 {
        i32::try_from(self.width).unwrap_or(i32::MAX) - 1
    }

    fn last_row(&self) -> i32 {
        i32::try_from(self.height).unwrap_or(i32::MAX) - 1
    }
}

/// Last coordinate of a `len`-long span starting at `start`, saturating at the
/// `i32` range.
pub(crate) fn span_end(start: i32, len: usize) -> i32 {
    start
        .saturating_add(i32::try_from(len).unwrap_or(i32::MAX))
        .saturating_sub(1)
}

fn blank_buffer(len: usize) -> Option<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).ok()?;
    buffer.resize(len, BLANK);
    Some(buffer)
}

fn pixels_of(backing: &Backing, len: usize) -> Option<&[u8]> {
    match backing {
        Backing::Owned(buffer) => Some(&buffer[..len]),
        Backing::Fallback(region) => Some(&region[..len]),
        Backing::Released => None,
    }
}

fn pixels_of_mut(backing: &mut Backing, len: usize) -> Option<&mut [u8]> {
    match backing {
        Backing::Owned(buffer) => Some(&mut buffer[..len]),
        Backing::Fallback(region) => Some(&mut region[..len]),
        Backing::Released => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Flush target that remembers every flushed rectangle.
    #[derive(Default)]
    pub(crate) struct FlushLog {
        pub(crate) rects: Vec<Rect>,
    }

    impl FlushTarget for FlushLog {
        fn flush(&mut self, rows: &[u8], rect: Rect) {
            assert_eq!(rows.len(), rect.width() * rect.height());
            self.rects.push(rect);
        }
    }

    fn canvas(width: usize, height: usize) -> Canvas<FlushLog> {
        Canvas::new(width, height, FlushLog::default())
    }

    fn inked(canvas: &Canvas<FlushLog>) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                if canvas.pixel(x, y) == Some(INK) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn new_canvas_is_blank_and_flushed_once() {
        let canvas = canvas(8, 4);

        assert!(canvas.pixels().unwrap().iter().all(|&px| px == BLANK));
        assert_eq!(
            canvas.flush_target().rects,
            vec![Rect {
                x0: 0,
                y0: 0,
                x1: 7,
                y1: 3
            }]
        );
    }

    #[test]
    fn out_of_bounds_point_is_dropped() {
        let mut canvas = canvas(4, 4);

        canvas.point(-1, 0, INK);
        canvas.point(4, 0, INK);
        canvas.point(0, 4, INK);

        assert!(inked(&canvas).is_empty());
    }

    #[test]
    fn point_flushes_only_its_row() {
        let mut canvas = canvas(4, 4);
        canvas.point(2, 1, INK);

        assert_eq!(canvas.pixel(2, 1), Some(INK));
        assert_eq!(
            canvas.flush_target().rects.last(),
            Some(&Rect {
                x0: 0,
                y0: 1,
                x1: 3,
                y1: 1
            })
        );
    }

    #[test]
    fn diagonal_line_matches_error_stepping() {
        let mut canvas = canvas(8, 8);
        canvas.line(0, 0, 4, 2, INK);

        assert_eq!(inked(&canvas), vec![(0, 0), (1, 1), (2, 1), (3, 2)]);

        let first = inked(&canvas);
        canvas.line(0, 0, 4, 2, INK);
        assert_eq!(inked(&canvas), first);
    }

    #[test]
    fn diagonal_line_is_clipped_to_canvas() {
        let mut canvas = canvas(3, 3);
        canvas.line(-2, 0, 6, 2, INK);

        for (x, y) in inked(&canvas) {
            assert!(x < 3 && y < 3);
        }
        assert_eq!(canvas.pixels().unwrap().len(), 9);
    }

    #[test]
    fn reversed_diagonal_draws_nothing() {
        let mut canvas = canvas(8, 8);
        canvas.line(4, 2, 0, 0, INK);

        assert!(inked(&canvas).is_empty());
    }

    #[test]
    fn far_off_endpoint_is_clipped_without_overflow() {
        let mut canvas = canvas(8, 8);
        canvas.line(0, 0, 3, 1_500_000_000, INK);

        assert_eq!(inked(&canvas), vec![(0, 0), (1, 1), (2, 2)]);
        assert_eq!(
            canvas.flush_target().rects.last(),
            Some(&Rect {
                x0: 0,
                y0: 0,
                x1: 7,
                y1: 7
            })
        );
    }

    #[test]
    fn extreme_coordinates_clip_instead_of_wrapping() {
        let mut canvas = canvas(4, 4);
        canvas.line(i32::MIN, 1, i32::MAX, 1, INK);
        canvas.line(2, i32::MIN, 2, i32::MAX, INK);
        canvas.draw_box(i32::MAX - 1, i32::MAX - 1, i32::MAX, i32::MAX, Some(INK), Some(INK));
        canvas.bitmap(i32::MAX - 1, i32::MAX - 1, 4, 4, &[INK; 16]);

        assert_eq!(
            inked(&canvas),
            vec![(2, 0), (0, 1), (1, 1), (2, 1), (3, 1), (2, 2), (2, 3)]
        );
    }

    #[test]
    fn horizontal_and_vertical_lines_are_inclusive() {
        let mut canvas = canvas(5, 5);
        canvas.line(1, 0, 3, 0, INK);
        canvas.line(0, 1, 0, 3, INK);

        assert_eq!(
            inked(&canvas),
            vec![(1, 0), (2, 0), (3, 0), (0, 1), (0, 2), (0, 3)]
        );
    }

    #[test]
    fn box_fill_and_border_use_separate_colors() {
        let mut canvas = canvas(5, 5);
        canvas.draw_box(0, 0, 4, 4, Some(INK), Some(0x80));

        assert_eq!(canvas.pixel(0, 0), Some(INK));
        assert_eq!(canvas.pixel(4, 2), Some(INK));
        assert_eq!(canvas.pixel(2, 2), Some(0x80));
        assert_eq!(
            canvas.flush_target().rects.last(),
            Some(&Rect {
                x0: 0,
                y0: 0,
                x1: 4,
                y1: 4
            })
        );
    }

    #[test]
    fn transparent_box_leaves_interior() {
        let mut canvas = canvas(5, 5);
        canvas.draw_box(1, 1, 3, 3, Some(INK), None);

        assert_eq!(canvas.pixel(2, 2), Some(BLANK));
        assert_eq!(canvas.pixel(1, 2), Some(INK));
    }

    #[test]
    fn bitmap_is_clipped() {
        let mut canvas = canvas(3, 3);
        canvas.bitmap(2, 2, 2, 2, &[1, 2, 3, 4]);

        assert_eq!(canvas.pixel(2, 2), Some(1));
        assert_eq!(canvas.pixel(1, 1), Some(BLANK));
    }

    #[test]
    fn released_canvas_ignores_draws_and_flushes() {
        let mut canvas = canvas(4, 4);
        let flushes = canvas.flush_target().rects.len();

        canvas.release();
        canvas.point(1, 1, INK);
        canvas.line(0, 0, 3, 3, INK);
        canvas.clear(INK);

        assert!(canvas.is_released());
        assert_eq!(canvas.pixels(), None);
        assert_eq!(canvas.flush_target().rects.len(), flushes);
    }

    #[test]
    fn restore_reallocates_blank_and_requests_repaint() {
        let mut canvas = canvas(4, 4);
        canvas.point(1, 1, INK);
        assert!(!canvas.take_repaint_request());

        canvas.release();
        assert!(canvas.restore());

        assert_eq!(canvas.pixel(1, 1), Some(BLANK));
        assert!(canvas.take_repaint_request());
        assert!(!canvas.take_repaint_request());
    }

    #[test]
    fn fallback_region_backs_drawing() {
        let region: &'static mut [u8] = Box::leak(vec![0u8; 32].into_boxed_slice());
        let mut canvas = canvas(4, 4);

        assert!(canvas.use_fallback(region));
        assert!(canvas.is_fallback());
        canvas.point(3, 3, INK);

        assert_eq!(canvas.pixel(3, 3), Some(INK));
        assert_eq!(canvas.pixel(0, 0), Some(BLANK));
        assert_eq!(canvas.pixels().unwrap().len(), 16);
    }

    #[test]
    fn short_fallback_region_is_rejected() {
        let region: &'static mut [u8] = Box::leak(vec![0u8; 3].into_boxed_slice());
        let mut canvas = canvas(4, 4);

        assert!(!canvas.use_fallback(region));
        assert!(!canvas.is_fallback());
    }

    #[test]
    fn closure_flush_target_receives_rects() {
        let mut seen = Vec::new();
        {
            let mut canvas = Canvas::new(2, 2, |_: &[u8], rect: Rect| seen.push(rect));
            canvas.point(0, 1, INK);
        }

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].y0, 1);
    }
}
