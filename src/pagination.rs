//! Page window over the display lines of a layout.

use core::ops::Range;

/// Current page plus the figures it is derived from.
///
/// `current_page < total_pages()` always holds, and an empty layout still has
/// one (blank) page.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageCursor {
    current_page: usize,
    lines_per_page: usize,
    total_lines: usize,
}

impl PageCursor {
    /// `lines_per_page == 0` counts as `1`.
    pub const fn new(total_lines: usize, lines_per_page: usize) -> Self {
        Self {
            current_page: 0,
            lines_per_page: if lines_per_page == 0 {
                1
            } else {
                lines_per_page
            },
            total_lines,
        }
    }

    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    pub const fn lines_per_page(&self) -> usize {
        self.lines_per_page
    }

    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub const fn total_pages(&self) -> usize {
        let pages = self.total_lines.div_ceil(self.lines_per_page);
        if pages == 0 { 1 } else { pages }
    }

    pub const fn is_last_page(&self) -> bool {
        self.current_page + 1 >= self.total_pages()
    }

    /// Display-line indices shown on the current page.
    pub fn visible_range(&self) -> Range<usize> {
        let start = (self.current_page * self.lines_per_page).min(self.total_lines);
        let end = (start + self.lines_per_page).min(self.total_lines);
        start..end
    }

    /// Returns `true` when the page changed.
    pub fn next_page(&mut self) -> bool {
        if self.is_last_page() {
            return false;
        }
        self.current_page += 1;
        true
    }

    /// Returns `true` when the page changed.
    pub fn prev_page(&mut self) -> bool {
        if self.current_page == 0 {
            return false;
        }
        self.current_page -= 1;
        true
    }

    /// Targets the line half a page below the top of the current page, then
    /// snaps to the page holding it. With integer division this lands back on
    /// a page boundary.
    pub fn next_half_page(&mut self) -> bool {
        let target = self.current_page * self.lines_per_page + self.lines_per_page / 2;
        self.show_line(target)
    }

    /// Mirror of [`PageCursor::next_half_page`]; targets above line `0` clamp
    /// to it.
    pub fn prev_half_page(&mut self) -> bool {
        let target = (self.current_page * self.lines_per_page).saturating_sub(self.lines_per_page / 2);
        self.show_line(target)
    }

    /// Moves to the page holding display line `line`, clamped to the last
    /// line. Returns `true` when the page changed.
    pub fn show_line(&mut self, line: usize) -> bool {
        let line = line.min(self.total_lines.saturating_sub(1));
        let page = line / self.lines_per_page;
        if page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty_layout_has_one_page() {
        let cursor = PageCursor::new(0, 10);

        assert_eq!(cursor.total_pages(), 1);
        assert_eq!(cursor.visible_range(), 0..0);
        assert!(cursor.is_last_page());
    }

    #[test]
    fn three_lines_two_per_page() {
        let mut cursor = PageCursor::new(3, 2);
        assert_eq!(cursor.total_pages(), 2);

        assert!(cursor.next_page());
        assert_eq!(cursor.current_page(), 1);
        assert_eq!(cursor.visible_range(), 2..3);

        assert!(!cursor.next_page());
        assert_eq!(cursor.current_page(), 1);
    }

    #[test]
    fn prev_page_stops_at_first_page() {
        let mut cursor = PageCursor::new(10, 3);

        assert!(!cursor.prev_page());
        assert_eq!(cursor.current_page(), 0);
    }

    #[test]
    fn zero_lines_per_page_counts_as_one() {
        let cursor = PageCursor::new(4, 0);

        assert_eq!(cursor.lines_per_page(), 1);
        assert_eq!(cursor.total_pages(), 4);
    }

    #[test]
    fn half_page_forward_snaps_back_to_current_page() {
        let mut cursor = PageCursor::new(20, 4);
        assert!(cursor.next_page());

        // 1 * 4 + 2 = line 6, still page 1.
        assert!(!cursor.next_half_page());
        assert_eq!(cursor.current_page(), 1);
    }

    #[test]
    fn half_page_back_lands_on_previous_page() {
        let mut cursor = PageCursor::new(20, 4);
        cursor.show_line(8);
        assert_eq!(cursor.current_page(), 2);

        // 2 * 4 - 2 = line 6, page 1.
        assert!(cursor.prev_half_page());
        assert_eq!(cursor.current_page(), 1);
    }

    #[test]
    fn odd_page_size_half_step() {
        let mut cursor = PageCursor::new(20, 1);

        // lines_per_page / 2 == 0: no movement either way.
        assert!(!cursor.next_half_page());
        assert!(!cursor.prev_half_page());
        assert_eq!(cursor.current_page(), 0);
    }

    #[test]
    fn show_line_clamps_to_last_line() {
        let mut cursor = PageCursor::new(5, 2);

        assert!(cursor.show_line(100));
        assert_eq!(cursor.current_page(), 2);
        assert_eq!(cursor.visible_range(), 4..5);
    }

    proptest! {
        #[test]
        fn page_stays_in_range(
            total_lines in 0usize..100,
            lines_per_page in 0usize..12,
            moves in proptest::collection::vec(0u8..4, 0..40),
        ) {
            let mut cursor = PageCursor::new(total_lines, lines_per_page);
            for step in moves {
                match step {
                    0 => { cursor.next_page(); }
                    1 => { cursor.prev_page(); }
                    2 => { cursor.next_half_page(); }
                    _ => { cursor.prev_half_page(); }
                }
                prop_assert!(cursor.total_pages() >= 1);
                prop_assert!(cursor.current_page() < cursor.total_pages());
            }
        }

        #[test]
        fn next_then_prev_round_trips_from_interior(
            total_lines in 1usize..100,
            lines_per_page in 1usize..12,
            start in 0usize..100,
        ) {
            let mut cursor = PageCursor::new(total_lines, lines_per_page);
            cursor.show_line(start);
            let page = cursor.current_page();

            if cursor.next_page() {
                prop_assert!(cursor.prev_page());
                prop_assert_eq!(cursor.current_page(), page);
            } else {
                prop_assert!(cursor.is_last_page());
            }
        }

        #[test]
        fn half_page_is_idempotent_at_extremes(
            total_lines in 0usize..100,
            lines_per_page in 1usize..12,
        ) {
            let mut cursor = PageCursor::new(total_lines, lines_per_page);
            cursor.prev_half_page();
            let first = cursor.current_page();
            cursor.prev_half_page();
            prop_assert_eq!(cursor.current_page(), first);

            cursor.show_line(usize::MAX);
            let last = cursor.current_page();
            cursor.next_half_page();
            prop_assert_eq!(cursor.current_page(), last);
            cursor.next_half_page();
            prop_assert_eq!(cursor.current_page(), last);
        }
    }
}
