//! Logical-line splitting and fixed-budget wrapping.
//!
//! The wrap budget counts bytes, not glyphs: a double-byte glyph takes two
//! bytes of budget and may be cut in half at a wrap boundary. Pagination is
//! derived from these boundaries, so they must stay byte-exact.

use alloc::vec::Vec;

use log::{debug, warn};

use crate::document::Document;

/// A wrapped row: a view into the document bytes, never a copy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DisplayLine {
    pub start: usize,
    pub len: usize,
}

impl DisplayLine {
    pub const fn end(&self) -> usize {
        self.start + self.len
    }
}

/// One terminator-delimited line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LogicalLine {
    pub start: usize,
    pub len: usize,
    /// Bytes of `\n` or `\r\n` consumed after the body, `0` for a final
    /// unterminated line.
    pub terminator: usize,
}

/// Iterates logical lines. A `\r` directly before `\n` belongs to the
/// terminator; a trailing run without `\n` is a line of its own.
#[derive(Clone, Debug)]
pub struct LogicalLines<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> LogicalLines<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }
}

impl Iterator for LogicalLines<'_> {
    type Item = LogicalLine;

    fn next(&mut self) -> Option<LogicalLine> {
        let start = self.cursor;
        if start >= self.bytes.len() {
            return None;
        }

        match self.bytes[start..].iter().position(|&b| b == b'\n') {
            Some(offset) => {
                let newline = start + offset;
                let (end, terminator) = if newline > start && self.bytes[newline - 1] == b'\r' {
                    (newline - 1, 2)
                } else {
                    (newline, 1)
                };
                self.cursor = newline + 1;
                Some(LogicalLine {
                    start,
                    len: end - start,
                    terminator,
                })
            }
            None => {
                self.cursor = self.bytes.len();
                Some(LogicalLine {
                    start,
                    len: self.bytes.len() - start,
                    terminator: 0,
                })
            }
        }
    }
}

/// Bytes per row for a canvas `width` and glyph `advance`, at least `1`.
pub const fn chars_per_line_for(width: usize, advance: usize) -> usize {
    let advance = if advance == 0 { 1 } else { advance };
    let per_line = width / advance;
    if per_line == 0 { 1 } else { per_line }
}

/// Display rows needed by a logical line of `len` bytes; empty lines still
/// take one.
pub fn wrapped_rows(len: usize, chars_per_line: usize) -> usize {
    if len == 0 {
        1
    } else {
        len.div_ceil(chars_per_line.max(1))
    }
}

/// Ordered display lines of one document for one wrap budget.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LayoutIndex {
    lines: Vec<DisplayLine>,
    chars_per_line: usize,
}

impl LayoutIndex {
    /// Lays out a document. See [`LayoutIndex::build`].
    pub fn for_document(document: &Document, chars_per_line: usize) -> Option<Self> {
        Self::build(document.as_bytes(), chars_per_line)
    }

    /// Splits `text` into logical lines and wraps them at `chars_per_line`
    /// bytes (`0` counts as `1`).
    ///
    /// The first pass counts rows so the index is allocated once; the second
    /// fills it. Both walk the same [`LogicalLines`]. Returns `None` when the
    /// index cannot be allocated.
    pub fn build(text: &[u8], chars_per_line: usize) -> Option<Self> {
        let chars_per_line = chars_per_line.max(1);
        let total: usize = LogicalLines::new(text)
            .map(|line| wrapped_rows(line.len, chars_per_line))
            .sum();

        let mut lines = Vec::new();
        if lines.try_reserve_exact(total).is_err() {
            warn!("layout: cannot allocate {} display lines", total);
            return None;
        }

        for logical in LogicalLines::new(text) {
            if logical.len == 0 {
                lines.push(DisplayLine {
                    start: logical.start,
                    len: 0,
                });
                continue;
            }

            let mut offset = 0;
            while offset < logical.len {
                let len = chars_per_line.min(logical.len - offset);
                lines.push(DisplayLine {
                    start: logical.start + offset,
                    len,
                });
                offset += len;
            }
        }

        debug_assert_eq!(lines.len(), total, "layout passes disagree");
        debug!(
            "layout: {} bytes -> {} display lines at {} bytes/line",
            text.len(),
            lines.len(),
            chars_per_line
        );

        Some(Self {
            lines,
            chars_per_line,
        })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn chars_per_line(&self) -> usize {
        self.chars_per_line
    }

    pub fn get(&self, index: usize) -> Option<&DisplayLine> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> &[DisplayLine] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn spans(text: &[u8], chars_per_line: usize) -> Vec<&[u8]> {
        let layout = LayoutIndex::build(text, chars_per_line).unwrap();
        layout
            .lines()
            .iter()
            .map(|line| &text[line.start..line.end()])
            .collect()
    }

    #[test]
    fn wraps_logical_lines_at_byte_budget() {
        assert_eq!(spans(b"AB\nCDE\n", 2), vec![b"AB".as_slice(), b"CD", b"E"]);
    }

    #[test]
    fn empty_logical_lines_take_a_row() {
        assert_eq!(spans(b"a\n\n\nb", 4), vec![b"a".as_slice(), b"", b"", b"b"]);
    }

    #[test]
    fn crlf_is_stripped_but_lone_cr_is_kept() {
        assert_eq!(spans(b"ab\r\ncd\re\n", 8), vec![b"ab".as_slice(), b"cd\re"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        let layout = LayoutIndex::build(b"", 10).unwrap();

        assert!(layout.is_empty());
    }

    #[test]
    fn zero_budget_counts_as_one() {
        let layout = LayoutIndex::build(b"abc", 0).unwrap();

        assert_eq!(layout.chars_per_line(), 1);
        assert_eq!(layout.len(), 3);
    }

    #[test]
    fn double_byte_pair_can_be_split_by_budget() {
        let text = [b'a', 0xD6, 0xD0, b'b'];

        assert_eq!(spans(&text, 2), vec![[b'a', 0xD6].as_slice(), &[0xD0, b'b']]);
    }

    #[test]
    fn chars_per_line_from_canvas_width() {
        assert_eq!(chars_per_line_for(400, 8), 50);
        assert_eq!(chars_per_line_for(5, 8), 1);
        assert_eq!(chars_per_line_for(400, 0), 400);
    }

    #[test]
    fn logical_lines_report_terminators() {
        let lines: Vec<_> = LogicalLines::new(b"a\r\nbb\nc").collect();

        assert_eq!(
            lines,
            vec![
                LogicalLine {
                    start: 0,
                    len: 1,
                    terminator: 2
                },
                LogicalLine {
                    start: 3,
                    len: 2,
                    terminator: 1
                },
                LogicalLine {
                    start: 6,
                    len: 1,
                    terminator: 0
                },
            ]
        );
    }

    proptest! {
        #[test]
        fn every_byte_is_a_body_or_terminator_byte(
            text in proptest::collection::vec(
                prop_oneof![Just(b'\n'), Just(b'\r'), Just(b'x'), Just(0xB0u8)],
                0..200,
            ),
            chars_per_line in 1usize..12,
        ) {
            let layout = LayoutIndex::build(&text, chars_per_line).unwrap();
            let body: usize = layout.lines().iter().map(|line| line.len).sum();
            let terminators: usize = LogicalLines::new(&text).map(|line| line.terminator).sum();

            prop_assert_eq!(body + terminators, text.len());
            for line in layout.lines() {
                prop_assert!(line.end() <= text.len());
                prop_assert!(line.len <= chars_per_line);
            }
        }

        #[test]
        fn layout_is_deterministic(
            text in proptest::collection::vec(any::<u8>(), 0..200),
            chars_per_line in 0usize..20,
        ) {
            prop_assert_eq!(
                LayoutIndex::build(&text, chars_per_line),
                LayoutIndex::build(&text, chars_per_line)
            );
        }
    }
}
