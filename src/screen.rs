//! Paged screen storage with committed/working separation.
//!
//! Every page holds two equally sized grids: the *working* grid that input
//! processing mutates freely, and the *committed* grid that a renderer
//! reads. `commit()` publishes dirty working rows to the committed grid;
//! nothing else does. Pages are created lazily, keyed by 1-based page
//! number, and all mutation targets the current page.
//!
//! Coordinates passed to this API must be in bounds; violating that is a
//! bug in the caller and fails loudly rather than clamping.

use std::collections::BTreeMap;

use crate::style::Style;

/// A single display cell: a short grapheme string plus the style token it
/// was written with. Cells compare by value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub grapheme: String,
    pub width: u8,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            grapheme: String::from(" "),
            width: 1,
            style: Style::default(),
        }
    }
}

impl Cell {
    pub fn new(grapheme: impl Into<String>, width: u8, style: Style) -> Self {
        Self {
            grapheme: grapheme.into(),
            width,
            style,
        }
    }

    /// The blank cell: a space in the default style.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Placeholder occupying the right half of a wide character.
    pub fn continuation(style: Style) -> Self {
        Self {
            grapheme: String::new(),
            width: 0,
            style,
        }
    }

    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Get the first character (or space if empty)
    pub fn c(&self) -> char {
        self.grapheme.chars().next().unwrap_or(' ')
    }

    /// Get the display string (space if empty)
    pub fn display_str(&self) -> &str {
        if self.grapheme.is_empty() {
            " "
        } else {
            &self.grapheme
        }
    }
}

/// One addressable screen surface.
struct Page {
    working: Vec<Vec<Cell>>,
    committed: Vec<Vec<Cell>>,
    dirty: Vec<bool>,
}

impl Page {
    /// A fresh page is fully dirty so its first commit publishes it whole.
    fn new(rows: u16, cols: u16) -> Self {
        let blank_row = vec![Cell::blank(); cols as usize];
        Self {
            working: vec![blank_row.clone(); rows as usize],
            committed: vec![blank_row; rows as usize],
            dirty: vec![true; rows as usize],
        }
    }
}

/// Paged screen buffer. All `get`/`set` traffic goes to the working grid of
/// the current page; `visible_*` accessors read the committed grid.
pub struct ScreenBuffer {
    rows: u16,
    cols: u16,
    pages: BTreeMap<u16, Page>,
    current: u16,
    max_pages: u16,
}

impl ScreenBuffer {
    pub fn new(rows: u16, cols: u16, max_pages: u16) -> Self {
        assert!(rows > 0 && cols > 0, "screen dimensions must be non-zero");
        assert!(max_pages >= 1, "at least one page is required");
        let mut pages = BTreeMap::new();
        pages.insert(1, Page::new(rows, cols));
        Self {
            rows,
            cols,
            pages,
            current: 1,
            max_pages,
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn max_pages(&self) -> u16 {
        self.max_pages
    }

    pub fn current_page(&self) -> u16 {
        self.current
    }

    /// Whether `n` is a page number this buffer will accept.
    pub fn page_in_range(&self, n: u16) -> bool {
        n >= 1 && n <= self.max_pages
    }

    fn page(&self) -> &Page {
        self.pages.get(&self.current).expect("current page exists")
    }

    fn page_mut(&mut self) -> &mut Page {
        self.pages
            .get_mut(&self.current)
            .expect("current page exists")
    }

    fn check_bounds(&self, row: u16, col: u16) {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row},{col}) out of bounds for {}x{} screen",
            self.rows,
            self.cols
        );
    }

    /// Read a working cell on the current page.
    pub fn get(&self, row: u16, col: u16) -> &Cell {
        self.check_bounds(row, col);
        &self.page().working[row as usize][col as usize]
    }

    /// Write a working cell on the current page. The row is marked dirty
    /// only when the new cell differs from the old one, so bulk writes of
    /// unchanged content never trigger a commit copy.
    pub fn set(&mut self, row: u16, col: u16, cell: Cell) {
        self.check_bounds(row, col);
        let page = self.page_mut();
        let slot = &mut page.working[row as usize][col as usize];
        if *slot != cell {
            *slot = cell;
            page.dirty[row as usize] = true;
        }
    }

    /// Mark a row dirty without a value compare. Whole-row operations
    /// (scrolling, line shifts) use this.
    pub fn mark_dirty(&mut self, row: u16) {
        assert!(row < self.rows, "row {row} out of bounds");
        self.page_mut().dirty[row as usize] = true;
    }

    /// Publish dirty working rows of the current page to its committed
    /// grid. Rows are copied whole; clean rows are untouched. Idempotent
    /// when nothing changed since the last commit.
    pub fn commit(&mut self) {
        let page = self.page_mut();
        for row in 0..page.dirty.len() {
            if page.dirty[row] {
                page.committed[row] = page.working[row].clone();
                page.dirty[row] = false;
            }
        }
    }

    /// Read a committed cell on the current page.
    pub fn visible_cell(&self, row: u16, col: u16) -> &Cell {
        self.check_bounds(row, col);
        &self.page().committed[row as usize][col as usize]
    }

    /// Read a whole committed row on the current page.
    pub fn visible_row(&self, row: u16) -> &[Cell] {
        assert!(row < self.rows, "row {row} out of bounds");
        &self.page().committed[row as usize]
    }

    /// Make page `n` current, creating it blank (and fully dirty) on first
    /// use. Page numbers are 1-based and bounded by the page cap.
    pub fn switch_to_page(&mut self, n: u16) {
        assert!(
            self.page_in_range(n),
            "page {n} outside valid range 1..={}",
            self.max_pages
        );
        self.pages
            .entry(n)
            .or_insert_with(|| Page::new(self.rows, self.cols));
        self.current = n;
    }

    /// Reset every working cell of the current page to the blank cell and
    /// mark all rows dirty.
    pub fn clear_backbuffer(&mut self) {
        let rows = self.rows;
        let cols = self.cols;
        let page = self.page_mut();
        for row in 0..rows as usize {
            for col in 0..cols as usize {
                page.working[row][col] = Cell::blank();
            }
            page.dirty[row] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{AttrFlags, Color};

    fn styled(ch: char) -> Cell {
        let style = Style {
            fg: Color::Indexed(2),
            bg: Color::Default,
            flags: AttrFlags::BOLD,
        };
        Cell::new(ch.to_string(), 1, style)
    }

    fn dirty_rows(buf: &ScreenBuffer) -> Vec<u16> {
        // A row is dirty iff committing changes the committed grid; probe
        // via the internal flag.
        let page = buf.pages.get(&buf.current).unwrap();
        page.dirty
            .iter()
            .enumerate()
            .filter(|(_, d)| **d)
            .map(|(i, _)| i as u16)
            .collect()
    }

    #[test]
    fn set_then_get_roundtrips() {
        let mut buf = ScreenBuffer::new(4, 4, 4);
        buf.set(2, 3, styled('A'));
        assert_eq!(*buf.get(2, 3), styled('A'));
    }

    #[test]
    fn set_unchanged_value_does_not_dirty() {
        let mut buf = ScreenBuffer::new(4, 4, 4);
        buf.commit();
        assert!(dirty_rows(&buf).is_empty());

        buf.set(1, 1, Cell::blank());
        assert!(dirty_rows(&buf).is_empty());

        buf.set(1, 1, styled('A'));
        assert_eq!(dirty_rows(&buf), vec![1]);
    }

    #[test]
    fn commit_publishes_and_is_idempotent() {
        let mut buf = ScreenBuffer::new(4, 4, 4);
        buf.set(0, 0, styled('X'));
        assert_eq!(*buf.visible_cell(0, 0), Cell::blank());

        buf.commit();
        assert_eq!(*buf.visible_cell(0, 0), styled('X'));
        assert!(dirty_rows(&buf).is_empty());

        // No writes since the last commit: nothing dirty, visible unchanged.
        buf.commit();
        assert_eq!(*buf.visible_cell(0, 0), styled('X'));
    }

    #[test]
    fn working_changes_invisible_until_commit() {
        let mut buf = ScreenBuffer::new(4, 4, 4);
        buf.commit();
        buf.set(3, 0, styled('Z'));
        assert_eq!(*buf.visible_cell(3, 0), Cell::blank());
        buf.commit();
        assert_eq!(*buf.visible_cell(3, 0), styled('Z'));
    }

    #[test]
    fn pages_are_independent() {
        let mut buf = ScreenBuffer::new(4, 4, 4);
        buf.set(0, 0, styled('A'));

        buf.switch_to_page(2);
        assert_eq!(buf.current_page(), 2);
        assert_eq!(*buf.get(0, 0), Cell::blank());
        buf.set(0, 0, styled('B'));

        buf.switch_to_page(1);
        assert_eq!(*buf.get(0, 0), styled('A'));
    }

    #[test]
    fn new_page_is_fully_dirty() {
        let mut buf = ScreenBuffer::new(2, 2, 4);
        buf.switch_to_page(3);
        assert_eq!(dirty_rows(&buf), vec![0, 1]);
    }

    #[test]
    fn clear_backbuffer_blanks_working_grid() {
        let mut buf = ScreenBuffer::new(3, 3, 4);
        buf.set(1, 1, styled('Q'));
        buf.commit();

        buf.clear_backbuffer();
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(*buf.get(row, col), Cell::blank());
            }
        }
        // Committed grid is untouched until the next commit.
        assert_eq!(*buf.visible_cell(1, 1), styled('Q'));
    }

    #[test]
    #[should_panic]
    fn out_of_range_get_panics() {
        let buf = ScreenBuffer::new(4, 4, 4);
        buf.get(4, 0);
    }

    #[test]
    #[should_panic]
    fn out_of_range_set_panics() {
        let mut buf = ScreenBuffer::new(4, 4, 4);
        buf.set(0, 4, Cell::blank());
    }

    #[test]
    #[should_panic]
    fn page_zero_panics() {
        let mut buf = ScreenBuffer::new(4, 4, 4);
        buf.switch_to_page(0);
    }
}
