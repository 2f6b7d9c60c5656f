//! Terminal state: the authoritative grid model.
//!
//! `Terminal` owns the paged screen buffer, the cursor, the scrolling
//! region and left/right margins, charset and attribute state, and every
//! editing operation the dispatcher can invoke. All cursor movement funnels
//! through one clamping path, and every change is published to the shared
//! cursor snapshot for cross-thread readers.

use std::collections::HashMap;

use tracing::debug;
use unicode_width::UnicodeWidthChar;

use crate::charset::{Charset, CharsetState, NrcsState, Slot};
use crate::config::EngineConfig;
use crate::cursor::{Cursor, CursorSnapshot, CursorWatch};
use crate::screen::{Cell, ScreenBuffer};
use crate::style::{LineAttr, Style};

/// Saved cursor state (DECSC)
#[derive(Clone)]
struct SavedCursor {
    row: u16,
    col: u16,
    style: Style,
}

/// Terminal state holding all screen data
pub struct Terminal {
    screen: ScreenBuffer,
    cursor: Cursor,
    style: Style,
    charsets: CharsetState,
    nrcs: NrcsState,
    wraparound: bool,
    origin_mode: bool,
    margin_mode: bool,
    /// Scroll region (top, bottom) - 0-indexed, inclusive
    scroll_region: (u16, u16),
    /// Left/right margins (0-indexed, inclusive); effective only under
    /// margin mode
    margins: (u16, u16),
    line_attrs: HashMap<u16, LineAttr>,
    saved: Option<SavedCursor>,
    watch: CursorWatch,
}

impl Terminal {
    pub fn new(config: &EngineConfig) -> Self {
        let rows = config.rows;
        let cols = config.cols;
        let term = Self {
            screen: ScreenBuffer::new(rows, cols, config.max_pages),
            cursor: Cursor::new(rows, cols),
            style: Style::default(),
            charsets: CharsetState::default(),
            nrcs: NrcsState::new(config.nrcs_variant()),
            wraparound: true,
            origin_mode: false,
            margin_mode: false,
            scroll_region: (0, rows - 1),
            margins: (0, cols - 1),
            line_attrs: HashMap::new(),
            saved: None,
            watch: CursorWatch::new(),
        };
        term.publish_cursor();
        term
    }

    pub fn rows(&self) -> u16 {
        self.screen.rows()
    }

    pub fn cols(&self) -> u16 {
        self.screen.cols()
    }

    pub fn screen(&self) -> &ScreenBuffer {
        &self.screen
    }

    /// Current `(row, col, visible)`.
    pub fn cursor(&self) -> CursorSnapshot {
        (self.cursor.row(), self.cursor.col(), self.cursor.visible)
    }

    /// Handle for readers on other threads.
    pub fn watch(&self) -> CursorWatch {
        self.watch.clone()
    }

    pub fn current_style(&self) -> Style {
        self.style
    }

    pub fn line_attr(&self, row: u16) -> Option<LineAttr> {
        self.line_attrs.get(&row).copied()
    }

    pub fn commit(&mut self) {
        self.screen.commit();
    }

    pub fn clear_backbuffer(&mut self) {
        self.screen.clear_backbuffer();
    }

    fn left_bound(&self) -> u16 {
        if self.margin_mode {
            self.margins.0
        } else {
            0
        }
    }

    fn right_bound(&self) -> u16 {
        if self.margin_mode {
            self.margins.1
        } else {
            self.cols() - 1
        }
    }

    fn move_cursor(&mut self, row: u16, col: u16) {
        self.cursor.set(row, col);
        self.publish_cursor();
    }

    fn publish_cursor(&self) {
        self.watch
            .publish(self.cursor.row(), self.cursor.col(), self.cursor.visible);
    }

    fn blank_range(&mut self, row: u16, from: u16, to: u16) {
        for col in from..=to {
            self.screen.set(row, col, Cell::blank());
        }
    }

    fn blank_row_full(&mut self, row: u16) {
        self.blank_range(row, 0, self.cols() - 1);
    }

    // --- Text placement ---

    /// Map an incoming character through the active charset and NRCS.
    pub fn map_char(&self, ch: char) -> char {
        self.nrcs.map(self.charsets.map(ch))
    }

    /// Place a character at the cursor with the current style, then advance
    /// with margin-aware wraparound.
    pub fn put_char(&mut self, ch: char) {
        let width = ch.width().unwrap_or(0) as u16;
        if width == 0 {
            // Combining character - append to the previous cell
            self.append_to_previous_cell(ch);
            return;
        }

        let (row, col) = (self.cursor.row(), self.cursor.col());
        let right = self.right_bound();
        let style = self.style;

        self.fix_wide_char_overwrite(row, col);
        self.screen
            .set(row, col, Cell::new(ch.to_string(), width as u8, style));
        if width == 2 && col + 1 <= right {
            self.screen.set(row, col + 1, Cell::continuation(style));
        }

        let next = col + width;
        if next > right {
            if self.wraparound {
                let left = self.left_bound();
                self.move_cursor(row, left);
                self.move_down();
            } else {
                // No wrap - stick at the boundary
                self.move_cursor(row, right);
            }
        } else {
            self.move_cursor(row, next);
        }
    }

    /// Overwriting either half of a wide character blanks the other half.
    fn fix_wide_char_overwrite(&mut self, row: u16, col: u16) {
        let style = self.style;
        if col > 0 && self.screen.get(row, col).is_continuation() {
            self.screen.set(row, col - 1, Cell::new(" ", 1, style));
        }
        if self.screen.get(row, col).width == 2 && col + 1 < self.cols() {
            self.screen.set(row, col + 1, Cell::new(" ", 1, style));
        }
    }

    fn append_to_previous_cell(&mut self, ch: char) {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        if col > 0 {
            let mut cell = self.screen.get(row, col - 1).clone();
            cell.grapheme.push(ch);
            self.screen.set(row, col - 1, cell);
        }
    }

    /// Carriage return - move cursor to the line start (left margin aware)
    pub fn carriage_return(&mut self) {
        let left = self.left_bound();
        self.move_cursor(self.cursor.row(), left);
    }

    /// Line feed - move cursor down, scroll if at the region bottom
    pub fn linefeed(&mut self) {
        self.move_down();
    }

    /// Move down one row; at the scrolling-region bottom this scrolls the
    /// region up instead and the cursor stays put.
    pub fn move_down(&mut self) {
        let row = self.cursor.row();
        let (_, bottom) = self.scroll_region;
        if row == bottom {
            self.scroll_up(1);
        } else if row < self.rows() - 1 {
            self.move_cursor(row + 1, self.cursor.col());
        }
    }

    /// Backspace - erase the previous cell and step onto it
    pub fn backspace(&mut self) {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        let left = self.left_bound();
        if col > left {
            self.screen.set(row, col - 1, Cell::blank());
            self.move_cursor(row, col - 1);
        }
    }

    /// Horizontal tab - next tab stop (every 8 columns)
    pub fn horizontal_tab(&mut self) {
        let right = self.right_bound();
        let next = ((self.cursor.col() / 8) + 1) * 8;
        self.move_cursor(self.cursor.row(), next.min(right));
    }

    pub fn shift_in(&mut self) {
        self.charsets.shift_in();
    }

    pub fn shift_out(&mut self) {
        self.charsets.shift_out();
    }

    pub fn designate_charset(&mut self, slot: Slot, set: Charset) {
        self.charsets.designate(slot, set);
    }

    // --- Scrolling ---

    /// Scroll the region up by n lines, honoring left/right margins. The
    /// top row's content is discarded; the vacated bottom row is blanked.
    pub fn scroll_up(&mut self, n: u16) {
        let (top, bottom) = self.scroll_region;
        let (left, right) = (self.left_bound(), self.right_bound());
        let n = n.max(1).min(bottom - top + 1);

        for _ in 0..n {
            for r in top..bottom {
                for c in left..=right {
                    let cell = self.screen.get(r + 1, c).clone();
                    self.screen.set(r, c, cell);
                }
            }
            self.blank_range(bottom, left, right);
        }
    }

    /// Scroll the region down by n lines; mirror of `scroll_up`.
    pub fn scroll_down(&mut self, n: u16) {
        let (top, bottom) = self.scroll_region;
        let (left, right) = (self.left_bound(), self.right_bound());
        let n = n.max(1).min(bottom - top + 1);

        for _ in 0..n {
            for r in ((top + 1)..=bottom).rev() {
                for c in left..=right {
                    let cell = self.screen.get(r - 1, c).clone();
                    self.screen.set(r, c, cell);
                }
            }
            self.blank_range(top, left, right);
        }
    }

    // --- Cursor movement ---

    /// Absolute positioning with 0-based coordinates. Under origin mode the
    /// coordinates are relative to the region/margin origin.
    pub fn set_absolute_position(&mut self, row: u16, col: u16) {
        let (mut r, mut c) = (row, col);
        if self.origin_mode {
            r = r.saturating_add(self.scroll_region.0);
            c = c.saturating_add(self.left_bound());
        }
        let r = r.min(self.rows() - 1);
        let c = c.min(self.right_bound());
        self.move_cursor(r, c);
    }

    /// Set cursor position (1-indexed parameters)
    pub fn cursor_position(&mut self, row: u16, col: u16) {
        self.set_absolute_position(row.saturating_sub(1), col.saturating_sub(1));
    }

    pub fn cursor_up(&mut self, n: u16) {
        let row = self.cursor.row().saturating_sub(n.max(1));
        self.move_cursor(row, self.cursor.col());
    }

    pub fn cursor_down(&mut self, n: u16) {
        let row = self
            .cursor
            .row()
            .saturating_add(n.max(1))
            .min(self.rows() - 1);
        self.move_cursor(row, self.cursor.col());
    }

    pub fn cursor_forward(&mut self, n: u16) {
        let col = self
            .cursor
            .col()
            .saturating_add(n.max(1))
            .min(self.right_bound());
        self.move_cursor(self.cursor.row(), col);
    }

    pub fn cursor_back(&mut self, n: u16) {
        let left = self.left_bound();
        let col = self.cursor.col().saturating_sub(n.max(1)).max(left);
        self.move_cursor(self.cursor.row(), col);
    }

    /// CHA - cursor to absolute column (1-indexed)
    pub fn cursor_column(&mut self, col: u16) {
        let col = col.saturating_sub(1).min(self.right_bound());
        self.move_cursor(self.cursor.row(), col);
    }

    /// VPA - cursor to absolute row (1-indexed)
    pub fn cursor_row(&mut self, row: u16) {
        let row = row.saturating_sub(1).min(self.rows() - 1);
        self.move_cursor(row, self.cursor.col());
    }

    /// Index - cursor down, scroll if at the region bottom
    pub fn index(&mut self) {
        self.move_down();
    }

    /// Reverse index - cursor up, scroll down if at the region top
    pub fn reverse_index(&mut self) {
        let row = self.cursor.row();
        if row == self.scroll_region.0 {
            self.scroll_down(1);
        } else {
            self.cursor_up(1);
        }
    }

    /// NEL - next line
    pub fn next_line(&mut self) {
        self.carriage_return();
        self.linefeed();
    }

    pub fn save_cursor(&mut self) {
        self.saved = Some(SavedCursor {
            row: self.cursor.row(),
            col: self.cursor.col(),
            style: self.style,
        });
    }

    pub fn restore_cursor(&mut self) {
        if let Some(saved) = self.saved.clone() {
            self.style = saved.style;
            self.move_cursor(saved.row, saved.col);
        }
    }

    // --- Erase operations ---

    /// Erase in display. Mode 0: cursor to end, 1: start to cursor,
    /// 2: entire screen. The within-row portion honors margins; whole rows
    /// are cleared full width. The cursor does not move.
    pub fn erase_in_display(&mut self, mode: u16) {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        match mode {
            0 => {
                self.blank_range(row, col, self.right_bound());
                for r in (row + 1)..self.rows() {
                    self.blank_row_full(r);
                }
            }
            1 => {
                for r in 0..row {
                    self.blank_row_full(r);
                }
                self.blank_range(row, self.left_bound(), col);
            }
            2 | 3 => {
                for r in 0..self.rows() {
                    self.blank_row_full(r);
                }
                self.line_attrs.clear();
            }
            _ => debug!("ignoring erase-in-display mode {}", mode),
        }
    }

    /// Erase in line, honoring left/right margins. The cursor does not move.
    pub fn erase_in_line(&mut self, mode: u16) {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        match mode {
            0 => self.blank_range(row, col, self.right_bound()),
            1 => self.blank_range(row, self.left_bound(), col),
            2 => self.blank_range(row, self.left_bound(), self.right_bound()),
            _ => debug!("ignoring erase-in-line mode {}", mode),
        }
    }

    /// ECH - blank n cells rightward from the cursor, clamped to the right
    /// boundary, without moving the cursor.
    pub fn erase_chars(&mut self, n: u16) {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        let end = col.saturating_add(n.max(1) - 1).min(self.right_bound());
        self.blank_range(row, col, end);
    }

    // --- Line operations ---

    /// IL - insert n blank lines at the cursor row, shifting rows down
    /// within the scrolling region. No-op when the cursor is outside the
    /// region; at the region top this is exactly a region scroll-down.
    pub fn insert_lines(&mut self, n: u16) {
        let (top, bottom) = self.scroll_region;
        let row = self.cursor.row();
        if row < top || row > bottom {
            return;
        }
        let n = n.max(1).min(bottom - row + 1);
        let (left, right) = (self.left_bound(), self.right_bound());

        for r in ((row + n)..=bottom).rev() {
            for c in left..=right {
                let cell = self.screen.get(r - n, c).clone();
                self.screen.set(r, c, cell);
            }
        }
        for r in row..(row + n) {
            self.blank_range(r, left, right);
        }
    }

    /// DL - delete n lines at the cursor row, shifting rows up within the
    /// scrolling region and blanking the vacated bottom rows.
    pub fn delete_lines(&mut self, n: u16) {
        let (top, bottom) = self.scroll_region;
        let row = self.cursor.row();
        if row < top || row > bottom {
            return;
        }
        let n = n.max(1).min(bottom - row + 1);
        let (left, right) = (self.left_bound(), self.right_bound());

        if n <= bottom - row {
            for r in row..=(bottom - n) {
                for c in left..=right {
                    let cell = self.screen.get(r + n, c).clone();
                    self.screen.set(r, c, cell);
                }
            }
        }
        for r in (bottom + 1 - n)..=bottom {
            self.blank_range(r, left, right);
        }
    }

    /// ICH - insert n blank cells at the cursor, shifting the rest of the
    /// row right within the margins.
    pub fn insert_chars(&mut self, n: u16) {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        let right = self.right_bound();
        if col > right {
            return;
        }
        let n = n.max(1).min(right - col + 1);

        for c in ((col + n)..=right).rev() {
            let cell = self.screen.get(row, c - n).clone();
            self.screen.set(row, c, cell);
        }
        self.blank_range(row, col, col + n - 1);
    }

    /// DCH - delete n cells at the cursor, shifting the rest of the row
    /// left within the margins and blanking the vacated tail.
    pub fn delete_chars(&mut self, n: u16) {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        let right = self.right_bound();
        if col > right {
            return;
        }
        let n = n.max(1).min(right - col + 1);

        if n <= right - col {
            for c in col..=(right - n) {
                let cell = self.screen.get(row, c + n).clone();
                self.screen.set(row, c, cell);
            }
        }
        self.blank_range(row, right + 1 - n, right);
    }

    // --- Rectangular operations ---

    /// DECFRA - fill a rectangle (1-based inclusive corners) with a
    /// character in the default style. Rejected whole when any part lies
    /// outside the buffer.
    pub fn fill_rect(&mut self, ch: char, top: u16, left: u16, bottom: u16, right: u16) {
        if top == 0
            || left == 0
            || top > bottom
            || left > right
            || bottom > self.rows()
            || right > self.cols()
        {
            debug!(
                "rejecting fill of rectangle ({},{})-({},{})",
                top, left, bottom, right
            );
            return;
        }
        let cell = Cell::new(ch.to_string(), 1, Style::default());
        for r in (top - 1)..bottom {
            for c in (left - 1)..right {
                self.screen.set(r, c, cell.clone());
            }
        }
    }

    /// DECCRA - copy a rectangle, possibly across pages. Corners are
    /// min/max-corrected; both rectangles are validated before any cell is
    /// touched. The destination page stays current only when it is a
    /// visible page (1 or 2); otherwise the previously current page is
    /// restored.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_rect(
        &mut self,
        top: u16,
        left: u16,
        bottom: u16,
        right: u16,
        dest_top: u16,
        dest_left: u16,
        src_page: u16,
        dest_page: u16,
    ) {
        let (top, bottom) = (top.min(bottom), top.max(bottom));
        let (left, right) = (left.min(right), left.max(right));
        if top == 0 || left == 0 || dest_top == 0 || dest_left == 0 {
            debug!("rejecting copy with zero rectangle coordinate");
            return;
        }
        let height = bottom - top + 1;
        let width = right - left + 1;
        if bottom > self.rows()
            || right > self.cols()
            || dest_top as u32 + height as u32 - 1 > self.rows() as u32
            || dest_left as u32 + width as u32 - 1 > self.cols() as u32
            || !self.screen.page_in_range(src_page)
            || !self.screen.page_in_range(dest_page)
        {
            debug!(
                "rejecting copy ({},{})-({},{}) page {} -> ({},{}) page {}",
                top, left, bottom, right, src_page, dest_top, dest_left, dest_page
            );
            return;
        }

        let original = self.screen.current_page();
        self.screen.switch_to_page(src_page);
        let mut snapshot = Vec::with_capacity(height as usize);
        for r in 0..height {
            let mut cells = Vec::with_capacity(width as usize);
            for c in 0..width {
                cells.push(self.screen.get(top - 1 + r, left - 1 + c).clone());
            }
            snapshot.push(cells);
        }

        self.screen.switch_to_page(dest_page);
        for (r, cells) in snapshot.into_iter().enumerate() {
            for (c, cell) in cells.into_iter().enumerate() {
                self.screen
                    .set(dest_top - 1 + r as u16, dest_left - 1 + c as u16, cell);
            }
        }

        // Pages 1 and 2 are display surfaces; higher pages stay background.
        if dest_page > 2 {
            self.screen.switch_to_page(original);
        }
    }

    // --- Regions, margins, modes ---

    /// DECSTBM - set the scrolling region (1-indexed, 0 meaning default)
    /// and home the cursor to the region/margin origin.
    pub fn set_scroll_region(&mut self, top: u16, bottom: u16) {
        let rows = self.rows();
        let top = top.max(1) - 1;
        let bottom = if bottom == 0 || bottom > rows {
            rows - 1
        } else {
            bottom - 1
        };
        if top >= bottom {
            debug!("ignoring scroll region {}..{}", top, bottom);
            return;
        }
        self.scroll_region = (top, bottom);
        self.set_absolute_position(0, 0);
    }

    /// DECSLRM - set left/right margins (1-indexed, 0 meaning default) and
    /// home the cursor. Effective only while margin mode is enabled.
    pub fn set_margins(&mut self, left: u16, right: u16) {
        if !self.margin_mode {
            debug!("ignoring margin set without margin mode");
            return;
        }
        let cols = self.cols();
        let left = left.max(1) - 1;
        let right = if right == 0 || right > cols {
            cols - 1
        } else {
            right - 1
        };
        if left >= right {
            debug!("ignoring margins {}..{}", left, right);
            return;
        }
        self.margins = (left, right);
        self.set_absolute_position(0, 0);
    }

    pub fn scroll_region(&self) -> (u16, u16) {
        self.scroll_region
    }

    /// Left/right margins if margin mode is enabled.
    pub fn left_right_margins(&self) -> Option<(u16, u16)> {
        if self.margin_mode {
            Some(self.margins)
        } else {
            None
        }
    }

    pub fn origin_mode(&self) -> bool {
        self.origin_mode
    }

    pub fn wraparound(&self) -> bool {
        self.wraparound
    }

    /// Set private mode
    pub fn set_private_mode(&mut self, mode: u16, enable: bool) {
        match mode {
            6 => {
                self.origin_mode = enable;
                self.set_absolute_position(0, 0);
            }
            // ?7: inverted DECAWM sense kept for legacy hosts - h disables
            // wraparound, l enables it.
            7 => self.wraparound = !enable,
            25 => {
                self.cursor.visible = enable;
                self.publish_cursor();
            }
            42 => self.nrcs.enabled = enable,
            69 => {
                self.margin_mode = enable;
                self.margins = (0, self.cols() - 1);
            }
            _ => debug!("ignoring unknown private mode ?{}", mode),
        }
    }

    /// Mark or clear the line attribute of the cursor row.
    pub fn set_line_attr(&mut self, attr: Option<LineAttr>) {
        let row = self.cursor.row();
        match attr {
            Some(a) => {
                self.line_attrs.insert(row, a);
            }
            None => {
                self.line_attrs.remove(&row);
            }
        }
        self.screen.mark_dirty(row);
    }

    pub fn apply_sgr(&mut self, params: &[u16]) {
        self.style.apply_sgr(params);
    }

    /// RIS - full reset. The cursor watch survives so existing handles keep
    /// working.
    pub fn full_reset(&mut self) {
        let rows = self.rows();
        let cols = self.cols();
        let variant = self.nrcs.variant;
        self.screen = ScreenBuffer::new(rows, cols, self.screen.max_pages());
        self.cursor = Cursor::new(rows, cols);
        self.style = Style::default();
        self.charsets = CharsetState::default();
        self.nrcs = NrcsState::new(variant);
        self.wraparound = true;
        self.origin_mode = false;
        self.margin_mode = false;
        self.scroll_region = (0, rows - 1);
        self.margins = (0, cols - 1);
        self.line_attrs.clear();
        self.saved = None;
        self.publish_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    fn term() -> Terminal {
        Terminal::new(&EngineConfig::default())
    }

    fn row_text(term: &Terminal, row: u16) -> String {
        (0..term.cols())
            .map(|c| term.screen().get(row, c).c())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    fn write_str(term: &mut Terminal, s: &str) {
        for ch in s.chars() {
            term.put_char(ch);
        }
    }

    #[test]
    fn erase_chars_blanks_without_moving_cursor() {
        let mut t = term();
        write_str(&mut t, "AB");
        t.set_absolute_position(0, 0);

        t.erase_chars(2);
        assert_eq!(*t.screen().get(0, 0), Cell::blank());
        assert_eq!(*t.screen().get(0, 1), Cell::blank());
        assert_eq!(t.cursor(), (0, 0, true));
    }

    #[test]
    fn linefeed_at_region_bottom_scrolls_region_only() {
        let mut t = term();
        for r in 0..t.rows() {
            t.set_absolute_position(r, 0);
            write_str(&mut t, &format!("line{}", r));
        }
        // Region rows 5..=10, cursor at row 10.
        t.set_scroll_region(6, 11);
        t.set_absolute_position(10, 0);
        t.linefeed();

        // Row 5's old content is gone; 6..=10 shifted up; 10 blank.
        assert_eq!(row_text(&t, 5), "line6");
        assert_eq!(row_text(&t, 9), "line10");
        assert_eq!(row_text(&t, 10), "");
        // Rows outside the region are untouched.
        assert_eq!(row_text(&t, 4), "line4");
        assert_eq!(row_text(&t, 11), "line11");
        // Cursor stays on the bottom row.
        assert_eq!(t.cursor().0, 10);
    }

    #[test]
    fn linefeed_below_region_does_not_scroll() {
        let mut t = term();
        t.set_scroll_region(1, 5);
        t.set_absolute_position(10, 0);
        write_str(&mut t, "keep");
        t.set_absolute_position(10, 0);
        t.linefeed();
        assert_eq!(t.cursor().0, 11);
        assert_eq!(row_text(&t, 10), "keep");
    }

    #[test]
    fn erase_entire_screen_yields_default_cells() {
        let mut t = term();
        for r in 0..t.rows() {
            t.set_absolute_position(r, 0);
            write_str(&mut t, "xxxx");
        }
        t.set_private_mode(69, true);
        t.set_margins(10, 40);
        t.erase_in_display(2);

        for r in 0..t.rows() {
            for c in 0..t.cols() {
                assert_eq!(*t.screen().get(r, c), Cell::blank());
            }
        }
    }

    #[test]
    fn erase_to_end_of_screen_is_margin_aware_in_row() {
        let mut t = term();
        t.set_private_mode(69, true);
        t.set_margins(3, 10);
        // Fill row 2 full width, outside margins included.
        for c in 0..t.cols() {
            t.screen.set(2, c, Cell::new("x", 1, Style::default()));
        }
        t.set_absolute_position(2, 2);
        t.erase_in_display(0);

        // Within the cursor row, only up to the right margin is cleared.
        assert_eq!(t.screen().get(2, 4).c(), ' ');
        assert_eq!(t.screen().get(2, 9).c(), ' ');
        assert_eq!(t.screen().get(2, 10).c(), 'x');
        // Rows below are cleared full width.
        for c in 0..t.cols() {
            assert_eq!(t.screen().get(3, c).c(), ' ');
        }
    }

    #[test]
    fn insert_then_delete_lines_roundtrips() {
        let mut t = term();
        for r in 0..t.rows() {
            t.set_absolute_position(r, 0);
            write_str(&mut t, &format!("row{}", r));
        }
        let before: Vec<String> = (0..t.rows()).map(|r| row_text(&t, r)).collect();

        t.set_scroll_region(3, 20);
        t.set_absolute_position(5, 0);
        t.insert_lines(4);
        t.delete_lines(4);

        // Rows 16..=19 were pushed past the region bottom and blanked, so
        // restrict the check to rows the shift kept (an unclamped insert).
        for r in 0..16u16 {
            assert_eq!(row_text(&t, r), before[r as usize], "row {}", r);
        }
    }

    #[test]
    fn insert_lines_outside_region_is_noop() {
        let mut t = term();
        t.set_absolute_position(0, 0);
        write_str(&mut t, "top");
        t.set_scroll_region(5, 10);
        t.set_absolute_position(0, 0);
        t.insert_lines(1);
        assert_eq!(row_text(&t, 0), "top");
    }

    #[test]
    fn insert_lines_at_region_top_equals_scroll_down() {
        let mut t = term();
        for r in 4..=9 {
            t.set_absolute_position(r, 0);
            write_str(&mut t, &format!("r{}", r));
        }
        t.set_scroll_region(5, 10);
        t.set_absolute_position(4, 0);
        t.insert_lines(1);

        assert_eq!(row_text(&t, 4), "");
        assert_eq!(row_text(&t, 5), "r4");
        assert_eq!(row_text(&t, 9), "r8");
    }

    #[test]
    fn copy_rect_same_page() {
        let mut t = term();
        for r in 5..=7u16 {
            for c in 5..=7u16 {
                t.screen.set(
                    r,
                    c,
                    Cell::new(format!("{}", (r + c) % 10), 1, Style::default()),
                );
            }
        }
        // 1-based corners: (6,6)-(8,8) -> destination (11,11).
        t.copy_rect(6, 6, 8, 8, 11, 11, 1, 1);

        for r in 0..3u16 {
            for c in 0..3u16 {
                assert_eq!(
                    t.screen().get(10 + r, 10 + c),
                    t.screen().get(5 + r, 5 + c),
                    "copy mismatch at offset ({},{})",
                    r,
                    c
                );
            }
        }
        // Source is unchanged (copy, not move).
        assert_eq!(t.screen().get(5, 5).c(), '0');
    }

    #[test]
    fn copy_rect_across_pages_restores_current_page() {
        let mut t = term();
        write_str(&mut t, "AB");
        // Copy (1,1)-(1,2) from page 1 to page 3; page 3 is background, so
        // page 1 must stay current.
        t.copy_rect(1, 1, 1, 2, 1, 1, 1, 3);
        assert_eq!(t.screen().current_page(), 1);

        // The destination page received the cells.
        t.screen.switch_to_page(3);
        assert_eq!(t.screen().get(0, 0).c(), 'A');
        assert_eq!(t.screen().get(0, 1).c(), 'B');
    }

    #[test]
    fn copy_rect_to_page_two_stays_there() {
        let mut t = term();
        t.copy_rect(1, 1, 2, 2, 1, 1, 1, 2);
        assert_eq!(t.screen().current_page(), 2);
    }

    #[test]
    fn copy_rect_out_of_bounds_is_rejected_whole() {
        let mut t = term();
        write_str(&mut t, "AB");
        let before = t.screen().get(0, 0).clone();
        // Destination overflows the grid: nothing may change.
        t.copy_rect(1, 1, 3, 3, 24, 79, 1, 1);
        assert_eq!(*t.screen().get(0, 0), before);
        assert_eq!(t.screen().current_page(), 1);
    }

    #[test]
    fn fill_rect_validates_and_fills() {
        let mut t = term();
        t.fill_rect('*', 2, 2, 4, 4);
        for r in 1..=3u16 {
            for c in 1..=3u16 {
                assert_eq!(t.screen().get(r, c).c(), '*');
            }
        }
        assert_eq!(t.screen().get(0, 0).c(), ' ');

        // Out of bounds: rejected as a whole.
        t.fill_rect('!', 1, 1, 100, 2);
        assert_eq!(t.screen().get(0, 0).c(), ' ');
    }

    #[test]
    fn origin_mode_positions_relative_to_region() {
        let mut t = term();
        t.set_scroll_region(6, 11);
        t.set_private_mode(6, true);
        // Home goes to the region origin.
        assert_eq!(t.cursor().0, 5);

        t.cursor_position(2, 10);
        assert_eq!(t.cursor(), (6, 9, true));
    }

    #[test]
    fn margin_aware_wrap() {
        let mut t = term();
        t.set_private_mode(69, true);
        t.set_margins(5, 10);
        t.set_absolute_position(0, 8);
        write_str(&mut t, "abc");

        // 'b' lands on the right margin and wraps the cursor to the left
        // margin of the next row, where 'c' continues.
        assert_eq!(t.screen().get(0, 9).c(), 'b');
        assert_eq!(t.screen().get(1, 4).c(), 'c');
        assert_eq!(t.cursor(), (1, 5, true));
    }

    #[test]
    fn wraparound_disabled_sticks_at_boundary() {
        let mut t = term();
        // ?7h disables wraparound.
        t.set_private_mode(7, true);
        t.set_absolute_position(0, 78);
        write_str(&mut t, "abcdef");

        assert_eq!(t.cursor(), (0, 79, true));
        assert_eq!(t.screen().get(0, 79).c(), 'f');
    }

    #[test]
    fn wide_char_writes_continuation() {
        let mut t = term();
        t.put_char('漢');
        assert_eq!(t.screen().get(0, 0).c(), '漢');
        assert!(t.screen().get(0, 1).is_continuation());
        assert_eq!(t.cursor().1, 2);
    }

    #[test]
    fn backspace_erases_and_steps_back() {
        let mut t = term();
        write_str(&mut t, "AB");
        t.backspace();
        assert_eq!(t.cursor(), (0, 1, true));
        assert_eq!(*t.screen().get(0, 1), Cell::blank());
        assert_eq!(t.screen().get(0, 0).c(), 'A');
    }

    #[test]
    fn save_restore_cursor_and_style() {
        let mut t = term();
        t.apply_sgr(&[1, 31]);
        t.set_absolute_position(4, 8);
        t.save_cursor();

        t.apply_sgr(&[0]);
        t.set_absolute_position(0, 0);
        t.restore_cursor();

        assert_eq!(t.cursor(), (4, 8, true));
        assert_eq!(t.current_style().fg, Color::Indexed(1));
    }

    #[test]
    fn line_attr_set_and_clear() {
        let mut t = term();
        t.set_absolute_position(3, 0);
        t.set_line_attr(Some(LineAttr::DoubleWidth));
        assert_eq!(t.line_attr(3), Some(LineAttr::DoubleWidth));

        // Double-height replaces double-width; one attribute per row.
        t.set_line_attr(Some(LineAttr::DoubleHeightTop));
        assert_eq!(t.line_attr(3), Some(LineAttr::DoubleHeightTop));

        t.set_line_attr(None);
        assert_eq!(t.line_attr(3), None);
    }

    #[test]
    fn full_reset_restores_defaults() {
        let mut t = term();
        t.apply_sgr(&[7]);
        t.set_scroll_region(5, 10);
        t.set_private_mode(6, true);
        write_str(&mut t, "junk");

        t.full_reset();
        assert_eq!(t.cursor(), (0, 0, true));
        assert!(!t.origin_mode());
        assert_eq!(t.scroll_region(), (0, t.rows() - 1));
        assert_eq!(*t.screen().get(0, 0), Cell::blank());
        assert_eq!(t.current_style(), Style::default());
    }
}
