//! Sequence dispatch.
//!
//! Routes every parsed sequence onto one terminal operation. The match is
//! exhaustive over the grammar's enum, so adding a sequence kind without a
//! dispatch route fails to compile. Unrecognized sequences are dropped with
//! a diagnostic and never disturb subsequent input.

use tracing::debug;

use crate::sequence::Sequence;
use crate::term::Terminal;

pub fn apply(term: &mut Terminal, seq: Sequence) {
    match seq {
        // Modes
        Sequence::PrivateMode { modes, enable } => {
            for mode in modes {
                term.set_private_mode(mode, enable);
            }
        }

        // Charset and line attributes
        Sequence::DesignateCharset { slot, set } => term.designate_charset(slot, set),
        Sequence::SetLineAttr(attr) => term.set_line_attr(attr),

        // Cursor movement
        Sequence::CursorPosition { row, col } => term.cursor_position(row, col),
        Sequence::CursorUp(n) => term.cursor_up(n),
        Sequence::CursorDown(n) => term.cursor_down(n),
        Sequence::CursorForward(n) => term.cursor_forward(n),
        Sequence::CursorBack(n) => term.cursor_back(n),
        Sequence::CursorNextLine(n) => {
            term.cursor_down(n);
            term.carriage_return();
        }
        Sequence::CursorPrevLine(n) => {
            term.cursor_up(n);
            term.carriage_return();
        }
        Sequence::CursorColumn(col) => term.cursor_column(col),
        Sequence::CursorRow(row) => term.cursor_row(row),
        Sequence::SaveCursor => term.save_cursor(),
        Sequence::RestoreCursor => term.restore_cursor(),
        Sequence::Index => term.index(),
        Sequence::NextLine => term.next_line(),
        Sequence::ReverseIndex => term.reverse_index(),
        Sequence::FullReset => term.full_reset(),

        // Erase
        Sequence::EraseDisplay(mode) => term.erase_in_display(mode),
        Sequence::EraseLine(mode) => term.erase_in_line(mode),
        Sequence::EraseChars(n) => term.erase_chars(n),

        // Line and character operations
        Sequence::InsertLines(n) => term.insert_lines(n),
        Sequence::DeleteLines(n) => term.delete_lines(n),
        Sequence::InsertChars(n) => term.insert_chars(n),
        Sequence::DeleteChars(n) => term.delete_chars(n),
        Sequence::ScrollUp(n) => term.scroll_up(n),
        Sequence::ScrollDown(n) => term.scroll_down(n),

        // Region and margins
        Sequence::SetScrollRegion { top, bottom } => term.set_scroll_region(top, bottom),
        Sequence::SetMargins { left, right } => term.set_margins(left, right),

        // Rectangular operations
        Sequence::FillRect {
            ch,
            top,
            left,
            bottom,
            right,
        } => term.fill_rect(ch, top, left, bottom, right),
        Sequence::CopyRect {
            top,
            left,
            bottom,
            right,
            dest_top,
            dest_left,
            src_page,
            dest_page,
        } => term.copy_rect(
            top, left, bottom, right, dest_top, dest_left, src_page, dest_page,
        ),

        // SGR
        Sequence::Sgr(params) => term.apply_sgr(&params),

        Sequence::Unrecognized(raw) => {
            debug!("unrecognized escape sequence: {:?}", raw);
        }
    }
}
