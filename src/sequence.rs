//! The control-sequence grammar.
//!
//! The engine needs two answers about an accumulating escape buffer: is it
//! complete yet, and what does it mean. `classify` gives both at once by
//! parsing the buffer (ESC already stripped) into a closed enum of
//! recognized operations, so the completion check in the input processor
//! and the routing in the dispatcher share one catalogue and cannot drift.

use crate::charset::{Charset, Slot};
use crate::style::LineAttr;

/// Classification of an accumulating escape buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// More characters are needed.
    Incomplete,
    /// The buffer is the DCS introducer; switch to DCS accumulation.
    Dcs,
    /// The buffer forms a complete sequence.
    Complete(Sequence),
}

/// A complete, parsed control sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Sequence {
    /// DEC private mode set/reset (`CSI ? .. h/l`), one entry per parameter
    PrivateMode { modes: Vec<u16>, enable: bool },
    DesignateCharset { slot: Slot, set: Charset },
    /// Line attribute for the cursor row; `None` restores single width
    SetLineAttr(Option<LineAttr>),
    SaveCursor,
    RestoreCursor,
    Index,
    NextLine,
    ReverseIndex,
    FullReset,
    CursorPosition { row: u16, col: u16 },
    CursorUp(u16),
    CursorDown(u16),
    CursorForward(u16),
    CursorBack(u16),
    CursorNextLine(u16),
    CursorPrevLine(u16),
    CursorColumn(u16),
    CursorRow(u16),
    EraseDisplay(u16),
    EraseLine(u16),
    EraseChars(u16),
    InsertLines(u16),
    DeleteLines(u16),
    InsertChars(u16),
    DeleteChars(u16),
    ScrollUp(u16),
    ScrollDown(u16),
    /// `bottom` 0 means the last row
    SetScrollRegion { top: u16, bottom: u16 },
    /// `right` 0 means the last column
    SetMargins { left: u16, right: u16 },
    FillRect {
        ch: char,
        top: u16,
        left: u16,
        bottom: u16,
        right: u16,
    },
    CopyRect {
        top: u16,
        left: u16,
        bottom: u16,
        right: u16,
        dest_top: u16,
        dest_left: u16,
        src_page: u16,
        dest_page: u16,
    },
    Sgr(Vec<u16>),
    /// Complete but outside the catalogue (or malformed); dropped with a
    /// diagnostic by the dispatcher
    Unrecognized(String),
}

/// Classify an escape buffer. Called after every accumulated character, so
/// a buffer never grows past its completing character.
pub fn classify(buf: &str) -> Status {
    let mut chars = buf.chars();
    let Some(first) = chars.next() else {
        return Status::Incomplete;
    };
    match first {
        '[' => classify_csi(buf),
        'P' => Status::Dcs,
        '(' | ')' => match chars.next() {
            None => Status::Incomplete,
            Some(designator) => Status::Complete(designation(first, designator, buf)),
        },
        '#' => match chars.next() {
            None => Status::Incomplete,
            Some('3') => line_attr(Some(LineAttr::DoubleHeightTop)),
            Some('4') => line_attr(Some(LineAttr::DoubleHeightBottom)),
            Some('5') => line_attr(None),
            Some('6') => line_attr(Some(LineAttr::DoubleWidth)),
            Some(_) => Status::Complete(Sequence::Unrecognized(buf.to_string())),
        },
        '7' => Status::Complete(Sequence::SaveCursor),
        '8' => Status::Complete(Sequence::RestoreCursor),
        'D' => Status::Complete(Sequence::Index),
        'E' => Status::Complete(Sequence::NextLine),
        'M' => Status::Complete(Sequence::ReverseIndex),
        'c' => Status::Complete(Sequence::FullReset),
        _ => Status::Complete(Sequence::Unrecognized(buf.to_string())),
    }
}

fn line_attr(attr: Option<LineAttr>) -> Status {
    Status::Complete(Sequence::SetLineAttr(attr))
}

fn designation(bank: char, designator: char, raw: &str) -> Sequence {
    let slot = if bank == '(' { Slot::G0 } else { Slot::G1 };
    match designator {
        // `K` designates ASCII here; the national variant is NRCS state
        'B' | 'K' => Sequence::DesignateCharset {
            slot,
            set: Charset::Ascii,
        },
        '0' => Sequence::DesignateCharset {
            slot,
            set: Charset::DecGraphics,
        },
        _ => Sequence::Unrecognized(raw.to_string()),
    }
}

fn classify_csi(buf: &str) -> Status {
    let body = &buf[1..];
    let Some(last) = body.chars().last() else {
        return Status::Incomplete;
    };
    if !('\u{40}'..='\u{7e}').contains(&last) {
        // Parameter (0x30-0x3F) and intermediate (0x20-0x2F) bytes keep the
        // sequence open; anything else can never complete.
        return if body.chars().all(|c| ('\u{20}'..='\u{3f}').contains(&c)) {
            Status::Incomplete
        } else {
            Status::Complete(Sequence::Unrecognized(buf.to_string()))
        };
    }
    Status::Complete(parse_csi(body, buf, last))
}

/// Parameter `i`, with `default` standing in for absent or zero values.
fn arg(params: &[u16], i: usize, default: u16) -> u16 {
    match params.get(i).copied() {
        Some(0) | None => default,
        Some(v) => v,
    }
}

/// DECFRA fill characters must be printable.
fn fill_char(code: u16) -> Option<char> {
    if (0x20..=0x7e).contains(&code) || (0xa0..=0xff).contains(&code) {
        char::from_u32(code as u32)
    } else {
        None
    }
}

fn parse_csi(body: &str, raw: &str, final_byte: char) -> Sequence {
    use Sequence::*;

    let inner = &body[..body.len() - final_byte.len_utf8()];
    let (private, inner) = match inner.strip_prefix('?') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    // Intermediate bytes sit between the parameters and the final byte.
    let split = inner
        .find(|c: char| ('\u{20}'..='\u{2f}').contains(&c))
        .unwrap_or(inner.len());
    let (param_str, intermediates) = inner.split_at(split);

    let mut params: Vec<u16> = Vec::new();
    if !param_str.is_empty() {
        for part in param_str.split(';') {
            if part.is_empty() {
                params.push(0);
                continue;
            }
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                // Non-numeric parameter: malformed, skip the sequence
                return Unrecognized(raw.to_string());
            }
            let value = part.bytes().fold(0u16, |acc, b| {
                acc.saturating_mul(10).saturating_add((b - b'0') as u16)
            });
            params.push(value);
        }
    }

    match (private, intermediates, final_byte) {
        // Private modes
        (true, "", mode @ ('h' | 'l')) => PrivateMode {
            modes: params,
            enable: mode == 'h',
        },

        // Cursor movement
        (false, "", 'A') => CursorUp(arg(&params, 0, 1)),
        (false, "", 'B') => CursorDown(arg(&params, 0, 1)),
        (false, "", 'C') => CursorForward(arg(&params, 0, 1)),
        (false, "", 'D') => CursorBack(arg(&params, 0, 1)),
        (false, "", 'E') => CursorNextLine(arg(&params, 0, 1)),
        (false, "", 'F') => CursorPrevLine(arg(&params, 0, 1)),
        (false, "", 'G') => CursorColumn(arg(&params, 0, 1)),
        (false, "", 'd') => CursorRow(arg(&params, 0, 1)),
        (false, "", 'H') | (false, "", 'f') => CursorPosition {
            row: arg(&params, 0, 1),
            col: arg(&params, 1, 1),
        },

        // Erase
        (false, "", 'J') => EraseDisplay(params.first().copied().unwrap_or(0)),
        (false, "", 'K') => EraseLine(params.first().copied().unwrap_or(0)),
        (false, "", 'X') => EraseChars(arg(&params, 0, 1)),

        // Line and character operations
        (false, "", 'L') => InsertLines(arg(&params, 0, 1)),
        (false, "", 'M') => DeleteLines(arg(&params, 0, 1)),
        (false, "", '@') => InsertChars(arg(&params, 0, 1)),
        (false, "", 'P') => DeleteChars(arg(&params, 0, 1)),

        // Scroll
        (false, "", 'S') => ScrollUp(arg(&params, 0, 1)),
        (false, "", 'T') => ScrollDown(arg(&params, 0, 1)),

        // Region and margins
        (false, "", 'r') => SetScrollRegion {
            top: arg(&params, 0, 1),
            bottom: params.get(1).copied().unwrap_or(0),
        },
        (false, "", 's') => SetMargins {
            left: arg(&params, 0, 1),
            right: params.get(1).copied().unwrap_or(0),
        },

        // Rectangular operations
        (false, "$", 'x') => {
            if params.len() != 5 {
                return Unrecognized(raw.to_string());
            }
            let Some(ch) = fill_char(params[0]) else {
                return Unrecognized(raw.to_string());
            };
            FillRect {
                ch,
                top: params[1],
                left: params[2],
                bottom: params[3],
                right: params[4],
            }
        }
        (false, "$", 'v') => {
            if params.len() != 8 {
                return Unrecognized(raw.to_string());
            }
            CopyRect {
                top: params[0],
                left: params[1],
                bottom: params[2],
                right: params[3],
                dest_top: params[4],
                dest_left: params[5],
                src_page: params[6],
                dest_page: params[7],
            }
        }

        // SGR
        (false, "", 'm') => Sgr(params),

        _ => Unrecognized(raw.to_string()),
    }
}
