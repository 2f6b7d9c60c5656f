//! Streaming input processor.
//!
//! Consumes the decoded character stream incrementally; sequences may be
//! split across `process` calls and are reassembled here. The processor is
//! a three-mode machine (TEXT, ESCAPE, DCS). Plain text is charset- and
//! NRCS-mapped and placed through the terminal; completed escape buffers go
//! to the dispatcher; DCS payloads are discarded. Both accumulation buffers
//! are length-capped so runaway input can neither grow memory without bound
//! nor wedge the machine.

use tracing::{debug, warn};

use crate::dispatch;
use crate::sequence::{self, Status};
use crate::term::Terminal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Text,
    Escape,
    Dcs,
}

pub struct InputProcessor {
    mode: Mode,
    /// Escape accumulation buffer, ESC stripped
    buf: String,
    /// Length of the discarded DCS payload so far
    dcs_len: usize,
    /// ESC seen inside DCS, waiting for the `\` of the string terminator
    dcs_esc: bool,
    escape_limit: usize,
    dcs_limit: usize,
}

impl InputProcessor {
    pub fn new(escape_limit: usize, dcs_limit: usize) -> Self {
        Self {
            mode: Mode::Text,
            buf: String::new(),
            dcs_len: 0,
            dcs_esc: false,
            escape_limit,
            dcs_limit,
        }
    }

    /// Feed a chunk of decoded input. No framing is assumed.
    pub fn process(&mut self, input: &str, term: &mut Terminal) {
        for ch in input.chars() {
            self.feed(ch, term);
        }
    }

    fn feed(&mut self, ch: char, term: &mut Terminal) {
        match self.mode {
            Mode::Text => self.text(ch, term),
            Mode::Escape => self.escape(ch, term),
            Mode::Dcs => self.dcs(ch, term),
        }
    }

    fn text(&mut self, ch: char, term: &mut Terminal) {
        match ch {
            '\x1b' => {
                self.mode = Mode::Escape;
                self.buf.clear();
            }
            '\r' => term.carriage_return(),
            '\n' | '\x0b' | '\x0c' => term.linefeed(),
            '\x08' => term.backspace(),
            '\t' => term.horizontal_tab(),
            '\x0e' => term.shift_out(),
            '\x0f' => term.shift_in(),
            // NUL, SUB, BEL and the remaining C0 controls are ignored
            c if (c as u32) < 0x20 || c == '\x7f' => {}
            c => {
                let mapped = term.map_char(c);
                term.put_char(mapped);
            }
        }
    }

    fn escape(&mut self, ch: char, term: &mut Terminal) {
        if ch == '\x1b' {
            // A new ESC abandons the current buffer and starts over
            if !self.buf.is_empty() {
                debug!("escape buffer {:?} restarted by ESC", self.buf);
            }
            self.buf.clear();
            return;
        }

        self.buf.push(ch);
        if self.buf.len() > self.escape_limit {
            warn!(
                "escape buffer exceeded {} bytes, discarding",
                self.escape_limit
            );
            self.buf.clear();
            self.mode = Mode::Text;
            return;
        }

        match sequence::classify(&self.buf) {
            Status::Incomplete => {}
            Status::Dcs => {
                self.buf.clear();
                self.dcs_len = 0;
                self.dcs_esc = false;
                self.mode = Mode::Dcs;
            }
            Status::Complete(seq) => {
                self.buf.clear();
                self.mode = Mode::Text;
                dispatch::apply(term, seq);
            }
        }
    }

    fn dcs(&mut self, ch: char, term: &mut Terminal) {
        if self.dcs_esc {
            self.dcs_esc = false;
            if ch == '\\' {
                // ST - the payload is intentionally discarded
                debug!("discarding DCS payload ({} chars)", self.dcs_len);
                self.mode = Mode::Text;
            } else {
                // ESC without `\`: abandon the DCS and reprocess as a fresh
                // escape sequence starting at that ESC
                debug!("DCS abandoned after {} chars", self.dcs_len);
                self.buf.clear();
                self.mode = Mode::Escape;
                self.escape(ch, term);
            }
            return;
        }
        if ch == '\x1b' {
            self.dcs_esc = true;
            return;
        }
        self.dcs_len += 1;
        if self.dcs_len > self.dcs_limit {
            warn!("DCS payload exceeded {} chars, discarding", self.dcs_limit);
            self.mode = Mode::Text;
        }
    }
}
