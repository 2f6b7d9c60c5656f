//! High-level emulator facade.
//!
//! Combines the terminal state with the streaming input processor behind
//! the engine's public contract: feed decoded characters in, commit and
//! read the visible grid out, observe the cursor. A transport delivers
//! bytes decoded to characters; a renderer calls `commit` on its own tick
//! and draws from the committed grid only.

use crate::config::EngineConfig;
use crate::cursor::{CursorSnapshot, CursorWatch};
use crate::input::InputProcessor;
use crate::screen::Cell;
use crate::style::{Color, LineAttr, ResolvedStyle, Style};
use crate::term::Terminal;

pub struct Emulator {
    term: Terminal,
    input: InputProcessor,
    fallback_bg: Color,
}

impl Emulator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            term: Terminal::new(config),
            input: InputProcessor::new(config.escape_buffer_limit, config.dcs_buffer_limit),
            fallback_bg: config.fallback_bg(),
        }
    }

    /// Consume a chunk of decoded input. Sequences split across calls are
    /// reassembled internally.
    pub fn process(&mut self, input: &str) {
        self.input.process(input, &mut self.term);
    }

    /// Publish working-grid changes to the committed grid. Call this from
    /// the thread that owns rendering.
    pub fn commit(&mut self) {
        self.term.commit();
    }

    pub fn rows(&self) -> u16 {
        self.term.rows()
    }

    pub fn cols(&self) -> u16 {
        self.term.cols()
    }

    /// A committed row, as a renderer should draw it.
    pub fn visible_row(&self, row: u16) -> &[Cell] {
        self.term.screen().visible_row(row)
    }

    /// A committed cell.
    pub fn visible_cell(&self, row: u16, col: u16) -> &Cell {
        self.term.screen().visible_cell(row, col)
    }

    /// Decompose a cell's style token for rendering, applying the
    /// configured reverse-video fallback.
    pub fn resolve_style(&self, style: Style) -> ResolvedStyle {
        style.resolve(self.fallback_bg)
    }

    /// Current `(row, col, visible)`.
    pub fn cursor(&self) -> CursorSnapshot {
        self.term.cursor()
    }

    /// Handle for cursor readers on other threads.
    pub fn cursor_watch(&self) -> CursorWatch {
        self.term.watch()
    }

    pub fn line_attr(&self, row: u16) -> Option<LineAttr> {
        self.term.line_attr(row)
    }

    /// Access to the underlying terminal state, for consumers that need
    /// more than the render contract.
    pub fn terminal(&self) -> &Terminal {
        &self.term
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_sees_only_committed_state() {
        let mut emu = Emulator::new(&EngineConfig::default());
        emu.commit();
        emu.process("hello");
        assert_eq!(emu.visible_cell(0, 0).c(), ' ');

        emu.commit();
        assert_eq!(emu.visible_cell(0, 0).c(), 'h');
        assert_eq!(emu.visible_cell(0, 4).c(), 'o');
    }

    #[test]
    fn cursor_snapshot_tracks_processing() {
        let mut emu = Emulator::new(&EngineConfig::default());
        let watch = emu.cursor_watch();
        emu.process("\x1b[10;20H");
        assert_eq!(emu.cursor(), (9, 19, true));
        assert_eq!(watch.position(), (9, 19, true));

        emu.process("\x1b[?25l");
        assert_eq!(watch.position(), (9, 19, false));
    }
}
