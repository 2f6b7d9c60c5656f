//! VT100/VT220/ANSI terminal emulation engine.
//!
//! Consumes a stream of decoded characters from a host and maintains an
//! authoritative, render-ready model of a character grid: cursor,
//! attributes, scrolling regions, left/right margins, charsets, and pages.
//! Rendering and transport are external; they meet the engine only through
//! [`Emulator`].
//!
//! # Architecture
//!
//! ```text
//! Emulator
//! ├── InputProcessor (TEXT / ESCAPE / DCS streaming machine)
//! │   ├── sequence (one grammar: completion detection + parse)
//! │   └── dispatch (parsed sequence -> terminal operation)
//! └── Terminal
//!     ├── ScreenBuffer (pages: working + committed grids, dirty rows)
//!     ├── Cursor (clamped position + cross-thread watch)
//!     ├── CharsetState / NrcsState (G0/G1, DEC graphics, NRCS)
//!     └── Style (SGR attribute state, line attributes)
//! ```
//!
//! The producer thread feeds [`Emulator::process`]; a render tick on its
//! own schedule calls [`Emulator::commit`] and reads the committed grid,
//! never observing a partially written working grid.

pub mod charset;
pub mod config;
pub mod cursor;
pub mod dispatch;
pub mod emulator;
pub mod error;
pub mod input;
pub mod screen;
pub mod sequence;
pub mod style;
pub mod term;

pub use charset::{Charset, NationalVariant, Slot};
pub use config::EngineConfig;
pub use cursor::{CursorSnapshot, CursorWatch};
pub use emulator::Emulator;
pub use error::ConfigError;
pub use screen::Cell;
pub use style::{AttrFlags, Color, LineAttr, ResolvedStyle, Style};
pub use term::Terminal;
