//! Text attributes, colors, and style tokens.
//!
//! The engine stamps every written cell with the style token that was
//! current at write time. A token is an opaque, canonical value: two cells
//! carrying equal tokens render identically, and the token is recomputed
//! whenever any attribute component changes (SGR application mutates the
//! live token in place).

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AttrFlags: u16 {
        const BOLD          = 0b0000_0000_0001;
        const DIM           = 0b0000_0000_0010;
        const ITALIC        = 0b0000_0000_0100;
        const UNDERLINE     = 0b0000_0000_1000;
        const BLINK         = 0b0000_0001_0000;
        const INVERSE       = 0b0000_0010_0000;
        const HIDDEN        = 0b0000_0100_0000;
        const STRIKETHROUGH = 0b0000_1000_0000;
    }
}

/// Color definition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Color {
    /// The terminal default; backgrounds with this value are transparent.
    #[default]
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    /// Convert to crossterm color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        match self {
            Color::Default => crossterm::style::Color::Reset,
            Color::Indexed(n) => crossterm::style::Color::AnsiValue(*n),
            Color::Rgb(r, g, b) => crossterm::style::Color::Rgb {
                r: *r,
                g: *g,
                b: *b,
            },
        }
    }
}

/// The style token: current SGR attribute state, stamped onto cell writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub flags: AttrFlags,
}

/// A style token decomposed for a renderer: effective colors after
/// reverse-video and conceal resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub fg: Color,
    /// `None` means the background is transparent.
    pub bg: Option<Color>,
    pub underline: bool,
    pub bold: bool,
}

impl Style {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Resolve the token for rendering.
    ///
    /// Reverse video swaps foreground and background; when the pre-swap
    /// background is transparent, `reverse_fallback_bg` stands in for it so
    /// the swapped foreground is a concrete color. Concealed text takes its
    /// background color as foreground.
    pub fn resolve(&self, reverse_fallback_bg: Color) -> ResolvedStyle {
        let (mut fg, mut bg) = if self.flags.contains(AttrFlags::INVERSE) {
            let swapped_fg = match self.bg {
                Color::Default => reverse_fallback_bg,
                other => other,
            };
            (swapped_fg, Some(self.fg))
        } else {
            let bg = match self.bg {
                Color::Default => None,
                other => Some(other),
            };
            (self.fg, bg)
        };

        if bg == Some(Color::Default) {
            bg = None;
        }
        if self.flags.contains(AttrFlags::HIDDEN) {
            fg = bg.unwrap_or(reverse_fallback_bg);
        }

        ResolvedStyle {
            fg,
            bg,
            underline: self.flags.contains(AttrFlags::UNDERLINE),
            bold: self.flags.contains(AttrFlags::BOLD),
        }
    }

    /// Apply an SGR parameter list to the token.
    ///
    /// An empty list is equivalent to a single `0` (full reset).
    pub fn apply_sgr(&mut self, params: &[u16]) {
        if params.is_empty() {
            self.reset();
            return;
        }

        let mut iter = params.iter();

        while let Some(&param) = iter.next() {
            match param {
                0 => self.reset(),
                1 => self.flags |= AttrFlags::BOLD,
                2 => self.flags |= AttrFlags::DIM,
                3 => self.flags |= AttrFlags::ITALIC,
                4 | 21 => self.flags |= AttrFlags::UNDERLINE,
                5 => self.flags |= AttrFlags::BLINK,
                7 => self.flags |= AttrFlags::INVERSE,
                8 => self.flags |= AttrFlags::HIDDEN,
                9 => self.flags |= AttrFlags::STRIKETHROUGH,

                22 => self.flags &= !(AttrFlags::BOLD | AttrFlags::DIM),
                23 => self.flags &= !AttrFlags::ITALIC,
                24 => self.flags &= !AttrFlags::UNDERLINE,
                25 => self.flags &= !AttrFlags::BLINK,
                27 => self.flags &= !AttrFlags::INVERSE,
                28 => self.flags &= !AttrFlags::HIDDEN,
                29 => self.flags &= !AttrFlags::STRIKETHROUGH,

                // Foreground colors (standard)
                30..=37 => {
                    self.fg = Color::Indexed((param - 30) as u8);
                }
                38 => {
                    // Extended foreground
                    if let Some(&mode) = iter.next() {
                        match mode {
                            5 => {
                                if let Some(&n) = iter.next() {
                                    self.fg = Color::Indexed(n as u8);
                                }
                            }
                            2 => {
                                let r = iter.next().copied().unwrap_or(0) as u8;
                                let g = iter.next().copied().unwrap_or(0) as u8;
                                let b = iter.next().copied().unwrap_or(0) as u8;
                                self.fg = Color::Rgb(r, g, b);
                            }
                            _ => {}
                        }
                    }
                }
                39 => self.fg = Color::Default,

                // Background colors (standard)
                40..=47 => {
                    self.bg = Color::Indexed((param - 40) as u8);
                }
                48 => {
                    // Extended background
                    if let Some(&mode) = iter.next() {
                        match mode {
                            5 => {
                                if let Some(&n) = iter.next() {
                                    self.bg = Color::Indexed(n as u8);
                                }
                            }
                            2 => {
                                let r = iter.next().copied().unwrap_or(0) as u8;
                                let g = iter.next().copied().unwrap_or(0) as u8;
                                let b = iter.next().copied().unwrap_or(0) as u8;
                                self.bg = Color::Rgb(r, g, b);
                            }
                            _ => {}
                        }
                    }
                }
                49 => self.bg = Color::Default,

                // Bright foreground
                90..=97 => {
                    self.fg = Color::Indexed((param - 90 + 8) as u8);
                }
                // Bright background
                100..=107 => {
                    self.bg = Color::Indexed((param - 100 + 8) as u8);
                }

                _ => {}
            }
        }
    }
}

/// Per-row line rendering attribute. Double-width and double-height are
/// mutually exclusive: a row holds at most one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineAttr {
    DoubleWidth,
    DoubleHeightTop,
    DoubleHeightBottom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgr_bold_underline_red() {
        let mut style = Style::default();
        style.apply_sgr(&[1, 4, 31]);

        let resolved = style.resolve(Color::Indexed(7));
        assert!(resolved.bold);
        assert!(resolved.underline);
        assert_eq!(resolved.fg, Color::Indexed(1));
        assert_eq!(resolved.bg, None);
    }

    #[test]
    fn sgr_reset_clears_everything() {
        let mut style = Style::default();
        style.apply_sgr(&[1, 4, 31]);
        style.apply_sgr(&[0]);

        assert_eq!(style, Style::default());
        let resolved = style.resolve(Color::Indexed(7));
        assert!(!resolved.bold);
        assert!(!resolved.underline);
        assert_eq!(resolved.fg, Color::Default);
    }

    #[test]
    fn sgr_selective_clear() {
        let mut style = Style::default();
        style.apply_sgr(&[1, 5, 7, 8]);
        style.apply_sgr(&[22, 25, 27, 28]);
        assert_eq!(style.flags, AttrFlags::empty());
    }

    #[test]
    fn sgr_21_is_underline() {
        let mut style = Style::default();
        style.apply_sgr(&[21]);
        assert!(style.flags.contains(AttrFlags::UNDERLINE));
        style.apply_sgr(&[24]);
        assert!(!style.flags.contains(AttrFlags::UNDERLINE));
    }

    #[test]
    fn sgr_bright_and_default_colors() {
        let mut style = Style::default();
        style.apply_sgr(&[97, 104]);
        assert_eq!(style.fg, Color::Indexed(15));
        assert_eq!(style.bg, Color::Indexed(12));

        style.apply_sgr(&[39, 49]);
        assert_eq!(style.fg, Color::Default);
        assert_eq!(style.bg, Color::Default);
    }

    #[test]
    fn reverse_swaps_colors() {
        let mut style = Style {
            fg: Color::Indexed(2),
            bg: Color::Indexed(4),
            ..Style::default()
        };
        style.apply_sgr(&[7]);

        let resolved = style.resolve(Color::Indexed(7));
        assert_eq!(resolved.fg, Color::Indexed(4));
        assert_eq!(resolved.bg, Some(Color::Indexed(2)));
    }

    #[test]
    fn reverse_with_transparent_background_uses_fallback() {
        let mut style = Style {
            fg: Color::Indexed(2),
            ..Style::default()
        };
        style.apply_sgr(&[7]);

        let resolved = style.resolve(Color::Indexed(7));
        assert_eq!(resolved.fg, Color::Indexed(7));
        assert_eq!(resolved.bg, Some(Color::Indexed(2)));
    }

    #[test]
    fn conceal_takes_background_color() {
        let mut style = Style {
            fg: Color::Indexed(1),
            bg: Color::Indexed(4),
            ..Style::default()
        };
        style.apply_sgr(&[8]);

        let resolved = style.resolve(Color::Indexed(7));
        assert_eq!(resolved.fg, Color::Indexed(4));
    }

    #[test]
    fn extended_colors() {
        let mut style = Style::default();
        style.apply_sgr(&[38, 5, 208]);
        assert_eq!(style.fg, Color::Indexed(208));
        style.apply_sgr(&[48, 2, 10, 20, 30]);
        assert_eq!(style.bg, Color::Rgb(10, 20, 30));
    }
}
