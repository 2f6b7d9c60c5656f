//! Character set designation and national replacement characters.
//!
//! Two designation slots (G0, G1) each hold a charset; SI/SO select which
//! slot maps incoming text. NRCS substitution runs after charset mapping
//! and only while enabled (`CSI ?42h`). The substitution tables are fixed
//! data; each session owns its own designation state.

/// A designatable character set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Charset {
    #[default]
    Ascii,
    /// DEC Special Graphics (line drawing).
    DecGraphics,
}

/// A designation slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    G0,
    G1,
}

/// G0/G1 designations plus the active selector.
#[derive(Clone, Copy, Debug, Default)]
pub struct CharsetState {
    g0: Charset,
    g1: Charset,
    shifted_out: bool,
}

impl CharsetState {
    pub fn designate(&mut self, slot: Slot, set: Charset) {
        match slot {
            Slot::G0 => self.g0 = set,
            Slot::G1 => self.g1 = set,
        }
    }

    /// SO - make G1 the active slot.
    pub fn shift_out(&mut self) {
        self.shifted_out = true;
    }

    /// SI - make G0 the active slot.
    pub fn shift_in(&mut self) {
        self.shifted_out = false;
    }

    pub fn active(&self) -> Charset {
        if self.shifted_out {
            self.g1
        } else {
            self.g0
        }
    }

    /// Map a character through the active designation.
    pub fn map(&self, ch: char) -> char {
        match self.active() {
            Charset::Ascii => ch,
            Charset::DecGraphics => map_dec_graphics(ch),
        }
    }
}

/// DEC Special Graphics mapping for the `_`..`~` range; everything else
/// passes through unchanged.
fn map_dec_graphics(ch: char) -> char {
    match ch {
        '_' => ' ',
        '`' => '◆',
        'a' => '▒',
        'b' => '␉',
        'c' => '␌',
        'd' => '␍',
        'e' => '␊',
        'f' => '°',
        'g' => '±',
        'h' => '␤',
        'i' => '␋',
        'j' => '┘',
        'k' => '┐',
        'l' => '┌',
        'm' => '└',
        'n' => '┼',
        'o' => '⎺',
        'p' => '⎻',
        'q' => '─',
        'r' => '⎼',
        's' => '⎽',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'x' => '│',
        'y' => '≤',
        'z' => '≥',
        '{' => 'π',
        '|' => '≠',
        '}' => '£',
        '~' => '·',
        _ => ch,
    }
}

/// National variant for NRCS substitution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NationalVariant {
    #[default]
    German,
    French,
    UnitedKingdom,
}

impl NationalVariant {
    /// Parse a variant name as written in the configuration file.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "german" | "de" => Some(Self::German),
            "french" | "fr" => Some(Self::French),
            "uk" | "british" => Some(Self::UnitedKingdom),
            _ => None,
        }
    }
}

/// NRCS state: enabled flag plus the selected national variant.
#[derive(Clone, Copy, Debug, Default)]
pub struct NrcsState {
    pub enabled: bool,
    pub variant: NationalVariant,
}

impl NrcsState {
    pub fn new(variant: NationalVariant) -> Self {
        Self {
            enabled: false,
            variant,
        }
    }

    /// Substitute a character when NRCS is enabled; identity otherwise.
    pub fn map(&self, ch: char) -> char {
        if !self.enabled {
            return ch;
        }
        match self.variant {
            NationalVariant::German => match ch {
                '@' => '§',
                '[' => 'Ä',
                '\\' => 'Ö',
                ']' => 'Ü',
                '{' => 'ä',
                '|' => 'ö',
                '}' => 'ü',
                '~' => 'ß',
                _ => ch,
            },
            NationalVariant::French => match ch {
                '#' => '£',
                '@' => 'à',
                '[' => '°',
                '\\' => 'ç',
                ']' => '§',
                '{' => 'é',
                '|' => 'ù',
                '}' => 'è',
                '~' => '¨',
                _ => ch,
            },
            NationalVariant::UnitedKingdom => match ch {
                '#' => '£',
                _ => ch,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_ascii_passthrough() {
        let state = CharsetState::default();
        assert_eq!(state.map('q'), 'q');
        assert_eq!(state.map('#'), '#');
    }

    #[test]
    fn g0_graphics_designation() {
        let mut state = CharsetState::default();
        state.designate(Slot::G0, Charset::DecGraphics);
        assert_eq!(state.map('q'), '─');
        assert_eq!(state.map('x'), '│');
        assert_eq!(state.map('j'), '┘');
        // Outside the graphics range
        assert_eq!(state.map('A'), 'A');
    }

    #[test]
    fn shift_out_selects_g1() {
        let mut state = CharsetState::default();
        state.designate(Slot::G1, Charset::DecGraphics);
        assert_eq!(state.map('q'), 'q');

        state.shift_out();
        assert_eq!(state.map('q'), '─');

        state.shift_in();
        assert_eq!(state.map('q'), 'q');
    }

    #[test]
    fn nrcs_disabled_is_identity() {
        let nrcs = NrcsState::new(NationalVariant::German);
        assert_eq!(nrcs.map('['), '[');
    }

    #[test]
    fn nrcs_german_substitution() {
        let mut nrcs = NrcsState::new(NationalVariant::German);
        nrcs.enabled = true;
        assert_eq!(nrcs.map('['), 'Ä');
        assert_eq!(nrcs.map('~'), 'ß');
        assert_eq!(nrcs.map('A'), 'A');
    }

    #[test]
    fn nrcs_uk_substitution() {
        let mut nrcs = NrcsState::new(NationalVariant::UnitedKingdom);
        nrcs.enabled = true;
        assert_eq!(nrcs.map('#'), '£');
        assert_eq!(nrcs.map('['), '[');
    }

    #[test]
    fn variant_names() {
        assert_eq!(
            NationalVariant::from_name("German"),
            Some(NationalVariant::German)
        );
        assert_eq!(
            NationalVariant::from_name("uk"),
            Some(NationalVariant::UnitedKingdom)
        );
        assert_eq!(NationalVariant::from_name("klingon"), None);
    }
}
