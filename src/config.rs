//! Engine configuration.
//!
//! All fields have working defaults; a TOML file can override any subset:
//!
//! ```toml
//! rows = 25
//! cols = 80
//!
//! # Background pages reachable by rectangular copy
//! max_pages = 8
//!
//! # Accumulation caps for hostile/runaway input
//! escape_buffer_limit = 128
//! dcs_buffer_limit = 4096
//!
//! # Color substituted when reverse video meets a transparent background:
//! # black, red, green, yellow, blue, magenta, cyan, white
//! reverse_fallback_bg = "white"
//!
//! # NRCS national variant: german, french, uk
//! nrcs_variant = "german"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::charset::NationalVariant;
use crate::error::ConfigError;
use crate::style::Color;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Grid height in rows
    pub rows: u16,
    /// Grid width in columns
    pub cols: u16,
    /// Highest page number the page arena will create
    pub max_pages: u16,
    /// Escape accumulation cap, in characters
    pub escape_buffer_limit: usize,
    /// DCS payload cap, in characters
    pub dcs_buffer_limit: usize,
    /// Named color substituted for a transparent background under reverse
    /// video
    pub reverse_fallback_bg: String,
    /// NRCS national variant name
    pub nrcs_variant: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: 25,
            cols: 80,
            max_pages: 8,
            escape_buffer_limit: 128,
            dcs_buffer_limit: 4096,
            reverse_fallback_bg: "white".to_string(),
            nrcs_variant: "german".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid dimensions must be non-zero, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Invalid(
                "max_pages must be at least 1".to_string(),
            ));
        }
        if named_color(&self.reverse_fallback_bg).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown color {:?}",
                self.reverse_fallback_bg
            )));
        }
        if NationalVariant::from_name(&self.nrcs_variant).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown NRCS variant {:?}",
                self.nrcs_variant
            )));
        }
        Ok(())
    }

    /// The configured reverse-video fallback; white when the name is
    /// unknown (construction through `load` rejects unknown names).
    pub fn fallback_bg(&self) -> Color {
        named_color(&self.reverse_fallback_bg).unwrap_or(Color::Indexed(7))
    }

    /// The configured NRCS variant; German when the name is unknown.
    pub fn nrcs_variant(&self) -> NationalVariant {
        NationalVariant::from_name(&self.nrcs_variant).unwrap_or_default()
    }
}

fn named_color(name: &str) -> Option<Color> {
    let index = match name.to_ascii_lowercase().as_str() {
        "black" => 0,
        "red" => 1,
        "green" => 2,
        "yellow" => 3,
        "blue" => 4,
        "magenta" => 5,
        "cyan" => 6,
        "white" => 7,
        _ => return None,
    };
    Some(Color::Indexed(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fallback_bg(), Color::Indexed(7));
        assert_eq!(config.nrcs_variant(), NationalVariant::German);
    }

    #[test]
    fn partial_toml_overrides() {
        let config: EngineConfig = toml::from_str("rows = 50\nnrcs_variant = \"uk\"").unwrap();
        assert_eq!(config.rows, 50);
        assert_eq!(config.cols, 80);
        assert_eq!(config.nrcs_variant(), NationalVariant::UnitedKingdom);
    }

    #[test]
    fn bad_values_are_rejected() {
        let config: EngineConfig = toml::from_str("rows = 0").unwrap();
        assert!(config.validate().is_err());

        let config: EngineConfig = toml::from_str("reverse_fallback_bg = \"mauve\"").unwrap();
        assert!(config.validate().is_err());
    }
}
