//! Deck configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file
//! at all) yields the pattern-language conventions:
//!
//! ```toml
//! gain_label = "gain:"
//! gain_capacity = 256
//! default_volume = 1.0
//!
//! [syntax]
//! mute_marker = "_"
//! label_suffix = ":"
//! tag_open = "<"
//! tag_close = ">"
//! ```

use crate::error::{DeckError, DeckResult};
use crate::gain::{GainExtractor, DEFAULT_CAPACITY, DEFAULT_GAIN_LABEL};
use crate::log_bus::{GainMonitor, LogBus};
use crate::syntax::{LexicalRules, SectionSyntax};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Label preceding the gain value in evaluator log lines
    pub gain_label: String,
    /// Samples kept for the gain chart
    pub gain_capacity: usize,
    /// Volume a new session starts with
    pub default_volume: f64,
    pub syntax: LexicalRules,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            gain_label: DEFAULT_GAIN_LABEL.to_string(),
            gain_capacity: DEFAULT_CAPACITY,
            default_volume: 1.0,
            syntax: LexicalRules::default(),
        }
    }
}

impl DeckConfig {
    /// Parse TOML content
    pub fn parse(content: &str) -> DeckResult<Self> {
        let config: DeckConfig =
            toml::from_str(content).map_err(|e| DeckError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> DeckResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load from the user config directory, falling back to defaults when no
    /// file exists there
    pub fn load_default() -> DeckResult<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// `<config dir>/tunedeck/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tunedeck").join("config.toml"))
    }

    pub fn to_toml(&self) -> DeckResult<String> {
        toml::to_string_pretty(self).map_err(|e| DeckError::Config(e.to_string()))
    }

    pub fn section_syntax(&self) -> DeckResult<SectionSyntax> {
        SectionSyntax::new(&self.syntax)
    }

    pub fn gain_extractor(&self) -> GainExtractor {
        GainExtractor::new(&self.gain_label)
    }

    /// Attach a gain monitor to `bus` using the configured label and capacity
    pub fn gain_monitor(&self, bus: &mut LogBus) -> GainMonitor {
        GainMonitor::attach(bus, self.gain_extractor(), self.gain_capacity)
    }

    fn validate(&self) -> DeckResult<()> {
        SectionSyntax::new(&self.syntax)?;
        if self.gain_label.is_empty() {
            return Err(DeckError::Config("gain_label must not be empty".to_string()));
        }
        if self.gain_capacity == 0 {
            return Err(DeckError::Config("gain_capacity must be at least 1".to_string()));
        }
        if !(self.default_volume.is_finite() && self.default_volume >= 0.0) {
            return Err(DeckError::InvalidVolume(self.default_volume));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_bus::LogEvent;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(DeckConfig::parse("").unwrap(), DeckConfig::default());
    }

    #[test]
    fn test_partial_syntax_override() {
        let config = DeckConfig::parse("[syntax]\nmute_marker = \"// \"\n").unwrap();
        assert_eq!(config.syntax.mute_marker, "// ");
        assert_eq!(config.syntax.label_suffix, ":");
        assert_eq!(config.gain_label, "gain:");
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            DeckConfig::parse("gain_capacity = 0"),
            Err(DeckError::Config(_))
        ));
        assert!(DeckConfig::parse("[syntax]\ntag_open = \"\"").is_err());
        assert!(DeckConfig::parse("default_volume = -1.0").is_err());
        assert!(DeckConfig::parse("gain_label = 3").is_err());
    }

    #[test]
    fn test_gain_monitor_follows_config() {
        let config = DeckConfig::parse("gain_label = \"amp=\"\ngain_capacity = 2\n").unwrap();
        let mut bus = LogBus::new();
        let monitor = config.gain_monitor(&mut bus);

        for line in ["amp=0.1", "gain:0.5", "amp=0.3"] {
            bus.publish(&LogEvent::Line(line.to_string()));
        }
        assert_eq!(monitor.values(), vec![0.0, 0.3]);
        assert_eq!(monitor.series().borrow().capacity(), 2);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DeckConfig {
            gain_label: "amp=".to_string(),
            ..DeckConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(DeckConfig::parse(&text).unwrap(), config);
    }
}
