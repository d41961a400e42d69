//! Emitter configuration
//!
//! Settings can come from a config file (serde) or from the key/value
//! options a logical decoding host passes at startup:
//!
//! | option                   | values                  | default |
//! |--------------------------|-------------------------|---------|
//! | `flush-mode`             | `line`, `transaction`   | `line`  |
//! | `warn-on-missing-fields` | `true`, `false`, `on`.. | `true`  |

use crate::common::{EmitError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When the protocol writer flushes the outbound channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushMode {
    /// Flush after every line
    #[default]
    Line,
    /// Hold a whole transaction and write it out after COMMIT
    Transaction,
}

impl FromStr for FlushMode {
    type Err = EmitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "line" => Ok(FlushMode::Line),
            "transaction" => Ok(FlushMode::Transaction),
            other => Err(EmitError::config(format!(
                "invalid flush-mode {:?}, expected \"line\" or \"transaction\"",
                other
            ))),
        }
    }
}

impl fmt::Display for FlushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushMode::Line => f.write_str("line"),
            FlushMode::Transaction => f.write_str("transaction"),
        }
    }
}

/// Configuration for the output plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Flush policy of the protocol writer
    pub flush_mode: FlushMode,
    /// Log dropped rows with missing id/version at `warn` (otherwise `debug`)
    pub warn_on_missing_fields: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            flush_mode: FlushMode::Line,
            warn_on_missing_fields: true,
        }
    }
}

impl EmitterConfig {
    /// Create a new config builder.
    pub fn builder() -> EmitterConfigBuilder {
        EmitterConfigBuilder::default()
    }

    /// Build a config from host plugin options.
    ///
    /// Unknown option names are an error.
    pub fn from_options<K, V>(options: &[(K, V)]) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in options {
            let value = value.as_ref();
            match key.as_ref() {
                "flush-mode" => config.flush_mode = value.parse()?,
                "warn-on-missing-fields" => {
                    config.warn_on_missing_fields = parse_bool("warn-on-missing-fields", value)?
                }
                other => {
                    return Err(EmitError::config(format!("unknown option {:?}", other)));
                }
            }
        }
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" => Ok(false),
        other => Err(EmitError::config(format!(
            "invalid boolean {:?} for {}",
            other, key
        ))),
    }
}

/// Builder for EmitterConfig.
#[derive(Default)]
pub struct EmitterConfigBuilder {
    config: EmitterConfig,
}

impl EmitterConfigBuilder {
    /// Set the flush policy.
    pub fn flush_mode(mut self, mode: FlushMode) -> Self {
        self.config.flush_mode = mode;
        self
    }

    /// Set whether missing id/version rows are logged at warn level.
    pub fn warn_on_missing_fields(mut self, enabled: bool) -> Self {
        self.config.warn_on_missing_fields = enabled;
        self
    }

    /// Build the config.
    pub fn build(self) -> EmitterConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EmitterConfig::default();
        assert_eq!(config.flush_mode, FlushMode::Line);
        assert!(config.warn_on_missing_fields);
    }

    #[test]
    fn test_builder() {
        let config = EmitterConfig::builder()
            .flush_mode(FlushMode::Transaction)
            .warn_on_missing_fields(false)
            .build();
        assert_eq!(config.flush_mode, FlushMode::Transaction);
        assert!(!config.warn_on_missing_fields);
    }

    #[test]
    fn test_from_options() {
        let config = EmitterConfig::from_options(&[
            ("flush-mode", "transaction"),
            ("warn-on-missing-fields", "off"),
        ])
        .unwrap();
        assert_eq!(config.flush_mode, FlushMode::Transaction);
        assert!(!config.warn_on_missing_fields);
    }

    #[test]
    fn test_from_empty_options() {
        let options: [(&str, &str); 0] = [];
        assert_eq!(
            EmitterConfig::from_options(&options).unwrap(),
            EmitterConfig::default()
        );
    }

    #[test]
    fn test_from_options_rejects_unknown_key() {
        let err = EmitterConfig::from_options(&[("include-xids", "1")]).unwrap_err();
        assert!(matches!(err, EmitError::Config(_)));
    }

    #[test]
    fn test_from_options_rejects_bad_values() {
        assert!(EmitterConfig::from_options(&[("flush-mode", "batch")]).is_err());
        assert!(EmitterConfig::from_options(&[("warn-on-missing-fields", "maybe")]).is_err());
    }

    #[test]
    fn test_yaml_config() {
        let config: EmitterConfig = serde_yaml::from_str("flush_mode: transaction\n").unwrap();
        assert_eq!(config.flush_mode, FlushMode::Transaction);
        assert!(config.warn_on_missing_fields);
    }

    #[test]
    fn test_flush_mode_display_roundtrip() {
        for mode in [FlushMode::Line, FlushMode::Transaction] {
            assert_eq!(mode.to_string().parse::<FlushMode>().unwrap(), mode);
        }
    }
}
