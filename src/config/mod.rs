pub mod env;
mod validation;

use crate::domain::{ConfigError, Level};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1024 * 1024; // 1 MiB
pub const DEFAULT_MAX_KEY_LENGTH: usize = 256;
pub const DEFAULT_MAX_VALUE_LENGTH: usize = 64 * 1024;

/// Size limits enforced on every field, message and event buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_buffer_size: usize,
    pub max_key_length: usize,
    /// Applies to single field values and to the message.
    pub max_value_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
        }
    }
}

/// Keys events write on the caller's behalf.
///
/// The level and message keys are part of the record layout and are set on
/// the handler through `RecordKeys`; naming them here is a parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldNames {
    pub time: String,
    pub error: String,
    pub caller: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            time: "time".to_string(),
            error: "error".to_string(),
            caller: "caller".to_string(),
        }
    }
}

/// Profile used by `Event::timestamp()` and `Event::time()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `2024-01-01T12:00:00+00:00`
    Rfc3339,
    /// `2024-01-01T12:00:00.123+00:00`
    #[default]
    Rfc3339Millis,
    /// `2024-01-01T12:00:00.123456789+00:00`
    Rfc3339Nanos,
    /// Integer seconds since the epoch, encoded as a number.
    UnixSeconds,
    /// Integer milliseconds since the epoch, encoded as a number.
    UnixMillis,
}

impl FromStr for TimestampFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rfc3339" => Ok(TimestampFormat::Rfc3339),
            "rfc3339_millis" => Ok(TimestampFormat::Rfc3339Millis),
            "rfc3339_nanos" => Ok(TimestampFormat::Rfc3339Nanos),
            "unix_seconds" | "unix" => Ok(TimestampFormat::UnixSeconds),
            "unix_millis" => Ok(TimestampFormat::UnixMillis),
            other => Err(format!("unknown timestamp format '{other}'")),
        }
    }
}

/// Unit a `Duration` field is expressed in. Values are encoded as floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Seconds,
    #[default]
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl FromStr for DurationUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "seconds" => Ok(DurationUnit::Seconds),
            "ms" | "milliseconds" => Ok(DurationUnit::Milliseconds),
            "us" | "microseconds" => Ok(DurationUnit::Microseconds),
            "ns" | "nanoseconds" => Ok(DurationUnit::Nanoseconds),
            other => Err(format!("unknown duration unit '{other}'")),
        }
    }
}

/// Logger configuration. Read-only once a `Logger` holds it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub level: Level,
    pub limits: Limits,
    pub field_names: FieldNames,
    pub timestamp_format: TimestampFormat,
    pub duration_unit: DurationUnit,
}

impl Config {
    /// Defaults overridden by `RASK_LOG_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        env::load_env_var("RASK_LOG_LEVEL", &mut self.level)?;
        env::load_env_var("RASK_LOG_MAX_BUFFER_SIZE", &mut self.limits.max_buffer_size)?;
        env::load_env_var("RASK_LOG_MAX_KEY_LENGTH", &mut self.limits.max_key_length)?;
        env::load_env_var("RASK_LOG_MAX_VALUE_LENGTH", &mut self.limits.max_value_length)?;
        env::load_env_var("RASK_LOG_TIMESTAMP_FORMAT", &mut self.timestamp_format)?;
        env::load_env_var("RASK_LOG_DURATION_UNIT", &mut self.duration_unit)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_buffer_size, 1_048_576);
        assert_eq!(limits.max_key_length, 256);
        assert_eq!(limits.max_value_length, 65_536);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
        assert_eq!(Config::default().level, Level::Info);
    }

    #[test]
    fn test_from_toml_partial_overrides() {
        let config = Config::from_toml_str(
            r#"
            level = "warn"
            timestamp_format = "unix_millis"

            [limits]
            max_key_length = 64

            [field_names]
            time = "ts"
            "#,
        )
        .unwrap();

        assert_eq!(config.level, Level::Warn);
        assert_eq!(config.timestamp_format, TimestampFormat::UnixMillis);
        assert_eq!(config.limits.max_key_length, 64);
        assert_eq!(config.limits.max_value_length, DEFAULT_MAX_VALUE_LENGTH);
        assert_eq!(config.field_names.time, "ts");
        assert_eq!(config.field_names.caller, "caller");
    }

    #[test]
    fn test_from_toml_rejects_invalid_limits() {
        let result = Config::from_toml_str("[limits]\nmax_buffer_size = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        let result = Config::from_toml_str("level = [");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_parse_units_and_formats() {
        assert_eq!("ms".parse::<DurationUnit>(), Ok(DurationUnit::Milliseconds));
        assert_eq!("Seconds".parse::<DurationUnit>(), Ok(DurationUnit::Seconds));
        assert!("fortnights".parse::<DurationUnit>().is_err());
        assert_eq!("rfc3339".parse::<TimestampFormat>(), Ok(TimestampFormat::Rfc3339));
        assert!("iso".parse::<TimestampFormat>().is_err());
    }
}
