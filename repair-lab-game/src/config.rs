//! Session settings loadable from JSON.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::WeatherKind;
use crate::constants::{
    DEFAULT_PERSONA, FOCUS_DEFAULT_MINUTES, FOCUS_MAX_MINUTES, FOCUS_MIN_MINUTES,
    FORECAST_DAYS_DEFAULT, FORECAST_DAYS_MAX, FORECAST_DAYS_MIN, INTENSITY_DEFAULT, INTENSITY_MAX,
    INTENSITY_MIN,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("session config is not valid JSON: {0}")]
    Parse(String),
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
    #[error("persona name must not be blank")]
    BlankPersona,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name used in plan summaries, badges and mood lines.
    pub persona: String,
    pub focus_minutes: u32,
    pub forecast_days: u32,
    pub default_intensity: i32,
    pub default_weather: WeatherKind,
    /// Fixed seed for reproducible content; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl SessionConfig {
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            focus_minutes: FOCUS_DEFAULT_MINUTES,
            forecast_days: FORECAST_DAYS_DEFAULT,
            default_intensity: INTENSITY_DEFAULT,
            default_weather: WeatherKind::default(),
            seed: None,
        }
    }

    /// Parse and validate a config; omitted fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its supported range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a field violates its bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.persona.trim().is_empty() {
            return Err(ConfigError::BlankPersona);
        }
        check_range(
            "focus_minutes",
            i64::from(self.focus_minutes),
            i64::from(FOCUS_MIN_MINUTES),
            i64::from(FOCUS_MAX_MINUTES),
        )?;
        check_range(
            "forecast_days",
            i64::from(self.forecast_days),
            i64::from(FORECAST_DAYS_MIN),
            i64::from(FORECAST_DAYS_MAX),
        )?;
        check_range(
            "default_intensity",
            i64::from(self.default_intensity),
            i64::from(INTENSITY_MIN),
            i64::from(INTENSITY_MAX),
        )
    }
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default_config());
        assert_eq!(config.persona, "Katinka");
        assert_eq!(config.default_weather, WeatherKind::Cloudy);
    }

    #[test]
    fn fields_override_defaults() {
        let config = SessionConfig::from_json(
            r#"{"persona":"Robin","focus_minutes":25,"forecast_days":10,"default_weather":"stormy","seed":42}"#,
        )
        .unwrap();
        assert_eq!(config.persona, "Robin");
        assert_eq!(config.focus_minutes, 25);
        assert_eq!(config.default_weather, WeatherKind::Stormy);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let err = SessionConfig::from_json(r#"{"focus_minutes":0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RangeViolation {
                field: "focus_minutes",
                ..
            }
        ));
        assert!(SessionConfig::from_json(r#"{"forecast_days":20}"#).is_err());
        assert!(SessionConfig::from_json(r#"{"default_intensity":11}"#).is_err());
        assert_eq!(
            SessionConfig::from_json(r#"{"persona":"  "}"#),
            Err(ConfigError::BlankPersona)
        );
        assert!(matches!(
            SessionConfig::from_json("[1,2"),
            Err(ConfigError::Parse(_))
        ));
    }
}
