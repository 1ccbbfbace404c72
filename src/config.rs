//! Engine configuration loaded from TOML.
//!
//! Every field has a production default, so a missing file or an empty
//! table changes nothing; `load` is read, parse, validate. Logging setup
//! lives here because the log level and format are configuration.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

use crate::domain::ranking::RankingConfig;
use crate::domain::trend::TrendConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber. `RUST_LOG` wins over the
    /// configured level when set.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

/// Top-level engine tuning.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub trend: TrendConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    /// Fails if the file cannot be read or parsed, or if a tuning value is
    /// out of range.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check all tuning values.
    ///
    /// # Errors
    /// Returns the first out-of-range field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("ranking.profitability_weight", self.ranking.profitability_weight),
            ("ranking.risk_weight", self.ranking.risk_weight),
            (
                "ranking.competitiveness_weight",
                self.ranking.competitiveness_weight,
            ),
        ];
        for (field, weight) in weights {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be between 0 and 1, got {weight}"),
                });
            }
        }
        let weight_sum = self.ranking.profitability_weight
            + self.ranking.risk_weight
            + self.ranking.competitiveness_weight;
        if (weight_sum - 1.0).abs() > 1e-9 {
            return Err(ConfigError::InvalidValue {
                field: "ranking weights",
                reason: format!("must sum to 1, got {weight_sum}"),
            });
        }

        let boosts = [
            ("ranking.trend_boost", self.ranking.trend_boost),
            ("ranking.safety_boost", self.ranking.safety_boost),
            ("ranking.profit_boost", self.ranking.profit_boost),
            (
                "ranking.keyword_overlap_scale",
                self.ranking.keyword_overlap_scale,
            ),
        ];
        for (field, boost) in boosts {
            if boost < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be non-negative, got {boost}"),
                });
            }
        }

        if self.trend.volatility_threshold_pct <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "trend.volatility_threshold_pct",
                reason: "must be positive".to_string(),
            });
        }
        if self.trend.slope_threshold <= rust_decimal::Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "trend.slope_threshold",
                reason: "must be positive".to_string(),
            });
        }
        if self.trend.window_len < 2 {
            return Err(ConfigError::InvalidValue {
                field: "trend.window_len",
                reason: "must be at least 2".to_string(),
            });
        }
        if self.trend.prediction_horizon_days < 1 {
            return Err(ConfigError::InvalidValue {
                field: "trend.prediction_horizon_days",
                reason: "must be at least 1".to_string(),
            });
        }
        let band = self.trend.confidence_band_pct;
        if band <= rust_decimal::Decimal::ZERO || band >= rust_decimal::Decimal::ONE_HUNDRED {
            return Err(ConfigError::InvalidValue {
                field: "trend.confidence_band_pct",
                reason: "must be between 0 and 100 exclusive".to_string(),
            });
        }

        if self.logging.level.is_empty() {
            return Err(ConfigError::MissingField { field: "logging.level" });
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level",
                reason: format!("expected one of {LOG_LEVELS:?}, got {}", self.logging.level),
            });
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected one of {LOG_FORMATS:?}, got {}", self.logging.format),
            });
        }

        Ok(())
    }

    /// Install the global tracing subscriber per the logging section.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_are_the_production_constants() {
        let config = EngineConfig::default();
        assert!((config.ranking.profitability_weight - 0.4).abs() < 1e-9);
        assert!((config.ranking.risk_weight - 0.3).abs() < 1e-9);
        assert!((config.ranking.trend_boost - 15.0).abs() < 1e-9);
        assert!((config.trend.volatility_threshold_pct - 15.0).abs() < 1e-9);
        assert_eq!(config.trend.slope_threshold, dec!(0.05));
        assert_eq!(config.trend.window_len, 10);
        assert_eq!(config.trend.prediction_horizon_days, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
[trend]
window_len = 5
"#,
        )
        .unwrap();
        assert_eq!(config.trend.window_len, 5);
        assert_eq!(config.trend.prediction_horizon_days, 30);
        assert!((config.ranking.profitability_weight - 0.4).abs() < 1e-9);
    }

    #[test]
    fn weights_must_sum_to_one() {
        let config: EngineConfig = toml::from_str(
            r#"
[ranking]
profitability_weight = 0.9
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "ranking weights",
                ..
            }
        ));
    }

    #[test]
    fn window_len_below_two_is_rejected() {
        let config: EngineConfig = toml::from_str(
            r#"
[trend]
window_len = 1
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "trend.window_len",
                ..
            })
        ));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let config: EngineConfig = toml::from_str(
            r#"
[logging]
format = "xml"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "logging.format",
                ..
            })
        ));
    }
}
