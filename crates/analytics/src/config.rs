//! Engine tuning knobs.
//!
//! Loaded hierarchically:
//! 1. Default values in code (the documented thresholds)
//! 2. Environment variable overrides with the `STOCKLENS_` prefix

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use stocklens_core::{DomainError, DomainResult};

/// Thresholds used by the forecaster, usage classifier and top-value ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// `days_until_empty <= urgent_days` is urgent.
    pub urgent_days: f64,

    /// `days_until_empty <= warning_days` is a warning.
    pub warning_days: f64,

    /// `movements >= window_days * high_frequency_ratio` is high frequency.
    pub high_frequency_ratio: f64,

    /// `movements >= window_days * medium_frequency_ratio` is medium frequency.
    pub medium_frequency_ratio: f64,

    /// Maximum number of entries in the top-value ranking.
    pub top_value_limit: usize,

    /// Reorder date reported when an item has no usable consumption data.
    pub no_usage_horizon_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            urgent_days: 3.0,
            warning_days: 7.0,
            high_frequency_ratio: 0.5,
            medium_frequency_ratio: 0.2,
            top_value_limit: 10,
            no_usage_horizon_days: 365,
        }
    }
}

impl AnalyticsConfig {
    /// Load from defaults + `STOCKLENS_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Environment::with_prefix("STOCKLENS"))
    }

    /// Load from defaults + the given environment source.
    pub fn load_from(env: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cfg: Self = Config::builder()
            .set_default("urgent_days", defaults.urgent_days)?
            .set_default("warning_days", defaults.warning_days)?
            .set_default("high_frequency_ratio", defaults.high_frequency_ratio)?
            .set_default("medium_frequency_ratio", defaults.medium_frequency_ratio)?
            .set_default("top_value_limit", defaults.top_value_limit as i64)?
            .set_default("no_usage_horizon_days", i64::from(defaults.no_usage_horizon_days))?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        cfg.validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if !(self.urgent_days.is_finite() && self.urgent_days >= 0.0) {
            return Err(DomainError::validation("urgent_days must be a finite non-negative number"));
        }
        if !(self.warning_days.is_finite() && self.warning_days >= self.urgent_days) {
            return Err(DomainError::validation("warning_days must be finite and >= urgent_days"));
        }
        let ratio_ok = |r: f64| r.is_finite() && (0.0..=1.0).contains(&r);
        if !ratio_ok(self.high_frequency_ratio) || !ratio_ok(self.medium_frequency_ratio) {
            return Err(DomainError::validation("frequency ratios must lie in [0, 1]"));
        }
        if self.medium_frequency_ratio > self.high_frequency_ratio {
            return Err(DomainError::validation(
                "medium_frequency_ratio must not exceed high_frequency_ratio",
            ));
        }
        if self.no_usage_horizon_days == 0 {
            return Err(DomainError::validation("no_usage_horizon_days must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        Environment::with_prefix("STOCKLENS").source(Some(map))
    }

    #[test]
    fn defaults_match_documented_thresholds() {
        let cfg = AnalyticsConfig::load_from(env(&[])).unwrap();
        assert_eq!(cfg, AnalyticsConfig::default());
        assert_eq!(cfg.urgent_days, 3.0);
        assert_eq!(cfg.warning_days, 7.0);
        assert_eq!(cfg.top_value_limit, 10);
    }

    #[test]
    fn environment_overrides_defaults() {
        let cfg = AnalyticsConfig::load_from(env(&[
            ("STOCKLENS_URGENT_DAYS", "2"),
            ("STOCKLENS_TOP_VALUE_LIMIT", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.urgent_days, 2.0);
        assert_eq!(cfg.top_value_limit, 5);
        assert_eq!(cfg.warning_days, 7.0);
    }

    #[test]
    fn inconsistent_thresholds_are_rejected() {
        let err = AnalyticsConfig::load_from(env(&[("STOCKLENS_WARNING_DAYS", "1")])).unwrap_err();
        assert!(err.to_string().contains("warning_days"));

        let cfg = AnalyticsConfig {
            medium_frequency_ratio: 0.9,
            ..AnalyticsConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
