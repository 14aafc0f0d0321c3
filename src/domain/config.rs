//! Engine configuration.
//!
//! Resolution order (lowest to highest):
//! - built-in defaults
//! - `.env` / process environment (`PENALTY_*`)
//! - CLI flags (applied by `app::engine_config_from_args`)

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{OverrunPolicy, SeverityThresholds};
use crate::engine::PenaltyError;
use crate::error::AppError;

pub const ENV_OVERRUN_POLICY: &str = "PENALTY_OVERRUN_POLICY";
pub const ENV_MEDIUM_THRESHOLD: &str = "PENALTY_MEDIUM_THRESHOLD";
pub const ENV_HIGH_THRESHOLD: &str = "PENALTY_HIGH_THRESHOLD";
pub const ENV_AMOUNT_SCALE: &str = "PENALTY_AMOUNT_SCALE";

/// Token-style 18 decimal places.
pub const DEFAULT_AMOUNT_SCALE: u32 = 18;

/// Largest scale a `Decimal` can carry.
pub const MAX_AMOUNT_SCALE: u32 = 28;

/// Knobs that shape how requests are validated and results rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub overrun_policy: OverrunPolicy,
    pub thresholds: SeverityThresholds,
    /// Decimal places kept on `penalty_amount` (and therefore `net_withdrawal`).
    pub amount_scale: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overrun_policy: OverrunPolicy::default(),
            thresholds: SeverityThresholds::default(),
            amount_scale: DEFAULT_AMOUNT_SCALE,
        }
    }
}

impl EngineConfig {
    /// Load overrides from `.env` and the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_OVERRUN_POLICY) {
            config.overrun_policy = OverrunPolicy::parse(&raw).ok_or_else(|| {
                AppError::new(
                    2,
                    format!("Invalid {ENV_OVERRUN_POLICY} '{raw}' (expected 'reject' or 'clamp')."),
                )
            })?;
            debug!(policy = config.overrun_policy.as_str(), "overrun policy from environment");
        }
        if let Some(raw) = lookup(ENV_MEDIUM_THRESHOLD) {
            config.thresholds.medium = parse_env_decimal(ENV_MEDIUM_THRESHOLD, &raw)?;
            debug!(medium = %config.thresholds.medium, "medium threshold from environment");
        }
        if let Some(raw) = lookup(ENV_HIGH_THRESHOLD) {
            config.thresholds.high = parse_env_decimal(ENV_HIGH_THRESHOLD, &raw)?;
            debug!(high = %config.thresholds.high, "high threshold from environment");
        }
        if let Some(raw) = lookup(ENV_AMOUNT_SCALE) {
            config.amount_scale = raw.trim().parse().map_err(|e| {
                AppError::new(2, format!("Invalid {ENV_AMOUNT_SCALE} '{raw}': {e}"))
            })?;
            debug!(scale = config.amount_scale, "amount scale from environment");
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot honour.
    pub fn validate(&self) -> Result<(), PenaltyError> {
        let SeverityThresholds { medium, high } = self.thresholds;
        if medium <= Decimal::ZERO {
            return Err(PenaltyError::InvalidArgument(format!(
                "medium severity threshold must be > 0 (got {medium})"
            )));
        }
        if high <= medium {
            return Err(PenaltyError::InvalidArgument(format!(
                "high severity threshold ({high}) must be greater than medium ({medium})"
            )));
        }
        if self.amount_scale > MAX_AMOUNT_SCALE {
            return Err(PenaltyError::InvalidArgument(format!(
                "amount scale must be <= {MAX_AMOUNT_SCALE} (got {})",
                self.amount_scale
            )));
        }
        Ok(())
    }
}

fn parse_env_decimal(key: &str, raw: &str) -> Result<Decimal, AppError> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| AppError::new(2, format!("Invalid {key} '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = EngineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.overrun_policy, OverrunPolicy::Reject);
        assert_eq!(config.thresholds.medium, Decimal::new(5, 2));
        assert_eq!(config.thresholds.high, Decimal::new(15, 2));
        assert_eq!(config.amount_scale, 18);
    }

    #[test]
    fn environment_overrides_are_applied() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (ENV_OVERRUN_POLICY, "Clamp"),
            (ENV_MEDIUM_THRESHOLD, "0.1"),
            (ENV_HIGH_THRESHOLD, " 0.25 "),
            (ENV_AMOUNT_SCALE, "6"),
        ]))
        .unwrap();
        assert_eq!(config.overrun_policy, OverrunPolicy::Clamp);
        assert_eq!(config.thresholds.medium, Decimal::new(1, 1));
        assert_eq!(config.thresholds.high, Decimal::new(25, 2));
        assert_eq!(config.amount_scale, 6);
    }

    #[test]
    fn bad_environment_values_exit_with_code_2() {
        let err = EngineConfig::from_lookup(lookup_from(&[(ENV_OVERRUN_POLICY, "ignore")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = EngineConfig::from_lookup(lookup_from(&[(ENV_AMOUNT_SCALE, "-1")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = EngineConfig::from_lookup(lookup_from(&[(ENV_HIGH_THRESHOLD, "0.01")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("greater than medium"));
    }

    #[test]
    fn validate_rejects_oversized_scale() {
        let config = EngineConfig {
            amount_scale: 29,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(PenaltyError::InvalidArgument(_))));
    }
}
