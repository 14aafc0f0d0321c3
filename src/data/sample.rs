//! Synthetic withdrawal requests for the `simulate` command.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::LogNormal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::PenaltyRequest;
use crate::error::AppError;
use crate::io::ingest::BatchRow;

/// Term lengths (days) a synthetic deposit is drawn from.
pub const TERM_DAYS: [u32; 5] = [30, 90, 180, 365, 730];

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    /// Upper bound of the nominal penalty rate, in percent.
    pub max_rate: Decimal,
    /// Median principal; the log-normal is centred on `ln(median)`.
    pub principal_median: f64,
    /// Log-space standard deviation of the principal.
    pub principal_sigma: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 1_000,
            seed: 42,
            max_rate: Decimal::from(10),
            principal_median: 10_000.0,
            principal_sigma: 1.0,
        }
    }
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<BatchRow>, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    if config.max_rate < Decimal::ZERO || config.max_rate > Decimal::ONE_HUNDRED {
        return Err(AppError::new(2, "Sample max rate must be within [0, 100]."));
    }
    if !(config.principal_median.is_finite() && config.principal_median > 0.0) {
        return Err(AppError::new(2, "Sample principal median must be a positive number."));
    }
    if !(config.principal_sigma.is_finite() && config.principal_sigma >= 0.0) {
        return Err(AppError::new(2, "Sample principal sigma must be >= 0."));
    }

    let principal_dist = LogNormal::new(config.principal_median.ln(), config.principal_sigma)
        .map_err(|e| AppError::new(4, format!("Principal distribution error: {e}")))?;

    // Rates are drawn on a 0.1% grid.
    let max_tenths = (config.max_rate * Decimal::TEN)
        .floor()
        .to_u32()
        .ok_or_else(|| AppError::new(4, "Sample max rate out of range."))?;
    let min_principal = Decimal::new(1, 4);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut rows = Vec::with_capacity(config.count);

    for i in 0..config.count {
        let total_maturity_days = *TERM_DAYS
            .choose(&mut rng)
            .ok_or_else(|| AppError::new(4, "No term lengths to sample from."))?;
        let days_remaining = rng.gen_range(0..=total_maturity_days);

        let raw = principal_dist.sample(&mut rng);
        let principal = Decimal::from_f64(raw)
            .ok_or_else(|| AppError::new(4, format!("Sampled principal {raw} is not representable.")))?
            .round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven)
            .max(min_principal);

        let penalty_rate_percent = Decimal::new(i64::from(rng.gen_range(0..=max_tenths)), 1);

        rows.push(BatchRow {
            line: i + 1,
            id: format!("sim-{:05}", i + 1),
            request: PenaltyRequest::new(principal, penalty_rate_percent, days_remaining, total_maturity_days),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sample() {
        let config = SampleConfig {
            count: 50,
            ..SampleConfig::default()
        };
        assert_eq!(generate_sample(&config).unwrap(), generate_sample(&config).unwrap());

        let other = SampleConfig { seed: 43, ..config.clone() };
        assert_ne!(generate_sample(&config).unwrap(), generate_sample(&other).unwrap());
    }

    #[test]
    fn sampled_values_respect_bounds() {
        let config = SampleConfig {
            count: 500,
            max_rate: Decimal::new(35, 1),
            ..SampleConfig::default()
        };
        let rows = generate_sample(&config).unwrap();
        assert_eq!(rows.len(), 500);
        for row in &rows {
            let r = row.request;
            assert!(TERM_DAYS.contains(&r.total_maturity_days));
            assert!(r.days_remaining <= r.total_maturity_days);
            assert!(r.principal > Decimal::ZERO);
            assert!(r.principal.scale() <= 4);
            assert!(r.penalty_rate_percent >= Decimal::ZERO);
            assert!(r.penalty_rate_percent <= Decimal::new(35, 1));
            assert!(r.penalty_rate_percent.scale() <= 1);
        }
        assert_eq!(rows[0].id, "sim-00001");
        assert_eq!(rows[499].line, 500);
    }

    #[test]
    fn zero_max_rate_means_no_penalty() {
        let config = SampleConfig {
            count: 20,
            max_rate: Decimal::ZERO,
            ..SampleConfig::default()
        };
        let rows = generate_sample(&config).unwrap();
        assert!(rows.iter().all(|r| r.request.penalty_rate_percent.is_zero()));
    }

    #[test]
    fn rejects_bad_config() {
        let bad = [
            SampleConfig { count: 0, ..SampleConfig::default() },
            SampleConfig { max_rate: Decimal::from(-1), ..SampleConfig::default() },
            SampleConfig { principal_median: 0.0, ..SampleConfig::default() },
            SampleConfig { principal_sigma: f64::NAN, ..SampleConfig::default() },
        ];
        for config in bad {
            assert_eq!(generate_sample(&config).unwrap_err().exit_code(), 2);
        }
    }
}
