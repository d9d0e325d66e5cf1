//! Expected allocation from published lottery statistics.
//!
//! Tier results are published after the subscription window closes, so
//! "not available yet" is a normal state that must stay distinguishable
//! from an allocation that genuinely rounded to zero shares.

use serde::Serialize;

use super::error::{EngineError, InputField};

/// Published lottery outcome for one subscription tier. All fields are
/// optional because results appear days after the tier itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TierStats {
    /// Approximate allocation percentage as a fraction in [0, 1].
    pub alloc_pct: Option<f64>,
    pub valid_applications: Option<f64>,
    pub winners: Option<f64>,
}

impl TierStats {
    pub fn new(alloc_pct: f64, valid_applications: f64, winners: f64) -> Self {
        Self {
            alloc_pct: Some(alloc_pct),
            valid_applications: Some(valid_applications),
            winners: Some(winners),
        }
    }

    /// True once all three lottery figures have been published and are
    /// usable (winners must be strictly positive to divide by).
    pub fn is_published(&self) -> bool {
        matches!(
            (self.alloc_pct, self.valid_applications, self.winners),
            (Some(pct), Some(valid), Some(winners))
                if pct > 0.0 && valid > 0.0 && winners > 0.0
        )
    }
}

/// Expected allocated shares for an application of `shares_applied`:
/// `round(alloc_pct * valid_applications * shares_applied / winners)`.
///
/// Shares are discrete, so the result is rounded half away from zero
/// (`f64::round`); downstream expectation math depends on this exact
/// rounding. Missing or zero lottery figures yield `Unavailable`.
pub fn estimate_allocated_shares(
    shares_applied: f64,
    stats: &TierStats,
) -> Result<f64, EngineError> {
    if !shares_applied.is_finite() || shares_applied <= 0.0 {
        return Err(EngineError::InvalidInput(InputField::SharesApplied));
    }
    let (pct, valid, winners) = match (stats.alloc_pct, stats.valid_applications, stats.winners) {
        (Some(pct), Some(valid), Some(winners)) if pct > 0.0 && valid > 0.0 && winners > 0.0 => {
            (pct, valid, winners)
        }
        _ => return Err(EngineError::Unavailable),
    };
    if pct > 1.0 {
        return Err(EngineError::InvalidInput(InputField::AllocationPct));
    }
    Ok((pct * valid * shares_applied / winners).round())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_matches_published_stats() {
        // round(0.05 * 1000 * 40000 / 50) = 40000
        let stats = TierStats::new(0.05, 1000.0, 50.0);
        assert_eq!(estimate_allocated_shares(40_000.0, &stats), Ok(40_000.0));
    }

    #[test]
    fn test_rounding_is_half_to_nearest() {
        // 0.01 * 3 * 100 / 2 = 1.5 -> rounds to 2
        let stats = TierStats::new(0.01, 3.0, 2.0);
        assert_eq!(estimate_allocated_shares(100.0, &stats), Ok(2.0));

        // 0.01 * 7 * 100 / 5 = 1.4 -> rounds to 1
        let stats = TierStats::new(0.01, 7.0, 5.0);
        assert_eq!(estimate_allocated_shares(100.0, &stats), Ok(1.0));
    }

    #[test]
    fn test_missing_stats_are_unavailable_not_zero() {
        assert_eq!(
            estimate_allocated_shares(40_000.0, &TierStats::default()),
            Err(EngineError::Unavailable)
        );

        // Partially published is still unavailable.
        let partial = TierStats {
            alloc_pct: Some(0.05),
            valid_applications: Some(1000.0),
            winners: None,
        };
        assert_eq!(
            estimate_allocated_shares(40_000.0, &partial),
            Err(EngineError::Unavailable)
        );
    }

    #[test]
    fn test_zero_winners_is_unavailable() {
        let stats = TierStats::new(0.05, 1000.0, 0.0);
        assert_eq!(
            estimate_allocated_shares(40_000.0, &stats),
            Err(EngineError::Unavailable)
        );
    }

    #[test]
    fn test_tiny_allocation_can_round_to_zero() {
        // A computed zero is a valid result, distinct from Unavailable.
        let stats = TierStats::new(0.0001, 10.0, 100.0);
        assert_eq!(estimate_allocated_shares(100.0, &stats), Ok(0.0));
    }

    #[test]
    fn test_alloc_pct_above_one_is_invalid() {
        let stats = TierStats::new(1.5, 1000.0, 50.0);
        assert_eq!(
            estimate_allocated_shares(40_000.0, &stats),
            Err(EngineError::InvalidInput(InputField::AllocationPct))
        );
    }

    #[test]
    fn test_invalid_shares_applied() {
        let stats = TierStats::new(0.05, 1000.0, 50.0);
        assert_eq!(
            estimate_allocated_shares(0.0, &stats),
            Err(EngineError::InvalidInput(InputField::SharesApplied))
        );
        assert_eq!(
            estimate_allocated_shares(f64::NAN, &stats),
            Err(EngineError::InvalidInput(InputField::SharesApplied))
        );
    }

    #[test]
    fn test_estimate_is_deterministic_and_non_negative() {
        let stats = TierStats::new(0.013, 842.0, 61.0);
        let a = estimate_allocated_shares(20_000.0, &stats).unwrap();
        let b = estimate_allocated_shares(20_000.0, &stats).unwrap();
        assert_eq!(a, b);
        assert!(a >= 0.0);
    }
}
