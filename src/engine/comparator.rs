//! Ranks every subscription tier of a stock against each other.
//!
//! Each tier gets the same fixed financing assumption (10x multiple, so
//! 90% financed) and the modeled sell-fee rate, making the expected
//! values comparable across tiers. Tiers whose lottery results are not
//! yet published stay in the output as unavailable rows.

use serde::Serialize;

use super::allocation::{estimate_allocated_shares, TierStats};
use super::costs::{Financing, FinancingMode, FinancingMultiple};
use super::error::{EngineError, InputField};
use super::returns::{compute_return, CalculationInput, CalculationResult, FeeBreakdown, SellFee};

/// One subscription tier joined with its (possibly unpublished) lottery
/// statistics. Produced by the data layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCandidate {
    pub label: String,
    pub shares_applied: f64,
    pub stats: TierStats,
}

/// Fixed assumptions applied uniformly to every tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparatorAssumptions {
    pub multiple: FinancingMultiple,
    pub annual_rate: f64,
    pub holding_days: f64,
    pub application_fee: f64,
}

impl Default for ComparatorAssumptions {
    fn default() -> Self {
        Self {
            multiple: FinancingMultiple::X10,
            annual_rate: 0.05,
            holding_days: 7.0,
            application_fee: 100.0,
        }
    }
}

impl ComparatorAssumptions {
    fn financing(&self) -> Financing {
        Financing {
            mode: FinancingMode::Multiple(self.multiple),
            annual_rate: self.annual_rate,
            holding_days: self.holding_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TierOutcome {
    /// Lottery results published; full calculation available.
    Ready {
        allocated: f64,
        result: CalculationResult,
    },
    /// Results not yet published for this tier.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTier {
    pub label: String,
    pub shares_applied: f64,
    /// Matches the user's actual application size within epsilon.
    pub is_actual: bool,
    pub outcome: TierOutcome,
}

impl RankedTier {
    pub fn expected_value(&self) -> Option<f64> {
        match &self.outcome {
            TierOutcome::Ready { result, .. } => result.expected_value,
            TierOutcome::Unavailable => None,
        }
    }

    fn sort_key(&self) -> f64 {
        self.expected_value().unwrap_or(f64::NEG_INFINITY)
    }
}

/// Comparison output: rows sorted by descending expected value (stable,
/// ties keep the original tier order) plus indices of the winners per
/// metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyComparison {
    pub rows: Vec<RankedTier>,
    pub best_net_profit: Option<usize>,
    pub best_return_rate: Option<usize>,
    pub best_expected_value: Option<usize>,
}

/// Evaluate every tier under the shared assumptions and rank them.
/// Input tiers are never mutated.
pub fn compare_strategies(
    tiers: &[TierCandidate],
    issue_price: f64,
    sell_price: f64,
    actual_shares_applied: Option<f64>,
    epsilon: f64,
    assumptions: &ComparatorAssumptions,
) -> Result<StrategyComparison, EngineError> {
    if !issue_price.is_finite() || issue_price <= 0.0 {
        return Err(EngineError::InvalidInput(InputField::IssuePrice));
    }
    if !sell_price.is_finite() || sell_price <= 0.0 {
        return Err(EngineError::InvalidInput(InputField::SellPrice));
    }

    let financing = assumptions.financing();
    financing.validate()?;

    let mut rows = Vec::with_capacity(tiers.len());
    for tier in tiers {
        let is_actual = actual_shares_applied
            .is_some_and(|actual| (tier.shares_applied - actual).abs() < epsilon);

        let outcome = match estimate_allocated_shares(tier.shares_applied, &tier.stats) {
            Ok(allocated) if allocated > 0.0 => {
                let mut result = compute_return(&CalculationInput {
                    shares_applied: tier.shares_applied,
                    issue_price,
                    allocated_shares: allocated,
                    sell_price,
                    application_fee: assumptions.application_fee,
                    sell_fee: SellFee::Modeled,
                    financing: Some(financing),
                })?;
                // The expectation uses the estimated allocation, which is
                // exactly what this result was computed from.
                result.expected_value = Some(result.net_profit);
                TierOutcome::Ready { allocated, result }
            }
            // Allocation rounded to zero: fees are still owed, the
            // expectation is the pure fee loss.
            Ok(_) => TierOutcome::Ready {
                allocated: 0.0,
                result: zero_allocation_result(tier.shares_applied, issue_price, &financing, assumptions),
            },
            Err(EngineError::Unavailable) => TierOutcome::Unavailable,
            Err(err) => return Err(err),
        };

        rows.push(RankedTier {
            label: tier.label.clone(),
            shares_applied: tier.shares_applied,
            is_actual,
            outcome,
        });
    }

    // Stable sort: equal expected values keep the original tier order,
    // unavailable rows sink to the bottom.
    rows.sort_by(|a, b| b.sort_key().partial_cmp(&a.sort_key()).unwrap_or(std::cmp::Ordering::Equal));

    let best_net_profit = best_index(&rows, |r| r.net_profit);
    let best_return_rate = best_index(&rows, |r| r.return_rate);
    let best_expected_value = best_index(&rows, |r| r.expected_value.unwrap_or(f64::NEG_INFINITY));

    Ok(StrategyComparison {
        rows,
        best_net_profit,
        best_return_rate,
        best_expected_value,
    })
}

fn best_index(rows: &[RankedTier], metric: impl Fn(&CalculationResult) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, row) in rows.iter().enumerate() {
        if let TierOutcome::Ready { result, .. } = &row.outcome {
            let value = metric(result);
            // Strict comparison: ties resolve to the earlier row.
            if best.is_none_or(|(_, best_value)| value > best_value) {
                best = Some((idx, value));
            }
        }
    }
    best.map(|(idx, _)| idx)
}

fn zero_allocation_result(
    shares_applied: f64,
    issue_price: f64,
    financing: &Financing,
    assumptions: &ComparatorAssumptions,
) -> CalculationResult {
    let breakdown = financing.breakdown(shares_applied * issue_price);
    let fees = FeeBreakdown {
        application: assumptions.application_fee,
        financing: breakdown.cost,
        sell: 0.0,
        total: assumptions.application_fee + breakdown.cost,
    };
    let net_profit = -fees.total;
    let capital_base = breakdown.own_capital.unwrap_or(shares_applied * issue_price);
    CalculationResult {
        paid_amount: 0.0,
        sell_revenue: 0.0,
        gross_profit: 0.0,
        fees,
        net_profit,
        return_rate: net_profit / capital_base * 100.0,
        break_even_price: None,
        expected_value: Some(net_profit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<TierCandidate> {
        vec![
            TierCandidate {
                label: "1 lot".to_string(),
                shares_applied: 2_000.0,
                stats: TierStats::new(0.5, 200.0, 100.0),
            },
            TierCandidate {
                label: "5 lots".to_string(),
                shares_applied: 10_000.0,
                stats: TierStats::new(0.2, 150.0, 60.0),
            },
            TierCandidate {
                label: "20 lots".to_string(),
                shares_applied: 40_000.0,
                stats: TierStats::default(), // not yet published
            },
        ]
    }

    #[test]
    fn test_rows_sorted_by_descending_expected_value() {
        let comparison = compare_strategies(
            &candidates(),
            10.0,
            12.0,
            None,
            0.01,
            &ComparatorAssumptions::default(),
        )
        .unwrap();

        assert_eq!(comparison.rows.len(), 3);
        let expected: Vec<Option<f64>> =
            comparison.rows.iter().map(|r| r.expected_value()).collect();
        for pair in expected.windows(2) {
            let a = pair[0].unwrap_or(f64::NEG_INFINITY);
            let b = pair[1].unwrap_or(f64::NEG_INFINITY);
            assert!(a >= b, "rows out of order: {a} before {b}");
        }
        // The unpublished tier sinks to the bottom instead of vanishing.
        assert_eq!(comparison.rows[2].outcome, TierOutcome::Unavailable);
        assert_eq!(comparison.rows[2].label, "20 lots");
    }

    #[test]
    fn test_ranking_is_stable_across_reruns() {
        let tiers = candidates();
        let assumptions = ComparatorAssumptions::default();
        let first = compare_strategies(&tiers, 10.0, 12.0, None, 0.01, &assumptions).unwrap();
        let second = compare_strategies(&tiers, 10.0, 12.0, None, 0.01, &assumptions).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_actual_tier_flagged_by_epsilon_match() {
        let comparison = compare_strategies(
            &candidates(),
            10.0,
            12.0,
            Some(10_000.005), // decimals differ upstream, epsilon absorbs it
            0.01,
            &ComparatorAssumptions::default(),
        )
        .unwrap();

        let actual: Vec<&RankedTier> =
            comparison.rows.iter().filter(|r| r.is_actual).collect();
        assert_eq!(actual.len(), 1);
        assert_eq!(actual[0].label, "5 lots");
    }

    #[test]
    fn test_best_indices_point_at_ready_rows() {
        let comparison = compare_strategies(
            &candidates(),
            10.0,
            12.0,
            None,
            0.01,
            &ComparatorAssumptions::default(),
        )
        .unwrap();

        for idx in [
            comparison.best_net_profit,
            comparison.best_return_rate,
            comparison.best_expected_value,
        ] {
            let idx = idx.expect("two tiers have published results");
            assert!(matches!(
                comparison.rows[idx].outcome,
                TierOutcome::Ready { .. }
            ));
        }
    }

    #[test]
    fn test_all_unpublished_yields_no_best() {
        let tiers = vec![TierCandidate {
            label: "1 lot".to_string(),
            shares_applied: 2_000.0,
            stats: TierStats::default(),
        }];
        let comparison = compare_strategies(
            &tiers,
            10.0,
            12.0,
            None,
            0.01,
            &ComparatorAssumptions::default(),
        )
        .unwrap();
        assert_eq!(comparison.best_expected_value, None);
        assert_eq!(comparison.rows[0].outcome, TierOutcome::Unavailable);
    }

    #[test]
    fn test_zero_allocation_row_carries_fee_loss() {
        // Estimator rounds to zero shares: the row stays, expectation is
        // the negative of the fees still owed.
        let tiers = vec![TierCandidate {
            label: "1 lot".to_string(),
            shares_applied: 100.0,
            stats: TierStats::new(0.0001, 10.0, 100.0),
        }];
        let comparison = compare_strategies(
            &tiers,
            10.0,
            12.0,
            None,
            0.01,
            &ComparatorAssumptions::default(),
        )
        .unwrap();
        match &comparison.rows[0].outcome {
            TierOutcome::Ready { allocated, result } => {
                assert_eq!(*allocated, 0.0);
                assert!(result.net_profit < 0.0);
                assert_eq!(result.expected_value, Some(result.net_profit));
                assert_eq!(result.break_even_price, None);
            }
            other => panic!("expected ready row, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_prices_rejected_before_iteration() {
        let err = compare_strategies(
            &candidates(),
            0.0,
            12.0,
            None,
            0.01,
            &ComparatorAssumptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, EngineError::InvalidInput(InputField::IssuePrice));
    }
}
