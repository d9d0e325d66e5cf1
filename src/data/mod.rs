pub mod rest;
pub mod types;

pub use rest::IpoRest;
pub use types::{
    JoinedTier, StockDetailsResponse, StockInfo, SubscriptionDetail, TierDetailsResponse,
    TierResult,
};

use crate::engine::{TierCandidate, TierStats};

/// Join subscription details to their published tier results and shape
/// them for the comparator.
///
/// Exact `match_key` equality wins; rows without a usable key fall back
/// to matching on stock id plus share count within `epsilon`. The
/// epsilon absorbs decimal disagreement between the two upstream tables
/// (one stores 4000, the other 4000.00), it is not a rounding artifact.
pub fn tier_candidates(
    details: &[SubscriptionDetail],
    tiers: &[TierResult],
    epsilon: f64,
) -> Vec<TierCandidate> {
    details
        .iter()
        .map(|detail| {
            let matched = tiers.iter().find(|tier| {
                if let (Some(a), Some(b)) = (&detail.match_key, &tier.match_key) {
                    if a == b {
                        return true;
                    }
                }
                detail.stock_id == tier.stock_id
                    && tier
                        .shares_applied
                        .is_some_and(|shares| (detail.shares_applied - shares).abs() < epsilon)
            });
            TierCandidate {
                label: tier_label(detail.apply_group.as_deref(), detail.shares_applied),
                shares_applied: detail.shares_applied,
                stats: matched.map(tier_stats).unwrap_or_default(),
            }
        })
        .collect()
}

/// The `/api/tier-details` endpoint performs the join server-side; its
/// rows convert directly.
pub fn candidates_from_joined(tiers: &[JoinedTier]) -> Vec<TierCandidate> {
    tiers
        .iter()
        .map(|tier| TierCandidate {
            label: tier_label(tier.apply_group.as_deref(), tier.shares_applied),
            shares_applied: tier.shares_applied,
            stats: TierStats {
                alloc_pct: tier.approx_alloc_pct,
                valid_applications: tier.valid_applications,
                winners: tier.winners,
            },
        })
        .collect()
}

fn tier_label(apply_group: Option<&str>, shares_applied: f64) -> String {
    match apply_group {
        Some(group) if !group.trim().is_empty() => group.to_string(),
        _ => format!("{shares_applied:.0} shares"),
    }
}

fn tier_stats(tier: &TierResult) -> TierStats {
    TierStats {
        alloc_pct: tier.approx_alloc_pct,
        valid_applications: tier.valid_applications,
        winners: tier.winners,
    }
}
