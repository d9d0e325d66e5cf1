//! Break-even sell price after all fees.

use super::costs::SELL_FEE_RATE;

/// Sell price at which net profit is exactly zero, assuming the modeled
/// sell-fee rate on the way out:
/// `(issue_price * allocated + app_fee + financing_cost) / (allocated * (1 - SELL_FEE_RATE))`.
///
/// Returns `None` when `allocated <= 0` or `issue_price` is unset —
/// break-even is undefined without shares to sell, never a silent
/// division by zero.
pub fn break_even_price(
    issue_price: f64,
    allocated: f64,
    application_fee: f64,
    financing_cost: f64,
) -> Option<f64> {
    if !allocated.is_finite() || allocated <= 0.0 {
        return None;
    }
    if !issue_price.is_finite() || issue_price <= 0.0 {
        return None;
    }
    let cost_basis = issue_price * allocated + application_fee + financing_cost;
    Some(cost_basis / (allocated * (1.0 - SELL_FEE_RATE)))
}
