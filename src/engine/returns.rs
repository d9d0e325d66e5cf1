//! Return calculation for one IPO subscription.
//!
//! Pure functions over explicit input structs: every result is
//! re-derived from the current inputs, nothing is cached or persisted.

use serde::Serialize;

use super::break_even::break_even_price;
use super::costs::{modeled_sell_fee, Financing, FinancingMode};
use super::error::{EngineError, InputField};

/// Sell-side fee, either entered by the user as a flat total or modeled
/// at the fixed combined rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SellFee {
    Flat(f64),
    Modeled,
}

/// Transient user input for one calculation. Lives for exactly one
/// `compute_return` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationInput {
    pub shares_applied: f64,
    pub issue_price: f64,
    /// Manually entered or estimator-derived.
    pub allocated_shares: f64,
    pub sell_price: f64,
    pub application_fee: f64,
    pub sell_fee: SellFee,
    pub financing: Option<Financing>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeeBreakdown {
    pub application: f64,
    pub financing: f64,
    pub sell: f64,
    pub total: f64,
}

/// Immutable output of one calculation, superseded wholesale by the next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub paid_amount: f64,
    pub sell_revenue: f64,
    pub gross_profit: f64,
    pub fees: FeeBreakdown,
    pub net_profit: f64,
    /// Net profit relative to own capital, in percent.
    pub return_rate: f64,
    pub break_even_price: Option<f64>,
    /// Estimated-allocation expectation; filled by the strategy
    /// comparator, `None` for direct calculations.
    pub expected_value: Option<f64>,
}

fn require_positive(value: f64, field: InputField) -> Result<f64, EngineError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::InvalidInput(field));
    }
    Ok(value)
}

fn require_non_negative(value: f64, field: InputField) -> Result<f64, EngineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::InvalidInput(field));
    }
    Ok(value)
}

/// Compute gross/net profit, fee breakdown, return rate and break-even
/// price for one subscription.
///
/// Validation runs before any arithmetic and names the offending field.
/// The return rate is measured against own capital when financing by
/// multiple is active (own capital is derivable there), otherwise
/// against the full application amount.
pub fn compute_return(input: &CalculationInput) -> Result<CalculationResult, EngineError> {
    let shares_applied = require_positive(input.shares_applied, InputField::SharesApplied)?;
    let issue_price = require_positive(input.issue_price, InputField::IssuePrice)?;
    let allocated = require_positive(input.allocated_shares, InputField::AllocatedShares)?;
    let sell_price = require_positive(input.sell_price, InputField::SellPrice)?;
    let application_fee = require_non_negative(input.application_fee, InputField::ApplicationFee)?;
    if let SellFee::Flat(flat) = input.sell_fee {
        require_non_negative(flat, InputField::SellFee)?;
    }
    if let Some(financing) = &input.financing {
        financing.validate()?;
    }

    let paid_amount = allocated * issue_price;
    let sell_revenue = allocated * sell_price;
    let gross_profit = sell_revenue - paid_amount;

    let total_capital = shares_applied * issue_price;
    let financing_breakdown = input.financing.map(|f| f.breakdown(total_capital));
    let financing_cost = financing_breakdown.map_or(0.0, |b| b.cost);

    let sell_fee = match input.sell_fee {
        SellFee::Flat(flat) => flat,
        SellFee::Modeled => modeled_sell_fee(sell_revenue),
    };

    let fees = FeeBreakdown {
        application: application_fee,
        financing: financing_cost,
        sell: sell_fee,
        total: application_fee + financing_cost + sell_fee,
    };
    let net_profit = gross_profit - fees.total;

    let capital_base = match (&input.financing, financing_breakdown) {
        (
            Some(Financing {
                mode: FinancingMode::Multiple(_),
                ..
            }),
            Some(breakdown),
        ) => breakdown.own_capital.unwrap_or(total_capital),
        _ => total_capital,
    };
    let return_rate = net_profit / capital_base * 100.0;

    Ok(CalculationResult {
        paid_amount,
        sell_revenue,
        gross_profit,
        fees,
        net_profit,
        return_rate,
        break_even_price: break_even_price(issue_price, allocated, application_fee, financing_cost),
        expected_value: None,
    })
}

/// Average first-day gain assumed by the quick forecast.
pub const AVG_FIRST_DAY_GAIN: f64 = 0.10;
/// Base lottery win rate assumed by the quick forecast.
pub const BASE_WIN_RATE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuickForecast {
    /// Percentage the price must rise for fees to be covered.
    pub break_even_uplift_pct: f64,
    pub fee_cost: f64,
    pub expected_return: f64,
}

/// Rough pre-subscription forecast from capital and a flat fee rate,
/// assuming the historical average first-day gain and win rate.
pub fn quick_forecast(capital: f64, fee_rate: f64) -> Result<QuickForecast, EngineError> {
    let capital = require_positive(capital, InputField::Capital)?;
    let fee_rate = require_non_negative(fee_rate, InputField::FeeRate)?;
    Ok(QuickForecast {
        break_even_uplift_pct: fee_rate * 100.0,
        fee_cost: capital * fee_rate,
        expected_return: capital * AVG_FIRST_DAY_GAIN * BASE_WIN_RATE - capital * fee_rate,
    })
}
