//! Forward planner: projects returns for named baskets of hypothetical
//! IPO subscriptions before any allocation is known, and picks the plan
//! with the best return rate among those the capital can actually fund.

use serde::{Deserialize, Serialize};

use super::costs::{financing_cost, FinancingMultiple};
use super::error::{EngineError, InputField, PlanRejectReason, PlanRejection};

/// One hypothetical IPO subscription inside a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub code: String,
    pub shares: f64,
    pub price: f64,
    /// Assumed allocation rate, percent.
    pub alloc_rate_pct: f64,
    /// Assumed allocated shares.
    pub allocated_shares: f64,
    /// Assumed first-day gain, percent.
    pub expected_gain_pct: f64,
}

/// Named, ordered basket of hypothetical subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub entries: Vec<PlanEntry>,
}

/// Financing assumption shared by all plans under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlannerFinancing {
    pub multiple: FinancingMultiple,
    /// Annual interest rate as a fraction.
    pub annual_rate: f64,
    pub holding_days: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlannerConfig {
    /// `None` means cash-only: available capital is just own capital.
    pub financing: Option<PlannerFinancing>,
}

/// Always-recomputed projection for one plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResult {
    pub name: String,
    pub capital_used: f64,
    pub financing_amount: f64,
    pub financing_cost: f64,
    pub net_profit: f64,
    /// Net profit over own capital, percent.
    pub return_rate: f64,
    /// Capital used is positive and within the deployable total.
    pub is_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEvaluation {
    pub results: Vec<PlanResult>,
    /// Index into `results` of the best valid plan.
    pub best: usize,
}

/// Project every plan and select the best by return rate among valid
/// plans. Ties go to the earlier plan by insertion order. When no plan
/// is fundable the error carries a per-plan rejection reason.
pub fn evaluate_plans(
    plans: &[Plan],
    own_capital: f64,
    config: &PlannerConfig,
) -> Result<PlanEvaluation, EngineError> {
    if !own_capital.is_finite() || own_capital <= 0.0 {
        return Err(EngineError::InvalidInput(InputField::OwnCapital));
    }
    if let Some(financing) = &config.financing {
        if !financing.annual_rate.is_finite() || financing.annual_rate < 0.0 {
            return Err(EngineError::InvalidInput(InputField::FinancingRate));
        }
        if !financing.holding_days.is_finite() || financing.holding_days < 0.0 {
            return Err(EngineError::InvalidInput(InputField::HoldingDays));
        }
    }

    let available_capital = match &config.financing {
        Some(financing) => own_capital * financing.multiple.factor(),
        None => own_capital,
    };

    let results: Vec<PlanResult> = plans
        .iter()
        .map(|plan| project_plan(plan, own_capital, available_capital, config))
        .collect();

    // First valid plan wins ties: strict > never replaces an equal earlier one.
    let mut best: Option<(usize, f64)> = None;
    for (idx, result) in results.iter().enumerate() {
        if !result.is_valid {
            continue;
        }
        if best.is_none_or(|(_, rate)| result.return_rate > rate) {
            best = Some((idx, result.return_rate));
        }
    }

    match best {
        Some((best, _)) => Ok(PlanEvaluation { results, best }),
        None => Err(EngineError::NoValidPlan(
            results
                .iter()
                .map(|result| PlanRejection {
                    plan: result.name.clone(),
                    reason: if result.capital_used <= 0.0 {
                        PlanRejectReason::NoEntries
                    } else {
                        PlanRejectReason::CapitalExceeded {
                            required: result.capital_used,
                            available: available_capital,
                        }
                    },
                })
                .collect(),
        )),
    }
}

fn project_plan(
    plan: &Plan,
    own_capital: f64,
    available_capital: f64,
    config: &PlannerConfig,
) -> PlanResult {
    let mut capital_used = 0.0;
    let mut financing_amount = 0.0;
    let mut interest = 0.0;
    let mut net_profit = 0.0;

    for entry in &plan.entries {
        let entry_capital = entry.shares * entry.price;
        capital_used += entry_capital;

        // Expectation proxy: assumed allocation value scaled by the gain
        // and allocation-rate assumptions.
        let gross = entry.allocated_shares
            * entry.price
            * (entry.expected_gain_pct / 100.0)
            * (entry.alloc_rate_pct / 100.0);

        let entry_cost = match &config.financing {
            Some(financing) => {
                let financed = entry_capital - entry_capital / financing.multiple.factor();
                financing_amount += financed;
                financing_cost(financed, financing.annual_rate, financing.holding_days)
            }
            None => 0.0,
        };
        interest += entry_cost;
        net_profit += gross - entry_cost;
    }

    PlanResult {
        name: plan.name.clone(),
        capital_used,
        financing_amount,
        financing_cost: interest,
        net_profit,
        return_rate: net_profit / own_capital * 100.0,
        is_valid: capital_used > 0.0 && capital_used <= available_capital,
    }
}
