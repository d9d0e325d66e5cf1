pub mod allocation;
pub mod break_even;
pub mod comparator;
pub mod costs;
pub mod error;
pub mod planner;
pub mod returns;

pub use allocation::{estimate_allocated_shares, TierStats};
pub use break_even::break_even_price;
pub use comparator::{
    compare_strategies, ComparatorAssumptions, RankedTier, StrategyComparison, TierCandidate,
    TierOutcome,
};
pub use costs::{Financing, FinancingMode, FinancingMultiple, SELL_FEE_RATE};
pub use error::{EngineError, InputField, PlanRejectReason, PlanRejection};
pub use planner::{evaluate_plans, Plan, PlanEntry, PlanEvaluation, PlannerConfig, PlannerFinancing};
pub use returns::{compute_return, quick_forecast, CalculationInput, CalculationResult, SellFee};
