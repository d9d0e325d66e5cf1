use thiserror::Error;

/// Input field named by an `InvalidInput` error, so callers can point at
/// the exact form field instead of showing one generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    SharesApplied,
    IssuePrice,
    AllocatedShares,
    SellPrice,
    ApplicationFee,
    SellFee,
    FinancingAmount,
    FinancingRate,
    HoldingDays,
    AllocationPct,
    Capital,
    FeeRate,
    OwnCapital,
}

impl std::fmt::Display for InputField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InputField::SharesApplied => "shares applied",
            InputField::IssuePrice => "issue price",
            InputField::AllocatedShares => "allocated shares",
            InputField::SellPrice => "sell price",
            InputField::ApplicationFee => "application fee",
            InputField::SellFee => "sell fee",
            InputField::FinancingAmount => "financing amount",
            InputField::FinancingRate => "financing rate",
            InputField::HoldingDays => "holding days",
            InputField::AllocationPct => "allocation percentage",
            InputField::Capital => "capital",
            InputField::FeeRate => "fee rate",
            InputField::OwnCapital => "own capital",
        };
        f.write_str(name)
    }
}

/// Why a plan was rejected during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanRejectReason {
    /// Plan has no IPO entries (or zero total capital).
    NoEntries,
    /// Total capital used exceeds what the user can deploy.
    CapitalExceeded { required: f64, available: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRejection {
    pub plan: String,
    pub reason: PlanRejectReason,
}

/// Engine errors are plain values. `Unavailable` is an expected state
/// (lottery results not yet published), not a fault; callers must render
/// it distinctly from a computed zero.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid input: {0} must be a positive number")]
    InvalidInput(InputField),
    #[error("allocation result not yet available")]
    Unavailable,
    #[error("no plan satisfies the capital constraints")]
    NoValidPlan(Vec<PlanRejection>),
}
