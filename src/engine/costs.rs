//! Financing and transaction cost model for HK IPO subscriptions.
//!
//! Two mutually exclusive financing modes: a leverage multiple (own
//! capital = total / multiple, the rest financed) or an explicit
//! financed amount. Interest accrues daily and is charged whether or
//! not the lottery allocates anything.

use serde::Serialize;

use super::error::{EngineError, InputField};

/// Combined sell-side charge rate applied to sell revenue.
/// This is the normative constant every formula uses; the component
/// rates below must sum to it exactly.
pub const SELL_FEE_RATE: f64 = 0.0013219;

/// Stamp duty, 0.1% of consideration.
pub const STAMP_DUTY_RATE: f64 = 0.001;
/// SFC transaction levy, 0.0027%.
pub const SFC_LEVY_RATE: f64 = 0.000027;
/// HKEX trading fee, 0.00565%.
pub const HKEX_TRADING_FEE_RATE: f64 = 0.0000565;
/// AFRC levy, 0.00015%.
pub const AFRC_LEVY_RATE: f64 = 0.0000015;
/// CCASS settlement plus broker platform charge. Holds the remainder so
/// the five components reproduce `SELL_FEE_RATE` exactly.
pub const SETTLEMENT_PLATFORM_RATE: f64 = 0.0002369;

/// Leverage multiples brokers actually offer for IPO financing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FinancingMultiple {
    X5,
    X10,
    X15,
    X20,
}

impl FinancingMultiple {
    pub const ALL: [FinancingMultiple; 4] = [
        FinancingMultiple::X5,
        FinancingMultiple::X10,
        FinancingMultiple::X15,
        FinancingMultiple::X20,
    ];

    pub fn factor(self) -> f64 {
        match self {
            FinancingMultiple::X5 => 5.0,
            FinancingMultiple::X10 => 10.0,
            FinancingMultiple::X15 => 15.0,
            FinancingMultiple::X20 => 20.0,
        }
    }

    pub fn from_factor(factor: u32) -> Option<Self> {
        match factor {
            5 => Some(FinancingMultiple::X5),
            10 => Some(FinancingMultiple::X10),
            15 => Some(FinancingMultiple::X15),
            20 => Some(FinancingMultiple::X20),
            _ => None,
        }
    }
}

/// How the financed amount is determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FinancingMode {
    /// Own capital = total / multiple; the rest is financed.
    Multiple(FinancingMultiple),
    /// Financed amount supplied directly; own capital is not derived.
    ExplicitAmount(f64),
}

/// Financing terms for one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Financing {
    pub mode: FinancingMode,
    /// Annual interest rate as a fraction (0.05 = 5%).
    pub annual_rate: f64,
    pub holding_days: f64,
}

/// Derived financing figures for a given total capital requirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinancingBreakdown {
    /// Own capital, only derivable in multiple mode.
    pub own_capital: Option<f64>,
    pub amount: f64,
    pub cost: f64,
}

impl Financing {
    /// Validate the user-supplied financing fields before any arithmetic.
    pub fn validate(&self) -> Result<(), EngineError> {
        if let FinancingMode::ExplicitAmount(amount) = self.mode {
            if !amount.is_finite() || amount < 0.0 {
                return Err(EngineError::InvalidInput(InputField::FinancingAmount));
            }
        }
        if !self.annual_rate.is_finite() || self.annual_rate < 0.0 {
            return Err(EngineError::InvalidInput(InputField::FinancingRate));
        }
        if !self.holding_days.is_finite() || self.holding_days < 0.0 {
            return Err(EngineError::InvalidInput(InputField::HoldingDays));
        }
        Ok(())
    }

    /// Split `total_capital` (shares applied x issue price) into own
    /// capital, financed amount, and interest cost.
    pub fn breakdown(&self, total_capital: f64) -> FinancingBreakdown {
        let (own_capital, amount) = match self.mode {
            FinancingMode::Multiple(multiple) => {
                let own = total_capital / multiple.factor();
                (Some(own), (total_capital - own).max(0.0))
            }
            FinancingMode::ExplicitAmount(amount) => (None, amount.max(0.0)),
        };
        FinancingBreakdown {
            own_capital,
            amount,
            cost: financing_cost(amount, self.annual_rate, self.holding_days),
        }
    }
}

/// Daily-accrued interest on the financed amount. Never negative.
pub fn financing_cost(amount: f64, annual_rate: f64, holding_days: f64) -> f64 {
    (amount * (annual_rate / 365.0) * holding_days).max(0.0)
}

/// Sell-side charges at the fixed modeled rate.
pub fn modeled_sell_fee(sell_revenue: f64) -> f64 {
    sell_revenue * SELL_FEE_RATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sell_fee_components_sum_to_total() {
        let sum = STAMP_DUTY_RATE
            + SFC_LEVY_RATE
            + HKEX_TRADING_FEE_RATE
            + AFRC_LEVY_RATE
            + SETTLEMENT_PLATFORM_RATE;
        assert!(
            (sum - SELL_FEE_RATE).abs() < 1e-12,
            "components sum to {sum}, expected {SELL_FEE_RATE}"
        );
    }

    #[test]
    fn test_multiple_mode_breakdown() {
        // 10x on 10_000 shares at HKD 20: total 200_000, own 20_000,
        // financed 180_000. At 5% over 7 days interest is ~172.60.
        let financing = Financing {
            mode: FinancingMode::Multiple(FinancingMultiple::X10),
            annual_rate: 0.05,
            holding_days: 7.0,
        };
        let b = financing.breakdown(200_000.0);
        assert_eq!(b.own_capital, Some(20_000.0));
        assert_eq!(b.amount, 180_000.0);
        assert!((b.cost - 172.602739726).abs() < 1e-6, "cost = {}", b.cost);
    }

    #[test]
    fn test_explicit_amount_mode_has_no_derived_own_capital() {
        let financing = Financing {
            mode: FinancingMode::ExplicitAmount(50_000.0),
            annual_rate: 0.04,
            holding_days: 10.0,
        };
        let b = financing.breakdown(200_000.0);
        assert_eq!(b.own_capital, None);
        assert_eq!(b.amount, 50_000.0);
        assert!((b.cost - 50_000.0 * (0.04 / 365.0) * 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_financing_cost_monotone_in_days_and_rate() {
        let base = financing_cost(100_000.0, 0.05, 7.0);
        assert!(financing_cost(100_000.0, 0.05, 8.0) >= base);
        assert!(financing_cost(100_000.0, 0.06, 7.0) >= base);
        assert!(financing_cost(100_000.0, 0.05, 0.0) >= 0.0);
    }

    #[test]
    fn test_financing_cost_never_negative() {
        assert_eq!(financing_cost(-100.0, 0.05, 7.0), 0.0);
        assert_eq!(financing_cost(100.0, 0.05, 0.0), 0.0);
    }

    #[test]
    fn test_multiple_from_factor() {
        assert_eq!(FinancingMultiple::from_factor(10), Some(FinancingMultiple::X10));
        assert_eq!(FinancingMultiple::from_factor(7), None);
        for m in FinancingMultiple::ALL {
            assert_eq!(FinancingMultiple::from_factor(m.factor() as u32), Some(m));
        }
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut financing = Financing {
            mode: FinancingMode::ExplicitAmount(f64::NAN),
            annual_rate: 0.05,
            holding_days: 7.0,
        };
        assert_eq!(
            financing.validate(),
            Err(EngineError::InvalidInput(InputField::FinancingAmount))
        );

        financing.mode = FinancingMode::Multiple(FinancingMultiple::X5);
        financing.annual_rate = -0.01;
        assert_eq!(
            financing.validate(),
            Err(EngineError::InvalidInput(InputField::FinancingRate))
        );

        financing.annual_rate = 0.05;
        financing.holding_days = f64::INFINITY;
        assert_eq!(
            financing.validate(),
            Err(EngineError::InvalidInput(InputField::HoldingDays))
        );
    }
}
