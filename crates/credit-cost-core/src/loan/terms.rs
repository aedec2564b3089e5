use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CreditCostError;
use crate::fixed_point;
use crate::types::{Money, Rate};
use crate::CreditCostResult;

/// Compounding periods per year; every loan is paid monthly.
pub const PERIODS_PER_YEAR: u32 = 12;

/// Terms of a single amortizing loan.
///
/// Preconditions (`periods ≥ 1`, `amortization_free_periods ≤ periods`,
/// non-negative principal and rate) belong to the caller. Nothing here checks
/// them; see [`crate::loan::disclosure`] for the validating entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount lent, including any startup fee
    pub principal: Money,
    /// Nominal yearly interest rate (0.055 = 5.5%)
    pub yearly_rate: Rate,
    /// Tenure in monthly periods
    pub periods: u32,
    /// Leading periods that pay interest and fee only
    #[serde(default)]
    pub amortization_free_periods: u32,
    /// Flat fee charged every period (invoice/statement fee)
    #[serde(default)]
    pub periodic_fee: Money,
}

impl LoanTerms {
    pub fn new(
        principal: Money,
        yearly_rate: Rate,
        periods: u32,
        amortization_free_periods: u32,
        periodic_fee: Money,
    ) -> Self {
        Self {
            principal,
            yearly_rate,
            periods,
            amortization_free_periods,
            periodic_fee,
        }
    }

    /// Terms for a tenure quoted in whole years.
    pub fn from_years(
        principal: Money,
        yearly_rate: Rate,
        tenure_years: u32,
        amortization_free_periods: u32,
        periodic_fee: Money,
    ) -> CreditCostResult<Self> {
        let periods = tenure_years.checked_mul(PERIODS_PER_YEAR).ok_or_else(|| {
            CreditCostError::InvalidInput {
                field: "tenure_years".into(),
                reason: format!("{tenure_years} years exceeds the supported number of periods"),
            }
        })?;
        Ok(Self::new(
            principal,
            yearly_rate,
            periods,
            amortization_free_periods,
            periodic_fee,
        ))
    }

    /// Monthly rate at full decimal precision, as fed to the annuity formula.
    pub fn monthly_rate(&self) -> Rate {
        self.yearly_rate / Decimal::from(PERIODS_PER_YEAR)
    }

    /// Monthly rate at the fixed scale, as applied to outstanding balances.
    pub fn periodic_rate(&self) -> CreditCostResult<Rate> {
        fixed_point::div(self.yearly_rate, Decimal::from(PERIODS_PER_YEAR))
    }

    /// Periods over which the level annuity amortizes the principal.
    ///
    /// Signed so that a free period count above the tenure stays representable.
    pub fn amortizing_periods(&self) -> i64 {
        i64::from(self.periods) - i64::from(self.amortization_free_periods)
    }

    /// Interest-only payment during the amortization-free periods.
    pub fn interest_during_free_period(&self) -> CreditCostResult<Money> {
        fixed_point::div(
            self.principal * self.yearly_rate,
            Decimal::from(PERIODS_PER_YEAR),
        )
    }

    /// Whether `period` (1-based) falls within the amortization-free window.
    pub fn is_amortization_free(&self, period: u32) -> bool {
        period <= self.amortization_free_periods
    }
}
