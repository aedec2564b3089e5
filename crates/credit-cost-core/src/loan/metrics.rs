//! Aggregate loan metrics: level annuity, APR, effective rates, total payment
//! and daily interest.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixed_point;
use crate::loan::cash_flow;
use crate::loan::plan::PaymentPlan;
use crate::loan::schedule::build_payment_plan;
use crate::loan::terms::{LoanTerms, PERIODS_PER_YEAR};
use crate::time_value::{self, level_payment_decimal};
use crate::types::{Money, PaymentTiming};
use crate::CreditCostResult;

/// Average days per month (365 / 12, truncated) prescribed by the Swedish
/// Consumer Agency guidelines on consumer credit (KOVFS 2011:1).
pub const DAYS_PER_MONTH: Decimal = dec!(30.41666);

/// Level monthly payment that amortizes the principal over the periods left
/// after the amortization-free window.
pub fn monthly_annuity(terms: &LoanTerms) -> CreditCostResult<Money> {
    level_payment_decimal(
        terms.monthly_rate(),
        terms.amortizing_periods(),
        -terms.principal,
        Decimal::ZERO,
        PaymentTiming::End,
    )
}

/// Annual percentage rate from a monthly IRR: `(1 + irr)^12 − 1`.
pub fn apr(monthly_irr: f64) -> f64 {
    (1.0 + monthly_irr).powi(PERIODS_PER_YEAR as i32) - 1.0
}

/// Effective yearly rate of a nominal rate compounded `compounding_per_year`
/// times: `(1 + rate/n)^n − 1`. Feed it `monthly_irr × 12` to annualize an IRR.
pub fn effective_rate(rate: f64, compounding_per_year: u32) -> f64 {
    let n = f64::from(compounding_per_year);
    (1.0 + rate / n).powf(n) - 1.0
}

/// Effective interest rate of a loan: the APR of the IRR of its cash flow.
pub fn effective_interest_rate(terms: &LoanTerms) -> CreditCostResult<f64> {
    let flows = cash_flow::from_terms(terms)?;
    Ok(apr(time_value::irr(&flows)))
}

/// Everything the borrower pays over the tenure, fees included.
pub fn total_payment_amount(terms: &LoanTerms) -> CreditCostResult<Money> {
    let annuity = monthly_annuity(terms)?;
    total_payment_amount_with_annuity(terms, annuity)
}

/// [`total_payment_amount`] with a known annuity:
/// `(annuity + fee)·periods − (annuity − free_period_interest)·free_periods`.
pub fn total_payment_amount_with_annuity(
    terms: &LoanTerms,
    annuity: Money,
) -> CreditCostResult<Money> {
    let free_period_payment = terms.interest_during_free_period()?;
    let periods = Decimal::from(terms.periods);
    let free_periods = Decimal::from(terms.amortization_free_periods);
    Ok((annuity + terms.periodic_fee) * periods - (annuity - free_period_payment) * free_periods)
}

/// [`total_payment_amount`] rounded half-up to `decimals` digits.
pub fn total_payment_amount_rounded(terms: &LoanTerms, decimals: u32) -> CreditCostResult<Money> {
    Ok(fixed_point::round_to(total_payment_amount(terms)?, decimals))
}

/// Average interest per day over the tenure.
pub fn daily_interest_amount(terms: &LoanTerms) -> CreditCostResult<Money> {
    let plan = build_payment_plan(terms)?;
    daily_interest_from_plan(&plan, terms.periods)
}

/// Total plan interest over `periods × 30.41666` days.
pub fn daily_interest_from_plan(plan: &PaymentPlan, periods: u32) -> CreditCostResult<Money> {
    fixed_point::div(
        plan.total_interest(),
        Decimal::from(periods) * DAYS_PER_MONTH,
    )
}
