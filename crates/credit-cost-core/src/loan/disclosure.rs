//! Validated entry point producing the cost-of-credit disclosure of a loan.
//!
//! The numeric modules accept any terms and let nonsense propagate. This layer
//! rejects terms outside their domain, builds the plan once and derives every
//! reported figure from it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::CreditCostError;
use crate::fixed_point::{self, round_currency};
use crate::loan::metrics::{self, DAYS_PER_MONTH};
use crate::loan::plan::PaymentPlan;
use crate::loan::schedule::build_payment_plan;
use crate::loan::terms::{LoanTerms, PERIODS_PER_YEAR};
use crate::time_value::{self, CONVERGENCE_THRESHOLD, MAX_IRR_ITERATIONS};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::CreditCostResult;

/// Residual balance tolerated on the last period before a warning is raised.
const BALANCE_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisclosureInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    /// Attach the full payment plan to the output
    #[serde(default)]
    pub include_schedule: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditDisclosure {
    /// Periodic (monthly) internal rate of return of the cash flow
    pub monthly_irr: f64,
    pub irr_iterations: u32,
    pub irr_converged: bool,
    /// Effective interest rate: `(1 + monthly_irr)^12 − 1`
    pub effective_interest_rate: f64,
    /// `monthly_irr × 12` compounded monthly; equal to the effective rate up to
    /// float noise
    pub compounded_nominal_rate: f64,
    pub nominal_rate: Rate,
    pub monthly_annuity: Money,
    /// Interest-only payment during the amortization-free window
    pub free_period_payment: Money,
    pub total_payment_amount: Money,
    pub total_interest: Money,
    pub total_fees: Money,
    pub daily_interest_amount: Money,
    /// Outgoing balance after the last period, unrounded
    pub final_balance: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_plan: Option<PaymentPlan>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate loan terms and compute the effective interest rate, payments,
/// totals and daily interest of the loan.
pub fn calculate_credit_disclosure(
    input: &DisclosureInput,
) -> CreditCostResult<ComputationOutput<CreditDisclosure>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let terms = &input.terms;

    validate_terms(terms)?;

    let plan = build_payment_plan(terms)?;
    let annuity = metrics::monthly_annuity(terms)?;
    let free_period_payment = terms.interest_during_free_period()?;

    let solution = time_value::solve_irr(&plan.cash_flow());
    if !solution.converged {
        warnings.push(format!(
            "IRR bisection did not converge within {MAX_IRR_ITERATIONS} iterations \
             (residual {:.3e}, tolerance {CONVERGENCE_THRESHOLD:e})",
            solution.residual
        ));
        if solution.rate > 0.999 {
            warnings.push(
                "IRR is pinned at the 100% per period upper bound; the rate is unreliable".into(),
            );
        }
    }

    let total_payment_amount = metrics::total_payment_amount_with_annuity(terms, annuity)?;
    let daily_interest_amount = metrics::daily_interest_from_plan(&plan, terms.periods)?;

    let final_balance = plan
        .last()
        .map(|e| e.outgoing_balance)
        .unwrap_or(Decimal::ZERO);
    if final_balance.abs() > BALANCE_TOLERANCE {
        warnings.push(format!(
            "Final outgoing balance {} is not fully amortized",
            fixed_point::round_to(final_balance, 4)
        ));
    }

    let output = CreditDisclosure {
        monthly_irr: solution.rate,
        irr_iterations: solution.iterations,
        irr_converged: solution.converged,
        effective_interest_rate: metrics::apr(solution.rate),
        compounded_nominal_rate: metrics::effective_rate(
            solution.rate * f64::from(PERIODS_PER_YEAR),
            PERIODS_PER_YEAR,
        ),
        nominal_rate: terms.yearly_rate,
        monthly_annuity: round_currency(annuity),
        free_period_payment: round_currency(free_period_payment),
        total_payment_amount: round_currency(total_payment_amount),
        total_interest: round_currency(plan.total_interest()),
        total_fees: round_currency(terms.periodic_fee * Decimal::from(terms.periods)),
        daily_interest_amount: round_currency(daily_interest_amount),
        final_balance,
        payment_plan: input.include_schedule.then_some(plan),
    };

    debug!(
        monthly_irr = output.monthly_irr,
        effective_interest_rate = output.effective_interest_rate,
        warnings = warnings.len(),
        "credit disclosure computed"
    );

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Level annuity payment plan; effective interest rate from bisection IRR",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "periods": terms.periods,
            "amortization_free_periods": terms.amortization_free_periods,
            "fixed_point_scale": fixed_point::SCALE,
            "rounding": "half-up",
            "irr_method": format!(
                "bisection on [0, 1], {MAX_IRR_ITERATIONS} iterations, tolerance {CONVERGENCE_THRESHOLD:e}"
            ),
            "days_per_month": DAYS_PER_MONTH.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject terms outside the domain the plan and disclosure are defined on.
pub fn validate_terms(terms: &LoanTerms) -> CreditCostResult<()> {
    if terms.principal <= Decimal::ZERO {
        return Err(CreditCostError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if terms.periods == 0 {
        return Err(CreditCostError::InvalidInput {
            field: "periods".into(),
            reason: "Tenure must be at least 1 period".into(),
        });
    }
    if terms.amortization_free_periods > terms.periods {
        return Err(CreditCostError::InvalidInput {
            field: "amortization_free_periods".into(),
            reason: format!(
                "Amortization-free periods ({}) cannot exceed the tenure ({})",
                terms.amortization_free_periods, terms.periods
            ),
        });
    }
    if terms.yearly_rate < Decimal::ZERO {
        return Err(CreditCostError::InvalidInput {
            field: "yearly_rate".into(),
            reason: "Yearly rate cannot be negative".into(),
        });
    }
    if terms.periodic_fee < Decimal::ZERO {
        return Err(CreditCostError::InvalidInput {
            field: "periodic_fee".into(),
            reason: "Periodic fee cannot be negative".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn input(terms: LoanTerms) -> DisclosureInput {
        DisclosureInput {
            terms,
            include_schedule: false,
        }
    }

    fn standard_terms() -> LoanTerms {
        LoanTerms::from_years(dec!(263429), dec!(0.055), 15, 12, dec!(30)).unwrap()
    }

    #[test]
    fn test_disclosure_reference_loan() {
        let result = calculate_credit_disclosure(&input(standard_terms())).unwrap();
        let out = &result.result;
        assert_abs_diff_eq!(out.effective_interest_rate, 0.0585669, epsilon = 1e-7);
        assert_abs_diff_eq!(
            out.compounded_nominal_rate,
            out.effective_interest_rate,
            epsilon = 1e-12
        );
        assert_eq!(out.monthly_annuity, dec!(2251.86));
        assert_eq!(out.total_payment_amount, dec!(398200.88));
        assert_eq!(out.daily_interest_amount, dec!(23.63));
        assert_eq!(out.total_fees, dec!(5400));
        assert!(out.irr_converged);
        assert!(out.payment_plan.is_none());
    }

    #[test]
    fn test_schedule_attached_on_request() {
        let mut req = input(LoanTerms::new(dec!(10000), dec!(0.035), 18, 6, dec!(30)));
        req.include_schedule = true;
        let result = calculate_credit_disclosure(&req).unwrap();
        let plan = result.result.payment_plan.as_ref().unwrap();
        assert_eq!(plan.len(), 19);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_disclosure_with_schedule_serializes() {
        let mut req = input(LoanTerms::new(dec!(10000), dec!(0.035), 18, 6, dec!(30)));
        req.include_schedule = true;
        let result = calculate_credit_disclosure(&req).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        let plan = json["result"]["payment_plan"].as_array().unwrap();
        assert_eq!(plan.len(), 19);
        assert_eq!(plan[0]["outgoing_balance"], "10000");
        assert!(json["result"]["monthly_irr"].is_number());
    }

    #[test]
    fn test_residual_balance_warning() {
        // Rounding the monthly rate to nine digits leaves ~-0.016 after 180 periods
        let result = calculate_credit_disclosure(&input(standard_terms())).unwrap();
        assert!(result.result.final_balance.abs() > BALANCE_TOLERANCE);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("not fully amortized")));
    }

    #[test]
    fn test_rejects_non_positive_principal() {
        let terms = LoanTerms::new(Decimal::ZERO, dec!(0.05), 12, 0, Decimal::ZERO);
        let err = calculate_credit_disclosure(&input(terms)).unwrap_err();
        match err {
            CreditCostError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_free_periods_beyond_tenure() {
        let terms = LoanTerms::new(dec!(1000), dec!(0.05), 12, 13, Decimal::ZERO);
        assert!(calculate_credit_disclosure(&input(terms)).is_err());
    }

    #[test]
    fn test_rejects_zero_tenure_and_negative_rate() {
        let zero_tenure = LoanTerms::new(dec!(1000), dec!(0.05), 0, 0, Decimal::ZERO);
        assert!(calculate_credit_disclosure(&input(zero_tenure)).is_err());
        let negative_rate = LoanTerms::new(dec!(1000), dec!(-0.01), 12, 0, Decimal::ZERO);
        assert!(calculate_credit_disclosure(&input(negative_rate)).is_err());
    }

    #[test]
    fn test_zero_rate_surfaces_division_by_zero() {
        let terms = LoanTerms::new(dec!(1200), Decimal::ZERO, 12, 0, Decimal::ZERO);
        let err = calculate_credit_disclosure(&input(terms)).unwrap_err();
        assert!(matches!(err, CreditCostError::DivisionByZero { .. }));
    }

    #[test]
    fn test_input_deserializes_flattened_terms() {
        let req: DisclosureInput = serde_json::from_str(
            r#"{"principal": 50429, "yearly_rate": "0.149", "periods": 60,
                "amortization_free_periods": 12, "periodic_fee": 30,
                "include_schedule": true}"#,
        )
        .unwrap();
        assert_eq!(req.terms.periods, 60);
        assert_eq!(req.terms.periodic_fee, dec!(30));
        assert!(req.include_schedule);
    }
}
