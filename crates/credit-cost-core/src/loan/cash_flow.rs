//! Signed cash-flow series of a loan: the disbursement is negative, every
//! repayment positive.

use rust_decimal::prelude::ToPrimitive;

use crate::loan::metrics::monthly_annuity;
use crate::loan::plan::PaymentPlan;
use crate::loan::terms::LoanTerms;
use crate::types::Money;
use crate::CreditCostResult;

/// Project the cash-flow column of an existing plan.
pub fn from_plan(plan: &PaymentPlan) -> Vec<f64> {
    plan.cash_flow()
}

/// Compute the cash-flow series straight from the terms, skipping the
/// interest/amortization/balance bookkeeping of a full plan.
///
/// Yields exactly what `from_plan(&build_payment_plan(terms)?)` yields.
pub fn from_terms(terms: &LoanTerms) -> CreditCostResult<Vec<f64>> {
    let free_period_payment = terms.interest_during_free_period()?;
    let annuity = monthly_annuity(terms)?;

    let mut flows = Vec::with_capacity(terms.periods as usize + 1);
    flows.push(to_float(-terms.principal));
    for period in 1..=terms.periods {
        let cost_of_credit = if terms.is_amortization_free(period) {
            free_period_payment
        } else {
            annuity
        };
        flows.push(to_float(cost_of_credit + terms.periodic_fee));
    }
    Ok(flows)
}

fn to_float(amount: Money) -> f64 {
    amount.to_f64().unwrap_or(f64::NAN)
}
