use tracing::debug;

use crate::fixed_point;
use crate::loan::metrics::monthly_annuity;
use crate::loan::plan::{PaymentEntry, PaymentPlan};
use crate::loan::terms::LoanTerms;
use crate::CreditCostResult;

/// Build the full payment plan of a loan.
///
/// Amortization-free periods pay `principal × yearly_rate / 12`; the remaining
/// periods pay the level annuity that amortizes the principal over
/// `periods − amortization_free_periods`. Each period's interest is the
/// previous outgoing balance times the scaled monthly rate, and amortization
/// is whatever the payment leaves after interest. The final balance is left as
/// computed, it is never forced to zero.
///
/// Out-of-range terms are not rejected. A zero rate fails in the annuity
/// division.
pub fn build_payment_plan(terms: &LoanTerms) -> CreditCostResult<PaymentPlan> {
    let periodic_rate = terms.periodic_rate()?;
    let free_period_payment = terms.interest_during_free_period()?;
    let annuity = monthly_annuity(terms)?;

    let mut entries = Vec::with_capacity(terms.periods as usize + 1);
    let mut balance = terms.principal;
    entries.push(PaymentEntry::disbursement(balance));

    for period in 1..=terms.periods {
        let cost_of_credit = if terms.is_amortization_free(period) {
            free_period_payment
        } else {
            annuity
        };
        let interest = fixed_point::mul(balance, periodic_rate);
        let amortization = cost_of_credit - interest;
        balance -= amortization;

        entries.push(PaymentEntry {
            period,
            cost_of_credit,
            interest,
            amortization,
            fee: terms.periodic_fee,
            outgoing_balance: balance,
            cash_flow: cost_of_credit + terms.periodic_fee,
        });
    }

    debug!(
        periods = terms.periods,
        amortization_free_periods = terms.amortization_free_periods,
        %annuity,
        residual_balance = %balance,
        "payment plan built"
    );

    Ok(PaymentPlan::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal, what: &str) {
        assert!(
            (actual - expected).abs() < dec!(0.01),
            "{what}: expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_plan_has_disbursement_plus_one_entry_per_period() {
        let terms = LoanTerms::new(dec!(10000), dec!(0.035), 18, 6, dec!(30));
        let plan = build_payment_plan(&terms).unwrap();
        assert_eq!(plan.len(), 19);
        for (index, entry) in plan.iter().enumerate() {
            assert_eq!(entry.period as usize, index);
        }
    }

    #[test]
    fn test_free_periods_pay_interest_only() {
        let terms = LoanTerms::new(dec!(100429), dec!(0.0535), 24, 1, Decimal::ZERO);
        let plan = build_payment_plan(&terms).unwrap();
        let first = plan.get(1).unwrap();
        assert_close(first.cost_of_credit, dec!(447.75), "cost_of_credit");
        assert_close(first.interest, dec!(447.75), "interest");
        assert_close(first.amortization, Decimal::ZERO, "amortization");
        assert_close(first.outgoing_balance, dec!(100429), "outgoing_balance");
    }

    #[test]
    fn test_balance_and_interest_recurrence() {
        let terms = LoanTerms::new(dec!(50429), dec!(0.149), 60, 12, dec!(30));
        let plan = build_payment_plan(&terms).unwrap();
        let rate = terms.periodic_rate().unwrap();
        for pair in plan.entries().windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            assert_eq!(cur.outgoing_balance, prev.outgoing_balance - cur.amortization);
            assert_close(cur.interest, prev.outgoing_balance * rate, "interest");
            assert_eq!(cur.cash_flow, cur.cost_of_credit + cur.fee);
            assert_eq!(cur.fee, dec!(30));
        }
    }

    #[test]
    fn test_zero_rate_is_not_special_cased() {
        let terms = LoanTerms::new(dec!(1200), Decimal::ZERO, 12, 0, Decimal::ZERO);
        assert!(build_payment_plan(&terms).is_err());
    }

    #[test]
    fn test_free_periods_beyond_tenure_do_not_panic() {
        // Caller error: every period is interest-only, the annuity is over -2 periods
        let terms = LoanTerms::new(dec!(1000), dec!(0.12), 4, 6, Decimal::ZERO);
        let plan = build_payment_plan(&terms).unwrap();
        assert_eq!(plan.len(), 5);
        assert_close(plan.last().unwrap().outgoing_balance, dec!(1000), "balance");
    }
}
