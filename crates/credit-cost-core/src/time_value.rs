use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CreditCostError;
use crate::fixed_point;
use crate::types::{Money, PaymentTiming, Rate};
use crate::CreditCostResult;

/// Early-exit threshold for `|cf[0] + NPV(rate)|` in the IRR bisection
pub const CONVERGENCE_THRESHOLD: f64 = 1e-7;
/// Bisection budget; bounds the solver at `O(MAX_IRR_ITERATIONS * n)`
pub const MAX_IRR_ITERATIONS: u32 = 1000;

const IRR_LOWER_BOUND: f64 = 0.0;
const IRR_UPPER_BOUND: f64 = 1.0;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A bare cash-flow series, period 0 first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowInput {
    pub cash_flows: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpvInput {
    pub cash_flows: Vec<f64>,
    /// Periodic discount rate
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelPaymentInput {
    /// Periodic interest rate
    pub rate: f64,
    pub periods: i64,
    pub present_value: f64,
    #[serde(default)]
    pub future_value: f64,
    #[serde(default)]
    pub timing: PaymentTiming,
}

impl LevelPaymentInput {
    pub fn payment(&self) -> f64 {
        level_payment_with(
            self.rate,
            self.periods,
            self.present_value,
            self.future_value,
            self.timing,
        )
    }
}

// ---------------------------------------------------------------------------
// Level payment (annuity)
// ---------------------------------------------------------------------------

/// Periodic payment of an ordinary annuity with no residual value.
pub fn level_payment(rate: f64, periods: i64, present_value: f64) -> f64 {
    level_payment_with(rate, periods, present_value, 0.0, PaymentTiming::End)
}

/// Spreadsheet-style PMT:
/// `-r·(pv·(1+r)^n + fv) / ((1 + r·type)·((1+r)^n − 1))`.
///
/// A zero rate is not special-cased; it evaluates to NaN.
pub fn level_payment_with(
    rate: f64,
    periods: i64,
    present_value: f64,
    future_value: f64,
    timing: PaymentTiming,
) -> f64 {
    let growth = (1.0 + rate).powf(periods as f64);
    let timing = f64::from(timing.flag());
    (-rate * (present_value * growth + future_value)) / ((1.0 + rate * timing) * (growth - 1.0))
}

/// Fixed-point PMT. Same formula as [`level_payment_with`], evaluated at full
/// decimal precision and rounded half-up at the fixed scale only once, on the
/// final division. A zero rate surfaces as `DivisionByZero`, amounts beyond
/// `Decimal` range as `Overflow`.
pub fn level_payment_decimal(
    rate: Rate,
    periods: i64,
    present_value: Money,
    future_value: Money,
    timing: PaymentTiming,
) -> CreditCostResult<Money> {
    let overflow = || CreditCostError::Overflow {
        context: format!("level payment at rate {rate} over {periods} periods"),
    };
    let growth = fixed_point::pow(Decimal::ONE + rate, periods)?;
    let numerator = present_value
        .checked_mul(growth)
        .and_then(|v| v.checked_add(future_value))
        .and_then(|v| rate.checked_mul(v))
        .ok_or_else(overflow)?;
    let denominator = rate
        .checked_mul(Decimal::from(timing.flag()))
        .and_then(|v| Decimal::ONE.checked_add(v))
        .and_then(|v| growth.checked_sub(Decimal::ONE).and_then(|g| v.checked_mul(g)))
        .ok_or_else(overflow)?;
    if denominator.is_zero() {
        return Err(CreditCostError::DivisionByZero {
            context: format!("level payment at rate {rate} over {periods} periods"),
        });
    }
    Ok(-fixed_point::div(numerator, denominator)?)
}

// ---------------------------------------------------------------------------
// Net present value
// ---------------------------------------------------------------------------

/// Net Present Value with the first flow discounted one full period:
/// `Σ cf[t] / (1+rate)^(t+1)`.
pub fn npv(cash_flows: &[f64], rate: f64) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / (1.0 + rate).powf((t + 1) as f64))
        .sum()
}

/// Present value of every flow after the first: `Σ_{t≥1} cf[t] / (1+rate)^t`.
///
/// The IRR search compares this against the initial outflow. It is not
/// interchangeable with [`npv`]; the exponents are shifted by one.
pub(crate) fn discounted_inflows(cash_flows: &[f64], rate: f64) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, cf)| cf / (1.0 + rate).powf(t as f64))
        .sum()
}

// ---------------------------------------------------------------------------
// Internal rate of return
// ---------------------------------------------------------------------------

/// Outcome of an IRR bisection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Periodic rate of the last midpoint tested
    pub rate: f64,
    /// Midpoints evaluated
    pub iterations: u32,
    /// `cf[0] + discounted_inflows(rate)` at the returned rate
    pub residual: f64,
    /// Whether the residual fell under [`CONVERGENCE_THRESHOLD`]
    pub converged: bool,
}

/// Periodic internal rate of return by bisection on `[0, 1]`.
pub fn irr(cash_flows: &[f64]) -> f64 {
    solve_irr(cash_flows).rate
}

/// Bisection IRR with diagnostics.
///
/// Assumes `cf[0]` is the only outflow, so the discounted inflows fall as the
/// rate rises. That shape is not checked; other shapes return a meaningless
/// rate inside the bounds. An empty series has no rate and yields NaN.
pub fn solve_irr(cash_flows: &[f64]) -> IrrSolution {
    let Some(&outflow) = cash_flows.first() else {
        return IrrSolution {
            rate: f64::NAN,
            iterations: 0,
            residual: f64::NAN,
            converged: false,
        };
    };

    let mut low = IRR_LOWER_BOUND;
    let mut high = IRR_UPPER_BOUND;
    let mut rate = 0.0;
    let mut residual = f64::NAN;

    for iteration in 1..=MAX_IRR_ITERATIONS {
        rate = (low + high) / 2.0;
        let inflows = discounted_inflows(cash_flows, rate);
        residual = outflow + inflows;

        if residual.abs() < CONVERGENCE_THRESHOLD {
            debug!(rate, iterations = iteration, residual, "irr converged");
            return IrrSolution {
                rate,
                iterations: iteration,
                residual,
                converged: true,
            };
        }

        if outflow.abs() > inflows {
            high = rate;
        } else {
            low = rate;
        }
    }

    warn!(
        rate,
        residual,
        iterations = MAX_IRR_ITERATIONS,
        "irr bisection budget exhausted"
    );
    IrrSolution {
        rate,
        iterations: MAX_IRR_ITERATIONS,
        residual,
        converged: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_discounts_first_flow() {
        let cfs = [-123_400.0, 36_200.0, 54_800.0, 48_100.0];
        assert_abs_diff_eq!(npv(&cfs, 0.035), 5908.8656360761, epsilon = 1e-10);
    }

    #[test]
    fn test_npv_and_inflows_differ() {
        let cfs = [-1000.0, 400.0, 400.0, 400.0];
        let public = npv(&cfs, 0.1);
        let inflows = discounted_inflows(&cfs, 0.1);
        // 400/1.1 + 400/1.21 + 400/1.331
        assert_abs_diff_eq!(inflows, 994.7408, epsilon = 1e-4);
        // Every exponent shifted by one, first flow included
        assert_abs_diff_eq!(public, (inflows - 1000.0) / 1.1, epsilon = 1e-9);
    }

    #[test]
    fn test_irr_even_annuity() {
        // -1000 then 3 x 400 -> ~9.7%
        let cfs = [-1000.0, 400.0, 400.0, 400.0];
        let solution = solve_irr(&cfs);
        assert!(solution.converged);
        assert_abs_diff_eq!(solution.rate, 0.0970, epsilon = 1e-4);
        assert!(solution.iterations <= MAX_IRR_ITERATIONS);
    }

    #[test]
    fn test_irr_round_trip_through_inflows() {
        let cfs = [-5000.0, 1200.0, 1300.0, 1400.0, 1500.0, 1600.0];
        let rate = irr(&cfs);
        assert_abs_diff_eq!(discounted_inflows(&cfs, rate), 5000.0, epsilon = 1e-7);
    }

    #[test]
    fn test_irr_empty_series_is_nan() {
        assert!(irr(&[]).is_nan());
    }

    #[test]
    fn test_irr_out_of_bounds_is_not_converged() {
        // Inflows worth 3x the outflow in one period: root at 200%, above the bracket
        let solution = solve_irr(&[-100.0, 300.0]);
        assert!(!solution.converged);
        assert!(solution.rate > 0.99 && solution.rate <= 1.0);
    }

    #[test]
    fn test_level_payment_ordinary_annuity() {
        // 100 000 at 4.95% over 36 months
        let payment = level_payment(0.0495 / 12.0, 36, -100_000.0);
        assert_eq!(payment.round() as i64, 2995);
    }

    #[test]
    fn test_level_payment_annuity_due_is_smaller() {
        let end = level_payment_with(0.01, 12, -10_000.0, 0.0, PaymentTiming::End);
        let due = level_payment_with(0.01, 12, -10_000.0, 0.0, PaymentTiming::Beginning);
        assert_abs_diff_eq!(due, end / 1.01, epsilon = 1e-9);
    }

    #[test]
    fn test_level_payment_zero_rate_is_nan() {
        assert!(level_payment(0.0, 12, -1200.0).is_nan());
    }

    #[test]
    fn test_level_payment_decimal_matches_float() {
        let rate = dec!(0.05) / dec!(12);
        let fixed =
            level_payment_decimal(rate, 360, dec!(-120000), Decimal::ZERO, PaymentTiming::End)
                .unwrap();
        assert_eq!(fixed_point::round_to(fixed, 4), dec!(644.1859), "got {fixed}");
        let float = level_payment(0.05 / 12.0, 360, -120_000.0);
        assert_abs_diff_eq!(float, 644.1859, epsilon = 1e-4);
    }

    #[test]
    fn test_level_payment_decimal_with_future_value() {
        // Paying down 10 000 to a 2 000 balloon is cheaper than full amortization
        let rate = dec!(0.01);
        let full =
            level_payment_decimal(rate, 24, dec!(-10000), Decimal::ZERO, PaymentTiming::End)
                .unwrap();
        let balloon =
            level_payment_decimal(rate, 24, dec!(-10000), dec!(2000), PaymentTiming::End)
                .unwrap();
        assert!(balloon < full);
    }

    #[test]
    fn test_level_payment_decimal_zero_rate_is_division_by_zero() {
        let err =
            level_payment_decimal(Decimal::ZERO, 12, dec!(-1200), Decimal::ZERO, PaymentTiming::End)
                .unwrap_err();
        assert!(matches!(err, CreditCostError::DivisionByZero { .. }));
    }

    #[test]
    fn test_level_payment_input_defaults_to_ordinary_annuity() {
        let input: LevelPaymentInput =
            serde_json::from_str(r#"{"rate": 0.004583333, "periods": 120, "present_value": -300000}"#)
                .unwrap();
        assert_eq!(input.timing, PaymentTiming::End);
        assert_abs_diff_eq!(
            input.payment(),
            level_payment(0.004583333, 120, -300_000.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_level_payment_decimal_out_of_range_is_overflow() {
        // 1.0825^600 fits, a billion times it does not
        let err = level_payment_decimal(
            dec!(0.0825),
            600,
            dec!(-1000000000),
            Decimal::ZERO,
            PaymentTiming::End,
        )
        .unwrap_err();
        assert!(matches!(err, CreditCostError::Overflow { .. }), "{err:?}");
    }
}
