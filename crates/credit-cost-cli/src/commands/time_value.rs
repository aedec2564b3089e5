use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use credit_cost_core::loan::metrics;
use credit_cost_core::time_value::{self, CashFlowInput, LevelPaymentInput, NpvInput};
use credit_cost_core::{CreditCostError, PaymentTiming};

use crate::input;

/// Arguments for the IRR bisection
#[derive(Args)]
pub struct IrrArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Cash flows, disbursement first (comma-separated, e.g. "-1000,90,90,90")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<f64>>,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let irr_input: CashFlowInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        CashFlowInput {
            cash_flows: args
                .cash_flows
                .ok_or("--cash-flows is required (or provide --input)")?,
        }
    };

    if irr_input.cash_flows.is_empty() {
        return Err(
            CreditCostError::InsufficientData("at least one cash flow is required".into()).into(),
        );
    }

    let solution = time_value::solve_irr(&irr_input.cash_flows);
    Ok(json!({
        "irr": solution.rate,
        "apr": metrics::apr(solution.rate),
        "iterations": solution.iterations,
        "residual": solution.residual,
        "converged": solution.converged,
    }))
}

/// Arguments for net present value
#[derive(Args)]
pub struct NpvArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Cash flows (comma-separated); the first is discounted one full period
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<f64>>,

    /// Periodic discount rate as a decimal
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<f64>,
}

pub fn run_npv(args: NpvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let npv_input: NpvInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        NpvInput {
            cash_flows: args
                .cash_flows
                .ok_or("--cash-flows is required (or provide --input)")?,
            rate: args.rate.ok_or("--rate is required (or provide --input)")?,
        }
    };

    let npv = time_value::npv(&npv_input.cash_flows, npv_input.rate);
    Ok(json!({ "npv": npv, "rate": npv_input.rate }))
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TimingArg {
    End,
    Beginning,
}

impl From<TimingArg> for PaymentTiming {
    fn from(timing: TimingArg) -> Self {
        match timing {
            TimingArg::End => PaymentTiming::End,
            TimingArg::Beginning => PaymentTiming::Beginning,
        }
    }
}

/// Arguments for the level payment
#[derive(Args)]
pub struct PmtArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Periodic interest rate as a decimal
    #[arg(long)]
    pub rate: Option<f64>,

    /// Number of payments
    #[arg(long)]
    pub periods: Option<i64>,

    /// Present value; negative for money received
    #[arg(long, allow_hyphen_values = true)]
    pub present_value: Option<f64>,

    /// Balance remaining after the last payment
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub future_value: f64,

    /// When payments fall within each period
    #[arg(long, value_enum, default_value = "end")]
    pub timing: TimingArg,
}

pub fn run_pmt(args: PmtArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pmt_input: LevelPaymentInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        LevelPaymentInput {
            rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            periods: args
                .periods
                .ok_or("--periods is required (or provide --input)")?,
            present_value: args
                .present_value
                .ok_or("--present-value is required (or provide --input)")?,
            future_value: args.future_value,
            timing: args.timing.into(),
        }
    };

    let payment = pmt_input.payment();
    if !payment.is_finite() {
        tracing::warn!(
            rate = pmt_input.rate,
            periods = pmt_input.periods,
            "level payment is not finite"
        );
    }
    Ok(json!({ "payment": payment, "input": pmt_input }))
}

/// Arguments for annualizing a monthly IRR
#[derive(Args)]
pub struct AprArgs {
    /// Monthly internal rate of return as a decimal
    #[arg(long, allow_hyphen_values = true)]
    pub monthly_irr: f64,
}

pub fn run_apr(args: AprArgs) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(json!({
        "monthly_irr": args.monthly_irr,
        "apr": metrics::apr(args.monthly_irr),
    }))
}
