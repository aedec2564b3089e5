use clap::Args;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use credit_cost_core::fixed_point::round_currency;
use credit_cost_core::loan::disclosure::{self, DisclosureInput};
use credit_cost_core::loan::schedule::build_payment_plan;
use credit_cost_core::{LoanTerms, PaymentColumn};

use crate::input;

/// Loan terms shared by the loan commands
#[derive(Args)]
pub struct TermsArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal yearly interest rate as a decimal (e.g. 0.055)
    #[arg(long)]
    pub yearly_rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long, conflicts_with = "years")]
    pub periods: Option<u32>,

    /// Tenure in years (converted to months)
    #[arg(long)]
    pub years: Option<u32>,

    /// Leading months of interest-only payments
    #[arg(long, default_value_t = 0)]
    pub amortization_free_periods: u32,

    /// Fee charged every month
    #[arg(long, default_value = "0")]
    pub periodic_fee: Decimal,
}

impl TermsArgs {
    fn to_terms(&self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let yearly_rate = self
            .yearly_rate
            .ok_or("--yearly-rate is required (or provide --input)")?;
        match (self.periods, self.years) {
            (Some(months), _) => Ok(LoanTerms::new(
                principal,
                yearly_rate,
                months,
                self.amortization_free_periods,
                self.periodic_fee,
            )),
            (None, Some(years)) => Ok(LoanTerms::from_years(
                principal,
                yearly_rate,
                years,
                self.amortization_free_periods,
                self.periodic_fee,
            )?),
            (None, None) => Err("--periods or --years is required (or provide --input)".into()),
        }
    }
}

/// Arguments for the credit disclosure
#[derive(Args)]
pub struct DisclosureArgs {
    #[command(flatten)]
    pub terms: TermsArgs,

    /// Attach the full payment plan to the output
    #[arg(long)]
    pub include_schedule: bool,
}

pub fn run_disclosure(args: DisclosureArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let disclosure_input: DisclosureInput = if let Some(ref path) = args.terms.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        DisclosureInput {
            terms: args.terms.to_terms()?,
            include_schedule: args.include_schedule,
        }
    };

    let result = disclosure::calculate_credit_disclosure(&disclosure_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the payment plan
#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub terms: TermsArgs,

    /// Columns to print (comma-separated, e.g. "period,interest,cash_flow")
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<PaymentColumn>>,

    /// Print amounts at full nine-decimal precision instead of currency rounding
    #[arg(long)]
    pub exact: bool,
}

pub fn run_plan(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = if let Some(ref path) = args.terms.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        args.terms.to_terms()?
    };

    disclosure::validate_terms(&terms)?;
    let plan = build_payment_plan(&terms)?;

    let columns = args
        .columns
        .unwrap_or_else(|| PaymentColumn::ALL.to_vec());

    let rows = plan
        .iter()
        .map(|entry| {
            let row: Map<String, Value> = columns
                .iter()
                .map(|&column| {
                    let value = entry.value(column);
                    (column.name().to_string(), format_amount(value, column, args.exact))
                })
                .collect();
            Value::Object(row)
        })
        .collect();

    Ok(Value::Array(rows))
}

fn format_amount(value: Decimal, column: PaymentColumn, exact: bool) -> Value {
    match column {
        PaymentColumn::Period => Value::from(value.to_string()),
        _ if exact => Value::from(value.normalize().to_string()),
        _ => Value::from(round_currency(value).to_string()),
    }
}
