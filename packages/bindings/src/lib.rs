use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use credit_cost_core::loan::disclosure::{self, DisclosureInput};
use credit_cost_core::loan::schedule;
use credit_cost_core::time_value::{self, CashFlowInput, LevelPaymentInput, NpvInput};
use credit_cost_core::{CreditCostError, LoanTerms};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn to_json(value: &impl Serialize) -> NapiResult<String> {
    serde_json::to_string(value).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn credit_disclosure(input_json: String) -> NapiResult<String> {
    let input: DisclosureInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = disclosure::calculate_credit_disclosure(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn payment_plan(input_json: String) -> NapiResult<String> {
    let terms: LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    disclosure::validate_terms(&terms).map_err(to_napi_error)?;
    let plan = schedule::build_payment_plan(&terms).map_err(to_napi_error)?;
    to_json(&plan)
}

// ---------------------------------------------------------------------------
// Time value
// ---------------------------------------------------------------------------

#[napi]
pub fn irr(input_json: String) -> NapiResult<String> {
    let input: CashFlowInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    if input.cash_flows.is_empty() {
        return Err(to_napi_error(CreditCostError::InsufficientData(
            "at least one cash flow is required".into(),
        )));
    }
    to_json(&time_value::solve_irr(&input.cash_flows))
}

#[napi]
pub fn npv(input_json: String) -> NapiResult<String> {
    let input: NpvInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    to_json(&serde_json::json!({
        "npv": time_value::npv(&input.cash_flows, input.rate),
    }))
}

#[napi]
pub fn level_payment(input_json: String) -> NapiResult<String> {
    let input: LevelPaymentInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    to_json(&serde_json::json!({ "payment": input.payment() }))
}
