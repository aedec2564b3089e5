//! Amortizing consumer loans: terms, payment plans, cash flows and the
//! effective-interest-rate disclosures derived from them.

pub mod cash_flow;
pub mod disclosure;
pub mod metrics;
pub mod plan;
pub mod schedule;
pub mod terms;

pub use plan::{PaymentColumn, PaymentEntry, PaymentPlan};
pub use terms::LoanTerms;
