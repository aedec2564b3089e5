use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CreditCostError;
use crate::time_value;
use crate::types::Money;

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One row of a payment plan.
///
/// Period 0 is the disbursement: the outgoing balance is the principal and
/// the cash flow is its negation, every other amount is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub period: u32,
    /// Amount paid for the credit this period (interest-only or level annuity)
    pub cost_of_credit: Money,
    pub interest: Money,
    pub amortization: Money,
    pub fee: Money,
    pub outgoing_balance: Money,
    /// Net money movement: `-principal` at disbursement, `cost_of_credit + fee` after
    pub cash_flow: Money,
}

impl PaymentEntry {
    pub(crate) fn disbursement(principal: Money) -> Self {
        Self {
            period: 0,
            cost_of_credit: Decimal::ZERO,
            interest: Decimal::ZERO,
            amortization: Decimal::ZERO,
            fee: Decimal::ZERO,
            outgoing_balance: principal,
            cash_flow: -principal,
        }
    }

    /// Read one field by column.
    pub fn value(&self, column: PaymentColumn) -> Decimal {
        match column {
            PaymentColumn::Period => Decimal::from(self.period),
            PaymentColumn::CostOfCredit => self.cost_of_credit,
            PaymentColumn::Interest => self.interest,
            PaymentColumn::Amortization => self.amortization,
            PaymentColumn::Fee => self.fee,
            PaymentColumn::OutgoingBalance => self.outgoing_balance,
            PaymentColumn::CashFlow => self.cash_flow,
        }
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Named column of a payment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentColumn {
    Period,
    CostOfCredit,
    Interest,
    Amortization,
    Fee,
    OutgoingBalance,
    CashFlow,
}

impl PaymentColumn {
    /// Every column, in row order.
    pub const ALL: [PaymentColumn; 7] = [
        PaymentColumn::Period,
        PaymentColumn::CostOfCredit,
        PaymentColumn::Interest,
        PaymentColumn::Amortization,
        PaymentColumn::Fee,
        PaymentColumn::OutgoingBalance,
        PaymentColumn::CashFlow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PaymentColumn::Period => "period",
            PaymentColumn::CostOfCredit => "cost_of_credit",
            PaymentColumn::Interest => "interest",
            PaymentColumn::Amortization => "amortization",
            PaymentColumn::Fee => "fee",
            PaymentColumn::OutgoingBalance => "outgoing_balance",
            PaymentColumn::CashFlow => "cash_flow",
        }
    }
}

impl fmt::Display for PaymentColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaymentColumn {
    type Err = CreditCostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentColumn::ALL
            .into_iter()
            .find(|column| column.name() == s)
            .ok_or_else(|| CreditCostError::InvalidInput {
                field: "column".into(),
                reason: format!("Unknown payment plan column '{s}'"),
            })
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Ordered payment schedule: entry 0 is the disbursement, entries 1..=N the
/// periods. Only [`crate::loan::schedule::build_payment_plan`] creates one;
/// it is read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PaymentPlan {
    entries: Vec<PaymentEntry>,
}

impl PaymentPlan {
    pub(crate) fn from_entries(entries: Vec<PaymentEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PaymentEntry> {
        self.entries.get(index)
    }

    pub fn first(&self) -> Option<&PaymentEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&PaymentEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[PaymentEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaymentEntry> {
        self.entries.iter()
    }

    pub fn column_names() -> Vec<&'static str> {
        PaymentColumn::ALL.iter().map(|c| c.name()).collect()
    }

    /// One column across every entry, disbursement included.
    pub fn column(&self, column: PaymentColumn) -> Vec<Decimal> {
        self.entries.iter().map(|e| e.value(column)).collect()
    }

    /// Column lookup by its snake_case name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<Decimal>> {
        name.parse::<PaymentColumn>().ok().map(|c| self.column(c))
    }

    /// Entries as rows of values in [`PaymentColumn::ALL`] order.
    pub fn rows(&self) -> Vec<[Decimal; 7]> {
        self.entries
            .iter()
            .map(|e| PaymentColumn::ALL.map(|c| e.value(c)))
            .collect()
    }

    /// Interest paid over the whole plan.
    pub fn total_interest(&self) -> Money {
        self.entries.iter().map(|e| e.interest).sum()
    }

    /// The signed cash-flow column as floats, ready for the IRR solver.
    pub fn cash_flow(&self) -> Vec<f64> {
        self.entries
            .iter()
            .map(|e| e.cash_flow.to_f64().unwrap_or(f64::NAN))
            .collect()
    }

    /// Periodic internal rate of return of the plan's cash flow.
    pub fn irr(&self) -> f64 {
        time_value::irr(&self.cash_flow())
    }
}

impl<'a> IntoIterator for &'a PaymentPlan {
    type Item = &'a PaymentEntry;
    type IntoIter = std::slice::Iter<'a, PaymentEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn two_period_plan() -> PaymentPlan {
        PaymentPlan::from_entries(vec![
            PaymentEntry::disbursement(dec!(1000)),
            PaymentEntry {
                period: 1,
                cost_of_credit: dec!(507.51),
                interest: dec!(10),
                amortization: dec!(497.51),
                fee: dec!(5),
                outgoing_balance: dec!(502.49),
                cash_flow: dec!(512.51),
            },
            PaymentEntry {
                period: 2,
                cost_of_credit: dec!(507.51),
                interest: dec!(5.02),
                amortization: dec!(502.49),
                fee: dec!(5),
                outgoing_balance: dec!(0),
                cash_flow: dec!(512.51),
            },
        ])
    }

    #[test]
    fn test_disbursement_entry() {
        let entry = PaymentEntry::disbursement(dec!(50429));
        assert_eq!(entry.period, 0);
        assert_eq!(entry.outgoing_balance, dec!(50429));
        assert_eq!(entry.cash_flow, dec!(-50429));
        assert_eq!(entry.interest, Decimal::ZERO);
    }

    #[test]
    fn test_column_names_in_row_order() {
        assert_eq!(
            PaymentPlan::column_names(),
            vec![
                "period",
                "cost_of_credit",
                "interest",
                "amortization",
                "fee",
                "outgoing_balance",
                "cash_flow"
            ]
        );
    }

    #[test]
    fn test_column_by_name() {
        let plan = two_period_plan();
        assert_eq!(
            plan.column_by_name("cash_flow"),
            Some(vec![dec!(-1000), dec!(512.51), dec!(512.51)])
        );
        assert_eq!(
            plan.column_by_name("period"),
            Some(vec![dec!(0), dec!(1), dec!(2)])
        );
        assert_eq!(plan.column_by_name("balance"), None);
    }

    #[test]
    fn test_unknown_column_is_invalid_input() {
        let err = "monthly_fee".parse::<PaymentColumn>().unwrap_err();
        assert!(matches!(err, CreditCostError::InvalidInput { .. }));
    }

    #[test]
    fn test_rows_follow_columns() {
        let plan = two_period_plan();
        let rows = plan.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[1],
            [
                dec!(1),
                dec!(507.51),
                dec!(10),
                dec!(497.51),
                dec!(5),
                dec!(502.49),
                dec!(512.51)
            ]
        );
    }

    #[test]
    fn test_totals_and_cash_flow() {
        let plan = two_period_plan();
        assert_eq!(plan.total_interest(), dec!(15.02));
        let flows = plan.cash_flow();
        assert_eq!(flows.len(), 3);
        assert_eq!(flows[0], -1000.0);
        assert!((flows[2] - 512.51).abs() < 1e-9);
        assert_eq!((&plan).into_iter().count(), 3);
        assert_eq!(plan.last().map(|e| e.period), Some(2));
    }

    #[test]
    fn test_serializes_as_array_of_entries() {
        let value = serde_json::to_value(two_period_plan()).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["period"], 0);
        assert_eq!(rows[0]["cash_flow"], "-1000");
    }
}
