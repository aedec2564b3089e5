pub mod error;
pub mod fixed_point;
pub mod loan;
pub mod time_value;
pub mod types;

pub use error::CreditCostError;
pub use loan::{LoanTerms, PaymentColumn, PaymentEntry, PaymentPlan};
pub use types::*;

/// Standard result type for all credit-cost operations
pub type CreditCostResult<T> = Result<T, CreditCostError>;
