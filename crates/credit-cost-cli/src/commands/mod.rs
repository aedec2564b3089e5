pub mod loan;
pub mod time_value;
