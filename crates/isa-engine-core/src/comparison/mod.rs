pub mod loan;

pub use loan::{apr, compare_fixed_loan, monthly_payment, FixedLoanComparison};
