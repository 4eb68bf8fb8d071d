use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use isa_engine_core::comparison::compare_fixed_loan;

/// Arguments for the fixed-loan comparison baseline
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CompareLoanArgs {
    /// Loan principal
    #[arg(long)]
    pub amount: Decimal,

    /// Nominal annual interest rate (e.g. 0.065 for 6.5%)
    #[arg(long)]
    pub rate: Decimal,

    /// Term in years
    #[arg(long)]
    pub term_years: u32,

    /// Origination fees netted out of the disbursement
    #[arg(long, default_value = "0")]
    pub fees: Decimal,
}

pub fn run_compare_loan(args: CompareLoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = compare_fixed_loan(args.amount, args.rate, args.term_years, args.fees)?;
    Ok(serde_json::to_value(result)?)
}
