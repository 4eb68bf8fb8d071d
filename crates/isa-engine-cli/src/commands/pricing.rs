use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use isa_engine_core::isa::{compute_isa_schedule, solve_isa_terms, FinancingParameters};
use isa_engine_core::projection::IncomeSeries;

use crate::input;

/// A pricing request as supplied by file or stdin: the projected income
/// series plus the financing parameters (including any rate determinants).
#[derive(Deserialize)]
struct PricingRequest {
    income_series: Vec<Decimal>,
    params: FinancingParameters,
}

/// Arguments for schedule construction
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub pricing: PricingFlags,
}

/// Arguments for ISA terms pricing
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct TermsArgs {
    #[command(flatten)]
    pub pricing: PricingFlags,
}

/// Flags shared by `schedule` and `terms`
#[derive(Args)]
pub struct PricingFlags {
    /// Annual income for one year of the term; repeatable, in year order
    #[arg(long = "income")]
    pub incomes: Vec<Decimal>,

    /// Amount funded to the borrower
    #[arg(long)]
    pub funding_amount: Option<Decimal>,

    /// Income below this threshold is excluded from the repayment base
    #[arg(long, default_value = "0")]
    pub income_floor: Decimal,

    /// Repayment cap as a multiple of the funding amount
    #[arg(long, default_value = "2.0")]
    pub cap_multiple: Decimal,

    /// Investor's baseline target annual return (e.g. 0.08 for 8%)
    #[arg(long, default_value = "0.08")]
    pub target_rate: Decimal,

    /// Read a full pricing request (income series + parameters, including
    /// determinants) from a JSON file
    #[arg(long)]
    pub input: Option<String>,
}

impl PricingFlags {
    fn resolve(self) -> Result<(IncomeSeries, FinancingParameters), Box<dyn std::error::Error>> {
        let request: PricingRequest = if let Some(ref path) = self.input {
            input::read_json(path)?
        } else if let Some(data) = input::read_stdin()? {
            serde_json::from_value(data)?
        } else {
            if self.incomes.is_empty() {
                return Err("at least one --income is required (or provide --input)".into());
            }
            let funding_amount = self
                .funding_amount
                .ok_or("--funding-amount is required (or provide --input)")?;
            PricingRequest {
                params: FinancingParameters {
                    funding_amount,
                    term_years: self.incomes.len() as u32,
                    income_floor: self.income_floor,
                    cap_multiple: self.cap_multiple,
                    baseline_target_rate: self.target_rate,
                    determinants: vec![],
                },
                income_series: self.incomes,
            }
        };

        Ok((IncomeSeries::new(request.income_series), request.params))
    }
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (series, params) = args.pricing.resolve()?;
    let result = compute_isa_schedule(&series, &params)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_terms(args: TermsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (series, params) = args.pricing.resolve()?;
    let result = solve_isa_terms(&series, &params)?;
    Ok(serde_json::to_value(result)?)
}
