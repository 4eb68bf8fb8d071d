use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use isa_engine_core::projection::{self, ProjectionInput};

use crate::input;

/// Arguments for income projection
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ProjectArgs {
    /// Degree-program id from the reference catalog (see `isa degrees`)
    #[arg(long, conflicts_with = "base_salary")]
    pub degree: Option<String>,

    /// School id from the reference catalog (see `isa schools`)
    #[arg(long, requires = "degree")]
    pub school: Option<String>,

    /// First-year salary (explicit alternative to --degree)
    #[arg(long)]
    pub base_salary: Option<Decimal>,

    /// Annual income growth rate (e.g. 0.04 for 4%); required with --base-salary
    #[arg(long)]
    pub growth_rate: Option<Decimal>,

    /// Projection length in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Zero-based year employment starts (years before are the study period)
    #[arg(long, default_value_t = 0)]
    pub year_of_first_income: u32,

    /// Multiplicative adjustment factor; repeatable
    #[arg(long = "factor")]
    pub factors: Vec<Decimal>,

    /// Read a full ProjectionInput from a JSON file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        let projection_input: ProjectionInput = input::read_json(path)?;
        let result = projection::project(&projection_input)?;
        return Ok(serde_json::to_value(result)?);
    }
    if let Some(data) = input::read_stdin()? {
        let projection_input: ProjectionInput = serde_json::from_value(data)?;
        let result = projection::project(&projection_input)?;
        return Ok(serde_json::to_value(result)?);
    }

    let years = args.years.ok_or("--years is required (or provide --input)")?;

    let result = if let Some(ref degree_id) = args.degree {
        let degree = projection::degree_program(degree_id)
            .ok_or_else(|| format!("Unknown degree program '{}'", degree_id))?;
        let school_id = args.school.as_deref().unwrap_or("state_flagship");
        let school = projection::school(school_id)
            .ok_or_else(|| format!("Unknown school '{}'", school_id))?;
        projection::project_for_degree(
            degree,
            school,
            years,
            args.year_of_first_income,
            &args.factors,
        )?
    } else {
        projection::project(&ProjectionInput {
            base_salary: args
                .base_salary
                .ok_or("--base-salary is required (or --degree, or --input)")?,
            growth_rate: args
                .growth_rate
                .ok_or("--growth-rate is required with --base-salary")?,
            years,
            year_of_first_income: args.year_of_first_income,
            adjustment_factors: args.factors,
        })?
    };

    Ok(serde_json::to_value(result)?)
}
