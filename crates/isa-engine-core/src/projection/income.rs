use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::IsaEngineError;
use crate::projection::reference::{DegreeProgram, School};
use crate::time_value::compound;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Years};
use crate::IsaEngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for an income projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInput {
    /// Annual salary in the first year of employment, before adjustments.
    pub base_salary: Money,
    /// Annual compounding growth rate. May be zero or negative.
    pub growth_rate: Rate,
    /// Length of the projection, in years. Must equal the financing term.
    pub years: Years,
    /// Zero-based year in which employment starts. Years before this are the
    /// study period and project zero income.
    #[serde(default)]
    pub year_of_first_income: u32,
    /// Multiplicative adjustments (school employment multiplier, personal
    /// factors). Applied once to the base salary, not compounded.
    #[serde(default)]
    pub adjustment_factors: Vec<Decimal>,
}

/// Ordered sequence of one non-negative income value per year of the term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeSeries {
    pub annual: Vec<Money>,
}

impl IncomeSeries {
    pub fn new(annual: Vec<Money>) -> Self {
        Self { annual }
    }

    pub fn len(&self) -> usize {
        self.annual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annual.is_empty()
    }

    pub fn total(&self) -> Money {
        self.annual.iter().sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Money> {
        self.annual.iter()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round to the nearest 100 currency units. Projected salaries carry no
/// meaningful precision below that, and the rounding keeps downstream
/// comparisons stable.
fn round_to_hundred(amount: Money) -> Money {
    (amount / dec!(100)).round() * dec!(100)
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Project an annual income series from a base salary, growth rate, and
/// multiplicative adjustment factors.
pub fn project(input: &ProjectionInput) -> IsaEngineResult<ComputationOutput<IncomeSeries>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.years == 0 {
        return Err(IsaEngineError::InvalidInput {
            field: "years".into(),
            reason: "Projection length must be > 0".into(),
        });
    }
    if input.base_salary < Decimal::ZERO {
        return Err(IsaEngineError::InvalidInput {
            field: "base_salary".into(),
            reason: "Base salary must be >= 0".into(),
        });
    }

    if input.year_of_first_income >= input.years {
        warnings.push(format!(
            "First income in year {} falls outside the {}-year term; all projected incomes are zero",
            input.year_of_first_income, input.years
        ));
    }

    let adjusted_base: Money = input
        .adjustment_factors
        .iter()
        .fold(input.base_salary, |salary, factor| salary * factor);

    let mut clamped_negative = false;
    let mut annual: Vec<Money> = Vec::with_capacity(input.years as usize);
    for year in 0..input.years {
        if year < input.year_of_first_income {
            annual.push(Decimal::ZERO);
            continue;
        }
        let grown = adjusted_base * compound(input.growth_rate, year - input.year_of_first_income);
        let rounded = round_to_hundred(grown);
        if rounded < Decimal::ZERO {
            clamped_negative = true;
        }
        annual.push(rounded.max(Decimal::ZERO));
    }

    if clamped_negative {
        warnings.push("Projected income fell below zero and was clamped to zero".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Income projection (compounded growth over employment years, rounded to nearest 100)",
        &serde_json::json!({
            "base_salary": input.base_salary.to_string(),
            "growth_rate": input.growth_rate.to_string(),
            "years": input.years,
            "year_of_first_income": input.year_of_first_income,
            "adjustment_factors": input.adjustment_factors.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
        }),
        warnings,
        elapsed,
        IncomeSeries::new(annual),
    ))
}

/// Project income for a degree/school pair from the reference catalogs,
/// with any personal adjustment factors appended after the school's
/// employment multiplier.
pub fn project_for_degree(
    degree: &DegreeProgram,
    school: &School,
    years: Years,
    year_of_first_income: u32,
    personal_factors: &[Decimal],
) -> IsaEngineResult<ComputationOutput<IncomeSeries>> {
    let mut adjustment_factors = Vec::with_capacity(personal_factors.len() + 1);
    adjustment_factors.push(school.employment_multiplier);
    adjustment_factors.extend_from_slice(personal_factors);

    project(&ProjectionInput {
        base_salary: degree.starting_salary,
        growth_rate: degree.growth_rate,
        years,
        year_of_first_income,
        adjustment_factors,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
