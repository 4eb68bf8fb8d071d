use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use isa_engine_core::isa::FinancingParameters;
use isa_engine_core::projection::IncomeSeries;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Income series + financing parameters, as sent by the application backend.
#[derive(Deserialize)]
struct PricingRequest {
    income_series: Vec<Decimal>,
    params: FinancingParameters,
}

#[derive(Deserialize)]
struct DegreeProjectionRequest {
    degree_id: String,
    school_id: String,
    years: u32,
    #[serde(default)]
    year_of_first_income: u32,
    #[serde(default)]
    personal_factors: Vec<Decimal>,
}

#[derive(Deserialize)]
struct FixedLoanRequest {
    amount: Decimal,
    annual_rate: Decimal,
    term_years: u32,
    #[serde(default)]
    fees: Decimal,
}

// ---------------------------------------------------------------------------
// Income projection
// ---------------------------------------------------------------------------

#[napi]
pub fn project_income(input_json: String) -> NapiResult<String> {
    let input: isa_engine_core::projection::ProjectionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = isa_engine_core::projection::project(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_income_for_degree(input_json: String) -> NapiResult<String> {
    let request: DegreeProjectionRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let degree = isa_engine_core::projection::degree_program(&request.degree_id)
        .ok_or_else(|| to_napi_error(format!("Unknown degree program '{}'", request.degree_id)))?;
    let school = isa_engine_core::projection::school(&request.school_id)
        .ok_or_else(|| to_napi_error(format!("Unknown school '{}'", request.school_id)))?;
    let output = isa_engine_core::projection::project_for_degree(
        degree,
        school,
        request.years,
        request.year_of_first_income,
        &request.personal_factors,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// ISA pricing
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_isa_schedule(input_json: String) -> NapiResult<String> {
    let request: PricingRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let series = IncomeSeries::new(request.income_series);
    let output = isa_engine_core::isa::compute_isa_schedule(&series, &request.params)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn solve_isa_terms(input_json: String) -> NapiResult<String> {
    let request: PricingRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let series = IncomeSeries::new(request.income_series);
    let output =
        isa_engine_core::isa::solve_isa_terms(&series, &request.params).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Fixed-loan comparison
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_fixed_loan(input_json: String) -> NapiResult<String> {
    let request: FixedLoanRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = isa_engine_core::comparison::compare_fixed_loan(
        request.amount,
        request.annual_rate,
        request.term_years,
        request.fees,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reference catalogs
// ---------------------------------------------------------------------------

#[napi]
pub fn list_degree_programs() -> NapiResult<String> {
    serde_json::to_string(isa_engine_core::projection::degree_programs()).map_err(to_napi_error)
}

#[napi]
pub fn list_schools() -> NapiResult<String> {
    serde_json::to_string(isa_engine_core::projection::schools()).map_err(to_napi_error)
}
