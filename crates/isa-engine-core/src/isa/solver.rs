use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::IsaEngineError;
use crate::isa::schedule::{build_schedule, CashFlowSchedule, FinancingParameters};
use crate::projection::income::IncomeSeries;
use crate::time_value::{irr, npv};
use crate::types::{with_metadata, ComputationOutput, Convergence, Money, Multiple, Rate};
use crate::IsaEngineResult;

/// Secant iteration stops once the schedule's NPV at the target rate is
/// within one cent of zero.
const SECANT_TOLERANCE: Decimal = dec!(0.01);
const MAX_SECANT_ITERATIONS: u32 = 1000;

/// Solved rates below this are non-physical; clamp rather than fail.
const MIN_REPAYMENT_RATE: Rate = dec!(0.0001);
const MAX_REPAYMENT_RATE: Rate = Decimal::ONE;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The priced terms of an ISA: the repayment rate a borrower pays on income
/// above the floor, and the effective annual rate of the schedule that rate
/// produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsaTerms {
    pub repayment_rate: Rate,
    /// IRR of `[-funding, payment_1, ..., payment_n]`, the APR-equivalent
    /// shown alongside fixed-loan comparisons.
    pub effective_annual_rate: Rate,
    pub total_paid: Money,
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

fn clamp_rate(rate: Rate) -> Rate {
    rate.max(MIN_REPAYMENT_RATE).min(MAX_REPAYMENT_RATE)
}

/// Find the repayment rate whose schedule yields the target internal rate of
/// return, by secant iteration on the schedule's NPV.
///
/// Seeded from the pay-back-principal heuristic `funding / repayable income`.
/// Never fails on non-convergence: the best iterate comes back with
/// `converged == false` so callers can still display a number.
pub fn solve_repayment_rate(
    series: &IncomeSeries,
    funding_amount: Money,
    income_floor: Money,
    cap_multiple: Multiple,
    target_rate: Rate,
) -> IsaEngineResult<Convergence> {
    let repayable: Money = series
        .iter()
        .map(|income| (income - income_floor).max(Decimal::ZERO))
        .sum();
    if repayable <= Decimal::ZERO {
        return Err(IsaEngineError::InsufficientData(
            "Income series never exceeds the repayment floor".into(),
        ));
    }

    let npv_at = |rate: Rate| -> IsaEngineResult<Money> {
        let schedule = build_schedule(series, rate, income_floor, funding_amount, cap_multiple)?;
        let mut flows = Vec::with_capacity(schedule.rows.len() + 1);
        flows.push(-funding_amount);
        flows.extend(schedule.payments());
        npv(target_rate, &flows)
    };

    // Two seeds: the rate that repays exactly the principal, and 1.5x it.
    let mut rate_a = clamp_rate(funding_amount / repayable);
    let mut rate_b = clamp_rate(rate_a * dec!(1.5));
    if rate_b == rate_a {
        rate_b = clamp_rate(rate_a + dec!(0.01));
    }

    let mut npv_a = npv_at(rate_a)?;
    if npv_a.abs() < SECANT_TOLERANCE {
        return Ok(Convergence {
            rate: rate_a,
            converged: true,
            iterations: 0,
            residual: npv_a.abs(),
        });
    }
    let mut npv_b = npv_at(rate_b)?;

    let mut best_rate = rate_a;
    let mut best_npv = npv_a;
    if npv_b.abs() < npv_a.abs() {
        best_rate = rate_b;
        best_npv = npv_b;
    }

    for i in 0..MAX_SECANT_ITERATIONS {
        if npv_b.abs() < SECANT_TOLERANCE {
            return Ok(Convergence {
                rate: rate_b,
                converged: true,
                iterations: i,
                residual: npv_b.abs(),
            });
        }
        // Flat step: the cap is binding across both candidates (or the
        // series cannot move the NPV); no further progress is possible.
        if npv_b == npv_a {
            break;
        }

        let next = clamp_rate(rate_b - npv_b * (rate_b - rate_a) / (npv_b - npv_a));
        rate_a = rate_b;
        npv_a = npv_b;
        rate_b = next;
        npv_b = npv_at(rate_b)?;

        if npv_b.abs() < best_npv.abs() {
            best_rate = rate_b;
            best_npv = npv_b;
        }
    }

    Ok(Convergence {
        rate: best_rate,
        converged: false,
        iterations: MAX_SECANT_ITERATIONS,
        residual: best_npv.abs(),
    })
}

/// The series must carry exactly one income per year of the declared term;
/// a shorter or longer series would price the ISA against the wrong horizon.
fn validate_series_term(
    series: &IncomeSeries,
    params: &FinancingParameters,
) -> IsaEngineResult<()> {
    if series.len() as u32 != params.term_years {
        return Err(IsaEngineError::InvalidInput {
            field: "income_series".into(),
            reason: format!(
                "Income series covers {} years but the financing term is {}",
                series.len(),
                params.term_years
            ),
        });
    }
    Ok(())
}

/// Price an ISA: solve the repayment rate for the parameters' adjusted
/// target return, then derive the effective annual rate of the resulting
/// schedule.
pub fn solve_isa_terms(
    series: &IncomeSeries,
    params: &FinancingParameters,
) -> IsaEngineResult<ComputationOutput<IsaTerms>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    params.validate()?;
    validate_series_term(series, params)?;
    let target = params.adjusted_target_rate();

    let solution = solve_repayment_rate(
        series,
        params.funding_amount,
        params.income_floor,
        params.cap_multiple,
        target,
    )?;
    if !solution.converged {
        warnings.push(format!(
            "Repayment rate search did not converge after {} iterations; best estimate returned (residual NPV {})",
            solution.iterations, solution.residual
        ));
    }

    let schedule = build_schedule(
        series,
        solution.rate,
        params.income_floor,
        params.funding_amount,
        params.cap_multiple,
    )?;

    let mut flows = Vec::with_capacity(schedule.rows.len() + 1);
    flows.push(-params.funding_amount);
    flows.extend(schedule.payments());
    let implied = irr(&flows, target.max(dec!(0.01)))?;
    if !implied.converged {
        warnings.push(format!(
            "Effective-rate IRR did not converge after {} iterations; best estimate returned",
            implied.iterations
        ));
    }

    let terms = IsaTerms {
        repayment_rate: solution.rate,
        effective_annual_rate: implied.rate,
        total_paid: schedule.total_paid,
        converged: solution.converged && implied.converged,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "ISA pricing (secant search for the repayment rate meeting the target IRR)",
        &serde_json::json!({
            "funding_amount": params.funding_amount.to_string(),
            "term_years": params.term_years,
            "income_floor": params.income_floor.to_string(),
            "cap_multiple": params.cap_multiple.to_string(),
            "baseline_target_rate": params.baseline_target_rate.to_string(),
            "adjusted_target_rate": target.to_string(),
            "determinants_applied": params.determinants.iter().filter(|d| d.applied).count(),
        }),
        warnings,
        elapsed,
        terms,
    ))
}

/// Solve the repayment rate for the parameters, then return the full
/// year-by-year schedule it produces.
pub fn compute_isa_schedule(
    series: &IncomeSeries,
    params: &FinancingParameters,
) -> IsaEngineResult<ComputationOutput<CashFlowSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    params.validate()?;
    validate_series_term(series, params)?;
    let target = params.adjusted_target_rate();

    let solution = solve_repayment_rate(
        series,
        params.funding_amount,
        params.income_floor,
        params.cap_multiple,
        target,
    )?;
    if !solution.converged {
        warnings.push(format!(
            "Repayment rate search did not converge after {} iterations; schedule built from best estimate",
            solution.iterations
        ));
    }

    let schedule = build_schedule(
        series,
        solution.rate,
        params.income_floor,
        params.funding_amount,
        params.cap_multiple,
    )?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "ISA repayment schedule (cap-truncated, floor-adjusted annual payments)",
        &serde_json::json!({
            "funding_amount": params.funding_amount.to_string(),
            "income_floor": params.income_floor.to_string(),
            "cap_multiple": params.cap_multiple.to_string(),
            "adjusted_target_rate": target.to_string(),
            "repayment_rate": solution.rate.to_string(),
        }),
        warnings,
        elapsed,
        schedule,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
