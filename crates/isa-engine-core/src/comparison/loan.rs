use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::IsaEngineError;
use crate::time_value::{compound, pmt};
use crate::types::{with_metadata, ComputationOutput, Convergence, Money, Rate, Years};
use crate::IsaEngineResult;

const APR_TOLERANCE: Decimal = dec!(0.000001);
const MAX_APR_ITERATIONS: u32 = 100;
const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Side-by-side baseline for a traditional fixed-rate amortizing loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedLoanComparison {
    pub monthly_payment: Money,
    /// Fee-adjusted annual percentage rate (nominal, monthly compounding).
    pub apr: Rate,
    pub total_repayment: Money,
    pub total_interest: Money,
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

fn validate_loan(amount: Money, annual_rate: Rate, term_years: Years) -> IsaEngineResult<()> {
    if amount <= Decimal::ZERO {
        return Err(IsaEngineError::InvalidInput {
            field: "amount".into(),
            reason: "Loan amount must be > 0".into(),
        });
    }
    if annual_rate < Decimal::ZERO {
        return Err(IsaEngineError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate must be >= 0".into(),
        });
    }
    if term_years == 0 {
        return Err(IsaEngineError::InvalidInput {
            field: "term_years".into(),
            reason: "Term must be > 0 years".into(),
        });
    }
    Ok(())
}

/// Level monthly payment via the standard amortization formula. A zero rate
/// reduces to straight-line division.
pub fn monthly_payment(amount: Money, annual_rate: Rate, term_years: Years) -> IsaEngineResult<Money> {
    validate_loan(amount, annual_rate, term_years)?;
    let monthly_rate = annual_rate / Decimal::from(MONTHS_PER_YEAR);
    pmt(monthly_rate, term_years * MONTHS_PER_YEAR, amount)
}

/// Fee-adjusted APR: the monthly rate at which the net disbursement
/// (`amount - fees`) amortizes to the nominal payment, found by
/// Newton-Raphson on the payment formula's analytic derivative.
pub fn apr(
    amount: Money,
    annual_rate: Rate,
    term_years: Years,
    fees: Money,
) -> IsaEngineResult<Convergence> {
    validate_loan(amount, annual_rate, term_years)?;
    if fees < Decimal::ZERO {
        return Err(IsaEngineError::InvalidInput {
            field: "fees".into(),
            reason: "Fees must be >= 0".into(),
        });
    }
    if fees >= amount {
        return Err(IsaEngineError::InvalidInput {
            field: "fees".into(),
            reason: "Fees must be less than the loan amount".into(),
        });
    }

    // Without fees the borrower's rate is the nominal rate
    if fees.is_zero() {
        return Ok(Convergence {
            rate: annual_rate,
            converged: true,
            iterations: 0,
            residual: Decimal::ZERO,
        });
    }

    let target_payment = monthly_payment(amount, annual_rate, term_years)?;
    let financed = amount - fees;
    let nper = term_years * MONTHS_PER_YEAR;
    let nper_dec = Decimal::from(nper);

    // Fees make the true rate strictly higher than nominal
    let mut rate = (annual_rate / Decimal::from(MONTHS_PER_YEAR)).max(dec!(0.0005));
    let mut residual = Decimal::MAX;

    for i in 0..MAX_APR_ITERATIONS {
        let one_plus_r = Decimal::ONE + rate;
        let factor = compound(rate, nper);
        let denominator = factor - Decimal::ONE;
        if denominator.is_zero() {
            break;
        }

        let payment = financed * rate * factor / denominator;
        let delta = payment - target_payment;
        residual = delta.abs();

        if residual < APR_TOLERANCE {
            return Ok(Convergence {
                rate: rate * Decimal::from(MONTHS_PER_YEAR),
                converged: true,
                iterations: i,
                residual,
            });
        }

        // d(payment)/d(rate) = A * [k(k-1) - n*r*k/(1+r)] / (k-1)^2
        let derivative = financed
            * (factor * denominator - nper_dec * rate * factor / one_plus_r)
            / (denominator * denominator);
        if derivative.is_zero() {
            break;
        }

        rate -= delta / derivative;

        // Keep the iterate in the physically meaningful band
        if rate <= Decimal::ZERO {
            rate = dec!(0.000001);
        } else if rate > Decimal::ONE {
            rate = Decimal::ONE;
        }
    }

    Ok(Convergence {
        rate: rate * Decimal::from(MONTHS_PER_YEAR),
        converged: false,
        iterations: MAX_APR_ITERATIONS,
        residual,
    })
}

/// Full fixed-loan baseline for side-by-side display against ISA terms.
pub fn compare_fixed_loan(
    amount: Money,
    annual_rate: Rate,
    term_years: Years,
    fees: Money,
) -> IsaEngineResult<ComputationOutput<FixedLoanComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let payment = monthly_payment(amount, annual_rate, term_years)?;
    let apr_outcome = apr(amount, annual_rate, term_years, fees)?;
    if !apr_outcome.converged {
        warnings.push(format!(
            "APR search did not converge after {} iterations; best estimate returned (payment residual {})",
            apr_outcome.iterations, apr_outcome.residual
        ));
    }

    let total_repayment = payment * Decimal::from(term_years * MONTHS_PER_YEAR);
    let comparison = FixedLoanComparison {
        monthly_payment: payment,
        apr: apr_outcome.rate,
        total_repayment,
        total_interest: total_repayment - amount,
        converged: apr_outcome.converged,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate loan baseline (amortized payment, fee-adjusted APR via Newton-Raphson)",
        &serde_json::json!({
            "amount": amount.to_string(),
            "annual_rate": annual_rate.to_string(),
            "term_years": term_years,
            "fees": fees.to_string(),
        }),
        warnings,
        elapsed,
        comparison,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
