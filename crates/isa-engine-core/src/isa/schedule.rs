use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::IsaEngineError;
use crate::projection::income::IncomeSeries;
use crate::types::{Money, Multiple, Rate, Years};
use crate::IsaEngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A named rate-reducing adjustment to the investor's baseline target return
/// (GPA, test scores, cosigner, internship, return offer). Each determinant
/// is either fully applied or not; deltas sum linearly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateDeterminant {
    pub name: String,
    pub rate_delta: Rate,
    pub applied: bool,
}

/// The financing terms an ISA is priced against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingParameters {
    pub funding_amount: Money,
    pub term_years: Years,
    pub income_floor: Money,
    /// Repayment cap as a multiple of the funding amount (typically 1.5–3.0).
    pub cap_multiple: Multiple,
    /// Investor's required annual return before determinant adjustments.
    pub baseline_target_rate: Rate,
    #[serde(default)]
    pub determinants: Vec<RateDeterminant>,
}

impl FinancingParameters {
    pub fn validate(&self) -> IsaEngineResult<()> {
        if self.funding_amount <= Decimal::ZERO {
            return Err(IsaEngineError::InvalidInput {
                field: "funding_amount".into(),
                reason: "Funding amount must be > 0".into(),
            });
        }
        if self.term_years == 0 {
            return Err(IsaEngineError::InvalidInput {
                field: "term_years".into(),
                reason: "Term must be > 0 years".into(),
            });
        }
        if self.income_floor < Decimal::ZERO {
            return Err(IsaEngineError::InvalidInput {
                field: "income_floor".into(),
                reason: "Income floor must be >= 0".into(),
            });
        }
        if self.cap_multiple <= Decimal::ZERO {
            return Err(IsaEngineError::InvalidInput {
                field: "cap_multiple".into(),
                reason: "Repayment cap multiple must be > 0".into(),
            });
        }
        Ok(())
    }

    /// Maximum total a borrower will ever repay.
    pub fn repayment_cap(&self) -> Money {
        self.funding_amount * self.cap_multiple
    }

    /// Baseline target return less the applied determinant deltas, floored
    /// at zero.
    pub fn adjusted_target_rate(&self) -> Rate {
        let delta: Rate = self
            .determinants
            .iter()
            .filter(|d| d.applied)
            .map(|d| d.rate_delta)
            .sum();
        (self.baseline_target_rate + delta).max(Decimal::ZERO)
    }
}

/// One year of the repayment schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based year within the term.
    pub year: u32,
    pub income: Money,
    pub payment: Money,
    /// Payment as a fraction of gross income; zero in zero-income years.
    pub percent_gross: Rate,
    /// Cap remaining after this year's payment.
    pub remaining_balance: Money,
}

/// A full year-by-year repayment schedule honoring the repayment cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowSchedule {
    pub rows: Vec<ScheduleRow>,
    pub cap: Money,
    pub total_paid: Money,
    /// The cap was reached before the final year of the term. Informational,
    /// not an error.
    pub cap_reached_early: bool,
    pub cap_reached_year: Option<u32>,
}

impl CashFlowSchedule {
    /// Payments in year order, for cash-flow analysis.
    pub fn payments(&self) -> Vec<Money> {
        self.rows.iter().map(|r| r.payment).collect()
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Build a repayment schedule for a known repayment rate.
///
/// Strictly sequential: each year's payment depends on the cumulative total
/// from prior years, and is clamped so the running sum never exceeds
/// `funding_amount * cap_multiple`.
pub fn build_schedule(
    series: &IncomeSeries,
    repayment_rate: Rate,
    income_floor: Money,
    funding_amount: Money,
    cap_multiple: Multiple,
) -> IsaEngineResult<CashFlowSchedule> {
    if series.is_empty() {
        return Err(IsaEngineError::InvalidInput {
            field: "income_series".into(),
            reason: "Income series must contain at least one year".into(),
        });
    }
    if repayment_rate < Decimal::ZERO || repayment_rate > Decimal::ONE {
        return Err(IsaEngineError::InvalidInput {
            field: "repayment_rate".into(),
            reason: "Repayment rate must be a fraction in [0, 1]".into(),
        });
    }
    if income_floor < Decimal::ZERO {
        return Err(IsaEngineError::InvalidInput {
            field: "income_floor".into(),
            reason: "Income floor must be >= 0".into(),
        });
    }
    if funding_amount <= Decimal::ZERO {
        return Err(IsaEngineError::InvalidInput {
            field: "funding_amount".into(),
            reason: "Funding amount must be > 0".into(),
        });
    }
    if cap_multiple <= Decimal::ZERO {
        return Err(IsaEngineError::InvalidInput {
            field: "cap_multiple".into(),
            reason: "Repayment cap multiple must be > 0".into(),
        });
    }
    if series.iter().any(|income| *income < Decimal::ZERO) {
        return Err(IsaEngineError::InvalidInput {
            field: "income_series".into(),
            reason: "Incomes must be >= 0".into(),
        });
    }

    let cap = funding_amount * cap_multiple;
    let term = series.len() as u32;
    let mut total_paid = Decimal::ZERO;
    let mut cap_reached_year: Option<u32> = None;
    let mut rows: Vec<ScheduleRow> = Vec::with_capacity(series.len());

    for (idx, &income) in series.annual.iter().enumerate() {
        let year = idx as u32 + 1;

        if total_paid >= cap {
            rows.push(ScheduleRow {
                year,
                income,
                payment: Decimal::ZERO,
                percent_gross: Decimal::ZERO,
                remaining_balance: Decimal::ZERO,
            });
            continue;
        }

        let income_above_floor = (income - income_floor).max(Decimal::ZERO);
        // Clamp so the cap is never exceeded mid-year
        let payment = (income_above_floor * repayment_rate).min(cap - total_paid);
        total_paid += payment;

        let percent_gross = if income > Decimal::ZERO {
            payment / income
        } else {
            Decimal::ZERO
        };

        rows.push(ScheduleRow {
            year,
            income,
            payment,
            percent_gross,
            remaining_balance: cap - total_paid,
        });

        if total_paid >= cap && cap_reached_year.is_none() && year < term {
            cap_reached_year = Some(year);
        }
    }

    Ok(CashFlowSchedule {
        rows,
        cap,
        total_paid,
        cap_reached_early: cap_reached_year.is_some(),
        cap_reached_year,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
