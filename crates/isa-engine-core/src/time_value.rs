use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::IsaEngineError;
use crate::types::{Convergence, Money, Rate};
use crate::IsaEngineResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_NEWTON_ITERATIONS: u32 = 100;

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
pub fn compound(rate: Rate, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result *= factor;
    }
    result
}

/// Net Present Value of a series of annual cash flows.
///
/// `cash_flows[0]` is the period-0 flow (the negative disbursement for a
/// financing), discounted at 1; later entries discount at `(1 + rate)^t`.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> IsaEngineResult<Money> {
    if cash_flows.is_empty() {
        return Err(IsaEngineError::InvalidInput {
            field: "cash_flows".into(),
            reason: "NPV requires at least one cash flow".into(),
        });
    }
    if rate <= dec!(-1) {
        return Err(IsaEngineError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount.is_zero() {
            return Err(IsaEngineError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Internal Rate of Return using Newton-Raphson.
///
/// Never fails on non-convergence: a flat derivative or an exhausted
/// iteration budget returns the best iterate with `converged == false`.
pub fn irr(cash_flows: &[Money], guess: Rate) -> IsaEngineResult<Convergence> {
    if cash_flows.len() < 2 {
        return Err(IsaEngineError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let mut rate = guess;

    for i in 0..MAX_NEWTON_ITERATIONS {
        let one_plus_r = Decimal::ONE + rate;
        let mut npv_val = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;
        let mut discount = Decimal::ONE;

        for (t, cf) in cash_flows.iter().enumerate() {
            if t > 0 {
                discount *= one_plus_r;
            }
            if discount.is_zero() {
                continue;
            }
            npv_val += cf / discount;
            if t > 0 {
                dnpv -= Decimal::from(t as i64) * cf / (discount * one_plus_r);
            }
        }

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(Convergence {
                rate,
                converged: true,
                iterations: i,
                residual: npv_val.abs(),
            });
        }

        if dnpv.is_zero() {
            return Ok(Convergence {
                rate,
                converged: false,
                iterations: i,
                residual: npv_val.abs(),
            });
        }

        rate -= npv_val / dnpv;

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(100.0) {
            rate = dec!(100.0);
        }
    }

    let residual = npv(rate, cash_flows)?.abs();
    Ok(Convergence {
        rate,
        converged: false,
        iterations: MAX_NEWTON_ITERATIONS,
        residual,
    })
}

/// Level payment that amortizes `present_value` over `nper` periods.
pub fn pmt(rate: Rate, nper: u32, present_value: Money) -> IsaEngineResult<Money> {
    if nper == 0 {
        return Err(IsaEngineError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(present_value / Decimal::from(nper));
    }

    let factor = compound(rate, nper);
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(IsaEngineError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    Ok(present_value * rate * factor / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // NPV at 10%: -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(1.0));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_empty_rejected() {
        assert!(npv(dec!(0.10), &[]).is_err());
    }

    #[test]
    fn test_npv_rate_below_minus_one_rejected() {
        assert!(npv(dec!(-1.5), &[dec!(-100), dec!(50)]).is_err());
    }

    #[test]
    fn test_irr_basic() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let outcome = irr(&cfs, dec!(0.10)).unwrap();
        assert!(outcome.converged);
        // IRR should be ~9.7%
        assert!((outcome.rate - dec!(0.097)).abs() < dec!(0.01));
    }

    #[test]
    fn test_irr_sign_check_against_npv() {
        let cfs = vec![dec!(-30000), dec!(8000), dec!(9000), dec!(10000), dec!(11000)];
        let outcome = irr(&cfs, dec!(0.10)).unwrap();
        assert!(outcome.converged);
        // At the IRR, NPV is ~zero
        let at_irr = npv(outcome.rate, &cfs).unwrap();
        assert!(at_irr.abs() < dec!(0.01), "npv at irr = {at_irr}");
    }

    #[test]
    fn test_irr_insufficient_data() {
        assert!(irr(&[dec!(-1000)], dec!(0.10)).is_err());
    }

    #[test]
    fn test_pmt_basic() {
        // 30k at 6%/12 monthly over 120 periods ≈ 333.06
        let payment = pmt(dec!(0.005), 120, dec!(30000)).unwrap();
        assert!((payment - dec!(333.06)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_zero_rate_straight_line() {
        let payment = pmt(Decimal::ZERO, 60, dec!(30000)).unwrap();
        assert_eq!(payment, dec!(500));
    }

    #[test]
    fn test_pmt_zero_periods_rejected() {
        assert!(pmt(dec!(0.005), 0, dec!(30000)).is_err());
    }

    #[test]
    fn test_compound_basic() {
        // 1.1^3 = 1.331
        assert_eq!(compound(dec!(0.10), 3), dec!(1.331));
    }
}
