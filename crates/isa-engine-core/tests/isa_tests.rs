use isa_engine_core::isa::{
    build_schedule, compute_isa_schedule, solve_isa_terms, FinancingParameters, RateDeterminant,
};
use isa_engine_core::projection::{self, IncomeSeries, ProjectionInput};
use isa_engine_core::time_value::{irr, npv};
use isa_engine_core::types::Money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Schedule invariants
// ===========================================================================

fn projected_series() -> IncomeSeries {
    projection::project(&ProjectionInput {
        base_salary: dec!(65_000),
        growth_rate: dec!(0.04),
        years: 10,
        year_of_first_income: 0,
        adjustment_factors: vec![],
    })
    .unwrap()
    .result
}

fn standard_params() -> FinancingParameters {
    FinancingParameters {
        funding_amount: dec!(30_000),
        term_years: 10,
        income_floor: dec!(25_000),
        cap_multiple: dec!(2.0),
        baseline_target_rate: dec!(0.08),
        determinants: vec![],
    }
}

#[test]
fn test_cap_invariant_across_rates() {
    let series = projected_series();
    let tolerance = dec!(0.000001);

    for rate in [dec!(0.01), dec!(0.06), dec!(0.12), dec!(0.25), dec!(0.50)] {
        let schedule =
            build_schedule(&series, rate, dec!(25_000), dec!(30_000), dec!(2.0)).unwrap();
        let total: Money = schedule.rows.iter().map(|r| r.payment).sum();
        assert!(
            total <= dec!(60_000) + tolerance,
            "rate {rate}: total {total} exceeds cap"
        );
    }
}

#[test]
fn test_truncation_invariant_after_cap() {
    let series = projected_series();
    let schedule = build_schedule(&series, dec!(0.50), dec!(0), dec!(10_000), dec!(1.5)).unwrap();

    assert!(schedule.cap_reached_early);
    let cap_year = schedule.cap_reached_year.unwrap() as usize;
    for row in &schedule.rows[cap_year..] {
        assert_eq!(row.payment, Decimal::ZERO);
        assert_eq!(row.remaining_balance, Decimal::ZERO);
    }
}

#[test]
fn test_high_income_late_years_stay_zero_after_cap() {
    // Income keeps climbing after the cap is met; payments must not resume
    let series = IncomeSeries::new(vec![
        dec!(100_000),
        dec!(120_000),
        dec!(140_000),
        dec!(160_000),
        dec!(180_000),
    ]);
    let schedule = build_schedule(&series, dec!(0.30), dec!(0), dec!(30_000), dec!(2.0)).unwrap();

    assert_eq!(schedule.total_paid, dec!(60_000));
    assert!(schedule.cap_reached_early);
    let zero_rows: Vec<_> = schedule.rows.iter().filter(|r| r.payment.is_zero()).collect();
    assert!(!zero_rows.is_empty());
    for row in zero_rows {
        assert!(row.income > dec!(100_000));
    }
}

// ===========================================================================
// Pricing pipeline
// ===========================================================================

#[test]
fn test_full_pipeline_projection_to_terms() {
    let series = projected_series();
    let output = solve_isa_terms(&series, &standard_params()).unwrap();
    let terms = &output.result;

    assert!(terms.converged);
    assert!(terms.repayment_rate > Decimal::ZERO);
    assert!(terms.repayment_rate < dec!(0.25), "rate = {}", terms.repayment_rate);
    // Converged pricing means the implied rate matches the 8% target
    assert!((terms.effective_annual_rate - dec!(0.08)).abs() < dec!(0.001));
}

#[test]
fn test_schedule_api_matches_solved_terms() {
    let series = projected_series();
    let params = standard_params();

    let terms = solve_isa_terms(&series, &params).unwrap().result;
    let schedule = compute_isa_schedule(&series, &params).unwrap().result;

    assert_eq!(schedule.total_paid, terms.total_paid);
    assert_eq!(schedule.rows.len(), 10);

    // Rebuilding with the solved rate reproduces the schedule rows
    let rebuilt = build_schedule(
        &series,
        terms.repayment_rate,
        params.income_floor,
        params.funding_amount,
        params.cap_multiple,
    )
    .unwrap();
    for (a, b) in schedule.rows.iter().zip(rebuilt.rows.iter()) {
        assert_eq!(a.payment, b.payment);
    }
}

#[test]
fn test_solver_round_trip_through_irr() {
    let series = projected_series();
    let known_rate = dec!(0.07);

    let schedule = build_schedule(&series, known_rate, dec!(25_000), dec!(30_000), dec!(3.0)).unwrap();
    let mut flows = vec![dec!(-30_000)];
    flows.extend(schedule.rows.iter().map(|r| r.payment));
    let implied = irr(&flows, dec!(0.08)).unwrap();
    assert!(implied.converged);

    let mut params = standard_params();
    params.cap_multiple = dec!(3.0);
    params.baseline_target_rate = implied.rate;
    let recovered = solve_isa_terms(&series, &params).unwrap().result;

    assert!((recovered.repayment_rate - known_rate).abs() < dec!(0.001));
}

#[test]
fn test_solved_schedule_npv_is_zero_at_target() {
    let series = projected_series();
    let params = standard_params();
    let schedule = compute_isa_schedule(&series, &params).unwrap().result;

    let mut flows = vec![-params.funding_amount];
    flows.extend(schedule.rows.iter().map(|r| r.payment));
    let residual = npv(params.adjusted_target_rate(), &flows).unwrap();
    assert!(residual.abs() < dec!(0.01), "residual = {residual}");
}

#[test]
fn test_determinants_flow_through_pricing() {
    let series = projected_series();

    let mut params = standard_params();
    params.determinants = vec![
        RateDeterminant {
            name: "gpa".into(),
            rate_delta: dec!(-0.005),
            applied: true,
        },
        RateDeterminant {
            name: "internship".into(),
            rate_delta: dec!(-0.005),
            applied: true,
        },
    ];

    let discounted = solve_isa_terms(&series, &params).unwrap().result;
    let baseline = solve_isa_terms(&series, &standard_params()).unwrap().result;

    assert!(discounted.repayment_rate < baseline.repayment_rate);
    assert!((discounted.effective_annual_rate - dec!(0.07)).abs() < dec!(0.001));
}

#[test]
fn test_unreachable_target_is_best_effort_not_error() {
    let series = projected_series();
    let mut params = standard_params();
    params.cap_multiple = dec!(1.05);
    params.baseline_target_rate = dec!(0.20);

    let output = solve_isa_terms(&series, &params).unwrap();
    assert!(!output.result.converged);
    assert!(!output.warnings.is_empty());
    // Still a displayable, in-range number
    assert!(output.result.repayment_rate > Decimal::ZERO);
    assert!(output.result.repayment_rate <= Decimal::ONE);
}
