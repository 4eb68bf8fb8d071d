use isa_engine_core::projection::{self, ProjectionInput};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Income projection tests
// ===========================================================================

fn graduate_input() -> ProjectionInput {
    // Two study years, then eight working years of compounding income
    ProjectionInput {
        base_salary: dec!(70_000),
        growth_rate: dec!(0.045),
        years: 10,
        year_of_first_income: 2,
        adjustment_factors: vec![dec!(1.05)],
    }
}

#[test]
fn test_projection_length_matches_term() {
    let series = projection::project(&graduate_input()).unwrap().result;
    assert_eq!(series.len(), 10);
}

#[test]
fn test_study_years_then_growth() {
    let series = projection::project(&graduate_input()).unwrap().result;

    assert_eq!(series.annual[0], Decimal::ZERO);
    assert_eq!(series.annual[1], Decimal::ZERO);
    // 70_000 * 1.05 = 73_500 in the first working year
    assert_eq!(series.annual[2], dec!(73_500));

    // Monotonic growth across the working years
    for pair in series.annual[2..].windows(2) {
        assert!(pair[1] > pair[0]);
    }
}

#[test]
fn test_all_incomes_on_hundred_boundaries() {
    let series = projection::project(&graduate_input()).unwrap().result;
    for income in series.iter() {
        assert_eq!(income % dec!(100), Decimal::ZERO);
    }
}

#[test]
fn test_degree_school_projection_end_to_end() {
    let degree = projection::degree_program("computer_science").unwrap();
    let school = projection::school("private_elite").unwrap();

    let series = projection::project_for_degree(degree, school, 8, 0, &[]).unwrap().result;

    // 85_000 * 1.15 = 97_750 -> rounds to 97_800
    assert_eq!(series.annual[0], dec!(97_800));
    assert_eq!(series.len(), 8);
}

#[test]
fn test_unknown_reference_ids_are_none() {
    assert!(projection::degree_program("underwater_basket_weaving").is_none());
    assert!(projection::school("unknown_school").is_none());
}
