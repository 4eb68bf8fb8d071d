use rust_decimal_macros::dec;
use serde::Serialize;

use crate::types::{Money, Multiple, Rate};

/// A degree program with its observed starting salary and wage growth.
/// Immutable reference data; never mutated or persisted by the engine.
#[derive(Debug, Clone, Serialize)]
pub struct DegreeProgram {
    pub id: &'static str,
    pub name: &'static str,
    pub starting_salary: Money,
    pub growth_rate: Rate,
}

/// A school with its employment multiplier applied to a degree's base salary.
#[derive(Debug, Clone, Serialize)]
pub struct School {
    pub id: &'static str,
    pub name: &'static str,
    pub employment_multiplier: Multiple,
}

const DEGREE_PROGRAMS: &[DegreeProgram] = &[
    DegreeProgram {
        id: "computer_science",
        name: "Computer Science",
        starting_salary: dec!(85_000),
        growth_rate: dec!(0.050),
    },
    DegreeProgram {
        id: "data_science",
        name: "Data Science",
        starting_salary: dec!(90_000),
        growth_rate: dec!(0.055),
    },
    DegreeProgram {
        id: "mechanical_engineering",
        name: "Mechanical Engineering",
        starting_salary: dec!(72_000),
        growth_rate: dec!(0.040),
    },
    DegreeProgram {
        id: "nursing",
        name: "Nursing",
        starting_salary: dec!(65_000),
        growth_rate: dec!(0.035),
    },
    DegreeProgram {
        id: "business_administration",
        name: "Business Administration",
        starting_salary: dec!(55_000),
        growth_rate: dec!(0.040),
    },
    DegreeProgram {
        id: "education",
        name: "Education",
        starting_salary: dec!(42_000),
        growth_rate: dec!(0.025),
    },
];

const SCHOOLS: &[School] = &[
    School {
        id: "state_flagship",
        name: "State Flagship University",
        employment_multiplier: dec!(1.00),
    },
    School {
        id: "private_elite",
        name: "Private Elite University",
        employment_multiplier: dec!(1.15),
    },
    School {
        id: "regional_public",
        name: "Regional Public University",
        employment_multiplier: dec!(0.92),
    },
    School {
        id: "technical_college",
        name: "Technical College",
        employment_multiplier: dec!(0.95),
    },
    School {
        id: "online_program",
        name: "Online Program",
        employment_multiplier: dec!(0.85),
    },
];

/// Full degree-program catalog.
pub fn degree_programs() -> &'static [DegreeProgram] {
    DEGREE_PROGRAMS
}

/// Full school catalog.
pub fn schools() -> &'static [School] {
    SCHOOLS
}

/// Look up a degree program by id.
pub fn degree_program(id: &str) -> Option<&'static DegreeProgram> {
    DEGREE_PROGRAMS.iter().find(|d| d.id == id)
}

/// Look up a school by id.
pub fn school(id: &str) -> Option<&'static School> {
    SCHOOLS.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_degree_lookup_found() {
        let cs = degree_program("computer_science").unwrap();
        assert_eq!(cs.name, "Computer Science");
        assert!(cs.starting_salary > Decimal::ZERO);
    }

    #[test]
    fn test_degree_lookup_missing() {
        assert!(degree_program("astrology").is_none());
    }

    #[test]
    fn test_school_lookup_found() {
        let s = school("private_elite").unwrap();
        assert_eq!(s.employment_multiplier, dec!(1.15));
    }

    #[test]
    fn test_catalogs_non_empty() {
        assert!(!degree_programs().is_empty());
        assert!(!schools().is_empty());
    }

    #[test]
    fn test_all_multipliers_positive() {
        for s in schools() {
            assert!(s.employment_multiplier > Decimal::ZERO, "school {}", s.id);
        }
    }
}
