pub mod schedule;
pub mod solver;

pub use schedule::{
    build_schedule, CashFlowSchedule, FinancingParameters, RateDeterminant, ScheduleRow,
};
pub use solver::{compute_isa_schedule, solve_isa_terms, solve_repayment_rate, IsaTerms};
