pub mod income;
pub mod reference;

pub use income::{project, project_for_degree, IncomeSeries, ProjectionInput};
pub use reference::{degree_program, degree_programs, school, schools, DegreeProgram, School};
