use serde_json::Value;

use isa_engine_core::projection::{degree_programs, schools};

pub fn run_degrees() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(degree_programs())?)
}

pub fn run_schools() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(schools())?)
}
