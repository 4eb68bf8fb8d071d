pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "projection")]
pub mod projection;

#[cfg(feature = "isa")]
pub mod isa;

#[cfg(feature = "comparison")]
pub mod comparison;

pub use error::IsaEngineError;
pub use types::*;

/// Standard result type for all engine operations
pub type IsaEngineResult<T> = Result<T, IsaEngineError>;
