pub mod distribution;
pub mod error;
pub mod roi;
pub mod types;
pub mod yield_model;

pub use error::PropshareError;
pub use types::*;

/// Standard result type for all engine operations
pub type PropshareResult<T> = Result<T, PropshareError>;
