use thiserror::Error;

use crate::types::MinorUnits;

#[derive(Debug, Error)]
pub enum PropshareError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown property category: {category_id}")]
    UnknownCategory { category_id: String },

    #[error("Nothing to distribute: {0}")]
    NothingToDistribute(String),

    #[error("Conservation failure: allocated {actual} of {expected} minor units")]
    ConservationFailure {
        expected: MinorUnits,
        actual: MinorUnits,
    },
}
