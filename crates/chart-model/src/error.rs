use thiserror::Error;

use crate::Time;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("Invalid key count: {got} (expected 1..={max})")]
    InvalidKeyCount { got: usize, max: usize },

    #[error("Invalid bucket width: {0} ms (must be positive)")]
    InvalidBucketWidth(Time),

    #[error("Invalid density window: {0} ms (must be positive)")]
    InvalidDensityWindow(Time),
}
