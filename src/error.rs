use thiserror::Error;

/// Errors raised while turning raw flash records into events
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlashError {
    /// Start time could not be parsed with the configured format
    #[error("record {index}: invalid flash start time {value:?}")]
    InvalidStartTime { index: usize, value: String },

    /// Observe time is not a finite number
    #[error("record {index}: invalid flash observe time {value:?}")]
    InvalidObserveTime { index: usize, value: String },

    /// Latitude or longitude is missing or not finite
    #[error("record {index}: invalid {field}")]
    InvalidCoordinate { index: usize, field: &'static str },
}

impl FlashError {
    /// Index of the offending record in the provider's list
    pub fn index(&self) -> usize {
        match self {
            FlashError::InvalidStartTime { index, .. }
            | FlashError::InvalidObserveTime { index, .. }
            | FlashError::InvalidCoordinate { index, .. } => *index,
        }
    }
}
