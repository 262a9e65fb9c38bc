use thiserror::Error;

/// Raised whenever a reading source cannot deliver a complete set of readings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("reading source unavailable: {reason}")]
pub(crate) struct ReadingSourceUnavailable {
    pub(crate) reason: String,
}

impl ReadingSourceUnavailable {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
