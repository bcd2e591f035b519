// Errors that cross the engine boundary.
//
// Everything else (pool exhaustion, lineup reuse, stalled weighted draws)
// degrades to a smaller or repeated but still valid result.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("insufficient pool: {eligible} eligible players, need at least {required}")]
    InsufficientPool { eligible: usize, required: usize },

    #[error("no entries supplied for assignment")]
    NoEntries,

    #[error("no lineups supplied for assignment")]
    NoLineups,

    #[error("invalid setting `{field}`: {message}")]
    InvalidConfig { field: String, message: String },
}

impl EngineError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
