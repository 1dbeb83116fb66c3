//! Error types for the harness runner.
//!
//! Verification outcomes (failed assertions, pruned paths) are not errors:
//! they are recorded in a [`crate::Report`]. The variants here describe
//! misuse of the library itself.

/// Result type for runner operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An environment override could not be parsed
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidConfig {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// A replayed harness asked for a different value than the one recorded
    #[error("replay diverged at value #{index}: recorded {expected}, harness requested {found}")]
    ReplayDivergence {
        index: usize,
        expected: String,
        found: String,
    },

    /// A replayed harness asked for more values than the model holds
    #[error("replay exhausted at value #{index}: no recorded value for {name:?}")]
    ReplayExhausted { index: usize, name: String },

    /// A replayed harness finished without asking for every recorded value
    #[error("replay ended at value #{index}: recorded value {name:?} was never requested")]
    ReplayUnconsumed { index: usize, name: String },

    /// Report or model (de)serialization failed
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
