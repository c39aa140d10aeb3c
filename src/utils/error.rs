//! Error handling for the privilege engine
//!
//! This module defines all error types used throughout the engine.

use thiserror::Error;

/// Result type alias for the engine
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Main error type for the privilege engine
///
/// A denied request is NOT an error: denial is a normal outcome carried by
/// [`crate::authz::PrivilegeDecision`]. Errors are reserved for states in
/// which no authorization decision could be made at all.
#[derive(Error, Debug)]
pub enum AuthzError {
    /// No configuration snapshot has been published yet
    #[error("privilege engine is not initialized")]
    NotInitialized,

    /// Row/column filters computed for this call differ from the filters
    /// already attached earlier in the same request chain
    #[error("{kind} filters do not match previously attached filters")]
    FilterPropagationMismatch {
        /// Which filter map diverged ("row" or "column")
        kind: &'static str,
    },

    /// Tenant table rebuild did not finish within the configured deadline
    #[error("tenant table rebuild timed out after {waited_ms} ms")]
    RebuildTimeout {
        /// Time waited before giving up
        waited_ms: u64,
    },

    /// A rebuild worker failed; the previous snapshot stays authoritative
    #[error("snapshot rebuild failed: {0}")]
    RebuildFailed(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthzError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        AuthzError::Config(msg.into())
    }
}
