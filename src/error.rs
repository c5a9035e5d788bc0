//! Error types for the recovery engine itself.
//!
//! These are failures of the engine's own machinery (storage substrate,
//! serialization, configuration, misuse of the state machine), not the
//! application failures the engine classifies. Those are represented by
//! [`ErrorInfo`](crate::core_types::ErrorInfo).
//!
//! # Result Type
//!
//! ```rust
//! use recovery_engine::RecoveryResult;
//!
//! fn load_capacity() -> RecoveryResult<usize> {
//!     Ok(50)
//! }
//! ```

use crate::core_types::RecoveryPhase;
use crate::logging::{log_error, log_warn};
use thiserror::Error;

/// Convenient result type for engine operations.
pub type RecoveryResult<T> = std::result::Result<T, RecoveryError>;

/// Errors raised by the engine's own components.
///
/// Use the constructor methods, which log the error at the appropriate level:
///
/// ```rust
/// use recovery_engine::RecoveryError;
///
/// let err = RecoveryError::configuration_error("store capacity must be between 10 and 50");
/// let err = RecoveryError::timeout(30_000);
/// ```
///
/// | Variant | Surfaces to callers |
/// |---------|---------------------|
/// | `Storage` | No, swallowed by the error store |
/// | `Serialization` | No, swallowed by the error store |
/// | `Configuration` | Yes, at engine construction |
/// | `InvalidTransition` | Yes, from `start_recovery` |
/// | `Timeout` | No, classified into an `ErrorInfo` |
#[derive(Error, Debug)]
pub enum RecoveryError {
    /// The key-value storage substrate failed to read, write, or remove a key.
    #[error("Storage operation '{operation}' failed for key '{key}': {message}")]
    Storage {
        /// `get`, `set`, or `remove`.
        operation: &'static str,
        /// The storage key involved.
        key: String,
        /// Description of the failure.
        message: String,
    },

    /// Persisted state could not be encoded or decoded.
    #[error("Serialization failed: {message}")]
    Serialization {
        /// Details about the failure.
        message: String,
    },

    /// Engine configuration is invalid or incomplete.
    #[error("Recovery engine configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A state machine transition was requested from a phase that does not allow it.
    #[error("Cannot {operation} while {from}")]
    InvalidTransition {
        /// The phase the machine was in.
        from: RecoveryPhase,
        /// The transition that was requested.
        operation: &'static str,
    },

    /// A single attempt exceeded its time budget.
    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout {
        /// The per-attempt timeout that was exceeded.
        timeout_ms: u64,
    },
}

impl RecoveryError {
    pub fn storage(operation: &'static str, key: impl Into<String>, message: impl Into<String>) -> Self {
        let key = key.into();
        let message = message.into();
        log_warn!(
            error_type = "storage",
            operation = operation,
            key = %key,
            message = %message,
            "Error store substrate operation failed"
        );
        Self::Storage {
            operation,
            key,
            message,
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "serialization",
            message = %message,
            "Persisted error state could not be (de)serialized"
        );
        Self::Serialization { message }
    }

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Recovery engine configuration validation failed"
        );
        Self::Configuration { message }
    }

    pub fn invalid_transition(from: RecoveryPhase, operation: &'static str) -> Self {
        log_warn!(
            error_type = "invalid_transition",
            from = %from,
            operation = operation,
            "Rejected recovery state transition"
        );
        Self::InvalidTransition { from, operation }
    }

    /// Timeouts are expected during retries, so this does not log on its own.
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }
}

impl From<serde_json::Error> for RecoveryError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
