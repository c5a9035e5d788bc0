//! Classified error values and the observable recovery state.

use crate::core_types::kinds::{ErrorKind, RecoveryStrategy, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Caller-supplied diagnostic payload (endpoint, field, ...).
pub type ErrorContext = BTreeMap<String, serde_json::Value>;

/// A classified failure.
///
/// Immutable once built. A retry produces a new `ErrorInfo` (see
/// [`reclassify`](crate::classifier::reclassify)) instead of mutating this one.
/// `strategy` and `user_friendly_message` are always the values the resolver
/// and composer produced for `(kind, retry_count, network_reachable)` at
/// construction time.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind} error: {message}")]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    /// Transport-specific code, e.g. an HTTP status text.
    pub code: Option<String>,
    /// Raw diagnostic message.
    pub message: String,
    pub context: Option<ErrorContext>,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub severity: Severity,
    pub retry_count: u32,
    pub max_retries: u32,
    pub strategy: RecoveryStrategy,
    pub user_friendly_message: String,
    /// Full trace in memory; truncated when persisted.
    pub technical_details: Option<String>,
}

impl ErrorInfo {
    /// Whether the retry ceiling has been reached.
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }
}

/// Coarse phase of the recovery state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryPhase {
    /// No active error.
    Idle,
    /// An error is active and awaiting recovery.
    Faulted,
    /// A recovery attempt is in flight.
    Recovering,
}

impl fmt::Display for RecoveryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryPhase::Idle => write!(f, "idle"),
            RecoveryPhase::Faulted => write!(f, "faulted"),
            RecoveryPhase::Recovering => write!(f, "recovering"),
        }
    }
}

/// Snapshot of what the UI should be reacting to right now.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryState {
    pub current_error: Option<ErrorInfo>,
    pub is_recovering: bool,
    /// Milliseconds since the Unix epoch of the last `start_recovery`.
    pub last_recovery_attempt: Option<i64>,
    pub fallback_activated: bool,
    /// Incremented on every report; distinguishes successive incidents.
    pub error_sequence: u64,
}

impl RecoveryState {
    pub fn phase(&self) -> RecoveryPhase {
        match (&self.current_error, self.is_recovering) {
            (None, _) => RecoveryPhase::Idle,
            (Some(_), false) => RecoveryPhase::Faulted,
            (Some(_), true) => RecoveryPhase::Recovering,
        }
    }
}
