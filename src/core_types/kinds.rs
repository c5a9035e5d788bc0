//! Closed enumerations that drive every recovery decision.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of failure origin.
///
/// Every failure entering the engine is normalized into exactly one kind;
/// anything unrecognized is [`ErrorKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Network,
    FontLoading,
    Storage,
    Authentication,
    Permissions,
    Initialization,
    Critical,
    Unknown,
}

impl ErrorKind {
    /// All kinds, in declaration order.
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::Network,
        ErrorKind::FontLoading,
        ErrorKind::Storage,
        ErrorKind::Authentication,
        ErrorKind::Permissions,
        ErrorKind::Initialization,
        ErrorKind::Critical,
        ErrorKind::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::FontLoading => "font-loading",
            ErrorKind::Storage => "storage",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Permissions => "permissions",
            ErrorKind::Initialization => "initialization",
            ErrorKind::Critical => "critical",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI urgency tier. Always derived from [`ErrorKind`], never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Recommended remediation path for an error at a given retry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryStrategy {
    /// Run the failed operation again.
    Retry,
    /// Offer a retry, with a degraded path alongside it.
    RetryWithFallback,
    /// Retrying is unlikely to help; offer the degraded path only.
    FallbackOnly,
    /// The process needs a full restart.
    Reload,
    /// Continue without an authenticated session.
    GuestMode,
    /// The user must act outside the app (e.g. grant permissions).
    Manual,
}

impl RecoveryStrategy {
    /// Whether entering this strategy switches the UI into fallback mode.
    pub fn activates_fallback(&self) -> bool {
        matches!(
            self,
            RecoveryStrategy::FallbackOnly | RecoveryStrategy::RetryWithFallback
        )
    }

    /// Whether the UI should render a retry affordance.
    pub fn allows_retry(&self) -> bool {
        matches!(
            self,
            RecoveryStrategy::Retry | RecoveryStrategy::RetryWithFallback
        )
    }
}

impl fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryStrategy::Retry => write!(f, "retry"),
            RecoveryStrategy::RetryWithFallback => write!(f, "retry-with-fallback"),
            RecoveryStrategy::FallbackOnly => write!(f, "fallback-only"),
            RecoveryStrategy::Reload => write!(f, "reload"),
            RecoveryStrategy::GuestMode => write!(f, "guest-mode"),
            RecoveryStrategy::Manual => write!(f, "manual"),
        }
    }
}
