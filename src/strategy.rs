//! Recovery strategy resolution and the UI actions derived from it.

use crate::core_types::{ErrorKind, RecoveryStrategy};
use serde::{Deserialize, Serialize};

/// Choose the recovery strategy for an error.
///
/// Thresholds are exact: the UI decides which buttons to render from the
/// returned strategy.
///
/// | kind | strategy |
/// |------|----------|
/// | network | unreachable: `FallbackOnly`; else `< 2`: `Retry`, then `RetryWithFallback` |
/// | font-loading | `< 1`: `Retry`, then `FallbackOnly` |
/// | storage | `< 2`: `Retry`, then `GuestMode` |
/// | authentication | `< 1`: `Retry`, then `GuestMode` |
/// | permissions | `Manual` |
/// | initialization | `< 2`: `Retry`, then `Reload` |
/// | critical | `Reload` |
/// | unknown | `< 1`: `Retry`, then `FallbackOnly` |
pub fn resolve_strategy(
    kind: ErrorKind,
    retry_count: u32,
    network_reachable: bool,
) -> RecoveryStrategy {
    match kind {
        ErrorKind::Network if !network_reachable => RecoveryStrategy::FallbackOnly,
        ErrorKind::Network if retry_count < 2 => RecoveryStrategy::Retry,
        ErrorKind::Network => RecoveryStrategy::RetryWithFallback,
        ErrorKind::FontLoading | ErrorKind::Unknown if retry_count < 1 => RecoveryStrategy::Retry,
        ErrorKind::FontLoading | ErrorKind::Unknown => RecoveryStrategy::FallbackOnly,
        ErrorKind::Storage if retry_count < 2 => RecoveryStrategy::Retry,
        ErrorKind::Storage => RecoveryStrategy::GuestMode,
        ErrorKind::Authentication if retry_count < 1 => RecoveryStrategy::Retry,
        ErrorKind::Authentication => RecoveryStrategy::GuestMode,
        ErrorKind::Permissions => RecoveryStrategy::Manual,
        ErrorKind::Initialization if retry_count < 2 => RecoveryStrategy::Retry,
        ErrorKind::Initialization => RecoveryStrategy::Reload,
        ErrorKind::Critical => RecoveryStrategy::Reload,
    }
}

/// What a recovery button does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryActionKind {
    /// Call `start_recovery` with the failed operation.
    Retry,
    /// Switch the feature to its degraded path.
    UseBasicMode,
    /// Continue without an authenticated session.
    ContinueAsGuest,
    /// Restart the process.
    RestartApp,
}

/// A button the UI renders for the active error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryAction {
    pub label: String,
    pub action: RecoveryActionKind,
    pub is_primary: bool,
    pub is_destructive: bool,
}

impl RecoveryAction {
    fn primary(label: &str, action: RecoveryActionKind) -> Self {
        Self {
            label: label.to_string(),
            action,
            is_primary: true,
            is_destructive: false,
        }
    }

    fn secondary(label: &str, action: RecoveryActionKind) -> Self {
        Self {
            is_primary: false,
            ..Self::primary(label, action)
        }
    }
}

/// Actions to surface for `strategy`. `Manual` has none; the UI shows
/// [`strategy_guidance`](crate::messages::strategy_guidance) instead.
pub fn recovery_actions(strategy: RecoveryStrategy) -> Vec<RecoveryAction> {
    match strategy {
        RecoveryStrategy::Retry => vec![RecoveryAction::primary("Retry", RecoveryActionKind::Retry)],
        RecoveryStrategy::RetryWithFallback => vec![
            RecoveryAction::primary("Retry", RecoveryActionKind::Retry),
            RecoveryAction::secondary("Use basic mode", RecoveryActionKind::UseBasicMode),
        ],
        RecoveryStrategy::FallbackOnly => vec![RecoveryAction::primary(
            "Use basic mode",
            RecoveryActionKind::UseBasicMode,
        )],
        RecoveryStrategy::GuestMode => vec![RecoveryAction::primary(
            "Continue as guest",
            RecoveryActionKind::ContinueAsGuest,
        )],
        RecoveryStrategy::Reload => vec![RecoveryAction {
            is_destructive: true,
            ..RecoveryAction::primary("Restart app", RecoveryActionKind::RestartApp)
        }],
        RecoveryStrategy::Manual => Vec::new(),
    }
}
