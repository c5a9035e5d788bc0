// Unit Tests for Recovery Strategy Resolution
//
// UNIT UNDER TEST: resolve_strategy, recovery_actions
//
// BUSINESS RESPONSIBILITY:
//   - Chooses exactly one recovery strategy per (kind, retry count, reachability)
//   - Keeps thresholds exact because UI affordances are keyed off the result
//   - Derives the buttons the UI renders for each strategy
//
// TEST COVERAGE:
//   - Full decision table, including threshold boundaries
//   - Determinism across repeated calls
//   - Action sets per strategy (primary, destructive, manual guidance)

use crate::core_types::{ErrorKind, RecoveryStrategy};
use crate::messages::strategy_guidance;
use crate::strategy::{recovery_actions, resolve_strategy, RecoveryActionKind};

#[cfg(test)]
mod strategy_resolution_tests {
    use super::*;

    #[test]
    fn test_network_strategy_depends_on_reachability() {
        // Test verifies unreachable networks never offer a plain retry

        // Arrange & Act & Assert
        for retry_count in 0..5 {
            assert_eq!(
                resolve_strategy(ErrorKind::Network, retry_count, false),
                RecoveryStrategy::FallbackOnly,
                "offline network errors should fall back at retry {retry_count}"
            );
        }
        assert_eq!(
            resolve_strategy(ErrorKind::Network, 0, true),
            RecoveryStrategy::Retry
        );
        assert_eq!(
            resolve_strategy(ErrorKind::Network, 1, true),
            RecoveryStrategy::Retry
        );
        assert_eq!(
            resolve_strategy(ErrorKind::Network, 2, true),
            RecoveryStrategy::RetryWithFallback
        );
        assert_eq!(
            resolve_strategy(ErrorKind::Network, 7, true),
            RecoveryStrategy::RetryWithFallback
        );
    }

    #[test]
    fn test_decision_table_thresholds() {
        // Test verifies every kind switches strategy at exactly the documented retry count

        // Arrange
        let table = [
            (ErrorKind::FontLoading, 1, RecoveryStrategy::FallbackOnly),
            (ErrorKind::Storage, 2, RecoveryStrategy::GuestMode),
            (ErrorKind::Authentication, 1, RecoveryStrategy::GuestMode),
            (ErrorKind::Initialization, 2, RecoveryStrategy::Reload),
            (ErrorKind::Unknown, 1, RecoveryStrategy::FallbackOnly),
        ];

        for (kind, threshold, after) in table {
            for reachable in [true, false] {
                // Act
                let before_threshold = resolve_strategy(kind, threshold - 1, reachable);
                let at_threshold = resolve_strategy(kind, threshold, reachable);
                let well_after = resolve_strategy(kind, threshold + 3, reachable);

                // Assert
                assert_eq!(before_threshold, RecoveryStrategy::Retry, "{kind} before threshold");
                assert_eq!(at_threshold, after, "{kind} at threshold");
                assert_eq!(well_after, after, "{kind} after threshold");
            }
        }
    }

    #[test]
    fn test_fixed_strategies_ignore_retry_count() {
        // Test verifies permissions always need manual action and critical always reloads

        for retry_count in 0..6 {
            for reachable in [true, false] {
                assert_eq!(
                    resolve_strategy(ErrorKind::Permissions, retry_count, reachable),
                    RecoveryStrategy::Manual
                );
                assert_eq!(
                    resolve_strategy(ErrorKind::Critical, retry_count, reachable),
                    RecoveryStrategy::Reload
                );
            }
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        // Test verifies resolve_strategy carries no hidden state

        for kind in ErrorKind::ALL {
            for retry_count in 0..4 {
                for reachable in [true, false] {
                    assert_eq!(
                        resolve_strategy(kind, retry_count, reachable),
                        resolve_strategy(kind, retry_count, reachable)
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod recovery_action_tests {
    use super::*;

    #[test]
    fn test_retry_strategies_render_primary_retry_button() {
        // Arrange & Act
        let retry = recovery_actions(RecoveryStrategy::Retry);
        let with_fallback = recovery_actions(RecoveryStrategy::RetryWithFallback);

        // Assert
        assert_eq!(retry.len(), 1);
        assert_eq!(retry[0].action, RecoveryActionKind::Retry);
        assert!(retry[0].is_primary);

        assert_eq!(with_fallback.len(), 2);
        assert_eq!(with_fallback[0].action, RecoveryActionKind::Retry);
        assert!(with_fallback[0].is_primary);
        assert_eq!(with_fallback[1].action, RecoveryActionKind::UseBasicMode);
        assert!(!with_fallback[1].is_primary);
    }

    #[test]
    fn test_guest_mode_offers_guest_continuation() {
        // Act
        let actions = recovery_actions(RecoveryStrategy::GuestMode);

        // Assert
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].label, "Continue as guest");
        assert_eq!(actions[0].action, RecoveryActionKind::ContinueAsGuest);
    }

    #[test]
    fn test_reload_action_is_destructive() {
        // Act
        let actions = recovery_actions(RecoveryStrategy::Reload);

        // Assert
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, RecoveryActionKind::RestartApp);
        assert!(actions[0].is_destructive);
    }

    #[test]
    fn test_manual_strategy_has_guidance_but_no_buttons() {
        // Test verifies manual recovery is static instruction only

        // Act
        let actions = recovery_actions(RecoveryStrategy::Manual);
        let guidance = strategy_guidance(RecoveryStrategy::Manual);

        // Assert
        assert!(actions.is_empty(), "Manual strategy must not render buttons");
        assert!(guidance.is_some_and(|text| text.contains("permissions")));
        assert!(strategy_guidance(RecoveryStrategy::Retry).is_none());
    }
}
