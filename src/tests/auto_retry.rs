// Unit Tests for the Auto-Retry Observer
//
// UNIT UNDER TEST: AutoRetryObserver
//
// BUSINESS RESPONSIBILITY:
//   - Retries a freshly reported `retry` error once, after a fixed delay
//   - Leaves every other strategy to the user
//   - Never fires for an error that was replaced or cleared during the delay
//
// TEST COVERAGE:
//   - Timing of the automatic retry (paused clock)
//   - Ineligible strategies and escalated errors
//   - Clear and re-report during the delay
//   - Shutdown on drop

use crate::auto_retry::AutoRetryObserver;
use crate::core_types::{ErrorInfo, ErrorKind, RecoveryPhase};
use crate::network::NetworkStatus;
use crate::recovery::{retry_action, RecoveryStateMachine, RetryAction};
use crate::tests::helpers::create_test_machine;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const DELAY: Duration = Duration::from_millis(2000);

/// Observer whose retry action counts invocations and succeeds or fails as told
fn spawn_counting_observer(
    machine: &Arc<RecoveryStateMachine>,
    succeed: bool,
) -> (AutoRetryObserver, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let observer = AutoRetryObserver::spawn(
        Arc::clone(machine),
        DELAY,
        move |_: &ErrorInfo| -> Option<RetryAction> {
            let counter = Arc::clone(&counter);
            Some(retry_action(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if succeed {
                    Ok(())
                } else {
                    Err(anyhow::anyhow!("still failing"))
                }
            }))
        },
    );
    (observer, calls)
}

#[cfg(test)]
mod timing_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_retry_fires_once_after_delay() {
        // Arrange
        let (_, machine) = create_test_machine(NetworkStatus::ONLINE);
        let (_observer, calls) = spawn_counting_observer(&machine, true);

        // Act
        machine
            .report(ErrorKind::Network, anyhow::anyhow!("server 503"), None)
            .await;
        sleep(DELAY - Duration::from_millis(1)).await;
        let calls_before_delay = calls.load(Ordering::SeqCst);
        sleep(Duration::from_millis(2)).await;

        // Assert
        assert_eq!(calls_before_delay, 0, "Should not fire before the delay");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(machine.state().phase(), RecoveryPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_auto_retry_is_not_repeated() {
        // Test verifies only retry_count == 0 errors are retried automatically

        // Arrange
        let (_, machine) = create_test_machine(NetworkStatus::ONLINE);
        let (_observer, calls) = spawn_counting_observer(&machine, false);

        // Act
        machine
            .report(ErrorKind::Storage, anyhow::anyhow!("write failed"), None)
            .await;
        sleep(DELAY * 5).await;

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let current = machine.state().current_error.expect("still faulted");
        assert_eq!(current.retry_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_report_restarts_delay() {
        // Arrange
        let (_, machine) = create_test_machine(NetworkStatus::ONLINE);
        let (_observer, calls) = spawn_counting_observer(&machine, true);
        machine
            .report(ErrorKind::Network, anyhow::anyhow!("first"), None)
            .await;
        sleep(Duration::from_millis(1000)).await;

        // Act
        machine
            .report(ErrorKind::Network, anyhow::anyhow!("second"), None)
            .await;
        sleep(Duration::from_millis(1500)).await;
        let calls_at_original_deadline = calls.load(Ordering::SeqCst);
        sleep(Duration::from_millis(600)).await;

        // Assert
        assert_eq!(calls_at_original_deadline, 0, "First error's timer was replaced");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

#[cfg(test)]
mod eligibility_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_non_retry_strategy_is_left_alone() {
        // Arrange
        let (_, machine) = create_test_machine(NetworkStatus::ONLINE);
        let (_observer, calls) = spawn_counting_observer(&machine, true);

        // Act
        machine
            .report(ErrorKind::Permissions, anyhow::anyhow!("camera denied"), None)
            .await;
        sleep(DELAY * 3).await;

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(machine.state().phase(), RecoveryPhase::Faulted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_network_error_is_not_auto_retried() {
        // Arrange
        let (_, machine) = create_test_machine(NetworkStatus::OFFLINE);
        let (_observer, calls) = spawn_counting_observer(&machine, true);

        // Act
        machine
            .report(ErrorKind::Network, anyhow::anyhow!("no route"), None)
            .await;
        sleep(DELAY * 3).await;

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 0, "Fallback-only errors wait for the user");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_during_delay_cancels_retry() {
        // Arrange
        let (_, machine) = create_test_machine(NetworkStatus::ONLINE);
        let (_observer, calls) = spawn_counting_observer(&machine, true);
        machine
            .report(ErrorKind::Unknown, anyhow::anyhow!("hiccup"), None)
            .await;
        sleep(Duration::from_millis(500)).await;

        // Act
        machine.clear().await;
        sleep(DELAY * 2).await;

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_observer_stops_retrying() {
        // Arrange
        let (_, machine) = create_test_machine(NetworkStatus::ONLINE);
        let (observer, calls) = spawn_counting_observer(&machine, true);
        assert!(observer.is_running());

        // Act
        drop(observer);
        machine
            .report(ErrorKind::Network, anyhow::anyhow!("server 500"), None)
            .await;
        sleep(DELAY * 2).await;

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(machine.state().phase(), RecoveryPhase::Faulted);
    }
}
