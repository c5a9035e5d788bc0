//! Automatic first retry, as a consumer-side timing policy.
//!
//! Watches the state machine and, when a freshly reported error has strategy
//! `retry`, `retry_count == 0` and no recovery in flight, waits a fixed delay
//! and calls `start_recovery` once. A state change during the delay restarts
//! the wait for the new state. The machine itself holds no timers.

use crate::core_types::{ErrorInfo, RecoveryState, RecoveryStrategy};
use crate::logging::{log_debug, log_warn};
use crate::recovery::{RecoveryOutcome, RecoveryStateMachine, RetryAction};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Background task driving automatic retries. Stops when dropped.
#[derive(Debug)]
pub struct AutoRetryObserver {
    handle: JoinHandle<()>,
}

impl AutoRetryObserver {
    /// Spawn the observer on the current tokio runtime.
    ///
    /// `action_for` supplies the action to retry for a given error; returning
    /// `None` lets the recovery succeed without running anything.
    pub fn spawn<F>(machine: Arc<RecoveryStateMachine>, delay: Duration, action_for: F) -> Self
    where
        F: Fn(&ErrorInfo) -> Option<RetryAction> + Send + Sync + 'static,
    {
        let mut changes = machine.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                let snapshot = changes.borrow_and_update().clone();
                if let Some(error) = eligible_error(&snapshot) {
                    log_debug!(
                        kind = %error.kind,
                        delay_ms = delay.as_millis() as u64,
                        "Scheduling automatic retry"
                    );

                    // Any state change before the delay elapses restarts the evaluation.
                    tokio::select! {
                        _ = sleep(delay) => {}
                        changed = changes.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            continue;
                        }
                    }

                    let current = machine.state();
                    if current.error_sequence == snapshot.error_sequence {
                        if let Some(error) = eligible_error(&current) {
                            match machine.start_recovery(action_for(error)).await {
                                Ok(RecoveryOutcome::Recovered) => {
                                    log_debug!("Automatic retry recovered");
                                }
                                Ok(outcome) => {
                                    log_debug!(outcome = ?outcome, "Automatic retry did not recover");
                                }
                                Err(err) => {
                                    log_warn!(error = %err, "Automatic retry could not start");
                                }
                            }
                        }
                    }
                }

                if changes.changed().await.is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for AutoRetryObserver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn eligible_error(state: &RecoveryState) -> Option<&ErrorInfo> {
    state.current_error.as_ref().filter(|error| {
        !state.is_recovering && error.strategy == RecoveryStrategy::Retry && error.retry_count == 0
    })
}
