//! Recovery state machine.
//!
//! Tracks the single active error the UI is reacting to:
//!
//! ```text
//!            report                 start_recovery
//!   Idle ───────────────▶ Faulted ───────────────▶ Recovering
//!    ▲                     ▲  │                        │
//!    │        report       └──┘   action failed        │
//!    │                     ◀───────────────────────────┤
//!    │             action succeeded                    │
//!    └─────────────────────────────────────────────────┘
//!                 clear (from any phase)
//! ```
//!
//! Transitions are serialized by one mutex; every change is published on a
//! `watch` channel for observers. Timers (auto-retry) live outside the machine,
//! see [`AutoRetryObserver`](crate::auto_retry::AutoRetryObserver).

use crate::classifier::{classify, reclassify};
use crate::core_types::{now_millis, ErrorContext, ErrorInfo, ErrorKind, RecoveryState};
use crate::error::{RecoveryError, RecoveryResult};
use crate::logging::{log_debug, log_info, log_warn};
use crate::network::NetworkStatusProvider;
use crate::store::ErrorStore;
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Deferred action run by [`RecoveryStateMachine::start_recovery`].
pub type RetryAction = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// Box an async closure as a [`RetryAction`].
pub fn retry_action<F, Fut>(action: F) -> RetryAction
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Box::new(move || Box::pin(action()))
}

/// Result of a recovery attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryOutcome {
    /// The action succeeded; the machine is idle.
    Recovered,
    /// The action failed; the superseding error is now active.
    StillFaulted(ErrorInfo),
    /// A `report` or `clear` landed while the action ran; its result was dropped.
    Superseded,
}

pub struct RecoveryStateMachine {
    state: Mutex<RecoveryState>,
    observers: watch::Sender<RecoveryState>,
    store: Arc<ErrorStore>,
    network: Arc<dyn NetworkStatusProvider>,
    max_retries: u32,
}

impl std::fmt::Debug for RecoveryStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryStateMachine")
            .field("state", &*self.observers.borrow())
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl RecoveryStateMachine {
    pub fn new(
        store: Arc<ErrorStore>,
        network: Arc<dyn NetworkStatusProvider>,
        max_retries: u32,
    ) -> Self {
        let (observers, _) = watch::channel(RecoveryState::default());
        Self {
            state: Mutex::new(RecoveryState::default()),
            observers,
            store,
            network,
            max_retries,
        }
    }

    /// Latest published state.
    pub fn state(&self) -> RecoveryState {
        self.observers.borrow().clone()
    }

    /// Receive every published state change.
    pub fn subscribe(&self) -> watch::Receiver<RecoveryState> {
        self.observers.subscribe()
    }

    /// Classify `error` as the new active error, replacing any previous one.
    pub async fn report(
        &self,
        kind: ErrorKind,
        error: anyhow::Error,
        context: Option<ErrorContext>,
    ) -> ErrorInfo {
        let info = classify(
            kind,
            &error,
            context,
            0,
            self.max_retries,
            self.network.is_reachable(),
        );

        {
            let mut state = self.state.lock().await;
            let replaced = state.current_error.is_some();
            state.current_error = Some(info.clone());
            state.is_recovering = false;
            state.fallback_activated = false;
            state.error_sequence += 1;
            self.publish(&state);

            log_info!(
                kind = %kind,
                severity = %info.severity,
                strategy = %info.strategy,
                replaced_previous = replaced,
                message = %info.message,
                "Error reported"
            );
        }

        self.store.record(&info).await;
        info
    }

    /// Make an already classified and persisted error the active one.
    pub async fn activate(&self, info: ErrorInfo) {
        let mut state = self.state.lock().await;
        log_debug!(
            kind = %info.kind,
            retry_count = info.retry_count,
            strategy = %info.strategy,
            "Activating classified error"
        );
        state.fallback_activated = info.strategy.activates_fallback();
        state.current_error = Some(info);
        state.is_recovering = false;
        state.error_sequence += 1;
        self.publish(&state);
    }

    /// Attempt to recover from the active error.
    ///
    /// With no action the recovery counts as successful. On failure the active
    /// error is superseded with `retry_count + 1` (capped at `max_retries`) and
    /// a recomputed strategy and message, and the new value is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError::InvalidTransition`] unless the machine is faulted.
    pub async fn start_recovery(
        &self,
        retry_action: Option<RetryAction>,
    ) -> RecoveryResult<RecoveryOutcome> {
        let (sequence, error) = {
            let mut state = self.state.lock().await;
            let phase = state.phase();
            let error = match (&state.current_error, state.is_recovering) {
                (Some(error), false) => error.clone(),
                _ => return Err(RecoveryError::invalid_transition(phase, "start recovery")),
            };
            state.is_recovering = true;
            state.last_recovery_attempt = Some(now_millis());
            self.publish(&state);
            (state.error_sequence, error)
        };

        log_debug!(
            kind = %error.kind,
            retry_count = error.retry_count,
            has_action = retry_action.is_some(),
            "Starting recovery"
        );

        let result = match retry_action {
            Some(action) => action().await,
            None => Ok(()),
        };

        let mut state = self.state.lock().await;
        if state.error_sequence != sequence || !state.is_recovering {
            log_debug!(
                kind = %error.kind,
                "Recovery result discarded, state changed while recovering"
            );
            return Ok(RecoveryOutcome::Superseded);
        }

        match result {
            Ok(()) => {
                state.current_error = None;
                state.is_recovering = false;
                state.fallback_activated = false;
                self.publish(&state);
                log_info!(kind = %error.kind, "Recovered from error");
                Ok(RecoveryOutcome::Recovered)
            }
            Err(action_error) => {
                let next = reclassify(
                    &error,
                    error.retry_count.saturating_add(1),
                    self.network.is_reachable(),
                );
                state.current_error = Some(next.clone());
                state.is_recovering = false;
                state.fallback_activated = next.strategy.activates_fallback();
                self.publish(&state);
                drop(state);

                log_warn!(
                    kind = %next.kind,
                    retry_count = next.retry_count,
                    strategy = %next.strategy,
                    error = %action_error,
                    "Recovery attempt failed"
                );

                self.store.record(&next).await;
                Ok(RecoveryOutcome::StillFaulted(next))
            }
        }
    }

    /// Return to the initial idle state from any phase. Persisted history is
    /// untouched; only `error_sequence` keeps counting.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.current_error = None;
        state.is_recovering = false;
        state.last_recovery_attempt = None;
        state.fallback_activated = false;
        // A recovery still in flight must see that its error is gone.
        state.error_sequence += 1;
        self.publish(&state);
        log_debug!("Active error cleared");
    }

    fn publish(&self, state: &RecoveryState) {
        self.observers.send_replace(state.clone());
    }
}
