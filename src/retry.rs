//! Retry logic with exponential backoff, jitter, and per-attempt timeouts
//!
//! Runs an arbitrary async operation up to `max_retries + 1` times:
//! - Exponential backoff: 1s, 2s, 4s, 8s, capped at 10s by default
//! - Random jitter in `[0, max_jitter)` added to every backoff sleep
//! - Each attempt raced against `timeout`; a timeout counts as a failure
//! - Only the final failure is classified and persisted

use crate::classifier::classify;
use crate::core_types::{ErrorContext, ErrorInfo, ErrorKind};
use crate::error::RecoveryError;
use crate::logging::{log_debug, log_error};
use crate::network::NetworkStatusProvider;
use crate::store::ErrorStore;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Retry policy for a wrapped operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total tries is `max_retries + 1`
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound on the backoff delay, before jitter
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Time budget for each individual attempt
    pub timeout: Duration,
    /// Exclusive upper bound of the random jitter added to each delay
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_multiplier: 2.0,
            timeout: Duration::from_millis(30_000),
            max_jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before `attempt` (1-based retry index), without jitter.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay_ms =
            self.base_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped_ms as u64)
    }

    /// Backoff delay plus random jitter, so concurrent callers do not retry in lockstep.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(fastrand::u64(0..jitter_ms))
        };
        self.backoff_delay(attempt) + jitter
    }
}

/// Executes operations under a [`RetryPolicy`], persisting only terminal failures.
pub struct RetryExecutor {
    pub(crate) policy: RetryPolicy,
    store: Arc<ErrorStore>,
    network: Arc<dyn NetworkStatusProvider>,
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetryExecutor {
    pub fn new(
        policy: RetryPolicy,
        store: Arc<ErrorStore>,
        network: Arc<dyn NetworkStatusProvider>,
    ) -> Self {
        Self {
            policy,
            store,
            network,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` with retries.
    ///
    /// `policy` overrides the executor's default policy for this call. On
    /// exhaustion the final failure is classified with `retry_count =
    /// max_retries`, appended to the error store, and returned.
    pub async fn execute<F, Fut, T, E>(
        &self,
        mut operation: F,
        kind: ErrorKind,
        context: Option<ErrorContext>,
        policy: Option<&RetryPolicy>,
    ) -> Result<T, ErrorInfo>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<anyhow::Error>,
    {
        let policy = policy.unwrap_or(&self.policy);
        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = policy.calculate_delay(attempt);
                log_debug!(
                    kind = %kind,
                    attempt = attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Waiting before retry"
                );
                sleep(delay).await;
            }

            match self
                .execute_single_attempt(&mut operation, policy, attempt)
                .await
            {
                Ok(value) => return Ok(value),
                Err(error) if attempt < policy.max_retries => {
                    log_debug!(
                        kind = %kind,
                        attempt = attempt,
                        max_retries = policy.max_retries,
                        error = %error,
                        "Attempt failed, will retry"
                    );
                    attempt += 1;
                }
                Err(error) => {
                    return Err(self
                        .handle_exhausted_retries(kind, error, context, policy, &start_time)
                        .await);
                }
            }
        }
    }

    async fn execute_single_attempt<F, Fut, T, E>(
        &self,
        operation: &mut F,
        policy: &RetryPolicy,
        attempt: u32,
    ) -> Result<T, anyhow::Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<anyhow::Error>,
    {
        let operation_start = Instant::now();
        match tokio::time::timeout(policy.timeout, operation()).await {
            Ok(Ok(value)) => {
                log_debug!(
                    attempt = attempt,
                    duration_ms = operation_start.elapsed().as_millis() as u64,
                    "Operation succeeded"
                );
                Ok(value)
            }
            Ok(Err(error)) => Err(error.into()),
            Err(_elapsed) => Err(anyhow::Error::new(RecoveryError::timeout(
                policy.timeout.as_millis() as u64,
            ))),
        }
    }

    async fn handle_exhausted_retries(
        &self,
        kind: ErrorKind,
        error: anyhow::Error,
        context: Option<ErrorContext>,
        policy: &RetryPolicy,
        start_time: &Instant,
    ) -> ErrorInfo {
        let info = classify(
            kind,
            &error,
            context,
            policy.max_retries,
            policy.max_retries,
            self.network.is_reachable(),
        );

        log_error!(
            kind = %kind,
            attempts = policy.max_retries + 1,
            total_duration_ms = start_time.elapsed().as_millis() as u64,
            strategy = %info.strategy,
            error = %error,
            "Operation failed after all retry attempts"
        );

        self.store.record(&info).await;
        info
    }
}
