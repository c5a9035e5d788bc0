use crate::auto_retry::AutoRetryObserver;
use crate::config::EngineConfig;
use crate::core_types::{
    ErrorAnalytics, ErrorContext, ErrorInfo, ErrorKind, ErrorReport, RecoveryState, UserInfo,
};
use crate::error::RecoveryResult;
use crate::logging::{log_debug, log_warn};
use crate::network::NetworkStatusProvider;
use crate::recovery::{RecoveryOutcome, RecoveryStateMachine, RetryAction};
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::storage::KeyValueStorage;
use crate::store::ErrorStore;
use crate::strategy::{recovery_actions, RecoveryAction};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Process-wide recovery service.
///
/// Construct one at startup and hand `Arc<ResilienceEngine>` to whatever needs
/// to report errors or run retried operations.
pub struct ResilienceEngine {
    config: EngineConfig,
    store: Arc<ErrorStore>,
    machine: Arc<RecoveryStateMachine>,
    executor: RetryExecutor,
}

impl std::fmt::Debug for ResilienceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilienceEngine")
            .field("config", &self.config)
            .field("machine", &self.machine)
            .finish_non_exhaustive()
    }
}

impl ResilienceEngine {
    /// Build the engine from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError::Configuration`](crate::RecoveryError::Configuration)
    /// if `config` fails validation.
    pub fn from_config(
        config: EngineConfig,
        storage: Arc<dyn KeyValueStorage>,
        network: Arc<dyn NetworkStatusProvider>,
    ) -> RecoveryResult<Self> {
        config.validate()?;

        let store = Arc::new(ErrorStore::new(
            storage,
            config.store.clone(),
            config.environment.clone(),
        ));
        let machine = Arc::new(RecoveryStateMachine::new(
            Arc::clone(&store),
            Arc::clone(&network),
            config.retry_policy.max_retries,
        ));
        let executor = RetryExecutor::new(config.retry_policy.clone(), Arc::clone(&store), network);

        log_debug!(
            max_retries = config.retry_policy.max_retries,
            store_capacity = config.store.capacity,
            "Recovery engine created"
        );

        Ok(Self {
            config,
            store,
            machine,
            executor,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state_machine(&self) -> &Arc<RecoveryStateMachine> {
        &self.machine
    }

    pub fn store(&self) -> &Arc<ErrorStore> {
        &self.store
    }

    /// Report a failure as the active error and persist it.
    pub async fn report(
        &self,
        kind: ErrorKind,
        error: impl Into<anyhow::Error>,
        context: Option<ErrorContext>,
    ) -> ErrorInfo {
        self.machine.report(kind, error.into(), context).await
    }

    /// Run `operation` under the engine's default retry policy, or `policy` if given.
    ///
    /// Fails with the classified final error once retries are exhausted; the
    /// error has already been persisted. It does not become the active error;
    /// pass it to [`surface`](Self::surface) for that.
    pub async fn execute_with_retry<F, Fut, T, E>(
        &self,
        operation: F,
        kind: ErrorKind,
        context: Option<ErrorContext>,
        policy: Option<&RetryPolicy>,
    ) -> Result<T, ErrorInfo>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<anyhow::Error>,
    {
        self.executor.execute(operation, kind, context, policy).await
    }

    /// Apply a local change, confirm it remotely with retries, and roll the
    /// local change back if confirmation ultimately fails.
    pub async fn execute_optimistic<A, F, Fut, T, E, R>(
        &self,
        apply: A,
        operation: F,
        rollback: R,
        kind: ErrorKind,
        context: Option<ErrorContext>,
    ) -> Result<T, ErrorInfo>
    where
        A: FnOnce(),
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<anyhow::Error>,
        R: FnOnce(),
    {
        apply();
        let result = self.executor.execute(operation, kind, context, None).await;
        if let Err(error) = &result {
            log_warn!(
                kind = %error.kind,
                "Optimistic update failed, rolling back"
            );
            rollback();
        }
        result
    }

    /// Show a failure returned by [`execute_with_retry`](Self::execute_with_retry)
    /// as the active error without persisting it a second time.
    pub async fn surface(&self, info: ErrorInfo) {
        self.machine.activate(info).await;
    }

    pub async fn start_recovery(
        &self,
        retry_action: Option<RetryAction>,
    ) -> RecoveryResult<RecoveryOutcome> {
        self.machine.start_recovery(retry_action).await
    }

    pub async fn clear_error(&self) {
        self.machine.clear().await;
    }

    /// Persisted reports, most recent first.
    pub async fn get_stored_errors(&self) -> Vec<ErrorReport> {
        self.store.list().await
    }

    pub async fn clear_stored_errors(&self) {
        self.store.clear_all().await;
    }

    pub async fn analytics(&self) -> ErrorAnalytics {
        self.store.analytics().await
    }

    pub async fn set_user_info(&self, user_info: Option<UserInfo>) {
        self.store.set_user_info(user_info).await;
    }

    pub fn state(&self) -> RecoveryState {
        self.machine.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<RecoveryState> {
        self.machine.subscribe()
    }

    /// Buttons to render for the active error, if any.
    pub fn current_actions(&self) -> Vec<RecoveryAction> {
        self.machine
            .state()
            .current_error
            .map(|error| recovery_actions(error.strategy))
            .unwrap_or_default()
    }

    /// Start the automatic first retry using the configured delay.
    pub fn spawn_auto_retry<F>(&self, action_for: F) -> AutoRetryObserver
    where
        F: Fn(&ErrorInfo) -> Option<RetryAction> + Send + Sync + 'static,
    {
        AutoRetryObserver::spawn(
            Arc::clone(&self.machine),
            self.config.auto_retry_delay,
            action_for,
        )
    }
}
