//! Bounded, persisted history of error reports plus running analytics.
//!
//! The history is a FIFO of at most `capacity` reports, newest first. Both the
//! history and the analytics aggregate are serialized as JSON under two fixed
//! keys of a [`KeyValueStorage`] and loaded lazily on first access, so they
//! survive process restarts.
//!
//! Storage failures never escape: a failed read or write is logged and the
//! store carries on with its in-memory state for that call. Until a read has
//! succeeded nothing is written back, and reports kept in memory meanwhile are
//! merged in front of the persisted history once it loads.

use crate::config::StoreConfig;
use crate::core_types::{ErrorAnalytics, ErrorInfo, ErrorReport, ReportEnvironment, UserInfo};
use crate::error::{RecoveryError, RecoveryResult};
use crate::logging::{log_debug, log_warn};
use crate::storage::KeyValueStorage;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Default)]
struct StoreState {
    loaded: bool,
    /// Newest first.
    reports: VecDeque<ErrorReport>,
    analytics: ErrorAnalytics,
}

pub struct ErrorStore {
    storage: Arc<dyn KeyValueStorage>,
    config: StoreConfig,
    environment: RwLock<ReportEnvironment>,
    state: Mutex<StoreState>,
}

impl std::fmt::Debug for ErrorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ErrorStore {
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        config: StoreConfig,
        environment: ReportEnvironment,
    ) -> Self {
        Self {
            storage,
            config,
            environment: RwLock::new(environment),
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Replace the session information stamped on subsequent reports.
    pub async fn set_user_info(&self, user_info: Option<UserInfo>) {
        self.environment.write().await.user_info = user_info;
    }

    /// Convert a classified error into a report and append it.
    pub async fn record(&self, info: &ErrorInfo) {
        let report = {
            let environment = self.environment.read().await;
            ErrorReport::from_info(info, &environment)
        };
        self.append(report).await;
    }

    /// Append a report, evicting the oldest beyond capacity, and update analytics.
    pub async fn append(&self, report: ErrorReport) {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;

        state.analytics.record(&report);
        state.reports.push_front(report);
        state.reports.truncate(self.config.capacity);

        log_debug!(
            stored_reports = state.reports.len(),
            total_errors = state.analytics.total_errors,
            "Error report appended"
        );

        self.persist(&state).await;
    }

    /// Stored reports, most recent first.
    pub async fn list(&self) -> Vec<ErrorReport> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;
        state.reports.iter().cloned().collect()
    }

    pub async fn analytics(&self) -> ErrorAnalytics {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await;
        state.analytics.clone()
    }

    /// Drop both the report history and the analytics aggregate.
    pub async fn clear_all(&self) {
        let mut state = self.state.lock().await;
        state.reports.clear();
        state.analytics = ErrorAnalytics::default();
        // Cleared history must not be reloaded from storage.
        state.loaded = true;

        for key in [&self.config.errors_key, &self.config.analytics_key] {
            if let Err(err) = self.storage.remove(key).await {
                log_warn!(key = %key, error = %err, "Failed to remove persisted error state");
            }
        }
    }

    /// Load persisted state on first use, merging anything appended while
    /// storage was unreadable.
    ///
    /// A storage read failure leaves the store unloaded so the next call tries
    /// again; unparseable data is discarded and counts as loaded.
    async fn ensure_loaded(&self, state: &mut StoreState) {
        if state.loaded {
            return;
        }

        let reports = match self.load_reports().await {
            Ok(reports) => reports,
            Err(RecoveryError::Serialization { .. }) => {
                log_warn!("Persisted error history is corrupt, starting empty");
                Vec::new()
            }
            Err(err) => {
                log_warn!(error = %err, "Failed to load error history, using memory only for now");
                return;
            }
        };
        let analytics = match self.load_analytics().await {
            Ok(analytics) => analytics,
            Err(RecoveryError::Serialization { .. }) => {
                log_warn!("Persisted error analytics are corrupt, starting empty");
                ErrorAnalytics::default()
            }
            Err(err) => {
                log_warn!(error = %err, "Failed to load error analytics, using memory only for now");
                return;
            }
        };

        let pending = state.reports.len();
        // Reports appended while unloaded are newer than anything persisted.
        state.reports.extend(reports);
        state.reports.truncate(self.config.capacity);
        let mut merged = analytics;
        merged.merge(&state.analytics);
        state.analytics = merged;
        state.loaded = true;

        log_debug!(
            stored_reports = state.reports.len(),
            total_errors = state.analytics.total_errors,
            pending_reports = pending,
            "Error store loaded"
        );

        if pending > 0 {
            self.persist(state).await;
        }
    }

    async fn load_reports(&self) -> RecoveryResult<Vec<ErrorReport>> {
        match self.storage.get(&self.config.errors_key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn load_analytics(&self) -> RecoveryResult<ErrorAnalytics> {
        match self.storage.get(&self.config.analytics_key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(ErrorAnalytics::default()),
        }
    }

    async fn persist(&self, state: &StoreState) {
        // Writing before a successful load would overwrite unread history.
        if !state.loaded {
            log_debug!("Error store not loaded yet, keeping report in memory");
            return;
        }
        if let Err(err) = self.try_persist(state).await {
            log_warn!(error = %err, "Failed to persist error history, keeping it in memory");
        }
    }

    async fn try_persist(&self, state: &StoreState) -> RecoveryResult<()> {
        let reports = serde_json::to_string(&state.reports)?;
        let analytics = serde_json::to_string(&state.analytics)?;
        self.storage.set(&self.config.errors_key, &reports).await?;
        self.storage
            .set(&self.config.analytics_key, &analytics)
            .await
    }
}
