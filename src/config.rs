use crate::core_types::ReportEnvironment;
use crate::error::{RecoveryError, RecoveryResult};
use crate::logging::log_debug;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Smallest allowed error history capacity.
pub const MIN_STORE_CAPACITY: usize = 10;
/// Largest allowed error history capacity.
pub const MAX_STORE_CAPACITY: usize = 50;

/// Where and how much error history is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of reports kept; oldest are evicted first
    pub capacity: usize,
    /// Storage key of the serialized report history
    pub errors_key: String,
    /// Storage key of the serialized analytics aggregate
    pub analytics_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_STORE_CAPACITY,
            errors_key: "error_reports".to_string(),
            analytics_key: "error_analytics".to_string(),
        }
    }
}

impl StoreConfig {
    /// # Errors
    ///
    /// Returns [`RecoveryError::Configuration`] if the capacity is outside
    /// `10..=50` or the two storage keys are empty or identical.
    pub fn validate(&self) -> RecoveryResult<()> {
        if !(MIN_STORE_CAPACITY..=MAX_STORE_CAPACITY).contains(&self.capacity) {
            return Err(RecoveryError::configuration_error(format!(
                "Store capacity must be between {MIN_STORE_CAPACITY} and {MAX_STORE_CAPACITY}, got {}",
                self.capacity
            )));
        }
        if self.errors_key.trim().is_empty() || self.analytics_key.trim().is_empty() {
            return Err(RecoveryError::configuration_error(
                "Store keys must not be empty",
            ));
        }
        if self.errors_key == self.analytics_key {
            return Err(RecoveryError::configuration_error(
                "Store errors_key and analytics_key must differ",
            ));
        }
        Ok(())
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default policy for `execute_with_retry`; `max_retries` is also the
    /// ceiling for errors raised through `report`
    pub retry_policy: RetryPolicy,
    pub store: StoreConfig,
    /// Delay before the auto-retry observer starts a recovery
    pub auto_retry_delay: Duration,
    /// Device/app/user info stamped on every persisted report
    pub environment: ReportEnvironment,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry_policy: RetryPolicy::default(),
            store: StoreConfig::default(),
            auto_retry_delay: Duration::from_millis(2000),
            environment: ReportEnvironment::default(),
        }
    }
}

impl EngineConfig {
    /// Validate the complete configuration
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError::Configuration`] if:
    /// - The store configuration is invalid
    /// - `backoff_multiplier` is below 1 or not finite
    /// - `base_delay` exceeds `max_delay`
    /// - The per-attempt `timeout` is zero
    pub fn validate(&self) -> RecoveryResult<()> {
        self.store.validate()?;

        let policy = &self.retry_policy;
        if !policy.backoff_multiplier.is_finite() || policy.backoff_multiplier < 1.0 {
            return Err(RecoveryError::configuration_error(format!(
                "backoff_multiplier must be at least 1.0, got {}",
                policy.backoff_multiplier
            )));
        }
        if policy.base_delay > policy.max_delay {
            return Err(RecoveryError::configuration_error(format!(
                "base_delay ({}ms) must not exceed max_delay ({}ms)",
                policy.base_delay.as_millis(),
                policy.max_delay.as_millis()
            )));
        }
        if policy.timeout.is_zero() {
            return Err(RecoveryError::configuration_error(
                "Per-attempt timeout must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Load configuration from environment variables, falling back to defaults
    /// This is the ONLY method that should access environment variables
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `RECOVERY_MAX_RETRIES` | `retry_policy.max_retries` |
    /// | `RECOVERY_BASE_DELAY_MS` | `retry_policy.base_delay` |
    /// | `RECOVERY_MAX_DELAY_MS` | `retry_policy.max_delay` |
    /// | `RECOVERY_BACKOFF_MULTIPLIER` | `retry_policy.backoff_multiplier` |
    /// | `RECOVERY_TIMEOUT_MS` | `retry_policy.timeout` |
    /// | `RECOVERY_STORE_CAPACITY` | `store.capacity` |
    /// | `RECOVERY_AUTO_RETRY_DELAY_MS` | `auto_retry_delay` |
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryError::Configuration`] if a variable is set but cannot
    /// be parsed, or if the resulting configuration fails validation.
    pub fn from_env() -> RecoveryResult<Self> {
        let mut config = Self::default();

        if let Some(max_retries) = env_param::<u32>("RECOVERY_MAX_RETRIES")? {
            config.retry_policy.max_retries = max_retries;
        }
        if let Some(ms) = env_param::<u64>("RECOVERY_BASE_DELAY_MS")? {
            config.retry_policy.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_param::<u64>("RECOVERY_MAX_DELAY_MS")? {
            config.retry_policy.max_delay = Duration::from_millis(ms);
        }
        if let Some(multiplier) = env_param::<f64>("RECOVERY_BACKOFF_MULTIPLIER")? {
            config.retry_policy.backoff_multiplier = multiplier;
        }
        if let Some(ms) = env_param::<u64>("RECOVERY_TIMEOUT_MS")? {
            config.retry_policy.timeout = Duration::from_millis(ms);
        }
        if let Some(capacity) = env_param::<usize>("RECOVERY_STORE_CAPACITY")? {
            config.store.capacity = capacity;
        }
        if let Some(ms) = env_param::<u64>("RECOVERY_AUTO_RETRY_DELAY_MS")? {
            config.auto_retry_delay = Duration::from_millis(ms);
        }

        config.validate()?;

        log_debug!(
            max_retries = config.retry_policy.max_retries,
            base_delay_ms = config.retry_policy.base_delay.as_millis() as u64,
            max_delay_ms = config.retry_policy.max_delay.as_millis() as u64,
            timeout_ms = config.retry_policy.timeout.as_millis() as u64,
            store_capacity = config.store.capacity,
            "Recovery engine configuration loaded from environment"
        );

        Ok(config)
    }
}

/// Parse an optional environment variable
fn env_param<T: FromStr>(name: &str) -> RecoveryResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            RecoveryError::configuration_error(format!("Invalid value for {name}: '{raw}'"))
        }),
        Err(_) => Ok(None),
    }
}
