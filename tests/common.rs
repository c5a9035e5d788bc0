//! Test helper utilities for recovery-engine integration tests
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use recovery_engine::{
    EngineConfig, KeyValueStorage, MemoryStorage, NetworkMonitor, NetworkStatus, ResilienceEngine,
    RetryPolicy,
};
use std::sync::Arc;
use std::time::Duration;

/// Retry policy with millisecond delays and no jitter
pub fn create_fast_test_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        timeout: Duration::from_millis(100),
        max_jitter: Duration::ZERO,
    }
}

pub fn create_test_config() -> EngineConfig {
    EngineConfig {
        retry_policy: create_fast_test_retry_policy(),
        ..EngineConfig::default()
    }
}

/// Engine over caller-supplied storage with a controllable network monitor
pub fn create_engine_with_storage(
    storage: Arc<dyn KeyValueStorage>,
    status: NetworkStatus,
) -> (ResilienceEngine, Arc<NetworkMonitor>) {
    let monitor = Arc::new(NetworkMonitor::new(status));
    let engine = ResilienceEngine::from_config(create_test_config(), storage, monitor.clone())
        .expect("test configuration is valid");
    (engine, monitor)
}

pub fn create_test_engine(status: NetworkStatus) -> (ResilienceEngine, Arc<NetworkMonitor>) {
    create_engine_with_storage(Arc::new(MemoryStorage::new()), status)
}
