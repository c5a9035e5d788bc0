//! Test helper utilities shared across unit test modules.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

#![allow(dead_code)]

use crate::classifier::classify;
use crate::config::StoreConfig;
use crate::core_types::{ErrorInfo, ErrorKind, ErrorReport, ReportEnvironment};
use crate::network::NetworkStatus;
use crate::recovery::RecoveryStateMachine;
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::storage::MemoryStorage;
use crate::store::ErrorStore;
use std::sync::Arc;
use std::time::Duration;

/// Retry policy with short delays and no jitter so timings are exact
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

pub fn create_test_store_config(capacity: usize) -> StoreConfig {
    StoreConfig {
        capacity,
        ..StoreConfig::default()
    }
}

/// In-memory error store plus a handle on its backing storage
pub fn create_test_store(capacity: usize) -> (Arc<MemoryStorage>, Arc<ErrorStore>) {
    let storage = Arc::new(MemoryStorage::new());
    let store = Arc::new(ErrorStore::new(
        storage.clone(),
        create_test_store_config(capacity),
        ReportEnvironment::default(),
    ));
    (storage, store)
}

pub fn create_test_machine(network: NetworkStatus) -> (Arc<ErrorStore>, Arc<RecoveryStateMachine>) {
    let (_, store) = create_test_store(50);
    let machine = Arc::new(RecoveryStateMachine::new(
        store.clone(),
        Arc::new(network),
        3,
    ));
    (store, machine)
}

pub fn create_test_executor(network: NetworkStatus) -> (Arc<ErrorStore>, RetryExecutor) {
    let (_, store) = create_test_store(50);
    let executor = RetryExecutor::new(
        create_fast_test_retry_policy(),
        store.clone(),
        Arc::new(network),
    );
    (store, executor)
}

pub fn sample_info(kind: ErrorKind, message: &str) -> ErrorInfo {
    classify(kind, &anyhow::anyhow!(message.to_string()), None, 0, 3, true)
}

pub fn sample_report(kind: ErrorKind, message: &str) -> ErrorReport {
    ErrorReport::from_info(&sample_info(kind, message), &ReportEnvironment::default())
}
