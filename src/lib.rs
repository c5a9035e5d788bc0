//! # recovery-engine
//!
//! Error recovery and resilience engine: classifies failures, decides how to
//! recover from them, retries async operations with backoff, and keeps a
//! bounded, persisted history of failures with aggregate analytics.
//!
//! ## Key Features
//!
//! - **Classification**: Every failure maps to one closed [`ErrorKind`] with a derived [`Severity`]
//! - **Strategy Resolution**: Deterministic [`RecoveryStrategy`] per kind and retry count
//! - **Retries**: Exponential backoff with jitter and per-attempt timeouts
//! - **Error History**: Bounded FIFO of [`ErrorReport`]s with running [`ErrorAnalytics`]
//! - **Recovery State**: One observable active error with report/recover/clear transitions
//!
//! ## Example
//!
//! ```rust,no_run
//! use recovery_engine::{
//!     EngineConfig, ErrorKind, MemoryStorage, NetworkMonitor, ResilienceEngine,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = ResilienceEngine::from_config(
//!     EngineConfig::default(),
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(NetworkMonitor::default()),
//! )?;
//!
//! let result = engine
//!     .execute_with_retry(
//!         || async { Ok::<_, std::io::Error>("profile") },
//!         ErrorKind::Network,
//!         None,
//!         None,
//!     )
//!     .await;
//!
//! if let Err(info) = result {
//!     println!("{} ({})", info.user_friendly_message, info.strategy);
//!     engine.surface(info).await;
//! }
//! # Ok(())
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

pub mod core_types;

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod auto_retry;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod messages;
pub mod network;
pub mod recovery;
pub mod retry;
pub mod storage;
pub mod store;
pub mod strategy;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use auto_retry::AutoRetryObserver;
pub use classifier::{classify, derive_severity, reclassify};
pub use config::{EngineConfig, StoreConfig};
pub use engine::ResilienceEngine;
pub use error::{RecoveryError, RecoveryResult};
pub use messages::{compose_message, strategy_guidance};
pub use network::{NetworkMonitor, NetworkStatus, NetworkStatusProvider};
pub use recovery::{retry_action, RecoveryOutcome, RecoveryStateMachine, RetryAction};
pub use retry::{RetryExecutor, RetryPolicy};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::ErrorStore;
pub use strategy::{recovery_actions, resolve_strategy, RecoveryAction, RecoveryActionKind};

pub use core_types::{
    AppInfo, DeviceInfo, ErrorAnalytics, ErrorContext, ErrorInfo, ErrorKind, ErrorReport,
    MessageCount, RecoveryPhase, RecoveryState, RecoveryStrategy, ReportEnvironment, Severity,
    UserInfo,
};
