//! Core value types for the recovery engine
//!
//! ## Organization
//! - `kinds` - closed enumerations: error kind, severity, recovery strategy
//! - `info` - classified errors and the observable recovery state
//! - `report` - persisted error reports and aggregate analytics

pub mod info;
pub mod kinds;
pub mod report;

// Re-export commonly used types
pub use info::{ErrorContext, ErrorInfo, RecoveryPhase, RecoveryState};
pub use kinds::{ErrorKind, RecoveryStrategy, Severity};
pub use report::{
    AppInfo, DeviceInfo, ErrorAnalytics, ErrorReport, MessageCount, ReportEnvironment, UserInfo,
    MAX_TECHNICAL_DETAILS_LEN,
};

/// Current wall-clock time in milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
