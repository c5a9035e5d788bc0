//! Error classification.
//!
//! Turns a raw failure plus caller context into an [`ErrorInfo`]. Classification
//! is pure apart from reading the clock for `timestamp`: the same inputs always
//! produce the same severity, strategy, and message.

use crate::core_types::{now_millis, ErrorContext, ErrorInfo, ErrorKind, Severity};
use crate::error::RecoveryError;
use crate::messages::compose_message;
use crate::strategy::resolve_strategy;

/// Context key a caller can use to supply a transport-specific code.
pub const CODE_CONTEXT_KEY: &str = "code";

/// Code assigned to attempts that exceeded their timeout.
pub const TIMEOUT_CODE: &str = "TIMEOUT";

/// Severity is a fixed function of the kind so two errors of the same kind
/// always render the same way.
pub fn derive_severity(kind: ErrorKind) -> Severity {
    match kind {
        ErrorKind::Critical => Severity::Critical,
        ErrorKind::Initialization => Severity::High,
        ErrorKind::Network => Severity::Medium,
        ErrorKind::FontLoading
        | ErrorKind::Storage
        | ErrorKind::Authentication
        | ErrorKind::Permissions
        | ErrorKind::Unknown => Severity::Low,
    }
}

/// Classify a raw failure.
///
/// `technical_details` keeps the full cause chain here; it is truncated only
/// when the error is turned into a persisted report.
pub fn classify(
    kind: ErrorKind,
    error: &anyhow::Error,
    context: Option<ErrorContext>,
    retry_count: u32,
    max_retries: u32,
    network_reachable: bool,
) -> ErrorInfo {
    let retry_count = retry_count.min(max_retries);
    let code = extract_code(error, context.as_ref());

    ErrorInfo {
        kind,
        code,
        message: error.to_string(),
        context,
        timestamp: now_millis(),
        severity: derive_severity(kind),
        retry_count,
        max_retries,
        strategy: resolve_strategy(kind, retry_count, network_reachable),
        user_friendly_message: compose_message(kind, network_reachable),
        technical_details: Some(format!("{error:?}")),
    }
}

/// Supersede `info` with a new value at `retry_count`, recomputing everything
/// that depends on the retry count or reachability.
pub fn reclassify(info: &ErrorInfo, retry_count: u32, network_reachable: bool) -> ErrorInfo {
    let retry_count = retry_count.min(info.max_retries);
    ErrorInfo {
        timestamp: now_millis(),
        retry_count,
        strategy: resolve_strategy(info.kind, retry_count, network_reachable),
        user_friendly_message: compose_message(info.kind, network_reachable),
        ..info.clone()
    }
}

fn extract_code(error: &anyhow::Error, context: Option<&ErrorContext>) -> Option<String> {
    if let Some(code) = context
        .and_then(|ctx| ctx.get(CODE_CONTEXT_KEY))
        .and_then(|value| value.as_str())
    {
        return Some(code.to_string());
    }

    error.chain().find_map(|cause| {
        if let Some(RecoveryError::Timeout { .. }) = cause.downcast_ref::<RecoveryError>() {
            return Some(TIMEOUT_CODE.to_string());
        }
        cause
            .downcast_ref::<std::io::Error>()
            .map(|io| format!("{:?}", io.kind()))
    })
}
