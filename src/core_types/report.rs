//! Persisted error reports and running analytics.

use crate::core_types::info::{ErrorContext, ErrorInfo};
use crate::core_types::kinds::{ErrorKind, RecoveryStrategy, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Maximum persisted length of `technical_details`, in characters.
pub const MAX_TECHNICAL_DETAILS_LEN: usize = 500;

/// Maximum number of entries in [`ErrorAnalytics::most_common_errors`].
pub const MOST_COMMON_ERRORS_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub platform: String,
    pub os_version: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub version: String,
    pub build: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub session_id: Option<String>,
    pub is_guest: bool,
}

/// Ambient information stamped onto every persisted report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEnvironment {
    pub device_info: Option<DeviceInfo>,
    pub app_info: Option<AppInfo>,
    pub user_info: Option<UserInfo>,
}

/// Serializable form of an [`ErrorInfo`], as kept in the bounded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub id: Uuid,
    pub kind: ErrorKind,
    pub code: Option<String>,
    pub message: String,
    pub context: Option<ErrorContext>,
    pub timestamp: i64,
    pub severity: Severity,
    pub retry_count: u32,
    pub max_retries: u32,
    pub strategy: RecoveryStrategy,
    pub user_friendly_message: String,
    pub technical_details: Option<String>,
    pub device_info: Option<DeviceInfo>,
    pub app_info: Option<AppInfo>,
    pub user_info: Option<UserInfo>,
}

impl ErrorReport {
    /// Build a report from a classified error, truncating technical details.
    pub fn from_info(info: &ErrorInfo, environment: &ReportEnvironment) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: info.kind,
            code: info.code.clone(),
            message: info.message.clone(),
            context: info.context.clone(),
            timestamp: info.timestamp,
            severity: info.severity,
            retry_count: info.retry_count,
            max_retries: info.max_retries,
            strategy: info.strategy,
            user_friendly_message: info.user_friendly_message.clone(),
            technical_details: info
                .technical_details
                .as_deref()
                .map(|details| truncate_chars(details, MAX_TECHNICAL_DETAILS_LEN)),
            device_info: environment.device_info.clone(),
            app_info: environment.app_info.clone(),
            user_info: environment.user_info.clone(),
        }
    }
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// A message and how many times it has been reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCount {
    pub message: String,
    pub count: u64,
}

/// Running aggregate over every report appended since the last clear.
///
/// Updated incrementally alongside each append; eviction from the bounded
/// history does not decrement it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorAnalytics {
    pub total_errors: u64,
    pub errors_by_kind: BTreeMap<ErrorKind, u64>,
    pub errors_by_severity: BTreeMap<Severity, u64>,
    pub last_error_timestamp: Option<i64>,
    /// Sorted by descending count, at most ten entries.
    pub most_common_errors: Vec<MessageCount>,
}

impl ErrorAnalytics {
    pub fn record(&mut self, report: &ErrorReport) {
        self.total_errors += 1;
        *self.errors_by_kind.entry(report.kind).or_insert(0) += 1;
        *self.errors_by_severity.entry(report.severity).or_insert(0) += 1;
        self.last_error_timestamp = Some(report.timestamp);

        let count = match self
            .most_common_errors
            .iter()
            .position(|entry| entry.message == report.message)
        {
            Some(index) => self.most_common_errors.remove(index).count + 1,
            None => 1,
        };
        // Among equal counts the most recently reported message ranks first.
        let rank = self
            .most_common_errors
            .iter()
            .position(|entry| entry.count <= count)
            .unwrap_or(self.most_common_errors.len());
        self.most_common_errors.insert(
            rank,
            MessageCount {
                message: report.message.clone(),
                count,
            },
        );
        self.most_common_errors.truncate(MOST_COMMON_ERRORS_LIMIT);
    }

    /// Fold in an aggregate of reports that arrived after those counted here.
    pub fn merge(&mut self, newer: &ErrorAnalytics) {
        self.total_errors += newer.total_errors;
        for (kind, count) in &newer.errors_by_kind {
            *self.errors_by_kind.entry(*kind).or_insert(0) += count;
        }
        for (severity, count) in &newer.errors_by_severity {
            *self.errors_by_severity.entry(*severity).or_insert(0) += count;
        }
        if newer.last_error_timestamp.is_some() {
            self.last_error_timestamp = newer.last_error_timestamp;
        }

        // Newer entries go first so they win ties after the stable sort.
        let mut combined = newer.most_common_errors.clone();
        for entry in &self.most_common_errors {
            match combined.iter_mut().find(|c| c.message == entry.message) {
                Some(existing) => existing.count += entry.count,
                None => combined.push(entry.clone()),
            }
        }
        combined.sort_by(|a, b| b.count.cmp(&a.count));
        combined.truncate(MOST_COMMON_ERRORS_LIMIT);
        self.most_common_errors = combined;
    }

    pub fn count_for_kind(&self, kind: ErrorKind) -> u64 {
        self.errors_by_kind.get(&kind).copied().unwrap_or(0)
    }
}
