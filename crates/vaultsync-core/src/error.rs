//! Error types for vaultsync-core
//!
//! A typed error hierarchy with thiserror, plus the two reports that let a run
//! degrade per record (decode stage) and per document (write stage) instead of
//! failing as a whole.

use std::path::PathBuf;
use thiserror::Error;

use crate::sync::SyncOutcome;

/// Core error type for vaultsync operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory: {path}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output root is not usable: {path} - {reason}")]
    OutputRootUnavailable { path: PathBuf, reason: String },

    // ===================
    // Decode Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed {kind} record #{index}: {message}")]
    RecordDecode {
        kind: &'static str,
        index: usize,
        message: String,
    },

    #[error("{kind} record #{index} has no id")]
    MissingId { kind: &'static str, index: usize },

    #[error("{kind} record #{index} has an id that cannot name a file: {id:?}")]
    InvalidId {
        kind: &'static str,
        index: usize,
        id: String,
    },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Severity level for errors during load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Non-critical, can continue with degraded functionality
    Warning,
    /// The record or file was dropped
    Error,
}

/// Individual error entry in load report
#[derive(Debug, Clone)]
pub struct LoadError {
    pub source: String,
    pub message: String,
    pub severity: ErrorSeverity,
}

impl LoadError {
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Warning,
        }
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Error,
        }
    }

    /// Record a rejected record, keeping the typed cause as the message
    pub fn from_core_error(source: impl Into<String>, error: &CoreError) -> Self {
        Self::error(source, error.to_string())
    }
}

/// Report of errors encountered while decoding fetched records
///
/// Enables graceful degradation by tracking rejected records
/// instead of failing the batch on the first bad one.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub errors: Vec<LoadError>,
    pub records_decoded: usize,
    pub records_rejected: usize,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: LoadError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::warning(source, message));
    }

    /// Count a record that was excluded from output
    pub fn reject(&mut self, source: impl Into<String>, error: &CoreError) {
        self.records_rejected += 1;
        self.errors.push(LoadError::from_core_error(source, error));
    }

    /// Returns true if there are any errors (including warnings)
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns (warnings, errors)
    pub fn error_count(&self) -> (usize, usize) {
        let mut counts = (0, 0);
        for error in &self.errors {
            match error.severity {
                ErrorSeverity::Warning => counts.0 += 1,
                ErrorSeverity::Error => counts.1 += 1,
            }
        }
        counts
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: LoadReport) {
        self.errors.extend(other.errors);
        self.records_decoded += other.records_decoded;
        self.records_rejected += other.records_rejected;
    }
}

/// A document that could not be synchronized
#[derive(Debug, Clone)]
pub struct DocumentFailure {
    /// Document path relative to the output root
    pub document: String,
    pub message: String,
}

/// Outcome of one run over every document kind
#[derive(Debug, Default)]
pub struct SyncReport {
    pub created: usize,
    pub replaced: usize,
    pub skipped: usize,
    pub failures: Vec<DocumentFailure>,
    /// Decode-stage report of the records that fed this run
    pub load: LoadReport,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the result of a single document write into the report
    pub fn record(&mut self, document: impl Into<String>, result: Result<SyncOutcome, CoreError>) {
        match result {
            Ok(SyncOutcome::Created) => self.created += 1,
            Ok(SyncOutcome::Replaced) => self.replaced += 1,
            Ok(SyncOutcome::Skipped) => self.skipped += 1,
            Err(error) => {
                let document = document.into();
                tracing::warn!(document = %document, error = %error, "Document sync failed");
                self.failures.push(DocumentFailure {
                    document,
                    message: error.to_string(),
                });
            }
        }
    }

    /// Number of documents actually written to disk
    pub fn writes(&self) -> usize {
        self.created + self.replaced
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_report_severity_counting() {
        let mut report = LoadReport::new();
        report.add_warning("memos.json", "File not found");
        report.add_error(LoadError::error("tasks.json", "Parse error"));
        report.reject(
            "tasks",
            &CoreError::InvalidId {
                kind: "task",
                index: 0,
                id: "../escape".to_string(),
            },
        );

        assert_eq!(report.error_count(), (1, 2));
        assert_eq!(report.errors[2].severity, ErrorSeverity::Error);
        assert_eq!(report.records_rejected, 1);
    }

    #[test]
    fn test_reject_counts_and_keeps_cause() {
        let mut report = LoadReport::new();
        report.reject("tasks", &CoreError::MissingId { kind: "task", index: 3 });

        assert_eq!(report.records_rejected, 1);
        assert_eq!(report.errors[0].severity, ErrorSeverity::Error);
        assert_eq!(report.errors[0].message, "task record #3 has no id");
    }

    #[test]
    fn test_load_report_merge() {
        let mut report1 = LoadReport::new();
        report1.records_decoded = 10;

        let mut report2 = LoadReport::new();
        report2.records_decoded = 20;
        report2.add_warning("test", "warning");

        report1.merge(report2);

        assert_eq!(report1.records_decoded, 30);
        assert_eq!(report1.errors.len(), 1);
    }

    #[test]
    fn test_sync_report_records_outcomes() {
        let mut report = SyncReport::new();
        report.record("a.md", Ok(SyncOutcome::Created));
        report.record("b.md", Ok(SyncOutcome::Replaced));
        report.record("c.md", Ok(SyncOutcome::Skipped));
        report.record(
            "d.md",
            Err(CoreError::FileWrite {
                path: PathBuf::from("/nope/d.md"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }),
        );

        assert_eq!(report.writes(), 2);
        assert_eq!(report.skipped, 1);
        assert!(report.has_failures());
        assert_eq!(report.failures[0].document, "d.md");
        assert!(report.failures[0].message.contains("/nope/d.md"));
    }
}
