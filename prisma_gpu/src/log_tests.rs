//! Unit tests for the logging module

use crate::log::{LogEntry, LogSeverity};
use std::time::SystemTime;

#[test]
fn test_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_severity_labels_are_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
}

#[test]
fn test_log_entry_clone_preserves_fields() {
    let entry = LogEntry {
        severity: LogSeverity::Warn,
        timestamp: SystemTime::now(),
        source: "prisma::Program".to_string(),
        message: "something odd".to_string(),
        file: Some("program.rs"),
        line: Some(42),
    };

    let copy = entry.clone();
    assert_eq!(copy.severity, LogSeverity::Warn);
    assert_eq!(copy.source, "prisma::Program");
    assert_eq!(copy.message, "something odd");
    assert_eq!(copy.file, Some("program.rs"));
    assert_eq!(copy.line, Some(42));
}
