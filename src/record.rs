use crate::level::{Priority, Severity};
use std::collections::HashMap;

/// Where a log call originated. Empty strings and a zero line mean the
/// value is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
    pub function: String,
}

/// A single event as delivered by the logging framework.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub message: String,
    pub severity: Severity,
    pub data: HashMap<String, serde_json::Value>,
    pub caller: Option<CallSite>,
}

impl LogEvent {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        LogEvent {
            message: message.into(),
            severity,
            data: HashMap::new(),
            caller: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_caller(mut self, caller: CallSite) -> Self {
        self.caller = Some(caller);
        self
    }
}

/// The journal-shaped form of a [`LogEvent`], built for one submission
/// and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRecord {
    pub message: String,
    pub priority: Priority,
    pub fields: HashMap<String, String>,
}
