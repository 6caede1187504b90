use crate::error::JournalError;
use crate::level::Priority;
use crate::sink::JournalSink;
use std::collections::HashMap;

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of the hook itself without any
/// socket I/O, and on hosts without a journal.
#[derive(Clone, Default)]
pub struct NoopSink;

impl JournalSink for NoopSink {
    fn send(
        &self,
        _message: &str,
        _priority: Priority,
        _fields: &HashMap<String, String>,
    ) -> Result<(), JournalError> {
        Ok(())
    }
}
