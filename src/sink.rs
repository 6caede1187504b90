use crate::error::JournalError;
use crate::level::Priority;
use std::collections::HashMap;
use std::sync::Arc;

/// Destination for journal records produced by the hook.
///
/// Implementations transport one entry to a concrete journal (journald,
/// a test double, etc). The hook calls `send` synchronously on the thread
/// that emitted the event.
pub trait JournalSink: Send + Sync {
    /// Submit a single entry.
    ///
    /// **Parameters**
    /// - `message`: human-readable message, unchanged from the event.
    /// - `priority`: already-mapped journal priority.
    /// - `fields`: normalized field names with their textual values.
    ///
    /// **Returns**
    /// - `Ok(())` if the journal accepted the entry.
    /// - `Err(..)` if it did not. The hook hands this error back to its
    ///   caller untouched and never retries.
    fn send(
        &self,
        message: &str,
        priority: Priority,
        fields: &HashMap<String, String>,
    ) -> Result<(), JournalError>;
}

impl<S: JournalSink + ?Sized> JournalSink for Arc<S> {
    fn send(
        &self,
        message: &str,
        priority: Priority,
        fields: &HashMap<String, String>,
    ) -> Result<(), JournalError> {
        (**self).send(message, priority, fields)
    }
}

impl<S: JournalSink + ?Sized> JournalSink for &S {
    fn send(
        &self,
        message: &str,
        priority: Priority,
        fields: &HashMap<String, String>,
    ) -> Result<(), JournalError> {
        (**self).send(message, priority, fields)
    }
}
