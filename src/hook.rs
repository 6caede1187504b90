use crate::error::JournalError;
use crate::fields::{convert_fields, CODE_FILE, CODE_FUNC, CODE_LINE};
use crate::level::{priority_for, Severity};
use crate::record::{JournalRecord, LogEvent};
use crate::sink::JournalSink;

/// Forwards log events to a [`JournalSink`].
///
/// The hook keeps no state between calls: every [`fire`](Self::fire)
/// builds its own [`JournalRecord`] and submits it once. Concurrent
/// calls are as safe as the sink they end up in.
#[derive(Debug, Clone, Default)]
pub struct JournalHook<S> {
    sink: S,
}

impl<S: JournalSink> JournalHook<S> {
    pub fn new(sink: S) -> Self {
        JournalHook { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Severities this hook accepts. Always all of them; level filtering
    /// belongs to the subscriber.
    pub fn levels(&self) -> &'static [Severity] {
        &Severity::ALL
    }

    /// Translate `event` and submit it. A sink failure is returned as-is.
    pub fn fire(&self, event: &LogEvent) -> Result<(), JournalError> {
        let record = Self::translate(event);
        self.sink
            .send(&record.message, record.priority, &record.fields)
    }

    /// Build the journal form of `event` without submitting it.
    pub fn translate(event: &LogEvent) -> JournalRecord {
        let mut fields = convert_fields(&event.data);

        if let Some(caller) = &event.caller {
            if !caller.file.is_empty() {
                fields.insert(CODE_FILE.to_string(), caller.file.clone());
            }
            if caller.line != 0 {
                fields.insert(CODE_LINE.to_string(), caller.line.to_string());
            }
            if !caller.function.is_empty() {
                fields.insert(CODE_FUNC.to_string(), caller.function.clone());
            }
        }

        JournalRecord {
            message: event.message.clone(),
            priority: priority_for(event.severity),
            fields,
        }
    }
}
