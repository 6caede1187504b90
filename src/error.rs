use std::io;
use std::path::PathBuf;

/// Error returned when a record could not be handed to the journal.
///
/// This is the only failure a [`crate::JournalHook`] ever reports; it is
/// produced by the [`crate::JournalSink`] and passed through unchanged.
#[derive(thiserror::Error, Debug)]
pub enum JournalError {
    #[error("could not initialize socket to journald: {0}")]
    Socket(#[source] io::Error),

    #[error("failed to send entry to journald at {}: {source}", path.display())]
    Send {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failure reported by a custom sink.
    #[error("journal sink failed: {0}")]
    Sink(String),
}

impl JournalError {
    pub fn sink<S: Into<String>>(msg: S) -> Self {
        JournalError::Sink(msg.into())
    }
}
