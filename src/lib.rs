pub mod error;
pub mod level;
pub mod fields;
pub mod record;
pub mod sink;
pub mod hook;
pub mod layer;

#[cfg(unix)]
pub mod journald;

#[cfg(unix)]
pub mod init;
pub mod noop_sink;

pub use error::JournalError;
pub use hook::JournalHook;
pub use layer::JournalLayer;
pub use level::{Priority, Severity};
pub use record::{CallSite, JournalRecord, LogEvent};
pub use sink::JournalSink;
