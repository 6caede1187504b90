use crate::hook::JournalHook;
use crate::level::Severity;
use crate::record::{CallSite, LogEvent};
use crate::sink::JournalSink;
use std::collections::HashMap;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns every event into a [`LogEvent`]
/// and fires it through a [`JournalHook`].
///
/// Submission happens synchronously on the emitting thread. Failures
/// cannot be returned from a layer, so they are printed to stderr and
/// counted instead.
pub struct JournalLayer<S> {
    hook: JournalHook<S>,
    /// Events handed to the sink successfully.
    pub submitted_events: Arc<AtomicU64>,
    /// Events the sink rejected.
    pub failed_events: Arc<AtomicU64>,
}

impl<S: JournalSink> JournalLayer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            hook: JournalHook::new(sink),
            submitted_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn hook(&self) -> &JournalHook<S> {
        &self.hook
    }
}

impl<S, R> Layer<R> for JournalLayer<S>
where
    S: JournalSink + 'static,
    R: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, R>) {
        let meta = event.metadata();

        let mut data = HashMap::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor { fields: &mut data, message: &mut message };
        event.record(&mut visitor);

        data.insert(
            "target".to_string(),
            serde_json::Value::String(meta.target().to_string()),
        );

        let caller = CallSite {
            file: meta.file().unwrap_or_default().to_string(),
            line: meta.line().unwrap_or(0),
            function: String::new(),
        };

        let log_event = LogEvent {
            message: message.unwrap_or_default(),
            severity: Severity::from(meta.level()),
            data,
            caller: Some(caller),
        };

        match self.hook.fire(&log_event) {
            Ok(()) => {
                self.submitted_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                // Logging through tracing here would re-enter this layer.
                eprintln!("failed to forward event to journal: {}", e);
            }
        }
    }
}

use tracing::field::{Field, Visit};

pub struct FieldVisitor<'a> {
    pub fields: &'a mut HashMap<String, serde_json::Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // JSON has no NaN or infinity; keep their printed form.
        let value = if value.is_finite() {
            serde_json::Value::from(value)
        } else {
            serde_json::Value::String(value.to_string())
        };
        self.fields.insert(field.name().to_string(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}
