//! Tracing layer that mirrors every diagnostic event into a [`LogStore`].
//!
//! Application code logs through `tracing` as usual. The subscriber stack
//! carries both the console/file fmt layer and this layer, so each event is
//! written to the normal sink and captured for the admin log panel.

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::log_store::{format_args_message, LogLevel, LogStore};
use crate::logging;

/// Map a tracing level to a stored level. TRACE folds into `debug`.
pub fn level_for(level: &Level) -> LogLevel {
    match *level {
        Level::ERROR => LogLevel::Error,
        Level::WARN => LogLevel::Warn,
        Level::INFO => LogLevel::Info,
        _ => LogLevel::Debug,
    }
}

/// `tracing_subscriber` layer appending each event to a shared store.
#[derive(Debug, Clone)]
pub struct LogCaptureLayer {
    store: LogStore,
}

impl LogCaptureLayer {
    pub fn new(store: LogStore) -> Self {
        Self { store }
    }
}

impl<S: Subscriber> Layer<S> for LogCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let message = match visitor.message {
            Some(message) => message,
            None => format_args_message(&visitor.args),
        };

        let mut meta = visitor.fields;
        meta.insert(
            logging::TARGET.to_string(),
            Value::String(metadata.target().to_string()),
        );

        self.store
            .append(level_for(metadata.level()), message, Some(meta));
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    /// Non-message field values in the order they were written.
    args: Vec<Value>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        let name = field.name();
        // Bridged `log` records carry their own metadata fields.
        if name.starts_with("log.") {
            return;
        }
        if name == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.args.push(value.clone());
            self.fields.insert(name.to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, Value::String(format!("{:?}", value)));
    }
}
