//! Test capture mode for deterministic logging assertions
//!
//! A `tracing` layer that records every event in memory so tests can assert
//! on the boundary events emitted around capture, retention and history
//! operations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// A captured log event with all its fields rendered as strings
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    /// Look up a rendered field value
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct FieldCollector(HashMap<String, String>);

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

struct CaptureLayer {
    sink: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        let fields = collector.0;

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            op: fields.get("op").cloned(),
            event: fields.get("event").cloned(),
            fields,
        };

        if let Ok(mut sink) = self.sink.lock() {
            sink.push(captured);
        }
    }
}

/// Handle for reading captured events in tests
#[derive(Clone)]
pub struct TestCapture {
    sink: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    /// Snapshot of every captured event so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.sink.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events emitted for one operation name
    pub fn events_for(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op.as_deref() == Some(op))
            .collect()
    }

    /// Events emitted for one operation whose field `key` equals `value`
    ///
    /// The capture is process-global, so tests running in parallel narrow
    /// their assertions with a field they own (usually `instance_type`).
    pub fn events_where(&self, op: &str, key: &str, value: &str) -> Vec<CapturedEvent> {
        self.events_for(op)
            .into_iter()
            .filter(|e| e.field(key) == Some(value))
            .collect()
    }

    /// Assert that an event exists with the given operation and event name
    ///
    /// # Panics
    ///
    /// Panics if no such event was captured.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let found = self
            .events_for(op)
            .iter()
            .any(|e| e.event.as_deref() == Some(event));
        assert!(found, "expected event op={} event={} was not captured", op, event);
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber (once per process)
/// and return a handle to it.
///
/// # Example
///
/// ```
/// use revisor_core::logging_facility::test_capture::init_test_capture;
/// use revisor_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("history_list");
/// capture.assert_event_exists("history_list", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let sink = Arc::new(Mutex::new(Vec::new()));
            let layer = CaptureLayer { sink: sink.clone() };
            tracing_subscriber::registry().with(layer).init();
            TestCapture { sink }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        let mut fields = HashMap::new();
        fields.insert("instance_type".to_string(), "Post".to_string());
        let event = CapturedEvent {
            level: Level::INFO,
            op: Some("revision_capture".to_string()),
            event: Some("start".to_string()),
            fields,
        };

        assert_eq!(event.field("instance_type"), Some("Post"));
        assert_eq!(event.field("missing"), None);
    }
}
