//! In-memory span capture.
//!
//! [`InMemorySpanLayer`] records every closed span into a
//! [`SharedSpanStorage`], keyed by span name. Tests use it to check which
//! spans a conversation opened and with which fields.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use serde::Serialize;
use tracing::{Id, Subscriber};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

/// A closed span.
#[derive(Debug, Clone, Serialize)]
pub struct SpanData {
    /// Span id as 16 hex digits.
    #[serde(rename = "span_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "parent_span_id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Nanoseconds since the Unix epoch.
    pub start_time: u128,
    pub end_time: u128,
    pub attributes: HashMap<String, serde_json::Value>,
}

/// Shared storage for captured spans.
#[derive(Debug, Clone, Default)]
pub struct SharedSpanStorage {
    spans: Arc<RwLock<HashMap<String, Vec<SpanData>>>>,
}

impl SharedSpanStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// All closed spans called `name`, in closing order.
    pub fn spans(&self, name: &str) -> Vec<SpanData> {
        self.spans.read().map(|s| s.get(name).cloned().unwrap_or_default()).unwrap_or_default()
    }

    /// Number of closed spans of any name.
    pub fn len(&self) -> usize {
        self.spans.read().map(|s| s.values().map(Vec::len).sum()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn add_span(&self, span: SpanData) {
        if let Ok(mut spans) = self.spans.write() {
            spans.entry(span.name.clone()).or_default().push(span);
        }
    }
}

/// A tracing layer that captures spans in memory.
pub struct InMemorySpanLayer {
    storage: SharedSpanStorage,
}

impl InMemorySpanLayer {
    pub fn new(storage: SharedSpanStorage) -> Self {
        Self { storage }
    }
}

struct SpanFields(HashMap<String, serde_json::Value>);

struct StartTime(u128);

fn now_nanos() -> u128 {
    SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().as_nanos()
}

impl<S> Layer<S> for InMemorySpanLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut visitor = JsonVisitor::default();
        attrs.record(&mut visitor);

        let mut extensions = span.extensions_mut();
        extensions.insert(StartTime(now_nanos()));
        extensions.insert(SpanFields(visitor.0));
    }

    fn on_record(&self, id: &Id, values: &tracing::span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<SpanFields>() {
            let mut visitor = JsonVisitor::default();
            values.record(&mut visitor);
            fields.0.extend(visitor.0);
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else { return };
        let extensions = span.extensions();

        self.storage.add_span(SpanData {
            id: format!("{:016x}", id.into_u64()),
            name: span.metadata().name().to_string(),
            parent_id: span.parent().map(|p| format!("{:016x}", p.id().into_u64())),
            start_time: extensions.get::<StartTime>().map_or(0, |t| t.0),
            end_time: now_nanos(),
            attributes: extensions.get::<SpanFields>().map(|f| f.0.clone()).unwrap_or_default(),
        });
    }
}

#[derive(Default)]
struct JsonVisitor(HashMap<String, serde_json::Value>);

impl tracing::field::Visit for JsonVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::Value::Bool(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }
}
