//! Custom tracing Layer that writes to the partitioned sink.
//!
//! This layer integrates with the `tracing` crate so applications already
//! instrumented with `tracing::info!` and friends land in the same
//! queryable partition tree as records emitted through [`Logger`]
//! directly.

use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::level::Level;
use crate::logger::Logger;
use crate::record::Callsite;

/// A tracing Layer that routes events into a shared [`Logger`].
///
/// Level mapping: `TRACE` and `DEBUG` → DEBUG, `INFO` → INFO, `WARN` →
/// WARNING, `ERROR` → ERROR. `file`/`line` come from the event metadata;
/// `func` falls back to the event target. Write failures follow the
/// sink's non-propagation policy.
pub struct PartitionedLayer {
    logger: Arc<Logger>,
}

impl PartitionedLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// The logger this layer writes through.
    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }
}

impl<S> Layer<S> for PartitionedLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let level = match *metadata.level() {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warning,
            tracing::Level::INFO => Level::Info,
            _ => Level::Debug,
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let mut msg = visitor.message.unwrap_or_default();
        for (name, value) in &visitor.fields {
            let _ = write!(&mut msg, " {}={}", name, value);
        }

        let callsite = Callsite {
            file: metadata.file().unwrap_or("unknown"),
            line: metadata.line().unwrap_or(0),
            func: metadata.target(),
        };

        self.logger.emit(level, msg, callsite);
    }
}

/// Visitor that extracts the message and remaining fields from an event.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let mut buf = String::new();
        let _ = write!(&mut buf, "{:?}", value);
        if field.name() == "message" {
            self.message = Some(buf);
        } else {
            self.fields.push((field.name().to_string(), buf));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }
}
