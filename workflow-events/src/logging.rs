use async_trait::async_trait;

use crate::event::EventEnvelope;
use crate::sink::EventSink;

/// Always-on sink that records every event via `tracing`. Every deployment
/// wires this in regardless of which other sinks are configured, the same
/// way `atomic-api` always initializes `tracing_subscriber` before standing
/// up its routers.
#[derive(Debug, Default)]
pub struct LoggingEventSink;

impl LoggingEventSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn publish(&self, event: EventEnvelope) {
        tracing::info!(
            idempotency_key = %event.idempotency_key,
            occurred_at = %event.occurred_at,
            "{:?}", event.event
        );
    }
}
