use async_trait::async_trait;

use crate::event::EventEnvelope;

/// Destination for engine events. Implementations must not fail the
/// triggering engine call: the engine drains events from its outbox and
/// publishes them after the mutation is already committed and its lock
/// released, so a sink error only means the notification itself is lost,
/// never the state change.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: EventEnvelope);
}

/// Fans an event out to every registered sink. Used when an engine wants to
/// log and webhook and broadcast the same event.
#[derive(Default)]
pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn publish(&self, event: EventEnvelope) {
        for sink in &self.sinks {
            sink.publish(event.clone()).await;
        }
    }
}
