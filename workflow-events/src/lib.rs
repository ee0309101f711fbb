//! Event sink abstraction (`spec.md` §4.6, component C6) and its transports.

pub mod broadcast;
pub mod event;
pub mod logging;
pub mod sink;
pub mod webhook;

pub use broadcast::BroadcastEventSink;
pub use event::{EngineEvent, EventEnvelope};
pub use logging::LoggingEventSink;
pub use sink::{CompositeEventSink, EventSink};
pub use webhook::WebhookEventSink;
