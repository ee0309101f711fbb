use std::sync::Arc;

use workflow_api::{ApiServer, AppState};
use workflow_authz::AuthzResolver;
use workflow_config::EngineConfig;
use workflow_engine::{InMemoryInstanceStore, WorkflowEngine};
use workflow_events::{BroadcastEventSink, CompositeEventSink, LoggingEventSink, WebhookEventSink};
use workflow_model::store::{
    InMemoryAssignmentRegistryStore, InMemoryAuthzStore, InMemoryTemplateStore,
};
use workflow_model::InMemoryTransferStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = EngineConfig::load();

    let mut sinks = CompositeEventSink::new().with_sink(Box::new(LoggingEventSink::new()));
    if let Some(url) = config.events.webhook_url.clone() {
        let webhook = WebhookEventSink::new(
            url,
            config.events.webhook_timeout_ms,
            config.events.webhook_retries,
        )?;
        sinks = sinks.with_sink(Box::new(webhook));
    }
    let broadcast = Arc::new(BroadcastEventSink::new(1024));
    sinks = sinks.with_sink(Box::new(BroadcastForwarder(broadcast.clone())));

    let engine = Arc::new(WorkflowEngine::new(
        Arc::new(InMemoryTemplateStore::new()),
        Arc::new(InMemoryAssignmentRegistryStore::new()),
        Arc::new(InMemoryInstanceStore::new()),
        Arc::new(InMemoryTransferStore::new()),
        AuthzResolver::new(Arc::new(InMemoryAuthzStore::new())),
        config,
        Arc::new(sinks),
    ));

    let state = AppState { engine, broadcast };
    let addr = std::env::var("WORKFLOW_API_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    ApiServer::new(state).serve(&addr).await
}

/// Forwards every published event into the websocket broadcast channel so
/// it composes with the logging/webhook sinks above rather than replacing
/// them.
struct BroadcastForwarder(Arc<BroadcastEventSink>);

#[async_trait::async_trait]
impl workflow_events::EventSink for BroadcastForwarder {
    async fn publish(&self, event: workflow_events::EventEnvelope) {
        self.0.publish(event).await;
    }
}
