use std::sync::Arc;

use workflow_engine::WorkflowEngine;
use workflow_events::BroadcastEventSink;
use workflow_model::store::InMemoryAuthzStore;

/// Shared application state, the same shape as `atomic-api`'s `AppState`:
/// one `Arc`-wrapped handle cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<WorkflowEngine<InMemoryAuthzStore>>,
    pub broadcast: Arc<BroadcastEventSink>,
}
