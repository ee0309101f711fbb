//! Builds the in-memory engine this CLI drives. The CLI has no persistence
//! layer of its own (unlike the engine's store traits, which a real
//! deployment backs with a database) — each invocation seeds a fresh
//! engine, so it's useful for smoke-testing the boundary operations and
//! scripting demos, not for operating a long-lived deployment from the
//! command line.

use std::sync::Arc;

use workflow_authz::AuthzResolver;
use workflow_config::EngineConfig;
use workflow_engine::{InMemoryInstanceStore, WorkflowEngine};
use workflow_events::{CompositeEventSink, LoggingEventSink};
use workflow_model::store::{
    InMemoryAssignmentRegistryStore, InMemoryAuthzStore, InMemoryTemplateStore,
};
use workflow_model::InMemoryTransferStore;

pub struct DemoEngine {
    pub engine: WorkflowEngine<InMemoryAuthzStore>,
}

impl DemoEngine {
    pub fn new() -> Self {
        let events = Arc::new(CompositeEventSink::new().with_sink(Box::new(LoggingEventSink::new())));
        let engine = WorkflowEngine::new(
            Arc::new(InMemoryTemplateStore::new()),
            Arc::new(InMemoryAssignmentRegistryStore::new()),
            Arc::new(InMemoryInstanceStore::new()),
            Arc::new(InMemoryTransferStore::new()),
            AuthzResolver::new(Arc::new(InMemoryAuthzStore::new())),
            EngineConfig::load(),
            events,
        );
        Self { engine }
    }
}

impl Default for DemoEngine {
    fn default() -> Self {
        Self::new()
    }
}
