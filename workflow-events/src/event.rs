//! `EngineEvent`: notifications the engine emits after committing a state
//! change. Tagged the same way `atomic-api`'s `MessagePayload` tags its
//! websocket frames, so API and CLI consumers can match on `type`.

use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

use workflow_model::{StageInstanceId, TransferId, UserId, WorkflowInstanceId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EngineEvent {
    StageActivated {
        workflow_instance_id: WorkflowInstanceId,
        stage_instance_id: StageInstanceId,
        transfer_id: TransferId,
    },
    StageAutoSkipped {
        workflow_instance_id: WorkflowInstanceId,
        stage_instance_id: StageInstanceId,
        transfer_id: TransferId,
        reason: String,
    },
    StageCompleted {
        workflow_instance_id: WorkflowInstanceId,
        stage_instance_id: StageInstanceId,
        transfer_id: TransferId,
        approved: bool,
    },
    WorkflowApproved {
        workflow_instance_id: WorkflowInstanceId,
        transfer_id: TransferId,
    },
    WorkflowRejected {
        workflow_instance_id: WorkflowInstanceId,
        transfer_id: TransferId,
        rejected_by: Option<UserId>,
    },
    WorkflowCancelled {
        workflow_instance_id: WorkflowInstanceId,
        transfer_id: TransferId,
    },
    TransferTerminal {
        transfer_id: TransferId,
        approved: bool,
    },
    SlaBreached {
        workflow_instance_id: WorkflowInstanceId,
        stage_instance_id: StageInstanceId,
        transfer_id: TransferId,
    },
    /// A hold-release transfer was rejected while it still had an unused
    /// balance; `amount` is owed back to the originating fund.
    HoldReleaseReturned {
        transfer_id: TransferId,
        amount: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Deterministic so repeated delivery attempts (webhook retries, a sink
    /// replaying an outbox) can be deduplicated downstream: built from the
    /// event's own identifying fields rather than a random uuid.
    pub idempotency_key: String,
    pub occurred_at: DateTime<Utc>,
    pub event: EngineEvent,
}

impl EngineEvent {
    pub fn into_envelope(self, occurred_at: DateTime<Utc>) -> EventEnvelope {
        let idempotency_key = self.idempotency_key();
        EventEnvelope {
            idempotency_key,
            occurred_at,
            event: self,
        }
    }

    fn idempotency_key(&self) -> String {
        match self {
            EngineEvent::StageActivated {
                stage_instance_id, ..
            } => format!("stage-activated:{stage_instance_id}"),
            EngineEvent::StageAutoSkipped {
                stage_instance_id, ..
            } => format!("stage-auto-skipped:{stage_instance_id}"),
            EngineEvent::StageCompleted {
                stage_instance_id, ..
            } => format!("stage-completed:{stage_instance_id}"),
            EngineEvent::WorkflowApproved {
                workflow_instance_id,
                ..
            } => format!("workflow-approved:{workflow_instance_id}"),
            EngineEvent::WorkflowRejected {
                workflow_instance_id,
                ..
            } => format!("workflow-rejected:{workflow_instance_id}"),
            EngineEvent::WorkflowCancelled {
                workflow_instance_id,
                ..
            } => format!("workflow-cancelled:{workflow_instance_id}"),
            EngineEvent::TransferTerminal { transfer_id, .. } => {
                format!("transfer-terminal:{transfer_id}")
            }
            EngineEvent::SlaBreached {
                stage_instance_id, ..
            } => format!("sla-breached:{stage_instance_id}"),
            EngineEvent::HoldReleaseReturned { transfer_id, .. } => {
                format!("hold-release-returned:{transfer_id}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotency_key_is_stable_for_the_same_stage() {
        let event = EngineEvent::StageActivated {
            workflow_instance_id: WorkflowInstanceId(1),
            stage_instance_id: StageInstanceId(7),
            transfer_id: TransferId(1),
        };
        assert_eq!(event.idempotency_key(), "stage-activated:7");
    }
}
