//! Runtime instances: `spec.md` §3.1 `WorkflowInstance` / `WorkflowStageInstance`.

use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

use crate::ids::{StageInstanceId, StageTemplateId, TemplateId, TransferId, WorkflowInstanceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    InProgress,
    Approved,
    Rejected,
    Cancelled,
}

impl WorkflowStatus {
    /// Terminal statuses are monotone: once reached, never reverted.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WorkflowStatus::Approved | WorkflowStatus::Rejected | WorkflowStatus::Cancelled
        )
    }
}

/// One workflow (one template's traversal) within a transfer's chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInstance {
    pub id: WorkflowInstanceId,
    pub transfer_id: TransferId,
    pub template_id: TemplateId,
    /// 1..n, dense and gapless within a transfer's chain.
    pub execution_order: u32,
    pub status: WorkflowStatus,
    /// Convenience pointer to the first stage template activated in the
    /// current order group; `None` before activation or after completion.
    pub current_stage_template: Option<StageTemplateId>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl WorkflowInstance {
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            WorkflowStatus::Pending | WorkflowStatus::InProgress
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageInstanceStatus {
    Pending,
    Active,
    Completed,
    Skipped,
    Cancelled,
}

impl StageInstanceStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StageInstanceStatus::Completed
                | StageInstanceStatus::Skipped
                | StageInstanceStatus::Cancelled
        )
    }
}

/// A concrete, runtime stage tied to its template and parent workflow
/// instance. Multiple stage instances of one workflow may be simultaneously
/// `Active` only if they share `stage_template.order_index` (the active
/// order group).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStageInstance {
    pub id: StageInstanceId,
    pub workflow_instance_id: WorkflowInstanceId,
    pub stage_template_id: StageTemplateId,
    /// Snapshot of the stage template's `order_index` at activation time, so
    /// group evaluation does not need to dereference the template store on
    /// every read (and survives a template edit mid-flight).
    pub order_index: u32,
    pub status: StageInstanceStatus,
    pub activated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_workflow_statuses_are_monotone_by_construction() {
        assert!(WorkflowStatus::Approved.is_terminal());
        assert!(WorkflowStatus::Rejected.is_terminal());
        assert!(WorkflowStatus::Cancelled.is_terminal());
        assert!(!WorkflowStatus::Pending.is_terminal());
        assert!(!WorkflowStatus::InProgress.is_terminal());
    }
}
