//! Runtime storage for workflow/stage instances, assignments, actions, and
//! delegations — the mutable side of §6.3's persisted state layout. Kept
//! separate from `workflow_model::store` because these records are owned
//! by the engine itself, not shared with `workflow-authz`.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use workflow_model::{
    Action, Assignment, Delegation, StageInstanceId, TransferId, WorkflowInstance,
    WorkflowInstanceId, WorkflowStageInstance,
};

#[async_trait]
pub trait InstanceStore: Send + Sync {
    async fn next_workflow_instance_id(&self) -> WorkflowInstanceId;
    async fn next_stage_instance_id(&self) -> StageInstanceId;
    async fn next_assignment_id(&self) -> workflow_model::AssignmentId;
    async fn next_action_id(&self) -> workflow_model::ActionId;
    async fn next_delegation_id(&self) -> workflow_model::DelegationId;

    async fn put_workflow_instance(&self, instance: WorkflowInstance);
    async fn get_workflow_instance(&self, id: WorkflowInstanceId) -> Option<WorkflowInstance>;
    async fn workflow_instances_for_transfer(&self, transfer: TransferId) -> Vec<WorkflowInstance>;

    async fn put_stage_instance(&self, stage: WorkflowStageInstance);
    async fn get_stage_instance(&self, id: StageInstanceId) -> Option<WorkflowStageInstance>;
    async fn stage_instances_for_workflow(
        &self,
        workflow: WorkflowInstanceId,
    ) -> Vec<WorkflowStageInstance>;

    async fn put_assignment(&self, assignment: Assignment);
    async fn assignments_for_stage(&self, stage: StageInstanceId) -> Vec<Assignment>;
    async fn assignments_for_user(&self, user: workflow_model::UserId) -> Vec<Assignment>;
    async fn remove_assignment(&self, id: workflow_model::AssignmentId);

    async fn put_action(&self, action: Action);
    async fn actions_for_stage(&self, stage: StageInstanceId) -> Vec<Action>;
    async fn actions_for_user(&self, user: workflow_model::UserId) -> Vec<Action>;

    async fn put_delegation(&self, delegation: Delegation);
    async fn delegations_for_stage(&self, stage: StageInstanceId) -> Vec<Delegation>;
}

#[derive(Default)]
pub struct InMemoryInstanceStore {
    next_workflow_instance: workflow_model::IdSequence,
    next_stage_instance: workflow_model::IdSequence,
    next_assignment: workflow_model::IdSequence,
    next_action: workflow_model::IdSequence,
    next_delegation: workflow_model::IdSequence,

    workflow_instances: RwLock<HashMap<WorkflowInstanceId, WorkflowInstance>>,
    stage_instances: RwLock<HashMap<StageInstanceId, WorkflowStageInstance>>,
    assignments: RwLock<HashMap<workflow_model::AssignmentId, Assignment>>,
    actions: RwLock<Vec<Action>>,
    delegations: RwLock<Vec<Delegation>>,
}

impl InMemoryInstanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InstanceStore for InMemoryInstanceStore {
    async fn next_workflow_instance_id(&self) -> WorkflowInstanceId {
        WorkflowInstanceId(self.next_workflow_instance.next())
    }

    async fn next_stage_instance_id(&self) -> StageInstanceId {
        StageInstanceId(self.next_stage_instance.next())
    }

    async fn next_assignment_id(&self) -> workflow_model::AssignmentId {
        workflow_model::AssignmentId(self.next_assignment.next())
    }

    async fn next_action_id(&self) -> workflow_model::ActionId {
        workflow_model::ActionId(self.next_action.next())
    }

    async fn next_delegation_id(&self) -> workflow_model::DelegationId {
        workflow_model::DelegationId(self.next_delegation.next())
    }

    async fn put_workflow_instance(&self, instance: WorkflowInstance) {
        self.workflow_instances
            .write()
            .await
            .insert(instance.id, instance);
    }

    async fn get_workflow_instance(&self, id: WorkflowInstanceId) -> Option<WorkflowInstance> {
        self.workflow_instances.read().await.get(&id).cloned()
    }

    async fn workflow_instances_for_transfer(&self, transfer: TransferId) -> Vec<WorkflowInstance> {
        let mut out: Vec<_> = self
            .workflow_instances
            .read()
            .await
            .values()
            .filter(|w| w.transfer_id == transfer)
            .cloned()
            .collect();
        out.sort_by_key(|w| w.execution_order);
        out
    }

    async fn put_stage_instance(&self, stage: WorkflowStageInstance) {
        self.stage_instances.write().await.insert(stage.id, stage);
    }

    async fn get_stage_instance(&self, id: StageInstanceId) -> Option<WorkflowStageInstance> {
        self.stage_instances.read().await.get(&id).cloned()
    }

    async fn stage_instances_for_workflow(
        &self,
        workflow: WorkflowInstanceId,
    ) -> Vec<WorkflowStageInstance> {
        let mut out: Vec<_> = self
            .stage_instances
            .read()
            .await
            .values()
            .filter(|s| s.workflow_instance_id == workflow)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.order_index);
        out
    }

    async fn put_assignment(&self, assignment: Assignment) {
        self.assignments
            .write()
            .await
            .insert(assignment.id, assignment);
    }

    async fn assignments_for_stage(&self, stage: StageInstanceId) -> Vec<Assignment> {
        self.assignments
            .read()
            .await
            .values()
            .filter(|a| a.stage_instance_id == stage)
            .cloned()
            .collect()
    }

    async fn assignments_for_user(&self, user: workflow_model::UserId) -> Vec<Assignment> {
        self.assignments
            .read()
            .await
            .values()
            .filter(|a| a.user_id == user)
            .cloned()
            .collect()
    }

    async fn remove_assignment(&self, id: workflow_model::AssignmentId) {
        self.assignments.write().await.remove(&id);
    }

    async fn put_action(&self, action: Action) {
        self.actions.write().await.push(action);
    }

    async fn actions_for_stage(&self, stage: StageInstanceId) -> Vec<Action> {
        let mut out: Vec<_> = self
            .actions
            .read()
            .await
            .iter()
            .filter(|a| a.stage_instance_id == stage)
            .cloned()
            .collect();
        out.sort_by_key(|a| a.created_at);
        out
    }

    async fn actions_for_user(&self, user: workflow_model::UserId) -> Vec<Action> {
        self.actions
            .read()
            .await
            .iter()
            .filter(|a| a.user_id == Some(user))
            .cloned()
            .collect()
    }

    async fn put_delegation(&self, delegation: Delegation) {
        self.delegations.write().await.push(delegation);
    }

    async fn delegations_for_stage(&self, stage: StageInstanceId) -> Vec<Delegation> {
        self.delegations
            .read()
            .await
            .iter()
            .filter(|d| d.stage_instance_id == stage)
            .cloned()
            .collect()
    }
}
