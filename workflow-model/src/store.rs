//! In-memory storage traits for template, registry, authorization, and
//! instance data. `spec.md` §5 calls these out as the persisted-state seams
//! (§6.3); a real deployment swaps these for database-backed implementations
//! without the engine crate changing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::authz::{SecurityGroup, SecurityGroupRole, UserGroupMembership, UserSegmentAbility};
use crate::ids::{SecurityGroupId, SecurityGroupRoleId, StageTemplateId, TemplateId, UserId};
use crate::registry::WorkflowTemplateAssignment;
use crate::template::{WorkflowStageTemplate, WorkflowTemplate};

/// Monotonically increasing id allocator shared by the in-memory stores.
/// A database-backed store would use the primary key sequence instead.
#[derive(Debug, Default)]
pub struct IdSequence(AtomicU64);

impl IdSequence {
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn get_template(&self, id: TemplateId) -> Option<WorkflowTemplate>;
    async fn put_template(&self, template: WorkflowTemplate);
    async fn stages_for_template(&self, id: TemplateId) -> Vec<WorkflowStageTemplate>;
    async fn get_stage(&self, id: StageTemplateId) -> Option<WorkflowStageTemplate>;
    async fn put_stage(&self, stage: WorkflowStageTemplate);
}

#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: RwLock<HashMap<TemplateId, WorkflowTemplate>>,
    stages: RwLock<HashMap<StageTemplateId, WorkflowStageTemplate>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn get_template(&self, id: TemplateId) -> Option<WorkflowTemplate> {
        self.templates.read().await.get(&id).cloned()
    }

    async fn put_template(&self, template: WorkflowTemplate) {
        self.templates.write().await.insert(template.id, template);
    }

    async fn stages_for_template(&self, id: TemplateId) -> Vec<WorkflowStageTemplate> {
        let mut stages: Vec<_> = self
            .stages
            .read()
            .await
            .values()
            .filter(|s| s.template_id == id)
            .cloned()
            .collect();
        stages.sort_by_key(|s| s.order_index);
        stages
    }

    async fn get_stage(&self, id: StageTemplateId) -> Option<WorkflowStageTemplate> {
        self.stages.read().await.get(&id).cloned()
    }

    async fn put_stage(&self, stage: WorkflowStageTemplate) {
        self.stages.write().await.insert(stage.id, stage);
    }
}

#[async_trait]
pub trait AssignmentRegistryStore: Send + Sync {
    async fn assignments_for_group(
        &self,
        group: SecurityGroupId,
    ) -> Vec<WorkflowTemplateAssignment>;
    async fn put_assignment(&self, assignment: WorkflowTemplateAssignment);
    async fn replace_all(&self, assignments: Vec<WorkflowTemplateAssignment>);
}

#[derive(Debug, Default)]
pub struct InMemoryAssignmentRegistryStore {
    assignments: RwLock<Vec<WorkflowTemplateAssignment>>,
}

impl InMemoryAssignmentRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssignmentRegistryStore for InMemoryAssignmentRegistryStore {
    async fn assignments_for_group(
        &self,
        group: SecurityGroupId,
    ) -> Vec<WorkflowTemplateAssignment> {
        let mut out: Vec<_> = self
            .assignments
            .read()
            .await
            .iter()
            .filter(|a| a.security_group == group)
            .cloned()
            .collect();
        out.sort_by_key(|a| a.execution_order);
        out
    }

    async fn put_assignment(&self, assignment: WorkflowTemplateAssignment) {
        self.assignments.write().await.push(assignment);
    }

    async fn replace_all(&self, assignments: Vec<WorkflowTemplateAssignment>) {
        *self.assignments.write().await = assignments;
    }
}

/// Security-group/role/membership/segment-ability data. Split from
/// `TemplateStore`/`AssignmentRegistryStore` because `workflow-authz`
/// depends only on this trait, not on template or instance data.
#[async_trait]
pub trait AuthzStore: Send + Sync {
    async fn group(&self, id: SecurityGroupId) -> Option<SecurityGroup>;
    async fn role(&self, id: SecurityGroupRoleId) -> Option<SecurityGroupRole>;
    async fn roles_for_group(&self, group: SecurityGroupId) -> Vec<SecurityGroupRole>;
    async fn memberships_for_user(&self, user: UserId) -> Vec<UserGroupMembership>;
    async fn memberships_for_group(&self, group: SecurityGroupId) -> Vec<UserGroupMembership>;
    async fn segment_abilities_for_user(&self, user: UserId) -> Vec<UserSegmentAbility>;

    async fn put_group(&self, group: SecurityGroup);
    async fn put_role(&self, role: SecurityGroupRole);
    async fn put_membership(&self, membership: UserGroupMembership);
    async fn put_segment_ability(&self, ability: UserSegmentAbility);
}

#[derive(Debug, Default)]
pub struct InMemoryAuthzStore {
    groups: RwLock<HashMap<SecurityGroupId, SecurityGroup>>,
    roles: RwLock<HashMap<SecurityGroupRoleId, SecurityGroupRole>>,
    memberships: RwLock<Vec<UserGroupMembership>>,
    segment_abilities: RwLock<Vec<UserSegmentAbility>>,
}

impl InMemoryAuthzStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthzStore for InMemoryAuthzStore {
    async fn group(&self, id: SecurityGroupId) -> Option<SecurityGroup> {
        self.groups.read().await.get(&id).cloned()
    }

    async fn role(&self, id: SecurityGroupRoleId) -> Option<SecurityGroupRole> {
        self.roles.read().await.get(&id).cloned()
    }

    async fn roles_for_group(&self, group: SecurityGroupId) -> Vec<SecurityGroupRole> {
        self.roles
            .read()
            .await
            .values()
            .filter(|r| r.security_group_id == group)
            .cloned()
            .collect()
    }

    async fn memberships_for_user(&self, user: UserId) -> Vec<UserGroupMembership> {
        self.memberships
            .read()
            .await
            .iter()
            .filter(|m| m.user_id == user)
            .cloned()
            .collect()
    }

    async fn memberships_for_group(&self, group: SecurityGroupId) -> Vec<UserGroupMembership> {
        self.memberships
            .read()
            .await
            .iter()
            .filter(|m| m.security_group_id == group)
            .cloned()
            .collect()
    }

    async fn segment_abilities_for_user(&self, user: UserId) -> Vec<UserSegmentAbility> {
        self.segment_abilities
            .read()
            .await
            .iter()
            .filter(|a| a.user_id == user)
            .cloned()
            .collect()
    }

    async fn put_group(&self, group: SecurityGroup) {
        self.groups.write().await.insert(group.id, group);
    }

    async fn put_role(&self, role: SecurityGroupRole) {
        self.roles.write().await.insert(role.id, role);
    }

    async fn put_membership(&self, membership: UserGroupMembership) {
        self.memberships.write().await.push(membership);
    }

    async fn put_segment_ability(&self, ability: UserSegmentAbility) {
        self.segment_abilities.write().await.push(ability);
    }
}

/// Allocates the next id for assignment and stage-instance records so the
/// engine doesn't need to own its own counters. Deliberately not part of
/// `TemplateStore`/`AssignmentRegistryStore` above: workflow/stage instance
/// and assignment/action/delegation ids live in `workflow-engine`'s own
/// `InstanceStore`, defined there so this crate stays storage-shape-only.
#[derive(Debug, Default)]
pub struct IdAllocators {
    pub stage_instance: IdSequence,
    pub assignment: IdSequence,
    pub action: IdSequence,
    pub delegation: IdSequence,
    pub workflow_instance: IdSequence,
}

/// Dense renumbering helper used both by the assignment registry's "bulk
/// reassign" admin operation and by the engine when it builds a transfer's
/// workflow chain from the selected assignment subset: `execution_order`
/// values become `1..=n` in their existing relative order, independent of
/// whatever gaps the source ordering had.
pub fn renumber_densely(mut items: Vec<WorkflowTemplateAssignment>) -> Vec<WorkflowTemplateAssignment> {
    items.sort_by_key(|a| a.execution_order);
    for (i, item) in items.iter_mut().enumerate() {
        item.execution_order = (i + 1) as u32;
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TransferType;

    #[tokio::test]
    async fn template_store_round_trips_stages_sorted_by_order() {
        let store = InMemoryTemplateStore::new();
        store
            .put_template(WorkflowTemplate {
                id: TemplateId(1),
                code: "FAR".to_string(),
                transfer_type: TransferType::StandardAdjustment,
                name: "FAR workflow".to_string(),
                version: 1,
                is_active: true,
                allow_withdraw: true,
                allow_reopen: false,
            })
            .await;
        for order in [2u32, 1, 3] {
            store
                .put_stage(crate::template::WorkflowStageTemplate {
                    id: StageTemplateId(order as u64),
                    template_id: TemplateId(1),
                    order_index: order,
                    name: format!("stage {order}"),
                    decision_policy: crate::template::DecisionPolicy::All,
                    quorum_count: None,
                    allow_reject: true,
                    allow_delegate: true,
                    sla_hours: None,
                    required_role: None,
                    required_user_level: None,
                    parallel_group: None,
                })
                .await;
        }

        let stages = store.stages_for_template(TemplateId(1)).await;
        let orders: Vec<u32> = stages.iter().map(|s| s.order_index).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn renumber_densely_closes_gaps_preserving_relative_order() {
        let items = vec![
            WorkflowTemplateAssignment {
                security_group: SecurityGroupId(1),
                workflow_template: TemplateId(1),
                execution_order: 10,
                transaction_code_filter: None,
            },
            WorkflowTemplateAssignment {
                security_group: SecurityGroupId(1),
                workflow_template: TemplateId(2),
                execution_order: 30,
                transaction_code_filter: None,
            },
        ];
        let renumbered = renumber_densely(items);
        assert_eq!(renumbered[0].execution_order, 1);
        assert_eq!(renumbered[1].execution_order, 2);
        assert_eq!(renumbered[0].workflow_template, TemplateId(1));
    }
}
