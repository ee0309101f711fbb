//! The workflow engine kernel (`spec.md` §4.4, component C4).
//!
//! Grounded on `approvals.managers.ApprovalManager` in the original source:
//! `start_workflow` mirrors creating the first `ApprovalWorkflowInstance` and
//! calling into stage activation; `activate_next` mirrors
//! `_activate_next_stage_internal`; `process_action` mirrors `process_action`
//! and `check_finished_stage`/`_complete_active_stage_group`; `delegate`
//! mirrors `delegate()`. Where the original takes a database row lock via
//! `select_for_update()`, this engine takes the corresponding
//! `WorkflowInstanceId`'s entry in `InstanceLocks`.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use workflow_authz::AuthzResolver;
use workflow_config::EngineConfig;
use workflow_events::{EngineEvent, EventSink};
use workflow_model::store::{AssignmentRegistryStore, AuthzStore, TemplateStore};
use workflow_model::{
    Action, ActionKind, Assignment, AssignmentStatus, DecisionPolicy, Delegation, StageInstanceId,
    StageInstanceStatus, TransferId, TransferRef, TransferStatus, TransferStore, TransferType,
    UserId, WorkflowInstance, WorkflowInstanceId, WorkflowStageInstance, WorkflowStatus,
};

use crate::chain::resolve_chain;
use crate::error::EngineError;
use crate::hold_release;
use crate::instance_store::InstanceStore;
use crate::lock::InstanceLocks;

pub struct WorkflowEngine<A: AuthzStore> {
    pub templates: Arc<dyn TemplateStore>,
    pub registry: Arc<dyn AssignmentRegistryStore>,
    pub instances: Arc<dyn InstanceStore>,
    pub transfers: Arc<dyn TransferStore>,
    pub authz: AuthzResolver<A>,
    pub config: EngineConfig,
    pub events: Arc<dyn EventSink>,
    locks: InstanceLocks,
}

impl<A: AuthzStore> WorkflowEngine<A> {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        registry: Arc<dyn AssignmentRegistryStore>,
        instances: Arc<dyn InstanceStore>,
        transfers: Arc<dyn TransferStore>,
        authz: AuthzResolver<A>,
        config: EngineConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            templates,
            registry,
            instances,
            transfers,
            authz,
            config,
            events,
            locks: InstanceLocks::new(),
        }
    }

    async fn publish_all(&self, events: Vec<EngineEvent>) {
        for event in events {
            self.events.publish(event.into_envelope(Utc::now())).await;
        }
    }

    /// Build a transfer's workflow chain from the assignment registry and
    /// start the first workflow instance in it.
    pub async fn start_workflow(
        &self,
        transfer_id: TransferId,
    ) -> Result<WorkflowInstance, EngineError> {
        let transfer = self
            .transfers
            .get(transfer_id)
            .await
            .ok_or(EngineError::TransferNotFound(transfer_id))?;
        let security_group_id = transfer
            .security_group_id
            .ok_or(EngineError::MissingSecurityGroup(transfer_id))?;

        let chain = resolve_chain(self.registry.as_ref(), &transfer).await;
        if chain.is_empty() {
            return Err(EngineError::NoWorkflowAssigned(transfer_id, security_group_id));
        }

        let mut created = Vec::with_capacity(chain.len());
        for (i, template_id) in chain.iter().enumerate() {
            let template = self
                .templates
                .get_template(*template_id)
                .await
                .ok_or(EngineError::TemplateInactive(*template_id))?;
            if !template.is_active {
                return Err(EngineError::TemplateInactive(*template_id));
            }
            let instance = WorkflowInstance {
                id: self.instances.next_workflow_instance_id().await,
                transfer_id,
                template_id: *template_id,
                execution_order: (i + 1) as u32,
                status: WorkflowStatus::Pending,
                current_stage_template: None,
                started_at: Utc::now(),
                finished_at: None,
            };
            self.instances.put_workflow_instance(instance.clone()).await;
            created.push(instance);
        }

        let first = created.into_iter().next().expect("chain is non-empty");
        let guard = self.locks.acquire(first.id).await;
        let mut events = Vec::new();
        let result = self.activate_next_locked(first.id, &mut events).await;
        drop(guard);
        self.publish_all(events).await;
        result
    }

    /// Activate the next eligible order group of a workflow instance,
    /// auto-skipping groups with no eligible assignees, completing the
    /// instance (and chaining into the next workflow) once no group remains.
    async fn activate_next_locked(
        &self,
        workflow_instance_id: WorkflowInstanceId,
        events: &mut Vec<EngineEvent>,
    ) -> Result<WorkflowInstance, EngineError> {
        let mut instance = self
            .instances
            .get_workflow_instance(workflow_instance_id)
            .await
            .ok_or(EngineError::WorkflowInstanceNotFound(workflow_instance_id))?;

        if instance.status.is_terminal() {
            return Err(EngineError::WorkflowAlreadyTerminal(workflow_instance_id));
        }

        let transfer = self
            .transfers
            .get(instance.transfer_id)
            .await
            .ok_or(EngineError::TransferNotFound(instance.transfer_id))?;

        let stage_templates = self.templates.stages_for_template(instance.template_id).await;
        let existing = self
            .instances
            .stage_instances_for_workflow(workflow_instance_id)
            .await;
        let last_completed_order = existing
            .iter()
            .filter(|s| s.status.is_terminal())
            .map(|s| s.order_index)
            .max();

        let archived = self.config.archived_threshold;
        let mut candidate_orders: Vec<u32> = stage_templates
            .iter()
            .filter(|st| st.order_index < archived)
            .filter(|st| last_completed_order.map_or(true, |last| st.order_index > last))
            .map(|st| st.order_index)
            .collect();
        candidate_orders.sort_unstable();
        candidate_orders.dedup();

        for order in candidate_orders {
            let group: Vec<_> = stage_templates
                .iter()
                .filter(|st| st.order_index == order)
                .collect();

            let mut any_activated = false;
            for stage_template in &group {
                // When the stage names no required_role, fall back to the
                // transfer's own security group (spec.md §4.1 step 1).
                let fallback_group = transfer
                    .security_group_id
                    .ok_or(EngineError::MissingSecurityGroup(instance.transfer_id))?;
                let eligible = self
                    .authz
                    .eligible_users_for_stage(
                        stage_template.required_role,
                        stage_template.required_user_level.as_deref(),
                        fallback_group,
                    )
                    .await?;

                let stage_instance = WorkflowStageInstance {
                    id: self.instances.next_stage_instance_id().await,
                    workflow_instance_id,
                    stage_template_id: stage_template.id,
                    order_index: stage_template.order_index,
                    status: StageInstanceStatus::Active,
                    activated_at: Some(Utc::now()),
                    completed_at: None,
                };

                if eligible.is_empty() {
                    let mut skipped = stage_instance;
                    skipped.status = StageInstanceStatus::Skipped;
                    skipped.completed_at = Some(Utc::now());
                    self.instances.put_stage_instance(skipped.clone()).await;
                    self.instances
                        .put_action(Action {
                            id: self.instances.next_action_id().await,
                            stage_instance_id: skipped.id,
                            user_id: None,
                            assignment_id: None,
                            action: ActionKind::Approve,
                            comment: Some("auto-skipped: no eligible assignees".to_string()),
                            created_at: Utc::now(),
                            triggers_stage_completion: true,
                        })
                        .await;
                    events.push(EngineEvent::StageAutoSkipped {
                        workflow_instance_id,
                        stage_instance_id: skipped.id,
                        transfer_id: instance.transfer_id,
                        reason: "no eligible assignees".to_string(),
                    });
                    continue;
                }

                self.instances.put_stage_instance(stage_instance.clone()).await;
                for user_id in &eligible {
                    self.instances
                        .put_assignment(Assignment {
                            id: self.instances.next_assignment_id().await,
                            stage_instance_id: stage_instance.id,
                            user_id: *user_id,
                            role_snapshot: stage_template
                                .required_role
                                .map(|r| r.0.to_string())
                                .unwrap_or_default(),
                            level_snapshot: stage_template.required_user_level.clone(),
                            is_mandatory: stage_template.decision_policy == DecisionPolicy::All,
                            status: AssignmentStatus::Pending,
                        })
                        .await;
                }
                events.push(EngineEvent::StageActivated {
                    workflow_instance_id,
                    stage_instance_id: stage_instance.id,
                    transfer_id: instance.transfer_id,
                });
                any_activated = true;
            }

            if any_activated {
                instance.status = WorkflowStatus::InProgress;
                instance.current_stage_template = group.first().map(|st| st.id);
                self.instances.put_workflow_instance(instance.clone()).await;
                return Ok(instance);
            }
            // every stage in this group was auto-skipped; continue to the
            // next order group.
        }

        // No stage group remains: the workflow instance is fully approved.
        instance.status = WorkflowStatus::Approved;
        instance.current_stage_template = None;
        instance.finished_at = Some(Utc::now());
        self.instances.put_workflow_instance(instance.clone()).await;
        events.push(EngineEvent::WorkflowApproved {
            workflow_instance_id,
            transfer_id: instance.transfer_id,
        });

        self.advance_chain_or_finish(&instance, &transfer, events)
            .await?;
        Ok(instance)
    }

    async fn advance_chain_or_finish(
        &self,
        instance: &WorkflowInstance,
        transfer: &TransferRef,
        events: &mut Vec<EngineEvent>,
    ) -> Result<(), EngineError> {
        let siblings = self
            .instances
            .workflow_instances_for_transfer(instance.transfer_id)
            .await;
        let next = siblings
            .iter()
            .find(|w| w.execution_order == instance.execution_order + 1);

        match next {
            Some(next) => {
                // Recursing here mirrors the original's direct call into the
                // next `ApprovalWorkflowInstance` once the current one
                // completes, rather than requiring a separate caller-driven
                // step.
                Box::pin(self.activate_next_locked(next.id, events)).await?;
            }
            None => {
                self.transfers
                    .set_status(instance.transfer_id, TransferStatus::Approved)
                    .await;
                events.push(EngineEvent::TransferTerminal {
                    transfer_id: instance.transfer_id,
                    approved: true,
                });
            }
        }
        let _ = transfer;
        Ok(())
    }

    /// Record a user's approve or reject decision on their assignment.
    /// Delegation goes through `delegate` instead, since it needs a target
    /// user the `ActionKind` alone doesn't carry.
    pub async fn process_action(
        &self,
        workflow_instance_id: WorkflowInstanceId,
        user_id: UserId,
        stage_instance_id: StageInstanceId,
        kind: ActionKind,
        comment: Option<String>,
    ) -> Result<(), EngineError> {
        let guard = self.locks.acquire(workflow_instance_id).await;
        let mut events = Vec::new();
        let result = self
            .process_action_locked(
                workflow_instance_id,
                user_id,
                stage_instance_id,
                kind,
                comment,
                &mut events,
            )
            .await;
        drop(guard);
        self.publish_all(events).await;
        result
    }

    async fn process_action_locked(
        &self,
        workflow_instance_id: WorkflowInstanceId,
        user_id: UserId,
        stage_instance_id: StageInstanceId,
        kind: ActionKind,
        comment: Option<String>,
        events: &mut Vec<EngineEvent>,
    ) -> Result<(), EngineError> {
        let instance = self
            .instances
            .get_workflow_instance(workflow_instance_id)
            .await
            .ok_or(EngineError::WorkflowInstanceNotFound(workflow_instance_id))?;
        if instance.status.is_terminal() {
            return Err(EngineError::WorkflowAlreadyTerminal(workflow_instance_id));
        }

        let stage_instance = self
            .instances
            .get_stage_instance(stage_instance_id)
            .await
            .ok_or(EngineError::NoActiveStage(workflow_instance_id))?;
        let stage_template = self
            .templates
            .get_stage(stage_instance.stage_template_id)
            .await
            .ok_or(EngineError::NoActiveStage(workflow_instance_id))?;

        let assignments = self.instances.assignments_for_stage(stage_instance_id).await;
        let assignment = assignments
            .iter()
            .find(|a| a.user_id == user_id)
            .cloned()
            .ok_or(EngineError::NoAssignmentForUser(user_id, stage_instance_id))?;
        if !assignment.is_pending() {
            return Err(EngineError::AssignmentAlreadyDecided(assignment.id));
        }

        if kind == ActionKind::Delegate {
            return Err(EngineError::DelegateViaDedicatedOperation);
        }
        if kind == ActionKind::Reject {
            if !stage_template.allow_reject {
                return Err(EngineError::RejectionNotAllowed(stage_template.id));
            }
            let has_reason = comment.as_deref().is_some_and(|c| !c.trim().is_empty());
            if !has_reason {
                return Err(EngineError::ReasonRequired(stage_template.id));
            }
        }

        let mut decided = assignment.clone();
        decided.status = if kind == ActionKind::Reject {
            AssignmentStatus::Rejected
        } else {
            AssignmentStatus::Approved
        };
        self.instances.put_assignment(decided).await;

        let outcome = self
            .evaluate_stage_group(&instance, stage_instance.order_index)
            .await?;

        self.instances
            .put_action(Action {
                id: self.instances.next_action_id().await,
                stage_instance_id,
                user_id: Some(user_id),
                assignment_id: Some(assignment.id),
                action: kind,
                comment,
                created_at: Utc::now(),
                triggers_stage_completion: outcome.is_some(),
            })
            .await;

        if let Some(group_approved) = outcome {
            self.complete_active_stage_group(
                &instance,
                stage_instance.order_index,
                group_approved,
                events,
            )
            .await?;

            if group_approved {
                Box::pin(self.activate_next_locked(workflow_instance_id, events)).await?;
            } else {
                self.reject_workflow(workflow_instance_id, Some(user_id), events)
                    .await?;
            }
        }

        Ok(())
    }

    /// Evaluate the stage instances sharing `order_index`: `Some(true)` if
    /// the group's decision policy is now satisfied as approved, `Some(false)`
    /// if it is now decided as rejected, `None` if still pending. Any
    /// rejection short-circuits the whole group regardless of policy.
    async fn evaluate_stage_group(
        &self,
        instance: &WorkflowInstance,
        order_index: u32,
    ) -> Result<Option<bool>, EngineError> {
        let stages = self
            .instances
            .stage_instances_for_workflow(instance.id)
            .await;
        let group: Vec<_> = stages
            .iter()
            .filter(|s| s.order_index == order_index && s.status == StageInstanceStatus::Active)
            .collect();

        for stage in &group {
            let assignments = self.instances.assignments_for_stage(stage.id).await;
            if assignments
                .iter()
                .any(|a| a.status == AssignmentStatus::Rejected)
            {
                return Ok(Some(false));
            }

            let stage_template = self
                .templates
                .get_stage(stage.stage_template_id)
                .await
                .ok_or(EngineError::NoActiveStage(instance.id))?;
            let approved_count = assignments
                .iter()
                .filter(|a| a.status == AssignmentStatus::Approved)
                .count();
            let total = assignments.len();

            let this_stage_decided = match stage_template.decision_policy {
                DecisionPolicy::All => approved_count == total,
                DecisionPolicy::Any => approved_count >= 1,
                DecisionPolicy::Quorum => {
                    let quorum = stage_template
                        .quorum_count
                        .ok_or(EngineError::QuorumMisconfigured(stage_template.id))?;
                    if quorum as usize > total {
                        return Err(EngineError::QuorumMisconfigured(stage_template.id));
                    }
                    approved_count >= quorum as usize
                }
            };
            if !this_stage_decided {
                return Ok(None);
            }
        }

        Ok(Some(true))
    }

    async fn complete_active_stage_group(
        &self,
        instance: &WorkflowInstance,
        order_index: u32,
        approved: bool,
        events: &mut Vec<EngineEvent>,
    ) -> Result<(), EngineError> {
        let stages = self
            .instances
            .stage_instances_for_workflow(instance.id)
            .await;
        for mut stage in stages
            .into_iter()
            .filter(|s| s.order_index == order_index && s.status == StageInstanceStatus::Active)
        {
            stage.status = StageInstanceStatus::Completed;
            stage.completed_at = Some(Utc::now());
            self.instances.put_stage_instance(stage.clone()).await;

            for assignment in self.instances.assignments_for_stage(stage.id).await {
                if assignment.is_pending() {
                    self.instances.remove_assignment(assignment.id).await;
                }
            }
            for mut delegation in self.instances.delegations_for_stage(stage.id).await {
                if delegation.active {
                    delegation.deactivate(Utc::now());
                    self.instances.put_delegation(delegation).await;
                }
            }

            events.push(EngineEvent::StageCompleted {
                workflow_instance_id: instance.id,
                stage_instance_id: stage.id,
                transfer_id: instance.transfer_id,
                approved,
            });
        }
        Ok(())
    }

    async fn reject_workflow(
        &self,
        workflow_instance_id: WorkflowInstanceId,
        rejected_by: Option<UserId>,
        events: &mut Vec<EngineEvent>,
    ) -> Result<(), EngineError> {
        let mut instance = self
            .instances
            .get_workflow_instance(workflow_instance_id)
            .await
            .ok_or(EngineError::WorkflowInstanceNotFound(workflow_instance_id))?;
        instance.status = WorkflowStatus::Rejected;
        instance.finished_at = Some(Utc::now());
        self.instances.put_workflow_instance(instance.clone()).await;

        self.transfers
            .set_status(instance.transfer_id, TransferStatus::Rejected)
            .await;

        events.push(EngineEvent::WorkflowRejected {
            workflow_instance_id,
            transfer_id: instance.transfer_id,
            rejected_by,
        });
        events.push(EngineEvent::TransferTerminal {
            transfer_id: instance.transfer_id,
            approved: false,
        });

        // Hold-release transfers return any unused balance to the fund once
        // they reach the rejected terminal state (spec.md §4.4.7).
        if let Some(transfer) = self.transfers.get(instance.transfer_id).await {
            if transfer.transfer_type == TransferType::HoldRelease {
                let accounting = hold_release::accounting_for_hold(self.transfers.as_ref(), &transfer).await;
                if accounting.remaining > 0 {
                    events.push(EngineEvent::HoldReleaseReturned {
                        transfer_id: instance.transfer_id,
                        amount: accounting.remaining,
                    });
                }
            }
        }
        Ok(())
    }

    /// Delegate `from_assignment`'s pending decision on `stage_instance` to
    /// `to_user`. `to_user` must not already hold a pending assignment on
    /// the same stage instance.
    pub async fn delegate(
        &self,
        workflow_instance_id: WorkflowInstanceId,
        stage_instance_id: StageInstanceId,
        from_user: UserId,
        to_user: UserId,
        comment: Option<String>,
    ) -> Result<(), EngineError> {
        let guard = self.locks.acquire(workflow_instance_id).await;
        let mut events = Vec::new();
        let result = self
            .delegate_inner(stage_instance_id, from_user, to_user, comment, &mut events)
            .await;
        drop(guard);
        self.publish_all(events).await;
        result
    }

    async fn delegate_inner(
        &self,
        stage_instance_id: StageInstanceId,
        from_user: UserId,
        to_user: UserId,
        comment: Option<String>,
        _events: &mut [EngineEvent],
    ) -> Result<(), EngineError> {
        let stage_instance = self
            .instances
            .get_stage_instance(stage_instance_id)
            .await
            .ok_or(EngineError::NoAssignmentForUser(from_user, stage_instance_id))?;
        let stage_template = self
            .templates
            .get_stage(stage_instance.stage_template_id)
            .await
            .ok_or(EngineError::NoAssignmentForUser(from_user, stage_instance_id))?;
        if !stage_template.allow_delegate {
            return Err(EngineError::DelegationNotAllowed(stage_template.id));
        }

        let assignments = self.instances.assignments_for_stage(stage_instance_id).await;
        let from_assignment = assignments
            .iter()
            .find(|a| a.user_id == from_user)
            .cloned()
            .ok_or(EngineError::NoAssignmentForUser(from_user, stage_instance_id))?;
        if !from_assignment.is_pending() {
            return Err(EngineError::AssignmentAlreadyDecided(from_assignment.id));
        }
        if from_user == to_user || assignments.iter().any(|a| a.user_id == to_user) {
            return Err(EngineError::InvalidDelegationTarget(to_user, stage_instance_id));
        }

        self.instances
            .put_delegation(Delegation {
                id: self.instances.next_delegation_id().await,
                from_user,
                to_user,
                stage_instance_id,
                active: true,
                created_at: Utc::now(),
                deactivated_at: None,
            })
            .await;

        let mut delegated = from_assignment.clone();
        delegated.status = AssignmentStatus::Delegated;
        self.instances.put_assignment(delegated).await;

        self.instances
            .put_assignment(Assignment {
                id: self.instances.next_assignment_id().await,
                stage_instance_id,
                user_id: to_user,
                role_snapshot: from_assignment.role_snapshot.clone(),
                level_snapshot: from_assignment.level_snapshot.clone(),
                is_mandatory: from_assignment.is_mandatory,
                status: AssignmentStatus::Pending,
            })
            .await;

        self.instances
            .put_action(Action {
                id: self.instances.next_action_id().await,
                stage_instance_id,
                user_id: Some(from_user),
                assignment_id: Some(from_assignment.id),
                action: ActionKind::Delegate,
                comment,
                created_at: Utc::now(),
                triggers_stage_completion: false,
            })
            .await;

        Ok(())
    }

    /// Cancel a workflow instance outright. Per design decision (open
    /// question in `spec.md` §9), cancellation does not cascade to
    /// chained-but-not-yet-reached workflow instances: those stay `Pending`
    /// until an operator explicitly restarts or cancels the whole chain.
    pub async fn cancel_workflow(
        &self,
        workflow_instance_id: WorkflowInstanceId,
    ) -> Result<(), EngineError> {
        let guard = self.locks.acquire(workflow_instance_id).await;
        let mut events = Vec::new();
        let result = self.cancel_workflow_locked(workflow_instance_id, &mut events).await;
        drop(guard);
        self.publish_all(events).await;
        result
    }

    async fn cancel_workflow_locked(
        &self,
        workflow_instance_id: WorkflowInstanceId,
        events: &mut Vec<EngineEvent>,
    ) -> Result<(), EngineError> {
        let mut instance = self
            .instances
            .get_workflow_instance(workflow_instance_id)
            .await
            .ok_or(EngineError::WorkflowInstanceNotFound(workflow_instance_id))?;
        if instance.status.is_terminal() {
            return Err(EngineError::WorkflowAlreadyTerminal(workflow_instance_id));
        }

        for mut stage in self
            .instances
            .stage_instances_for_workflow(workflow_instance_id)
            .await
            .into_iter()
            .filter(|s| !s.status.is_terminal())
        {
            stage.status = StageInstanceStatus::Cancelled;
            stage.completed_at = Some(Utc::now());
            self.instances.put_stage_instance(stage.clone()).await;
            for assignment in self.instances.assignments_for_stage(stage.id).await {
                self.instances.remove_assignment(assignment.id).await;
            }
        }

        instance.status = WorkflowStatus::Cancelled;
        instance.finished_at = Some(Utc::now());
        self.instances.put_workflow_instance(instance.clone()).await;

        events.push(EngineEvent::WorkflowCancelled {
            workflow_instance_id,
            transfer_id: instance.transfer_id,
        });
        Ok(())
    }

    /// Restart a terminal (rejected or cancelled) workflow instance from its
    /// first stage group, provided its template allows reopening.
    pub async fn restart_workflow(
        &self,
        workflow_instance_id: WorkflowInstanceId,
    ) -> Result<WorkflowInstance, EngineError> {
        let guard = self.locks.acquire(workflow_instance_id).await;
        let mut events = Vec::new();
        let result = self
            .restart_workflow_locked(workflow_instance_id, &mut events)
            .await;
        drop(guard);
        self.publish_all(events).await;
        result
    }

    async fn restart_workflow_locked(
        &self,
        workflow_instance_id: WorkflowInstanceId,
        events: &mut Vec<EngineEvent>,
    ) -> Result<WorkflowInstance, EngineError> {
        let instance = self
            .instances
            .get_workflow_instance(workflow_instance_id)
            .await
            .ok_or(EngineError::WorkflowInstanceNotFound(workflow_instance_id))?;
        if !instance.status.is_terminal() {
            return Err(EngineError::RestartRequiresTerminalInstance(workflow_instance_id));
        }
        let template = self
            .templates
            .get_template(instance.template_id)
            .await
            .ok_or(EngineError::TemplateInactive(instance.template_id))?;
        if !template.allow_reopen {
            return Err(EngineError::RestartNotAllowed(instance.transfer_id));
        }

        for mut stage in self
            .instances
            .stage_instances_for_workflow(workflow_instance_id)
            .await
        {
            stage.status = StageInstanceStatus::Cancelled;
            self.instances.put_stage_instance(stage).await;
        }

        let mut restarted = instance.clone();
        restarted.status = WorkflowStatus::Pending;
        restarted.finished_at = None;
        restarted.current_stage_template = None;
        self.instances.put_workflow_instance(restarted).await;

        self.activate_next_locked(workflow_instance_id, events).await
    }

    /// Transfer- and segment-aware check for a given operation, combining
    /// the config's operation→ability map with the authorization resolver.
    /// `workflow-api` calls this before dispatching to the boundary
    /// operations that need per-transfer authorization beyond group
    /// membership in an approving role.
    pub async fn authorize_operation(
        &self,
        user_id: UserId,
        operation: &str,
        transfer_segments: &BTreeMap<String, String>,
    ) -> Result<(), EngineError> {
        let ability = self
            .config
            .operation_ability(operation)
            .and_then(|a| a.parse().ok())
            .ok_or(EngineError::NotAuthorized(user_id))?;
        if self
            .authz
            .has_ability_over_segments(user_id, ability, transfer_segments)
            .await
        {
            return Ok(());
        }
        Err(EngineError::NotAuthorized(user_id))
    }
}
