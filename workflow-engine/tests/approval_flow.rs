//! End-to-end engine scenarios exercised against entirely in-memory stores.

use std::collections::BTreeMap;
use std::sync::Arc;

use workflow_authz::AuthzResolver;
use workflow_config::EngineConfig;
use workflow_engine::{InMemoryInstanceStore, WorkflowEngine};
use workflow_events::{CompositeEventSink, LoggingEventSink};
use workflow_model::store::{
    InMemoryAssignmentRegistryStore, InMemoryAuthzStore, InMemoryTemplateStore,
};
use workflow_model::{
    ActionKind, DecisionPolicy, InMemoryTransferStore, SecurityGroup, SecurityGroupId,
    SecurityGroupRole, SecurityGroupRoleId, StageTemplateId, TemplateId, TransferId, TransferRef,
    TransferStatus, TransferStore, TransferType, UserGroupMembership, UserId, WorkflowStageTemplate,
    WorkflowStatus, WorkflowTemplate, WorkflowTemplateAssignment,
};

struct Harness {
    engine: WorkflowEngine<InMemoryAuthzStore>,
    transfers: Arc<InMemoryTransferStore>,
}

async fn build_single_stage_harness(policy: DecisionPolicy, quorum: Option<u32>) -> Harness {
    let templates = Arc::new(InMemoryTemplateStore::new());
    let registry = Arc::new(InMemoryAssignmentRegistryStore::new());
    let authz_store = Arc::new(InMemoryAuthzStore::new());
    let instances = Arc::new(InMemoryInstanceStore::new());
    let transfers = Arc::new(InMemoryTransferStore::new());

    templates
        .put_template(WorkflowTemplate {
            id: TemplateId(1),
            code: "FAR".to_string(),
            transfer_type: TransferType::StandardAdjustment,
            name: "FAR workflow".to_string(),
            version: 1,
            is_active: true,
            allow_withdraw: true,
            allow_reopen: true,
        })
        .await;
    templates
        .put_stage(WorkflowStageTemplate {
            id: StageTemplateId(1),
            template_id: TemplateId(1),
            order_index: 1,
            name: "Finance review".to_string(),
            decision_policy: policy,
            quorum_count: quorum,
            allow_reject: true,
            allow_delegate: true,
            sla_hours: Some(24),
            required_role: Some(SecurityGroupRoleId(1)),
            required_user_level: None,
            parallel_group: None,
        })
        .await;
    registry
        .put_assignment(WorkflowTemplateAssignment {
            security_group: SecurityGroupId(1),
            workflow_template: TemplateId(1),
            execution_order: 1,
            transaction_code_filter: None,
        })
        .await;

    authz_store
        .put_group(SecurityGroup {
            id: SecurityGroupId(1),
            name: "Finance".to_string(),
            is_superadmin: false,
        })
        .await;
    authz_store
        .put_role(SecurityGroupRole {
            id: SecurityGroupRoleId(1),
            security_group_id: SecurityGroupId(1),
            name: "Reviewer".to_string(),
            default_abilities: vec![],
        })
        .await;
    for user in [1u64, 2] {
        authz_store
            .put_membership(UserGroupMembership {
                user_id: UserId(user),
                security_group_id: SecurityGroupId(1),
                role_id: SecurityGroupRoleId(1),
                user_level: None,
            })
            .await;
    }

    transfers
        .insert(TransferRef {
            id: TransferId(1),
            security_group_id: Some(SecurityGroupId(1)),
            transaction_code: "FAR".to_string(),
            transfer_type: TransferType::StandardAdjustment,
            segments: BTreeMap::new(),
            status: TransferStatus::PendingApproval,
            status_level: 0,
            linked_transfer_id: None,
            amount: 0,
        })
        .await;

    let events = Arc::new(
        CompositeEventSink::new().with_sink(Box::new(LoggingEventSink::new())),
    );
    let engine = WorkflowEngine::new(
        templates,
        registry,
        instances,
        transfers.clone(),
        AuthzResolver::new(authz_store),
        EngineConfig::default(),
        events,
    );

    Harness { engine, transfers }
}

#[tokio::test]
async fn single_approver_all_policy_approves_the_transfer() {
    let harness = build_single_stage_harness(DecisionPolicy::All, None).await;
    let instance = harness.engine.start_workflow(TransferId(1)).await.unwrap();
    assert_eq!(instance.status, WorkflowStatus::InProgress);

    let stage_instance_id = workflow_model::StageInstanceId(1);
    harness
        .engine
        .process_action(
            instance.id,
            UserId(1),
            stage_instance_id,
            ActionKind::Approve,
            None,
        )
        .await
        .unwrap();
    harness
        .engine
        .process_action(
            instance.id,
            UserId(2),
            stage_instance_id,
            ActionKind::Approve,
            None,
        )
        .await
        .unwrap();

    let transfer = harness.transfers.get(TransferId(1)).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Approved);
}

#[tokio::test]
async fn any_policy_approves_on_first_approval_ignoring_other_pending_members() {
    let harness = build_single_stage_harness(DecisionPolicy::Any, None).await;
    let instance = harness.engine.start_workflow(TransferId(1)).await.unwrap();

    harness
        .engine
        .process_action(
            instance.id,
            UserId(1),
            workflow_model::StageInstanceId(1),
            ActionKind::Approve,
            None,
        )
        .await
        .unwrap();

    let transfer = harness.transfers.get(TransferId(1)).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Approved);
}

#[tokio::test]
async fn a_single_rejection_rejects_the_whole_stage_group_under_all_policy() {
    let harness = build_single_stage_harness(DecisionPolicy::All, None).await;
    let instance = harness.engine.start_workflow(TransferId(1)).await.unwrap();

    harness
        .engine
        .process_action(
            instance.id,
            UserId(1),
            workflow_model::StageInstanceId(1),
            ActionKind::Reject,
            Some("missing documentation".to_string()),
        )
        .await
        .unwrap();

    let transfer = harness.transfers.get(TransferId(1)).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Rejected);
}

#[tokio::test]
async fn delegating_a_pending_assignment_lets_the_delegate_decide() {
    let harness = build_single_stage_harness(DecisionPolicy::All, None).await;
    let instance = harness.engine.start_workflow(TransferId(1)).await.unwrap();
    let stage_instance_id = workflow_model::StageInstanceId(1);

    harness
        .engine
        .delegate(instance.id, stage_instance_id, UserId(1), UserId(3), None)
        .await
        .unwrap();

    // User 1 no longer has a pending decision; the delegate (user 3) does.
    let err = harness
        .engine
        .process_action(
            instance.id,
            UserId(1),
            stage_instance_id,
            ActionKind::Approve,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, workflow_engine::EngineError::AssignmentAlreadyDecided(_)));

    harness
        .engine
        .process_action(
            instance.id,
            UserId(3),
            stage_instance_id,
            ActionKind::Approve,
            None,
        )
        .await
        .unwrap();
    harness
        .engine
        .process_action(
            instance.id,
            UserId(2),
            stage_instance_id,
            ActionKind::Approve,
            None,
        )
        .await
        .unwrap();

    let transfer = harness.transfers.get(TransferId(1)).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Approved);
}

#[tokio::test]
async fn quorum_policy_approves_once_the_quorum_count_is_met() {
    let harness = build_single_stage_harness(DecisionPolicy::Quorum, Some(1)).await;
    let instance = harness.engine.start_workflow(TransferId(1)).await.unwrap();

    harness
        .engine
        .process_action(
            instance.id,
            UserId(2),
            workflow_model::StageInstanceId(1),
            ActionKind::Approve,
            None,
        )
        .await
        .unwrap();

    let transfer = harness.transfers.get(TransferId(1)).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Approved);
}

#[tokio::test]
async fn cancelling_a_workflow_instance_does_not_touch_the_transfer_status() {
    let harness = build_single_stage_harness(DecisionPolicy::All, None).await;
    let instance = harness.engine.start_workflow(TransferId(1)).await.unwrap();

    harness.engine.cancel_workflow(instance.id).await.unwrap();

    let transfer = harness.transfers.get(TransferId(1)).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::PendingApproval);
}

#[tokio::test]
async fn rejecting_without_a_comment_fails_with_reason_required() {
    let harness = build_single_stage_harness(DecisionPolicy::All, None).await;
    let instance = harness.engine.start_workflow(TransferId(1)).await.unwrap();

    let err = harness
        .engine
        .process_action(
            instance.id,
            UserId(1),
            workflow_model::StageInstanceId(1),
            ActionKind::Reject,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, workflow_engine::EngineError::ReasonRequired(_)));

    let err = harness
        .engine
        .process_action(
            instance.id,
            UserId(1),
            workflow_model::StageInstanceId(1),
            ActionKind::Reject,
            Some("   ".to_string()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, workflow_engine::EngineError::ReasonRequired(_)));

    let transfer = harness.transfers.get(TransferId(1)).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::PendingApproval);
}

#[tokio::test]
async fn starting_a_workflow_for_a_transfer_with_no_security_group_fails() {
    let harness = build_single_stage_harness(DecisionPolicy::All, None).await;
    harness
        .transfers
        .insert(TransferRef {
            id: TransferId(2),
            security_group_id: None,
            transaction_code: "FAR".to_string(),
            transfer_type: TransferType::StandardAdjustment,
            segments: BTreeMap::new(),
            status: TransferStatus::PendingApproval,
            status_level: 0,
            linked_transfer_id: None,
            amount: 0,
        })
        .await;

    let err = harness.engine.start_workflow(TransferId(2)).await.unwrap_err();
    assert!(matches!(err, workflow_engine::EngineError::MissingSecurityGroup(_)));
}
