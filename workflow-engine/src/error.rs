use workflow_model::{
    AssignmentId, SecurityGroupId, StageInstanceId, StageTemplateId, TemplateId, TransferId,
    UserId, WorkflowInstanceId,
};

/// `spec.md` §7: the engine's error taxonomy. Every boundary operation
/// returns one of these rather than a raw store or authorization error, so
/// `workflow-api` can map variants to status codes without knowing about
/// the engine's internals.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("transfer {0} not found")]
    TransferNotFound(TransferId),

    #[error("stage template {0} not found")]
    StageTemplateNotFound(StageTemplateId),

    #[error("transfer {0} has no security group assigned")]
    MissingSecurityGroup(TransferId),

    #[error("transfer {0} has no assignment registry entry for security group {1}")]
    NoWorkflowAssigned(TransferId, SecurityGroupId),

    #[error("template {0} is not active")]
    TemplateInactive(TemplateId),

    #[error("template {0} has no stages configured")]
    TemplateHasNoStages(TemplateId),

    #[error("workflow instance {0} not found")]
    WorkflowInstanceNotFound(WorkflowInstanceId),

    #[error("workflow instance {0} is already terminal")]
    WorkflowAlreadyTerminal(WorkflowInstanceId),

    #[error("workflow instance {0} has no active stage")]
    NoActiveStage(WorkflowInstanceId),

    #[error("user {0} has no assignment on stage instance {1}")]
    NoAssignmentForUser(UserId, StageInstanceId),

    #[error("assignment {0} has already been decided")]
    AssignmentAlreadyDecided(AssignmentId),

    #[error("stage template {0} does not allow rejection")]
    RejectionNotAllowed(StageTemplateId),

    #[error("a rejection on stage template {0} requires a non-empty comment")]
    ReasonRequired(StageTemplateId),

    #[error("stage template {0} does not allow delegation")]
    DelegationNotAllowed(StageTemplateId),

    #[error("delegation must go through the dedicated delegate operation, not process_action")]
    DelegateViaDedicatedOperation,

    #[error("user {0} cannot delegate to themselves or to a user already involved in stage instance {1}")]
    InvalidDelegationTarget(UserId, StageInstanceId),

    #[error("stage template {0} uses quorum policy but quorum_count exceeds the eligible assignment count")]
    QuorumMisconfigured(StageTemplateId),

    #[error("template {0} cannot be deleted while referenced by an in-progress workflow instance")]
    TemplateInUse(TemplateId),

    #[error("workflow template for transfer {0} does not allow restart")]
    RestartNotAllowed(TransferId),

    #[error("workflow instance {0} cannot be restarted because it is not terminal")]
    RestartRequiresTerminalInstance(WorkflowInstanceId),

    #[error("authorization error: {0}")]
    Authorization(#[from] workflow_authz::AuthzError),

    #[error("user {0} is not authorized to perform this operation")]
    NotAuthorized(UserId),
}
