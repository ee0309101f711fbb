//! Domain entities and storage traits shared by every other crate in the
//! workspace: templates, runtime instances, assignments/actions/delegations,
//! the authorization data model, and the transfer read view.

pub mod assignment;
pub mod authz;
pub mod ids;
pub mod instance;
pub mod registry;
pub mod store;
pub mod template;
pub mod transfer;

pub use assignment::{Action, ActionKind, Assignment, AssignmentStatus, Delegation};
pub use authz::{
    AbilityTag, SecurityGroup, SecurityGroupRole, Segment, SegmentType, UserGroupMembership,
    UserSegmentAbility,
};
pub use ids::{
    ActionId, AssignmentId, DelegationId, SecurityGroupId, SecurityGroupRoleId, SegmentTypeId,
    StageInstanceId, StageTemplateId, TemplateId, TransferId, UserId, WorkflowInstanceId,
};
pub use instance::{StageInstanceStatus, WorkflowInstance, WorkflowStageInstance, WorkflowStatus};
pub use registry::WorkflowTemplateAssignment;
pub use store::{
    AssignmentRegistryStore, AuthzStore, IdAllocators, IdSequence, InMemoryAssignmentRegistryStore,
    InMemoryAuthzStore, InMemoryTemplateStore, TemplateStore, renumber_densely,
};
pub use template::{DecisionPolicy, StageTemplateError, TransferType, WorkflowStageTemplate, WorkflowTemplate};
pub use transfer::{InMemoryTransferStore, TransferRef, TransferStatus, TransferStore};
