//! Assignment registry resolution (`spec.md` §4.3, component C3): selecting
//! and ordering the workflow templates a transfer routes through.

use workflow_model::store::AssignmentRegistryStore;
use workflow_model::{renumber_densely, TemplateId, TransferRef};

/// The ordered list of templates a transfer's security group and
/// transaction code select, densely renumbered `1..=n` regardless of the
/// admin-entered `execution_order` gaps in the registry.
pub async fn resolve_chain(
    registry: &dyn AssignmentRegistryStore,
    transfer: &TransferRef,
) -> Vec<TemplateId> {
    let Some(security_group_id) = transfer.security_group_id else {
        return Vec::new();
    };
    let assignments = registry.assignments_for_group(security_group_id).await;
    let selected: Vec<_> = assignments
        .into_iter()
        .filter(|a| a.matches(&transfer.transaction_code))
        .collect();
    renumber_densely(selected)
        .into_iter()
        .map(|a| a.workflow_template)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use workflow_model::store::InMemoryAssignmentRegistryStore;
    use workflow_model::{
        SecurityGroupId, TransferId, TransferStatus, TransferType, WorkflowTemplateAssignment,
    };

    fn transfer() -> TransferRef {
        TransferRef {
            id: TransferId(1),
            security_group_id: Some(SecurityGroupId(1)),
            transaction_code: "FAR".to_string(),
            transfer_type: TransferType::StandardAdjustment,
            segments: BTreeMap::new(),
            status: TransferStatus::PendingApproval,
            status_level: 0,
            linked_transfer_id: None,
            amount: 0,
        }
    }

    #[tokio::test]
    async fn transfer_with_no_security_group_yields_empty_chain() {
        let registry = InMemoryAssignmentRegistryStore::new();
        registry
            .put_assignment(WorkflowTemplateAssignment {
                security_group: SecurityGroupId(1),
                workflow_template: TemplateId(1),
                execution_order: 1,
                transaction_code_filter: None,
            })
            .await;
        let mut groupless = transfer();
        groupless.security_group_id = None;
        assert!(resolve_chain(&registry, &groupless).await.is_empty());
    }

    #[tokio::test]
    async fn resolves_only_matching_assignments_in_order() {
        let registry = InMemoryAssignmentRegistryStore::new();
        registry
            .put_assignment(WorkflowTemplateAssignment {
                security_group: SecurityGroupId(1),
                workflow_template: TemplateId(2),
                execution_order: 20,
                transaction_code_filter: Some("FAR".to_string()),
            })
            .await;
        registry
            .put_assignment(WorkflowTemplateAssignment {
                security_group: SecurityGroupId(1),
                workflow_template: TemplateId(1),
                execution_order: 10,
                transaction_code_filter: None,
            })
            .await;
        registry
            .put_assignment(WorkflowTemplateAssignment {
                security_group: SecurityGroupId(1),
                workflow_template: TemplateId(9),
                execution_order: 5,
                transaction_code_filter: Some("AFR".to_string()),
            })
            .await;

        let chain = resolve_chain(&registry, &transfer()).await;
        assert_eq!(chain, vec![TemplateId(1), TemplateId(2)]);
    }

    #[tokio::test]
    async fn no_matching_assignments_yields_empty_chain() {
        let registry = InMemoryAssignmentRegistryStore::new();
        let chain = resolve_chain(&registry, &transfer()).await;
        assert!(chain.is_empty());
    }
}
