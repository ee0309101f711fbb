//! Template store administration (`spec.md` §4.2, component C2): archiving
//! stages instead of deleting them, and refusing to delete a template still
//! in use. Edits to `decision_policy`/`quorum_count` need no separate guard:
//! the engine snapshots a stage group's quorum into the stage instance at
//! activation time (see `kernel::activate_next`), so a later template edit
//! cannot retroactively change an in-progress instance's required quorum.

use workflow_model::store::TemplateStore;
use workflow_model::{StageTemplateId, TemplateId};

use crate::error::EngineError;
use crate::instance_store::InstanceStore;

/// Archive a stage template by relocating its `order_index` past
/// `archived_threshold` (preserving its original relative position within
/// the archive) rather than deleting the row, so it is excluded from future
/// chain activation but still readable for audit.
pub async fn archive_stage(
    store: &dyn TemplateStore,
    stage_id: StageTemplateId,
    archived_threshold: u32,
) -> Result<(), EngineError> {
    let mut stage = store
        .get_stage(stage_id)
        .await
        .ok_or(EngineError::StageTemplateNotFound(stage_id))?;
    if stage.order_index < archived_threshold {
        stage.order_index = archived_threshold + stage.order_index;
    }
    store.put_stage(stage).await;
    Ok(())
}

/// A template may not be deleted (only deactivated) while any non-terminal
/// workflow instance references it.
pub async fn assert_deletable(
    instance_store: &dyn InstanceStore,
    transfer_ids: &[workflow_model::TransferId],
    template_id: TemplateId,
) -> Result<(), EngineError> {
    for transfer_id in transfer_ids {
        let instances = instance_store
            .workflow_instances_for_transfer(*transfer_id)
            .await;
        if instances
            .iter()
            .any(|i| i.template_id == template_id && i.is_active())
        {
            return Err(EngineError::TemplateInUse(template_id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_model::store::InMemoryTemplateStore;
    use workflow_model::{DecisionPolicy, WorkflowStageTemplate};

    #[tokio::test]
    async fn archiving_moves_order_index_past_threshold_preserving_position() {
        let store = InMemoryTemplateStore::new();
        store
            .put_stage(WorkflowStageTemplate {
                id: StageTemplateId(1),
                template_id: TemplateId(1),
                order_index: 2,
                name: "Review".to_string(),
                decision_policy: DecisionPolicy::All,
                quorum_count: None,
                allow_reject: true,
                allow_delegate: true,
                sla_hours: None,
                required_role: None,
                required_user_level: None,
                parallel_group: None,
            })
            .await;

        archive_stage(&store, StageTemplateId(1), 9999).await.unwrap();
        let stage = store.get_stage(StageTemplateId(1)).await.unwrap();
        assert_eq!(stage.order_index, 10001);
    }

    #[tokio::test]
    async fn archiving_an_unknown_stage_errors() {
        let store = InMemoryTemplateStore::new();
        assert!(archive_stage(&store, StageTemplateId(99), 9999).await.is_err());
    }
}
