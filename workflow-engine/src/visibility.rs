//! Visibility service (`spec.md` §4.5, component C5): paginated views of a
//! user's pending and historical approval work.

use serde_derive::{Deserialize, Serialize};

use workflow_model::{Action, Assignment, StageInstanceId, UserId, WorkflowInstanceId};

use crate::instance_store::InstanceStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    fn slice(mut items: Vec<T>, page: usize, page_size: usize) -> Self {
        let total = items.len();
        let start = page.saturating_sub(1) * page_size;
        let end = (start + page_size).min(total);
        let page_items = if start >= total {
            Vec::new()
        } else {
            items.drain(start..end).collect()
        };
        Self {
            items: page_items,
            total,
            page,
            page_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingItem {
    pub assignment: Assignment,
    pub workflow_instance_id: WorkflowInstanceId,
    pub stage_instance_id: StageInstanceId,
}

/// Every pending assignment held by `user`, most recently activated first.
pub async fn list_pending_for_user(
    instances: &dyn InstanceStore,
    user: UserId,
    page: usize,
    page_size: usize,
) -> Page<PendingItem> {
    let mut items = Vec::new();
    for assignment in instances.assignments_for_user(user).await {
        if !assignment.is_pending() {
            continue;
        }
        if let Some(stage) = instances.get_stage_instance(assignment.stage_instance_id).await {
            items.push((
                stage.activated_at,
                PendingItem {
                    assignment,
                    workflow_instance_id: stage.workflow_instance_id,
                    stage_instance_id: stage.id,
                },
            ));
        }
    }
    items.sort_by(|a, b| b.0.cmp(&a.0));
    Page::slice(items.into_iter().map(|(_, item)| item).collect(), page, page_size)
}

/// Every action `user` has recorded, most recent first.
pub async fn list_history_for_user(
    instances: &dyn InstanceStore,
    user: UserId,
    page: usize,
    page_size: usize,
) -> Page<Action> {
    let mut actions = instances.actions_for_user(user).await;
    actions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Page::slice(actions, page, page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_slice_respects_page_size_and_reports_total() {
        let items: Vec<i32> = (1..=7).collect();
        let page = Page::slice(items, 2, 3);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 7);
    }

    #[test]
    fn page_past_the_end_is_empty_but_keeps_total() {
        let items: Vec<i32> = (1..=3).collect();
        let page = Page::slice(items, 5, 3);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }
}
