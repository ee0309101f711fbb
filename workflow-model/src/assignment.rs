//! `spec.md` §3.1 `Assignment` / `Action` / `Delegation`.

use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

use crate::ids::{ActionId, AssignmentId, DelegationId, StageInstanceId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Approved,
    Rejected,
    Delegated,
}

/// One user's standing task on one stage instance. `(stage_instance_id,
/// user_id)` is unique — a user cannot be assigned to the same stage twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub stage_instance_id: StageInstanceId,
    pub user_id: UserId,
    /// Role held at assignment time, kept even if group membership later
    /// changes so history reads correctly.
    pub role_snapshot: String,
    pub level_snapshot: Option<String>,
    pub is_mandatory: bool,
    pub status: AssignmentStatus,
}

impl Assignment {
    pub fn is_pending(&self) -> bool {
        self.status == AssignmentStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Approve,
    Reject,
    Delegate,
}

/// An immutable audit record. `user_id` is `None` for actions the engine
/// itself logs (auto-skip of an unassignable stage); `assignment_id` is
/// `None` for the same reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub stage_instance_id: StageInstanceId,
    pub user_id: Option<UserId>,
    pub assignment_id: Option<AssignmentId>,
    pub action: ActionKind,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Whether this single action was the one that tipped the stage's
    /// decision policy into completion, recorded for audit replay.
    pub triggers_stage_completion: bool,
}

/// A standing reassignment of one user's review duties on a stage instance
/// to another user. Deactivated once the stage instance leaves the active
/// order group (whatever the outcome).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delegation {
    pub id: DelegationId,
    pub from_user: UserId,
    pub to_user: UserId,
    pub stage_instance_id: StageInstanceId,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl Delegation {
    pub fn deactivate(&mut self, at: DateTime<Utc>) {
        self.active = false;
        self.deactivated_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deactivating_a_delegation_stamps_the_time_once() {
        let mut d = Delegation {
            id: DelegationId(1),
            from_user: UserId(1),
            to_user: UserId(2),
            stage_instance_id: StageInstanceId(1),
            active: true,
            created_at: Utc::now(),
            deactivated_at: None,
        };
        let now = Utc::now();
        d.deactivate(now);
        assert!(!d.active);
        assert_eq!(d.deactivated_at, Some(now));
    }
}
