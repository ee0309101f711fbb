//! Workflow template model: `spec.md` §3.1 `WorkflowTemplate` /
//! `WorkflowStageTemplate`.

use serde_derive::{Deserialize, Serialize};

use crate::ids::{SecurityGroupRoleId, StageTemplateId, TemplateId};

/// The kind of transfer a template is meant to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferType {
    StandardAdjustment,
    Augmentation,
    Reallocation,
    HoldRelease,
    Generic,
}

/// How approvals on a stage are aggregated into a stage outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionPolicy {
    All,
    Any,
    Quorum,
}

/// Immutable-per-version workflow definition. Multiple versions of the same
/// `code` may coexist; only `is_active` templates are selected for new
/// instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub id: TemplateId,
    pub code: String,
    pub transfer_type: TransferType,
    pub name: String,
    pub version: u32,
    pub is_active: bool,
    pub allow_withdraw: bool,
    pub allow_reopen: bool,
}

/// One stage of a workflow template.
///
/// `order_index` values at or above the configured archive threshold are
/// archived: retained for audit but skipped by any activation logic. See
/// `workflow_engine::template_store` for the archiving operation itself;
/// this type only carries the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStageTemplate {
    pub id: StageTemplateId,
    pub template_id: TemplateId,
    pub order_index: u32,
    pub name: String,
    pub decision_policy: DecisionPolicy,
    /// Required iff `decision_policy == Quorum`.
    pub quorum_count: Option<u32>,
    pub allow_reject: bool,
    pub allow_delegate: bool,
    pub sla_hours: Option<u32>,
    /// Reference into the authorization model: a specific
    /// `(security_group, role)` pairing a stage may require. The group is
    /// the *role's* group, which may differ from the transfer's group —
    /// this is what makes cross-group review stages possible.
    pub required_role: Option<SecurityGroupRoleId>,
    pub required_user_level: Option<String>,
    /// Reserved for future use; stages sharing a group are currently still
    /// evaluated sequentially unless their `order_index` also matches.
    pub parallel_group: Option<u32>,
}

impl WorkflowStageTemplate {
    /// True once `order_index` has been relocated past the archive
    /// threshold, whether by explicit archiving or by having been created
    /// there directly.
    pub fn is_archived(&self, archived_threshold: u32) -> bool {
        self.order_index >= archived_threshold
    }

    /// Validate the stage's own configuration in isolation (the quorum vs.
    /// assignment-count check happens at activation time, once the eligible
    /// set is known).
    pub fn validate(&self) -> Result<(), StageTemplateError> {
        if self.decision_policy == DecisionPolicy::Quorum && self.quorum_count.is_none() {
            return Err(StageTemplateError::MissingQuorumCount {
                stage_id: self.id,
            });
        }
        if let Some(count) = self.quorum_count {
            if count == 0 {
                return Err(StageTemplateError::InvalidQuorumCount {
                    stage_id: self.id,
                    count,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StageTemplateError {
    #[error("stage {stage_id} uses quorum policy but has no quorum_count")]
    MissingQuorumCount { stage_id: StageTemplateId },
    #[error("stage {stage_id} has invalid quorum_count {count}")]
    InvalidQuorumCount { stage_id: StageTemplateId, count: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(policy: DecisionPolicy, quorum: Option<u32>) -> WorkflowStageTemplate {
        WorkflowStageTemplate {
            id: StageTemplateId(1),
            template_id: TemplateId(1),
            order_index: 1,
            name: "Review".to_string(),
            decision_policy: policy,
            quorum_count: quorum,
            allow_reject: true,
            allow_delegate: false,
            sla_hours: None,
            required_role: None,
            required_user_level: None,
            parallel_group: None,
        }
    }

    #[test]
    fn quorum_policy_requires_quorum_count() {
        let st = stage(DecisionPolicy::Quorum, None);
        assert!(st.validate().is_err());
        let st = stage(DecisionPolicy::Quorum, Some(2));
        assert!(st.validate().is_ok());
    }

    #[test]
    fn archived_threshold_is_inclusive() {
        let mut st = stage(DecisionPolicy::All, None);
        st.order_index = 9999;
        assert!(st.is_archived(9999));
        st.order_index = 9998;
        assert!(!st.is_archived(9999));
    }
}
