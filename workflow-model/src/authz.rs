//! `spec.md` §3.2 authorization data: security groups/roles, group
//! membership, segment types and user segment abilities.
//!
//! Grounded on `user_management.managers.user_ability_manager` in the
//! original source: abilities are per-user, per-segment-combination grants
//! that either override or fall back to the user's role defaults.

use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::{SecurityGroupId, SecurityGroupRoleId, SegmentTypeId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: SecurityGroupId,
    pub name: String,
    /// The group whose membership grants every operation regardless of
    /// ability grants; mirrors the original's superadmin shortcut.
    pub is_superadmin: bool,
}

/// The ability an operation on a transfer requires. `Edit`/`Approve`/`View`
/// /`Delete`/`Transfer`/`Report` mirror the original's
/// `validate_ability_for_operation` map, which `workflow-config` reuses to
/// resolve an API operation name to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityTag {
    Edit,
    Approve,
    View,
    Delete,
    Transfer,
    Report,
}

impl std::str::FromStr for AbilityTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit" => Ok(AbilityTag::Edit),
            "approve" => Ok(AbilityTag::Approve),
            "view" => Ok(AbilityTag::View),
            "delete" => Ok(AbilityTag::Delete),
            "transfer" => Ok(AbilityTag::Transfer),
            "report" => Ok(AbilityTag::Report),
            other => Err(format!("unknown ability tag: {other}")),
        }
    }
}

/// A role within a security group. `default_abilities` is what a member
/// holding this role gets absent any per-user override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroupRole {
    pub id: SecurityGroupRoleId,
    pub security_group_id: SecurityGroupId,
    pub name: String,
    pub default_abilities: Vec<AbilityTag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGroupMembership {
    pub user_id: UserId,
    pub security_group_id: SecurityGroupId,
    pub role_id: SecurityGroupRoleId,
    /// The member's level within the group, matched against a stage
    /// template's `required_user_level` when one is set.
    pub user_level: Option<String>,
}

/// A dimension transfers are segmented by (e.g. "directorate", "fund
/// source"). `name` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentType {
    pub id: SegmentTypeId,
    pub name: String,
}

/// One concrete value of a `SegmentType` (e.g. directorate "Health").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub segment_type_id: SegmentTypeId,
    pub value: String,
}

/// A per-user override granting `ability` over transfers whose segment
/// values match `segments` (a map of segment-type name to required value).
/// A user matches a grant if the transfer's own segment values are a
/// superset of `segments` — an empty `segments` map grants the ability
/// globally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSegmentAbility {
    pub user_id: UserId,
    pub ability: AbilityTag,
    pub segments: BTreeMap<String, String>,
    pub active: bool,
}

impl UserSegmentAbility {
    /// Whether this grant covers a transfer carrying `transfer_segments`
    /// (segment-type name -> value). Matching is subset-inclusion of the
    /// grant's required segments in the transfer's actual segments.
    pub fn matches_segments(&self, transfer_segments: &BTreeMap<String, String>) -> bool {
        self.active
            && self
                .segments
                .iter()
                .all(|(k, v)| transfer_segments.get(k) == Some(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(segments: &[(&str, &str)]) -> UserSegmentAbility {
        UserSegmentAbility {
            user_id: UserId(1),
            ability: AbilityTag::Approve,
            segments: segments
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            active: true,
        }
    }

    #[test]
    fn empty_segment_grant_matches_any_transfer() {
        let g = grant(&[]);
        let transfer: BTreeMap<String, String> =
            [("directorate".to_string(), "Health".to_string())].into();
        assert!(g.matches_segments(&transfer));
    }

    #[test]
    fn grant_requires_all_of_its_segments_present_and_equal() {
        let g = grant(&[("directorate", "Health")]);
        let matching: BTreeMap<String, String> = [
            ("directorate".to_string(), "Health".to_string()),
            ("fund_source".to_string(), "Federal".to_string()),
        ]
        .into();
        assert!(g.matches_segments(&matching));

        let mismatching: BTreeMap<String, String> =
            [("directorate".to_string(), "Education".to_string())].into();
        assert!(!g.matches_segments(&mismatching));
    }

    #[test]
    fn inactive_grant_never_matches() {
        let mut g = grant(&[]);
        g.active = false;
        assert!(!g.matches_segments(&BTreeMap::new()));
    }
}
