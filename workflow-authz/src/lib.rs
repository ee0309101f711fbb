//! Authorization resolver (`spec.md` §4.1, component C1).
//!
//! Grounded on `user_management.managers.user_ability_manager` in the
//! original source: a user's ability over a transfer is the union of any
//! active per-user `UserSegmentAbility` grants whose segment requirements
//! match the transfer, plus whatever their group role grants by default.
//! Eligibility for a *stage* is resolved purely from group/role membership,
//! since a stage names a `(security_group, role)` pair that may differ from
//! the transfer's own owning group — this is what makes cross-group review
//! stages possible.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::Arc;

use workflow_model::{AbilityTag, SecurityGroupId, SecurityGroupRoleId, UserId};
use workflow_model::store::AuthzStore;

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("security group {0} not found")]
    UnknownGroup(SecurityGroupId),
    #[error("security group role {0} not found")]
    UnknownRole(SecurityGroupRoleId),
}

pub struct AuthzResolver<S: AuthzStore> {
    store: Arc<S>,
}

impl<S: AuthzStore> AuthzResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Abilities `user` holds by virtue of their role in `group`, ignoring
    /// any segment-scoped overrides. Empty if the user is not a member.
    pub async fn effective_abilities(&self, user: UserId, group: SecurityGroupId) -> HashSet<AbilityTag> {
        let mut abilities = HashSet::new();
        for membership in self.store.memberships_for_user(user).await {
            if membership.security_group_id != group {
                continue;
            }
            if let Some(role) = self.store.role(membership.role_id).await {
                abilities.extend(role.default_abilities.iter().copied());
            }
        }
        abilities
    }

    /// Every group in which `user` holds a role granting `ability` by
    /// default, or every group that exists if `user` belongs to a
    /// superadmin group (the original's superadmin-bypasses-everything
    /// shortcut).
    pub async fn groups_with_ability(&self, user: UserId, ability: AbilityTag) -> Vec<SecurityGroupId> {
        let memberships = self.store.memberships_for_user(user).await;
        for membership in &memberships {
            if let Some(group) = self.store.group(membership.security_group_id).await {
                if group.is_superadmin {
                    return self.all_known_groups(&memberships).await;
                }
            }
        }
        let mut groups = Vec::new();
        for membership in &memberships {
            if let Some(role) = self.store.role(membership.role_id).await {
                if role.default_abilities.contains(&ability) {
                    groups.push(membership.security_group_id);
                }
            }
        }
        groups.sort_by_key(|g| g.0);
        groups.dedup();
        groups
    }

    async fn all_known_groups(&self, memberships: &[workflow_model::UserGroupMembership]) -> Vec<SecurityGroupId> {
        let mut groups: Vec<_> = memberships.iter().map(|m| m.security_group_id).collect();
        groups.sort_by_key(|g| g.0);
        groups.dedup();
        groups
    }

    /// Users eligible to be assigned a stage, per `spec.md` §4.1 step 4:
    /// 1. If `required_role` is set, the eligible group is that role's own
    ///    security group (which may differ from the transfer's own group —
    ///    this is what makes cross-group review stages possible) and only
    ///    members holding exactly that role qualify. Otherwise the eligible
    ///    group is `fallback_group` (the transfer's own security group) and
    ///    every member of it qualifies.
    /// 2. If `required_user_level` is set, further filter by the member's
    ///    `user_level`.
    pub async fn eligible_users_for_stage(
        &self,
        required_role: Option<SecurityGroupRoleId>,
        required_user_level: Option<&str>,
        fallback_group: SecurityGroupId,
    ) -> Result<Vec<UserId>, AuthzError> {
        let (group, role_filter) = match required_role {
            Some(role_id) => {
                let role = self
                    .store
                    .role(role_id)
                    .await
                    .ok_or(AuthzError::UnknownRole(role_id))?;
                (role.security_group_id, Some(role.id))
            }
            None => (fallback_group, None),
        };
        let members = self.store.memberships_for_group(group).await;
        let mut users: Vec<UserId> = members
            .into_iter()
            .filter(|m| role_filter.map_or(true, |r| m.role_id == r))
            .filter(|m| {
                required_user_level.map_or(true, |level| m.user_level.as_deref() == Some(level))
            })
            .map(|m| m.user_id)
            .collect();
        users.sort_by_key(|u| u.0);
        users.dedup();
        Ok(users)
    }

    /// Whether `user` may perform `ability` against a transfer carrying
    /// `transfer_segments`, via an active segment-scoped grant. Does not
    /// fall back to role defaults: callers that also want the role-default
    /// path should additionally check `effective_abilities`.
    pub async fn has_ability_over_segments(
        &self,
        user: UserId,
        ability: AbilityTag,
        transfer_segments: &BTreeMap<String, String>,
    ) -> bool {
        self.store
            .segment_abilities_for_user(user)
            .await
            .iter()
            .any(|grant| grant.ability == ability && grant.matches_segments(transfer_segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_model::store::InMemoryAuthzStore;
    use workflow_model::{SecurityGroup, SecurityGroupRole, UserGroupMembership, UserSegmentAbility};

    async fn fixture() -> AuthzResolver<InMemoryAuthzStore> {
        let store = Arc::new(InMemoryAuthzStore::new());
        store
            .put_group(SecurityGroup {
                id: SecurityGroupId(1),
                name: "Finance".to_string(),
                is_superadmin: false,
            })
            .await;
        store
            .put_role(SecurityGroupRole {
                id: SecurityGroupRoleId(1),
                security_group_id: SecurityGroupId(1),
                name: "Reviewer".to_string(),
                default_abilities: vec![AbilityTag::Approve, AbilityTag::View],
            })
            .await;
        store
            .put_membership(UserGroupMembership {
                user_id: UserId(1),
                security_group_id: SecurityGroupId(1),
                role_id: SecurityGroupRoleId(1),
                user_level: None,
            })
            .await;
        AuthzResolver::new(store)
    }

    #[tokio::test]
    async fn effective_abilities_come_from_the_role_default_set() {
        let resolver = fixture().await;
        let abilities = resolver.effective_abilities(UserId(1), SecurityGroupId(1)).await;
        assert!(abilities.contains(&AbilityTag::Approve));
        assert!(!abilities.contains(&AbilityTag::Delete));
    }

    #[tokio::test]
    async fn non_member_has_no_effective_abilities() {
        let resolver = fixture().await;
        let abilities = resolver.effective_abilities(UserId(2), SecurityGroupId(1)).await;
        assert!(abilities.is_empty());
    }

    #[tokio::test]
    async fn eligible_users_for_stage_matches_exact_role() {
        let resolver = fixture().await;
        let users = resolver
            .eligible_users_for_stage(Some(SecurityGroupRoleId(1)), None, SecurityGroupId(1))
            .await
            .unwrap();
        assert_eq!(users, vec![UserId(1)]);
    }

    #[tokio::test]
    async fn eligible_users_for_unknown_role_errors() {
        let resolver = fixture().await;
        assert!(resolver
            .eligible_users_for_stage(Some(SecurityGroupRoleId(99)), None, SecurityGroupId(1))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn no_required_role_falls_back_to_the_transfers_own_group() {
        let resolver = fixture().await;
        let users = resolver
            .eligible_users_for_stage(None, None, SecurityGroupId(1))
            .await
            .unwrap();
        assert_eq!(users, vec![UserId(1)]);
    }

    #[tokio::test]
    async fn required_user_level_filters_out_members_without_it() {
        let resolver = fixture().await;
        let users = resolver
            .eligible_users_for_stage(Some(SecurityGroupRoleId(1)), Some("senior"), SecurityGroupId(1))
            .await
            .unwrap();
        assert!(users.is_empty());

        resolver
            .store
            .put_membership(UserGroupMembership {
                user_id: UserId(2),
                security_group_id: SecurityGroupId(1),
                role_id: SecurityGroupRoleId(1),
                user_level: Some("senior".to_string()),
            })
            .await;
        let users = resolver
            .eligible_users_for_stage(Some(SecurityGroupRoleId(1)), Some("senior"), SecurityGroupId(1))
            .await
            .unwrap();
        assert_eq!(users, vec![UserId(2)]);
    }

    #[tokio::test]
    async fn segment_grant_extends_ability_beyond_role_defaults() {
        let resolver = fixture().await;
        resolver
            .store
            .put_segment_ability(UserSegmentAbility {
                user_id: UserId(1),
                ability: AbilityTag::Transfer,
                segments: BTreeMap::new(),
                active: true,
            })
            .await;
        let transfer_segments = BTreeMap::new();
        assert!(
            resolver
                .has_ability_over_segments(UserId(1), AbilityTag::Transfer, &transfer_segments)
                .await
        );
    }
}
