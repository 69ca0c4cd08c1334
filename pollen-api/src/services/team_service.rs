//! Team Service
//!
//! Team listings for a user, joining and leaving teams, and team creation.

use std::sync::Arc;

use pollen_core::{
    ensure_id, new_entity_id, now, EntityId, OtherTeam, PollenError, PollenResult, StorageError,
    Team, TeamMembership, TeamRole, TeamsOverview, UserTeam, ValidateNonEmpty,
};
use pollen_storage::{
    AsyncStorage, CacheKey, CacheTag, MemoCache, TagScope, TagSelector, TeamMemberFilter,
};
use tracing::{debug, info};

/// Message for a blank team name.
pub const TEAM_NAME_EMPTY: &str = "Team name must be at least 1 character long";
/// Message for a team name already taken in the organization.
pub const TEAM_NAME_TAKEN: &str = "Team name already exists";

/// Team membership and team CRUD.
#[derive(Clone)]
pub struct TeamService {
    storage: Arc<dyn AsyncStorage>,
    cache: Arc<MemoCache>,
}

/// Tags every team listing for `(user, organization)` depends on.
fn team_read_tags(user_id: EntityId, organization_id: EntityId) -> [CacheTag; 3] {
    [
        TagScope::Team.by_user_id(user_id),
        TagScope::User.by_id(user_id),
        TagScope::Team.by_organization_id(organization_id),
    ]
}

async fn load_user_teams(
    storage: Arc<dyn AsyncStorage>,
    user_id: EntityId,
    organization_id: EntityId,
) -> PollenResult<Vec<UserTeam>> {
    debug!(%user_id, %organization_id, "Loading user teams");
    let rows = storage
        .team_list_by_organization(organization_id, TeamMemberFilter::MemberOf(user_id))
        .await?;
    rows.into_iter()
        .map(|row| -> PollenResult<UserTeam> {
            let user_role = row.member_role.ok_or_else(|| {
                PollenError::Validation(format!(
                    "Team {} listed as a membership without a role",
                    row.id
                ))
            })?;
            Ok(UserTeam {
                id: row.id,
                name: row.name,
                user_role,
                member_count: row.member_count,
            })
        })
        .collect()
}

async fn load_other_teams(
    storage: Arc<dyn AsyncStorage>,
    user_id: EntityId,
    organization_id: EntityId,
) -> PollenResult<Vec<OtherTeam>> {
    debug!(%user_id, %organization_id, "Loading other teams");
    let rows = storage
        .team_list_by_organization(organization_id, TeamMemberFilter::NotMemberOf(user_id))
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| OtherTeam {
            id: row.id,
            name: row.name,
            member_count: row.member_count,
        })
        .collect())
}

impl TeamService {
    pub fn new(storage: Arc<dyn AsyncStorage>, cache: Arc<MemoCache>) -> Self {
        Self { storage, cache }
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Teams in the organization the user belongs to, with the user's role.
    pub async fn get_user_teams(
        &self,
        user_id: EntityId,
        organization_id: EntityId,
    ) -> PollenResult<Vec<UserTeam>> {
        ensure_id(user_id, "userId")?;
        ensure_id(organization_id, "organizationId")?;

        let key = CacheKey::new("getUserTeams").arg(user_id).arg(organization_id);
        let storage = self.storage.clone();
        self.cache
            .get_or_compute(key, &team_read_tags(user_id, organization_id), move || {
                load_user_teams(storage, user_id, organization_id)
            })
            .await
    }

    /// Teams in the organization the user does not belong to.
    pub async fn get_other_teams(
        &self,
        user_id: EntityId,
        organization_id: EntityId,
    ) -> PollenResult<Vec<OtherTeam>> {
        ensure_id(user_id, "userId")?;
        ensure_id(organization_id, "organizationId")?;

        let key = CacheKey::new("getOtherTeams").arg(user_id).arg(organization_id);
        let storage = self.storage.clone();
        self.cache
            .get_or_compute(key, &team_read_tags(user_id, organization_id), move || {
                load_other_teams(storage, user_id, organization_id)
            })
            .await
    }

    /// Both team views, loaded concurrently.
    pub async fn get_teams(
        &self,
        user_id: EntityId,
        organization_id: EntityId,
    ) -> PollenResult<TeamsOverview> {
        ensure_id(user_id, "userId")?;
        ensure_id(organization_id, "organizationId")?;

        let key = CacheKey::new("getTeams").arg(user_id).arg(organization_id);
        self.cache
            .get_or_compute(key, &team_read_tags(user_id, organization_id), || async {
                let (user_teams, other_teams) = tokio::try_join!(
                    self.get_user_teams(user_id, organization_id),
                    self.get_other_teams(user_id, organization_id),
                )?;
                Ok::<_, PollenError>(TeamsOverview {
                    user_teams,
                    other_teams,
                })
            })
            .await
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Remove the user from the team.
    pub async fn leave_team(&self, user_id: EntityId, team_id: EntityId) -> PollenResult<bool> {
        ensure_id(user_id, "userId")?;
        ensure_id(team_id, "teamId")?;

        let team = self
            .storage
            .team_get(team_id)
            .await?
            .ok_or_else(|| PollenError::not_found("Team", team_id))?;

        self.storage
            .team_membership_delete(team_id, user_id)
            .await?
            .ok_or_else(|| PollenError::not_found_without_id("Membership"))?;

        info!(%team_id, %user_id, "User left team");
        self.revalidate_membership(user_id, &team.team, &team.product_ids)
            .await;
        Ok(true)
    }

    /// Add the user to the team. Organization owners and managers join as
    /// admins, everyone else as contributors.
    pub async fn join_team(&self, user_id: EntityId, team_id: EntityId) -> PollenResult<TeamRole> {
        ensure_id(user_id, "userId")?;
        ensure_id(team_id, "teamId")?;

        let team = self
            .storage
            .team_get(team_id)
            .await?
            .ok_or_else(|| PollenError::not_found("Team", team_id))?;

        let membership = self
            .storage
            .membership_get(user_id, team.team.organization_id)
            .await?
            .ok_or_else(|| PollenError::not_found_without_id("Membership"))?;

        let role = membership.role.team_role();
        self.storage
            .team_membership_insert(&TeamMembership {
                team_id,
                user_id,
                role,
            })
            .await?;

        info!(%team_id, %user_id, role = %role, "User joined team");
        self.revalidate_membership(user_id, &team.team, &team.product_ids)
            .await;
        Ok(role)
    }

    /// Create a team in the organization and return its id.
    pub async fn create_team(
        &self,
        organization_id: EntityId,
        name: &str,
    ) -> PollenResult<EntityId> {
        ensure_id(organization_id, "organizationId")?;
        name.validate_non_empty(TEAM_NAME_EMPTY)?;
        let name = name.trim();

        if self.storage.organization_get(organization_id).await?.is_none() {
            return Err(PollenError::not_found("Organization", organization_id));
        }

        if self
            .storage
            .team_find_by_name(organization_id, name)
            .await?
            .is_some()
        {
            return Err(PollenError::invalid_input(TEAM_NAME_TAKEN));
        }

        let at = now();
        let team = Team {
            id: new_entity_id(),
            organization_id,
            name: name.to_string(),
            created_at: at,
            updated_at: at,
        };
        self.storage
            .team_insert(&team)
            .await
            .map_err(|err| match err {
                StorageError::UniqueViolation { .. } => PollenError::invalid_input(TEAM_NAME_TAKEN),
                other => other.into(),
            })?;

        info!(team_id = %team.id, %organization_id, "Team created");
        self.cache
            .revalidate_selector(
                TagScope::Team,
                &TagSelector::new().with_organization_id(organization_id),
            )
            .await;
        Ok(team.id)
    }

    /// Tags touched when a user's membership in `team` changes. Member
    /// counts are visible to every user of the organization, so its tag goes
    /// too.
    async fn revalidate_membership(&self, user_id: EntityId, team: &Team, product_ids: &[EntityId]) {
        let mut tags = TagSelector::new()
            .with_id(team.id)
            .with_user_id(user_id)
            .with_organization_id(team.organization_id)
            .tags(TagScope::Team);
        tags.extend(
            product_ids
                .iter()
                .map(|product_id| TagScope::Team.by_product_id(*product_id)),
        );
        tags.push(TagScope::User.by_id(user_id));
        let evicted = self.cache.revalidate(&tags).await;
        debug!(team_id = %team.id, %user_id, evicted, "Revalidated team tags");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollen_core::OrganizationRole;
    use pollen_storage::CacheConfig;
    use pollen_test_utils::fixtures::Fixture;

    fn service(fixture: &Fixture) -> TeamService {
        TeamService::new(
            fixture.shared_storage(),
            Arc::new(MemoCache::new(CacheConfig::default())),
        )
    }

    #[tokio::test]
    async fn test_create_team_rejects_blank_name() {
        let fixture = Fixture::new().await.unwrap();
        let teams = service(&fixture);
        for name in ["", "   "] {
            let err = teams
                .create_team(fixture.org.organization.id, name)
                .await
                .unwrap_err();
            assert_eq!(err, PollenError::InvalidInput(TEAM_NAME_EMPTY.to_string()));
        }
        assert_eq!(fixture.storage.team_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_team_twice_fails_without_write() {
        let fixture = Fixture::new().await.unwrap();
        let teams = service(&fixture);
        let org_id = fixture.org.organization.id;

        teams.create_team(org_id, "Support").await.unwrap();
        let err = teams.create_team(org_id, "Support").await.unwrap_err();
        assert_eq!(err, PollenError::InvalidInput(TEAM_NAME_TAKEN.to_string()));
        assert_eq!(fixture.storage.team_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_team_duplicate_check_uses_trimmed_name() {
        let fixture = Fixture::new().await.unwrap();
        let teams = service(&fixture);
        let org_id = fixture.org.organization.id;

        let id = teams.create_team(org_id, "Eng ").await.unwrap();
        for name in ["Eng", " Eng", "Eng  "] {
            let err = teams.create_team(org_id, name).await.unwrap_err();
            assert_eq!(err, PollenError::InvalidInput(TEAM_NAME_TAKEN.to_string()));
        }
        // Case still distinguishes names.
        teams.create_team(org_id, "eng").await.unwrap();

        let stored = fixture.storage.team_get(id).await.unwrap().unwrap();
        assert_eq!(stored.team.name, "Eng");
        assert_eq!(fixture.storage.team_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_team_unknown_organization() {
        let fixture = Fixture::new().await.unwrap();
        let err = service(&fixture)
            .create_team(new_entity_id(), "Support")
            .await
            .unwrap_err();
        assert!(matches!(err, PollenError::ResourceNotFound { ref resource, .. } if resource == "Organization"));
    }

    #[tokio::test]
    async fn test_nil_ids_rejected() {
        let fixture = Fixture::new().await.unwrap();
        let teams = service(&fixture);
        let nil = uuid::Uuid::nil();
        assert!(matches!(
            teams.get_teams(nil, fixture.org.organization.id).await,
            Err(PollenError::InvalidInput(_))
        ));
        assert!(matches!(
            teams.join_team(fixture.org.member_id, nil).await,
            Err(PollenError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_join_role_follows_organization_role() {
        let fixture = Fixture::new().await.unwrap();
        let teams = service(&fixture);
        let team = fixture.add_team("Support", false).await.unwrap();

        let cases = [
            (OrganizationRole::Owner, TeamRole::Admin),
            (OrganizationRole::Manager, TeamRole::Admin),
            (OrganizationRole::Member, TeamRole::Contributor),
            (OrganizationRole::Billing, TeamRole::Contributor),
        ];
        for (org_role, expected) in cases {
            let user_id = fixture.org.user_with_role(org_role);
            assert_eq!(teams.join_team(user_id, team.id).await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_join_requires_organization_membership() {
        let fixture = Fixture::new().await.unwrap();
        let team = fixture.add_team("Support", false).await.unwrap();
        let err = service(&fixture)
            .join_team(fixture.org.outsider_id, team.id)
            .await
            .unwrap_err();
        assert_eq!(err, PollenError::not_found_without_id("Membership"));
        assert_eq!(fixture.storage.team_membership_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_join_twice_is_database_error() {
        let fixture = Fixture::new().await.unwrap();
        let teams = service(&fixture);
        let team = fixture.add_team("Support", false).await.unwrap();
        teams.join_team(fixture.org.member_id, team.id).await.unwrap();
        let err = teams
            .join_team(fixture.org.member_id, team.id)
            .await
            .unwrap_err();
        assert!(matches!(err, PollenError::Database(_)));
    }

    #[tokio::test]
    async fn test_join_then_leave_removes_membership() {
        let fixture = Fixture::new().await.unwrap();
        let teams = service(&fixture);
        let team = fixture.add_team("Support", true).await.unwrap();
        let user_id = fixture.org.member_id;

        teams.join_team(user_id, team.id).await.unwrap();
        assert!(teams.leave_team(user_id, team.id).await.unwrap());
        assert!(fixture
            .storage
            .team_membership_get(team.id, user_id)
            .await
            .unwrap()
            .is_none());

        let err = teams.leave_team(user_id, team.id).await.unwrap_err();
        assert_eq!(err, PollenError::not_found_without_id("Membership"));
    }

    #[tokio::test]
    async fn test_leave_unknown_team() {
        let fixture = Fixture::new().await.unwrap();
        let missing = new_entity_id();
        let err = service(&fixture)
            .leave_team(fixture.org.member_id, missing)
            .await
            .unwrap_err();
        assert_eq!(err, PollenError::not_found("Team", missing));
    }

    #[tokio::test]
    async fn test_get_teams_reflects_join_after_cached_read() {
        let fixture = Fixture::new().await.unwrap();
        let teams = service(&fixture);
        let org_id = fixture.org.organization.id;
        let user_id = fixture.org.member_id;
        let team = fixture.add_team("Support", true).await.unwrap();

        let before = teams.get_teams(user_id, org_id).await.unwrap();
        assert!(before.user_teams.is_empty());
        assert_eq!(before.other_teams.len(), 1);

        teams.join_team(user_id, team.id).await.unwrap();

        let after = teams.get_teams(user_id, org_id).await.unwrap();
        assert_eq!(after.user_teams.len(), 1);
        assert_eq!(after.user_teams[0].user_role, TeamRole::Contributor);
        assert_eq!(after.user_teams[0].member_count, 1);
        assert!(after.other_teams.is_empty());
    }

    #[tokio::test]
    async fn test_member_count_refreshes_for_other_users() {
        let fixture = Fixture::new().await.unwrap();
        let teams = service(&fixture);
        let org_id = fixture.org.organization.id;
        let team = fixture.add_team("Support", false).await.unwrap();

        let owner_view = teams.get_other_teams(fixture.org.owner_id, org_id).await.unwrap();
        assert_eq!(owner_view[0].member_count, 0);

        teams.join_team(fixture.org.member_id, team.id).await.unwrap();

        let owner_view = teams.get_other_teams(fixture.org.owner_id, org_id).await.unwrap();
        assert_eq!(owner_view[0].member_count, 1);
    }

    #[tokio::test]
    async fn test_create_team_shows_up_in_cached_listing() {
        let fixture = Fixture::new().await.unwrap();
        let teams = service(&fixture);
        let org_id = fixture.org.organization.id;
        let user_id = fixture.org.member_id;

        assert!(teams.get_other_teams(user_id, org_id).await.unwrap().is_empty());
        let team_id = teams.create_team(org_id, "  Support ").await.unwrap();

        let others = teams.get_other_teams(user_id, org_id).await.unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].id, team_id);
        assert_eq!(others[0].name, "Support");
    }
}
