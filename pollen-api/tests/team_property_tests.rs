//! Property-Based Tests for team services
//!
//! For any set of teams in an organization and any subset the user joins:
//! - `user_teams` and `other_teams` are disjoint and together cover every team
//! - joining yields `admin` exactly when the organization role is owner or manager
//! - join followed by leave leaves no membership behind

use std::collections::HashSet;
use std::sync::Arc;

use pollen_api::TeamService;
use pollen_core::{OrganizationRole, TeamRole};
use pollen_storage::{AsyncStorage, CacheConfig, MemoCache};
use pollen_test_utils::fixtures::Fixture;
use pollen_test_utils::generators::{org_role_strategy, team_name_strategy};
use proptest::prelude::*;
use tokio::runtime::Runtime;

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

fn service(fixture: &Fixture) -> TeamService {
    TeamService::new(
        fixture.shared_storage(),
        Arc::new(MemoCache::new(CacheConfig::default())),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_team_views_partition_organization(
        names in prop::collection::hash_set(team_name_strategy(), 0..6),
        join_mask in prop::collection::vec(any::<bool>(), 6),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let fixture = Fixture::new().await.map_err(|e| TestCaseError::fail(e.to_string()))?;
            let teams = service(&fixture);
            let org_id = fixture.org.organization.id;
            let user_id = fixture.org.member_id;

            let mut all_ids = HashSet::new();
            for (name, join) in names.iter().zip(join_mask.iter()) {
                let team_id = teams
                    .create_team(org_id, name)
                    .await
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
                all_ids.insert(team_id);
                // Read between writes so stale cache entries would surface.
                let _ = teams.get_teams(user_id, org_id).await;
                if *join {
                    teams
                        .join_team(user_id, team_id)
                        .await
                        .map_err(|e| TestCaseError::fail(e.to_string()))?;
                }
            }

            let overview = teams
                .get_teams(user_id, org_id)
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let mine: HashSet<_> = overview.user_teams.iter().map(|t| t.id).collect();
            let others: HashSet<_> = overview.other_teams.iter().map(|t| t.id).collect();

            prop_assert!(mine.is_disjoint(&others));
            let union: HashSet<_> = mine.union(&others).copied().collect();
            prop_assert_eq!(union, all_ids);
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_join_role_and_leave(role in org_role_strategy(), name in team_name_strategy()) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let fixture = Fixture::new().await.map_err(|e| TestCaseError::fail(e.to_string()))?;
            let teams = service(&fixture);
            let team_id = teams
                .create_team(fixture.org.organization.id, &name)
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let user_id = fixture.org.user_with_role(role);

            let joined = teams
                .join_team(user_id, team_id)
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let expect_admin = matches!(role, OrganizationRole::Owner | OrganizationRole::Manager);
            prop_assert_eq!(joined == TeamRole::Admin, expect_admin);

            let left = teams
                .leave_team(user_id, team_id)
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert!(left);
            let membership = fixture
                .storage
                .team_membership_get(team_id, user_id)
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert!(membership.is_none());
            Ok::<(), TestCaseError>(())
        })?;
    }
}
