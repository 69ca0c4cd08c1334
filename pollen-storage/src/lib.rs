//! Pollen Storage - Storage Trait, Mock Implementation, and Memo Cache
//!
//! Defines the storage abstraction layer for Pollen entities and the
//! tag-invalidated cache that sits in front of it.

pub mod async_trait;
pub mod cache;

pub use async_trait::{AsyncStorage, StorageResult, TeamMemberFilter};

// Re-export cache types for API integration
pub use cache::{
    CacheConfig, CacheKey, CacheStats, CacheTag, MemoCache, TagDimension, TagScope, TagSelector,
    TagWatermarks, Watermark,
};

use ::async_trait::async_trait as async_trait_attr;
use pollen_core::{
    ActionClass, AttributeClass, EntityId, EntityType, Environment, EnvironmentUpdateInput,
    Membership, Organization, Product, ProductTeam, StorageError, Team, TeamDetails,
    TeamMembership, TeamSummary, Timestamp,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// MOCK STORAGE
// ============================================================================

#[derive(Debug, Default)]
struct MockTables {
    organizations: HashMap<EntityId, Organization>,
    memberships: HashMap<(EntityId, EntityId), Membership>,
    products: HashMap<EntityId, Product>,
    product_teams: HashMap<(EntityId, EntityId), ProductTeam>,
    teams: HashMap<EntityId, Team>,
    team_memberships: HashMap<(EntityId, EntityId), TeamMembership>,
    environments: HashMap<EntityId, Environment>,
    action_classes: HashMap<EntityId, ActionClass>,
    attribute_classes: HashMap<EntityId, AttributeClass>,
}

/// In-memory mock storage for testing and the `memory` storage backend.
///
/// All tables sit behind one lock so multi-row inserts are atomic.
#[derive(Debug, Clone, Default)]
pub struct MockStorage {
    tables: Arc<RwLock<MockTables>>,
}

impl MockStorage {
    /// Create a new mock storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, MockTables>> {
        self.tables.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, MockTables>> {
        self.tables.write().map_err(|_| StorageError::LockPoisoned)
    }

    /// Clear all stored data.
    pub fn clear(&self) -> StorageResult<()> {
        *self.write()? = MockTables::default();
        Ok(())
    }

    /// Get count of stored teams.
    pub fn team_count(&self) -> StorageResult<usize> {
        Ok(self.read()?.teams.len())
    }

    /// Get count of stored team memberships.
    pub fn team_membership_count(&self) -> StorageResult<usize> {
        Ok(self.read()?.team_memberships.len())
    }

    /// Get count of stored environments.
    pub fn environment_count(&self) -> StorageResult<usize> {
        Ok(self.read()?.environments.len())
    }
}

fn already_exists(entity_type: EntityType, key: impl ToString) -> StorageError {
    StorageError::UniqueViolation {
        entity_type,
        key: key.to_string(),
    }
}

fn sorted_by_creation<T>(
    rows: impl Iterator<Item = T>,
    key: impl Fn(&T) -> (Timestamp, EntityId),
) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(key);
    rows
}

#[async_trait_attr]
impl AsyncStorage for MockStorage {
    // === Organization Operations ===

    async fn organization_insert(&self, o: &Organization) -> StorageResult<()> {
        let mut tables = self.write()?;
        if tables.organizations.contains_key(&o.id) {
            return Err(already_exists(EntityType::Organization, o.id));
        }
        tables.organizations.insert(o.id, o.clone());
        Ok(())
    }

    async fn organization_get(&self, id: EntityId) -> StorageResult<Option<Organization>> {
        Ok(self.read()?.organizations.get(&id).cloned())
    }

    async fn organization_list_by_user(
        &self,
        user_id: EntityId,
    ) -> StorageResult<Vec<Organization>> {
        let tables = self.read()?;
        let organizations = tables
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| tables.organizations.get(&m.organization_id))
            .cloned();
        Ok(sorted_by_creation(organizations, |o| (o.created_at, o.id)))
    }

    // === Membership Operations ===

    async fn membership_insert(&self, m: &Membership) -> StorageResult<()> {
        let mut tables = self.write()?;
        let key = (m.user_id, m.organization_id);
        if tables.memberships.contains_key(&key) {
            return Err(already_exists(
                EntityType::Membership,
                format!("{}/{}", m.user_id, m.organization_id),
            ));
        }
        tables.memberships.insert(key, m.clone());
        Ok(())
    }

    async fn membership_get(
        &self,
        user_id: EntityId,
        organization_id: EntityId,
    ) -> StorageResult<Option<Membership>> {
        Ok(self
            .read()?
            .memberships
            .get(&(user_id, organization_id))
            .cloned())
    }

    async fn membership_list_by_user(&self, user_id: EntityId) -> StorageResult<Vec<Membership>> {
        let tables = self.read()?;
        let mut memberships: Vec<Membership> = tables
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        memberships.sort_by_key(|m| {
            tables
                .organizations
                .get(&m.organization_id)
                .map(|o| (o.created_at, o.id))
        });
        Ok(memberships)
    }

    async fn membership_list_by_organization(
        &self,
        organization_id: EntityId,
    ) -> StorageResult<Vec<Membership>> {
        Ok(self
            .read()?
            .memberships
            .values()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect())
    }

    // === Product Operations ===

    async fn product_insert(&self, p: &Product) -> StorageResult<()> {
        let mut tables = self.write()?;
        if tables.products.contains_key(&p.id) {
            return Err(already_exists(EntityType::Product, p.id));
        }
        tables.products.insert(p.id, p.clone());
        Ok(())
    }

    async fn product_get(&self, id: EntityId) -> StorageResult<Option<Product>> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn product_list_by_organization(
        &self,
        organization_id: EntityId,
    ) -> StorageResult<Vec<Product>> {
        let tables = self.read()?;
        let products = tables
            .products
            .values()
            .filter(|p| p.organization_id == organization_id)
            .cloned();
        Ok(sorted_by_creation(products, |p| (p.created_at, p.id)))
    }

    async fn product_team_insert(&self, link: &ProductTeam) -> StorageResult<()> {
        let mut tables = self.write()?;
        let key = (link.product_id, link.team_id);
        if tables.product_teams.contains_key(&key) {
            return Err(already_exists(
                EntityType::ProductTeam,
                format!("{}/{}", link.product_id, link.team_id),
            ));
        }
        tables.product_teams.insert(key, link.clone());
        Ok(())
    }

    // === Team Operations ===

    async fn team_insert(&self, t: &Team) -> StorageResult<()> {
        let mut tables = self.write()?;
        if tables.teams.contains_key(&t.id) {
            return Err(already_exists(EntityType::Team, t.id));
        }
        let name_taken = tables
            .teams
            .values()
            .any(|existing| existing.organization_id == t.organization_id && existing.name == t.name);
        if name_taken {
            return Err(already_exists(
                EntityType::Team,
                format!("{}/{}", t.organization_id, t.name),
            ));
        }
        tables.teams.insert(t.id, t.clone());
        Ok(())
    }

    async fn team_get(&self, id: EntityId) -> StorageResult<Option<TeamDetails>> {
        let tables = self.read()?;
        Ok(tables.teams.get(&id).map(|team| {
            let mut product_ids: Vec<EntityId> = tables
                .product_teams
                .values()
                .filter(|link| link.team_id == id)
                .map(|link| link.product_id)
                .collect();
            product_ids.sort();
            TeamDetails {
                team: team.clone(),
                product_ids,
            }
        }))
    }

    async fn team_find_by_name(
        &self,
        organization_id: EntityId,
        name: &str,
    ) -> StorageResult<Option<Team>> {
        Ok(self
            .read()?
            .teams
            .values()
            .find(|t| t.organization_id == organization_id && t.name == name)
            .cloned())
    }

    async fn team_list_by_organization(
        &self,
        organization_id: EntityId,
        filter: TeamMemberFilter,
    ) -> StorageResult<Vec<TeamSummary>> {
        let tables = self.read()?;
        let teams = sorted_by_creation(
            tables
                .teams
                .values()
                .filter(|t| t.organization_id == organization_id),
            |t| (t.created_at, t.id),
        );

        let summaries = teams
            .into_iter()
            .filter(|team| {
                filter.admits(|user_id| tables.team_memberships.contains_key(&(team.id, user_id)))
            })
            .map(|team| {
                let member_count = tables
                    .team_memberships
                    .values()
                    .filter(|m| m.team_id == team.id)
                    .count() as u64;
                let member_role = match filter {
                    TeamMemberFilter::MemberOf(user_id) => tables
                        .team_memberships
                        .get(&(team.id, user_id))
                        .map(|m| m.role),
                    _ => None,
                };
                TeamSummary {
                    id: team.id,
                    name: team.name.clone(),
                    member_role,
                    member_count,
                }
            })
            .collect();
        Ok(summaries)
    }

    // === Team Membership Operations ===

    async fn team_membership_insert(&self, m: &TeamMembership) -> StorageResult<()> {
        let mut tables = self.write()?;
        if !tables.teams.contains_key(&m.team_id) {
            return Err(StorageError::InsertFailed {
                entity_type: EntityType::TeamMembership,
                reason: format!("team {} does not exist", m.team_id),
            });
        }
        let key = (m.team_id, m.user_id);
        if tables.team_memberships.contains_key(&key) {
            return Err(already_exists(
                EntityType::TeamMembership,
                format!("{}/{}", m.team_id, m.user_id),
            ));
        }
        tables.team_memberships.insert(key, m.clone());
        Ok(())
    }

    async fn team_membership_get(
        &self,
        team_id: EntityId,
        user_id: EntityId,
    ) -> StorageResult<Option<TeamMembership>> {
        Ok(self
            .read()?
            .team_memberships
            .get(&(team_id, user_id))
            .cloned())
    }

    async fn team_membership_delete(
        &self,
        team_id: EntityId,
        user_id: EntityId,
    ) -> StorageResult<Option<TeamMembership>> {
        Ok(self.write()?.team_memberships.remove(&(team_id, user_id)))
    }

    // === Environment Operations ===

    async fn environment_get(&self, id: EntityId) -> StorageResult<Option<Environment>> {
        Ok(self.read()?.environments.get(&id).cloned())
    }

    async fn environment_list_by_product(
        &self,
        product_id: EntityId,
    ) -> StorageResult<Vec<Environment>> {
        let tables = self.read()?;
        let environments = tables
            .environments
            .values()
            .filter(|e| e.product_id == product_id)
            .cloned();
        Ok(sorted_by_creation(environments, |e| (e.created_at, e.id)))
    }

    async fn environment_insert_seeded(
        &self,
        environment: &Environment,
        action_classes: &[ActionClass],
        attribute_classes: &[AttributeClass],
    ) -> StorageResult<()> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&environment.product_id) {
            return Err(StorageError::InsertFailed {
                entity_type: EntityType::Environment,
                reason: format!("product {} does not exist", environment.product_id),
            });
        }
        if tables.environments.contains_key(&environment.id) {
            return Err(already_exists(EntityType::Environment, environment.id));
        }
        // Check every seeded row before writing any of them.
        if let Some(dup) = action_classes
            .iter()
            .find(|a| tables.action_classes.contains_key(&a.id))
        {
            return Err(already_exists(EntityType::ActionClass, dup.id));
        }
        if let Some(dup) = attribute_classes
            .iter()
            .find(|a| tables.attribute_classes.contains_key(&a.id))
        {
            return Err(already_exists(EntityType::AttributeClass, dup.id));
        }

        tables
            .environments
            .insert(environment.id, environment.clone());
        for action in action_classes {
            tables.action_classes.insert(action.id, action.clone());
        }
        for attribute in attribute_classes {
            tables.attribute_classes.insert(attribute.id, attribute.clone());
        }
        Ok(())
    }

    async fn environment_update(
        &self,
        id: EntityId,
        patch: &EnvironmentUpdateInput,
        updated_at: Timestamp,
    ) -> StorageResult<Option<Environment>> {
        let mut tables = self.write()?;
        Ok(tables.environments.get_mut(&id).map(|environment| {
            patch.apply_to(environment, updated_at);
            environment.clone()
        }))
    }

    async fn action_class_list_by_environment(
        &self,
        environment_id: EntityId,
    ) -> StorageResult<Vec<ActionClass>> {
        let tables = self.read()?;
        let classes = tables
            .action_classes
            .values()
            .filter(|a| a.environment_id == environment_id)
            .cloned();
        Ok(sorted_by_creation(classes, |a| (a.created_at, a.id)))
    }

    async fn attribute_class_list_by_environment(
        &self,
        environment_id: EntityId,
    ) -> StorageResult<Vec<AttributeClass>> {
        let tables = self.read()?;
        let classes = tables
            .attribute_classes
            .values()
            .filter(|a| a.environment_id == environment_id)
            .cloned();
        Ok(sorted_by_creation(classes, |a| (a.created_at, a.id)))
    }

    // === Health ===

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(self.read().is_ok())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pollen_core::{
        new_entity_id, now, EnvironmentType, OrganizationRole, ProductTeamPermission, TeamRole,
    };

    fn team(organization_id: EntityId, name: &str) -> Team {
        let ts = now();
        Team {
            id: new_entity_id(),
            organization_id,
            name: name.to_string(),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn product(organization_id: EntityId) -> Product {
        let ts = now();
        Product {
            id: new_entity_id(),
            organization_id,
            name: "Web".to_string(),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn environment(product_id: EntityId) -> Environment {
        let ts = now();
        Environment {
            id: new_entity_id(),
            product_id,
            environment_type: EnvironmentType::Production,
            app_setup_completed: false,
            website_setup_completed: false,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[tokio::test]
    async fn test_team_name_unique_per_organization() {
        let storage = MockStorage::new();
        let org = new_entity_id();
        storage.team_insert(&team(org, "Support")).await.unwrap();

        let err = storage.team_insert(&team(org, "Support")).await.unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation { entity_type: EntityType::Team, .. }));

        // Same name in another organization is fine.
        storage
            .team_insert(&team(new_entity_id(), "Support"))
            .await
            .unwrap();
        assert_eq!(storage.team_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_team_membership_unique_and_delete() {
        let storage = MockStorage::new();
        let t = team(new_entity_id(), "Eng");
        storage.team_insert(&t).await.unwrap();
        let user = new_entity_id();
        let membership = TeamMembership {
            team_id: t.id,
            user_id: user,
            role: TeamRole::Contributor,
        };

        storage.team_membership_insert(&membership).await.unwrap();
        let err = storage
            .team_membership_insert(&membership)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation { .. }));

        let removed = storage.team_membership_delete(t.id, user).await.unwrap();
        assert_eq!(removed, Some(membership));
        assert_eq!(storage.team_membership_delete(t.id, user).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_team_list_filters_and_counts() {
        let storage = MockStorage::new();
        let org = new_entity_id();
        let mine = team(org, "Mine");
        let other = team(org, "Other");
        storage.team_insert(&mine).await.unwrap();
        storage.team_insert(&other).await.unwrap();

        let user = new_entity_id();
        storage
            .team_membership_insert(&TeamMembership {
                team_id: mine.id,
                user_id: user,
                role: TeamRole::Admin,
            })
            .await
            .unwrap();
        storage
            .team_membership_insert(&TeamMembership {
                team_id: other.id,
                user_id: new_entity_id(),
                role: TeamRole::Contributor,
            })
            .await
            .unwrap();

        let member_of = storage
            .team_list_by_organization(org, TeamMemberFilter::MemberOf(user))
            .await
            .unwrap();
        assert_eq!(member_of.len(), 1);
        assert_eq!(member_of[0].id, mine.id);
        assert_eq!(member_of[0].member_role, Some(TeamRole::Admin));
        assert_eq!(member_of[0].member_count, 1);

        let not_member = storage
            .team_list_by_organization(org, TeamMemberFilter::NotMemberOf(user))
            .await
            .unwrap();
        assert_eq!(not_member.len(), 1);
        assert_eq!(not_member[0].id, other.id);
        assert_eq!(not_member[0].member_role, None);

        let all = storage
            .team_list_by_organization(org, TeamMemberFilter::All)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_team_get_includes_linked_products() {
        let storage = MockStorage::new();
        let org = new_entity_id();
        let p = product(org);
        let t = team(org, "Design");
        storage.product_insert(&p).await.unwrap();
        storage.team_insert(&t).await.unwrap();
        storage
            .product_team_insert(&ProductTeam {
                product_id: p.id,
                team_id: t.id,
                permission: ProductTeamPermission::ReadWrite,
            })
            .await
            .unwrap();

        let details = storage.team_get(t.id).await.unwrap().unwrap();
        assert_eq!(details.product_ids, vec![p.id]);
        assert!(storage.team_get(new_entity_id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_environment_seeded_insert_is_atomic() {
        let storage = MockStorage::new();
        let p = product(new_entity_id());
        storage.product_insert(&p).await.unwrap();

        let env = environment(p.id);
        let (actions, attributes) = pollen_core::seeded_classes(env.id, env.created_at);
        storage
            .environment_insert_seeded(&env, &actions, &attributes)
            .await
            .unwrap();

        // Reusing an action class id fails and writes nothing.
        let second = environment(p.id);
        let err = storage
            .environment_insert_seeded(&second, &actions, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation { entity_type: EntityType::ActionClass, .. }));
        assert_eq!(storage.environment_count().unwrap(), 1);
        assert!(storage.environment_get(second.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_environment_insert_requires_product() {
        let storage = MockStorage::new();
        let env = environment(new_entity_id());
        let err = storage
            .environment_insert_seeded(&env, &[], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InsertFailed { .. }));
    }

    #[tokio::test]
    async fn test_environment_update_missing_returns_none() {
        let storage = MockStorage::new();
        let patch = EnvironmentUpdateInput {
            website_setup_completed: Some(true),
            ..Default::default()
        };
        let updated = storage
            .environment_update(new_entity_id(), &patch, now())
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_organizations_listed_through_memberships() {
        let storage = MockStorage::new();
        let user = new_entity_id();
        let ts = now();
        let org = Organization {
            id: new_entity_id(),
            name: "Acme".to_string(),
            created_at: ts,
            updated_at: ts,
        };
        let unrelated = Organization {
            id: new_entity_id(),
            name: "Other".to_string(),
            created_at: ts,
            updated_at: ts,
        };
        storage.organization_insert(&org).await.unwrap();
        storage.organization_insert(&unrelated).await.unwrap();
        storage
            .membership_insert(&Membership {
                user_id: user,
                organization_id: org.id,
                role: OrganizationRole::Member,
                accepted: true,
            })
            .await
            .unwrap();

        let orgs = storage.organization_list_by_user(user).await.unwrap();
        assert_eq!(orgs, vec![org]);
    }
}
