//! Pollen Test Utilities
//!
//! Shared test infrastructure for the Pollen workspace:
//! - Proptest generators for roles, names, and environment types
//! - Entity builders with fresh ids and timestamps
//! - A seeded organization fixture over `MockStorage`

// Re-export mock storage from its source crate
pub use pollen_storage::MockStorage;

// Re-export core types for convenience
pub use pollen_core::{
    EntityId, Environment, EnvironmentType, Membership, Organization, OrganizationRole, Product,
    ProductTeam, ProductTeamPermission, StorageError, Team, TeamMembership, TeamRole, Timestamp,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    /// Generate a random non-nil UUID.
    pub fn arb_entity_id() -> impl Strategy<Value = EntityId> {
        any::<u128>()
            .prop_filter("nil uuid is never a row id", |v| *v != 0)
            .prop_map(Uuid::from_u128)
    }

    /// Generate any organization role.
    pub fn org_role_strategy() -> impl Strategy<Value = OrganizationRole> {
        prop_oneof![
            Just(OrganizationRole::Owner),
            Just(OrganizationRole::Manager),
            Just(OrganizationRole::Member),
            Just(OrganizationRole::Billing),
        ]
    }

    /// Generate a team name that passes validation.
    pub fn team_name_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Support".to_string()),
            Just("Engineering".to_string()),
            Just("Product Research".to_string()),
            "[A-Za-z][A-Za-z0-9 _-]{0,23}".prop_map(|s| s.trim_end().to_string()),
        ]
    }

    /// Generate an environment type.
    pub fn environment_type_strategy() -> impl Strategy<Value = EnvironmentType> {
        prop_oneof![
            Just(EnvironmentType::Production),
            Just(EnvironmentType::Development),
        ]
    }
}

// ============================================================================
// ENTITY BUILDERS
// ============================================================================

pub mod builders {
    use super::*;
    use pollen_core::{new_entity_id, now};

    pub fn organization(name: &str) -> Organization {
        let at = now();
        Organization {
            id: new_entity_id(),
            name: name.to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    pub fn membership(
        user_id: EntityId,
        organization_id: EntityId,
        role: OrganizationRole,
    ) -> Membership {
        Membership {
            user_id,
            organization_id,
            role,
            accepted: true,
        }
    }

    pub fn product(organization_id: EntityId, name: &str) -> Product {
        let at = now();
        Product {
            id: new_entity_id(),
            organization_id,
            name: name.to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    pub fn team(organization_id: EntityId, name: &str) -> Team {
        let at = now();
        Team {
            id: new_entity_id(),
            organization_id,
            name: name.to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    pub fn environment(product_id: EntityId, environment_type: EnvironmentType) -> Environment {
        let at = now();
        Environment {
            id: new_entity_id(),
            product_id,
            environment_type,
            app_setup_completed: false,
            website_setup_completed: false,
            created_at: at,
            updated_at: at,
        }
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    use super::builders;
    use super::*;
    use pollen_core::new_entity_id;
    use pollen_storage::{AsyncStorage, StorageResult};
    use std::sync::Arc;

    /// One organization with a member of every role, one product with a
    /// production and a development environment, and a user who belongs
    /// to nothing.
    #[derive(Debug, Clone)]
    pub struct SeededOrg {
        pub organization: Organization,
        pub owner_id: EntityId,
        pub manager_id: EntityId,
        pub member_id: EntityId,
        pub billing_id: EntityId,
        pub outsider_id: EntityId,
        pub product: Product,
        pub production: Environment,
        pub development: Environment,
    }

    impl SeededOrg {
        /// User id holding the given organization role.
        pub fn user_with_role(&self, role: OrganizationRole) -> EntityId {
            match role {
                OrganizationRole::Owner => self.owner_id,
                OrganizationRole::Manager => self.manager_id,
                OrganizationRole::Member => self.member_id,
                OrganizationRole::Billing => self.billing_id,
            }
        }
    }

    /// Insert a [`SeededOrg`] into `storage`.
    pub async fn seeded_org(storage: &dyn AsyncStorage) -> StorageResult<SeededOrg> {
        let organization = builders::organization("Acme Research");
        storage.organization_insert(&organization).await?;

        let owner_id = new_entity_id();
        let manager_id = new_entity_id();
        let member_id = new_entity_id();
        let billing_id = new_entity_id();
        for (user_id, role) in [
            (owner_id, OrganizationRole::Owner),
            (manager_id, OrganizationRole::Manager),
            (member_id, OrganizationRole::Member),
            (billing_id, OrganizationRole::Billing),
        ] {
            storage
                .membership_insert(&builders::membership(user_id, organization.id, role))
                .await?;
        }

        let product = builders::product(organization.id, "Customer Feedback");
        storage.product_insert(&product).await?;

        let production = builders::environment(product.id, EnvironmentType::Production);
        storage.environment_insert_seeded(&production, &[], &[]).await?;
        let development = builders::environment(product.id, EnvironmentType::Development);
        storage.environment_insert_seeded(&development, &[], &[]).await?;

        Ok(SeededOrg {
            organization,
            owner_id,
            manager_id,
            member_id,
            billing_id,
            outsider_id: new_entity_id(),
            product,
            production,
            development,
        })
    }

    /// A fresh `MockStorage` with a [`SeededOrg`] already inserted.
    pub struct Fixture {
        pub storage: Arc<MockStorage>,
        pub org: SeededOrg,
    }

    impl Fixture {
        pub async fn new() -> StorageResult<Self> {
            let storage = Arc::new(MockStorage::new());
            let org = seeded_org(storage.as_ref()).await?;
            Ok(Self { storage, org })
        }

        /// The storage as a trait object, the way services hold it.
        pub fn shared_storage(&self) -> Arc<dyn AsyncStorage> {
            self.storage.clone()
        }

        /// Insert a team into the seeded organization, optionally linked to
        /// the seeded product.
        pub async fn add_team(&self, name: &str, link_product: bool) -> StorageResult<Team> {
            let team = builders::team(self.org.organization.id, name);
            self.storage.team_insert(&team).await?;
            if link_product {
                self.storage
                    .product_team_insert(&ProductTeam {
                        product_id: self.org.product.id,
                        team_id: team.id,
                        permission: ProductTeamPermission::ReadWrite,
                    })
                    .await?;
            }
            Ok(team)
        }

        /// Add `user_id` to `team_id` with `role`.
        pub async fn add_team_member(
            &self,
            team_id: EntityId,
            user_id: EntityId,
            role: TeamRole,
        ) -> StorageResult<()> {
            self.storage
                .team_membership_insert(&TeamMembership {
                    team_id,
                    user_id,
                    role,
                })
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::Fixture;
    use super::*;
    use pollen_storage::AsyncStorage;

    #[tokio::test]
    async fn test_fixture_seeds_every_role() {
        let fixture = Fixture::new().await.unwrap();
        let org_id = fixture.org.organization.id;
        for role in [
            OrganizationRole::Owner,
            OrganizationRole::Manager,
            OrganizationRole::Member,
            OrganizationRole::Billing,
        ] {
            let user_id = fixture.org.user_with_role(role);
            let membership = fixture
                .storage
                .membership_get(user_id, org_id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(membership.role, role);
        }
        let outsider = fixture
            .storage
            .membership_get(fixture.org.outsider_id, org_id)
            .await
            .unwrap();
        assert!(outsider.is_none());
    }

    #[tokio::test]
    async fn test_fixture_add_team_links_product() {
        let fixture = Fixture::new().await.unwrap();
        let team = fixture.add_team("Support", true).await.unwrap();
        let details = fixture.storage.team_get(team.id).await.unwrap().unwrap();
        assert_eq!(details.product_ids, vec![fixture.org.product.id]);
    }
}
