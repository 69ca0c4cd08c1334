//! Async storage trait for asynchronous database operations.
//!
//! Services depend on this trait only. `MockStorage` implements it in memory
//! and the API crate provides a Postgres-backed implementation.

use ::async_trait::async_trait;
use pollen_core::{
    ActionClass, AttributeClass, EntityId, Environment, EnvironmentUpdateInput, Membership,
    Organization, Product, ProductTeam, StorageError, Team, TeamDetails, TeamMembership,
    TeamSummary, Timestamp,
};

/// Result type for raw storage calls.
pub type StorageResult<T> = Result<T, StorageError>;

/// Which teams of an organization a listing should return, relative to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamMemberFilter {
    /// Every team in the organization.
    All,
    /// Teams the user belongs to. Rows carry the user's role.
    MemberOf(EntityId),
    /// Teams the user does not belong to.
    NotMemberOf(EntityId),
}

impl TeamMemberFilter {
    /// Whether a team with the given member set passes this filter.
    pub fn admits(&self, is_member: impl Fn(EntityId) -> bool) -> bool {
        match self {
            TeamMemberFilter::All => true,
            TeamMemberFilter::MemberOf(user_id) => is_member(*user_id),
            TeamMemberFilter::NotMemberOf(user_id) => !is_member(*user_id),
        }
    }
}

/// Async storage trait for database operations.
///
/// List operations return rows ordered by `created_at` ascending, ties broken
/// by id, so "first" lookups are deterministic across backends.
#[async_trait]
pub trait AsyncStorage: Send + Sync {
    // ========================================================================
    // ORGANIZATION OPERATIONS
    // ========================================================================

    /// Insert a new organization.
    async fn organization_insert(&self, o: &Organization) -> StorageResult<()>;

    /// Get an organization by ID.
    async fn organization_get(&self, id: EntityId) -> StorageResult<Option<Organization>>;

    /// List organizations the user holds a membership in.
    async fn organization_list_by_user(&self, user_id: EntityId)
        -> StorageResult<Vec<Organization>>;

    // ========================================================================
    // MEMBERSHIP OPERATIONS
    // ========================================================================

    /// Insert an organization membership. Fails on a duplicate `(user, organization)`.
    async fn membership_insert(&self, m: &Membership) -> StorageResult<()>;

    /// Get the membership of a user in an organization.
    async fn membership_get(
        &self,
        user_id: EntityId,
        organization_id: EntityId,
    ) -> StorageResult<Option<Membership>>;

    /// List all organization memberships of a user.
    async fn membership_list_by_user(&self, user_id: EntityId) -> StorageResult<Vec<Membership>>;

    /// List all memberships of an organization.
    async fn membership_list_by_organization(
        &self,
        organization_id: EntityId,
    ) -> StorageResult<Vec<Membership>>;

    // ========================================================================
    // PRODUCT OPERATIONS
    // ========================================================================

    /// Insert a new product.
    async fn product_insert(&self, p: &Product) -> StorageResult<()>;

    /// Get a product by ID.
    async fn product_get(&self, id: EntityId) -> StorageResult<Option<Product>>;

    /// List products of an organization.
    async fn product_list_by_organization(
        &self,
        organization_id: EntityId,
    ) -> StorageResult<Vec<Product>>;

    /// Link a team to a product.
    async fn product_team_insert(&self, link: &ProductTeam) -> StorageResult<()>;

    // ========================================================================
    // TEAM OPERATIONS
    // ========================================================================

    /// Insert a new team. Fails with `UniqueViolation` on a duplicate name
    /// within the organization.
    async fn team_insert(&self, t: &Team) -> StorageResult<()>;

    /// Get a team with the ids of its linked products.
    async fn team_get(&self, id: EntityId) -> StorageResult<Option<TeamDetails>>;

    /// Find a team by exact name within an organization.
    async fn team_find_by_name(
        &self,
        organization_id: EntityId,
        name: &str,
    ) -> StorageResult<Option<Team>>;

    /// List team summaries of an organization, filtered relative to a user.
    async fn team_list_by_organization(
        &self,
        organization_id: EntityId,
        filter: TeamMemberFilter,
    ) -> StorageResult<Vec<TeamSummary>>;

    // ========================================================================
    // TEAM MEMBERSHIP OPERATIONS
    // ========================================================================

    /// Insert a team membership. Fails with `UniqueViolation` if the user
    /// already belongs to the team.
    async fn team_membership_insert(&self, m: &TeamMembership) -> StorageResult<()>;

    /// Get a team membership.
    async fn team_membership_get(
        &self,
        team_id: EntityId,
        user_id: EntityId,
    ) -> StorageResult<Option<TeamMembership>>;

    /// Delete a team membership, returning the removed row if there was one.
    async fn team_membership_delete(
        &self,
        team_id: EntityId,
        user_id: EntityId,
    ) -> StorageResult<Option<TeamMembership>>;

    // ========================================================================
    // ENVIRONMENT OPERATIONS
    // ========================================================================

    /// Get an environment by ID.
    async fn environment_get(&self, id: EntityId) -> StorageResult<Option<Environment>>;

    /// List environments of a product.
    async fn environment_list_by_product(
        &self,
        product_id: EntityId,
    ) -> StorageResult<Vec<Environment>>;

    /// Insert an environment together with its seeded classes, all or nothing.
    async fn environment_insert_seeded(
        &self,
        environment: &Environment,
        action_classes: &[ActionClass],
        attribute_classes: &[AttributeClass],
    ) -> StorageResult<()>;

    /// Apply a partial update. Returns `None` if the environment does not exist.
    async fn environment_update(
        &self,
        id: EntityId,
        patch: &EnvironmentUpdateInput,
        updated_at: Timestamp,
    ) -> StorageResult<Option<Environment>>;

    /// List action classes of an environment.
    async fn action_class_list_by_environment(
        &self,
        environment_id: EntityId,
    ) -> StorageResult<Vec<ActionClass>>;

    /// List attribute classes of an environment.
    async fn attribute_class_list_by_environment(
        &self,
        environment_id: EntityId,
    ) -> StorageResult<Vec<AttributeClass>>;

    // ========================================================================
    // HEALTH & DIAGNOSTICS
    // ========================================================================

    /// Check if the storage backend is healthy.
    async fn health_check(&self) -> StorageResult<bool>;
}
