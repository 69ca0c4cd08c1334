//! Core entity structures

use crate::{
    ActionClassType, AttributeClassType, EntityId, EnvironmentType, OrganizationRole,
    ProductTeamPermission, TeamRole, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Organization - top-level tenant that owns products, teams, and members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: EntityId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Organization-level membership of a user.
/// Keyed by `(user_id, organization_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: EntityId,
    pub organization_id: EntityId,
    pub role: OrganizationRole,
    pub accepted: bool,
}

/// Product - a surveyed application inside an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Link granting a team access to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTeam {
    pub product_id: EntityId,
    pub team_id: EntityId,
    pub permission: ProductTeamPermission,
}

/// Team - named group of users within an organization.
/// Names are unique per organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A team together with the products it is linked to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDetails {
    pub team: Team,
    pub product_ids: Vec<EntityId>,
}

/// Team membership join row. At most one per `(team_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub team_id: EntityId,
    pub user_id: EntityId,
    pub role: TeamRole,
}

/// Environment - one deployment context (production or development) of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: EntityId,
    pub product_id: EntityId,
    #[serde(rename = "type")]
    pub environment_type: EnvironmentType,
    pub app_setup_completed: bool,
    pub website_setup_completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Trackable event definition seeded into an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionClass {
    pub id: EntityId,
    pub environment_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub action_type: ActionClassType,
    pub created_at: Timestamp,
}

/// Trackable person attribute definition seeded into an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeClass {
    pub id: EntityId,
    pub environment_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub attribute_type: AttributeClassType,
    pub created_at: Timestamp,
}

// ============================================================================
// READ PROJECTIONS
// ============================================================================

/// Storage-level team row with membership aggregates.
///
/// `member_role` is set only when the listing was filtered to teams the
/// user belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub id: EntityId,
    pub name: String,
    pub member_role: Option<TeamRole>,
    pub member_count: u64,
}

/// A team the user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTeam {
    pub id: EntityId,
    pub name: String,
    pub user_role: TeamRole,
    pub member_count: u64,
}

/// A team in the same organization the user does not belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherTeam {
    pub id: EntityId,
    pub name: String,
    pub member_count: u64,
}

/// Both team views for one (user, organization) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamsOverview {
    pub user_teams: Vec<UserTeam>,
    pub other_teams: Vec<OtherTeam>,
}

/// Product with its environments attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWithEnvironments {
    #[serde(flatten)]
    pub product: Product,
    pub environments: Vec<Environment>,
}

impl ProductWithEnvironments {
    /// The production environment, if the product has one.
    pub fn production_environment(&self) -> Option<&Environment> {
        self.environments
            .iter()
            .find(|environment| environment.environment_type == EnvironmentType::Production)
    }
}

// ============================================================================
// INPUT TYPES
// ============================================================================

/// Input for creating an environment. Unset fields take server defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentCreateInput {
    #[serde(rename = "type", default)]
    pub environment_type: Option<EnvironmentType>,
    #[serde(default)]
    pub app_setup_completed: Option<bool>,
    #[serde(default)]
    pub website_setup_completed: Option<bool>,
}

/// Partial patch for an environment. `updated_at` is always server-assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentUpdateInput {
    #[serde(rename = "type", default)]
    pub environment_type: Option<EnvironmentType>,
    #[serde(default)]
    pub app_setup_completed: Option<bool>,
    #[serde(default)]
    pub website_setup_completed: Option<bool>,
}

impl EnvironmentUpdateInput {
    /// Apply this patch to an environment, stamping `updated_at`.
    pub fn apply_to(&self, environment: &mut Environment, updated_at: Timestamp) {
        if let Some(environment_type) = self.environment_type {
            environment.environment_type = environment_type;
        }
        if let Some(app) = self.app_setup_completed {
            environment.app_setup_completed = app;
        }
        if let Some(website) = self.website_setup_completed {
            environment.website_setup_completed = website;
        }
        environment.updated_at = updated_at;
    }
}
