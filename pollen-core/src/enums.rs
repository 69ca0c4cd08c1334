//! Enum types for Pollen entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CORE ENUMS
// ============================================================================

/// Entity type discriminator used in storage errors and not-found reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Organization,
    Membership,
    Product,
    ProductTeam,
    Team,
    TeamMembership,
    Environment,
    ActionClass,
    AttributeClass,
}

/// A user's role inside an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationRole {
    Owner,
    Manager,
    Member,
    Billing,
}

/// A user's role inside a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Admin,
    Contributor,
}

/// Access level a team has on a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductTeamPermission {
    Read,
    ReadWrite,
    Manage,
}

/// Deployment context of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentType {
    Production,
    #[default]
    Development,
}

/// How an action class is fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionClassType {
    Automatic,
    Code,
    NoCode,
}

/// Origin of an attribute class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeClassType {
    Automatic,
    Code,
}

impl OrganizationRole {
    /// Team role granted when a member of this organization joins a team.
    ///
    /// Owners and managers administer every team they join; everyone else
    /// contributes.
    pub fn team_role(self) -> TeamRole {
        match self {
            OrganizationRole::Owner | OrganizationRole::Manager => TeamRole::Admin,
            OrganizationRole::Member | OrganizationRole::Billing => TeamRole::Contributor,
        }
    }
}

// ============================================================================
// WIRE NAMES
// ============================================================================

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Organization => "Organization",
            EntityType::Membership => "Membership",
            EntityType::Product => "Product",
            EntityType::ProductTeam => "ProductTeam",
            EntityType::Team => "Team",
            EntityType::TeamMembership => "TeamMembership",
            EntityType::Environment => "Environment",
            EntityType::ActionClass => "ActionClass",
            EntityType::AttributeClass => "AttributeClass",
        }
    }
}

impl OrganizationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationRole::Owner => "owner",
            OrganizationRole::Manager => "manager",
            OrganizationRole::Member => "member",
            OrganizationRole::Billing => "billing",
        }
    }
}

impl TeamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Admin => "admin",
            TeamRole::Contributor => "contributor",
        }
    }
}

impl ProductTeamPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductTeamPermission::Read => "read",
            ProductTeamPermission::ReadWrite => "readWrite",
            ProductTeamPermission::Manage => "manage",
        }
    }
}

impl EnvironmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentType::Production => "production",
            EnvironmentType::Development => "development",
        }
    }
}

impl ActionClassType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionClassType::Automatic => "automatic",
            ActionClassType::Code => "code",
            ActionClassType::NoCode => "noCode",
        }
    }
}

impl AttributeClassType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeClassType::Automatic => "automatic",
            AttributeClassType::Code => "code",
        }
    }
}

fn normalize_token(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

macro_rules! impl_display_via_as_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.as_str())
                }
            }
        )*
    };
}

impl_display_via_as_str!(
    EntityType,
    OrganizationRole,
    TeamRole,
    ProductTeamPermission,
    EnvironmentType,
    ActionClassType,
    AttributeClassType,
);

impl FromStr for OrganizationRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "owner" => Ok(OrganizationRole::Owner),
            "manager" => Ok(OrganizationRole::Manager),
            "member" => Ok(OrganizationRole::Member),
            "billing" => Ok(OrganizationRole::Billing),
            _ => Err(format!("Invalid OrganizationRole: {}", s)),
        }
    }
}

impl FromStr for TeamRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "admin" => Ok(TeamRole::Admin),
            "contributor" => Ok(TeamRole::Contributor),
            _ => Err(format!("Invalid TeamRole: {}", s)),
        }
    }
}

impl FromStr for ProductTeamPermission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "read" => Ok(ProductTeamPermission::Read),
            "readwrite" => Ok(ProductTeamPermission::ReadWrite),
            "manage" => Ok(ProductTeamPermission::Manage),
            _ => Err(format!("Invalid ProductTeamPermission: {}", s)),
        }
    }
}

impl FromStr for EnvironmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "production" | "prod" => Ok(EnvironmentType::Production),
            "development" | "dev" => Ok(EnvironmentType::Development),
            _ => Err(format!("Invalid EnvironmentType: {}", s)),
        }
    }
}

impl FromStr for ActionClassType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "automatic" => Ok(ActionClassType::Automatic),
            "code" => Ok(ActionClassType::Code),
            "nocode" => Ok(ActionClassType::NoCode),
            _ => Err(format!("Invalid ActionClassType: {}", s)),
        }
    }
}

impl FromStr for AttributeClassType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "automatic" => Ok(AttributeClassType::Automatic),
            "code" => Ok(AttributeClassType::Code),
            _ => Err(format!("Invalid AttributeClassType: {}", s)),
        }
    }
}
