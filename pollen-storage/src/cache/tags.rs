//! Cache tags, tag selectors, and cache keys.
//!
//! A `CacheTag` can only be built from a scope, a dimension, and an id, so
//! every tag string in the process comes from the same formatting rule and
//! readers and writers can never disagree on spelling.

use pollen_core::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache family a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagScope {
    Team,
    Environment,
    User,
    Membership,
    Product,
    Organization,
}

/// Which relation of the scope a tag is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagDimension {
    Id,
    UserId,
    OrganizationId,
    ProductId,
}

impl TagScope {
    /// Plural collection name used in tag strings.
    pub fn collection(&self) -> &'static str {
        match self {
            TagScope::Team => "teams",
            TagScope::Environment => "environments",
            TagScope::User => "users",
            TagScope::Membership => "memberships",
            TagScope::Product => "products",
            TagScope::Organization => "organizations",
        }
    }

    pub fn by_id(self, id: EntityId) -> CacheTag {
        CacheTag::new(self, TagDimension::Id, id)
    }

    pub fn by_user_id(self, user_id: EntityId) -> CacheTag {
        CacheTag::new(self, TagDimension::UserId, user_id)
    }

    pub fn by_organization_id(self, organization_id: EntityId) -> CacheTag {
        CacheTag::new(self, TagDimension::OrganizationId, organization_id)
    }

    pub fn by_product_id(self, product_id: EntityId) -> CacheTag {
        CacheTag::new(self, TagDimension::ProductId, product_id)
    }
}

impl TagDimension {
    /// Collection prefix of the owning relation, or `None` for `Id`.
    fn owner_collection(&self) -> Option<&'static str> {
        match self {
            TagDimension::Id => None,
            TagDimension::UserId => Some("users"),
            TagDimension::OrganizationId => Some("organizations"),
            TagDimension::ProductId => Some("products"),
        }
    }
}

// ============================================================================
// CACHE TAG
// ============================================================================

/// An opaque invalidation label attached to cached reads.
///
/// # Format
///
/// - `Id`: `<collection>-<id>`, e.g. `teams-<id>`
/// - other dimensions: `<owner>-<id>-<collection>`, e.g. `users-<uid>-teams`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheTag {
    /// Private inner data - cannot be constructed externally
    inner: String,
}

impl CacheTag {
    /// Create a tag. This is the only constructor.
    pub fn new(scope: TagScope, dimension: TagDimension, id: EntityId) -> Self {
        let inner = match dimension.owner_collection() {
            None => format!("{}-{}", scope.collection(), id),
            Some(owner) => format!("{}-{}-{}", owner, id, scope.collection()),
        };
        Self { inner }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

// ============================================================================
// TAG SELECTOR
// ============================================================================

/// Set of optional dimensions naming what changed. Each populated
/// dimension yields one tag for a given scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<EntityId>,
}

impl TagSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_user_id(mut self, user_id: EntityId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_organization_id(mut self, organization_id: EntityId) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    pub fn with_product_id(mut self, product_id: EntityId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.user_id.is_none()
            && self.organization_id.is_none()
            && self.product_id.is_none()
    }

    /// Tags this selector names within `scope`, one per populated dimension.
    pub fn tags(&self, scope: TagScope) -> Vec<CacheTag> {
        [
            (TagDimension::Id, self.id),
            (TagDimension::UserId, self.user_id),
            (TagDimension::OrganizationId, self.organization_id),
            (TagDimension::ProductId, self.product_id),
        ]
        .into_iter()
        .filter_map(|(dimension, id)| id.map(|id| CacheTag::new(scope, dimension, id)))
        .collect()
    }
}

// ============================================================================
// CACHE KEY
// ============================================================================

/// Memoization key: `<operation>-<arg1>-<arg2>...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    inner: String,
}

impl CacheKey {
    /// Start a key for the named read operation.
    pub fn new(operation: &str) -> Self {
        Self {
            inner: operation.to_string(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.inner.push('-');
        self.inner.push_str(&value.to_string());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn id(s: &str) -> EntityId {
        Uuid::parse_str(s).unwrap()
    }

    #[test]
    fn test_tag_strings() {
        let team = id("0192f0c4-0000-7000-8000-000000000001");
        let user = id("0192f0c4-0000-7000-8000-000000000002");
        assert_eq!(
            TagScope::Team.by_id(team).as_str(),
            "teams-0192f0c4-0000-7000-8000-000000000001"
        );
        assert_eq!(
            TagScope::Team.by_user_id(user).to_string(),
            "users-0192f0c4-0000-7000-8000-000000000002-teams"
        );
        assert_eq!(
            TagScope::Environment.by_product_id(team).to_string(),
            "products-0192f0c4-0000-7000-8000-000000000001-environments"
        );
        assert_eq!(
            TagScope::Team.by_organization_id(team).to_string(),
            "organizations-0192f0c4-0000-7000-8000-000000000001-teams"
        );
    }

    #[test]
    fn test_selector_yields_one_tag_per_dimension() {
        let team = Uuid::now_v7();
        let user = Uuid::now_v7();
        let selector = TagSelector::new().with_id(team).with_user_id(user);

        let tags = selector.tags(TagScope::Team);
        assert_eq!(
            tags,
            vec![TagScope::Team.by_id(team), TagScope::Team.by_user_id(user)]
        );
        assert!(TagSelector::new().tags(TagScope::Team).is_empty());
        assert!(TagSelector::new().is_empty());
    }

    #[test]
    fn test_cache_key_format() {
        let user = id("0192f0c4-0000-7000-8000-000000000002");
        let org = id("0192f0c4-0000-7000-8000-000000000003");
        let key = CacheKey::new("getUserTeams").arg(user).arg(org);
        assert_eq!(
            key.as_str(),
            "getUserTeams-0192f0c4-0000-7000-8000-000000000002-0192f0c4-0000-7000-8000-000000000003"
        );
    }

    #[test]
    fn test_selector_json_shape() -> Result<(), serde_json::Error> {
        let product = id("0192f0c4-0000-7000-8000-000000000004");
        let selector: TagSelector = serde_json::from_str(
            r#"{"product_id":"0192f0c4-0000-7000-8000-000000000004"}"#,
        )?;
        assert_eq!(selector, TagSelector::new().with_product_id(product));
        assert!(serde_json::from_str::<TagSelector>(r#"{"team":"x"}"#).is_err());
        Ok(())
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn scope_strategy() -> impl Strategy<Value = TagScope> {
        prop_oneof![
            Just(TagScope::Team),
            Just(TagScope::Environment),
            Just(TagScope::User),
            Just(TagScope::Membership),
            Just(TagScope::Product),
            Just(TagScope::Organization),
        ]
    }

    fn dimension_strategy() -> impl Strategy<Value = TagDimension> {
        prop_oneof![
            Just(TagDimension::Id),
            Just(TagDimension::UserId),
            Just(TagDimension::OrganizationId),
            Just(TagDimension::ProductId),
        ]
    }

    fn uuid_strategy() -> impl Strategy<Value = Uuid> {
        any::<u128>().prop_map(Uuid::from_u128)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Distinct (scope, dimension, id) triples never share a tag string.
        #[test]
        fn prop_tag_is_injective(
            a in (scope_strategy(), dimension_strategy(), uuid_strategy()),
            b in (scope_strategy(), dimension_strategy(), uuid_strategy()),
        ) {
            let tag_a = CacheTag::new(a.0, a.1, a.2);
            let tag_b = CacheTag::new(b.0, b.1, b.2);
            if a == b {
                prop_assert_eq!(tag_a, tag_b);
            } else {
                prop_assert_ne!(tag_a, tag_b);
            }
        }

        #[test]
        fn prop_tag_contains_id(
            scope in scope_strategy(),
            dimension in dimension_strategy(),
            id in uuid_strategy(),
        ) {
            let tag = CacheTag::new(scope, dimension, id);
            prop_assert!(tag.as_str().contains(&id.to_string()));
        }

        #[test]
        fn prop_selector_tag_count_matches_populated_fields(
            scope in scope_strategy(),
            id in proptest::option::of(uuid_strategy()),
            user_id in proptest::option::of(uuid_strategy()),
            organization_id in proptest::option::of(uuid_strategy()),
            product_id in proptest::option::of(uuid_strategy()),
        ) {
            let selector = TagSelector { id, user_id, organization_id, product_id };
            let populated = [id, user_id, organization_id, product_id]
                .iter()
                .filter(|v| v.is_some())
                .count();
            prop_assert_eq!(selector.tags(scope).len(), populated);
        }
    }
}
