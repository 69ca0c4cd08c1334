//! Environment Service
//!
//! Environment reads and writes, seeding of new environments, and
//! resolution of a user's production environments.

use std::sync::Arc;

use futures_util::future::try_join_all;
use pollen_core::{
    ensure_id, new_entity_id, now, seeded_classes, ActionClass, AttributeClass, EntityId,
    Environment, EnvironmentCreateInput, EnvironmentType, EnvironmentUpdateInput, PollenError,
    PollenResult,
};
use pollen_storage::{AsyncStorage, CacheKey, MemoCache, TagScope, TagSelector};
use tracing::{debug, info};

use super::OrganizationService;

/// Environment CRUD and lookups.
#[derive(Clone)]
pub struct EnvironmentService {
    storage: Arc<dyn AsyncStorage>,
    cache: Arc<MemoCache>,
}

fn unresolved(reason: String) -> PollenError {
    PollenError::Unresolved(format!("Unable to get first environment: {}", reason))
}

async fn load_environments(
    storage: Arc<dyn AsyncStorage>,
    product_id: EntityId,
) -> PollenResult<Vec<Environment>> {
    debug!(%product_id, "Loading environments");
    if storage.product_get(product_id).await?.is_none() {
        return Err(PollenError::not_found("Product", product_id));
    }
    Ok(storage.environment_list_by_product(product_id).await?)
}

async fn load_production_environment_ids(
    storage: Arc<dyn AsyncStorage>,
    user_id: EntityId,
) -> PollenResult<Vec<EntityId>> {
    debug!(%user_id, "Loading production environment ids");
    let memberships = storage.membership_list_by_user(user_id).await?;

    let products = try_join_all(memberships.iter().map(|membership| {
        storage.product_list_by_organization(membership.organization_id)
    }))
    .await?;

    let environments = try_join_all(
        products
            .iter()
            .flatten()
            .map(|product| storage.environment_list_by_product(product.id)),
    )
    .await?;

    Ok(environments
        .into_iter()
        .flatten()
        .filter(|environment| environment.environment_type == EnvironmentType::Production)
        .map(|environment| environment.id)
        .collect())
}

impl EnvironmentService {
    pub fn new(storage: Arc<dyn AsyncStorage>, cache: Arc<MemoCache>) -> Self {
        Self { storage, cache }
    }

    fn organizations(&self) -> OrganizationService {
        OrganizationService::new(self.storage.clone(), self.cache.clone())
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Environment by id, or `None` if it does not exist.
    pub async fn get_environment(&self, environment_id: EntityId) -> PollenResult<Option<Environment>> {
        ensure_id(environment_id, "environmentId")?;

        let key = CacheKey::new("getEnvironment").arg(environment_id);
        let storage = self.storage.clone();
        self.cache
            .get_or_compute(
                key,
                &[TagScope::Environment.by_id(environment_id)],
                move || async move {
                    let environment = storage.environment_get(environment_id).await?;
                    Ok::<_, PollenError>(environment)
                },
            )
            .await
    }

    /// Environments of a product, oldest first.
    pub async fn get_environments(&self, product_id: EntityId) -> PollenResult<Vec<Environment>> {
        ensure_id(product_id, "productId")?;

        let key = CacheKey::new("getEnvironments").arg(product_id);
        let storage = self.storage.clone();
        self.cache
            .get_or_compute(
                key,
                &[TagScope::Environment.by_product_id(product_id)],
                move || load_environments(storage, product_id),
            )
            .await
    }

    pub async fn get_action_classes(&self, environment_id: EntityId) -> PollenResult<Vec<ActionClass>> {
        ensure_id(environment_id, "environmentId")?;
        Ok(self
            .storage
            .action_class_list_by_environment(environment_id)
            .await?)
    }

    pub async fn get_attribute_classes(
        &self,
        environment_id: EntityId,
    ) -> PollenResult<Vec<AttributeClass>> {
        ensure_id(environment_id, "environmentId")?;
        Ok(self
            .storage
            .attribute_class_list_by_environment(environment_id)
            .await?)
    }

    /// The production environment of the user's first product in their
    /// first organization.
    ///
    /// # Errors
    /// `Unresolved` naming the first step that came up empty. Errors from the
    /// organization and product lookups are returned unchanged.
    pub async fn get_first_environment_by_user_id(&self, user_id: EntityId) -> PollenResult<Environment> {
        ensure_id(user_id, "userId")?;
        let organizations = self.organizations();

        let organization = organizations
            .get_organizations_by_user_id(user_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| unresolved(format!("User {} has no organizations", user_id)))?;

        let product = organizations
            .get_products(organization.id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| unresolved(format!("Organization {} has no products", organization.id)))?;

        product.production_environment().cloned().ok_or_else(|| {
            unresolved(format!(
                "Product {} has no production environment",
                product.product.id
            ))
        })
    }

    /// Ids of every production environment reachable from the user's
    /// organization memberships. Empty is a valid answer.
    pub async fn get_production_environment_ids_by_user_id(
        &self,
        user_id: EntityId,
    ) -> PollenResult<Vec<EntityId>> {
        ensure_id(user_id, "userId")?;

        let key = CacheKey::new("getProductionEnvironmentIdsByUserId").arg(user_id);
        let tags = [
            TagScope::Membership.by_user_id(user_id),
            TagScope::Product.by_user_id(user_id),
            TagScope::Organization.by_user_id(user_id),
            TagScope::Environment.by_user_id(user_id),
        ];
        let storage = self.storage.clone();
        self.cache
            .get_or_compute(key, &tags, move || load_production_environment_ids(storage, user_id))
            .await
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Apply a partial update. `updated_at` is set by the server.
    pub async fn update_environment(
        &self,
        environment_id: EntityId,
        patch: EnvironmentUpdateInput,
    ) -> PollenResult<Environment> {
        ensure_id(environment_id, "environmentId")?;

        let environment = self
            .storage
            .environment_update(environment_id, &patch, now())
            .await?
            .ok_or_else(|| PollenError::not_found("Environment", environment_id))?;

        info!(%environment_id, product_id = %environment.product_id, "Environment updated");
        let organization_id = self
            .storage
            .product_get(environment.product_id)
            .await?
            .map(|product| product.organization_id);
        self.revalidate_environment(&environment, organization_id)
            .await?;
        Ok(environment)
    }

    /// Create an environment under a product, seeded with the default action
    /// and attribute classes in the same write.
    pub async fn create_environment(
        &self,
        product_id: EntityId,
        input: EnvironmentCreateInput,
    ) -> PollenResult<Environment> {
        ensure_id(product_id, "productId")?;

        let product = self
            .storage
            .product_get(product_id)
            .await?
            .ok_or_else(|| PollenError::not_found("Product", product_id))?;

        let at = now();
        let environment = Environment {
            id: new_entity_id(),
            product_id,
            environment_type: input.environment_type.unwrap_or_default(),
            app_setup_completed: input.app_setup_completed.unwrap_or(false),
            website_setup_completed: input.website_setup_completed.unwrap_or(false),
            created_at: at,
            updated_at: at,
        };
        let (action_classes, attribute_classes) = seeded_classes(environment.id, at);

        self.storage
            .environment_insert_seeded(&environment, &action_classes, &attribute_classes)
            .await?;

        info!(
            environment_id = %environment.id,
            %product_id,
            environment_type = %environment.environment_type,
            "Environment created"
        );
        self.revalidate_environment(&environment, Some(product.organization_id))
            .await?;
        Ok(environment)
    }

    /// Revalidate the environment's own tags and, since every member of the
    /// owning organization may list it among their production environments,
    /// each member's environment tag.
    async fn revalidate_environment(
        &self,
        environment: &Environment,
        organization_id: Option<EntityId>,
    ) -> PollenResult<()> {
        let mut selector = TagSelector::new()
            .with_id(environment.id)
            .with_product_id(environment.product_id);
        let mut member_tags = Vec::new();
        if let Some(organization_id) = organization_id {
            selector = selector.with_organization_id(organization_id);
            member_tags = self
                .storage
                .membership_list_by_organization(organization_id)
                .await?
                .into_iter()
                .map(|membership| TagScope::Environment.by_user_id(membership.user_id))
                .collect();
        }
        let mut tags = selector.tags(TagScope::Environment);
        tags.extend(member_tags);
        let evicted = self.cache.revalidate(&tags).await;
        debug!(environment_id = %environment.id, evicted, "Revalidated environment tags");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollen_core::{ActionClassType, AttributeClassType};
    use pollen_storage::CacheConfig;
    use pollen_test_utils::builders;
    use pollen_test_utils::fixtures::Fixture;

    fn service(fixture: &Fixture) -> EnvironmentService {
        EnvironmentService::new(
            fixture.shared_storage(),
            Arc::new(MemoCache::new(CacheConfig::default())),
        )
    }

    #[tokio::test]
    async fn test_create_environment_defaults_and_seeds() {
        let fixture = Fixture::new().await.unwrap();
        let environments = service(&fixture);

        let created = environments
            .create_environment(fixture.org.product.id, EnvironmentCreateInput::default())
            .await
            .unwrap();
        assert_eq!(created.environment_type, EnvironmentType::Development);
        assert!(!created.app_setup_completed);
        assert!(!created.website_setup_completed);

        let actions = environments.get_action_classes(created.id).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].name, "New Session");
        assert_eq!(actions[0].action_type, ActionClassType::Automatic);

        let mut attribute_names: Vec<_> = environments
            .get_attribute_classes(created.id)
            .await
            .unwrap()
            .into_iter()
            .inspect(|a| assert_eq!(a.attribute_type, AttributeClassType::Automatic))
            .map(|a| a.name)
            .collect();
        attribute_names.sort();
        assert_eq!(attribute_names, vec!["email", "language"]);
    }

    #[tokio::test]
    async fn test_create_environment_unknown_product_writes_nothing() {
        let fixture = Fixture::new().await.unwrap();
        let before = fixture.storage.environment_count().unwrap();
        let missing = new_entity_id();
        let err = service(&fixture)
            .create_environment(missing, EnvironmentCreateInput::default())
            .await
            .unwrap_err();
        assert_eq!(err, PollenError::not_found("Product", missing));
        assert_eq!(fixture.storage.environment_count().unwrap(), before);
    }

    #[tokio::test]
    async fn test_create_environment_invalidates_listing() {
        let fixture = Fixture::new().await.unwrap();
        let environments = service(&fixture);
        let product_id = fixture.org.product.id;

        assert_eq!(environments.get_environments(product_id).await.unwrap().len(), 2);
        environments
            .create_environment(product_id, EnvironmentCreateInput::default())
            .await
            .unwrap();
        assert_eq!(environments.get_environments(product_id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_get_environments_unknown_product() {
        let fixture = Fixture::new().await.unwrap();
        let missing = new_entity_id();
        let err = service(&fixture).get_environments(missing).await.unwrap_err();
        assert_eq!(err, PollenError::not_found("Product", missing));
    }

    #[tokio::test]
    async fn test_update_environment_patches_and_invalidates() {
        let fixture = Fixture::new().await.unwrap();
        let environments = service(&fixture);
        let id = fixture.org.development.id;

        let cached = environments.get_environment(id).await.unwrap().unwrap();
        assert!(!cached.app_setup_completed);

        let patch = EnvironmentUpdateInput {
            app_setup_completed: Some(true),
            ..Default::default()
        };
        let updated = environments.update_environment(id, patch).await.unwrap();
        assert!(updated.app_setup_completed);
        assert!(!updated.website_setup_completed);
        assert_eq!(updated.environment_type, EnvironmentType::Development);
        assert!(updated.updated_at >= cached.updated_at);

        let reread = environments.get_environment(id).await.unwrap().unwrap();
        assert_eq!(reread, updated);
    }

    #[tokio::test]
    async fn test_update_unknown_environment() {
        let fixture = Fixture::new().await.unwrap();
        let missing = new_entity_id();
        let err = service(&fixture)
            .update_environment(missing, EnvironmentUpdateInput::default())
            .await
            .unwrap_err();
        assert_eq!(err, PollenError::not_found("Environment", missing));
    }

    #[tokio::test]
    async fn test_first_environment_resolves_production() {
        let fixture = Fixture::new().await.unwrap();
        let first = service(&fixture)
            .get_first_environment_by_user_id(fixture.org.member_id)
            .await
            .unwrap();
        assert_eq!(first.id, fixture.org.production.id);
    }

    #[tokio::test]
    async fn test_first_environment_without_organizations() {
        let fixture = Fixture::new().await.unwrap();
        let outsider = fixture.org.outsider_id;
        let err = service(&fixture)
            .get_first_environment_by_user_id(outsider)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PollenError::Unresolved(format!(
                "Unable to get first environment: User {} has no organizations",
                outsider
            ))
        );
    }

    #[tokio::test]
    async fn test_first_environment_without_products() {
        let storage = Arc::new(pollen_storage::MockStorage::new());
        let organization = builders::organization("Empty");
        storage.organization_insert(&organization).await.unwrap();
        let user_id = new_entity_id();
        storage
            .membership_insert(&builders::membership(
                user_id,
                organization.id,
                pollen_core::OrganizationRole::Owner,
            ))
            .await
            .unwrap();

        let environments = EnvironmentService::new(
            storage,
            Arc::new(MemoCache::new(CacheConfig::default())),
        );
        let err = environments
            .get_first_environment_by_user_id(user_id)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PollenError::Unresolved(format!(
                "Unable to get first environment: Organization {} has no products",
                organization.id
            ))
        );
    }

    #[tokio::test]
    async fn test_first_environment_without_production() {
        let fixture = Fixture::new().await.unwrap();
        let environments = service(&fixture);
        environments
            .update_environment(
                fixture.org.production.id,
                EnvironmentUpdateInput {
                    environment_type: Some(EnvironmentType::Development),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = environments
            .get_first_environment_by_user_id(fixture.org.owner_id)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PollenError::Unresolved(format!(
                "Unable to get first environment: Product {} has no production environment",
                fixture.org.product.id
            ))
        );
    }

    #[tokio::test]
    async fn test_production_environment_ids() {
        let fixture = Fixture::new().await.unwrap();
        let environments = service(&fixture);

        let ids = environments
            .get_production_environment_ids_by_user_id(fixture.org.billing_id)
            .await
            .unwrap();
        assert_eq!(ids, vec![fixture.org.production.id]);

        let none = environments
            .get_production_environment_ids_by_user_id(fixture.org.outsider_id)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_production_environment_ids_see_new_environment() {
        let fixture = Fixture::new().await.unwrap();
        let environments = service(&fixture);
        let owner = fixture.org.owner_id;

        let before = environments
            .get_production_environment_ids_by_user_id(owner)
            .await
            .unwrap();
        assert_eq!(before, vec![fixture.org.production.id]);

        let created = environments
            .create_environment(
                fixture.org.product.id,
                EnvironmentCreateInput {
                    environment_type: Some(EnvironmentType::Production),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let after = environments
            .get_production_environment_ids_by_user_id(owner)
            .await
            .unwrap();
        assert_eq!(after.len(), 2);
        assert!(after.contains(&created.id));

        // Another member of the organization sees it too.
        let member_view = environments
            .get_production_environment_ids_by_user_id(fixture.org.member_id)
            .await
            .unwrap();
        assert!(member_view.contains(&created.id));
    }

    #[tokio::test]
    async fn test_production_environment_ids_drop_demoted_environment() {
        let fixture = Fixture::new().await.unwrap();
        let environments = service(&fixture);
        let member = fixture.org.member_id;

        assert_eq!(
            environments
                .get_production_environment_ids_by_user_id(member)
                .await
                .unwrap()
                .len(),
            1
        );
        environments
            .update_environment(
                fixture.org.production.id,
                EnvironmentUpdateInput {
                    environment_type: Some(EnvironmentType::Development),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(environments
            .get_production_environment_ids_by_user_id(member)
            .await
            .unwrap()
            .is_empty());
    }
}
