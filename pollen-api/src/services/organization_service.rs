//! Organization Service
//!
//! Organization and product lookups used to resolve a user's environments.

use std::sync::Arc;

use futures_util::future::try_join_all;
use pollen_core::{
    ensure_id, EntityId, Organization, PollenError, PollenResult, Product, ProductWithEnvironments,
};
use pollen_storage::{AsyncStorage, CacheKey, MemoCache, TagScope};
use tracing::debug;

/// Read-only organization and product queries.
#[derive(Clone)]
pub struct OrganizationService {
    storage: Arc<dyn AsyncStorage>,
    cache: Arc<MemoCache>,
}

async fn load_products(
    storage: Arc<dyn AsyncStorage>,
    organization_id: EntityId,
) -> PollenResult<Vec<ProductWithEnvironments>> {
    debug!(%organization_id, "Loading products");
    let products = storage.product_list_by_organization(organization_id).await?;
    try_join_all(products.into_iter().map(|product: Product| {
        let storage = storage.clone();
        async move {
            let environments = storage.environment_list_by_product(product.id).await?;
            Ok::<_, PollenError>(ProductWithEnvironments {
                product,
                environments,
            })
        }
    }))
    .await
}

impl OrganizationService {
    pub fn new(storage: Arc<dyn AsyncStorage>, cache: Arc<MemoCache>) -> Self {
        Self { storage, cache }
    }

    /// Organizations the user is a member of, oldest first.
    pub async fn get_organizations_by_user_id(
        &self,
        user_id: EntityId,
    ) -> PollenResult<Vec<Organization>> {
        ensure_id(user_id, "userId")?;

        let key = CacheKey::new("getOrganizationsByUserId").arg(user_id);
        let storage = self.storage.clone();
        self.cache
            .get_or_compute(key, &[TagScope::Organization.by_user_id(user_id)], move || async move {
                debug!(%user_id, "Loading organizations");
                let organizations = storage.organization_list_by_user(user_id).await?;
                Ok::<_, PollenError>(organizations)
            })
            .await
    }

    /// Products of the organization, oldest first, each with its
    /// environments.
    pub async fn get_products(
        &self,
        organization_id: EntityId,
    ) -> PollenResult<Vec<ProductWithEnvironments>> {
        ensure_id(organization_id, "organizationId")?;

        let key = CacheKey::new("getProducts").arg(organization_id);
        let tags = [
            TagScope::Product.by_organization_id(organization_id),
            TagScope::Environment.by_organization_id(organization_id),
        ];
        let storage = self.storage.clone();
        self.cache
            .get_or_compute(key, &tags, move || load_products(storage, organization_id))
            .await
    }
}
