//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and a `DbClient`
//! that implements `AsyncStorage` with plain SQL against the relational
//! schema (`organization`, `membership`, `product`, `product_team`, `team`,
//! `team_membership`, `environment`, `action_class`, `attribute_class`).
//!
//! Enum columns are stored as their wire names in `TEXT` columns; a value
//! that does not parse back is reported as `StorageError::Decode`.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use pollen_core::{
    ActionClass, AttributeClass, EntityId, EntityType, Environment, EnvironmentUpdateInput,
    Membership, Organization, Product, ProductTeam, StorageError, Team, TeamDetails,
    TeamMembership, TeamSummary, Timestamp,
};
use pollen_storage::{AsyncStorage, StorageResult, TeamMemberFilter};
use tokio_postgres::error::SqlState;
use tokio_postgres::types::FromSql;
use tokio_postgres::{NoTls, Row};

use crate::error::{ApiError, ApiResult};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "pollen".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("POLLEN_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("POLLEN_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("POLLEN_DB_NAME").unwrap_or_else(|_| "pollen".to_string()),
            user: std::env::var("POLLEN_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("POLLEN_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("POLLEN_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("POLLEN_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.connect_timeout = Some(self.timeout);

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(self.max_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// ERROR AND ROW HELPERS
// ============================================================================

fn query_error(entity_type: EntityType, err: tokio_postgres::Error) -> StorageError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        return StorageError::UniqueViolation {
            entity_type,
            key: err
                .as_db_error()
                .and_then(|db| db.constraint())
                .unwrap_or("unique constraint")
                .to_string(),
        };
    }
    StorageError::Query {
        reason: err.to_string(),
    }
}

fn col<'a, T: FromSql<'a>>(row: &'a Row, name: &str, entity_type: EntityType) -> StorageResult<T> {
    row.try_get(name).map_err(|e| StorageError::Decode {
        entity_type,
        reason: format!("column {}: {}", name, e),
    })
}

fn enum_col<T>(row: &Row, name: &str, entity_type: EntityType) -> StorageResult<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = col(row, name, entity_type)?;
    raw.parse()
        .map_err(|reason| StorageError::Decode { entity_type, reason })
}

fn organization_from_row(row: &Row) -> StorageResult<Organization> {
    let et = EntityType::Organization;
    Ok(Organization {
        id: col(row, "id", et)?,
        name: col(row, "name", et)?,
        created_at: col(row, "created_at", et)?,
        updated_at: col(row, "updated_at", et)?,
    })
}

fn membership_from_row(row: &Row) -> StorageResult<Membership> {
    let et = EntityType::Membership;
    Ok(Membership {
        user_id: col(row, "user_id", et)?,
        organization_id: col(row, "organization_id", et)?,
        role: enum_col(row, "role", et)?,
        accepted: col(row, "accepted", et)?,
    })
}

fn product_from_row(row: &Row) -> StorageResult<Product> {
    let et = EntityType::Product;
    Ok(Product {
        id: col(row, "id", et)?,
        organization_id: col(row, "organization_id", et)?,
        name: col(row, "name", et)?,
        created_at: col(row, "created_at", et)?,
        updated_at: col(row, "updated_at", et)?,
    })
}

fn team_from_row(row: &Row) -> StorageResult<Team> {
    let et = EntityType::Team;
    Ok(Team {
        id: col(row, "id", et)?,
        organization_id: col(row, "organization_id", et)?,
        name: col(row, "name", et)?,
        created_at: col(row, "created_at", et)?,
        updated_at: col(row, "updated_at", et)?,
    })
}

fn team_membership_from_row(row: &Row) -> StorageResult<TeamMembership> {
    let et = EntityType::TeamMembership;
    Ok(TeamMembership {
        team_id: col(row, "team_id", et)?,
        user_id: col(row, "user_id", et)?,
        role: enum_col(row, "role", et)?,
    })
}

fn environment_from_row(row: &Row) -> StorageResult<Environment> {
    let et = EntityType::Environment;
    Ok(Environment {
        id: col(row, "id", et)?,
        product_id: col(row, "product_id", et)?,
        environment_type: enum_col(row, "type", et)?,
        app_setup_completed: col(row, "app_setup_completed", et)?,
        website_setup_completed: col(row, "website_setup_completed", et)?,
        created_at: col(row, "created_at", et)?,
        updated_at: col(row, "updated_at", et)?,
    })
}

fn action_class_from_row(row: &Row) -> StorageResult<ActionClass> {
    let et = EntityType::ActionClass;
    Ok(ActionClass {
        id: col(row, "id", et)?,
        environment_id: col(row, "environment_id", et)?,
        name: col(row, "name", et)?,
        description: col(row, "description", et)?,
        action_type: enum_col(row, "type", et)?,
        created_at: col(row, "created_at", et)?,
    })
}

fn attribute_class_from_row(row: &Row) -> StorageResult<AttributeClass> {
    let et = EntityType::AttributeClass;
    Ok(AttributeClass {
        id: col(row, "id", et)?,
        environment_id: col(row, "environment_id", et)?,
        name: col(row, "name", et)?,
        description: col(row, "description", et)?,
        attribute_type: enum_col(row, "type", et)?,
        created_at: col(row, "created_at", et)?,
    })
}

fn rows_into<T>(rows: &[Row], decode: fn(&Row) -> StorageResult<T>) -> StorageResult<Vec<T>> {
    rows.iter().map(decode).collect()
}

const ENVIRONMENT_COLUMNS: &str =
    "id, product_id, type, app_setup_completed, website_setup_completed, created_at, updated_at";

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Database client that wraps a connection pool and implements
/// `AsyncStorage` with SQL.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> StorageResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            tracing::error!("Connection pool error: {:?}", e);
            StorageError::Connection {
                reason: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl AsyncStorage for DbClient {
    // ========================================================================
    // ORGANIZATION OPERATIONS
    // ========================================================================

    async fn organization_insert(&self, o: &Organization) -> StorageResult<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO organization (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)",
            &[&o.id, &o.name, &o.created_at, &o.updated_at],
        )
        .await
        .map_err(|e| query_error(EntityType::Organization, e))?;
        Ok(())
    }

    async fn organization_get(&self, id: EntityId) -> StorageResult<Option<Organization>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "SELECT id, name, created_at, updated_at FROM organization WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(|e| query_error(EntityType::Organization, e))?;
        row.as_ref().map(organization_from_row).transpose()
    }

    async fn organization_list_by_user(
        &self,
        user_id: EntityId,
    ) -> StorageResult<Vec<Organization>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT o.id, o.name, o.created_at, o.updated_at \
                 FROM organization o JOIN membership m ON m.organization_id = o.id \
                 WHERE m.user_id = $1 ORDER BY o.created_at, o.id",
                &[&user_id],
            )
            .await
            .map_err(|e| query_error(EntityType::Organization, e))?;
        rows_into(&rows, organization_from_row)
    }

    // ========================================================================
    // MEMBERSHIP OPERATIONS
    // ========================================================================

    async fn membership_insert(&self, m: &Membership) -> StorageResult<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO membership (user_id, organization_id, role, accepted) VALUES ($1, $2, $3, $4)",
            &[&m.user_id, &m.organization_id, &m.role.as_str(), &m.accepted],
        )
        .await
        .map_err(|e| query_error(EntityType::Membership, e))?;
        Ok(())
    }

    async fn membership_get(
        &self,
        user_id: EntityId,
        organization_id: EntityId,
    ) -> StorageResult<Option<Membership>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "SELECT user_id, organization_id, role, accepted FROM membership \
                 WHERE user_id = $1 AND organization_id = $2",
                &[&user_id, &organization_id],
            )
            .await
            .map_err(|e| query_error(EntityType::Membership, e))?;
        row.as_ref().map(membership_from_row).transpose()
    }

    async fn membership_list_by_user(&self, user_id: EntityId) -> StorageResult<Vec<Membership>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT m.user_id, m.organization_id, m.role, m.accepted \
                 FROM membership m JOIN organization o ON o.id = m.organization_id \
                 WHERE m.user_id = $1 ORDER BY o.created_at, o.id",
                &[&user_id],
            )
            .await
            .map_err(|e| query_error(EntityType::Membership, e))?;
        rows_into(&rows, membership_from_row)
    }

    async fn membership_list_by_organization(
        &self,
        organization_id: EntityId,
    ) -> StorageResult<Vec<Membership>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT user_id, organization_id, role, accepted \
                 FROM membership WHERE organization_id = $1",
                &[&organization_id],
            )
            .await
            .map_err(|e| query_error(EntityType::Membership, e))?;
        rows_into(&rows, membership_from_row)
    }

    // ========================================================================
    // PRODUCT OPERATIONS
    // ========================================================================

    async fn product_insert(&self, p: &Product) -> StorageResult<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO product (id, organization_id, name, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
            &[&p.id, &p.organization_id, &p.name, &p.created_at, &p.updated_at],
        )
        .await
        .map_err(|e| query_error(EntityType::Product, e))?;
        Ok(())
    }

    async fn product_get(&self, id: EntityId) -> StorageResult<Option<Product>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "SELECT id, organization_id, name, created_at, updated_at FROM product WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(|e| query_error(EntityType::Product, e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn product_list_by_organization(
        &self,
        organization_id: EntityId,
    ) -> StorageResult<Vec<Product>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT id, organization_id, name, created_at, updated_at FROM product \
                 WHERE organization_id = $1 ORDER BY created_at, id",
                &[&organization_id],
            )
            .await
            .map_err(|e| query_error(EntityType::Product, e))?;
        rows_into(&rows, product_from_row)
    }

    async fn product_team_insert(&self, link: &ProductTeam) -> StorageResult<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO product_team (product_id, team_id, permission) VALUES ($1, $2, $3)",
            &[&link.product_id, &link.team_id, &link.permission.as_str()],
        )
        .await
        .map_err(|e| query_error(EntityType::ProductTeam, e))?;
        Ok(())
    }

    // ========================================================================
    // TEAM OPERATIONS
    // ========================================================================

    async fn team_insert(&self, t: &Team) -> StorageResult<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO team (id, organization_id, name, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
            &[&t.id, &t.organization_id, &t.name, &t.created_at, &t.updated_at],
        )
        .await
        .map_err(|e| query_error(EntityType::Team, e))?;
        Ok(())
    }

    async fn team_get(&self, id: EntityId) -> StorageResult<Option<TeamDetails>> {
        let conn = self.get_conn().await?;
        let Some(row) = conn
            .query_opt(
                "SELECT id, organization_id, name, created_at, updated_at FROM team WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(|e| query_error(EntityType::Team, e))?
        else {
            return Ok(None);
        };
        let team = team_from_row(&row)?;

        let links = conn
            .query(
                "SELECT product_id FROM product_team WHERE team_id = $1 ORDER BY product_id",
                &[&id],
            )
            .await
            .map_err(|e| query_error(EntityType::ProductTeam, e))?;
        let product_ids = links
            .iter()
            .map(|r| col(r, "product_id", EntityType::ProductTeam))
            .collect::<StorageResult<Vec<EntityId>>>()?;

        Ok(Some(TeamDetails { team, product_ids }))
    }

    async fn team_find_by_name(
        &self,
        organization_id: EntityId,
        name: &str,
    ) -> StorageResult<Option<Team>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "SELECT id, organization_id, name, created_at, updated_at FROM team \
                 WHERE organization_id = $1 AND name = $2",
                &[&organization_id, &name],
            )
            .await
            .map_err(|e| query_error(EntityType::Team, e))?;
        row.as_ref().map(team_from_row).transpose()
    }

    async fn team_list_by_organization(
        &self,
        organization_id: EntityId,
        filter: TeamMemberFilter,
    ) -> StorageResult<Vec<TeamSummary>> {
        let (mode, user_id): (&str, Option<EntityId>) = match filter {
            TeamMemberFilter::All => ("all", None),
            TeamMemberFilter::MemberOf(user_id) => ("member", Some(user_id)),
            TeamMemberFilter::NotMemberOf(user_id) => ("non_member", Some(user_id)),
        };

        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT t.id, t.name, tm.role AS member_role, \
                        (SELECT COUNT(*) FROM team_membership c WHERE c.team_id = t.id) AS member_count \
                 FROM team t \
                 LEFT JOIN team_membership tm ON tm.team_id = t.id AND tm.user_id = $2 \
                 WHERE t.organization_id = $1 \
                   AND ($3::text = 'all' \
                        OR ($3::text = 'member' AND tm.user_id IS NOT NULL) \
                        OR ($3::text = 'non_member' AND tm.user_id IS NULL)) \
                 ORDER BY t.created_at, t.id",
                &[&organization_id, &user_id, &mode],
            )
            .await
            .map_err(|e| query_error(EntityType::Team, e))?;

        let et = EntityType::Team;
        rows.iter()
            .map(|row| -> StorageResult<TeamSummary> {
                let member_role = match filter {
                    TeamMemberFilter::MemberOf(_) => Some(enum_col(row, "member_role", et)?),
                    _ => None,
                };
                let member_count: i64 = col(row, "member_count", et)?;
                Ok(TeamSummary {
                    id: col(row, "id", et)?,
                    name: col(row, "name", et)?,
                    member_role,
                    member_count: member_count.max(0) as u64,
                })
            })
            .collect()
    }

    // ========================================================================
    // TEAM MEMBERSHIP OPERATIONS
    // ========================================================================

    async fn team_membership_insert(&self, m: &TeamMembership) -> StorageResult<()> {
        let conn = self.get_conn().await?;
        conn.execute(
            "INSERT INTO team_membership (team_id, user_id, role) VALUES ($1, $2, $3)",
            &[&m.team_id, &m.user_id, &m.role.as_str()],
        )
        .await
        .map_err(|e| query_error(EntityType::TeamMembership, e))?;
        Ok(())
    }

    async fn team_membership_get(
        &self,
        team_id: EntityId,
        user_id: EntityId,
    ) -> StorageResult<Option<TeamMembership>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "SELECT team_id, user_id, role FROM team_membership \
                 WHERE team_id = $1 AND user_id = $2",
                &[&team_id, &user_id],
            )
            .await
            .map_err(|e| query_error(EntityType::TeamMembership, e))?;
        row.as_ref().map(team_membership_from_row).transpose()
    }

    async fn team_membership_delete(
        &self,
        team_id: EntityId,
        user_id: EntityId,
    ) -> StorageResult<Option<TeamMembership>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "DELETE FROM team_membership WHERE team_id = $1 AND user_id = $2 \
                 RETURNING team_id, user_id, role",
                &[&team_id, &user_id],
            )
            .await
            .map_err(|e| query_error(EntityType::TeamMembership, e))?;
        row.as_ref().map(team_membership_from_row).transpose()
    }

    // ========================================================================
    // ENVIRONMENT OPERATIONS
    // ========================================================================

    async fn environment_get(&self, id: EntityId) -> StorageResult<Option<Environment>> {
        let conn = self.get_conn().await?;
        let sql = format!("SELECT {} FROM environment WHERE id = $1", ENVIRONMENT_COLUMNS);
        let row = conn
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(|e| query_error(EntityType::Environment, e))?;
        row.as_ref().map(environment_from_row).transpose()
    }

    async fn environment_list_by_product(
        &self,
        product_id: EntityId,
    ) -> StorageResult<Vec<Environment>> {
        let conn = self.get_conn().await?;
        let sql = format!(
            "SELECT {} FROM environment WHERE product_id = $1 ORDER BY created_at, id",
            ENVIRONMENT_COLUMNS
        );
        let rows = conn
            .query(sql.as_str(), &[&product_id])
            .await
            .map_err(|e| query_error(EntityType::Environment, e))?;
        rows_into(&rows, environment_from_row)
    }

    async fn environment_insert_seeded(
        &self,
        environment: &Environment,
        action_classes: &[ActionClass],
        attribute_classes: &[AttributeClass],
    ) -> StorageResult<()> {
        let mut conn = self.get_conn().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| query_error(EntityType::Environment, e))?;

        tx.execute(
            "INSERT INTO environment \
             (id, product_id, type, app_setup_completed, website_setup_completed, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
            &[
                &environment.id,
                &environment.product_id,
                &environment.environment_type.as_str(),
                &environment.app_setup_completed,
                &environment.website_setup_completed,
                &environment.created_at,
                &environment.updated_at,
            ],
        )
        .await
        .map_err(|e| query_error(EntityType::Environment, e))?;

        for action in action_classes {
            tx.execute(
                "INSERT INTO action_class (id, environment_id, name, description, type, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &action.id,
                    &action.environment_id,
                    &action.name,
                    &action.description,
                    &action.action_type.as_str(),
                    &action.created_at,
                ],
            )
            .await
            .map_err(|e| query_error(EntityType::ActionClass, e))?;
        }

        for attribute in attribute_classes {
            tx.execute(
                "INSERT INTO attribute_class (id, environment_id, name, description, type, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &attribute.id,
                    &attribute.environment_id,
                    &attribute.name,
                    &attribute.description,
                    &attribute.attribute_type.as_str(),
                    &attribute.created_at,
                ],
            )
            .await
            .map_err(|e| query_error(EntityType::AttributeClass, e))?;
        }

        tx.commit()
            .await
            .map_err(|e| query_error(EntityType::Environment, e))
    }

    async fn environment_update(
        &self,
        id: EntityId,
        patch: &EnvironmentUpdateInput,
        updated_at: Timestamp,
    ) -> StorageResult<Option<Environment>> {
        let conn = self.get_conn().await?;
        let environment_type = patch.environment_type.map(|t| t.as_str());
        let sql = format!(
            "UPDATE environment SET \
                type = COALESCE($2::text, type), \
                app_setup_completed = COALESCE($3, app_setup_completed), \
                website_setup_completed = COALESCE($4, website_setup_completed), \
                updated_at = $5 \
             WHERE id = $1 RETURNING {}",
            ENVIRONMENT_COLUMNS
        );
        let row = conn
            .query_opt(
                sql.as_str(),
                &[
                    &id,
                    &environment_type,
                    &patch.app_setup_completed,
                    &patch.website_setup_completed,
                    &updated_at,
                ],
            )
            .await
            .map_err(|e| StorageError::UpdateFailed {
                entity_type: EntityType::Environment,
                id,
                reason: e.to_string(),
            })?;
        row.as_ref().map(environment_from_row).transpose()
    }

    async fn action_class_list_by_environment(
        &self,
        environment_id: EntityId,
    ) -> StorageResult<Vec<ActionClass>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT id, environment_id, name, description, type, created_at FROM action_class \
                 WHERE environment_id = $1 ORDER BY created_at, id",
                &[&environment_id],
            )
            .await
            .map_err(|e| query_error(EntityType::ActionClass, e))?;
        rows_into(&rows, action_class_from_row)
    }

    async fn attribute_class_list_by_environment(
        &self,
        environment_id: EntityId,
    ) -> StorageResult<Vec<AttributeClass>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT id, environment_id, name, description, type, created_at FROM attribute_class \
                 WHERE environment_id = $1 ORDER BY created_at, id",
                &[&environment_id],
            )
            .await
            .map_err(|e| query_error(EntityType::AttributeClass, e))?;
        rows_into(&rows, attribute_class_from_row)
    }

    // ========================================================================
    // HEALTH
    // ========================================================================

    async fn health_check(&self) -> StorageResult<bool> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[])
            .await
            .map_err(|e| StorageError::Connection {
                reason: e.to_string(),
            })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_default() {
        let config = DbConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "pollen");
        assert_eq!(config.max_size, 16);
    }

    #[test]
    fn test_create_pool_is_lazy() {
        // Pool creation does not connect, so it succeeds without a server.
        let pool = DbConfig::default().create_pool();
        assert!(pool.is_ok());
    }
}
