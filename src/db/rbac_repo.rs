// src/db/rbac_repo.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::rbac::{GroupRoleMapping, Role},
};

/// Whether an upsert inserted a new mapping or rewrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created,
    Updated,
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn list_roles(&self) -> Result<Vec<Role>, AppError>;

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, AppError>;

    async fn find_role_for_group(&self, group_id: &str) -> Result<Option<Role>, AppError>;

    /// Roles mapped from any of the given groups (no particular order).
    async fn roles_for_groups(&self, group_ids: &[String]) -> Result<Vec<Role>, AppError>;

    /// Create-or-update keyed by `group_id`.
    async fn upsert_mapping(
        &self,
        group_id: &str,
        group_name: &str,
        role_id: Uuid,
    ) -> Result<(GroupRoleMapping, Upserted), AppError>;
}

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for RbacRepository {
    async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT id, name, description, level FROM roles ORDER BY level, name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, description, level FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    async fn find_role_for_group(&self, group_id: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT r.id, r.name, r.description, r.level
            FROM group_role_mappings m
            JOIN roles r ON r.id = m.role_id
            WHERE m.group_id = $1
            "#,
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    async fn roles_for_groups(&self, group_ids: &[String]) -> Result<Vec<Role>, AppError> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT DISTINCT r.id, r.name, r.description, r.level
            FROM group_role_mappings m
            JOIN roles r ON r.id = m.role_id
            WHERE m.group_id = ANY($1)
            "#,
        )
        .bind(group_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn upsert_mapping(
        &self,
        group_id: &str,
        group_name: &str,
        role_id: Uuid,
    ) -> Result<(GroupRoleMapping, Upserted), AppError> {
        // xmax = 0 only for freshly inserted tuples
        let row = sqlx::query(
            r#"
            INSERT INTO group_role_mappings (group_id, group_name, role_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (group_id) DO UPDATE
            SET group_name = EXCLUDED.group_name,
                role_id = EXCLUDED.role_id,
                updated_at = NOW()
            RETURNING id, group_id, group_name, role_id, created_at, updated_at,
                      (xmax = 0) AS inserted
            "#,
        )
        .bind(group_id)
        .bind(group_name)
        .bind(role_id)
        .fetch_one(&self.pool)
        .await?;

        let mapping = GroupRoleMapping::from_row(&row)?;
        let inserted: bool = row.try_get("inserted")?;

        Ok((
            mapping,
            if inserted { Upserted::Created } else { Upserted::Updated },
        ))
    }
}
