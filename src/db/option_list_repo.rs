// src/db/option_list_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::conflict_on_unique, error::AppError},
    models::option_list::{NewOptionList, NewOptionListItem, OptionList, OptionListItem},
};

#[async_trait]
pub trait OptionListStore: Send + Sync {
    /// Slug must be unique within the list's scope (organisation or global).
    async fn create_list(&self, new: NewOptionList) -> Result<OptionList, AppError>;

    async fn get_list(&self, id: Uuid) -> Result<Option<OptionList>, AppError>;

    /// Exact scope lookup: `organisation_id = None` only matches global lists.
    async fn find_list_by_slug(
        &self,
        slug: &str,
        organisation_id: Option<Uuid>,
    ) -> Result<Option<OptionList>, AppError>;

    /// Global lists plus, when given, the organisation's own lists.
    async fn list_lists(&self, organisation_id: Option<Uuid>) -> Result<Vec<OptionList>, AppError>;

    /// Slug must be unique within the owning list.
    async fn create_item(&self, new: NewOptionListItem) -> Result<OptionListItem, AppError>;

    async fn get_item(&self, id: Uuid) -> Result<Option<OptionListItem>, AppError>;

    /// All items of a list, active or not, ordered by `(sort_order, label)` ignoring case.
    async fn list_items(&self, option_list_id: Uuid) -> Result<Vec<OptionListItem>, AppError>;
}

#[derive(Clone)]
pub struct OptionListRepository {
    pool: PgPool,
}

impl OptionListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OptionListStore for OptionListRepository {
    async fn create_list(&self, new: NewOptionList) -> Result<OptionList, AppError> {
        sqlx::query_as::<_, OptionList>(
            r#"
            INSERT INTO option_lists (name, slug, description, organisation_id, is_template)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.slug)
        .bind(&new.description)
        .bind(new.organisation_id)
        .bind(new.is_template)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // No organisation row with that id
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("Organisation");
                }
            }
            conflict_on_unique(e, || format!("Option list slug '{}' already exists.", new.slug))
        })
    }

    async fn get_list(&self, id: Uuid) -> Result<Option<OptionList>, AppError> {
        let list = sqlx::query_as::<_, OptionList>("SELECT * FROM option_lists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(list)
    }

    async fn find_list_by_slug(
        &self,
        slug: &str,
        organisation_id: Option<Uuid>,
    ) -> Result<Option<OptionList>, AppError> {
        // IS NOT DISTINCT FROM matches NULL = NULL for global lists
        let list = sqlx::query_as::<_, OptionList>(
            r#"
            SELECT * FROM option_lists
            WHERE slug = $1 AND organisation_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(slug)
        .bind(organisation_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(list)
    }

    async fn list_lists(&self, organisation_id: Option<Uuid>) -> Result<Vec<OptionList>, AppError> {
        let lists = sqlx::query_as::<_, OptionList>(
            r#"
            SELECT * FROM option_lists
            WHERE organisation_id IS NULL OR organisation_id = $1
            ORDER BY name ASC, id
            "#,
        )
        .bind(organisation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lists)
    }

    async fn create_item(&self, new: NewOptionListItem) -> Result<OptionListItem, AppError> {
        sqlx::query_as::<_, OptionListItem>(
            r#"
            INSERT INTO option_list_items (
                option_list_id, name, label, slug, sort_order,
                is_active, metadata, parent_id, region
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(new.option_list_id)
        .bind(&new.name)
        .bind(&new.label)
        .bind(&new.slug)
        .bind(new.sort_order)
        .bind(new.is_active)
        .bind(&new.metadata)
        .bind(new.parent_id)
        .bind(&new.region)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("Item slug '{}' already exists.", new.slug)))
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<OptionListItem>, AppError> {
        let item =
            sqlx::query_as::<_, OptionListItem>("SELECT * FROM option_list_items WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(item)
    }

    async fn list_items(&self, option_list_id: Uuid) -> Result<Vec<OptionListItem>, AppError> {
        let items = sqlx::query_as::<_, OptionListItem>(
            r#"
            SELECT * FROM option_list_items
            WHERE option_list_id = $1
            ORDER BY sort_order ASC, LOWER(label) ASC, id
            "#,
        )
        .bind(option_list_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
