// src/db/soft_delete.rs

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::lifecycle::LifecycleRecord};

/// Data access for records that are hidden instead of removed.
///
/// There is no ambient filter: callers pick `*_active` or `*_including_deleted` / `list_all`
/// explicitly, so every call site states whether deleted rows are wanted.
#[async_trait]
pub trait SoftDeleteRepository<T: LifecycleRecord>: Send + Sync {
    /// `NotFound` for deleted rows too, exactly as if the row did not exist.
    async fn get_active(&self, id: Uuid) -> Result<T, AppError>;

    /// Audit/recovery path: returns deleted rows with their deletion metadata.
    async fn get_including_deleted(&self, id: Uuid) -> Result<T, AppError>;

    async fn list_active(&self) -> Result<Vec<T>, AppError>;

    async fn list_all(&self) -> Result<Vec<T>, AppError>;

    /// Hides the row. A row that is already deleted yields `Conflict`.
    async fn soft_delete(&self, id: Uuid, actor: Uuid) -> Result<T, AppError>;

    /// Un-hides the row. A row that is not deleted yields `Conflict`.
    async fn restore(&self, id: Uuid, actor: Uuid) -> Result<T, AppError>;
}

// =========================================================================
//  POSTGRES
// =========================================================================

/// A PostgreSQL table of `T` rows. Per-entity stores are implemented on it too.
pub struct PgTable<T> {
    pool: PgPool,
    _row: PhantomData<fn() -> T>,
}

impl<T> Clone for PgTable<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _row: PhantomData,
        }
    }
}

impl<T: LifecycleRecord> PgTable<T> {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, _row: PhantomData }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Active rows whose `column` equals `value`, oldest first.
    /// `column` is always a compile-time constant of the calling store.
    pub(crate) async fn list_active_by(
        &self,
        column: &'static str,
        value: Uuid,
    ) -> Result<Vec<T>, AppError> {
        let sql = format!(
            "SELECT * FROM {} WHERE {column} = $1 AND is_deleted = FALSE ORDER BY created_at, id",
            T::TABLE
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    // The conditional UPDATE matched nothing: tell "wrong state" apart from "absent".
    async fn conflict_or_missing(&self, id: Uuid, message: &str) -> AppError {
        match self.get_including_deleted(id).await {
            Ok(_) => AppError::Conflict(format!("{} {message}", T::RESOURCE)),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl<T: LifecycleRecord> SoftDeleteRepository<T> for PgTable<T> {
    async fn get_active(&self, id: Uuid) -> Result<T, AppError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1 AND is_deleted = FALSE", T::TABLE);
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound(T::RESOURCE))
    }

    async fn get_including_deleted(&self, id: Uuid) -> Result<T, AppError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound(T::RESOURCE))
    }

    async fn list_active(&self) -> Result<Vec<T>, AppError> {
        let sql = format!(
            "SELECT * FROM {} WHERE is_deleted = FALSE ORDER BY created_at, id",
            T::TABLE
        );
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_all(&self) -> Result<Vec<T>, AppError> {
        let sql = format!("SELECT * FROM {} ORDER BY created_at, id", T::TABLE);
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    async fn soft_delete(&self, id: Uuid, actor: Uuid) -> Result<T, AppError> {
        // One statement, so the three deletion columns always change together.
        let sql = format!(
            r#"
            UPDATE {}
            SET is_deleted = TRUE, deleted_by = $2, deleted_at = NOW(),
                updated_by = $2, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING *
            "#,
            T::TABLE
        );
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(actor)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                tracing::info!(table = T::TABLE, %id, deleted_by = %actor, "record soft-deleted");
                Ok(row)
            }
            None => Err(self.conflict_or_missing(id, "is already deleted.").await),
        }
    }

    async fn restore(&self, id: Uuid, actor: Uuid) -> Result<T, AppError> {
        let sql = format!(
            r#"
            UPDATE {}
            SET is_deleted = FALSE, deleted_by = NULL, deleted_at = NULL,
                updated_by = $2, updated_at = NOW()
            WHERE id = $1 AND is_deleted = TRUE
            RETURNING *
            "#,
            T::TABLE
        );
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(actor)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                tracing::info!(table = T::TABLE, %id, restored_by = %actor, "record restored");
                Ok(row)
            }
            None => Err(self.conflict_or_missing(id, "is not deleted.").await),
        }
    }
}
