// src/db/organisation_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::soft_delete::{PgTable, SoftDeleteRepository},
    models::organisation::{NewOrganisation, Organisation},
};

#[async_trait]
pub trait OrganisationStore: SoftDeleteRepository<Organisation> {
    async fn insert(&self, new: NewOrganisation, actor: Uuid) -> Result<Organisation, AppError>;
}

pub type OrganisationRepository = PgTable<Organisation>;

#[async_trait]
impl OrganisationStore for PgTable<Organisation> {
    async fn insert(&self, new: NewOrganisation, actor: Uuid) -> Result<Organisation, AppError> {
        let organisation = sqlx::query_as::<_, Organisation>(
            r#"
            INSERT INTO organisations (name, description, created_by, updated_by)
            VALUES ($1, $2, $3, $3)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(actor)
        .fetch_one(self.pool())
        .await?;

        Ok(organisation)
    }
}
