// src/db/contact_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::soft_delete::{PgTable, SoftDeleteRepository},
    models::organisation::{
        Contact, ContactChanges, Document, EmailAddress, NewContact, NewDocument,
        NewEmailAddress, NewPhoneNumber, PhoneNumber,
    },
};

#[async_trait]
pub trait ContactStore: SoftDeleteRepository<Contact> {
    async fn insert(&self, new: NewContact, actor: Uuid) -> Result<Contact, AppError>;

    /// Partial update of an active contact; deleted contacts are `NotFound`.
    async fn update(
        &self,
        id: Uuid,
        changes: ContactChanges,
        actor: Uuid,
    ) -> Result<Contact, AppError>;

    async fn list_active_for_organisation(
        &self,
        organisation_id: Uuid,
    ) -> Result<Vec<Contact>, AppError>;
}

#[async_trait]
pub trait EmailStore: SoftDeleteRepository<EmailAddress> {
    /// Inserting a primary address demotes the contact's previous primary one.
    async fn insert(&self, new: NewEmailAddress, actor: Uuid) -> Result<EmailAddress, AppError>;

    async fn list_active_for_contact(&self, contact_id: Uuid)
        -> Result<Vec<EmailAddress>, AppError>;
}

#[async_trait]
pub trait PhoneStore: SoftDeleteRepository<PhoneNumber> {
    async fn insert(&self, new: NewPhoneNumber, actor: Uuid) -> Result<PhoneNumber, AppError>;

    async fn list_active_for_contact(&self, contact_id: Uuid)
        -> Result<Vec<PhoneNumber>, AppError>;
}

#[async_trait]
pub trait DocumentStore: SoftDeleteRepository<Document> {
    async fn insert(&self, new: NewDocument, actor: Uuid) -> Result<Document, AppError>;

    async fn list_active_for_contact(&self, contact_id: Uuid) -> Result<Vec<Document>, AppError>;
}

pub type ContactRepository = PgTable<Contact>;
pub type EmailRepository = PgTable<EmailAddress>;
pub type PhoneRepository = PgTable<PhoneNumber>;
pub type DocumentRepository = PgTable<Document>;

// =========================================================================
//  CONTACTS
// =========================================================================

#[async_trait]
impl ContactStore for PgTable<Contact> {
    async fn insert(&self, new: NewContact, actor: Uuid) -> Result<Contact, AppError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (
                organisation_id, first_name, last_name, job_title, notes,
                created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(new.organisation_id)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.job_title)
        .bind(&new.notes)
        .bind(actor)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            // No organisation row with that id
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("Organisation");
                }
            }
            e.into()
        })?;

        Ok(contact)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ContactChanges,
        actor: Uuid,
    ) -> Result<Contact, AppError> {
        sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET first_name = COALESCE($2, first_name),
                last_name  = COALESCE($3, last_name),
                job_title  = COALESCE($4, job_title),
                notes      = COALESCE($5, notes),
                updated_by = $6,
                updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.job_title)
        .bind(&changes.notes)
        .bind(actor)
        .fetch_optional(self.pool())
        .await?
        .ok_or(AppError::NotFound("Contact"))
    }

    async fn list_active_for_organisation(
        &self,
        organisation_id: Uuid,
    ) -> Result<Vec<Contact>, AppError> {
        self.list_active_by("organisation_id", organisation_id).await
    }
}

// =========================================================================
//  EMAIL ADDRESSES
// =========================================================================

#[async_trait]
impl EmailStore for PgTable<EmailAddress> {
    async fn insert(&self, new: NewEmailAddress, actor: Uuid) -> Result<EmailAddress, AppError> {
        let mut tx = self.pool().begin().await?;

        if new.is_primary {
            sqlx::query(
                r#"
                UPDATE email_addresses
                SET is_primary = FALSE, updated_by = $2, updated_at = NOW()
                WHERE contact_id = $1 AND is_primary = TRUE AND is_deleted = FALSE
                "#,
            )
            .bind(new.contact_id)
            .bind(actor)
            .execute(&mut *tx)
            .await?;
        }

        let email = sqlx::query_as::<_, EmailAddress>(
            r#"
            INSERT INTO email_addresses (contact_id, email, is_primary, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(new.contact_id)
        .bind(&new.email)
        .bind(new.is_primary)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(email)
    }

    async fn list_active_for_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Vec<EmailAddress>, AppError> {
        self.list_active_by("contact_id", contact_id).await
    }
}

// =========================================================================
//  PHONE NUMBERS
// =========================================================================

#[async_trait]
impl PhoneStore for PgTable<PhoneNumber> {
    async fn insert(&self, new: NewPhoneNumber, actor: Uuid) -> Result<PhoneNumber, AppError> {
        let phone = sqlx::query_as::<_, PhoneNumber>(
            r#"
            INSERT INTO phone_numbers (contact_id, number, phone_type, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(new.contact_id)
        .bind(&new.number)
        .bind(new.phone_type)
        .bind(actor)
        .fetch_one(self.pool())
        .await?;

        Ok(phone)
    }

    async fn list_active_for_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Vec<PhoneNumber>, AppError> {
        self.list_active_by("contact_id", contact_id).await
    }
}

// =========================================================================
//  DOCUMENTS
// =========================================================================

#[async_trait]
impl DocumentStore for PgTable<Document> {
    async fn insert(&self, new: NewDocument, actor: Uuid) -> Result<Document, AppError> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (
                contact_id, title, file_name, content_type, file_size,
                created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(new.contact_id)
        .bind(&new.title)
        .bind(&new.file_name)
        .bind(&new.content_type)
        .bind(new.file_size)
        .bind(actor)
        .fetch_one(self.pool())
        .await?;

        Ok(document)
    }

    async fn list_active_for_contact(&self, contact_id: Uuid) -> Result<Vec<Document>, AppError> {
        self.list_active_by("contact_id", contact_id).await
    }
}
