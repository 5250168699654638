// src/models/organisation.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::lifecycle::{Lifecycle, LifecycleRecord, LifecycleView};

// --- ENUMS ---

// Maps the `phone_type` enum of the database
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "phone_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PhoneType {
    Mobile,
    Work,
    Home,
    Other,
}

// =============================================================================
//  ROWS
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct Organisation {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(flatten)]
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub organisation_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub job_title: Option<String>,
    pub notes: Option<String>,
    #[sqlx(flatten)]
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, FromRow)]
pub struct EmailAddress {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub email: String,
    pub is_primary: bool,
    #[sqlx(flatten)]
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, FromRow)]
pub struct PhoneNumber {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub number: String,
    pub phone_type: PhoneType,
    #[sqlx(flatten)]
    pub lifecycle: Lifecycle,
}

/// Metadata of a file attached to a contact; the bytes live in external storage.
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub title: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub file_size: Option<i64>,
    #[sqlx(flatten)]
    pub lifecycle: Lifecycle,
}

macro_rules! lifecycle_record {
    ($ty:ty, $table:literal, $resource:literal) => {
        impl LifecycleRecord for $ty {
            const TABLE: &'static str = $table;
            const RESOURCE: &'static str = $resource;

            fn id(&self) -> Uuid {
                self.id
            }

            fn lifecycle(&self) -> &Lifecycle {
                &self.lifecycle
            }

            fn lifecycle_mut(&mut self) -> &mut Lifecycle {
                &mut self.lifecycle
            }
        }
    };
}

lifecycle_record!(Organisation, "organisations", "Organisation");
lifecycle_record!(Contact, "contacts", "Contact");
lifecycle_record!(EmailAddress, "email_addresses", "Email address");
lifecycle_record!(PhoneNumber, "phone_numbers", "Phone number");
lifecycle_record!(Document, "documents", "Document");

// =============================================================================
//  WRITE INPUTS (already validated by the handlers)
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewOrganisation {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub organisation_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub job_title: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ContactChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub notes: Option<String>,
}

impl ContactChanges {
    pub fn apply(self, contact: &mut Contact) {
        if let Some(v) = self.first_name {
            contact.first_name = v;
        }
        if let Some(v) = self.last_name {
            contact.last_name = v;
        }
        if let Some(v) = self.job_title {
            contact.job_title = Some(v);
        }
        if let Some(v) = self.notes {
            contact.notes = Some(v);
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewEmailAddress {
    pub contact_id: Uuid,
    pub email: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone)]
pub struct NewPhoneNumber {
    pub contact_id: Uuid,
    pub number: String,
    pub phone_type: PhoneType,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub contact_id: Uuid,
    pub title: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub file_size: Option<i64>,
}

// =============================================================================
//  RESPONSES
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct OrganisationResponse {
    pub id: Uuid,
    #[schema(example = "Riverside Community Trust")]
    pub name: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub lifecycle: LifecycleView,
}

impl From<Organisation> for OrganisationResponse {
    fn from(o: Organisation) -> Self {
        Self {
            lifecycle: LifecycleView::from(&o.lifecycle),
            id: o.id,
            name: o.name,
            description: o.description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactResponse {
    pub id: Uuid,
    pub organisation_id: Uuid,
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "Social Worker")]
    pub job_title: Option<String>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub lifecycle: LifecycleView,
}

impl From<Contact> for ContactResponse {
    fn from(c: Contact) -> Self {
        Self {
            lifecycle: LifecycleView::from(&c.lifecycle),
            id: c.id,
            organisation_id: c.organisation_id,
            first_name: c.first_name,
            last_name: c.last_name,
            job_title: c.job_title,
            notes: c.notes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmailAddressResponse {
    pub id: Uuid,
    pub contact_id: Uuid,
    #[schema(example = "jane.doe@example.org")]
    pub email: String,
    pub is_primary: bool,
    #[serde(flatten)]
    pub lifecycle: LifecycleView,
}

impl From<EmailAddress> for EmailAddressResponse {
    fn from(e: EmailAddress) -> Self {
        Self {
            lifecycle: LifecycleView::from(&e.lifecycle),
            id: e.id,
            contact_id: e.contact_id,
            email: e.email,
            is_primary: e.is_primary,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PhoneNumberResponse {
    pub id: Uuid,
    pub contact_id: Uuid,
    #[schema(example = "+44 20 7946 0000")]
    pub number: String,
    pub phone_type: PhoneType,
    #[serde(flatten)]
    pub lifecycle: LifecycleView,
}

impl From<PhoneNumber> for PhoneNumberResponse {
    fn from(p: PhoneNumber) -> Self {
        Self {
            lifecycle: LifecycleView::from(&p.lifecycle),
            id: p.id,
            contact_id: p.contact_id,
            number: p.number,
            phone_type: p.phone_type,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub contact_id: Uuid,
    #[schema(example = "Consent form")]
    pub title: String,
    #[schema(example = "consent-2024.pdf")]
    pub file_name: String,
    #[schema(example = "application/pdf")]
    pub content_type: Option<String>,
    pub file_size: Option<i64>,
    #[serde(flatten)]
    pub lifecycle: LifecycleView,
}

impl From<Document> for DocumentResponse {
    fn from(d: Document) -> Self {
        Self {
            lifecycle: LifecycleView::from(&d.lifecycle),
            id: d.id,
            contact_id: d.contact_id,
            title: d.title,
            file_name: d.file_name,
            content_type: d.content_type,
            file_size: d.file_size,
        }
    }
}
