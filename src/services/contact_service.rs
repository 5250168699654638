// src/services/contact_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        ContactStore, DocumentStore, EmailStore, OrganisationStore, PhoneStore,
        SoftDeleteRepository,
    },
    models::{
        lifecycle::LifecycleRecord,
        organisation::{
            Contact, ContactChanges, Document, EmailAddress, NewContact, NewDocument,
            NewEmailAddress, NewOrganisation, NewPhoneNumber, Organisation, PhoneNumber,
        },
    },
};

// Shared by every entity: the explicit "including deleted" path is opt-in per call.
async fn fetch<T, S>(store: &S, id: Uuid, include_deleted: bool) -> Result<T, AppError>
where
    T: LifecycleRecord,
    S: SoftDeleteRepository<T> + ?Sized,
{
    if include_deleted {
        store.get_including_deleted(id).await
    } else {
        store.get_active(id).await
    }
}

// Looks the record up through the active path first, so deleting a deleted
// record over HTTP is indistinguishable from deleting a missing one.
async fn delete_active<T, S>(store: &S, id: Uuid, actor: Uuid) -> Result<T, AppError>
where
    T: LifecycleRecord,
    S: SoftDeleteRepository<T> + ?Sized,
{
    store.get_active(id).await?;
    store.soft_delete(id, actor).await
}

#[derive(Clone)]
pub struct ContactService {
    organisations: Arc<dyn OrganisationStore>,
    contacts: Arc<dyn ContactStore>,
    emails: Arc<dyn EmailStore>,
    phones: Arc<dyn PhoneStore>,
    documents: Arc<dyn DocumentStore>,
}

impl ContactService {
    pub fn new(
        organisations: Arc<dyn OrganisationStore>,
        contacts: Arc<dyn ContactStore>,
        emails: Arc<dyn EmailStore>,
        phones: Arc<dyn PhoneStore>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self { organisations, contacts, emails, phones, documents }
    }

    // =========================================================================
    //  ORGANISATIONS
    // =========================================================================

    pub async fn create_organisation(
        &self,
        new: NewOrganisation,
        actor: Uuid,
    ) -> Result<Organisation, AppError> {
        let organisation = self.organisations.insert(new, actor).await?;
        tracing::info!(organisation_id = %organisation.id, created_by = %actor, "organisation created");
        Ok(organisation)
    }

    pub async fn get_organisation(
        &self,
        id: Uuid,
        include_deleted: bool,
    ) -> Result<Organisation, AppError> {
        fetch(self.organisations.as_ref(), id, include_deleted).await
    }

    pub async fn list_organisations(
        &self,
        include_deleted: bool,
    ) -> Result<Vec<Organisation>, AppError> {
        if include_deleted {
            self.organisations.list_all().await
        } else {
            self.organisations.list_active().await
        }
    }

    pub async fn delete_organisation(&self, id: Uuid, actor: Uuid) -> Result<(), AppError> {
        delete_active::<Organisation, _>(self.organisations.as_ref(), id, actor).await?;
        Ok(())
    }

    pub async fn restore_organisation(
        &self,
        id: Uuid,
        actor: Uuid,
    ) -> Result<Organisation, AppError> {
        self.organisations.restore(id, actor).await
    }

    // =========================================================================
    //  CONTACTS
    // =========================================================================

    pub async fn create_contact(&self, new: NewContact, actor: Uuid) -> Result<Contact, AppError> {
        // 1. The owning organisation must exist and be active
        self.organisations.get_active(new.organisation_id).await?;

        // 2. Insert with the requesting user as creator
        let contact = self.contacts.insert(new, actor).await?;
        tracing::info!(contact_id = %contact.id, created_by = %actor, "contact created");

        Ok(contact)
    }

    pub async fn update_contact(
        &self,
        id: Uuid,
        changes: ContactChanges,
        actor: Uuid,
    ) -> Result<Contact, AppError> {
        self.contacts.update(id, changes, actor).await
    }

    pub async fn get_contact(&self, id: Uuid, include_deleted: bool) -> Result<Contact, AppError> {
        fetch(self.contacts.as_ref(), id, include_deleted).await
    }

    pub async fn list_contacts(
        &self,
        organisation_id: Option<Uuid>,
        include_deleted: bool,
    ) -> Result<Vec<Contact>, AppError> {
        match (organisation_id, include_deleted) {
            (Some(org), false) => self.contacts.list_active_for_organisation(org).await,
            (None, false) => self.contacts.list_active().await,
            (org, true) => {
                let all = self.contacts.list_all().await?;
                Ok(all
                    .into_iter()
                    .filter(|c| org.is_none_or(|o| c.organisation_id == o))
                    .collect())
            }
        }
    }

    pub async fn delete_contact(&self, id: Uuid, actor: Uuid) -> Result<(), AppError> {
        delete_active::<Contact, _>(self.contacts.as_ref(), id, actor).await?;
        Ok(())
    }

    pub async fn restore_contact(&self, id: Uuid, actor: Uuid) -> Result<Contact, AppError> {
        self.contacts.restore(id, actor).await
    }

    // =========================================================================
    //  EMAIL ADDRESSES / PHONE NUMBERS
    // =========================================================================

    pub async fn add_email(
        &self,
        new: NewEmailAddress,
        actor: Uuid,
    ) -> Result<EmailAddress, AppError> {
        self.contacts.get_active(new.contact_id).await?;
        self.emails.insert(new, actor).await
    }

    pub async fn list_emails(&self, contact_id: Uuid) -> Result<Vec<EmailAddress>, AppError> {
        self.contacts.get_active(contact_id).await?;
        self.emails.list_active_for_contact(contact_id).await
    }

    pub async fn get_email(&self, id: Uuid, include_deleted: bool) -> Result<EmailAddress, AppError> {
        fetch(self.emails.as_ref(), id, include_deleted).await
    }

    pub async fn delete_email(&self, id: Uuid, actor: Uuid) -> Result<(), AppError> {
        delete_active::<EmailAddress, _>(self.emails.as_ref(), id, actor).await?;
        Ok(())
    }

    pub async fn add_phone(&self, new: NewPhoneNumber, actor: Uuid) -> Result<PhoneNumber, AppError> {
        self.contacts.get_active(new.contact_id).await?;
        self.phones.insert(new, actor).await
    }

    pub async fn list_phones(&self, contact_id: Uuid) -> Result<Vec<PhoneNumber>, AppError> {
        self.contacts.get_active(contact_id).await?;
        self.phones.list_active_for_contact(contact_id).await
    }

    pub async fn get_phone(&self, id: Uuid, include_deleted: bool) -> Result<PhoneNumber, AppError> {
        fetch(self.phones.as_ref(), id, include_deleted).await
    }

    pub async fn delete_phone(&self, id: Uuid, actor: Uuid) -> Result<(), AppError> {
        delete_active::<PhoneNumber, _>(self.phones.as_ref(), id, actor).await?;
        Ok(())
    }

    // =========================================================================
    //  DOCUMENTS
    // =========================================================================

    pub async fn add_document(&self, new: NewDocument, actor: Uuid) -> Result<Document, AppError> {
        self.contacts.get_active(new.contact_id).await?;
        let document = self.documents.insert(new, actor).await?;
        tracing::info!(document_id = %document.id, contact_id = %document.contact_id, "document attached");
        Ok(document)
    }

    pub async fn list_documents(&self, contact_id: Uuid) -> Result<Vec<Document>, AppError> {
        self.contacts.get_active(contact_id).await?;
        self.documents.list_active_for_contact(contact_id).await
    }

    pub async fn get_document(&self, id: Uuid, include_deleted: bool) -> Result<Document, AppError> {
        fetch(self.documents.as_ref(), id, include_deleted).await
    }

    pub async fn delete_document(&self, id: Uuid, actor: Uuid) -> Result<(), AppError> {
        delete_active::<Document, _>(self.documents.as_ref(), id, actor).await?;
        Ok(())
    }
}
