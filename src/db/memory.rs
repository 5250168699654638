// src/db/memory.rs

//! In-process implementations of the storage traits.
//!
//! They honour the same contracts as the PostgreSQL repositories (soft-delete
//! visibility, slug uniqueness, upsert semantics) and back `AppState::in_memory`.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditStore,
        contact_repo::{ContactStore, DocumentStore, EmailStore, PhoneStore},
        option_list_repo::OptionListStore,
        organisation_repo::OrganisationStore,
        rbac_repo::{RoleStore, Upserted},
        soft_delete::SoftDeleteRepository,
        user_repo::UserStore,
    },
    models::{
        audit::{AuditLog, NewAuditLog},
        auth::User,
        lifecycle::{Lifecycle, LifecycleRecord},
        option_list::{NewOptionList, NewOptionListItem, OptionList, OptionListItem},
        organisation::{
            Contact, ContactChanges, Document, EmailAddress, NewContact, NewDocument,
            NewEmailAddress, NewOrganisation, NewPhoneNumber, Organisation, PhoneNumber,
        },
        rbac::{GroupRoleMapping, Role},
    },
};

// =========================================================================
//  LIFECYCLE TABLES
// =========================================================================

pub struct MemoryTable<T> {
    rows: RwLock<BTreeMap<Uuid, T>>,
}

impl<T> Default for MemoryTable<T> {
    fn default() -> Self {
        Self { rows: RwLock::new(BTreeMap::new()) }
    }
}

impl<T: LifecycleRecord> MemoryTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    async fn put(&self, row: T) -> T {
        self.rows.write().await.insert(row.id(), row.clone());
        row
    }

    async fn collect(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        let mut rows: Vec<T> = self.rows.read().await.values().filter(|r| keep(*r)).cloned().collect();
        rows.sort_by_key(|r| (r.lifecycle().created_at, r.id()));
        rows
    }

    async fn transition(
        &self,
        id: Uuid,
        change: impl FnOnce(&mut Lifecycle) -> Result<(), AppError>,
    ) -> Result<T, AppError> {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id).ok_or(AppError::NotFound(T::RESOURCE))?;
        change(row.lifecycle_mut())?;
        Ok(row.clone())
    }
}

#[async_trait]
impl<T: LifecycleRecord> SoftDeleteRepository<T> for MemoryTable<T> {
    async fn get_active(&self, id: Uuid) -> Result<T, AppError> {
        self.rows
            .read()
            .await
            .get(&id)
            .filter(|r| !r.lifecycle().is_deleted)
            .cloned()
            .ok_or(AppError::NotFound(T::RESOURCE))
    }

    async fn get_including_deleted(&self, id: Uuid) -> Result<T, AppError> {
        self.rows.read().await.get(&id).cloned().ok_or(AppError::NotFound(T::RESOURCE))
    }

    async fn list_active(&self) -> Result<Vec<T>, AppError> {
        Ok(self.collect(|r| !r.lifecycle().is_deleted).await)
    }

    async fn list_all(&self) -> Result<Vec<T>, AppError> {
        Ok(self.collect(|_| true).await)
    }

    async fn soft_delete(&self, id: Uuid, actor: Uuid) -> Result<T, AppError> {
        self.transition(id, |l| l.mark_deleted(actor, Utc::now())).await
    }

    async fn restore(&self, id: Uuid, actor: Uuid) -> Result<T, AppError> {
        self.transition(id, |l| l.restore(actor, Utc::now())).await
    }
}

#[async_trait]
impl OrganisationStore for MemoryTable<Organisation> {
    async fn insert(&self, new: NewOrganisation, actor: Uuid) -> Result<Organisation, AppError> {
        Ok(self
            .put(Organisation {
                id: Uuid::new_v4(),
                name: new.name,
                description: new.description,
                lifecycle: Lifecycle::created(actor, Utc::now()),
            })
            .await)
    }
}

#[async_trait]
impl ContactStore for MemoryTable<Contact> {
    async fn insert(&self, new: NewContact, actor: Uuid) -> Result<Contact, AppError> {
        Ok(self
            .put(Contact {
                id: Uuid::new_v4(),
                organisation_id: new.organisation_id,
                first_name: new.first_name,
                last_name: new.last_name,
                job_title: new.job_title,
                notes: new.notes,
                lifecycle: Lifecycle::created(actor, Utc::now()),
            })
            .await)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ContactChanges,
        actor: Uuid,
    ) -> Result<Contact, AppError> {
        let mut rows = self.rows.write().await;
        let contact = rows
            .get_mut(&id)
            .filter(|c| !c.lifecycle.is_deleted)
            .ok_or(AppError::NotFound("Contact"))?;
        changes.apply(contact);
        contact.lifecycle.touch(actor, Utc::now());
        Ok(contact.clone())
    }

    async fn list_active_for_organisation(
        &self,
        organisation_id: Uuid,
    ) -> Result<Vec<Contact>, AppError> {
        Ok(self
            .collect(|c| !c.lifecycle.is_deleted && c.organisation_id == organisation_id)
            .await)
    }
}

#[async_trait]
impl EmailStore for MemoryTable<EmailAddress> {
    async fn insert(&self, new: NewEmailAddress, actor: Uuid) -> Result<EmailAddress, AppError> {
        let now = Utc::now();
        let mut rows = self.rows.write().await;

        if new.is_primary {
            for email in rows.values_mut().filter(|e| {
                e.contact_id == new.contact_id && e.is_primary && !e.lifecycle.is_deleted
            }) {
                email.is_primary = false;
                email.lifecycle.touch(actor, now);
            }
        }

        let email = EmailAddress {
            id: Uuid::new_v4(),
            contact_id: new.contact_id,
            email: new.email,
            is_primary: new.is_primary,
            lifecycle: Lifecycle::created(actor, now),
        };
        rows.insert(email.id, email.clone());
        Ok(email)
    }

    async fn list_active_for_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Vec<EmailAddress>, AppError> {
        Ok(self.collect(|e| !e.lifecycle.is_deleted && e.contact_id == contact_id).await)
    }
}

#[async_trait]
impl PhoneStore for MemoryTable<PhoneNumber> {
    async fn insert(&self, new: NewPhoneNumber, actor: Uuid) -> Result<PhoneNumber, AppError> {
        Ok(self
            .put(PhoneNumber {
                id: Uuid::new_v4(),
                contact_id: new.contact_id,
                number: new.number,
                phone_type: new.phone_type,
                lifecycle: Lifecycle::created(actor, Utc::now()),
            })
            .await)
    }

    async fn list_active_for_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Vec<PhoneNumber>, AppError> {
        Ok(self.collect(|p| !p.lifecycle.is_deleted && p.contact_id == contact_id).await)
    }
}

#[async_trait]
impl DocumentStore for MemoryTable<Document> {
    async fn insert(&self, new: NewDocument, actor: Uuid) -> Result<Document, AppError> {
        Ok(self
            .put(Document {
                id: Uuid::new_v4(),
                contact_id: new.contact_id,
                title: new.title,
                file_name: new.file_name,
                content_type: new.content_type,
                file_size: new.file_size,
                lifecycle: Lifecycle::created(actor, Utc::now()),
            })
            .await)
    }

    async fn list_active_for_contact(&self, contact_id: Uuid) -> Result<Vec<Document>, AppError> {
        Ok(self.collect(|d| !d.lifecycle.is_deleted && d.contact_id == contact_id).await)
    }
}

// =========================================================================
//  AUDIT
// =========================================================================

#[derive(Default)]
pub struct MemoryAuditStore {
    entries: RwLock<Vec<AuditLog>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: NewAuditLog) -> Result<AuditLog, AppError> {
        let log = AuditLog {
            id: Uuid::new_v4(),
            user_id: Some(entry.user_id),
            action: entry.action,
            path: entry.path,
            resource_id: entry.resource_id,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            status_code: entry.status_code,
            request_body: entry.request_body,
            created_at: Utc::now(),
        };
        self.entries.write().await.push(log.clone());
        Ok(log)
    }

    async fn recent(&self, user_id: Option<Uuid>, limit: i64) -> Result<Vec<AuditLog>, AppError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .rev()
            .filter(|e| user_id.is_none() || e.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

// =========================================================================
//  OPTION LISTS
// =========================================================================

#[derive(Default)]
pub struct MemoryOptionListStore {
    lists: RwLock<Vec<OptionList>>,
    items: RwLock<Vec<OptionListItem>>,
}

impl MemoryOptionListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OptionListStore for MemoryOptionListStore {
    async fn create_list(&self, new: NewOptionList) -> Result<OptionList, AppError> {
        let mut lists = self.lists.write().await;
        if lists
            .iter()
            .any(|l| l.slug == new.slug && l.organisation_id == new.organisation_id)
        {
            return Err(AppError::Conflict(format!(
                "Option list slug '{}' already exists.",
                new.slug
            )));
        }

        let list = OptionList {
            id: Uuid::new_v4(),
            name: new.name,
            slug: new.slug,
            description: new.description,
            organisation_id: new.organisation_id,
            is_template: new.is_template,
            created_at: Utc::now(),
        };
        lists.push(list.clone());
        Ok(list)
    }

    async fn get_list(&self, id: Uuid) -> Result<Option<OptionList>, AppError> {
        Ok(self.lists.read().await.iter().find(|l| l.id == id).cloned())
    }

    async fn find_list_by_slug(
        &self,
        slug: &str,
        organisation_id: Option<Uuid>,
    ) -> Result<Option<OptionList>, AppError> {
        Ok(self
            .lists
            .read()
            .await
            .iter()
            .find(|l| l.slug == slug && l.organisation_id == organisation_id)
            .cloned())
    }

    async fn list_lists(&self, organisation_id: Option<Uuid>) -> Result<Vec<OptionList>, AppError> {
        let mut lists: Vec<OptionList> = self
            .lists
            .read()
            .await
            .iter()
            .filter(|l| l.organisation_id.is_none() || l.organisation_id == organisation_id)
            .cloned()
            .collect();
        lists.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(lists)
    }

    async fn create_item(&self, new: NewOptionListItem) -> Result<OptionListItem, AppError> {
        let mut items = self.items.write().await;
        if items
            .iter()
            .any(|i| i.option_list_id == new.option_list_id && i.slug == new.slug)
        {
            return Err(AppError::Conflict(format!(
                "Item slug '{}' already exists.",
                new.slug
            )));
        }

        let item = OptionListItem {
            id: Uuid::new_v4(),
            option_list_id: new.option_list_id,
            name: new.name,
            label: new.label,
            slug: new.slug,
            sort_order: new.sort_order,
            is_active: new.is_active,
            metadata: new.metadata,
            parent_id: new.parent_id,
            region: new.region,
            created_at: Utc::now(),
        };
        items.push(item.clone());
        Ok(item)
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<OptionListItem>, AppError> {
        Ok(self.items.read().await.iter().find(|i| i.id == id).cloned())
    }

    async fn list_items(&self, option_list_id: Uuid) -> Result<Vec<OptionListItem>, AppError> {
        let mut items: Vec<OptionListItem> = self
            .items
            .read()
            .await
            .iter()
            .filter(|i| i.option_list_id == option_list_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(items)
    }
}

// =========================================================================
//  ROLES / USERS
// =========================================================================

pub struct MemoryRoleStore {
    roles: RwLock<Vec<Role>>,
    mappings: RwLock<HashMap<String, GroupRoleMapping>>,
}

impl MemoryRoleStore {
    /// Seeded with the same roles as the initial migration.
    pub fn with_default_roles() -> Self {
        let seed = [
            ("Administrator", "Full administrative access", 10),
            ("Manager", "Manages teams and organisation settings", 20),
            ("Practitioner", "Day-to-day case work on clients and referrals", 30),
            ("Viewer", "Read-only access", 40),
        ];
        let roles = seed
            .into_iter()
            .map(|(name, description, level)| Role {
                id: Uuid::new_v4(),
                name: name.to_string(),
                description: Some(description.to_string()),
                level,
            })
            .collect();

        Self {
            roles: RwLock::new(roles),
            mappings: RwLock::new(HashMap::new()),
        }
    }

    async fn role_by_id(&self, id: Uuid) -> Option<Role> {
        self.roles.read().await.iter().find(|r| r.id == id).cloned()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        let mut roles = self.roles.read().await.clone();
        roles.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.name.cmp(&b.name)));
        Ok(roles)
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        Ok(self.roles.read().await.iter().find(|r| r.name == name).cloned())
    }

    async fn find_role_for_group(&self, group_id: &str) -> Result<Option<Role>, AppError> {
        let role_id = self.mappings.read().await.get(group_id).map(|m| m.role_id);
        match role_id {
            Some(id) => Ok(self.role_by_id(id).await),
            None => Ok(None),
        }
    }

    async fn roles_for_groups(&self, group_ids: &[String]) -> Result<Vec<Role>, AppError> {
        let role_ids: Vec<Uuid> = {
            let mappings = self.mappings.read().await;
            group_ids.iter().filter_map(|g| mappings.get(g)).map(|m| m.role_id).collect()
        };
        let roles = self.roles.read().await;
        Ok(roles.iter().filter(|r| role_ids.contains(&r.id)).cloned().collect())
    }

    async fn upsert_mapping(
        &self,
        group_id: &str,
        group_name: &str,
        role_id: Uuid,
    ) -> Result<(GroupRoleMapping, Upserted), AppError> {
        let now = Utc::now();
        let mut mappings = self.mappings.write().await;

        match mappings.get_mut(group_id) {
            Some(existing) => {
                existing.group_name = group_name.to_string();
                existing.role_id = role_id;
                existing.updated_at = now;
                Ok((existing.clone(), Upserted::Updated))
            }
            None => {
                let mapping = GroupRoleMapping {
                    id: Uuid::new_v4(),
                    group_id: group_id.to_string(),
                    group_name: group_name.to_string(),
                    role_id,
                    created_at: now,
                    updated_at: now,
                };
                mappings.insert(group_id.to_string(), mapping.clone());
                Ok((mapping, Upserted::Created))
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_contact(organisation_id: Uuid) -> NewContact {
        NewContact {
            organisation_id,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            job_title: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn deleted_rows_only_show_on_the_explicit_path() {
        let table: MemoryTable<Contact> = MemoryTable::new();
        let actor = Uuid::new_v4();
        let org = Uuid::new_v4();
        let kept = table.insert(new_contact(org), actor).await.unwrap();
        let gone = table.insert(new_contact(org), actor).await.unwrap();

        let deleted = table.soft_delete(gone.id, actor).await.unwrap();
        assert!(deleted.lifecycle.is_deleted);
        assert_eq!(deleted.lifecycle.deleted_by, Some(actor));
        assert!(deleted.lifecycle.deleted_at.is_some());

        assert!(matches!(table.get_active(gone.id).await, Err(AppError::NotFound("Contact"))));
        assert!(table.get_including_deleted(gone.id).await.unwrap().lifecycle.is_deleted);

        let active: Vec<Uuid> = table.list_active().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(active, vec![kept.id]);
        assert_eq!(table.list_all().await.unwrap().len(), 2);
        assert_eq!(table.list_active_for_organisation(org).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn re_delete_is_a_conflict_and_missing_is_not_found() {
        let table: MemoryTable<Contact> = MemoryTable::new();
        let actor = Uuid::new_v4();
        let c = table.insert(new_contact(Uuid::new_v4()), actor).await.unwrap();

        table.soft_delete(c.id, actor).await.unwrap();
        assert!(matches!(table.soft_delete(c.id, actor).await, Err(AppError::Conflict(_))));
        assert!(matches!(
            table.soft_delete(Uuid::new_v4(), actor).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_ignores_deleted_contacts() {
        let table: MemoryTable<Contact> = MemoryTable::new();
        let actor = Uuid::new_v4();
        let c = table.insert(new_contact(Uuid::new_v4()), actor).await.unwrap();
        table.soft_delete(c.id, actor).await.unwrap();

        let changes = ContactChanges { first_name: Some("Grace".into()), ..Default::default() };
        assert!(matches!(table.update(c.id, changes, actor).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn new_primary_email_demotes_previous_one() {
        let table: MemoryTable<EmailAddress> = MemoryTable::new();
        let actor = Uuid::new_v4();
        let contact_id = Uuid::new_v4();
        let first = table
            .insert(NewEmailAddress { contact_id, email: "a@example.org".into(), is_primary: true }, actor)
            .await
            .unwrap();
        table
            .insert(NewEmailAddress { contact_id, email: "b@example.org".into(), is_primary: true }, actor)
            .await
            .unwrap();

        let first = table.get_active(first.id).await.unwrap();
        assert!(!first.is_primary);
        let primaries = table
            .list_active_for_contact(contact_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|e| e.is_primary)
            .count();
        assert_eq!(primaries, 1);
    }

    #[tokio::test]
    async fn upsert_mapping_reports_created_then_updated() {
        let store = MemoryRoleStore::with_default_roles();
        let viewer = store.find_role_by_name("Viewer").await.unwrap().unwrap();
        let admin = store.find_role_by_name("Administrator").await.unwrap().unwrap();

        let (_, first) = store.upsert_mapping("g-1", "Group", viewer.id).await.unwrap();
        let (mapping, second) = store.upsert_mapping("g-1", "Renamed", admin.id).await.unwrap();

        assert_eq!(first, Upserted::Created);
        assert_eq!(second, Upserted::Updated);
        assert_eq!(mapping.group_name, "Renamed");
        assert_eq!(store.find_role_for_group("g-1").await.unwrap(), Some(admin));
    }
}
