// src/models/lifecycle.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::error::AppError;

/// Bookkeeping columns shared by every soft-deletable table.
///
/// `is_deleted` is true exactly when both `deleted_by` and `deleted_at` are set.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Lifecycle {
    pub is_deleted: bool,
    pub deleted_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lifecycle {
    pub fn created(actor: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            is_deleted: false,
            deleted_by: None,
            deleted_at: None,
            created_by: Some(actor),
            updated_by: Some(actor),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self, actor: Uuid, now: DateTime<Utc>) {
        self.updated_by = Some(actor);
        self.updated_at = now;
    }

    /// Marks the record deleted. Deleting twice is a conflict, never a silent no-op.
    pub fn mark_deleted(&mut self, actor: Uuid, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.is_deleted {
            return Err(AppError::Conflict("Record is already deleted.".into()));
        }
        self.is_deleted = true;
        self.deleted_by = Some(actor);
        self.deleted_at = Some(now);
        self.touch(actor, now);
        debug_assert!(self.is_consistent());
        Ok(())
    }

    /// Clears all three deletion fields together.
    pub fn restore(&mut self, actor: Uuid, now: DateTime<Utc>) -> Result<(), AppError> {
        if !self.is_deleted {
            return Err(AppError::Conflict("Record is not deleted.".into()));
        }
        self.is_deleted = false;
        self.deleted_by = None;
        self.deleted_at = None;
        self.touch(actor, now);
        debug_assert!(self.is_consistent());
        Ok(())
    }

    /// Deletion fields are either all set or all clear, same as the table CHECK.
    pub fn is_consistent(&self) -> bool {
        self.deleted_by.is_some() == self.is_deleted && self.deleted_at.is_some() == self.is_deleted
    }
}

/// A row in a table that carries [`Lifecycle`] columns.
pub trait LifecycleRecord:
    for<'r> FromRow<'r, PgRow> + Clone + Send + Sync + Unpin + 'static
{
    /// Table holding the rows (also used for the generic soft-delete statements).
    const TABLE: &'static str;
    /// Human name used in `NotFound` errors.
    const RESOURCE: &'static str;

    fn id(&self) -> Uuid;
    fn lifecycle(&self) -> &Lifecycle;
    fn lifecycle_mut(&mut self) -> &mut Lifecycle;
}

/// Reference to a user as it appears in responses.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
pub struct UserRef {
    pub id: Uuid,
}

impl UserRef {
    fn from_id(id: Option<Uuid>) -> Option<Self> {
        id.map(|id| UserRef { id })
    }
}

/// Serialized form of [`Lifecycle`], flattened into every record response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LifecycleView {
    pub is_deleted: bool,
    pub deleted_by: Option<UserRef>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_by: Option<UserRef>,
    pub updated_by: Option<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Lifecycle> for LifecycleView {
    fn from(l: &Lifecycle) -> Self {
        Self {
            is_deleted: l.is_deleted,
            deleted_by: UserRef::from_id(l.deleted_by),
            deleted_at: l.deleted_at,
            created_by: UserRef::from_id(l.created_by),
            updated_by: UserRef::from_id(l.updated_by),
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

/// `?include_deleted=true` opts a read into the audit/recovery path.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IncludeDeletedQuery {
    #[serde(default)]
    pub include_deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn delete_sets_all_deletion_fields() {
        let creator = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let t0 = Utc::now();
        let mut l = Lifecycle::created(creator, t0);
        assert!(l.is_consistent());

        let t1 = t0 + Duration::seconds(5);
        l.mark_deleted(actor, t1).unwrap();

        assert!(l.is_deleted);
        assert_eq!(l.deleted_by, Some(actor));
        assert_eq!(l.deleted_at, Some(t1));
        assert_eq!(l.updated_by, Some(actor));
        assert_eq!(l.created_by, Some(creator));
        assert!(l.is_consistent());
    }

    #[test]
    fn second_delete_is_a_conflict_and_keeps_original_metadata() {
        let first = Uuid::new_v4();
        let t0 = Utc::now();
        let mut l = Lifecycle::created(first, t0);
        l.mark_deleted(first, t0).unwrap();

        let err = l.mark_deleted(Uuid::new_v4(), t0 + Duration::seconds(1)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(l.deleted_by, Some(first));
        assert_eq!(l.deleted_at, Some(t0));
    }

    #[test]
    fn restore_clears_deletion_fields_together() {
        let actor = Uuid::new_v4();
        let t0 = Utc::now();
        let mut l = Lifecycle::created(actor, t0);

        assert!(matches!(l.restore(actor, t0), Err(AppError::Conflict(_))));

        l.mark_deleted(actor, t0).unwrap();
        l.restore(actor, t0).unwrap();
        assert!(!l.is_deleted);
        assert_eq!(l.deleted_by, None);
        assert_eq!(l.deleted_at, None);
        assert!(l.is_consistent());
    }

    #[test]
    fn half_deleted_state_is_inconsistent() {
        let actor = Uuid::new_v4();
        let mut l = Lifecycle::created(actor, Utc::now());
        l.deleted_by = Some(actor);
        assert!(!l.is_consistent());
    }

    #[test]
    fn view_exposes_users_as_objects() {
        let actor = Uuid::new_v4();
        let l = Lifecycle::created(actor, Utc::now());
        let json = serde_json::to_value(LifecycleView::from(&l)).unwrap();
        assert_eq!(json["created_by"]["id"], actor.to_string());
        assert!(json["deleted_by"].is_null());
    }
}
