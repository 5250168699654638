// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Roles table. Lower `level` means more privileged.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema, PartialEq, Eq)]
pub struct Role {
    pub id: Uuid,

    #[schema(example = "Practitioner")]
    pub name: String,

    #[schema(example = "Day-to-day case work on clients and referrals")]
    pub description: Option<String>,

    #[schema(example = 30)]
    pub level: i32,
}

// Binds one identity-provider group to exactly one role.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct GroupRoleMapping {
    pub id: Uuid,

    #[schema(example = "6f1c2a9e-0d5b-4c1e-9a7f-3b2d8e4c5a10")]
    pub group_id: String,

    #[schema(example = "Case Workers")]
    pub group_name: String,

    pub role_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One element of a sync batch.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
pub struct RoleMappingEntry {
    pub group_id: String,
    pub group_name: String,
    pub role_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Created,
    Updated,
    Failed,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncEntryResult {
    /// Group id of the entry, when the entry was readable at all.
    pub group_id: Option<String>,
    pub status: SyncStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct SyncReport {
    pub results: Vec<SyncEntryResult>,
}

impl SyncReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.status != SyncStatus::Failed).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.status == SyncStatus::Failed).count()
    }
}
