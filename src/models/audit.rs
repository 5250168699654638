// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Longest request body kept on an audit row, in characters.
pub const REQUEST_BODY_MAX_CHARS: usize = 1000;
/// Longest user agent kept on an audit row, in characters.
pub const USER_AGENT_MAX_CHARS: usize = 255;

pub const DEFAULT_AUDIT_QUERY_LIMIT: i64 = 100;
pub const MAX_AUDIT_QUERY_LIMIT: i64 = 1000;

/// Append-only audit row. Never updated or deleted by the application.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    #[schema(example = "POST")]
    pub action: String,
    #[schema(example = "/api/contacts")]
    pub path: String,
    pub resource_id: Option<Uuid>,
    #[schema(example = "203.0.113.7")]
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[schema(example = 201)]
    pub status_code: i32,
    pub request_body: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Everything the recorder knows about one mutating request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLog {
    pub user_id: Uuid,
    pub action: String,
    pub path: String,
    pub resource_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub status_code: i32,
    pub request_body: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditLogQuery {
    /// Only entries written for this user.
    pub user_id: Option<Uuid>,
    /// Page size (default 100, max 1000).
    pub limit: Option<i64>,
}

/// Keeps at most `max` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}
