// src/services/audit_service.rs

use std::sync::Arc;

use axum::body::Bytes;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    common::{db_utils::clamp_limit, error::AppError},
    db::AuditStore,
    models::audit::{
        truncate_chars, AuditLog, NewAuditLog, DEFAULT_AUDIT_QUERY_LIMIT, MAX_AUDIT_QUERY_LIMIT,
        REQUEST_BODY_MAX_CHARS, USER_AGENT_MAX_CHARS,
    },
};

/// Failure on the audit path. Logged by the recorder, never turned into a response.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit store rejected the entry: {0}")]
    Store(#[from] AppError),
}

/// What the audit layer captured from a request before handing it to the handler.
#[derive(Debug, Clone)]
pub struct ObservedRequest {
    pub user_id: Uuid,
    pub method: String,
    pub path: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub body: Bytes,
}

impl ObservedRequest {
    /// Builds the row for this request once the handler answered with `status`.
    pub fn into_entry(self, status: u16) -> NewAuditLog {
        let request_body = (!self.body.is_empty()).then(|| {
            truncate_chars(&String::from_utf8_lossy(&self.body), REQUEST_BODY_MAX_CHARS)
        });

        NewAuditLog {
            user_id: self.user_id,
            resource_id: resource_id_from_path(&self.path),
            action: self.method,
            path: self.path,
            ip_address: self.ip_address,
            user_agent: self
                .user_agent
                .map(|ua| truncate_chars(&ua, USER_AGENT_MAX_CHARS)),
            status_code: i32::from(status),
            request_body,
        }
    }
}

/// The last path segment that parses as a UUID (`/api/contacts/{id}` -> `id`).
pub fn resource_id_from_path(path: &str) -> Option<Uuid> {
    path.rsplit('/').find_map(|segment| Uuid::parse_str(segment).ok())
}

#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    pub async fn try_record(&self, entry: NewAuditLog) -> Result<AuditLog, AuditError> {
        Ok(self.store.append(entry).await?)
    }

    /// Persists the entry; any failure is logged and swallowed.
    pub async fn record(&self, entry: NewAuditLog) {
        let (method, path) = (entry.action.clone(), entry.path.clone());

        match self.try_record(entry).await {
            Ok(log) => {
                tracing::debug!(audit_id = %log.id, %method, %path, status = log.status_code, "audit entry written");
            }
            Err(e) => {
                tracing::error!(error = %e, %method, %path, "failed to write audit entry");
            }
        }
    }

    pub async fn recent(
        &self,
        user_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> Result<Vec<AuditLog>, AppError> {
        let limit = clamp_limit(limit, DEFAULT_AUDIT_QUERY_LIMIT, MAX_AUDIT_QUERY_LIMIT);
        self.store.recent(user_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryAuditStore;

    fn observed(path: &str, body: &'static [u8]) -> ObservedRequest {
        ObservedRequest {
            user_id: Uuid::new_v4(),
            method: "POST".into(),
            path: path.into(),
            ip_address: Some("203.0.113.7".into()),
            user_agent: Some("a".repeat(400)),
            body: Bytes::from_static(body),
        }
    }

    #[test]
    fn entry_truncates_body_and_user_agent() {
        let long = "é".repeat(1500);
        let mut req = observed("/api/contacts", b"");
        req.body = Bytes::from(long);

        let entry = req.into_entry(201);
        assert_eq!(entry.request_body.unwrap().chars().count(), REQUEST_BODY_MAX_CHARS);
        assert_eq!(entry.user_agent.unwrap().chars().count(), USER_AGENT_MAX_CHARS);
        assert_eq!(entry.status_code, 201);
        assert_eq!(entry.resource_id, None);
    }

    #[test]
    fn empty_body_is_not_stored() {
        let entry = observed("/api/contacts", b"").into_entry(422);
        assert_eq!(entry.request_body, None);
    }

    #[test]
    fn resource_id_is_the_last_uuid_segment() {
        let contact = Uuid::new_v4();
        assert_eq!(resource_id_from_path(&format!("/api/contacts/{contact}")), Some(contact));
        assert_eq!(
            resource_id_from_path(&format!("/api/contacts/{contact}/restore")),
            Some(contact)
        );
        assert_eq!(resource_id_from_path("/api/roles/mappings/sync"), None);
    }

    #[tokio::test]
    async fn recent_clamps_the_limit_and_filters_by_user() {
        let store = Arc::new(MemoryAuditStore::new());
        let recorder = AuditRecorder::new(store);

        let first = observed("/api/contacts", b"{}");
        let user = first.user_id;
        recorder.record(first.into_entry(201)).await;
        recorder.record(observed("/api/organisations", b"{}").into_entry(201)).await;

        assert_eq!(recorder.recent(None, None).await.unwrap().len(), 2);
        assert_eq!(recorder.recent(None, Some(0)).await.unwrap().len(), 1);

        let mine = recorder.recent(Some(user), None).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].path, "/api/contacts");
    }
}
