//! Shared harness for the HTTP tests: the real router over in-memory stores.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use casebook::{
    config::{AppState, Stores},
    db::{
        memory::{MemoryAuditStore, MemoryUserStore},
        AuditStore,
    },
    models::{audit::AuditLog, auth::User, rbac::RoleMappingEntry},
    routes::build_router,
};

pub const JWT_SECRET: &str = "test-secret";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
    pub audit: Arc<MemoryAuditStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let audit = Arc::new(MemoryAuditStore::new());
        Self::build(audit.clone(), audit)
    }

    /// Routes audit writes to `audit_store`; `audit` then stays empty.
    pub fn with_audit_store(audit_store: Arc<dyn AuditStore>) -> Self {
        Self::build(audit_store, Arc::new(MemoryAuditStore::new()))
    }

    fn build(audit_store: Arc<dyn AuditStore>, audit: Arc<MemoryAuditStore>) -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let mut stores = Stores::in_memory();
        stores.users = users.clone();
        stores.audit = audit_store;

        let state = AppState::from_stores(stores, JWT_SECRET);
        Self {
            router: build_router(state.clone()),
            state,
            users,
            audit,
        }
    }

    /// Creates an active user and returns a bearer token for it.
    pub async fn login(&self, groups: &[&str]) -> (Uuid, String) {
        let user = User {
            id: Uuid::new_v4(),
            email: format!("{}@example.org", Uuid::new_v4()),
            display_name: "Test User".into(),
            is_active: true,
            created_at: Utc::now(),
        };
        let id = user.id;
        self.users.insert(user).await;

        let token = self
            .state
            .auth_service
            .issue_token(id, groups.iter().map(|g| g.to_string()).collect())
            .unwrap();
        (id, token)
    }

    /// Maps a group to `role_name` and logs in a user carrying that group.
    pub async fn login_as(&self, role_name: &str) -> (Uuid, String) {
        let group = format!("grp-{}", role_name.to_lowercase());
        let report = self
            .state
            .rbac_service
            .sync(vec![RoleMappingEntry {
                group_id: group.clone(),
                group_name: role_name.to_string(),
                role_name: role_name.to_string(),
            }])
            .await;
        assert_eq!(report.failed(), 0, "unknown role {role_name}");
        self.login(&[group.as_str()]).await
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn audit_rows(&self) -> Vec<AuditLog> {
        self.audit.recent(None, 1000).await.unwrap()
    }

    /// Creates an organisation and returns its id.
    pub async fn organisation(&self, token: &str) -> Uuid {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/organisations",
                Some(token),
                Some(serde_json::json!({ "name": "Riverside Community Trust" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().parse().unwrap()
    }
}
