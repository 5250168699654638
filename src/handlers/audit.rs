// src/handlers/audit.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{Manager, RequireRole},
    models::audit::{AuditLog, AuditLogQuery},
};

// GET /api/audit-logs
#[utoipa::path(
    get,
    path = "/api/audit-logs",
    tag = "Audit",
    params(AuditLogQuery),
    responses(
        (status = 200, description = "Audit entries, newest first", body = Vec<AuditLog>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Manager role required")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_audit_logs(
    State(app_state): State<AppState>,
    _manager: RequireRole<Manager>,
    Query(query): Query<AuditLogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let logs = app_state
        .audit_recorder
        .recent(query.user_id, query.limit)
        .await?;
    Ok(Json(logs))
}
