// src/handlers/rbac.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{Administrator, RequireRole},
    },
    models::rbac::{Role, RoleMappingEntry, SyncReport},
};

// GET /api/roles
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "Roles",
    responses(
        (status = 200, description = "Roles, most privileged first", body = Vec<Role>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let roles = app_state.rbac_service.list_roles().await?;
    Ok(Json(roles))
}

// GET /api/roles/groups/{group_id}
#[utoipa::path(
    get,
    path = "/api/roles/groups/{group_id}",
    tag = "Roles",
    params(("group_id" = String, Path, description = "Identity-provider group id")),
    responses(
        (status = 200, description = "Role mapped from the group", body = Role),
        (status = 404, description = "Group is not mapped")
    ),
    security(("api_jwt" = []))
)]
pub async fn resolve_group_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(group_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let role = app_state
        .rbac_service
        .resolve(&group_id)
        .await?
        .ok_or(AppError::NotFound("Group role mapping"))?;
    Ok(Json(role))
}

// POST /api/roles/mappings/sync
// Takes the raw body so a malformed array aborts as a whole while bad elements fail alone
#[utoipa::path(
    post,
    path = "/api/roles/mappings/sync",
    tag = "Roles",
    request_body = Vec<RoleMappingEntry>,
    responses(
        (status = 200, description = "Per-entry outcome", body = SyncReport),
        (status = 403, description = "Administrator role required"),
        (status = 422, description = "Body is not a JSON array")
    ),
    security(("api_jwt" = []))
)]
pub async fn sync_role_mappings(
    State(app_state): State<AppState>,
    RequireRole(user, _): RequireRole<Administrator>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.rbac_service.sync_from_json(&body).await?;
    tracing::info!(
        user_id = %user.id(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "role mappings synced over the API"
    );
    Ok(Json(report))
}
