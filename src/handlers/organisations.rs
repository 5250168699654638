// src/handlers/organisations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{not_blank, ValidatedJson},
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        lifecycle::IncludeDeletedQuery,
        organisation::{NewOrganisation, OrganisationResponse},
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganisationPayload {
    #[validate(required, length(min = 1, max = 200), custom(function = "not_blank"))]
    #[schema(example = "Riverside Community Trust")]
    pub name: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

// POST /api/organisations
#[utoipa::path(
    post,
    path = "/api/organisations",
    tag = "Organisations",
    request_body = CreateOrganisationPayload,
    responses(
        (status = 201, description = "Organisation created", body = OrganisationResponse),
        (status = 401, description = "Not authenticated"),
        (status = 422, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_organisation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CreateOrganisationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload
        .name
        .ok_or_else(|| anyhow::anyhow!("validated payload without a name"))?;

    let organisation = app_state
        .contact_service
        .create_organisation(
            NewOrganisation { name, description: payload.description },
            user.id(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(OrganisationResponse::from(organisation))))
}

// GET /api/organisations
#[utoipa::path(
    get,
    path = "/api/organisations",
    tag = "Organisations",
    params(IncludeDeletedQuery),
    responses(
        (status = 200, description = "Organisations", body = Vec<OrganisationResponse>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_organisations(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<IncludeDeletedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let organisations = app_state
        .contact_service
        .list_organisations(query.include_deleted)
        .await?;

    let body: Vec<OrganisationResponse> =
        organisations.into_iter().map(OrganisationResponse::from).collect();
    Ok(Json(body))
}

// GET /api/organisations/{id}
#[utoipa::path(
    get,
    path = "/api/organisations/{id}",
    tag = "Organisations",
    params(
        ("id" = Uuid, Path, description = "Organisation id"),
        IncludeDeletedQuery
    ),
    responses(
        (status = 200, description = "Organisation", body = OrganisationResponse),
        (status = 404, description = "Not found or deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_organisation(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(query): Query<IncludeDeletedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let organisation = app_state
        .contact_service
        .get_organisation(id, query.include_deleted)
        .await?;

    Ok(Json(OrganisationResponse::from(organisation)))
}

// DELETE /api/organisations/{id}
#[utoipa::path(
    delete,
    path = "/api/organisations/{id}",
    tag = "Organisations",
    params(("id" = Uuid, Path, description = "Organisation id")),
    responses(
        (status = 204, description = "Soft-deleted"),
        (status = 404, description = "Not found or already deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_organisation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.contact_service.delete_organisation(id, user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/organisations/{id}/restore
#[utoipa::path(
    post,
    path = "/api/organisations/{id}/restore",
    tag = "Organisations",
    params(("id" = Uuid, Path, description = "Organisation id")),
    responses(
        (status = 200, description = "Restored", body = OrganisationResponse),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn restore_organisation(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let organisation = app_state
        .contact_service
        .restore_organisation(id, user.id())
        .await?;

    Ok(Json(OrganisationResponse::from(organisation)))
}
