// src/handlers/documents.rs

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
        organisation::{DocumentResponse, NewDocument},
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddDocumentPayload {
    #[validate(required, length(min = 1, max = 200), custom(function = "not_blank"))]
    #[schema(example = "Consent form")]
    pub title: Option<String>,

    #[validate(required, length(min = 1, max = 255), custom(function = "not_blank"))]
    #[schema(example = "consent-2024.pdf")]
    pub file_name: Option<String>,

    #[validate(length(max = 100))]
    #[schema(example = "application/pdf")]
    pub content_type: Option<String>,

    #[validate(range(min = 0))]
    pub file_size: Option<i64>,
}

impl AddDocumentPayload {
    fn into_new(self, contact_id: Uuid) -> Result<NewDocument, AppError> {
        let lost = |field: &str| -> AppError { anyhow::anyhow!("validated payload without {field}").into() };
        Ok(NewDocument {
            contact_id,
            title: self.title.ok_or_else(|| lost("title"))?,
            file_name: self.file_name.ok_or_else(|| lost("file_name"))?,
            content_type: self.content_type,
            file_size: self.file_size,
        })
    }
}

// POST /api/contacts/{id}/documents
#[utoipa::path(
    post,
    path = "/api/contacts/{id}/documents",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Contact id")),
    request_body = AddDocumentPayload,
    responses(
        (status = 201, description = "Document attached", body = DocumentResponse),
        (status = 404, description = "Contact not found"),
        (status = 422, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_document(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(contact_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddDocumentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let new = payload.into_new(contact_id)?;
    let document = app_state.contact_service.add_document(new, user.id()).await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

// GET /api/contacts/{id}/documents
#[utoipa::path(
    get,
    path = "/api/contacts/{id}/documents",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Active documents", body = Vec<DocumentResponse>),
        (status = 404, description = "Contact not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(contact_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let documents = app_state.contact_service.list_documents(contact_id).await?;
    let body: Vec<DocumentResponse> = documents.into_iter().map(DocumentResponse::from).collect();
    Ok(Json(body))
}

// GET /api/documents/{id}
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "Contacts",
    params(
        ("id" = Uuid, Path, description = "Document id"),
        IncludeDeletedQuery
    ),
    responses(
        (status = 200, description = "Document", body = DocumentResponse),
        (status = 404, description = "Not found or deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_document(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(query): Query<IncludeDeletedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let document = app_state.contact_service.get_document(id, query.include_deleted).await?;
    Ok(Json(DocumentResponse::from(document)))
}

// DELETE /api/documents/{id}
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 204, description = "Soft-deleted"),
        (status = 404, description = "Not found or already deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_document(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.contact_service.delete_document(id, user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}
