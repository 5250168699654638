// src/handlers/contacts.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
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
        organisation::{
            ContactChanges, ContactResponse, EmailAddressResponse, NewContact, NewEmailAddress,
            NewPhoneNumber, PhoneNumberResponse, PhoneType,
        },
    },
};

// =============================================================================
//  PAYLOADS
// =============================================================================

// Required fields are `Option` so a missing one is reported as "missing", not as a parse error
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateContactPayload {
    #[validate(required)]
    pub organisation_id: Option<Uuid>,

    #[validate(required, length(min = 1, max = 100), custom(function = "not_blank"))]
    #[schema(example = "Jane")]
    pub first_name: Option<String>,

    #[validate(required, length(min = 1, max = 100), custom(function = "not_blank"))]
    #[schema(example = "Doe")]
    pub last_name: Option<String>,

    #[validate(length(max = 100))]
    #[schema(example = "Social Worker")]
    pub job_title: Option<String>,

    pub notes: Option<String>,
}

impl CreateContactPayload {
    fn into_new(self) -> Option<NewContact> {
        Some(NewContact {
            organisation_id: self.organisation_id?,
            first_name: self.first_name?,
            last_name: self.last_name?,
            job_title: self.job_title,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateContactPayload {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub last_name: Option<String>,

    #[validate(length(max = 100))]
    pub job_title: Option<String>,

    pub notes: Option<String>,
}

impl From<UpdateContactPayload> for ContactChanges {
    fn from(p: UpdateContactPayload) -> Self {
        Self {
            first_name: p.first_name,
            last_name: p.last_name,
            job_title: p.job_title,
            notes: p.notes,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddEmailPayload {
    #[validate(required, email)]
    #[schema(example = "jane.doe@example.org")]
    pub email: Option<String>,

    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddPhonePayload {
    #[validate(required, length(min = 1, max = 32), custom(function = "not_blank"))]
    #[schema(example = "+44 20 7946 0000")]
    pub number: Option<String>,

    #[validate(required)]
    pub phone_type: Option<PhoneType>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactListQuery {
    /// Only contacts of this organisation.
    pub organisation_id: Option<Uuid>,
    #[serde(default)]
    pub include_deleted: bool,
}

fn lost_field(field: &str) -> AppError {
    anyhow::anyhow!("validated payload without {field}").into()
}

// =============================================================================
//  CONTACTS
// =============================================================================

// POST /api/contacts
#[utoipa::path(
    post,
    path = "/api/contacts",
    tag = "Contacts",
    request_body = CreateContactPayload,
    responses(
        (status = 201, description = "Contact created", body = ContactResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Organisation not found"),
        (status = 422, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contact(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CreateContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    let new = payload.into_new().ok_or_else(|| lost_field("a required field"))?;

    let contact = app_state.contact_service.create_contact(new, user.id()).await?;

    Ok((StatusCode::CREATED, Json(ContactResponse::from(contact))))
}

// GET /api/contacts
#[utoipa::path(
    get,
    path = "/api/contacts",
    tag = "Contacts",
    params(ContactListQuery),
    responses(
        (status = 200, description = "Contacts", body = Vec<ContactResponse>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contacts(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<ContactListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let contacts = app_state
        .contact_service
        .list_contacts(query.organisation_id, query.include_deleted)
        .await?;

    let body: Vec<ContactResponse> = contacts.into_iter().map(ContactResponse::from).collect();
    Ok(Json(body))
}

// GET /api/contacts/{id}
#[utoipa::path(
    get,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(
        ("id" = Uuid, Path, description = "Contact id"),
        IncludeDeletedQuery
    ),
    responses(
        (status = 200, description = "Contact", body = ContactResponse),
        (status = 404, description = "Not found or deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_contact(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(query): Query<IncludeDeletedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let contact = app_state
        .contact_service
        .get_contact(id, query.include_deleted)
        .await?;

    Ok(Json(ContactResponse::from(contact)))
}

// PATCH /api/contacts/{id}
#[utoipa::path(
    patch,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Contact id")),
    request_body = UpdateContactPayload,
    responses(
        (status = 200, description = "Contact updated", body = ContactResponse),
        (status = 404, description = "Not found or deleted"),
        (status = 422, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contact(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    let contact = app_state
        .contact_service
        .update_contact(id, payload.into(), user.id())
        .await?;

    Ok(Json(ContactResponse::from(contact)))
}

// DELETE /api/contacts/{id}
#[utoipa::path(
    delete,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Contact id")),
    responses(
        (status = 204, description = "Soft-deleted"),
        (status = 404, description = "Not found or already deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contact(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.contact_service.delete_contact(id, user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/contacts/{id}/restore
#[utoipa::path(
    post,
    path = "/api/contacts/{id}/restore",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Restored", body = ContactResponse),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn restore_contact(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let contact = app_state.contact_service.restore_contact(id, user.id()).await?;
    Ok(Json(ContactResponse::from(contact)))
}

// =============================================================================
//  EMAIL ADDRESSES
// =============================================================================

// POST /api/contacts/{id}/emails
#[utoipa::path(
    post,
    path = "/api/contacts/{id}/emails",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Contact id")),
    request_body = AddEmailPayload,
    responses(
        (status = 201, description = "Email address added", body = EmailAddressResponse),
        (status = 404, description = "Contact not found"),
        (status = 422, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_email(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(contact_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddEmailPayload>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.ok_or_else(|| lost_field("email"))?;

    let created = app_state
        .contact_service
        .add_email(
            NewEmailAddress { contact_id, email, is_primary: payload.is_primary },
            user.id(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(EmailAddressResponse::from(created))))
}

// GET /api/contacts/{id}/emails
#[utoipa::path(
    get,
    path = "/api/contacts/{id}/emails",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Active email addresses", body = Vec<EmailAddressResponse>),
        (status = 404, description = "Contact not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_emails(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(contact_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let emails = app_state.contact_service.list_emails(contact_id).await?;
    let body: Vec<EmailAddressResponse> =
        emails.into_iter().map(EmailAddressResponse::from).collect();
    Ok(Json(body))
}

// GET /api/emails/{id}
#[utoipa::path(
    get,
    path = "/api/emails/{id}",
    tag = "Contacts",
    params(
        ("id" = Uuid, Path, description = "Email address id"),
        IncludeDeletedQuery
    ),
    responses(
        (status = 200, description = "Email address", body = EmailAddressResponse),
        (status = 404, description = "Not found or deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_email(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(query): Query<IncludeDeletedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let email = app_state.contact_service.get_email(id, query.include_deleted).await?;
    Ok(Json(EmailAddressResponse::from(email)))
}

// DELETE /api/emails/{id}
#[utoipa::path(
    delete,
    path = "/api/emails/{id}",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Email address id")),
    responses(
        (status = 204, description = "Soft-deleted"),
        (status = 404, description = "Not found or already deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_email(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.contact_service.delete_email(id, user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  PHONE NUMBERS
// =============================================================================

// POST /api/contacts/{id}/phones
#[utoipa::path(
    post,
    path = "/api/contacts/{id}/phones",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Contact id")),
    request_body = AddPhonePayload,
    responses(
        (status = 201, description = "Phone number added", body = PhoneNumberResponse),
        (status = 404, description = "Contact not found"),
        (status = 422, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_phone(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(contact_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddPhonePayload>,
) -> Result<impl IntoResponse, AppError> {
    let number = payload.number.ok_or_else(|| lost_field("number"))?;
    let phone_type = payload.phone_type.ok_or_else(|| lost_field("phone_type"))?;

    let created = app_state
        .contact_service
        .add_phone(NewPhoneNumber { contact_id, number, phone_type }, user.id())
        .await?;

    Ok((StatusCode::CREATED, Json(PhoneNumberResponse::from(created))))
}

// GET /api/contacts/{id}/phones
#[utoipa::path(
    get,
    path = "/api/contacts/{id}/phones",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Active phone numbers", body = Vec<PhoneNumberResponse>),
        (status = 404, description = "Contact not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_phones(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(contact_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let phones = app_state.contact_service.list_phones(contact_id).await?;
    let body: Vec<PhoneNumberResponse> = phones.into_iter().map(PhoneNumberResponse::from).collect();
    Ok(Json(body))
}

// GET /api/phones/{id}
#[utoipa::path(
    get,
    path = "/api/phones/{id}",
    tag = "Contacts",
    params(
        ("id" = Uuid, Path, description = "Phone number id"),
        IncludeDeletedQuery
    ),
    responses(
        (status = 200, description = "Phone number", body = PhoneNumberResponse),
        (status = 404, description = "Not found or deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_phone(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(query): Query<IncludeDeletedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let phone = app_state.contact_service.get_phone(id, query.include_deleted).await?;
    Ok(Json(PhoneNumberResponse::from(phone)))
}

// DELETE /api/phones/{id}
#[utoipa::path(
    delete,
    path = "/api/phones/{id}",
    tag = "Contacts",
    params(("id" = Uuid, Path, description = "Phone number id")),
    responses(
        (status = 204, description = "Soft-deleted"),
        (status = 404, description = "Not found or already deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_phone(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.contact_service.delete_phone(id, user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}
