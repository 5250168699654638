// src/handlers/option_lists.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
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
    models::option_list::{Dropdowns, NewOptionList, NewOptionListItem, OptionList, OptionListItem},
    services::option_list_service::parse_field_spec,
};

// =============================================================================
//  PAYLOADS / QUERIES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOptionListPayload {
    #[validate(required, length(min = 1, max = 200), custom(function = "not_blank"))]
    #[schema(example = "Gender identity")]
    pub name: Option<String>,

    #[validate(required, length(min = 1, max = 100), custom(function = "not_blank"))]
    #[schema(example = "gender-identity")]
    pub slug: Option<String>,

    pub description: Option<String>,

    /// Leave empty for a global list.
    pub organisation_id: Option<Uuid>,

    #[serde(default)]
    pub is_template: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOptionListItemPayload {
    #[validate(required, length(min = 1, max = 200), custom(function = "not_blank"))]
    #[schema(example = "prefer_not_to_say")]
    pub name: Option<String>,

    /// Falls back to `name` in dropdowns when blank.
    #[serde(default)]
    #[validate(length(max = 200))]
    pub label: String,

    #[validate(required, length(min = 1, max = 100), custom(function = "not_blank"))]
    #[schema(example = "prefer-not-to-say")]
    pub slug: Option<String>,

    #[serde(default)]
    pub sort_order: i32,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,

    pub parent_id: Option<Uuid>,

    #[validate(length(max = 100))]
    pub region: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OptionListQuery {
    /// Include this organisation's own lists next to the global ones.
    pub organisation_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DropdownQuery {
    /// Comma-separated `name:slug` pairs, e.g. `gender:gender-identity,lang:languages`.
    pub fields: String,
    /// Prefer this organisation's lists over the global ones.
    pub organisation_id: Option<Uuid>,
}

fn lost_field(field: &str) -> AppError {
    anyhow::anyhow!("validated payload without {field}").into()
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/option-lists
#[utoipa::path(
    post,
    path = "/api/option-lists",
    tag = "Option lists",
    request_body = CreateOptionListPayload,
    responses(
        (status = 201, description = "Option list created", body = OptionList),
        (status = 409, description = "Slug already used in this scope"),
        (status = 422, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_option_list(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CreateOptionListPayload>,
) -> Result<impl IntoResponse, AppError> {
    let new = NewOptionList {
        name: payload.name.ok_or_else(|| lost_field("name"))?,
        slug: payload.slug.ok_or_else(|| lost_field("slug"))?,
        description: payload.description,
        organisation_id: payload.organisation_id,
        is_template: payload.is_template,
    };

    let list = app_state.option_list_service.create_list(new).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

// GET /api/option-lists
#[utoipa::path(
    get,
    path = "/api/option-lists",
    tag = "Option lists",
    params(OptionListQuery),
    responses(
        (status = 200, description = "Option lists", body = Vec<OptionList>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_option_lists(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<OptionListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let lists = app_state
        .option_list_service
        .list_lists(query.organisation_id)
        .await?;
    Ok(Json(lists))
}

// POST /api/option-lists/{id}/items
#[utoipa::path(
    post,
    path = "/api/option-lists/{id}/items",
    tag = "Option lists",
    params(("id" = Uuid, Path, description = "Option list id")),
    request_body = CreateOptionListItemPayload,
    responses(
        (status = 201, description = "Item created", body = OptionListItem),
        (status = 404, description = "Option list not found"),
        (status = 409, description = "Slug already used in this list"),
        (status = 422, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_option_list_item(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(option_list_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateOptionListItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    let new = NewOptionListItem {
        option_list_id,
        name: payload.name.ok_or_else(|| lost_field("name"))?,
        label: payload.label,
        slug: payload.slug.ok_or_else(|| lost_field("slug"))?,
        sort_order: payload.sort_order,
        is_active: payload.is_active,
        metadata: payload.metadata.unwrap_or_else(|| Value::Object(Default::default())),
        parent_id: payload.parent_id,
        region: payload.region,
    };

    let item = app_state.option_list_service.create_item(new).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

// GET /api/option-lists/{id}/items
#[utoipa::path(
    get,
    path = "/api/option-lists/{id}/items",
    tag = "Option lists",
    params(("id" = Uuid, Path, description = "Option list id")),
    responses(
        (status = 200, description = "All items, active or not", body = Vec<OptionListItem>),
        (status = 404, description = "Option list not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_option_list_items(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(option_list_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.option_list_service.list_items(option_list_id).await?;
    Ok(Json(items))
}

// GET /api/option-lists/dropdowns
#[utoipa::path(
    get,
    path = "/api/option-lists/dropdowns",
    tag = "Option lists",
    params(DropdownQuery),
    responses(
        (status = 200, description = "Logical name -> ordered options; unknown slugs map to []", body = Dropdowns)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dropdowns(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<DropdownQuery>,
) -> Result<impl IntoResponse, AppError> {
    let requests = parse_field_spec(&query.fields);
    let dropdowns = app_state
        .option_list_service
        .aggregate(&requests, query.organisation_id)
        .await?;
    Ok(Json(Dropdowns(dropdowns)))
}
