// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::{audit::audit_recorder, auth::resolve_principal},
};

fn organisation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::organisations::create_organisation)
                .get(handlers::organisations::list_organisations),
        )
        .route(
            "/{id}",
            get(handlers::organisations::get_organisation)
                .delete(handlers::organisations::delete_organisation),
        )
        .route("/{id}/restore", post(handlers::organisations::restore_organisation))
}

fn contact_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::contacts::create_contact).get(handlers::contacts::list_contacts),
        )
        .route(
            "/{id}",
            get(handlers::contacts::get_contact)
                .patch(handlers::contacts::update_contact)
                .delete(handlers::contacts::delete_contact),
        )
        .route("/{id}/restore", post(handlers::contacts::restore_contact))
        .route(
            "/{id}/emails",
            post(handlers::contacts::add_email).get(handlers::contacts::list_emails),
        )
        .route(
            "/{id}/phones",
            post(handlers::contacts::add_phone).get(handlers::contacts::list_phones),
        )
        .route(
            "/{id}/documents",
            post(handlers::documents::add_document).get(handlers::documents::list_documents),
        )
}

fn option_list_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::option_lists::create_option_list)
                .get(handlers::option_lists::list_option_lists),
        )
        .route("/dropdowns", get(handlers::option_lists::get_dropdowns))
        .route(
            "/{id}/items",
            post(handlers::option_lists::create_option_list_item)
                .get(handlers::option_lists::list_option_list_items),
        )
}

fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::rbac::list_roles))
        .route("/groups/{group_id}", get(handlers::rbac::resolve_group_role))
        .route("/mappings/sync", post(handlers::rbac::sync_role_mappings))
}

/// Composes every route group once, at startup.
///
/// Layer order matters: authentication runs first and attaches the principal,
/// then the audit recorder wraps the handlers.
pub fn build_router(app_state: AppState) -> Router {
    // Full paths here: the layers below see the URI as the client sent it
    let api = Router::new()
        .nest("/api/organisations", organisation_routes())
        .nest("/api/contacts", contact_routes())
        .route(
            "/api/emails/{id}",
            get(handlers::contacts::get_email).delete(handlers::contacts::delete_email),
        )
        .route(
            "/api/phones/{id}",
            get(handlers::contacts::get_phone).delete(handlers::contacts::delete_phone),
        )
        .route(
            "/api/documents/{id}",
            get(handlers::documents::get_document).delete(handlers::documents::delete_document),
        )
        .nest("/api/option-lists", option_list_routes())
        .route("/api/audit-logs", get(handlers::audit::list_audit_logs))
        .nest("/api/roles", role_routes())
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), audit_recorder))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), resolve_principal));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
