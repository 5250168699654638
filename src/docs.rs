// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Organisations ---
        handlers::organisations::create_organisation,
        handlers::organisations::list_organisations,
        handlers::organisations::get_organisation,
        handlers::organisations::delete_organisation,
        handlers::organisations::restore_organisation,

        // --- Contacts ---
        handlers::contacts::create_contact,
        handlers::contacts::list_contacts,
        handlers::contacts::get_contact,
        handlers::contacts::update_contact,
        handlers::contacts::delete_contact,
        handlers::contacts::restore_contact,
        handlers::contacts::add_email,
        handlers::contacts::list_emails,
        handlers::contacts::get_email,
        handlers::contacts::delete_email,
        handlers::contacts::add_phone,
        handlers::contacts::list_phones,
        handlers::contacts::get_phone,
        handlers::contacts::delete_phone,
        handlers::documents::add_document,
        handlers::documents::list_documents,
        handlers::documents::get_document,
        handlers::documents::delete_document,

        // --- Option lists ---
        handlers::option_lists::create_option_list,
        handlers::option_lists::list_option_lists,
        handlers::option_lists::create_option_list_item,
        handlers::option_lists::list_option_list_items,
        handlers::option_lists::get_dropdowns,

        // --- Audit ---
        handlers::audit::list_audit_logs,

        // --- Roles ---
        handlers::rbac::list_roles,
        handlers::rbac::resolve_group_role,
        handlers::rbac::sync_role_mappings,
    ),
    components(
        schemas(
            // --- Errors ---
            crate::common::error::FieldError,

            // --- Records ---
            models::lifecycle::UserRef,
            models::lifecycle::LifecycleView,
            models::organisation::PhoneType,
            models::organisation::OrganisationResponse,
            models::organisation::ContactResponse,
            models::organisation::EmailAddressResponse,
            models::organisation::PhoneNumberResponse,
            models::organisation::DocumentResponse,

            // --- Payloads ---
            handlers::organisations::CreateOrganisationPayload,
            handlers::contacts::CreateContactPayload,
            handlers::contacts::UpdateContactPayload,
            handlers::contacts::AddEmailPayload,
            handlers::contacts::AddPhonePayload,
            handlers::documents::AddDocumentPayload,
            handlers::option_lists::CreateOptionListPayload,
            handlers::option_lists::CreateOptionListItemPayload,

            // --- Option lists ---
            models::option_list::OptionList,
            models::option_list::OptionListItem,
            models::option_list::DropdownOption,
            models::option_list::Dropdowns,

            // --- Audit ---
            models::audit::AuditLog,

            // --- Roles ---
            models::rbac::Role,
            models::rbac::GroupRoleMapping,
            models::rbac::RoleMappingEntry,
            models::rbac::SyncStatus,
            models::rbac::SyncEntryResult,
            models::rbac::SyncReport,
        )
    ),
    tags(
        (name = "Organisations", description = "External organisations"),
        (name = "Contacts", description = "Contacts with their email addresses, phone numbers and documents"),
        (name = "Option lists", description = "Dropdown sources and batch aggregation"),
        (name = "Audit", description = "Trail of mutating API calls"),
        (name = "Roles", description = "Roles and identity-provider group mappings")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
