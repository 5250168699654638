pub mod audit_service;
pub mod auth;
pub mod contact_service;
pub mod option_list_service;
pub mod rbac_service;
