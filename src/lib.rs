//! Case-management API: contacts with soft-delete lifecycles, an audit trail of
//! mutating calls, option-list dropdowns and identity-provider role mappings.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
