pub mod audit;
pub mod auth;
pub mod lifecycle;
pub mod option_list;
pub mod organisation;
pub mod rbac;
