pub mod audit;
pub mod contacts;
pub mod documents;
pub mod option_lists;
pub mod organisations;
pub mod rbac;
