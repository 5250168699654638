pub mod soft_delete;
pub use soft_delete::{PgTable, SoftDeleteRepository};
pub mod organisation_repo;
pub use organisation_repo::{OrganisationRepository, OrganisationStore};
pub mod contact_repo;
pub use contact_repo::{
    ContactRepository, ContactStore, DocumentRepository, DocumentStore, EmailRepository,
    EmailStore, PhoneRepository, PhoneStore,
};
pub mod audit_repo;
pub use audit_repo::{AuditRepository, AuditStore};
pub mod option_list_repo;
pub use option_list_repo::{OptionListRepository, OptionListStore};
pub mod rbac_repo;
pub use rbac_repo::{RbacRepository, RoleStore};
pub mod user_repo;
pub use user_repo::{UserRepository, UserStore};

pub mod memory;
