// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        memory::{
            MemoryAuditStore, MemoryOptionListStore, MemoryRoleStore, MemoryTable, MemoryUserStore,
        },
        AuditRepository, AuditStore, ContactRepository, ContactStore, DocumentRepository,
        DocumentStore, EmailRepository, EmailStore,
        OptionListRepository, OptionListStore, OrganisationRepository, OrganisationStore,
        PhoneRepository, PhoneStore, RbacRepository, RoleStore, UserRepository, UserStore,
    },
    models::organisation::{Contact, Document, EmailAddress, Organisation, PhoneNumber},
    services::{
        audit_service::AuditRecorder, auth::AuthService, contact_service::ContactService,
        option_list_service::OptionListService,
        rbac_service::{RbacService, GROUP_ROLE_MAPPINGS_ENV},
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Process configuration read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub database_max_connections: u32,
    /// Raw JSON array of group-to-role mappings, synced once at startup.
    pub group_role_mappings: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let database_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS is not a number: {raw}"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            database_max_connections,
            group_role_mappings: env::var(GROUP_ROLE_MAPPINGS_ENV).ok(),
        })
    }

    pub async fn connect(&self) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&self.database_url)
            .await
            .context("failed to connect to the database")?;

        tracing::info!("database connection established");
        Ok(pool)
    }
}

/// Every storage seam the services depend on.
#[derive(Clone)]
pub struct Stores {
    pub organisations: Arc<dyn OrganisationStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub emails: Arc<dyn EmailStore>,
    pub phones: Arc<dyn PhoneStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub audit: Arc<dyn AuditStore>,
    pub option_lists: Arc<dyn OptionListStore>,
    pub roles: Arc<dyn RoleStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            organisations: Arc::new(OrganisationRepository::new(pool.clone())),
            contacts: Arc::new(ContactRepository::new(pool.clone())),
            emails: Arc::new(EmailRepository::new(pool.clone())),
            phones: Arc::new(PhoneRepository::new(pool.clone())),
            documents: Arc::new(DocumentRepository::new(pool.clone())),
            audit: Arc::new(AuditRepository::new(pool.clone())),
            option_lists: Arc::new(OptionListRepository::new(pool.clone())),
            roles: Arc::new(RbacRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
        }
    }

    /// Fresh, empty in-process stores (roles seeded like the initial migration).
    pub fn in_memory() -> Self {
        Self {
            organisations: Arc::new(MemoryTable::<Organisation>::new()),
            contacts: Arc::new(MemoryTable::<Contact>::new()),
            emails: Arc::new(MemoryTable::<EmailAddress>::new()),
            phones: Arc::new(MemoryTable::<PhoneNumber>::new()),
            documents: Arc::new(MemoryTable::<Document>::new()),
            audit: Arc::new(MemoryAuditStore::new()),
            option_lists: Arc::new(MemoryOptionListStore::new()),
            roles: Arc::new(MemoryRoleStore::with_default_roles()),
            users: Arc::new(MemoryUserStore::new()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub contact_service: ContactService,
    pub audit_recorder: AuditRecorder,
    pub option_list_service: OptionListService,
    pub rbac_service: RbacService,
}

impl AppState {
    // --- Builds the dependency graph ---
    pub fn from_stores(stores: Stores, jwt_secret: impl Into<String>) -> Self {
        let rbac_service = RbacService::new(stores.roles);
        let auth_service = AuthService::new(stores.users, rbac_service.clone(), jwt_secret.into());

        Self {
            auth_service,
            contact_service: ContactService::new(
                stores.organisations.clone(),
                stores.contacts,
                stores.emails,
                stores.phones,
                stores.documents,
            ),
            audit_recorder: AuditRecorder::new(stores.audit),
            option_list_service: OptionListService::new(
                stores.option_lists,
                stores.organisations,
            ),
            rbac_service,
        }
    }

    pub fn postgres(pool: &PgPool, config: &Config) -> Self {
        Self::from_stores(Stores::postgres(pool), config.jwt_secret.clone())
    }

    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self::from_stores(Stores::in_memory(), jwt_secret)
    }
}
