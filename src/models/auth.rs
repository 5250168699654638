// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::rbac::Role;

// A user as stored in the database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    #[schema(example = "jane.doe@example.org")]
    pub email: String,
    #[schema(example = "Jane Doe")]
    pub display_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// Claims carried by the bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // user id
    pub exp: usize, // expiry (unix seconds)
    pub iat: usize, // issued at
    // Identity-provider group ids, when the issuer forwards them
    #[serde(default)]
    pub groups: Vec<String>,
}

/// The authenticated principal attached to a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// Most privileged role mapped from the token's groups.
    pub role: Option<Role>,
}

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}
