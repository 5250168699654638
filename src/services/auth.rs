// src/services/auth.rs

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserStore,
    models::auth::{Claims, CurrentUser},
    services::rbac_service::RbacService,
};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    rbac: RbacService,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, rbac: RbacService, jwt_secret: String) -> Self {
        Self { users, rbac, jwt_secret }
    }

    /// Decodes the bearer token and loads the principal it names.
    ///
    /// Bad signatures, expired tokens and unknown or inactive users are all `InvalidToken`.
    pub async fn validate_token(&self, token: &str) -> Result<CurrentUser, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        let claims = token_data.claims;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidToken)?;

        // Role comes from the identity-provider groups forwarded in the token
        let role = self.rbac.resolve_highest(&claims.groups).await?;

        Ok(CurrentUser { user, role })
    }

    pub fn issue_token(&self, user_id: Uuid, groups: Vec<String>) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(12);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
            groups,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory::{MemoryRoleStore, MemoryUserStore},
        models::{auth::User, rbac::RoleMappingEntry},
    };

    async fn setup(active: bool) -> (AuthService, Uuid) {
        let users = Arc::new(MemoryUserStore::new());
        let id = Uuid::new_v4();
        users
            .insert(User {
                id,
                email: "jane@example.org".into(),
                display_name: "Jane".into(),
                is_active: active,
                created_at: Utc::now(),
            })
            .await;

        let rbac = RbacService::new(Arc::new(MemoryRoleStore::with_default_roles()));
        rbac.sync(vec![RoleMappingEntry {
            group_id: "grp-managers".into(),
            group_name: "Managers".into(),
            role_name: "Manager".into(),
        }])
        .await;

        (AuthService::new(users, rbac, "test-secret".into()), id)
    }

    #[tokio::test]
    async fn token_round_trip_attaches_the_mapped_role() {
        let (auth, id) = setup(true).await;
        let token = auth.issue_token(id, vec!["grp-managers".into()]).unwrap();

        let current = auth.validate_token(&token).await.unwrap();
        assert_eq!(current.id(), id);
        assert_eq!(current.role.unwrap().name, "Manager");
    }

    #[tokio::test]
    async fn inactive_users_and_garbage_tokens_are_rejected() {
        let (auth, id) = setup(false).await;
        let token = auth.issue_token(id, Vec::new()).unwrap();

        assert!(matches!(auth.validate_token(&token).await, Err(AppError::InvalidToken)));
        assert!(matches!(auth.validate_token("not-a-jwt").await, Err(AppError::InvalidToken)));
    }
}
