// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, models::auth::CurrentUser};

/// A minimum role, expressed as the highest `level` that still qualifies.
pub trait RoleRequirement: Send + Sync + 'static {
    const NAME: &'static str;
    const MAX_LEVEL: i32;
}

/// Extractor that only lets through principals whose mapped role is at least `R`.
pub struct RequireRole<R>(pub CurrentUser, pub PhantomData<R>);

pub fn meets<R: RoleRequirement>(user: &CurrentUser) -> bool {
    user.role.as_ref().is_some_and(|role| role.level <= R::MAX_LEVEL)
}

impl<R, S> FromRequestParts<S> for RequireRole<R>
where
    R: RoleRequirement,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthenticated)?;

        if !meets::<R>(&user) {
            tracing::info!(
                user_id = %user.id(),
                role = user.role.as_ref().map(|r| r.name.as_str()),
                required = R::NAME,
                "role check refused"
            );
            return Err(AppError::Forbidden(format!(
                "The {} role or higher is required for this action.",
                R::NAME
            )));
        }

        Ok(RequireRole(user, PhantomData))
    }
}

// ---
// Role thresholds
// ---

pub struct Administrator;
impl RoleRequirement for Administrator {
    const NAME: &'static str = "Administrator";
    const MAX_LEVEL: i32 = 10;
}

pub struct Manager;
impl RoleRequirement for Manager {
    const NAME: &'static str = "Manager";
    const MAX_LEVEL: i32 = 20;
}
