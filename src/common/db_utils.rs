// src/common/db_utils.rs

use crate::common::error::AppError;

/// Turns a unique-constraint violation into a `Conflict`, everything else into `Database`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::Conflict(message());
        }
    }
    err.into()
}

/// Clamps a caller supplied page size into `1..=max`, falling back to `default`.
pub fn clamp_limit(requested: Option<i64>, default: i64, max: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, max)
}
