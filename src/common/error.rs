// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

// Single error type shared by repositories, services and handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("malformed request body: {message}")]
    MalformedBody { kind: &'static str, message: String },

    #[error("authentication required")]
    Unauthenticated,

    #[error("invalid authentication token")]
    InvalidToken,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// One entry of the `detail` array returned with a 422.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct FieldError {
    #[schema(example = json!(["body", "first_name"]))]
    pub loc: Vec<String>,
    #[schema(example = "Field required")]
    pub msg: String,
    #[serde(rename = "type")]
    #[schema(example = "missing")]
    pub kind: String,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        let kind = match &rejection {
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            _ => "value_error",
        };
        AppError::MalformedBody {
            kind,
            message: rejection.body_text(),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::MalformedBody { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Unauthenticated | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Jwt(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Flattens the error into the `{loc, msg, type}` entries of a 422 body.
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            AppError::Validation(errors) => {
                // BTreeMap keeps the output ordered by field name.
                let by_field: BTreeMap<String, _> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errs)| (field.to_string(), errs))
                    .collect();

                by_field
                    .into_iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| describe(&field, e))
                    })
                    .collect()
            }
            AppError::MalformedBody { kind, message } => vec![FieldError {
                loc: vec!["body".to_string()],
                msg: message.clone(),
                kind: kind.to_string(),
            }],
            _ => Vec::new(),
        }
    }
}

fn describe(field: &str, error: &validator::ValidationError) -> FieldError {
    let (kind, default_msg) = match &*error.code {
        "required" => ("missing", "Field required".to_string()),
        "length" => ("string_length", "Value has an invalid length".to_string()),
        "email" => ("value_error", "Value is not a valid email address".to_string()),
        "blank" => ("blank", "Field may not be blank".to_string()),
        other => ("value_error", format!("Invalid value ({other})")),
    };

    FieldError {
        loc: vec!["body".to_string(), field.to_string()],
        msg: error
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or(default_msg),
        kind: kind.to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Validation(_) | AppError::MalformedBody { .. } => {
                json!({ "detail": self.field_errors() })
            }
            AppError::NotFound(resource) => json!({ "detail": format!("{resource} not found.") }),
            AppError::Unauthenticated => {
                json!({ "detail": "Authentication credentials were not provided." })
            }
            AppError::InvalidToken => json!({ "detail": "Invalid or expired token." }),
            AppError::Forbidden(message) => json!({ "detail": message }),
            AppError::PayloadTooLarge => json!({ "detail": "Request body too large." }),
            AppError::Conflict(message) => json!({ "detail": message }),
            // The detailed message only goes to the log.
            e => {
                tracing::error!(error = %e, "internal server error");
                json!({ "detail": "An unexpected error occurred." })
            }
        };

        (status, Json(body)).into_response()
    }
}
