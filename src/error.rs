//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the error type every HTTP handler returns.
//! It implements `actix_web::error::ResponseError`, so handlers can use `?`
//! and have failures rendered as JSON:
//!
//! - client errors carry `{"msg": "..."}`,
//! - request validation failures carry `{"errores": [{"param", "msg"}]}`,
//! - server errors are logged and answered with a generic message; their
//!   details never reach the client.
//!
//! `From` implementations cover `AuthError`, `StoreError` and
//! `validator::ValidationErrors`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Body text of every 5xx response.
pub const GENERIC_FAILURE: &str = "There was an error";

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub param: String,
    pub msg: String,
}

/// Represents all possible errors a handler can return.
#[derive(Debug)]
pub enum AppError {
    /// Missing or unusable credentials (HTTP 401).
    Unauthorized(String),
    /// Malformed request or business-rule rejection (HTTP 400).
    BadRequest(String),
    /// The resource does not exist or belongs to someone else (HTTP 404).
    NotFound(String),
    /// Unexpected server-side failure (HTTP 500). The message is logged only.
    InternalServerError(String),
    /// Store failure (HTTP 500). The message is logged only.
    DatabaseError(String),
    /// Request fields failed validation (HTTP 400).
    ValidationError(Vec<FieldViolation>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(violations) => {
                let fields: Vec<&str> = violations.iter().map(|v| v.param.as_str()).collect();
                write!(f, "Validation Error: {}", fields.join(", "))
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            AppError::Unauthorized(msg) | AppError::BadRequest(msg) | AppError::NotFound(msg) => {
                response.json(json!({ "msg": msg }))
            }
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                log::error!("{}", msg);
                response.json(json!({ "msg": GENERIC_FAILURE }))
            }
            AppError::ValidationError(violations) => response.json(json!({ "errores": violations })),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::Validation { field, message } => {
                AppError::ValidationError(vec![FieldViolation {
                    param: field.to_string(),
                    msg: message.to_string(),
                }])
            }
            AuthError::DuplicateUser => AppError::BadRequest("User already exists".into()),
            AuthError::UserNotFound => AppError::NotFound("User not found".into()),
            AuthError::InvalidCredentials => AppError::BadRequest("Invalid credentials".into()),
            AuthError::InvalidToken => AppError::Unauthorized("Token is not valid".into()),
            AuthError::ExpiredToken => AppError::Unauthorized("Token has expired".into()),
            AuthError::MalformedToken => AppError::Unauthorized("Token is malformed".into()),
            AuthError::Store(e) => e.into(),
            AuthError::Signing(_) | AuthError::Hashing(_) => {
                AppError::InternalServerError(error.to_string())
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// The detailed per-field messages are preserved, sorted by field name.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldViolation {
                    param: field.to_string(),
                    msg: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string()),
                })
            })
            .collect();
        violations.sort_by(|a, b| a.param.cmp(&b.param));
        AppError::ValidationError(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(error: AppError) -> serde_json::Value {
        let bytes = to_bytes(error.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_responses() {
        assert_eq!(
            AppError::Unauthorized("Invalid token".into()).error_response().status(),
            401
        );
        assert_eq!(
            AppError::BadRequest("Invalid input".into()).error_response().status(),
            400
        );
        assert_eq!(
            AppError::NotFound("Resource not found".into()).error_response().status(),
            404
        );
        assert_eq!(
            AppError::InternalServerError("Server error".into()).error_response().status(),
            500
        );
        assert_eq!(AppError::ValidationError(vec![]).error_response().status(), 400);
    }

    #[actix_rt::test]
    async fn test_server_errors_do_not_leak_details() {
        let body = body_json(AppError::DatabaseError("password_hash column missing".into())).await;
        assert_eq!(body, json!({ "msg": GENERIC_FAILURE }));

        let body = body_json(AuthError::Hashing("bcrypt exploded".into()).into()).await;
        assert_eq!(body, json!({ "msg": GENERIC_FAILURE }));
    }

    #[actix_rt::test]
    async fn test_validation_errors_are_listed() {
        let error: AppError = AuthError::Validation {
            field: "email",
            message: "email is not valid",
        }
        .into();
        let body = body_json(error).await;
        assert_eq!(
            body,
            json!({ "errores": [{ "param": "email", "msg": "email is not valid" }] })
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        let status = |e: AuthError| AppError::from(e).error_response().status();
        assert_eq!(status(AuthError::DuplicateUser), 400);
        assert_eq!(status(AuthError::InvalidCredentials), 400);
        assert_eq!(status(AuthError::InvalidToken), 401);
        assert_eq!(status(AuthError::ExpiredToken), 401);
        assert_eq!(status(AuthError::MalformedToken), 401);
        assert_eq!(status(AuthError::UserNotFound), 404);
        assert_eq!(status(AuthError::Store(StoreError::Conflict)), 500);
    }
}
