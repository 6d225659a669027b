use crate::{
    auth::{AuthError, AuthResponse, AuthService, AuthenticatedUser, LoginRequest},
    error::AppError,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Message for every rejected login. Unknown email and wrong password are
/// indistinguishable to the client.
pub const INVALID_LOGIN: &str = "Invalid email or password";

/// Login user
///
/// Authenticates a user and returns an authentication token.
#[post("")]
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let token = auth
        .login(&login_data.email, &login_data.password)
        .await
        .map_err(|e| match e {
            AuthError::UserNotFound | AuthError::InvalidCredentials => {
                AppError::BadRequest(INVALID_LOGIN.into())
            }
            other => other.into(),
        })?;

    Ok(HttpResponse::Ok().json(AuthResponse { token }))
}

/// Current user
///
/// Returns the profile of the user the bearer token was issued to. The
/// password hash is never part of the response.
#[get("")]
pub async fn authenticated_user(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let usuario = auth.current_user(user.id()).await?;
    Ok(HttpResponse::Ok().json(json!({ "usuario": usuario })))
}
