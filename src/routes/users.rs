use crate::{
    auth::{AuthResponse, AuthService, RegisterRequest},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
///
/// ## Responses:
/// - `201 Created`: `{"token": "..."}`.
/// - `400 Bad Request`: invalid fields (`errores`) or an already registered email (`msg`).
/// - `500 Internal Server Error`: store or hashing failure.
#[post("")]
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let token = auth.register(register_data.into_inner().into()).await?;

    Ok(HttpResponse::Created().json(AuthResponse { token }))
}
