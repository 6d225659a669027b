use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

use super::TokenVerifier;
use crate::error::AppError;

/// Legacy header some clients send the raw token in.
pub const TOKEN_HEADER: &str = "x-auth-token";

/// The verified identity behind a request's bearer token.
///
/// Taking this as a handler parameter is what makes a route protected: the
/// token is read from `Authorization: Bearer <token>` (or `x-auth-token`),
/// checked by the `TokenVerifier` registered as app data, and the subject id
/// is handed to the handler. A request without a valid token never reaches
/// the handler body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(AuthenticatedUser).map_err(Into::into))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Uuid, AppError> {
    let verifier = req
        .app_data::<web::Data<TokenVerifier>>()
        .ok_or_else(|| AppError::InternalServerError("TokenVerifier is not registered".into()))?;
    let token = bearer_token(req)
        .ok_or_else(|| AppError::Unauthorized("No token, permission denied".into()))?;
    Ok(verifier.verify(token)?)
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let headers = req.headers();
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_credentials)
        .or_else(|| {
            headers
                .get(TOKEN_HEADER)
                .and_then(|value| value.to_str().ok())
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Credentials of an `Authorization` value using the Bearer scheme. The
/// scheme name is case-insensitive.
fn bearer_credentials(value: &str) -> Option<&str> {
    let (scheme, credentials) = value.trim_start().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then_some(credentials)
}
