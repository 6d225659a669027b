#![allow(dead_code)]

use actix_cors::Cors;
use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, App};
use serde_json::{json, Value};
use taskdeck::config::Config;
use taskdeck::AppState;

pub fn test_config() -> Config {
    Config::from_lookup(|name| match name {
        "JWT_SECRET" => Some("integration-test-secret".to_string()),
        // minimum bcrypt cost keeps the suite fast
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("test configuration")
}

pub fn test_state() -> AppState {
    AppState::in_memory(&test_config()).expect("in-memory state")
}

pub async fn init_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(move |cfg| state.configure(cfg)),
    )
    .await
}

/// Sends `req` and returns the status with the body parsed as JSON
/// (`Value::Null` for an empty body).
pub async fn send<S, B>(app: &S, req: Request) -> (actix_web::http::StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            panic!(
                "response body is not JSON: {:?}",
                String::from_utf8_lossy(&body)
            )
        })
    };
    (status, json)
}

/// Registers a user and returns the issued token.
pub async fn register<S, B>(app: &S, email: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, 201, "registration failed: {}", body);
    body["token"]
        .as_str()
        .expect("token in registration response")
        .to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
