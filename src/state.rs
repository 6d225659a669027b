//! Wiring of stores and services into actix-web application data.

use std::sync::Arc;

use actix_web::{web, HttpRequest};
use mockable::DefaultClock;

use crate::auth::{
    AuthError, AuthService, PasswordHasher, SharedClock, TokenIssuer, TokenSecret, TokenVerifier,
};
use crate::config::Config;
use crate::error::AppError;
use crate::routes;
use crate::store::{MemoryStore, PgStore, ProjectStore, StoreError, TaskStore, UserStore};

/// Everything the handlers need, shared across workers.
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthService>,
    pub verifier: web::Data<TokenVerifier>,
    pub projects: web::Data<dyn ProjectStore>,
    pub tasks: web::Data<dyn TaskStore>,
}

impl AppState {
    /// Builds the state over explicit stores.
    ///
    /// Fails if the signing secret is unusable, so a misconfigured process
    /// stops before it binds a socket.
    pub fn new(
        config: &Config,
        clock: SharedClock,
        users: Arc<dyn UserStore>,
        projects: Arc<dyn ProjectStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Result<Self, AuthError> {
        let secret = TokenSecret::new(&config.jwt_secret)?;
        let verifier = TokenVerifier::new(secret.clone(), clock.clone());
        let auth = AuthService::new(
            users,
            PasswordHasher::with_cost(config.bcrypt_cost),
            TokenIssuer::new(secret, clock),
            verifier.clone(),
            config.token_ttl,
        );

        Ok(Self {
            auth: web::Data::new(auth),
            verifier: web::Data::new(verifier),
            projects: web::Data::from(projects),
            tasks: web::Data::from(tasks),
        })
    }

    /// State backed by a single in-memory store.
    pub fn in_memory(config: &Config) -> Result<Self, AuthError> {
        let store = Arc::new(MemoryStore::new());
        Self::new(
            config,
            Arc::new(DefaultClock),
            store.clone(),
            store.clone(),
            store,
        )
    }

    /// State backed by Postgres, running migrations first.
    pub async fn postgres(config: &Config, database_url: &str) -> Result<Self, StateError> {
        let store = Arc::new(PgStore::connect(database_url).await?);
        Ok(Self::new(
            config,
            Arc::new(DefaultClock),
            store.clone(),
            store.clone(),
            store,
        )?)
    }

    /// Registers app data, extractor configuration and every route.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone())
            .app_data(self.verifier.clone())
            .app_data(self.projects.clone())
            .app_data(self.tasks.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
                AppError::BadRequest(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
                AppError::BadRequest(err.to_string()).into()
            }))
            // an id that does not parse cannot name an existing resource
            .app_data(web::PathConfig::default().error_handler(|err, _req: &HttpRequest| {
                log::debug!("rejected path parameter: {}", err);
                AppError::NotFound("Resource not found".into()).into()
            }))
            .service(routes::health::health)
            .service(web::scope("/api").configure(routes::config));
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}
