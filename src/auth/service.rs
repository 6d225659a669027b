//! Registration, login and authenticated-fetch orchestration.
//!
//! Each operation is a short linear sequence over the credential store, the
//! password hasher and the token issuer/verifier. Nothing here knows about
//! HTTP; handlers translate [`AuthError`] into responses.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use uuid::Uuid;

use super::password::PasswordHasher;
use super::token::{TokenIssuer, TokenVerifier};
use super::AuthError;
use crate::models::{User, UserProfile};
use crate::store::{StoreError, UserStore};

/// Input to [`AuthService::register`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Plaintext behind the hash an unknown-email login is checked against.
const DUMMY_PASSWORD: &str = "taskdeck-no-such-user";

pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    token_ttl: Duration,
    /// Hashed at the configured cost on first use, so an unknown email costs
    /// the same bcrypt work as a wrong password.
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
        verifier: TokenVerifier,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            hasher,
            issuer,
            verifier,
            token_ttl,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Creates an account and returns a token for it.
    ///
    /// The token is signed before the user row is written, so a failed
    /// signature never leaves behind an account nobody received a token for.
    pub async fn register(&self, registration: Registration) -> Result<String, AuthError> {
        let email = normalize_email(&registration.email);
        validate_email(&email)?;
        if registration.password.is_empty() {
            return Err(AuthError::Validation {
                field: "password",
                message: "password is required",
            });
        }

        if self.users.find_by_email(&email).await?.is_some() {
            log::info!("registration rejected: email already registered");
            return Err(AuthError::DuplicateUser);
        }

        let password_hash = self.hash_password(registration.password).await?;
        let name = registration
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let user = User::new(Uuid::new_v4(), email, password_hash, name);
        let token = self.issuer.issue(user.id, self.token_ttl)?;

        match self.users.insert(&user).await {
            Ok(()) => {
                log::info!("registered user {}", user.id);
                Ok(token)
            }
            // lost a race with a concurrent registration of the same email
            Err(StoreError::Conflict) => Err(AuthError::DuplicateUser),
            Err(e) => Err(e.into()),
        }
    }

    /// Checks credentials and returns a fresh token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email);
        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                let dummy = self
                    .dummy_hash
                    .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD.to_string()))
                    .await?
                    .clone();
                self.verify_password(password.to_string(), dummy).await?;
                log::info!("login rejected: unknown email");
                return Err(AuthError::UserNotFound);
            }
        };

        if !self.verify_password(password.to_string(), user.password_hash).await? {
            log::info!("login rejected for user {}: wrong password", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issuer.issue(user.id, self.token_ttl)?;
        log::info!("user {} logged in", user.id);
        Ok(token)
    }

    /// Resolves a bearer token to the sanitized profile of its subject.
    pub async fn authenticated_fetch(&self, token: &str) -> Result<UserProfile, AuthError> {
        let user_id = self.verifier.verify(token)?;
        self.current_user(user_id).await
    }

    /// Loads the profile of an already verified subject. The subject may have
    /// been removed after the token was issued.
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserProfile, AuthError> {
        self.users
            .find_profile(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(format!("hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hashed: String) -> Result<bool, AuthError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hashed))
            .await
            .map_err(|e| AuthError::Hashing(format!("verification task failed: {}", e)))
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Err(AuthError::Validation {
            field: "email",
            message: "email is required",
        });
    }
    if !validator::validate_email(email) {
        return Err(AuthError::Validation {
            field: "email",
            message: "email is not valid",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::tests::ManualClock;
    use crate::auth::token::TokenSecret;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    const TTL: Duration = Duration::from_secs(3600);

    fn service_with(store: Arc<MemoryStore>) -> (AuthService, Arc<ManualClock>) {
        let clock = ManualClock::starting_at(Utc::now());
        let secret = TokenSecret::new("service-test-secret").unwrap();
        let service = AuthService::new(
            store,
            PasswordHasher::with_cost(4),
            TokenIssuer::new(secret.clone(), clock.clone()),
            TokenVerifier::new(secret, clock.clone()),
            TTL,
        );
        (service, clock)
    }

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: password.to_string(),
            name: None,
        }
    }

    #[actix_rt::test]
    async fn test_register_then_login() {
        let (service, _) = service_with(Arc::new(MemoryStore::new()));

        let t1 = service.register(registration("a@x.com", "secret1")).await.unwrap();
        let t2 = service.login("a@x.com", "secret1").await.unwrap();

        let id1 = service.verifier().verify(&t1).unwrap();
        let id2 = service.verifier().verify(&t2).unwrap();
        assert_eq!(id1, id2);

        let profile = service.authenticated_fetch(&t1).await.unwrap();
        assert_eq!(profile.id, id1);
        assert_eq!(profile.email, "a@x.com");

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[actix_rt::test]
    async fn test_email_is_normalized() {
        let (service, _) = service_with(Arc::new(MemoryStore::new()));

        let token = service
            .register(registration("  Mixed@Case.COM ", "secret1"))
            .await
            .unwrap();
        assert!(service.login("mixed@case.com", "secret1").await.is_ok());
        assert_eq!(
            service.authenticated_fetch(&token).await.unwrap().email,
            "mixed@case.com"
        );
    }

    #[actix_rt::test]
    async fn test_duplicate_registration_performs_no_write() {
        let store = Arc::new(MemoryStore::new());
        let (service, _) = service_with(store.clone());

        service.register(registration("a@x.com", "secret1")).await.unwrap();
        let err = service
            .register(registration("A@X.com", "other-password"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::DuplicateUser));
        assert_eq!(store.user_count().unwrap(), 1);
        // the first password still works, the second was never stored
        assert!(service.login("a@x.com", "secret1").await.is_ok());
        assert!(matches!(
            service.login("a@x.com", "other-password").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[actix_rt::test]
    async fn test_login_failures() {
        let (service, _) = service_with(Arc::new(MemoryStore::new()));
        service.register(registration("a@x.com", "secret1")).await.unwrap();

        assert!(matches!(
            service.login("nobody@x.com", "secret1").await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            service.login("a@x.com", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[actix_rt::test]
    async fn test_unknown_email_pays_for_a_hash_check() {
        let (service, _) = service_with(Arc::new(MemoryStore::new()));
        assert!(service.dummy_hash.get().is_none());

        for _ in 0..2 {
            assert!(matches!(
                service.login("nobody@x.com", "secret1").await,
                Err(AuthError::UserNotFound)
            ));
        }

        let dummy = service.dummy_hash.get().expect("dummy hash after unknown login");
        assert!(dummy.starts_with("$2b$04$"));
        assert!(service.hasher.verify(DUMMY_PASSWORD, dummy));
    }

    /// A store whose email lookup always misses and whose insert fails, as
    /// when a concurrent registration wins the unique constraint.
    struct FailingInsertStore {
        error: fn() -> StoreError,
    }

    #[async_trait]
    impl UserStore for FailingInsertStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            Ok(None)
        }

        async fn find_profile(&self, _id: Uuid) -> Result<Option<UserProfile>, StoreError> {
            Ok(None)
        }

        async fn insert(&self, _user: &User) -> Result<(), StoreError> {
            Err((self.error)())
        }
    }

    fn service_over(users: Arc<dyn UserStore>) -> AuthService {
        let clock = ManualClock::starting_at(Utc::now());
        let secret = TokenSecret::new("service-test-secret").unwrap();
        AuthService::new(
            users,
            PasswordHasher::with_cost(4),
            TokenIssuer::new(secret.clone(), clock.clone()),
            TokenVerifier::new(secret, clock),
            TTL,
        )
    }

    #[actix_rt::test]
    async fn test_lost_registration_race_is_a_duplicate() {
        let service = service_over(Arc::new(FailingInsertStore {
            error: || StoreError::Conflict,
        }));

        let err = service
            .register(registration("race@x.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser));
        assert!(!err.is_internal());
    }

    #[actix_rt::test]
    async fn test_store_failure_on_insert_is_internal() {
        let service = service_over(Arc::new(FailingInsertStore {
            error: || StoreError::Backend("connection reset".into()),
        }));

        let err = service
            .register(registration("a@x.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Store(StoreError::Backend(_))));
        assert!(err.is_internal());
    }

    #[actix_rt::test]
    async fn test_register_validation() {
        let store = Arc::new(MemoryStore::new());
        let (service, _) = service_with(store.clone());

        for (email, password, field) in [
            ("", "secret1", "email"),
            ("not-an-email", "secret1", "email"),
            ("a@x.com", "", "password"),
        ] {
            match service.register(registration(email, password)).await {
                Err(AuthError::Validation { field: got, .. }) => assert_eq!(got, field),
                other => panic!("expected validation error for {:?}, got {:?}", email, other),
            }
        }
        assert_eq!(store.user_count().unwrap(), 0);
    }

    #[actix_rt::test]
    async fn test_fetch_rejects_expired_token() {
        let (service, clock) = service_with(Arc::new(MemoryStore::new()));
        let token = service.register(registration("a@x.com", "secret1")).await.unwrap();

        clock.set(Utc::now() + chrono::Duration::seconds(TTL.as_secs() as i64 + 1));
        assert!(matches!(
            service.authenticated_fetch(&token).await,
            Err(AuthError::ExpiredToken)
        ));
    }

    #[actix_rt::test]
    async fn test_fetch_for_unknown_subject() {
        let (service, _) = service_with(Arc::new(MemoryStore::new()));
        let (other, _) = service_with(Arc::new(MemoryStore::new()));

        // same secret, but the user only exists in the other store
        let token = other.register(registration("a@x.com", "secret1")).await.unwrap();
        assert!(matches!(
            service.authenticated_fetch(&token).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[actix_rt::test]
    async fn test_display_name_is_kept() {
        let (service, _) = service_with(Arc::new(MemoryStore::new()));
        let token = service
            .register(Registration {
                name: Some(" Ada ".to_string()),
                ..registration("ada@x.com", "secret1")
            })
            .await
            .unwrap();

        let profile = service.authenticated_fetch(&token).await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Ada"));
    }
}
