use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored user account.
///
/// The bcrypt hash travels with the record inside the service but is never
/// serialized; anything leaving the process goes through [`UserProfile`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds a new account record with a fresh id. `email` is expected to be
    /// normalized already.
    pub fn new(id: Uuid, email: String, password_hash: String, name: Option<String>) -> Self {
        Self {
            id,
            email,
            password_hash,
            name,
            created_at: Utc::now(),
        }
    }
}

/// The sanitized view of a user returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}
