//! Persistence ports for users, projects and tasks.
//!
//! Handlers and the auth service only see these traits. `postgres::PgStore`
//! is the production adapter; `memory::MemoryStore` backs tests and local runs
//! without a database.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Project, Task, TaskInput, TaskQuery, User, UserProfile};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by store adapters.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated")]
    Conflict,
    /// Connection or query failure in the backing store.
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
            _ => StoreError::Backend(error.to_string()),
        }
    }
}

/// Credential store. Emails are stored and looked up already normalized.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Full record including the password hash, for login and duplicate checks.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Sanitized record; the password hash is never loaded.
    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError>;

    /// Inserts a new user. Fails with [`StoreError::Conflict`] when the email
    /// is already taken.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert(&self, project: &Project) -> Result<(), StoreError>;

    /// Projects owned by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Project>, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Project>, StoreError>;

    async fn rename(&self, id: Uuid, name: &str) -> Result<Option<Project>, StoreError>;

    /// Deletes the project and all of its tasks. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: &Task) -> Result<(), StoreError>;

    /// Tasks matching `query`, newest first.
    async fn list(&self, query: &TaskQuery) -> Result<Vec<Task>, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    async fn update(&self, id: Uuid, input: &TaskInput) -> Result<Option<Task>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
