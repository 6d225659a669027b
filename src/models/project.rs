use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A named container of tasks owned by the user who created it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// The creator. Only the owner may see, rename or delete the project.
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating or renaming a project.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProjectInput {
    #[validate(length(min = 1, max = 100, message = "Project name is required"))]
    pub name: String,
}

impl Project {
    pub fn new(input: ProjectInput, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            owner_id,
            created_at: Utc::now(),
        }
    }
}
