use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed and under review.
    Review,
    /// Task is completed.
    Done,
}

/// Editable fields of a task, used for both creation and updates.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200, message = "Task title is required"))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,

    /// Defaults to `todo` when omitted.
    #[serde(default)]
    pub status: TaskStatus,
}

/// Request body for `POST /api/tasks`: the project the task belongs to plus
/// its editable fields.
#[derive(Debug, Deserialize)]
pub struct NewTaskRequest {
    pub project_id: Uuid,
    #[serde(flatten)]
    pub task: TaskInput,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    /// The project this task belongs to. Ownership is inherited from it.
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for listing the tasks of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskQuery {
    /// The project to list. Required; the caller must own it.
    pub project_id: Uuid,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Case-insensitive match against title and description.
    pub search: Option<String>,
}

impl Task {
    /// Creates a new `Task` in `project_id` with a fresh UUID and both
    /// timestamps set to now.
    pub fn new(input: TaskInput, project_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: input.status,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the editable fields and bumps `updated_at`.
    pub fn apply(&mut self, input: TaskInput) {
        self.title = input.title;
        self.description = input.description;
        self.priority = input.priority;
        self.status = input.status;
        self.due_date = input.due_date;
        self.updated_at = Utc::now();
    }

    /// Whether this task passes the optional filters of `query`.
    pub fn matches(&self, query: &TaskQuery) -> bool {
        if self.project_id != query.project_id {
            return false;
        }
        if query.status.is_some_and(|status| status != self.status) {
            return false;
        }
        if query.priority.is_some() && query.priority != self.priority {
            return false;
        }
        match query.search.as_deref().map(str::to_lowercase) {
            Some(needle) => {
                self.title.to_lowercase().contains(&needle)
                    || self
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}
