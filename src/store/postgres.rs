use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ProjectStore, StoreError, TaskStore, UserStore};
use crate::models::{Project, Task, TaskInput, TaskQuery, User, UserProfile};

const TASK_COLUMNS: &str =
    "id, project_id, title, description, priority, status, due_date, created_at, updated_at";

/// Postgres-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and applies the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {}", e)))?;
        Ok(Self::new(pool))
    }
}

/// ILIKE pattern matching `search` literally anywhere in the column.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, name, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id, email, name, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn insert(&self, project: &Project) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO projects (id, name, owner_id, created_at) VALUES ($1, $2, $3, $4)")
            .bind(project.id)
            .bind(&project.name)
            .bind(project.owner_id)
            .bind(project.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Project>, StoreError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, name, owner_id, created_at FROM projects WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT id, name, owner_id, created_at FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    async fn rename(&self, id: Uuid, name: &str) -> Result<Option<Project>, StoreError> {
        let project = sqlx::query_as::<_, Project>(
            "UPDATE projects SET name = $1 WHERE id = $2 RETURNING id, name, owner_id, created_at",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        // tasks go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert(&self, task: &Task) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO tasks (id, project_id, title, description, priority, status, due_date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(task.id)
        .bind(task.project_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self, query: &TaskQuery) -> Result<Vec<Task>, StoreError> {
        // Conditions for status, priority and search are appended in bind order.
        let mut sql = format!("SELECT {} FROM tasks WHERE project_id = $1", TASK_COLUMNS);
        let mut param_count = 2;

        if query.status.is_some() {
            sql.push_str(&format!(" AND status = ${}", param_count));
            param_count += 1;
        }
        if query.priority.is_some() {
            sql.push_str(&format!(" AND priority = ${}", param_count));
            param_count += 1;
        }
        if query.search.is_some() {
            sql.push_str(&format!(
                r" AND (title ILIKE ${0} ESCAPE '\' OR description ILIKE ${0} ESCAPE '\')",
                param_count
            ));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(query.project_id);
        if let Some(status) = query.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(priority) = query.priority {
            query_builder = query_builder.bind(priority);
        }
        if let Some(search) = &query.search {
            query_builder = query_builder.bind(contains_pattern(search));
        }

        Ok(query_builder.fetch_all(&self.pool).await?)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update(&self, id: Uuid, input: &TaskInput) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = $1, description = $2, priority = $3, status = $4, due_date = $5, updated_at = NOW()
             WHERE id = $6
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.priority)
        .bind(input.status)
        .bind(input.due_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
