use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{ProjectStore, StoreError, TaskStore, UserStore};
use crate::models::{Project, Task, TaskInput, TaskQuery, User, UserProfile};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    tasks: HashMap<Uuid, Task>,
}

/// In-process store used by the test suites and when no `DATABASE_URL` is
/// configured. Data lives as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.users.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned().map(UserProfile::from))
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict);
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn insert(&self, project: &Project) -> Result<(), StoreError> {
        self.write()?.projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Project>, StoreError> {
        let mut projects: Vec<Project> = self
            .read()?
            .projects
            .values()
            .filter(|project| project.owner_id == owner_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(self.read()?.projects.get(&id).cloned())
    }

    async fn rename(&self, id: Uuid, name: &str) -> Result<Option<Project>, StoreError> {
        let mut tables = self.write()?;
        Ok(tables.projects.get_mut(&id).map(|project| {
            project.name = name.to_string();
            project.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        let existed = tables.projects.remove(&id).is_some();
        if existed {
            tables.tasks.retain(|_, task| task.project_id != id);
        }
        Ok(existed)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, task: &Task) -> Result<(), StoreError> {
        self.write()?.tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn list(&self, query: &TaskQuery) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self
            .read()?
            .tasks
            .values()
            .filter(|task| task.matches(query))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, input: &TaskInput) -> Result<Option<Task>, StoreError> {
        let mut tables = self.write()?;
        Ok(tables.tasks.get_mut(&id).map(|task| {
            task.apply(input.clone());
            task.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.write()?.tasks.remove(&id).is_some())
    }
}
