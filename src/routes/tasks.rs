use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{NewTaskRequest, Task, TaskInput, TaskQuery},
    routes::projects::owned_project,
    store::{ProjectStore, TaskStore},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Loads a task whose project the caller owns.
async fn owned_task(
    projects: &dyn ProjectStore,
    tasks: &dyn TaskStore,
    task_id: Uuid,
    user: AuthenticatedUser,
) -> Result<Task, AppError> {
    let task = tasks
        .find(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    match owned_project(projects, task.project_id, user).await {
        Ok(_) => Ok(task),
        Err(AppError::NotFound(_)) => Err(AppError::NotFound("Task not found".into())),
        Err(e) => Err(e),
    }
}

/// Retrieves the tasks of one of the authenticated user's projects.
///
/// ## Query Parameters:
/// - `project_id` (required): the project to list.
/// - `status` (optional): e.g. "todo", "in_progress", "done".
/// - `priority` (optional): e.g. "low", "medium", "high".
/// - `search` (optional): case-insensitive match on title and description.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects, newest first.
/// - `400 Bad Request`: missing or malformed `project_id`.
/// - `401 Unauthorized`: no valid token.
/// - `404 Not Found`: the project does not exist or is not owned by the caller.
#[get("")]
pub async fn get_tasks(
    projects: web::Data<dyn ProjectStore>,
    tasks: web::Data<dyn TaskStore>,
    query_params: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    owned_project(projects.get_ref(), query_params.project_id, user).await?;

    let list = tasks.list(&query_params).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Creates a task in one of the authenticated user's projects.
///
/// ## Request Body:
/// - `project_id`: the owning project (required).
/// - `title`: required, at most 200 characters.
/// - `description`, `priority`, `due_date` (optional).
/// - `status` (optional): defaults to "todo".
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: malformed body or failed validation.
/// - `404 Not Found`: the project does not exist or is not owned by the caller.
#[post("")]
pub async fn create_task(
    projects: web::Data<dyn ProjectStore>,
    tasks: web::Data<dyn TaskStore>,
    task_data: web::Json<NewTaskRequest>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let NewTaskRequest { project_id, task } = task_data.into_inner();
    task.validate()?;

    let project = owned_project(projects.get_ref(), project_id, user).await?;
    let task = Task::new(task, project.id);
    tasks.insert(&task).await?;

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
#[get("/{id}")]
pub async fn get_task(
    projects: web::Data<dyn ProjectStore>,
    tasks: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = owned_task(projects.get_ref(), tasks.get_ref(), task_id.into_inner(), user).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates an existing task. Every editable field is replaced.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: failed validation.
/// - `404 Not Found`: no such task, or its project is not owned by the caller.
#[put("/{id}")]
pub async fn update_task(
    projects: web::Data<dyn ProjectStore>,
    tasks: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = owned_task(projects.get_ref(), tasks.get_ref(), task_id.into_inner(), user).await?;

    let updated = tasks
        .update(task.id, &task_data)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task by its ID.
#[delete("/{id}")]
pub async fn delete_task(
    projects: web::Data<dyn ProjectStore>,
    tasks: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = owned_task(projects.get_ref(), tasks.get_ref(), task_id.into_inner(), user).await?;

    if !tasks.delete(task.id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "msg": "Task deleted" })))
}
