use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Project, ProjectInput},
    store::ProjectStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Loads a project the caller owns. Someone else's project is reported
/// exactly like a missing one.
pub(crate) async fn owned_project(
    projects: &dyn ProjectStore,
    project_id: Uuid,
    user: AuthenticatedUser,
) -> Result<Project, AppError> {
    match projects.find(project_id).await? {
        Some(project) if project.owner_id == user.id() => Ok(project),
        _ => Err(AppError::NotFound("Project not found".into())),
    }
}

fn trimmed(input: web::Json<ProjectInput>) -> Result<ProjectInput, AppError> {
    let mut input = input.into_inner();
    input.name = input.name.trim().to_string();
    input.validate()?;
    Ok(input)
}

/// Creates a project owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Project`.
/// - `400 Bad Request`: missing or empty `name`.
/// - `401 Unauthorized`: no valid token.
#[post("")]
pub async fn create_project(
    projects: web::Data<dyn ProjectStore>,
    input: web::Json<ProjectInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let project = Project::new(trimmed(input)?, user.id());
    projects.insert(&project).await?;
    log::info!("user {} created project {}", user.id(), project.id);

    Ok(HttpResponse::Created().json(project))
}

/// Lists the authenticated user's projects, newest first.
#[get("")]
pub async fn get_projects(
    projects: web::Data<dyn ProjectStore>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let list = projects.list_by_owner(user.id()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Renames a project.
///
/// ## Responses:
/// - `200 OK`: the updated `Project`.
/// - `404 Not Found`: no such project, or owned by another user.
#[put("/{id}")]
pub async fn update_project(
    projects: web::Data<dyn ProjectStore>,
    project_id: web::Path<Uuid>,
    input: web::Json<ProjectInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let input = trimmed(input)?;
    let project = owned_project(projects.get_ref(), project_id.into_inner(), user).await?;

    let renamed = projects
        .rename(project.id, &input.name)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    Ok(HttpResponse::Ok().json(renamed))
}

/// Deletes a project together with all of its tasks.
///
/// ## Responses:
/// - `200 OK`: `{"msg": "Project deleted"}`.
/// - `404 Not Found`: no such project, or owned by another user.
#[delete("/{id}")]
pub async fn delete_project(
    projects: web::Data<dyn ProjectStore>,
    project_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let project = owned_project(projects.get_ref(), project_id.into_inner(), user).await?;

    if !projects.delete(project.id).await? {
        return Err(AppError::NotFound("Project not found".into()));
    }
    log::info!("user {} deleted project {}", user.id(), project.id);

    Ok(HttpResponse::Ok().json(json!({ "msg": "Project deleted" })))
}
