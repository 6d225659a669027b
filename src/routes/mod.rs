pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

use actix_web::web;

/// Routes mounted under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/users").service(users::register))
        .service(
            web::scope("/auth")
                .service(auth::login)
                .service(auth::authenticated_user),
        )
        .service(
            web::scope("/projects")
                .service(projects::get_projects)
                .service(projects::create_project)
                .service(projects::update_project)
                .service(projects::delete_project),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
