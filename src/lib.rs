#![doc = "The `taskdeck` library crate."]
#![doc = ""]
#![doc = "Authentication (bcrypt password hashing, signed JWT issuance and verification),"]
#![doc = "persistence ports for users, projects and tasks, the HTTP routes and the"]
#![doc = "error type they share. The binary (`main.rs`) reads the configuration,"]
#![doc = "builds an `AppState` and serves it."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
