pub mod project;
pub mod task;
pub mod user;

pub use project::{Project, ProjectInput};
pub use task::{NewTaskRequest, Task, TaskInput, TaskPriority, TaskQuery, TaskStatus};
pub use user::{User, UserProfile};
