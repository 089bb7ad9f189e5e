pub mod project;
pub mod user;

pub use project::{Category, NewProject, Project, ProjectInput, ProjectPatch};
pub use user::User;
