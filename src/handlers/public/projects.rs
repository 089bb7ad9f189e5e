use axum::{extract::State, Json};

use crate::database::models::project::Project;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/projects - All projects, newest first
///
/// Expected Output:
/// ```json
/// [
///   {
///     "_id": "uuid", "title": "...", "description": "...", "image": "/uploads/...",
///     "link": "https://...", "category": "Web Development", "technologies": ["Rust"],
///     "featured": false, "createdAt": "...", "updatedAt": "..."
///   }
/// ]
/// ```
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state.projects.list().await?;
    Ok(Json(projects))
}
