use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::project::{Project, ProjectInput};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Path ids that are not UUIDs cannot name a stored project.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Project not found"))
}

/// POST /api/projects - Create a project
///
/// Expected Input:
/// ```json
/// {
///   "title": "string", "description": "string", "image": "string", "link": "string",
///   "category": "Web Development", "technologies": ["string"], "featured": false
/// }
/// ```
///
/// `title`, `description`, `image` and `link` are required; the rest default.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let Json(input) = payload?;
    let project = state.projects.create(input.into_new_project()?).await?;

    tracing::info!("{} created project {} '{}'", user.email, project.id, project.title);
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/:id - Partial update; absent fields keep their values
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> Result<Json<Project>, ApiError> {
    let id = parse_id(&id)?;
    let Json(input) = payload?;
    let project = state.projects.update(id, input.into_patch()?).await?;

    tracing::info!("{} updated project {}", user.email, project.id);
    Ok(Json(project))
}

/// DELETE /api/projects/:id
///
/// The project's image file is left in the upload directory.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    state.projects.delete(id).await?;

    tracing::info!("{} deleted project {}", user.email, id);
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}
