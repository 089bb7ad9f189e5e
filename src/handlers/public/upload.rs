use axum::extract::{
    multipart::{Field, MultipartError, MultipartRejection},
    Multipart, State,
};
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::{UploadError, UploadFile, UploadHandler};
use crate::state::AppState;

const FILE_FIELD: &str = "image";

fn multipart_error(err: MultipartError) -> UploadError {
    UploadError::Multipart(err.to_string())
}

/// Read one file field, refusing it as soon as the running total passes the limit.
async fn read_limited(mut field: Field<'_>, uploads: &UploadHandler) -> Result<UploadFile, UploadError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    // Reject on the declared type before touching the body
    uploads.check_type(&content_type)?;

    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        uploads.check_size(bytes.len() + chunk.len())?;
        bytes.extend_from_slice(&chunk);
    }

    Ok(UploadFile {
        file_name,
        content_type,
        bytes,
    })
}

/// POST /api/upload - Store a project image
///
/// Expects `multipart/form-data` with the file in the `image` field. Other
/// fields are ignored.
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "message": "File uploaded successfully",
///   "filename": "project-1700000000000-123456.png",
///   "url": "/uploads/project-1700000000000-123456.png",
///   "originalName": "screenshot.png",
///   "size": 1048576
/// }
/// ```
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let mut multipart =
        multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(FILE_FIELD) && file.is_none() {
            file = Some(read_limited(field, &state.uploads).await?);
        }
    }

    let file = file.ok_or(UploadError::MissingFile)?;
    let asset = state.uploads.upload(file).await?;

    Ok(Json(json!({
        "success": true,
        "message": "File uploaded successfully",
        "filename": asset.filename,
        "url": asset.url,
        "originalName": asset.original_name,
        "size": asset.size,
    })))
}
