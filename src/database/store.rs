use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::project::{NewProject, Project, ProjectPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Project not found")]
    NotFound,

    #[error("Validation failed: {0:?}")]
    Validation(BTreeMap<String, String>),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Document collection holding portfolio projects.
///
/// Each call is a single-document operation; backends give no ordering
/// guarantee between concurrent writers (last write wins).
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// All projects, newest first.
    async fn list(&self) -> Result<Vec<Project>, StoreError>;

    async fn create(&self, project: NewProject) -> Result<Project, StoreError>;

    async fn update(&self, id: Uuid, patch: ProjectPatch) -> Result<Project, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and `/health`
    fn backend(&self) -> &'static str;
}
