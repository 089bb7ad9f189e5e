use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::project::{NewProject, Project, ProjectPatch, ProjectRow};
use crate::database::store::{ProjectStore, StoreError};

const PROJECT_COLUMNS: &str = "id, title, description, image, link, category, technologies, featured, created_at, updated_at";

/// Postgres-backed project collection
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `projects` table if it does not exist yet.
    /// `seq` keeps insertion order stable when two rows share a timestamp.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id           UUID PRIMARY KEY,
                seq          BIGSERIAL NOT NULL,
                title        TEXT NOT NULL CHECK (title <> ''),
                description  TEXT NOT NULL,
                image        TEXT NOT NULL,
                link         TEXT NOT NULL,
                category     TEXT NOT NULL DEFAULT 'Web Development',
                technologies TEXT[] NOT NULL DEFAULT '{}',
                featured     BOOLEAN NOT NULL DEFAULT FALSE,
                created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at   TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS projects_created_idx ON projects (created_at DESC, seq DESC)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Every stored image reference, used to find orphaned uploads
    pub async fn image_refs(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT image FROM projects")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(image,)| image).collect())
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn list(&self) -> Result<Vec<Project>, StoreError> {
        let sql = format!(
            "SELECT {} FROM projects ORDER BY created_at DESC, seq DESC",
            PROJECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn create(&self, project: NewProject) -> Result<Project, StoreError> {
        let sql = format!(
            "INSERT INTO projects (id, title, description, image, link, category, technologies, featured)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            PROJECT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&project.title)
            .bind(&project.description)
            .bind(&project.image)
            .bind(&project.link)
            .bind(project.category.as_str())
            .bind(&project.technologies)
            .bind(project.featured)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("Created project {} ({})", row.id, row.title);
        Ok(row.into())
    }

    async fn update(&self, id: Uuid, patch: ProjectPatch) -> Result<Project, StoreError> {
        let sql = format!(
            "UPDATE projects SET
                title        = COALESCE($2, title),
                description  = COALESCE($3, description),
                image        = COALESCE($4, image),
                link         = COALESCE($5, link),
                category     = COALESCE($6, category),
                technologies = COALESCE($7, technologies),
                featured     = COALESCE($8, featured),
                updated_at   = now()
             WHERE id = $1
             RETURNING {}",
            PROJECT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.image)
            .bind(patch.link)
            .bind(patch.category.map(|c| c.as_str()))
            .bind(patch.technologies)
            .bind(patch.featured)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tracing::info!("Deleted project {}", id);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
