use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::project::{NewProject, Project, ProjectPatch};
use crate::database::store::{ProjectStore, StoreError};

/// In-process project collection used for local development and tests.
///
/// Records are kept in insertion order, so listing newest-first is a reverse
/// walk even when two inserts share a timestamp.
#[derive(Default)]
pub struct MemoryProjectStore {
    projects: RwLock<Vec<Project>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn list(&self) -> Result<Vec<Project>, StoreError> {
        let projects = self.projects.read().await;
        Ok(projects.iter().rev().cloned().collect())
    }

    async fn create(&self, project: NewProject) -> Result<Project, StoreError> {
        let project = Project::from_new(project);
        self.projects.write().await.push(project.clone());
        Ok(project)
    }

    async fn update(&self, id: Uuid, patch: ProjectPatch) -> Result<Project, StoreError> {
        let mut projects = self.projects.write().await;
        let project = projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        project.apply(patch);
        Ok(project.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut projects = self.projects.write().await;
        let index = projects
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        projects.remove(index);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::project::Category;

    fn new_project(title: &str) -> NewProject {
        NewProject {
            title: title.to_string(),
            description: "A portfolio entry".to_string(),
            image: "/uploads/project-1-1.png".to_string(),
            link: "https://example.com".to_string(),
            category: Category::WebDevelopment,
            technologies: vec!["Rust".to_string()],
            featured: false,
        }
    }

    #[tokio::test]
    async fn create_then_list_contains_exactly_one_record() {
        let store = MemoryProjectStore::new();
        let created = store.create(new_project("Folio")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], created);
        assert_eq!(listed[0].title, "Folio");
        assert_eq!(listed[0].created_at, listed[0].updated_at);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryProjectStore::new();
        let first = store.create(new_project("first")).await.unwrap();
        let second = store.create(new_project("second")).await.unwrap();
        let third = store.create(new_project("third")).await.unwrap();

        let ids: Vec<Uuid> = store.list().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let store = MemoryProjectStore::new();
        let created = store.create(new_project("before")).await.unwrap();

        let patch = ProjectPatch {
            title: Some("after".to_string()),
            ..Default::default()
        };
        let updated = store.update(created.id, patch).await.unwrap();

        assert_eq!(updated.title, "after");
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.technologies, created.technologies);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(store.list().await.unwrap()[0], updated);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = MemoryProjectStore::new();
        let result = store.update(Uuid::new_v4(), ProjectPatch::default()).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let store = MemoryProjectStore::new();
        let created = store.create(new_project("doomed")).await.unwrap();

        store.delete(created.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(store.delete(created.id).await, Err(StoreError::NotFound)));
    }
}
