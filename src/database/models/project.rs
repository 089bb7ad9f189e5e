use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::store::StoreError;

/// Portfolio entry as exposed over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    pub link: String,
    pub category: Category,
    pub technologies: Vec<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Build a fresh record; id and timestamps are store-assigned.
    pub fn from_new(new: NewProject) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            image: new.image,
            link: new.link,
            category: new.category,
            technologies: new.technologies,
            featured: new.featured,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite only the fields present in `patch`
    pub fn apply(&mut self, patch: ProjectPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
        if let Some(link) = patch.link {
            self.link = link;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(technologies) = patch.technologies {
            self.technologies = technologies;
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile App")]
    MobileApp,
    #[serde(rename = "UI/UX Design")]
    UiUxDesign,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::WebDevelopment,
        Category::MobileApp,
        Category::UiUxDesign,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::WebDevelopment => "Web Development",
            Category::MobileApp => "Mobile App",
            Category::UiUxDesign => "UI/UX Design",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                format!("Must be one of: {}", allowed.join(", "))
            })
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated fields for an insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub image: String,
    pub link: String,
    pub category: Category,
    pub technologies: Vec<String>,
    pub featured: bool,
}

/// Validated partial update; `None` leaves the stored value alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub category: Option<Category>,
    pub technologies: Option<Vec<String>>,
    pub featured: Option<bool>,
}

/// Raw request body for create and update. Unknown keys (`_id`, `createdAt`, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub category: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub featured: Option<bool>,
}

const REQUIRED: &str = "This field is required";

impl ProjectInput {
    pub fn into_new_project(self) -> Result<NewProject, StoreError> {
        let mut errors = BTreeMap::new();

        let mut required = |name: &str, value: Option<String>| -> String {
            match value.map(|v| v.trim().to_string()) {
                Some(v) if !v.is_empty() => v,
                _ => {
                    errors.insert(name.to_string(), REQUIRED.to_string());
                    String::new()
                }
            }
        };

        let title = required("title", self.title);
        let description = required("description", self.description);
        let image = required("image", self.image);
        let link = required("link", self.link);

        let category = match self.category.as_deref() {
            None | Some("") => Category::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                errors.insert("category".to_string(), e);
                Category::default()
            }),
        };

        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        Ok(NewProject {
            title,
            description,
            image,
            link,
            category,
            technologies: clean_technologies(self.technologies.unwrap_or_default()),
            featured: self.featured.unwrap_or(false),
        })
    }

    pub fn into_patch(self) -> Result<ProjectPatch, StoreError> {
        let mut errors = BTreeMap::new();

        let mut present = |name: &str, value: Option<String>| -> Option<String> {
            let value = value.map(|v| v.trim().to_string())?;
            if value.is_empty() {
                errors.insert(name.to_string(), "Cannot be empty".to_string());
                return None;
            }
            Some(value)
        };

        let title = present("title", self.title);
        let description = present("description", self.description);
        let image = present("image", self.image);
        let link = present("link", self.link);

        let category = match self.category.as_deref() {
            None => None,
            Some(raw) => match raw.parse() {
                Ok(c) => Some(c),
                Err(e) => {
                    errors.insert("category".to_string(), e);
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        Ok(ProjectPatch {
            title,
            description,
            image,
            link,
            category,
            technologies: self.technologies.map(clean_technologies),
            featured: self.featured,
        })
    }
}

fn clean_technologies(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Row shape of the `projects` table
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    pub link: String,
    pub category: String,
    pub technologies: Vec<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        let category = row.category.parse().unwrap_or_else(|_| {
            tracing::warn!("project {} has unknown category '{}'", row.id, row.category);
            Category::Other
        });
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            image: row.image,
            link: row.link,
            category,
            technologies: row.technologies,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: serde_json::Value) -> ProjectInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn new_project_defaults_optional_fields() {
        let new = input(json!({
            "title": "Folio",
            "description": "My <b>site</b>",
            "image": "/uploads/a.png",
            "link": "https://example.com"
        }))
        .into_new_project()
        .unwrap();

        assert_eq!(new.category, Category::WebDevelopment);
        assert!(new.technologies.is_empty());
        assert!(!new.featured);
        assert_eq!(new.description, "My <b>site</b>");
    }

    #[test]
    fn new_project_reports_every_missing_field() {
        let err = input(json!({ "title": "  ", "link": "https://example.com" }))
            .into_new_project()
            .unwrap_err();

        match err {
            StoreError::Validation(fields) => {
                let names: Vec<&str> = fields.keys().map(String::as_str).collect();
                assert_eq!(names, vec!["description", "image", "title"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = input(json!({ "category": "Games" })).into_patch().unwrap_err();
        assert!(matches!(err, StoreError::Validation(f) if f.contains_key("category")));
    }

    #[test]
    fn patch_keeps_absent_fields_untouched() {
        let mut project = Project::from_new(NewProject {
            title: "Old".into(),
            description: "desc".into(),
            image: "/uploads/x.png".into(),
            link: "https://x".into(),
            category: Category::MobileApp,
            technologies: vec!["Rust".into()],
            featured: false,
        });
        let created_at = project.created_at;

        let patch = input(json!({ "featured": true, "technologies": ["Rust", " axum ", ""] }))
            .into_patch()
            .unwrap();
        project.apply(patch);

        assert_eq!(project.title, "Old");
        assert_eq!(project.category, Category::MobileApp);
        assert!(project.featured);
        assert_eq!(project.technologies, vec!["Rust", "axum"]);
        assert_eq!(project.created_at, created_at);
    }

    #[test]
    fn serializes_with_frontend_field_names() {
        let project = Project::from_new(NewProject {
            title: "T".into(),
            description: "D".into(),
            image: "I".into(),
            link: "L".into(),
            category: Category::UiUxDesign,
            technologies: vec![],
            featured: true,
        });
        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["_id"], json!(project.id));
        assert_eq!(value["category"], "UI/UX Design");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }
}
