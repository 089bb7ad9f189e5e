//! `PgProjectStore` against a live database.
//!
//! Run with `DATABASE_URL=postgres://... cargo test --test postgres_store -- --ignored`.
//! Each test works inside its own schema, dropped afterwards.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

use folio_api::database::models::{Category, NewProject, ProjectPatch};
use folio_api::database::{PgProjectStore, ProjectStore, StoreError};

struct ScratchSchema {
    admin: PgPool,
    pool: PgPool,
    name: String,
}

impl ScratchSchema {
    async fn create() -> Result<Self> {
        let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let name = format!("folio_test_{}", Uuid::new_v4().simple());

        let admin = PgPoolOptions::new().max_connections(1).connect(&url).await?;
        admin
            .execute(format!("CREATE SCHEMA \"{}\"", name).as_str())
            .await?;

        let search_path = format!("SET search_path TO \"{}\"", name);
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await?;

        Ok(Self { admin, pool, name })
    }

    async fn drop_schema(self) -> Result<()> {
        self.pool.close().await;
        self.admin
            .execute(format!("DROP SCHEMA \"{}\" CASCADE", self.name).as_str())
            .await?;
        Ok(())
    }
}

fn new_project(title: &str) -> NewProject {
    NewProject {
        title: title.to_string(),
        description: format!("{} description", title),
        image: format!("/uploads/project-{}.png", title),
        link: "https://example.com".to_string(),
        category: Category::default(),
        technologies: vec!["Rust".to_string(), "PostgreSQL".to_string()],
        featured: false,
    }
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn crud_round_trip_on_postgres() -> Result<()> {
    let scratch = ScratchSchema::create().await?;
    let store = PgProjectStore::new(scratch.pool.clone());
    store.ensure_schema().await?;
    // Idempotent
    store.ensure_schema().await?;
    store.health_check().await?;

    let first = store.create(new_project("first")).await?;
    let second = store.create(new_project("second")).await?;
    let third = store.create(new_project("third")).await?;

    let ids: Vec<Uuid> = store.list().await?.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);

    let patch = ProjectPatch {
        featured: Some(true),
        category: Some(Category::MobileApp),
        ..Default::default()
    };
    let updated = store.update(second.id, patch).await?;
    assert!(updated.featured);
    assert_eq!(updated.category, Category::MobileApp);
    assert_eq!(updated.title, second.title);
    assert_eq!(updated.technologies, second.technologies);
    assert_eq!(updated.created_at, second.created_at);
    assert!(updated.updated_at >= second.updated_at);

    assert!(matches!(
        store.update(Uuid::new_v4(), ProjectPatch::default()).await,
        Err(StoreError::NotFound)
    ));

    let mut refs = store.image_refs().await?;
    refs.sort();
    assert_eq!(
        refs,
        vec![
            "/uploads/project-first.png",
            "/uploads/project-second.png",
            "/uploads/project-third.png",
        ]
    );

    store.delete(first.id).await?;
    assert!(matches!(store.delete(first.id).await, Err(StoreError::NotFound)));
    assert_eq!(store.list().await?.len(), 2);

    scratch.drop_schema().await
}
