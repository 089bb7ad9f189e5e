use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{connect_database, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::service::ensure_user_schema;
use crate::database::PgProjectStore;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create the projects and users tables if they are missing")]
    Migrate,
}

pub async fn handle(cmd: DbCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Migrate => {
            let database = connect_database(config).await?;

            PgProjectStore::new(database.pool().clone()).ensure_schema().await?;
            ensure_user_schema(database.pool()).await?;
            database.close().await;

            output_success(
                output_format,
                "Database schema is up to date",
                Some(json!({ "tables": ["projects", "users"] })),
            )
        }
    }
}
