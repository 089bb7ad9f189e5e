use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{connect_database, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::PgProjectStore;
use crate::services::UploadHandler;

#[derive(Subcommand)]
pub enum UploadCommands {
    #[command(about = "List uploaded images that no project references")]
    Orphans {
        #[arg(long, help = "Delete the orphaned files")]
        prune: bool,
    },
}

pub async fn handle(cmd: UploadCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UploadCommands::Orphans { prune } => {
            let database = connect_database(config).await?;
            let image_refs = PgProjectStore::new(database.pool().clone()).image_refs().await?;
            database.close().await;

            let uploads = UploadHandler::new(&config.upload);
            let orphans = if prune {
                uploads.prune_orphans(&image_refs).await?
            } else {
                uploads.find_orphans(&image_refs).await?
            };

            let files: Vec<String> = orphans.iter().map(|p| p.display().to_string()).collect();
            if output_format == OutputFormat::Text {
                for file in &files {
                    println!("{}", file);
                }
            }

            let verb = if prune { "Removed" } else { "Found" };
            output_success(
                output_format,
                &format!("{} {} orphaned upload(s) in {}", verb, files.len(), uploads.dir().display()),
                Some(json!({ "orphans": files, "pruned": prune })),
            )
        }
    }
}
