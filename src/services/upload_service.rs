use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::UploadConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Only image files are allowed (got '{0}')")]
    InvalidFileType(String),

    #[error("File exceeds the {limit} byte limit")]
    FileTooLarge { limit: usize },

    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A single file pulled out of a multipart request
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub url: String,
    pub filename: String,
    pub original_name: String,
    pub size: usize,
}

/// Writes project images into the public upload directory.
///
/// Files are never removed when the project that references them goes away;
/// `find_orphans` and `prune_orphans` exist for operators who want to clean up.
#[derive(Debug, Clone)]
pub struct UploadHandler {
    dir: PathBuf,
    public_prefix: String,
    max_bytes: usize,
}

const FILE_PREFIX: &str = "project-";

impl UploadHandler {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
            max_bytes: config.max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn check_type(&self, content_type: &str) -> Result<(), UploadError> {
        if content_type.starts_with("image/") {
            Ok(())
        } else {
            Err(UploadError::InvalidFileType(content_type.to_string()))
        }
    }

    pub fn check_size(&self, size: usize) -> Result<(), UploadError> {
        if size > self.max_bytes {
            Err(UploadError::FileTooLarge { limit: self.max_bytes })
        } else {
            Ok(())
        }
    }

    pub async fn upload(&self, file: UploadFile) -> Result<UploadedAsset, UploadError> {
        self.check_type(&file.content_type)?;
        self.check_size(file.bytes.len())?;

        let filename = generate_filename(&file.file_name);
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&filename), &file.bytes).await?;

        tracing::info!(
            "Stored upload {} ({} bytes, {}) from '{}'",
            filename,
            file.bytes.len(),
            file.content_type,
            file.file_name
        );

        Ok(UploadedAsset {
            url: self.public_url(&filename),
            size: file.bytes.len(),
            original_name: file.file_name,
            filename,
        })
    }

    pub fn public_url(&self, filename: &str) -> String {
        format!("{}/{}", self.public_prefix, filename)
    }

    /// Generated uploads whose file name is not referenced by any of `image_refs`.
    pub async fn find_orphans(&self, image_refs: &[String]) -> Result<Vec<PathBuf>, UploadError> {
        let referenced: HashSet<&str> = image_refs
            .iter()
            .filter_map(|r| r.rsplit('/').next())
            .collect();

        let mut orphans = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(orphans),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(FILE_PREFIX) && !referenced.contains(name.as_str()) {
                orphans.push(entry.path());
            }
        }
        orphans.sort();
        Ok(orphans)
    }

    pub async fn prune_orphans(&self, image_refs: &[String]) -> Result<Vec<PathBuf>, UploadError> {
        let orphans = self.find_orphans(image_refs).await?;
        for path in &orphans {
            tokio::fs::remove_file(path).await?;
            tracing::info!("Removed orphaned upload {}", path.display());
        }
        Ok(orphans)
    }
}

/// `project-<unix millis>-<random>` plus the original extension, if it is sane.
pub fn generate_filename(original_name: &str) -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    format!(
        "{}{}-{}{}",
        FILE_PREFIX,
        Utc::now().timestamp_millis(),
        suffix,
        extension_of(original_name)
    )
}

fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}
