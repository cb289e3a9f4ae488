//! SQL migration files exposed to the admin area.
//!
//! A migration is a `<id>.sql` file in the configured directory; its id is
//! the file stem and its title the file name.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct MigrationEntry {
    pub migration_id: String,
    pub title: String,
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("invalid migration id")]
    InvalidId,

    #[error("migration not found")]
    NotFound,

    #[error("failed to read migration: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug)]
pub struct MigrationCatalog {
    dir: PathBuf,
}

impl MigrationCatalog {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Only `[A-Za-z0-9_-]` ids are accepted, so an id can never escape the
    /// migrations directory.
    fn is_valid_id(id: &str) -> bool {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    /// All `.sql` files, sorted by file name.
    ///
    /// # Errors
    /// Returns [`MigrationError::Io`] if the directory cannot be read.
    pub async fn list(&self) -> Result<Vec<MigrationEntry>, MigrationError> {
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("sql") {
                continue;
            }
            let (Some(stem), Some(name)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.file_name().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            entries.push(MigrationEntry {
                migration_id: stem.to_string(),
                title: name.to_string(),
            });
        }
        entries.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(entries)
    }

    /// Path of an existing migration file.
    ///
    /// # Errors
    /// [`MigrationError::InvalidId`] for a rejected id, [`MigrationError::NotFound`]
    /// when no such file exists.
    async fn resolve(&self, migration_id: &str) -> Result<PathBuf, MigrationError> {
        if !Self::is_valid_id(migration_id) {
            return Err(MigrationError::InvalidId);
        }
        let path = self.dir.join(format!("{migration_id}.sql"));
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(MigrationError::NotFound),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(MigrationError::NotFound),
            Err(err) => Err(MigrationError::Io(err)),
        }
    }

    /// Read the SQL text of a migration.
    ///
    /// # Errors
    /// [`MigrationError::InvalidId`] for a rejected id, [`MigrationError::NotFound`]
    /// when no such file exists, [`MigrationError::Io`] when it cannot be read.
    pub async fn read(&self, migration_id: &str) -> Result<String, MigrationError> {
        let path = self.resolve(migration_id).await?;
        Ok(tokio::fs::read_to_string(path).await?)
    }
}
