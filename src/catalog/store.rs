use super::Catalog;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Durable storage for the summary catalog.
///
/// The catalog is always read and written whole.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Load the stored catalog; a store that has never been written is empty.
    async fn load(&self) -> Result<Catalog>;

    /// Replace the stored catalog.
    async fn save(&self, catalog: &Catalog) -> Result<()>;
}

/// Catalog kept as a pretty-printed JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "catalog.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CatalogStore for JsonFileStore {
    async fn load(&self) -> Result<Catalog> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Catalog::new()),
            Err(e) => {
                return Err(AppError::Catalog(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&text).map_err(|e| {
            AppError::Catalog(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    async fn save(&self, catalog: &Catalog) -> Result<()> {
        let json = serde_json::to_string_pretty(catalog)
            .map_err(|e| AppError::Catalog(format!("Failed to serialize catalog: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Catalog(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        // Never leave a torn catalog behind: write a sibling file, then rename.
        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| AppError::Catalog(format!("Failed to write {}: {}", temp.display(), e)))?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|e| {
            AppError::Catalog(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        info!(path = ?self.path, entries = catalog.len(), "Saved summary catalog");
        Ok(())
    }
}
