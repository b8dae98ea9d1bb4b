use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::utils::error::{AppError, AppResult};

/// Stores named content and returns a URL it can be retrieved from.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, name: &str, content: Vec<u8>, mime_type: &str) -> AppResult<String>;
}

/// Writes objects below a directory served at `public_base_url`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, name: &str) -> AppResult<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if name.is_empty() || escapes {
            return Err(AppError::ValidationError(format!(
                "Invalid object name '{}'",
                name
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, name: &str, content: Vec<u8>, mime_type: &str) -> AppResult<String> {
        let path = self.resolve(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to prepare storage: {}", e))
            })?;
        }
        fs::write(&path, &content).await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to store {}: {}", name, e))
        })?;

        tracing::debug!(name, mime_type, bytes = content.len(), "Stored object");
        Ok(format!("{}/{}", self.public_base_url, name))
    }
}
