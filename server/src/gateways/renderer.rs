use async_trait::async_trait;

use crate::engine::documents::DocumentSnapshot;
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub content: Vec<u8>,
    pub mime_type: String,
    pub extension: String,
}

/// Turns a document snapshot into bytes, picking the template for the
/// snapshot's kind and language.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, snapshot: &DocumentSnapshot) -> AppResult<RenderedDocument>;
}

/// Emits the snapshot itself as pretty JSON. Used when no PDF renderer is
/// wired in.
#[derive(Debug, Clone, Default)]
pub struct JsonSnapshotRenderer;

#[async_trait]
impl DocumentRenderer for JsonSnapshotRenderer {
    async fn render(&self, snapshot: &DocumentSnapshot) -> AppResult<RenderedDocument> {
        let content = serde_json::to_vec_pretty(snapshot).map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to render document: {}", e))
        })?;
        Ok(RenderedDocument {
            content,
            mime_type: "application/json".to_string(),
            extension: "json".to_string(),
        })
    }
}
