use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::Response;
use serde::Serialize;
use uuid::Uuid;

use crate::engine::documents::DocumentKind;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, success};

#[derive(Serialize)]
struct DocumentUrl {
    url: String,
}

async fn generate(
    state: AppState,
    event_id: Uuid,
    partnership_id: Uuid,
    kind: DocumentKind,
) -> AppResult<Response> {
    let url = state
        .engine
        .generate_document(event_id, partnership_id, kind)
        .await?;
    Ok(created(DocumentUrl { url }, "Document generated"))
}

pub async fn generate_agreement(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Response> {
    generate(state, event_id, partnership_id, DocumentKind::Agreement).await
}

pub async fn generate_assignment(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Response> {
    generate(state, event_id, partnership_id, DocumentKind::Assignment).await
}

/// Raw document bytes; the `Content-Type` header carries the MIME type.
pub async fn upload_signed_agreement(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/pdf")
        .to_string();

    let url = state
        .engine
        .upload_signed_agreement(event_id, partnership_id, body.to_vec(), &mime_type)
        .await?;
    Ok(success(DocumentUrl { url }, "Signed agreement stored"))
}
