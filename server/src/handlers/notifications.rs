use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::listing::PartnershipFilter;
use crate::gateways::Notification;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    #[serde(default)]
    pub filter: PartnershipFilter,
    pub subject: String,
    pub body: String,
}

#[derive(Serialize)]
struct NotifyResult {
    delivered: usize,
}

pub async fn destinations(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(filter): Query<PartnershipFilter>,
) -> AppResult<Response> {
    let destinations = state.engine.resolve_destinations(event_id, &filter).await?;
    Ok(success(destinations, "Destinations resolved"))
}

pub async fn notify(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<NotifyRequest>,
) -> AppResult<Response> {
    let notification = Notification {
        subject: request.subject,
        body: request.body,
    };
    let delivered = state
        .engine
        .notify(event_id, &request.filter, notification)
        .await?;
    Ok(success(NotifyResult { delivered }, "Notification sent"))
}
