use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::listing::{CommunicationUpdate, OrganiserAssignment, PartnershipFilter};
use crate::engine::registration::{ContactUpdate, RegisterPartnership};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct BoothRequest {
    /// Empty or absent clears the booth.
    pub location: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<RegisterPartnership>,
) -> AppResult<Response> {
    let partnership = state.engine.register(event_id, request).await?;
    Ok(created(partnership, "Partnership registered"))
}

pub async fn list(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(filter): Query<PartnershipFilter>,
) -> AppResult<Response> {
    let views = state.engine.list_partnerships(event_id, &filter).await?;
    Ok(success(views, "Partnerships retrieved"))
}

pub async fn detail(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Response> {
    let view = state
        .engine
        .partnership_detail(event_id, partnership_id)
        .await?;
    Ok(success(view, "Partnership retrieved"))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Response> {
    state
        .engine
        .delete_partnership(event_id, partnership_id)
        .await?;
    Ok(empty_success("Partnership deleted"))
}

pub async fn validate(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Response> {
    let partnership = state.engine.validate(event_id, partnership_id).await?;
    Ok(success(partnership, "Partnership validated"))
}

pub async fn decline(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Response> {
    let partnership = state.engine.decline(event_id, partnership_id).await?;
    Ok(success(partnership, "Partnership declined"))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
    Json(update): Json<ContactUpdate>,
) -> AppResult<Response> {
    let partnership = state
        .engine
        .update_contact(event_id, partnership_id, update)
        .await?;
    Ok(success(partnership, "Contact updated"))
}

pub async fn assign_booth(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<BoothRequest>,
) -> AppResult<Response> {
    let partnership = state
        .engine
        .assign_booth(event_id, partnership_id, request.location)
        .await?;
    Ok(success(partnership, "Booth location updated"))
}

pub async fn assign_organiser(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<OrganiserAssignment>,
) -> AppResult<Response> {
    let partnership = state
        .engine
        .assign_organiser(event_id, partnership_id, request.organiser_id)
        .await?;
    Ok(success(partnership, "Organiser updated"))
}

pub async fn update_communication(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
    Json(update): Json<CommunicationUpdate>,
) -> AppResult<Response> {
    let partnership = state
        .engine
        .update_communication(event_id, partnership_id, update)
        .await?;
    Ok(success(partnership, "Communication plan updated"))
}
