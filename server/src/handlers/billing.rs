use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::billing::{BillingInput, IssueTickets, TicketUpdate};
use crate::models::InvoiceStatus;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: InvoiceStatus,
}

pub async fn get_billing(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Response> {
    let billing = state.engine.billing(event_id, partnership_id).await?;
    Ok(success(billing, "Billing retrieved"))
}

pub async fn upsert_billing(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<BillingInput>,
) -> AppResult<Response> {
    let billing = state
        .engine
        .upsert_billing(event_id, partnership_id, input)
        .await?;
    Ok(success(billing, "Billing saved"))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
    Json(update): Json<StatusUpdate>,
) -> AppResult<Response> {
    let billing = state
        .engine
        .update_billing_status(event_id, partnership_id, update.status)
        .await?;
    Ok(success(billing, "Invoice status updated"))
}

pub async fn issue_tickets(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<IssueTickets>,
) -> AppResult<Response> {
    let tickets = state
        .engine
        .issue_tickets(event_id, partnership_id, request)
        .await?;
    Ok(created(tickets, "Tickets issued"))
}

pub async fn list_tickets(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Response> {
    let tickets = state.engine.list_tickets(event_id, partnership_id).await?;
    Ok(success(tickets, "Tickets retrieved"))
}

pub async fn update_ticket(
    State(state): State<AppState>,
    Path((event_id, partnership_id, ticket_id)): Path<(Uuid, Uuid, String)>,
    Json(update): Json<TicketUpdate>,
) -> AppResult<Response> {
    let ticket = state
        .engine
        .update_ticket(event_id, partnership_id, &ticket_id, update)
        .await?;
    Ok(success(ticket, "Ticket updated"))
}
