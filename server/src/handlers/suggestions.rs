use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::engine::suggestion::SuggestPack;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::success;

type CompanyPartnershipPath = Path<(Uuid, Uuid, Uuid)>;

pub async fn suggest(
    State(state): State<AppState>,
    Path((event_id, company_id, partnership_id)): CompanyPartnershipPath,
    Json(request): Json<SuggestPack>,
) -> AppResult<Response> {
    let partnership = state
        .engine
        .suggest(event_id, company_id, partnership_id, request)
        .await?;
    Ok(success(partnership, "Pack suggestion sent"))
}

pub async fn approve(
    State(state): State<AppState>,
    Path((event_id, company_id, partnership_id)): CompanyPartnershipPath,
) -> AppResult<Response> {
    let partnership = state
        .engine
        .approve_suggestion(event_id, company_id, partnership_id)
        .await?;
    Ok(success(partnership, "Pack suggestion approved"))
}

pub async fn decline(
    State(state): State<AppState>,
    Path((event_id, company_id, partnership_id)): CompanyPartnershipPath,
) -> AppResult<Response> {
    let partnership = state
        .engine
        .decline_suggestion(event_id, company_id, partnership_id)
        .await?;
    Ok(success(partnership, "Pack suggestion declined"))
}
