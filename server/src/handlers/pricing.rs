use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::engine::pricing::PriceOverride;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::success;

pub async fn get_pricing(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Response> {
    let pricing = state.engine.pricing(event_id, partnership_id).await?;
    Ok(success(pricing, "Pricing computed"))
}

pub async fn set_pack_price(
    State(state): State<AppState>,
    Path((event_id, partnership_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<PriceOverride>,
) -> AppResult<Response> {
    let pricing = state
        .engine
        .set_pack_price(event_id, partnership_id, request.price)
        .await?;
    Ok(success(pricing, "Pack price updated"))
}

pub async fn set_option_price(
    State(state): State<AppState>,
    Path((event_id, partnership_id, option_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(request): Json<PriceOverride>,
) -> AppResult<Response> {
    let pricing = state
        .engine
        .set_option_price(event_id, partnership_id, option_id, request.price)
        .await?;
    Ok(success(pricing, "Option price updated"))
}
