use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{
    billing, documents, health_check, notifications, partnerships, pricing, suggestions,
};
use crate::state::AppState;

const PARTNERSHIP: &str = "/events/:event_id/partnerships/:partnership_id";

fn partnership_route(suffix: &str) -> String {
    format!("{}{}", PARTNERSHIP, suffix)
}

fn partnership_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events/:event_id/partnerships",
            post(partnerships::register).get(partnerships::list),
        )
        .route(
            PARTNERSHIP,
            get(partnerships::detail).delete(partnerships::delete),
        )
        .route(&partnership_route("/validate"), post(partnerships::validate))
        .route(&partnership_route("/decline"), post(partnerships::decline))
        .route(&partnership_route("/contact"), put(partnerships::update_contact))
        .route(&partnership_route("/booth"), put(partnerships::assign_booth))
        .route(
            &partnership_route("/organiser"),
            put(partnerships::assign_organiser),
        )
        .route(
            &partnership_route("/communication"),
            put(partnerships::update_communication),
        )
}

fn suggestion_routes() -> Router<AppState> {
    const SUGGESTION: &str =
        "/events/:event_id/companies/:company_id/partnerships/:partnership_id/suggestion";

    Router::new()
        .route(SUGGESTION, post(suggestions::suggest))
        .route(&format!("{}/approve", SUGGESTION), post(suggestions::approve))
        .route(&format!("{}/decline", SUGGESTION), post(suggestions::decline))
}

fn entitlement_routes() -> Router<AppState> {
    Router::new()
        .route(
            &partnership_route("/pricing"),
            get(pricing::get_pricing).put(pricing::set_pack_price),
        )
        .route(
            &partnership_route("/options/:option_id/pricing"),
            put(pricing::set_option_price),
        )
        .route(
            &partnership_route("/billing"),
            get(billing::get_billing).put(billing::upsert_billing),
        )
        .route(
            &partnership_route("/billing/status"),
            put(billing::update_status),
        )
        .route(
            &partnership_route("/tickets"),
            get(billing::list_tickets).post(billing::issue_tickets),
        )
        .route(
            &partnership_route("/tickets/:ticket_id"),
            put(billing::update_ticket),
        )
}

fn document_routes() -> Router<AppState> {
    Router::new()
        .route(
            &partnership_route("/agreement"),
            post(documents::generate_agreement),
        )
        .route(
            &partnership_route("/assignment"),
            post(documents::generate_assignment),
        )
        .route(
            &partnership_route("/signed-agreement"),
            post(documents::upload_signed_agreement),
        )
        .route(
            "/events/:event_id/notifications",
            post(notifications::notify),
        )
        .route(
            "/events/:event_id/notifications/destinations",
            get(notifications::destinations),
        )
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(partnership_routes())
        .merge(suggestion_routes())
        .merge(entitlement_routes())
        .merge(document_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
}
