use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod billing;
pub mod documents;
pub mod notifications;
pub mod partnerships;
pub mod pricing;
pub mod suggestions;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "partners-api",
    };

    success(payload, "Health check successful")
}
