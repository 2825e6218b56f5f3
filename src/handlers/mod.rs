pub mod auth;
pub mod events;
pub mod teams;
pub mod tickets;

use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    success(
        HealthPayload {
            status: "ok",
            service: "festra-api",
        },
        "Health check successful",
    )
}
