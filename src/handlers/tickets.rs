use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::Role;
use crate::state::AppState;
use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Deserialize)]
pub struct ScanRequest {
    pub ticket_id: Uuid,
}

/// Organizer check-in by scanned ticket id.
pub async fn scan_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ScanRequest>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Organizer])?;
    let ticket = state.engine.issuer.scan(req.ticket_id, auth.0.user_id).await?;
    Ok(success(ticket, "Check-in successful"))
}

/// Ticket details, visible to its owner and the event's organizer.
pub async fn get_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let ticket = state
        .store
        .ticket_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;
    let event = state
        .store
        .event_by_id(ticket.event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let is_owner = ticket.user_id == auth.0.user_id;
    let is_organizer = event.organizer_id == auth.0.user_id;
    if !is_owner && !is_organizer {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    Ok(success(ticket, "Ticket details"))
}
