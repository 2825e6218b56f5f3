use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::{Role, Team, Ticket};
use crate::notify::send_in_background;
use crate::state::AppState;
use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub event_id: Uuid,
}

#[derive(Deserialize)]
pub struct JoinTeamRequest {
    pub code: String,
    pub event_id: Uuid,
}

#[derive(Serialize)]
struct TeamPayload {
    team: Team,
    /// The caller's own ticket, when this operation issued one.
    ticket: Option<Ticket>,
    /// Members still waiting on a ticket after a partial fan-out.
    unticketed: Vec<Uuid>,
}

pub async fn create_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTeamRequest>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Participant])?;
    let registration = state
        .engine
        .teams
        .create(auth.0.user_id, req.event_id, &req.name)
        .await?;

    let team = &registration.team;
    if let Some(event) = state.store.event_by_id(req.event_id).await? {
        send_in_background(
            state.notifier.clone(),
            auth.0.email.clone(),
            format!("Team Created - {}", team.name),
            format!(
                "You have created the team \"{}\" for {}.\n\nTeam code: {}\n\nShare this \
                 code with your teammates so they can join.",
                team.name, event.name, team.code
            ),
        );
    }

    Ok(created(
        TeamPayload {
            team: registration.team,
            ticket: registration.ticket,
            unticketed: registration.unticketed,
        },
        "Team created successfully",
    ))
}

pub async fn join_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<JoinTeamRequest>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Participant])?;
    let registration = state
        .engine
        .teams
        .join(auth.0.user_id, req.event_id, &req.code)
        .await?;

    if registration.completed_now {
        // The team just completed: let the whole roster know their
        // tickets exist. Look up addresses first, then detach delivery.
        for member_id in &registration.team.members {
            if let Some(member) = state.store.user_by_id(*member_id).await? {
                send_in_background(
                    state.notifier.clone(),
                    member.email,
                    format!("Team Complete - {}", registration.team.name),
                    format!(
                        "Your team \"{}\" is now complete and registered. Your ticket is \
                         available in your dashboard.",
                        registration.team.name
                    ),
                );
            }
        }
    } else {
        send_in_background(
            state.notifier.clone(),
            auth.0.email.clone(),
            format!("Joined Team - {}", registration.team.name),
            format!(
                "You have joined the team \"{}\". Team status: {}.",
                registration.team.name,
                registration.team.status.as_str()
            ),
        );
    }

    Ok(success(
        TeamPayload {
            team: registration.team,
            ticket: registration.ticket,
            unticketed: registration.unticketed,
        },
        "Joined team successfully",
    ))
}

/// The caller's team for an event, if any.
pub async fn my_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Participant])?;
    let team = state
        .store
        .team_for_member(event_id, auth.0.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No team found".to_string()))?;
    Ok(success(team, "Team found"))
}
