use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::engine::lifecycle::{self, EditScope};
use crate::models::{
    Answer, Eligibility, Event, EventKind, EventStatus, Feedback, FormField, Role, TeamStatus,
    Ticket,
};
use crate::notify::{discord, send_in_background};
use crate::state::AppState;
use crate::store::{EventFilter, Store};
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub kind: Option<EventKind>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub form_fields: Vec<FormField>,
    #[serde(default)]
    pub max_participants: Option<i32>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub is_team_event: bool,
    #[serde(default)]
    pub min_team_size: Option<i32>,
    #[serde(default)]
    pub max_team_size: Option<i32>,
    #[serde(default)]
    pub max_teams: Option<i32>,
    #[serde(default)]
    pub eligibility: Option<Eligibility>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub kind: Option<EventKind>,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub registration_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub form_fields: Option<Vec<FormField>>,
    #[serde(default)]
    pub max_participants: Option<i32>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub is_team_event: Option<bool>,
    #[serde(default)]
    pub min_team_size: Option<i32>,
    #[serde(default)]
    pub max_team_size: Option<i32>,
    #[serde(default)]
    pub max_teams: Option<i32>,
    #[serde(default)]
    pub eligibility: Option<Eligibility>,
    #[serde(default)]
    pub status: Option<EventStatus>,
}

impl UpdateEventRequest {
    /// Anything besides a status change?
    fn touches_details(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.kind.is_some()
            || self.start_at.is_some()
            || self.end_at.is_some()
            || self.registration_deadline.is_some()
            || self.tags.is_some()
            || self.form_fields.is_some()
            || self.max_participants.is_some()
            || self.price.is_some()
            || self.stock.is_some()
            || self.is_team_event.is_some()
            || self.min_team_size.is_some()
            || self.max_team_size.is_some()
            || self.max_teams.is_some()
            || self.eligibility.is_some()
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub answers: Vec<Answer>,
}

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

fn validate_form_fields(fields: &mut [FormField]) -> Result<(), AppError> {
    for field in fields.iter_mut() {
        if field.label.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Each form field must have a label".to_string(),
            ));
        }
        if field.name.is_empty() {
            field.name = field
                .label
                .to_lowercase()
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect::<String>()
                .trim_matches('_')
                .to_string();
        }
        if field.kind.needs_options() && field.options.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Field \"{}\" requires an options list",
                field.label
            )));
        }
    }
    Ok(())
}

pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(mut req): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Organizer])?;

    if req.name.trim().is_empty() || req.description.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Please provide name and description".to_string(),
        ));
    }
    if req.start_at >= req.end_at {
        return Err(AppError::ValidationError(
            "End date must be after start date".to_string(),
        ));
    }
    if req.registration_deadline > req.start_at {
        return Err(AppError::ValidationError(
            "Registration deadline cannot be after start date".to_string(),
        ));
    }
    validate_form_fields(&mut req.form_fields)?;

    let min_team_size = req.min_team_size.unwrap_or(1);
    let max_team_size = req.max_team_size.unwrap_or(1);
    if req.is_team_event && (min_team_size < 1 || max_team_size < min_team_size) {
        return Err(AppError::ValidationError(
            "Team size bounds are inconsistent".to_string(),
        ));
    }
    for bound in [req.max_participants, req.stock, req.max_teams]
        .into_iter()
        .flatten()
    {
        if bound < 0 {
            return Err(AppError::ValidationError(
                "Capacity limits cannot be negative".to_string(),
            ));
        }
    }

    let now = Utc::now();
    let event = Event {
        id: Uuid::new_v4(),
        organizer_id: auth.0.user_id,
        name: req.name.trim().to_string(),
        description: req.description,
        kind: req.kind.unwrap_or(EventKind::Normal),
        is_team_event: req.is_team_event,
        min_team_size,
        max_team_size,
        max_teams: req.max_teams,
        team_slots_left: req.max_teams,
        start_at: req.start_at,
        end_at: req.end_at,
        registration_deadline: req.registration_deadline,
        tags: req.tags,
        form_fields: req.form_fields,
        max_participants: req.max_participants,
        seats_left: req.max_participants,
        price: req.price.unwrap_or_default(),
        stock: req.stock,
        eligibility: req.eligibility.unwrap_or(Eligibility::All),
        status: EventStatus::Draft,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_event(&event).await?;

    Ok(created(event, "Event created successfully"))
}

/// Listing is role-shaped: organizers see their own events, participants
/// see only Published ones, admins see everything.
pub async fn list_events(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    let filter = match auth.0.role {
        Role::Organizer => EventFilter {
            organizer_id: Some(auth.0.user_id),
            ..Default::default()
        },
        Role::Participant => EventFilter {
            status: Some(EventStatus::Published),
            ..Default::default()
        },
        Role::Admin => EventFilter::default(),
    };
    let events = state.store.list_events(filter).await?;
    let count = events.len();
    Ok(success(
        serde_json::json!({ "events": events, "count": count }),
        "Events",
    ))
}

pub async fn get_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state
        .store
        .event_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    match auth.0.role {
        Role::Organizer if event.organizer_id != auth.0.user_id => {
            return Err(AppError::Forbidden(
                "You can only view your own events".to_string(),
            ));
        }
        Role::Participant if event.status != EventStatus::Published => {
            return Err(AppError::Forbidden(
                "This event is not published yet".to_string(),
            ));
        }
        _ => {}
    }

    let participants_count = state.store.count_confirmed_tickets(event.id).await?;
    let teams_count = if event.is_team_event {
        state.store.count_teams(event.id, None).await?
    } else {
        0
    };

    Ok(success(
        serde_json::json!({
            "event": event,
            "participants_count": participants_count,
            "teams_count": teams_count,
        }),
        "Event details",
    ))
}

/// Organizer edits, gated by the per-status edit scope. Status changes go
/// through the transition table; admins may override it.
pub async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Organizer, Role::Admin])?;
    let mut event = state
        .store
        .event_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    if auth.0.role != Role::Admin && event.organizer_id != auth.0.user_id {
        return Err(AppError::Forbidden(
            "You can only update your own events".to_string(),
        ));
    }

    let registrations = state.store.count_confirmed_tickets(event.id).await?;
    if registrations > 0 && req.form_fields.is_some() {
        return Err(AppError::ValidationError(
            "Form fields are locked after the first registration is received".to_string(),
        ));
    }

    match lifecycle::edit_scope(event.status) {
        EditScope::Full => {
            if let Some(name) = req.name {
                event.name = name;
            }
            if let Some(description) = req.description {
                event.description = description;
            }
            if let Some(kind) = req.kind {
                event.kind = kind;
            }
            if let Some(start_at) = req.start_at {
                event.start_at = start_at;
            }
            if let Some(end_at) = req.end_at {
                event.end_at = end_at;
            }
            if let Some(deadline) = req.registration_deadline {
                event.registration_deadline = deadline;
            }
            if let Some(tags) = req.tags {
                event.tags = tags;
            }
            if let Some(mut fields) = req.form_fields {
                validate_form_fields(&mut fields)?;
                event.form_fields = fields;
            }
            if let Some(is_team_event) = req.is_team_event {
                event.is_team_event = is_team_event;
            }
            if let Some(min) = req.min_team_size {
                event.min_team_size = min;
            }
            if let Some(max) = req.max_team_size {
                event.max_team_size = max;
            }
            if let Some(price) = req.price {
                event.price = price;
            }
            if let Some(eligibility) = req.eligibility {
                event.eligibility = eligibility;
            }
            apply_capacity_edits(
                &state,
                &mut event,
                req.max_participants,
                req.stock,
                req.max_teams,
                registrations,
            )
            .await?;
        }
        EditScope::Limited => {
            if let Some(description) = req.description {
                event.description = description;
            }
            if let Some(start_at) = req.start_at {
                event.start_at = start_at;
            }
            if let Some(end_at) = req.end_at {
                event.end_at = end_at;
            }
            if let Some(deadline) = req.registration_deadline {
                event.registration_deadline = deadline;
            }
            apply_capacity_edits(
                &state,
                &mut event,
                req.max_participants,
                req.stock,
                req.max_teams,
                registrations,
            )
            .await?;
        }
        EditScope::StatusOnly => {
            if req.touches_details() {
                return Err(AppError::StateConflict(format!(
                    "Event is already {}. Only status can be changed.",
                    event.status.as_str()
                )));
            }
        }
    }

    if let Some(requested) = req.status {
        if requested != event.status {
            lifecycle::check_event_transition(event.status, requested, auth.0.role)?;
            event.status = requested;
        }
    }

    event.updated_at = Utc::now();
    state.store.update_event(&event).await?;
    Ok(success(event, "Event updated successfully"))
}

/// Capacity edits re-derive the remaining counters from the new bound and
/// the current usage. Not raced by live registrations in practice: these
/// fields are organizer-edited, and the claim path only ever moves the
/// counters downward atomically.
async fn apply_capacity_edits(
    state: &AppState,
    event: &mut Event,
    max_participants: Option<i32>,
    stock: Option<i32>,
    max_teams: Option<i32>,
    registrations: i64,
) -> Result<(), AppError> {
    if let Some(max) = max_participants {
        if max < 0 {
            return Err(AppError::ValidationError(
                "Capacity limits cannot be negative".to_string(),
            ));
        }
        event.max_participants = Some(max);
        event.seats_left = Some((max as i64 - registrations).max(0) as i32);
    }
    if let Some(stock) = stock {
        if stock < 0 {
            return Err(AppError::ValidationError(
                "Stock cannot be negative".to_string(),
            ));
        }
        event.stock = Some(stock);
    }
    if let Some(max_teams) = max_teams {
        if max_teams < 0 {
            return Err(AppError::ValidationError(
                "Team limits cannot be negative".to_string(),
            ));
        }
        let teams = state.store.count_teams(event.id, None).await?;
        event.max_teams = Some(max_teams);
        event.team_slots_left = Some((max_teams as i64 - teams).max(0) as i32);
    }
    Ok(())
}

pub async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Organizer])?;
    let event = state
        .store
        .event_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    if event.organizer_id != auth.0.user_id {
        return Err(AppError::Forbidden(
            "You can only delete your own events".to_string(),
        ));
    }

    let removed_tickets = state.store.delete_event(id).await?;
    Ok(success(
        serde_json::json!({
            "deleted_event": { "id": event.id, "name": event.name },
            "removed_tickets": removed_tickets,
        }),
        "Event and associated registrations deleted successfully",
    ))
}

pub async fn publish_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Organizer])?;
    let mut event = state
        .store
        .event_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    if event.organizer_id != auth.0.user_id {
        return Err(AppError::Forbidden(
            "You can only publish your own events".to_string(),
        ));
    }
    if event.status != EventStatus::Draft {
        return Err(AppError::StateConflict(
            "Only events in Draft status can be published".to_string(),
        ));
    }

    event.status = EventStatus::Published;
    event.updated_at = Utc::now();
    state.store.update_event(&event).await?;

    if let Some(organizer) = state.store.user_by_id(event.organizer_id).await? {
        if let Some(webhook) = organizer.discord_webhook {
            discord::announce_event(webhook, &event);
        }
    }

    Ok(success(event, "Event published successfully"))
}

/// Registration and merch purchase share this path; the engine picks the
/// seat or stock counter from the event kind.
pub async fn register_for_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Participant])?;
    let event = state
        .store
        .event_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let ticket = state
        .engine
        .issuer
        .register(auth.0.user_id, &event, req.answers)
        .await?;

    // The ticket id doubles as the QR payload; rendering is a client
    // concern and delivery never gates admission.
    let action = match event.kind {
        EventKind::Merch => "purchased",
        EventKind::Normal => "registered for",
    };
    send_in_background(
        state.notifier.clone(),
        auth.0.email.clone(),
        format!("Registration Confirmed - {}", event.name),
        format!(
            "You have successfully {} {}.\n\nTicket ID (QR payload): {}\n\nShow this at \
             the entrance for verification.",
            action, event.name, ticket.id
        ),
    );

    Ok(created(ticket, "Registration successful"))
}

pub async fn cancel_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Participant])?;
    let ticket = state.engine.issuer.cancel(auth.0.user_id, id).await?;

    send_in_background(
        state.notifier.clone(),
        auth.0.email.clone(),
        "Registration Cancelled".to_string(),
        format!(
            "Your registration has been cancelled.\n\nTicket ID: {}",
            ticket.id
        ),
    );

    Ok(success(
        serde_json::json!({ "ticket_id": ticket.id }),
        "Registration cancelled successfully",
    ))
}

#[derive(Serialize)]
struct ParticipantEntry {
    ticket_id: Uuid,
    user: serde_json::Value,
    answers: Vec<Answer>,
    status: crate::models::TicketStatus,
    checked_in: bool,
    registered_at: DateTime<Utc>,
}

pub async fn participants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Organizer])?;
    let event = owned_event(&state, id, auth.0.user_id).await?;

    let tickets = state.store.tickets_for_event(event.id).await?;
    let mut entries = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        let user = state.store.user_by_id(ticket.user_id).await?;
        entries.push(ParticipantEntry {
            ticket_id: ticket.id,
            user: match user {
                Some(u) => serde_json::json!({ "name": u.name, "email": u.email }),
                None => serde_json::json!({ "name": "Unknown", "email": "Unknown" }),
            },
            answers: ticket.answers,
            status: ticket.status,
            checked_in: ticket.checked_in,
            registered_at: ticket.registered_at,
        });
    }

    let count = entries.len();
    Ok(success(
        serde_json::json!({
            "participants": entries,
            "count": count,
            "event_name": event.name,
            "max_participants": event.max_participants,
        }),
        "Participants",
    ))
}

pub async fn analytics(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Organizer])?;
    let event = owned_event(&state, id, auth.0.user_id).await?;

    let tickets = state.store.tickets_for_event(event.id).await?;
    let confirmed = tickets
        .iter()
        .filter(|t| t.status == crate::models::TicketStatus::Confirmed)
        .count() as i64;
    let attendance = tickets.iter().filter(|t| t.checked_in).count() as i64;
    let revenue = event.price * Decimal::from(confirmed);

    let team_stats = if event.is_team_event {
        let total = state.store.count_teams(event.id, None).await?;
        let complete = state
            .store
            .count_teams(event.id, Some(TeamStatus::Complete))
            .await?;
        Some(serde_json::json!({ "total_teams": total, "complete_teams": complete }))
    } else {
        None
    };

    let trend = registration_trend(&tickets);

    let attendance_rate = if confirmed > 0 {
        (attendance as f64 / confirmed as f64) * 100.0
    } else {
        0.0
    };

    Ok(success(
        serde_json::json!({
            "overview": {
                "total_registrations": confirmed,
                "total_revenue": revenue,
                "total_attendance": attendance,
                "capacity": event.max_participants,
                "attendance_rate": format!("{attendance_rate:.1}"),
            },
            "team_stats": team_stats,
            "registration_trend": trend,
            "event_name": event.name,
            "status": event.status,
        }),
        "Event analytics",
    ))
}

/// Registrations per day over the trailing week.
fn registration_trend(tickets: &[Ticket]) -> Vec<serde_json::Value> {
    (0..7)
        .rev()
        .map(|offset| {
            let day = (Utc::now() - Duration::days(offset)).date_naive();
            let count = tickets
                .iter()
                .filter(|t| t.registered_at.date_naive() == day)
                .count();
            serde_json::json!({ "date": day.format("%b %d").to_string(), "count": count })
        })
        .collect()
}

#[derive(Serialize)]
struct RegistrationView {
    ticket: Ticket,
    event: Event,
}

pub async fn my_registrations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Participant])?;
    let tickets = state.store.tickets_for_user(auth.0.user_id).await?;
    let mut registrations = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        if let Some(event) = state.store.event_by_id(ticket.event_id).await? {
            registrations.push(RegistrationView { ticket, event });
        }
    }
    let count = registrations.len();
    Ok(success(
        serde_json::json!({ "registrations": registrations, "count": count }),
        "Your registrations",
    ))
}

/// Feedback is anonymous, but gated on having actually attended: only a
/// checked-in Confirmed ticket for a Completed event may submit, and only
/// once. The once-only flip is a CAS on the ticket so a double submit
/// cannot produce two feedback rows.
pub async fn submit_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Participant])?;
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::ValidationError(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    let event = state
        .store
        .event_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    if event.status != EventStatus::Completed {
        return Err(AppError::StateConflict(
            "Feedback can only be submitted for completed events".to_string(),
        ));
    }
    let ticket = state
        .store
        .confirmed_ticket(auth.0.user_id, event.id)
        .await?
        .filter(|t| t.checked_in)
        .ok_or_else(|| {
            AppError::Forbidden(
                "You must attend (check in at) the event to leave feedback".to_string(),
            )
        })?;

    if !state.store.mark_feedback_given(ticket.id).await? {
        return Err(AppError::StateConflict(
            "Feedback already submitted for this event".to_string(),
        ));
    }
    let feedback = Feedback {
        id: Uuid::new_v4(),
        event_id: event.id,
        rating: req.rating,
        comment: req.comment,
        created_at: Utc::now(),
    };
    state.store.insert_feedback(&feedback).await?;

    Ok(created(
        serde_json::json!({ "rating": feedback.rating }),
        "Feedback submitted successfully",
    ))
}

pub async fn feedback_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    auth.require_role(&[Role::Organizer])?;
    let event = owned_event(&state, id, auth.0.user_id).await?;

    let feedback = state.store.feedback_for_event(event.id).await?;
    let total = feedback.len();
    let sum: i64 = feedback.iter().map(|f| f.rating as i64).sum();
    let average = if total > 0 {
        format!("{:.1}", sum as f64 / total as f64)
    } else {
        "0".to_string()
    };
    let mut distribution = [0usize; 5];
    for f in &feedback {
        if (1..=5).contains(&f.rating) {
            distribution[(f.rating - 1) as usize] += 1;
        }
    }

    Ok(success(
        serde_json::json!({
            "total": total,
            "average": average,
            "distribution": {
                "1": distribution[0],
                "2": distribution[1],
                "3": distribution[2],
                "4": distribution[3],
                "5": distribution[4],
            },
            "feedback": feedback,
        }),
        "Event feedback",
    ))
}

async fn owned_event(
    state: &AppState,
    event_id: Uuid,
    organizer_id: Uuid,
) -> Result<Event, AppError> {
    let event = state
        .store
        .event_by_id(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    if event.organizer_id != organizer_id {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }
    Ok(event)
}
