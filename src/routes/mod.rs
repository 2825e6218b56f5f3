use axum::routing::{get, patch, post};
use axum::Router;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{auth, events, health_check, teams, tickets};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route(
            "/events",
            post(events::create_event).get(events::list_events),
        )
        .route("/events/my-registrations", get(events::my_registrations))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/publish", patch(events::publish_event))
        .route("/events/:id/register", post(events::register_for_event))
        .route("/events/:id/cancel", post(events::cancel_registration))
        .route("/events/:id/participants", get(events::participants))
        .route("/events/:id/analytics", get(events::analytics))
        .route(
            "/events/:id/feedback",
            post(events::submit_feedback).get(events::feedback_summary),
        )
        .route("/teams/create", post(teams::create_team))
        .route("/teams/join", post(teams::join_team))
        .route("/teams/my-team/:event_id", get(teams::my_team))
        .route("/tickets/scan", post(tickets::scan_ticket))
        .route("/tickets/:id", get(tickets::get_ticket));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
