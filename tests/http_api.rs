//! End-to-end HTTP flows through the router, in-memory store behind it.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use festra_server::models::Role;
use festra_server::routes::create_routes;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{app_state, seed_user, TEST_PASSWORD};

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn event_body(max_participants: Option<i64>) -> Value {
    let now = Utc::now();
    json!({
        "name": "Hack Night",
        "description": "An all-night build session",
        "start_at": (now + Duration::days(7)).to_rfc3339(),
        "end_at": (now + Duration::days(8)).to_rfc3339(),
        "registration_deadline": (now + Duration::days(5)).to_rfc3339(),
        "max_participants": max_participants,
    })
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn register_participant(app: &Router, name: &str, email: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_needs_no_auth_but_the_api_does() {
    let (state, _store) = app_state();
    let app = create_routes(state);

    let (status, body) = request(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = request(&app, "GET", "/api/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn capacity_bounded_registration_flow() {
    let (state, store) = app_state();
    seed_user(&store, "Org", "org@example.com", Role::Organizer).await;
    let app = create_routes(state);
    let org_token = login(&app, "org@example.com").await;

    // Draft, then publish.
    let (status, body) = request(
        &app,
        "POST",
        "/api/events",
        Some(&org_token),
        Some(event_body(Some(2))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "Draft");

    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/events/{event_id}/publish"),
        Some(&org_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Published");

    // Two seats, three contenders.
    let alice = register_participant(&app, "Alice", "alice@example.com").await;
    let bob = register_participant(&app, "Bob", "bob@example.com").await;
    let cara = register_participant(&app, "Cara", "cara@example.com").await;

    let register_uri = format!("/api/events/{event_id}/register");
    let (status, body) = request(
        &app,
        "POST",
        &register_uri,
        Some(&alice),
        Some(json!({ "answers": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "Confirmed");

    // Registering twice is an idempotent conflict, not a second row.
    let (status, body) = request(
        &app,
        "POST",
        &register_uri,
        Some(&alice),
        Some(json!({ "answers": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ALREADY_REGISTERED");

    let (status, _) = request(
        &app,
        "POST",
        &register_uri,
        Some(&bob),
        Some(json!({ "answers": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(
        &app,
        "POST",
        &register_uri,
        Some(&cara),
        Some(json!({ "answers": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CAPACITY_EXCEEDED");

    // A cancellation frees the seat for the loser.
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/events/{event_id}/cancel"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        "POST",
        &register_uri,
        Some(&cara),
        Some(json!({ "answers": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn checkin_and_feedback_lifecycle() {
    let (state, store) = app_state();
    seed_user(&store, "Org", "org@example.com", Role::Organizer).await;
    let app = create_routes(state);
    let org_token = login(&app, "org@example.com").await;

    let (_, body) = request(
        &app,
        "POST",
        "/api/events",
        Some(&org_token),
        Some(event_body(None)),
    )
    .await;
    let event_id = body["data"]["id"].as_str().unwrap().to_string();
    request(
        &app,
        "PATCH",
        &format!("/api/events/{event_id}/publish"),
        Some(&org_token),
        None,
    )
    .await;

    let dana = register_participant(&app, "Dana", "dana@example.com").await;
    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/events/{event_id}/register"),
        Some(&dana),
        Some(json!({ "answers": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let ticket_id = body["data"]["id"].as_str().unwrap().to_string();

    // Feedback before attending is rejected.
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/events/{event_id}/feedback"),
        Some(&dana),
        Some(json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Organizer scans the ticket at the door.
    let (status, body) = request(
        &app,
        "POST",
        "/api/tickets/scan",
        Some(&org_token),
        Some(json!({ "ticket_id": ticket_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checked_in"], true);

    // Double scan reports the reuse.
    let (status, body) = request(
        &app,
        "POST",
        "/api/tickets/scan",
        Some(&org_token),
        Some(json!({ "ticket_id": ticket_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "STATE_CONFLICT");

    // Drive the event to Completed through the transition table.
    for next in ["Ongoing", "Completed"] {
        let (status, _) = request(
            &app,
            "PUT",
            &format!("/api/events/{event_id}"),
            Some(&org_token),
            Some(json!({ "status": next })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/events/{event_id}/feedback"),
        Some(&dana),
        Some(json!({ "rating": 5, "comment": "Great event" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Only once per ticket.
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/events/{event_id}/feedback"),
        Some(&dana),
        Some(json!({ "rating": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/events/{event_id}/feedback"),
        Some(&org_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["average"], "5.0");
}

#[tokio::test]
async fn illegal_status_jumps_are_rejected() {
    let (state, store) = app_state();
    seed_user(&store, "Org", "org@example.com", Role::Organizer).await;
    let app = create_routes(state);
    let org_token = login(&app, "org@example.com").await;

    let (_, body) = request(
        &app,
        "POST",
        "/api/events",
        Some(&org_token),
        Some(event_body(None)),
    )
    .await;
    let event_id = body["data"]["id"].as_str().unwrap().to_string();

    // Draft cannot jump straight to Ongoing.
    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/events/{event_id}"),
        Some(&org_token),
        Some(json!({ "status": "Ongoing" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "STATE_CONFLICT");

    // Publishing twice is rejected the same way.
    request(
        &app,
        "PATCH",
        &format!("/api/events/{event_id}/publish"),
        Some(&org_token),
        None,
    )
    .await;
    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/events/{event_id}/publish"),
        Some(&org_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
