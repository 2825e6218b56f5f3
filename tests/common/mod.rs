#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use festra_server::auth::password;
use festra_server::config::Config;
use festra_server::engine::Engine;
use festra_server::models::{
    Eligibility, Event, EventKind, EventStatus, Role, User,
};
use festra_server::notify::ResendMailer;
use festra_server::state::AppState;
use festra_server::store::MemoryStore;
use festra_server::store::Store;

pub const TEST_PASSWORD: &str = "secret123";

pub fn engine() -> (Engine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Engine::new(store.clone()), store)
}

pub fn app_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let mailer = ResendMailer::new(None, "test@festra.dev".to_string());
    let state = AppState::new(store.clone(), Arc::new(mailer), Config::for_tests());
    (state, store)
}

pub async fn seed_user(store: &Arc<MemoryStore>, name: &str, email: &str, role: Role) -> User {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: password::hash(TEST_PASSWORD),
        role,
        is_institute: false,
        first_name: None,
        last_name: None,
        contact_number: None,
        college: None,
        discord_webhook: None,
        created_at: now,
        updated_at: now,
    };
    store.insert_user(&user).await.unwrap();
    user
}

pub async fn seed_participant(store: &Arc<MemoryStore>, name: &str) -> User {
    let email = format!("{}@example.com", name.to_lowercase());
    seed_user(store, name, &email, Role::Participant).await
}

/// A published event a week out with an open deadline; tweak through the
/// closure. Remaining counters default to their bounds.
pub async fn seed_event<F>(store: &Arc<MemoryStore>, organizer_id: Uuid, customize: F) -> Event
where
    F: FnOnce(&mut Event),
{
    let now = Utc::now();
    let mut event = Event {
        id: Uuid::new_v4(),
        organizer_id,
        name: "Robotics Workshop".to_string(),
        description: "Hands-on build session".to_string(),
        kind: EventKind::Normal,
        is_team_event: false,
        min_team_size: 1,
        max_team_size: 1,
        max_teams: None,
        team_slots_left: None,
        start_at: now + Duration::days(7),
        end_at: now + Duration::days(8),
        registration_deadline: now + Duration::days(5),
        tags: Vec::new(),
        form_fields: Vec::new(),
        max_participants: None,
        seats_left: None,
        price: Decimal::ZERO,
        stock: None,
        eligibility: Eligibility::All,
        status: EventStatus::Published,
        created_at: now,
        updated_at: now,
    };
    customize(&mut event);
    if event.seats_left.is_none() {
        event.seats_left = event.max_participants;
    }
    if event.team_slots_left.is_none() {
        event.team_slots_left = event.max_teams;
    }
    store.insert_event(&event).await.unwrap();
    event
}
