//! Allocation-engine properties: capacity and stock bounds hold under
//! concurrency, admission is idempotent, deadlines gate, and cancellation
//! restores the counters.

mod common;

use chrono::{Duration, Utc};
use festra_server::engine::EngineError;
use festra_server::models::{Answer, EventKind, FieldKind, FormField, Role, TicketStatus};
use festra_server::store::Store;
use futures::future::join_all;
use serde_json::json;

use common::{engine, seed_event, seed_participant, seed_user};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_never_exceed_capacity() {
    let (eng, store) = engine();
    let organizer = seed_user(&store, "Org", "org@example.com", Role::Organizer).await;
    let event = seed_event(&store, organizer.id, |e| {
        e.max_participants = Some(3);
    })
    .await;

    let mut users = Vec::new();
    for i in 0..20 {
        users.push(seed_participant(&store, &format!("user{i}")).await);
    }

    let handles: Vec<_> = users
        .iter()
        .map(|user| {
            let eng = eng.clone();
            let event = event.clone();
            let user_id = user.id;
            tokio::spawn(async move { eng.issuer.register(user_id, &event, Vec::new()).await })
        })
        .collect();

    let results = join_all(handles).await;
    let mut admitted = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => admitted += 1,
            Err(EngineError::CapacityExceeded(_)) => {}
            Err(other) => panic!("unexpected rejection: {other}"),
        }
    }
    assert_eq!(admitted, 3);
    assert_eq!(store.count_confirmed_tickets(event.id).await.unwrap(), 3);
    let event = store.event_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(event.seats_left, Some(0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_purchases_never_drive_stock_negative() {
    let (eng, store) = engine();
    let organizer = seed_user(&store, "Org", "org@example.com", Role::Organizer).await;
    let event = seed_event(&store, organizer.id, |e| {
        e.kind = EventKind::Merch;
        e.stock = Some(2);
    })
    .await;

    let mut buyers = Vec::new();
    for i in 0..10 {
        buyers.push(seed_participant(&store, &format!("buyer{i}")).await);
    }

    let handles: Vec<_> = buyers
        .iter()
        .map(|buyer| {
            let eng = eng.clone();
            let event = event.clone();
            let user_id = buyer.id;
            tokio::spawn(async move { eng.issuer.register(user_id, &event, Vec::new()).await })
        })
        .collect();

    let purchased = join_all(handles)
        .await
        .into_iter()
        .filter(|r| matches!(r, Ok(Ok(_))))
        .count();
    assert_eq!(purchased, 2);

    let after = store.event_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(after.stock, Some(0));

    // stock_after = initial - confirmed + cancelled
    let mut victim = None;
    for buyer in &buyers {
        if store
            .confirmed_ticket(buyer.id, event.id)
            .await
            .unwrap()
            .is_some()
        {
            victim = Some(buyer.id);
            break;
        }
    }
    eng.issuer.cancel(victim.unwrap(), event.id).await.unwrap();
    let after = store.event_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(after.stock, Some(1));
    assert_eq!(store.count_confirmed_tickets(event.id).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_registration_is_idempotent() {
    let (eng, store) = engine();
    let organizer = seed_user(&store, "Org", "org@example.com", Role::Organizer).await;
    let event = seed_event(&store, organizer.id, |e| {
        e.max_participants = Some(10);
    })
    .await;
    let user = seed_participant(&store, "dupe").await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let eng = eng.clone();
            let event = event.clone();
            let user_id = user.id;
            tokio::spawn(async move { eng.issuer.register(user_id, &event, Vec::new()).await })
        })
        .collect();

    let mut admitted = 0;
    let mut duplicates = 0;
    for result in join_all(handles).await {
        match result.unwrap() {
            Ok(_) => admitted += 1,
            Err(EngineError::AlreadyRegistered(_)) => duplicates += 1,
            Err(other) => panic!("unexpected rejection: {other}"),
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(store.count_confirmed_tickets(event.id).await.unwrap(), 1);

    // Exactly one seat was consumed; the losing attempts handed theirs back.
    let event = store.event_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(event.seats_left, Some(9));
}

#[tokio::test]
async fn registration_closes_at_the_deadline() {
    let (eng, store) = engine();
    let organizer = seed_user(&store, "Org", "org@example.com", Role::Organizer).await;
    let event = seed_event(&store, organizer.id, |e| {
        e.max_participants = Some(100);
        e.registration_deadline = Utc::now() - Duration::hours(1);
    })
    .await;
    let user = seed_participant(&store, "late").await;

    let err = eng
        .issuer
        .register(user.id, &event, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::StateConflict(_)));
    assert_eq!(store.count_confirmed_tickets(event.id).await.unwrap(), 0);
}

#[tokio::test]
async fn draft_events_reject_registration() {
    let (eng, store) = engine();
    let organizer = seed_user(&store, "Org", "org@example.com", Role::Organizer).await;
    let event = seed_event(&store, organizer.id, |e| {
        e.status = festra_server::models::EventStatus::Draft;
    })
    .await;
    let user = seed_participant(&store, "early").await;

    let err = eng
        .issuer
        .register(user.id, &event, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::StateConflict(_)));
}

#[tokio::test]
async fn cancellation_round_trip_restores_counters() {
    let (eng, store) = engine();
    let organizer = seed_user(&store, "Org", "org@example.com", Role::Organizer).await;
    let event = seed_event(&store, organizer.id, |e| {
        e.max_participants = Some(1);
    })
    .await;
    let user = seed_participant(&store, "flaky").await;

    eng.issuer.register(user.id, &event, Vec::new()).await.unwrap();
    let full = store.event_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(full.seats_left, Some(0));

    let cancelled = eng.issuer.cancel(user.id, event.id).await.unwrap();
    assert_eq!(cancelled.status, TicketStatus::Cancelled);
    let free = store.event_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(free.seats_left, Some(1));

    // Re-registering the same user succeeds; the cancelled row stays.
    eng.issuer.register(user.id, &event, Vec::new()).await.unwrap();
    let tickets = store.tickets_for_user(user.id).await.unwrap();
    assert_eq!(tickets.len(), 2);
    assert_eq!(
        tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Confirmed)
            .count(),
        1
    );
}

#[tokio::test]
async fn cancelling_twice_reports_not_registered() {
    let (eng, store) = engine();
    let organizer = seed_user(&store, "Org", "org@example.com", Role::Organizer).await;
    let event = seed_event(&store, organizer.id, |e| {
        e.kind = EventKind::Merch;
        e.stock = Some(5);
    })
    .await;
    let user = seed_participant(&store, "undecided").await;

    eng.issuer.register(user.id, &event, Vec::new()).await.unwrap();
    eng.issuer.cancel(user.id, event.id).await.unwrap();
    let err = eng.issuer.cancel(user.id, event.id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    // The double cancel must not refund a second unit.
    let event = store.event_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(event.stock, Some(5));
}

#[tokio::test]
async fn missing_required_answers_leave_no_trace() {
    let (eng, store) = engine();
    let organizer = seed_user(&store, "Org", "org@example.com", Role::Organizer).await;
    let event = seed_event(&store, organizer.id, |e| {
        e.max_participants = Some(5);
        e.form_fields = vec![FormField {
            name: "t_shirt_size".to_string(),
            label: "T-shirt size".to_string(),
            kind: FieldKind::Select,
            required: true,
            options: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            placeholder: None,
        }];
    })
    .await;
    let user = seed_participant(&store, "forgetful").await;

    let err = eng
        .issuer
        .register(user.id, &event, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(store.count_confirmed_tickets(event.id).await.unwrap(), 0);
    let event_after = store.event_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(event_after.seats_left, Some(5));

    // An empty-string answer does not satisfy a required field either.
    let err = eng
        .issuer
        .register(
            user.id,
            &event,
            vec![Answer {
                label: "T-shirt size".to_string(),
                value: json!(""),
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    eng.issuer
        .register(
            user.id,
            &event,
            vec![Answer {
                label: "T-shirt size".to_string(),
                value: json!("M"),
            }],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn unlimited_capacity_admits_everyone() {
    let (eng, store) = engine();
    let organizer = seed_user(&store, "Org", "org@example.com", Role::Organizer).await;
    let event = seed_event(&store, organizer.id, |e| {
        e.max_participants = None;
    })
    .await;

    for i in 0..25 {
        let user = seed_participant(&store, &format!("walkin{i}")).await;
        eng.issuer.register(user.id, &event, Vec::new()).await.unwrap();
    }
    assert_eq!(store.count_confirmed_tickets(event.id).await.unwrap(), 25);
}
