//! In-memory store. Backs the integration tests and local development
//! without a database. The single mutex makes every operation trivially
//! linearizable, which is exactly the contract the engine's conditional
//! updates rely on.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::{Event, Feedback, Team, TeamStatus, Ticket, TicketStatus, User};

use super::{
    CheckInOutcome, ClaimOutcome, EventFilter, JoinOutcome, SlotKind, Store, StoreError,
    TeamInsert, TicketInsert,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    events: HashMap<Uuid, Event>,
    teams: HashMap<Uuid, Team>,
    tickets: HashMap<Uuid, Ticket>,
    feedback: Vec<Feedback>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means some test panicked mid-operation;
        // the data itself is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn counter_mut(event: &mut Event, kind: SlotKind) -> &mut Option<i32> {
    match kind {
        SlotKind::Seat => &mut event.seats_left,
        SlotKind::Stock => &mut event.stock,
        SlotKind::TeamSlot => &mut event.team_slots_left,
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.lock().users.insert(user.id, user.clone());
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn users_by_email(&self, email: &str) -> Result<Vec<User>, StoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .filter(|u| u.email == email)
            .cloned()
            .collect())
    }

    async fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        self.lock().events.insert(event.id, event.clone());
        Ok(())
    }

    async fn event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.lock().events.get(&id).cloned())
    }

    async fn update_event(&self, event: &Event) -> Result<(), StoreError> {
        self.lock().events.insert(event.id, event.clone());
        Ok(())
    }

    async fn delete_event(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut state = self.lock();
        state.events.remove(&id);
        state.teams.retain(|_, t| t.event_id != id);
        let before = state.tickets.len();
        state.tickets.retain(|_, t| t.event_id != id);
        Ok((before - state.tickets.len()) as u64)
    }

    async fn list_events(&self, filter: EventFilter) -> Result<Vec<Event>, StoreError> {
        let state = self.lock();
        let mut events: Vec<Event> = state
            .events
            .values()
            .filter(|e| filter.organizer_id.map_or(true, |o| e.organizer_id == o))
            .filter(|e| filter.status.map_or(true, |s| e.status == s))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    async fn claim_slot(&self, event_id: Uuid, kind: SlotKind) -> Result<ClaimOutcome, StoreError> {
        let mut state = self.lock();
        let Some(event) = state.events.get_mut(&event_id) else {
            return Ok(ClaimOutcome::Missing);
        };
        match counter_mut(event, kind) {
            None => Ok(ClaimOutcome::Unbounded),
            Some(n) if *n > 0 => {
                *n -= 1;
                Ok(ClaimOutcome::Claimed)
            }
            Some(_) => Ok(ClaimOutcome::Exhausted),
        }
    }

    async fn release_slot(&self, event_id: Uuid, kind: SlotKind) -> Result<(), StoreError> {
        let mut state = self.lock();
        if let Some(event) = state.events.get_mut(&event_id) {
            if let Some(n) = counter_mut(event, kind) {
                *n += 1;
            }
        }
        Ok(())
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> Result<TicketInsert, StoreError> {
        let mut state = self.lock();
        let duplicate = state.tickets.values().any(|t| {
            t.user_id == ticket.user_id
                && t.event_id == ticket.event_id
                && t.status == TicketStatus::Confirmed
        });
        if duplicate {
            return Ok(TicketInsert::DuplicateConfirmed);
        }
        state.tickets.insert(ticket.id, ticket.clone());
        Ok(TicketInsert::Inserted(ticket.clone()))
    }

    async fn ticket_by_id(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        Ok(self.lock().tickets.get(&id).cloned())
    }

    async fn confirmed_ticket(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Ticket>, StoreError> {
        Ok(self
            .lock()
            .tickets
            .values()
            .find(|t| {
                t.user_id == user_id
                    && t.event_id == event_id
                    && t.status == TicketStatus::Confirmed
            })
            .cloned())
    }

    async fn tickets_for_event(&self, event_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let mut tickets: Vec<Ticket> = self
            .lock()
            .tickets
            .values()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
        Ok(tickets)
    }

    async fn tickets_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let mut tickets: Vec<Ticket> = self
            .lock()
            .tickets
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
        Ok(tickets)
    }

    async fn count_confirmed_tickets(&self, event_id: Uuid) -> Result<i64, StoreError> {
        Ok(self
            .lock()
            .tickets
            .values()
            .filter(|t| t.event_id == event_id && t.status == TicketStatus::Confirmed)
            .count() as i64)
    }

    async fn cancel_ticket(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Ticket>, StoreError> {
        let mut state = self.lock();
        let ticket = state.tickets.values_mut().find(|t| {
            t.user_id == user_id && t.event_id == event_id && t.status == TicketStatus::Confirmed
        });
        Ok(ticket.map(|t| {
            t.status = TicketStatus::Cancelled;
            t.updated_at = Utc::now();
            t.clone()
        }))
    }

    async fn check_in_ticket(&self, ticket_id: Uuid) -> Result<CheckInOutcome, StoreError> {
        let mut state = self.lock();
        let Some(ticket) = state.tickets.get_mut(&ticket_id) else {
            return Ok(CheckInOutcome::NotConfirmed);
        };
        if ticket.status != TicketStatus::Confirmed {
            return Ok(CheckInOutcome::NotConfirmed);
        }
        if ticket.checked_in {
            return Ok(CheckInOutcome::AlreadyCheckedIn);
        }
        ticket.checked_in = true;
        ticket.check_in_time = Some(Utc::now());
        ticket.updated_at = Utc::now();
        Ok(CheckInOutcome::CheckedIn(ticket.clone()))
    }

    async fn mark_feedback_given(&self, ticket_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.lock();
        match state.tickets.get_mut(&ticket_id) {
            Some(t) if !t.feedback_given => {
                t.feedback_given = true;
                t.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_team(&self, team: &Team) -> Result<TeamInsert, StoreError> {
        let mut state = self.lock();
        if state.teams.values().any(|t| t.code == team.code) {
            return Ok(TeamInsert::CodeTaken);
        }
        state.teams.insert(team.id, team.clone());
        Ok(TeamInsert::Inserted(team.clone()))
    }

    async fn team_by_id(&self, id: Uuid) -> Result<Option<Team>, StoreError> {
        Ok(self.lock().teams.get(&id).cloned())
    }

    async fn team_by_code(&self, code: &str) -> Result<Option<Team>, StoreError> {
        Ok(self
            .lock()
            .teams
            .values()
            .find(|t| t.code == code)
            .cloned())
    }

    async fn team_for_member(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Team>, StoreError> {
        Ok(self
            .lock()
            .teams
            .values()
            .find(|t| {
                t.event_id == event_id
                    && (t.leader_id == user_id || t.members.contains(&user_id))
            })
            .cloned())
    }

    async fn count_teams(
        &self,
        event_id: Uuid,
        status: Option<TeamStatus>,
    ) -> Result<i64, StoreError> {
        Ok(self
            .lock()
            .teams
            .values()
            .filter(|t| t.event_id == event_id && status.map_or(true, |s| t.status == s))
            .count() as i64)
    }

    async fn join_team(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        min_size: i32,
        max_size: i32,
    ) -> Result<JoinOutcome, StoreError> {
        let mut state = self.lock();
        let Some(team) = state.teams.get_mut(&team_id) else {
            return Err(StoreError::Corrupt(format!("team {team_id} vanished")));
        };
        if team.members.contains(&user_id) {
            return Ok(JoinOutcome::AlreadyMember);
        }
        if team.members.len() as i32 >= max_size {
            return Ok(JoinOutcome::Full);
        }
        team.members.push(user_id);
        team.updated_at = Utc::now();
        let completed_now =
            team.status == TeamStatus::Forming && team.members.len() as i32 >= min_size;
        if completed_now {
            team.status = TeamStatus::Complete;
        }
        Ok(JoinOutcome::Joined {
            team: team.clone(),
            completed_now,
        })
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), StoreError> {
        self.lock().feedback.push(feedback.clone());
        Ok(())
    }

    async fn feedback_for_event(&self, event_id: Uuid) -> Result<Vec<Feedback>, StoreError> {
        Ok(self
            .lock()
            .feedback
            .iter()
            .filter(|f| f.event_id == event_id)
            .cloned()
            .collect())
    }
}
