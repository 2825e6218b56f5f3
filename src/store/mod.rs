pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Event, EventStatus, Feedback, Team, TeamStatus, Ticket, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Which bounded counter a reservation claims against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Individual participant capacity (`seats_left`).
    Seat,
    /// Merchandise stock units (`stock`).
    Stock,
    /// Team slots (`team_slots_left`).
    TeamSlot,
}

/// Result of an atomic decrement-if-positive on a capacity counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Counter was positive and is now one lower.
    Claimed,
    /// Counter is NULL: the resource is unbounded, nothing was decremented.
    Unbounded,
    /// Counter was zero.
    Exhausted,
    /// The event row no longer exists.
    Missing,
}

#[derive(Debug)]
pub enum TicketInsert {
    Inserted(Ticket),
    /// A Confirmed ticket for this `(user, event)` already exists.
    DuplicateConfirmed,
}

#[derive(Debug)]
pub enum CheckInOutcome {
    CheckedIn(Ticket),
    AlreadyCheckedIn,
    /// The ticket is not in Confirmed status (e.g. it was cancelled).
    NotConfirmed,
}

#[derive(Debug)]
pub enum TeamInsert {
    Inserted(Team),
    /// The generated join code collided with an existing team.
    CodeTaken,
}

#[derive(Debug)]
pub enum JoinOutcome {
    Joined {
        team: Team,
        /// True exactly once per team: the append that first reached the
        /// minimum size and flipped Forming -> Complete.
        completed_now: bool,
    },
    Full,
    AlreadyMember,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub organizer_id: Option<Uuid>,
    pub status: Option<EventStatus>,
}

/// Storage seam for the allocation engine. Every method must be
/// linearizable with respect to the others: the conditional-update
/// primitives (`claim_slot`, `insert_ticket`, `join_team`, the CAS ticket
/// updates) are the only defense against concurrent oversubscription.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    // Users
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// All accounts registered under an email. Guests may share one, so
    /// this is a scan, not a unique lookup.
    async fn users_by_email(&self, email: &str) -> Result<Vec<User>, StoreError>;

    // Events
    async fn insert_event(&self, event: &Event) -> Result<(), StoreError>;
    async fn event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError>;
    /// Whole-row update for organizer edits. Single-writer in practice;
    /// the capacity counters are still only moved via `claim_slot` /
    /// `release_slot` during registration traffic.
    async fn update_event(&self, event: &Event) -> Result<(), StoreError>;
    /// Deletes the event together with its tickets and teams. Returns the
    /// number of tickets removed.
    async fn delete_event(&self, id: Uuid) -> Result<u64, StoreError>;
    async fn list_events(&self, filter: EventFilter) -> Result<Vec<Event>, StoreError>;

    // Capacity counters
    async fn claim_slot(&self, event_id: Uuid, kind: SlotKind) -> Result<ClaimOutcome, StoreError>;
    /// Atomic increment; a no-op when the counter is unbounded.
    async fn release_slot(&self, event_id: Uuid, kind: SlotKind) -> Result<(), StoreError>;

    // Tickets
    async fn insert_ticket(&self, ticket: &Ticket) -> Result<TicketInsert, StoreError>;
    async fn ticket_by_id(&self, id: Uuid) -> Result<Option<Ticket>, StoreError>;
    async fn confirmed_ticket(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Ticket>, StoreError>;
    async fn tickets_for_event(&self, event_id: Uuid) -> Result<Vec<Ticket>, StoreError>;
    async fn tickets_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError>;
    async fn count_confirmed_tickets(&self, event_id: Uuid) -> Result<i64, StoreError>;
    /// CAS Confirmed -> Cancelled. Returns the updated ticket, or None when
    /// no Confirmed ticket exists for the pair.
    async fn cancel_ticket(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Ticket>, StoreError>;
    /// CAS on `checked_in`, guarded on Confirmed status.
    async fn check_in_ticket(&self, ticket_id: Uuid) -> Result<CheckInOutcome, StoreError>;
    /// CAS on `feedback_given`. Returns false when it was already set.
    async fn mark_feedback_given(&self, ticket_id: Uuid) -> Result<bool, StoreError>;

    // Teams
    async fn insert_team(&self, team: &Team) -> Result<TeamInsert, StoreError>;
    async fn team_by_id(&self, id: Uuid) -> Result<Option<Team>, StoreError>;
    async fn team_by_code(&self, code: &str) -> Result<Option<Team>, StoreError>;
    /// The team (if any) the user belongs to for this event, as leader or
    /// member.
    async fn team_for_member(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Team>, StoreError>;
    async fn count_teams(
        &self,
        event_id: Uuid,
        status: Option<TeamStatus>,
    ) -> Result<i64, StoreError>;
    /// Atomic member append: rejects duplicates and full teams, and performs
    /// the one-shot Forming -> Complete transition when the appended
    /// membership first reaches `min_size`, all in a single conditional
    /// update.
    async fn join_team(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        min_size: i32,
        max_size: i32,
    ) -> Result<JoinOutcome, StoreError>;

    // Feedback
    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), StoreError>;
    async fn feedback_for_event(&self, event_id: Uuid) -> Result<Vec<Feedback>, StoreError>;
}
