//! Postgres store. The capacity counters and uniqueness rules live in the
//! database: conditional `UPDATE ... WHERE` statements for the counters,
//! a partial unique index for the one-live-ticket rule, and a unique index
//! for team codes. A losing writer gets a definitive zero-row result or
//! conflict instead of a silently duplicated admission.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, QueryBuilder};
use uuid::Uuid;

use crate::models::{
    Answer, Eligibility, Event, EventKind, EventStatus, Feedback, FormField, Role, Team,
    TeamStatus, Ticket, TicketStatus, User,
};

use super::{
    CheckInOutcome, ClaimOutcome, EventFilter, JoinOutcome, SlotKind, Store, StoreError,
    TeamInsert, TicketInsert,
};

const USER_COLS: &str = "id, name, email, password_hash, role, is_institute, first_name, \
                         last_name, contact_number, college, discord_webhook, created_at, \
                         updated_at";

const EVENT_COLS: &str = "id, organizer_id, name, description, kind, is_team_event, \
                          min_team_size, max_team_size, max_teams, team_slots_left, start_at, \
                          end_at, registration_deadline, tags, form_fields, max_participants, \
                          seats_left, price, stock, eligibility, status, created_at, updated_at";

const TEAM_COLS: &str =
    "id, name, code, leader_id, members, event_id, status, created_at, updated_at";

const TICKET_COLS: &str = "id, user_id, event_id, team_id, answers, status, checked_in, \
                           check_in_time, feedback_given, registered_at, created_at, updated_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn slot_column(kind: SlotKind) -> &'static str {
    match kind {
        SlotKind::Seat => "seats_left",
        SlotKind::Stock => "stock",
        SlotKind::TeamSlot => "team_slots_left",
    }
}

fn bad_enum(column: &str, value: &str) -> StoreError {
    StoreError::Corrupt(format!("unknown {column} value '{value}'"))
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    is_institute: bool,
    first_name: Option<String>,
    last_name: Option<String>,
    contact_number: Option<String>,
    college: Option<String>,
    discord_webhook: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, StoreError> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: Role::parse(&row.role).ok_or_else(|| bad_enum("role", &row.role))?,
            is_institute: row.is_institute,
            first_name: row.first_name,
            last_name: row.last_name,
            contact_number: row.contact_number,
            college: row.college,
            discord_webhook: row.discord_webhook,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    organizer_id: Uuid,
    name: String,
    description: String,
    kind: String,
    is_team_event: bool,
    min_team_size: i32,
    max_team_size: i32,
    max_teams: Option<i32>,
    team_slots_left: Option<i32>,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    registration_deadline: DateTime<Utc>,
    tags: Vec<String>,
    form_fields: Json<Vec<FormField>>,
    max_participants: Option<i32>,
    seats_left: Option<i32>,
    price: Decimal,
    stock: Option<i32>,
    eligibility: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, StoreError> {
        Ok(Event {
            id: row.id,
            organizer_id: row.organizer_id,
            name: row.name,
            description: row.description,
            kind: EventKind::parse(&row.kind).ok_or_else(|| bad_enum("kind", &row.kind))?,
            is_team_event: row.is_team_event,
            min_team_size: row.min_team_size,
            max_team_size: row.max_team_size,
            max_teams: row.max_teams,
            team_slots_left: row.team_slots_left,
            start_at: row.start_at,
            end_at: row.end_at,
            registration_deadline: row.registration_deadline,
            tags: row.tags,
            form_fields: row.form_fields.0,
            max_participants: row.max_participants,
            seats_left: row.seats_left,
            price: row.price,
            stock: row.stock,
            eligibility: Eligibility::parse(&row.eligibility)
                .ok_or_else(|| bad_enum("eligibility", &row.eligibility))?,
            status: EventStatus::parse(&row.status)
                .ok_or_else(|| bad_enum("status", &row.status))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    code: String,
    leader_id: Uuid,
    members: Vec<Uuid>,
    event_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TeamRow> for Team {
    type Error = StoreError;

    fn try_from(row: TeamRow) -> Result<Self, StoreError> {
        Ok(Team {
            id: row.id,
            name: row.name,
            code: row.code,
            leader_id: row.leader_id,
            members: row.members,
            event_id: row.event_id,
            status: TeamStatus::parse(&row.status)
                .ok_or_else(|| bad_enum("status", &row.status))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct TicketRow {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    team_id: Option<Uuid>,
    answers: Json<Vec<Answer>>,
    status: String,
    checked_in: bool,
    check_in_time: Option<DateTime<Utc>>,
    feedback_given: bool,
    registered_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = StoreError;

    fn try_from(row: TicketRow) -> Result<Self, StoreError> {
        Ok(Ticket {
            id: row.id,
            user_id: row.user_id,
            event_id: row.event_id,
            team_id: row.team_id,
            answers: row.answers.0,
            status: TicketStatus::parse(&row.status)
                .ok_or_else(|| bad_enum("status", &row.status))?,
            checked_in: row.checked_in,
            check_in_time: row.check_in_time,
            feedback_given: row.feedback_given,
            registered_at: row.registered_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct FeedbackRow {
    id: Uuid,
    event_id: Uuid,
    rating: i32,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Feedback {
            id: row.id,
            event_id: row.event_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, is_institute, first_name, \
             last_name, contact_number, college, discord_webhook, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_institute)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.contact_number)
        .bind(&user.college)
        .bind(&user.discord_webhook)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    async fn users_by_email(&self, email: &str) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLS} FROM users WHERE email = $1 ORDER BY created_at"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO events (id, organizer_id, name, description, kind, is_team_event, \
             min_team_size, max_team_size, max_teams, team_slots_left, start_at, end_at, \
             registration_deadline, tags, form_fields, max_participants, seats_left, price, \
             stock, eligibility, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21, $22, $23)",
        )
        .bind(event.id)
        .bind(event.organizer_id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.kind.as_str())
        .bind(event.is_team_event)
        .bind(event.min_team_size)
        .bind(event.max_team_size)
        .bind(event.max_teams)
        .bind(event.team_slots_left)
        .bind(event.start_at)
        .bind(event.end_at)
        .bind(event.registration_deadline)
        .bind(&event.tags)
        .bind(Json(&event.form_fields))
        .bind(event.max_participants)
        .bind(event.seats_left)
        .bind(event.price)
        .bind(event.stock)
        .bind(event.eligibility.as_str())
        .bind(event.status.as_str())
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("SELECT {EVENT_COLS} FROM events WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Event::try_from).transpose()
    }

    async fn update_event(&self, event: &Event) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE events SET name = $2, description = $3, kind = $4, is_team_event = $5, \
             min_team_size = $6, max_team_size = $7, max_teams = $8, team_slots_left = $9, \
             start_at = $10, end_at = $11, registration_deadline = $12, tags = $13, \
             form_fields = $14, max_participants = $15, seats_left = $16, price = $17, \
             stock = $18, eligibility = $19, status = $20, updated_at = now() \
             WHERE id = $1",
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.kind.as_str())
        .bind(event.is_team_event)
        .bind(event.min_team_size)
        .bind(event.max_team_size)
        .bind(event.max_teams)
        .bind(event.team_slots_left)
        .bind(event.start_at)
        .bind(event.end_at)
        .bind(event.registration_deadline)
        .bind(&event.tags)
        .bind(Json(&event.form_fields))
        .bind(event.max_participants)
        .bind(event.seats_left)
        .bind(event.price)
        .bind(event.stock)
        .bind(event.eligibility.as_str())
        .bind(event.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_event(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM tickets WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM teams WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn list_events(&self, filter: EventFilter) -> Result<Vec<Event>, StoreError> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {EVENT_COLS} FROM events WHERE TRUE"));
        if let Some(organizer_id) = filter.organizer_id {
            qb.push(" AND organizer_id = ").push_bind(organizer_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY created_at DESC");
        let rows: Vec<EventRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Event::try_from).collect()
    }

    async fn claim_slot(&self, event_id: Uuid, kind: SlotKind) -> Result<ClaimOutcome, StoreError> {
        let col = slot_column(kind);
        let updated = sqlx::query(&format!(
            "UPDATE events SET {col} = {col} - 1, updated_at = now() \
             WHERE id = $1 AND {col} > 0"
        ))
        .bind(event_id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if updated == 1 {
            return Ok(ClaimOutcome::Claimed);
        }
        // Zero rows: NULL counter (unbounded), exhausted, or a vanished event.
        let row: Option<(Option<i32>,)> =
            sqlx::query_as(&format!("SELECT {col} FROM events WHERE id = $1"))
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(match row {
            None => ClaimOutcome::Missing,
            Some((None,)) => ClaimOutcome::Unbounded,
            Some((Some(_),)) => ClaimOutcome::Exhausted,
        })
    }

    async fn release_slot(&self, event_id: Uuid, kind: SlotKind) -> Result<(), StoreError> {
        let col = slot_column(kind);
        sqlx::query(&format!(
            "UPDATE events SET {col} = {col} + 1, updated_at = now() \
             WHERE id = $1 AND {col} IS NOT NULL"
        ))
        .bind(event_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> Result<TicketInsert, StoreError> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "INSERT INTO tickets (id, user_id, event_id, team_id, answers, status, checked_in, \
             check_in_time, feedback_given, registered_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (user_id, event_id) WHERE status = 'Confirmed' DO NOTHING \
             RETURNING {TICKET_COLS}"
        ))
        .bind(ticket.id)
        .bind(ticket.user_id)
        .bind(ticket.event_id)
        .bind(ticket.team_id)
        .bind(Json(&ticket.answers))
        .bind(ticket.status.as_str())
        .bind(ticket.checked_in)
        .bind(ticket.check_in_time)
        .bind(ticket.feedback_given)
        .bind(ticket.registered_at)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(TicketInsert::Inserted(Ticket::try_from(row)?)),
            None => Ok(TicketInsert::DuplicateConfirmed),
        }
    }

    async fn ticket_by_id(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let row: Option<TicketRow> =
            sqlx::query_as(&format!("SELECT {TICKET_COLS} FROM tickets WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Ticket::try_from).transpose()
    }

    async fn confirmed_ticket(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Ticket>, StoreError> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLS} FROM tickets \
             WHERE user_id = $1 AND event_id = $2 AND status = 'Confirmed'"
        ))
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Ticket::try_from).transpose()
    }

    async fn tickets_for_event(&self, event_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let rows: Vec<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLS} FROM tickets WHERE event_id = $1 ORDER BY registered_at DESC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Ticket::try_from).collect()
    }

    async fn tickets_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let rows: Vec<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLS} FROM tickets WHERE user_id = $1 ORDER BY registered_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Ticket::try_from).collect()
    }

    async fn count_confirmed_tickets(&self, event_id: Uuid) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT count(*) FROM tickets WHERE event_id = $1 AND status = 'Confirmed'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn cancel_ticket(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Ticket>, StoreError> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "UPDATE tickets SET status = 'Cancelled', updated_at = now() \
             WHERE user_id = $1 AND event_id = $2 AND status = 'Confirmed' \
             RETURNING {TICKET_COLS}"
        ))
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Ticket::try_from).transpose()
    }

    async fn check_in_ticket(&self, ticket_id: Uuid) -> Result<CheckInOutcome, StoreError> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "UPDATE tickets SET checked_in = TRUE, check_in_time = now(), updated_at = now() \
             WHERE id = $1 AND status = 'Confirmed' AND checked_in = FALSE \
             RETURNING {TICKET_COLS}"
        ))
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = row {
            return Ok(CheckInOutcome::CheckedIn(Ticket::try_from(row)?));
        }
        // The CAS lost: work out whether the ticket was already used or is
        // not scannable at all.
        match self.ticket_by_id(ticket_id).await? {
            Some(t) if t.status == TicketStatus::Confirmed && t.checked_in => {
                Ok(CheckInOutcome::AlreadyCheckedIn)
            }
            _ => Ok(CheckInOutcome::NotConfirmed),
        }
    }

    async fn mark_feedback_given(&self, ticket_id: Uuid) -> Result<bool, StoreError> {
        let updated = sqlx::query(
            "UPDATE tickets SET feedback_given = TRUE, updated_at = now() \
             WHERE id = $1 AND feedback_given = FALSE",
        )
        .bind(ticket_id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated == 1)
    }

    async fn insert_team(&self, team: &Team) -> Result<TeamInsert, StoreError> {
        let row: Option<TeamRow> = sqlx::query_as(&format!(
            "INSERT INTO teams (id, name, code, leader_id, members, event_id, status, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (code) DO NOTHING \
             RETURNING {TEAM_COLS}"
        ))
        .bind(team.id)
        .bind(&team.name)
        .bind(&team.code)
        .bind(team.leader_id)
        .bind(&team.members)
        .bind(team.event_id)
        .bind(team.status.as_str())
        .bind(team.created_at)
        .bind(team.updated_at)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(TeamInsert::Inserted(Team::try_from(row)?)),
            None => Ok(TeamInsert::CodeTaken),
        }
    }

    async fn team_by_id(&self, id: Uuid) -> Result<Option<Team>, StoreError> {
        let row: Option<TeamRow> =
            sqlx::query_as(&format!("SELECT {TEAM_COLS} FROM teams WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Team::try_from).transpose()
    }

    async fn team_by_code(&self, code: &str) -> Result<Option<Team>, StoreError> {
        let row: Option<TeamRow> =
            sqlx::query_as(&format!("SELECT {TEAM_COLS} FROM teams WHERE code = $1"))
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Team::try_from).transpose()
    }

    async fn team_for_member(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Team>, StoreError> {
        let row: Option<TeamRow> = sqlx::query_as(&format!(
            "SELECT {TEAM_COLS} FROM teams \
             WHERE event_id = $1 AND (leader_id = $2 OR members @> ARRAY[$2]::uuid[]) \
             LIMIT 1"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Team::try_from).transpose()
    }

    async fn count_teams(
        &self,
        event_id: Uuid,
        status: Option<TeamStatus>,
    ) -> Result<i64, StoreError> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT count(*) FROM teams WHERE event_id = ");
        qb.push_bind(event_id);
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn join_team(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        min_size: i32,
        max_size: i32,
    ) -> Result<JoinOutcome, StoreError> {
        let row: Option<TeamRow> = sqlx::query_as(&format!(
            "UPDATE teams SET members = array_append(members, $2), \
             status = CASE WHEN status = 'Forming' AND cardinality(members) + 1 >= $3 \
                           THEN 'Complete' ELSE status END, \
             updated_at = now() \
             WHERE id = $1 \
               AND NOT (members @> ARRAY[$2]::uuid[]) \
               AND cardinality(members) < $4 \
             RETURNING {TEAM_COLS}"
        ))
        .bind(team_id)
        .bind(user_id)
        .bind(min_size)
        .bind(max_size)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = row {
            let team = Team::try_from(row)?;
            let completed_now =
                team.status == TeamStatus::Complete && team.members.len() as i32 == min_size;
            return Ok(JoinOutcome::Joined {
                team,
                completed_now,
            });
        }
        // The guarded update matched nothing: duplicate member or full team.
        match self.team_by_id(team_id).await? {
            Some(t) if t.members.contains(&user_id) => Ok(JoinOutcome::AlreadyMember),
            Some(_) => Ok(JoinOutcome::Full),
            None => Err(StoreError::Corrupt(format!("team {team_id} vanished"))),
        }
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO feedback (id, event_id, rating, comment, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(feedback.id)
        .bind(feedback.event_id)
        .bind(feedback.rating)
        .bind(&feedback.comment)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn feedback_for_event(&self, event_id: Uuid) -> Result<Vec<Feedback>, StoreError> {
        let rows: Vec<FeedbackRow> = sqlx::query_as(
            "SELECT id, event_id, rating, comment, created_at FROM feedback \
             WHERE event_id = $1 ORDER BY created_at DESC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Feedback::from).collect())
    }
}
