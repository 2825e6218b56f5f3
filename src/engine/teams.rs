//! Team coordination: creation against the team-slot counter, joining via
//! the store's guarded append, and the completion fan-out that issues a
//! ticket to every member the moment the team first reaches its minimum
//! size.

use std::sync::Arc;

use futures::future::join_all;
use rand::Rng;
use uuid::Uuid;

use crate::models::{Event, Team, TeamStatus, Ticket};
use crate::store::{JoinOutcome, SlotKind, Store, TeamInsert};

use super::capacity::CapacityLedger;
use super::issuance::TicketIssuer;
use super::EngineError;

const CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// The code space is 36^6; a collision streak this long means something
/// else is wrong, so the loop gives up instead of spinning.
const MAX_CODE_ATTEMPTS: usize = 32;

/// Generates one join-code candidate. Uniqueness is the caller's problem;
/// the store's unique index is the arbiter.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Result of a create or join: the team, the caller's own ticket if one
/// was issued, and any members left unticketed by a partial fan-out.
#[derive(Debug)]
pub struct TeamRegistration {
    pub team: Team,
    pub ticket: Option<Ticket>,
    /// True when this very operation performed the Forming -> Complete
    /// transition and fanned out tickets to the whole roster.
    pub completed_now: bool,
    /// Members whose issuance failed when the team completed. The team
    /// stays Complete; these are recoverable by retrying issuance, not a
    /// reason to unwind anything.
    pub unticketed: Vec<Uuid>,
}

#[derive(Clone)]
pub struct TeamCoordinator {
    store: Arc<dyn Store>,
    ledger: CapacityLedger,
    issuer: TicketIssuer,
}

impl TeamCoordinator {
    pub fn new(store: Arc<dyn Store>, ledger: CapacityLedger, issuer: TicketIssuer) -> Self {
        Self {
            store,
            ledger,
            issuer,
        }
    }

    pub async fn create(
        &self,
        leader_id: Uuid,
        event_id: Uuid,
        name: &str,
    ) -> Result<TeamRegistration, EngineError> {
        if name.trim().is_empty() {
            return Err(EngineError::Validation(
                "Team name is required".to_string(),
            ));
        }
        let event = self
            .store
            .event_by_id(event_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Event not found".to_string()))?;
        if !event.is_team_event {
            return Err(EngineError::Validation(
                "This is not a team event".to_string(),
            ));
        }
        self.check_event_open(&event)?;
        self.check_not_enrolled(leader_id, event_id).await?;

        let reservation = self.ledger.reserve(event_id, SlotKind::TeamSlot).await?;

        let status = if event.min_team_size <= 1 {
            TeamStatus::Complete
        } else {
            TeamStatus::Forming
        };

        let mut created = None;
        for _ in 0..MAX_CODE_ATTEMPTS {
            let now = chrono::Utc::now();
            let team = Team {
                id: Uuid::new_v4(),
                name: name.trim().to_string(),
                code: generate_code(),
                leader_id,
                members: vec![leader_id],
                event_id,
                status,
                created_at: now,
                updated_at: now,
            };
            match self.store.insert_team(&team).await {
                Ok(TeamInsert::Inserted(team)) => {
                    created = Some(team);
                    break;
                }
                Ok(TeamInsert::CodeTaken) => continue,
                Err(e) => {
                    if let Err(release_err) = self.ledger.release(reservation).await {
                        tracing::warn!(error = %release_err, "failed to release team slot");
                    }
                    return Err(e.into());
                }
            }
        }
        let Some(team) = created else {
            self.ledger.release(reservation).await?;
            return Err(EngineError::Internal(
                "could not allocate a unique team code".to_string(),
            ));
        };

        // A solo-sized team is born Complete: issue the leader's ticket
        // right away. Failure leaves the team standing with the leader
        // listed as unticketed, like any partial fan-out.
        let mut ticket = None;
        let mut unticketed = Vec::new();
        if team.status == TeamStatus::Complete {
            match self
                .issuer
                .issue_for_team_member(leader_id, &event, team.id)
                .await
            {
                Ok(t) => ticket = Some(t),
                Err(EngineError::AlreadyRegistered(_)) => {}
                Err(e) => {
                    tracing::warn!(team = %team.id, member = %leader_id, error = %e,
                        "team ticket issuance failed");
                    unticketed.push(leader_id);
                }
            }
        }

        Ok(TeamRegistration {
            completed_now: team.status == TeamStatus::Complete,
            team,
            ticket,
            unticketed,
        })
    }

    pub async fn join(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        code: &str,
    ) -> Result<TeamRegistration, EngineError> {
        let code = code.trim().to_uppercase();
        let team = self
            .store
            .team_by_code(&code)
            .await?
            .filter(|t| t.event_id == event_id)
            .ok_or_else(|| {
                EngineError::NotFound("Invalid team code for this event".to_string())
            })?;
        let event = self
            .store
            .event_by_id(event_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Event not found".to_string()))?;
        self.check_event_open(&event)?;
        self.check_not_enrolled(user_id, event_id).await?;

        let was_complete = team.status == TeamStatus::Complete;
        match self
            .store
            .join_team(team.id, user_id, event.min_team_size, event.max_team_size)
            .await?
        {
            JoinOutcome::Full => Err(EngineError::CapacityExceeded(
                "Team is full".to_string(),
            )),
            JoinOutcome::AlreadyMember => Err(EngineError::AlreadyInTeam(
                "You are already in a team for this event".to_string(),
            )),
            JoinOutcome::Joined {
                team,
                completed_now,
            } => {
                if completed_now {
                    // First time the minimum is reached: every member gets
                    // a ticket, not just the joiner.
                    let (ticket, unticketed) = self.fan_out(&event, &team, user_id).await;
                    Ok(TeamRegistration {
                        team,
                        ticket,
                        completed_now: true,
                        unticketed,
                    })
                } else if was_complete {
                    // Late join into an already-Complete team: one fresh
                    // ticket for the joiner, everyone else is untouched.
                    let ticket = self
                        .issuer
                        .issue_for_team_member(user_id, &event, team.id)
                        .await?;
                    Ok(TeamRegistration {
                        team,
                        ticket: Some(ticket),
                        completed_now: false,
                        unticketed: Vec::new(),
                    })
                } else {
                    Ok(TeamRegistration {
                        team,
                        ticket: None,
                        completed_now: false,
                        unticketed: Vec::new(),
                    })
                }
            }
        }
    }

    /// Completion fan-out: one issuance per current member, run
    /// concurrently. The group is not atomic; each issuance keeps its own
    /// idempotency, and failures are reported per member for retry.
    async fn fan_out(
        &self,
        event: &Event,
        team: &Team,
        joiner: Uuid,
    ) -> (Option<Ticket>, Vec<Uuid>) {
        let results = join_all(team.members.iter().map(|&member| async move {
            let outcome = self
                .issuer
                .issue_for_team_member(member, event, team.id)
                .await;
            (member, outcome)
        }))
        .await;

        let mut own_ticket = None;
        let mut unticketed = Vec::new();
        for (member, outcome) in results {
            match outcome {
                Ok(ticket) => {
                    if member == joiner {
                        own_ticket = Some(ticket);
                    }
                }
                // A member who somehow already holds a ticket is exactly
                // where the fan-out wants them.
                Err(EngineError::AlreadyRegistered(_)) => {}
                Err(e) => {
                    tracing::warn!(team = %team.id, %member, error = %e,
                        "team ticket issuance failed");
                    unticketed.push(member);
                }
            }
        }
        (own_ticket, unticketed)
    }

    fn check_event_open(&self, event: &Event) -> Result<(), EngineError> {
        if !event.accepts_registrations_at(chrono::Utc::now()) {
            return Err(EngineError::StateConflict(
                "This event is not open for registration".to_string(),
            ));
        }
        Ok(())
    }

    async fn check_not_enrolled(&self, user_id: Uuid, event_id: Uuid) -> Result<(), EngineError> {
        if self
            .store
            .team_for_member(event_id, user_id)
            .await?
            .is_some()
        {
            return Err(EngineError::AlreadyInTeam(
                "You are already in a team for this event".to_string(),
            ));
        }
        if self
            .store
            .confirmed_ticket(user_id, event_id)
            .await?
            .is_some()
        {
            return Err(EngineError::AlreadyRegistered(
                "You already have a ticket for this event".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_uppercase_alphanumerics() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }
}
