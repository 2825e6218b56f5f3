//! Ticket issuance: the single place admission records are created,
//! cancelled and checked in. Creation rides on the store's guarded insert
//! so a duplicate attempt can never materialize a second Confirmed row,
//! and a lost race hands its capacity reservation back.

use uuid::Uuid;

use std::sync::Arc;

use crate::models::{Answer, Event, EventKind, Ticket, TicketStatus};
use crate::store::{CheckInOutcome, SlotKind, Store, TicketInsert};

use super::capacity::CapacityLedger;
use super::EngineError;

#[derive(Clone)]
pub struct TicketIssuer {
    store: Arc<dyn Store>,
    ledger: CapacityLedger,
}

impl TicketIssuer {
    pub fn new(store: Arc<dyn Store>, ledger: CapacityLedger) -> Self {
        Self { store, ledger }
    }

    /// Individual registration (and merch purchase, which is the same path
    /// with a stock counter instead of a seat counter).
    ///
    /// Precondition order: event open for registration, no existing
    /// Confirmed ticket, required answers present, then the capacity
    /// claim. Only after all of that does the guarded insert run; on a
    /// duplicate the claim is released and the caller sees
    /// `AlreadyRegistered`.
    pub async fn register(
        &self,
        user_id: Uuid,
        event: &Event,
        answers: Vec<Answer>,
    ) -> Result<Ticket, EngineError> {
        let now = chrono::Utc::now();
        if event.status != crate::models::EventStatus::Published {
            return Err(EngineError::StateConflict(
                "This event is not published yet".to_string(),
            ));
        }
        if now > event.registration_deadline {
            return Err(EngineError::StateConflict(
                "The registration deadline for this event has passed".to_string(),
            ));
        }
        if self
            .store
            .confirmed_ticket(user_id, event.id)
            .await?
            .is_some()
        {
            return Err(EngineError::AlreadyRegistered(
                "You have already registered for this event".to_string(),
            ));
        }
        // Team membership and an individual ticket are mutually exclusive,
        // even while the team is still forming and unticketed.
        if self
            .store
            .team_for_member(event.id, user_id)
            .await?
            .is_some()
        {
            return Err(EngineError::AlreadyInTeam(
                "You are already in a team for this event".to_string(),
            ));
        }
        validate_answers(event, &answers)?;

        let kind = match event.kind {
            EventKind::Merch => SlotKind::Stock,
            EventKind::Normal => SlotKind::Seat,
        };
        let reservation = self.ledger.reserve(event.id, kind).await?;

        let ticket = Ticket::new(user_id, event.id, None, answers);
        match self.store.insert_ticket(&ticket).await {
            Ok(TicketInsert::Inserted(ticket)) => Ok(ticket),
            Ok(TicketInsert::DuplicateConfirmed) => {
                self.ledger.release(reservation).await?;
                Err(EngineError::AlreadyRegistered(
                    "You have already registered for this event".to_string(),
                ))
            }
            Err(e) => {
                // Hand the slot back before surfacing the fault; a failed
                // issuance must leave zero trace.
                if let Err(release_err) = self.ledger.release(reservation).await {
                    tracing::warn!(error = %release_err, "failed to release reservation");
                }
                Err(e.into())
            }
        }
    }

    /// Issuance for a team member when the team completes (or joins a team
    /// that already did). Capacity was claimed as a team slot at creation,
    /// so there is no per-ticket counter here, and no answers: the team
    /// carries the registration.
    pub async fn issue_for_team_member(
        &self,
        user_id: Uuid,
        event: &Event,
        team_id: Uuid,
    ) -> Result<Ticket, EngineError> {
        let ticket = Ticket::new(user_id, event.id, Some(team_id), Vec::new());
        match self.store.insert_ticket(&ticket).await? {
            TicketInsert::Inserted(ticket) => Ok(ticket),
            TicketInsert::DuplicateConfirmed => Err(EngineError::AlreadyRegistered(
                "You already have a ticket for this event".to_string(),
            )),
        }
    }

    /// Cancels the caller's Confirmed ticket and returns the claimed unit
    /// to the matching counter. The row survives as Cancelled.
    pub async fn cancel(&self, user_id: Uuid, event_id: Uuid) -> Result<Ticket, EngineError> {
        let event = self
            .store
            .event_by_id(event_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Event not found".to_string()))?;

        let ticket = self
            .store
            .cancel_ticket(user_id, event_id)
            .await?
            .ok_or_else(|| {
                EngineError::NotFound("You are not registered for this event".to_string())
            })?;

        match event.kind {
            EventKind::Merch => self.ledger.refund(event_id, SlotKind::Stock).await?,
            // Team tickets never claimed a seat; their admission came
            // through the team slot, which stays consumed.
            EventKind::Normal if ticket.team_id.is_none() => {
                self.ledger.refund(event_id, SlotKind::Seat).await?
            }
            EventKind::Normal => {}
        }
        Ok(ticket)
    }

    /// Organizer check-in by ticket id (the QR payload). The flip is a CAS
    /// so a double scan is reported, not silently absorbed.
    pub async fn scan(&self, ticket_id: Uuid, organizer_id: Uuid) -> Result<Ticket, EngineError> {
        let ticket = self
            .store
            .ticket_by_id(ticket_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Ticket not found".to_string()))?;
        let event = self
            .store
            .event_by_id(ticket.event_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Event not found".to_string()))?;
        if event.organizer_id != organizer_id {
            return Err(EngineError::Forbidden(
                "You can only scan tickets for your own events".to_string(),
            ));
        }
        if ticket.status != TicketStatus::Confirmed {
            return Err(EngineError::StateConflict(format!(
                "This ticket is {}",
                ticket.status.as_str()
            )));
        }
        match self.store.check_in_ticket(ticket_id).await? {
            CheckInOutcome::CheckedIn(ticket) => Ok(ticket),
            CheckInOutcome::AlreadyCheckedIn => Err(EngineError::StateConflict(
                "This ticket has already been used".to_string(),
            )),
            CheckInOutcome::NotConfirmed => Err(EngineError::StateConflict(
                "This ticket is no longer valid".to_string(),
            )),
        }
    }
}

fn validate_answers(event: &Event, answers: &[Answer]) -> Result<(), EngineError> {
    for field in &event.form_fields {
        if field.required {
            let answered = answers
                .iter()
                .any(|a| a.label == field.label && a.has_value());
            if !answered {
                return Err(EngineError::Validation(format!(
                    "Please answer: {}",
                    field.label
                )));
            }
        }
    }
    Ok(())
}
