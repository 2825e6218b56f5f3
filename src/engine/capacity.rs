//! Capacity ledger: the reserve/release primitive over the per-event
//! counters. A reservation either claims one unit from a bounded counter
//! or records that the resource is unbounded, in which case releasing it
//! is a no-op.

use std::sync::Arc;

use uuid::Uuid;

use crate::store::{ClaimOutcome, SlotKind, Store};

use super::EngineError;

/// Proof of one claimed unit. Consumed by [`CapacityLedger::release`];
/// dropping it without releasing simply keeps the unit claimed, which is
/// what issuance wants once the admitting record exists.
#[derive(Debug)]
pub struct Reservation {
    event_id: Uuid,
    kind: SlotKind,
    bounded: bool,
}

#[derive(Clone)]
pub struct CapacityLedger {
    store: Arc<dyn Store>,
}

impl CapacityLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Atomically claims one unit. `CapacityExceeded` is an expected
    /// outcome here, not a fault; callers surface it verbatim.
    pub async fn reserve(
        &self,
        event_id: Uuid,
        kind: SlotKind,
    ) -> Result<Reservation, EngineError> {
        match self.store.claim_slot(event_id, kind).await? {
            ClaimOutcome::Claimed => Ok(Reservation {
                event_id,
                kind,
                bounded: true,
            }),
            ClaimOutcome::Unbounded => Ok(Reservation {
                event_id,
                kind,
                bounded: false,
            }),
            ClaimOutcome::Exhausted => Err(EngineError::CapacityExceeded(
                match kind {
                    SlotKind::Seat => "This event has reached its maximum capacity",
                    SlotKind::Stock => "This merchandise is currently out of stock",
                    SlotKind::TeamSlot => "Maximum number of teams reached for this event",
                }
                .to_string(),
            )),
            ClaimOutcome::Missing => Err(EngineError::NotFound("Event not found".to_string())),
        }
    }

    /// Returns a claimed unit, e.g. when the guarded ticket insert loses
    /// to a concurrent duplicate.
    pub async fn release(&self, reservation: Reservation) -> Result<(), EngineError> {
        if reservation.bounded {
            self.store
                .release_slot(reservation.event_id, reservation.kind)
                .await?;
        }
        Ok(())
    }

    /// Counter release without a token, for cancellations: the original
    /// reservation was consumed when the ticket was issued. No-op when the
    /// counter is unbounded.
    pub async fn refund(&self, event_id: Uuid, kind: SlotKind) -> Result<(), EngineError> {
        self.store.release_slot(event_id, kind).await?;
        Ok(())
    }
}
