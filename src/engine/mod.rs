//! The allocation engine: who gets admitted into capacity-bounded
//! resources, and which lifecycle transitions are legal. Everything here
//! runs against the [`Store`](crate::store::Store) seam and leans on its
//! atomic primitives; the engine itself never does a bare
//! read-decide-write on shared counters.

pub mod capacity;
pub mod identity;
pub mod issuance;
pub mod lifecycle;
pub mod teams;

use std::sync::Arc;

use thiserror::Error;

use crate::store::{Store, StoreError};

pub use capacity::{CapacityLedger, Reservation};
pub use identity::{IdentityResolver, NewUser};
pub use issuance::TicketIssuer;
pub use teams::{TeamCoordinator, TeamRegistration};

/// Expected rejections are variants of their own; only `Store` is a fault.
/// Every variant carries the user-facing message; the HTTP layer attaches
/// the stable reason code.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    CapacityExceeded(String),

    #[error("{0}")]
    AlreadyRegistered(String),

    #[error("{0}")]
    AlreadyInTeam(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    StateConflict(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The engine components wired over one shared store.
#[derive(Clone)]
pub struct Engine {
    pub identity: IdentityResolver,
    pub ledger: CapacityLedger,
    pub issuer: TicketIssuer,
    pub teams: TeamCoordinator,
}

impl Engine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let ledger = CapacityLedger::new(store.clone());
        let issuer = TicketIssuer::new(store.clone(), ledger.clone());
        Self {
            identity: IdentityResolver::new(store.clone()),
            teams: TeamCoordinator::new(store, ledger.clone(), issuer.clone()),
            ledger,
            issuer,
        }
    }
}
