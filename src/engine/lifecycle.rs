//! Legal status transitions for events, teams and tickets, plus the
//! per-status editing policy. Handlers consult these before mutating
//! anything; admins may bypass the event table.

use crate::models::{EventStatus, Role, TeamStatus, TicketStatus};

use super::EngineError;

/// What an organizer may still edit at a given event status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditScope {
    /// Draft: everything is still open.
    Full,
    /// Published: description, dates, deadline, capacity, stock, team cap.
    Limited,
    /// Ongoing/Completed/Closed/Cancelled: only status changes remain.
    StatusOnly,
}

pub fn event_transition_allowed(from: EventStatus, to: EventStatus) -> bool {
    use EventStatus::*;
    matches!(
        (from, to),
        (Draft, Published)
            | (Published, Ongoing)
            | (Published, Closed)
            | (Published, Cancelled)
            | (Ongoing, Completed)
            | (Ongoing, Cancelled)
            | (Closed, Published)
            | (Closed, Ongoing)
            | (Closed, Cancelled)
    )
}

/// Checks a requested event status change against the transition table.
/// Admins may override; everyone else gets a `StateConflict`.
pub fn check_event_transition(
    from: EventStatus,
    to: EventStatus,
    actor: Role,
) -> Result<(), EngineError> {
    if from == to || event_transition_allowed(from, to) || actor == Role::Admin {
        Ok(())
    } else {
        Err(EngineError::StateConflict(format!(
            "Cannot change status from {} to {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

pub fn edit_scope(status: EventStatus) -> EditScope {
    match status {
        EventStatus::Draft => EditScope::Full,
        EventStatus::Published => EditScope::Limited,
        EventStatus::Ongoing
        | EventStatus::Completed
        | EventStatus::Closed
        | EventStatus::Cancelled => EditScope::StatusOnly,
    }
}

pub fn team_transition_allowed(from: TeamStatus, to: TeamStatus) -> bool {
    matches!((from, to), (TeamStatus::Forming, TeamStatus::Complete))
}

pub fn ticket_transition_allowed(from: TicketStatus, to: TicketStatus) -> bool {
    matches!(
        (from, to),
        (TicketStatus::Confirmed, TicketStatus::Cancelled)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_only_publishes() {
        assert!(event_transition_allowed(
            EventStatus::Draft,
            EventStatus::Published
        ));
        assert!(!event_transition_allowed(
            EventStatus::Draft,
            EventStatus::Ongoing
        ));
        assert!(!event_transition_allowed(
            EventStatus::Draft,
            EventStatus::Cancelled
        ));
    }

    #[test]
    fn closed_events_can_reopen() {
        assert!(event_transition_allowed(
            EventStatus::Closed,
            EventStatus::Published
        ));
        assert!(event_transition_allowed(
            EventStatus::Closed,
            EventStatus::Ongoing
        ));
    }

    #[test]
    fn terminal_states_stay_terminal() {
        for to in [
            EventStatus::Draft,
            EventStatus::Published,
            EventStatus::Ongoing,
            EventStatus::Closed,
        ] {
            assert!(!event_transition_allowed(EventStatus::Completed, to));
            assert!(!event_transition_allowed(EventStatus::Cancelled, to));
        }
    }

    #[test]
    fn admin_overrides_the_table() {
        assert!(check_event_transition(
            EventStatus::Completed,
            EventStatus::Published,
            Role::Admin
        )
        .is_ok());
        assert!(check_event_transition(
            EventStatus::Completed,
            EventStatus::Published,
            Role::Organizer
        )
        .is_err());
    }

    #[test]
    fn teams_complete_one_way() {
        assert!(team_transition_allowed(
            TeamStatus::Forming,
            TeamStatus::Complete
        ));
        assert!(!team_transition_allowed(
            TeamStatus::Complete,
            TeamStatus::Forming
        ));
    }

    #[test]
    fn tickets_cancel_one_way() {
        assert!(ticket_transition_allowed(
            TicketStatus::Confirmed,
            TicketStatus::Cancelled
        ));
        assert!(!ticket_transition_allowed(
            TicketStatus::Cancelled,
            TicketStatus::Confirmed
        ));
    }

    #[test]
    fn edit_scope_follows_status() {
        assert_eq!(edit_scope(EventStatus::Draft), EditScope::Full);
        assert_eq!(edit_scope(EventStatus::Published), EditScope::Limited);
        assert_eq!(edit_scope(EventStatus::Ongoing), EditScope::StatusOnly);
        assert_eq!(edit_scope(EventStatus::Completed), EditScope::StatusOnly);
    }
}
