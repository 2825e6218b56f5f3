pub mod event;
pub mod feedback;
pub mod team;
pub mod ticket;
pub mod user;

pub use event::{Eligibility, Event, EventKind, EventStatus, FieldKind, FormField};
pub use feedback::Feedback;
pub use team::{Team, TeamStatus};
pub use ticket::{Answer, Ticket, TicketStatus};
pub use user::{Role, User};
