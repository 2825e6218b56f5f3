use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Confirmed,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Confirmed => "Confirmed",
            TicketStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Confirmed" => Some(TicketStatus::Confirmed),
            "Cancelled" => Some(TicketStatus::Cancelled),
            _ => None,
        }
    }
}

/// A registration-form answer, keyed by the field label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub label: String,
    pub value: Value,
}

impl Answer {
    /// Whether the value counts as answered for a required field.
    pub fn has_value(&self) -> bool {
        match &self.value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        }
    }
}

/// An admission record. Cancellation is a status flip, never a row delete,
/// so check-in and feedback history stays attributable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub team_id: Option<Uuid>,
    pub answers: Vec<Answer>,
    pub status: TicketStatus,
    pub checked_in: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub feedback_given: bool,
    pub registered_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(user_id: Uuid, event_id: Uuid, team_id: Option<Uuid>, answers: Vec<Answer>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_id,
            team_id,
            answers,
            status: TicketStatus::Confirmed,
            checked_in: false,
            check_in_time: None,
            feedback_given: false,
            registered_at: now,
            created_at: now,
            updated_at: now,
        }
    }
}
