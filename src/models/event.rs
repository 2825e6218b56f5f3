use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Normal,
    Merch,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Normal => "Normal",
            EventKind::Merch => "Merch",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Normal" => Some(EventKind::Normal),
            "Merch" => Some(EventKind::Merch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eligibility {
    Institute,
    All,
}

impl Eligibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Eligibility::Institute => "Institute",
            Eligibility::All => "All",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Institute" => Some(Eligibility::Institute),
            "All" => Some(Eligibility::All),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Draft,
    Published,
    Ongoing,
    Completed,
    Closed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "Draft",
            EventStatus::Published => "Published",
            EventStatus::Ongoing => "Ongoing",
            EventStatus::Completed => "Completed",
            EventStatus::Closed => "Closed",
            EventStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Draft" => Some(EventStatus::Draft),
            "Published" => Some(EventStatus::Published),
            "Ongoing" => Some(EventStatus::Ongoing),
            "Completed" => Some(EventStatus::Completed),
            "Closed" => Some(EventStatus::Closed),
            "Cancelled" => Some(EventStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Number,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Date,
}

impl FieldKind {
    /// Kinds that only make sense with a list of options to pick from.
    pub fn needs_options(&self) -> bool {
        matches!(self, FieldKind::Select | FieldKind::Checkbox | FieldKind::Radio)
    }
}

/// One entry of an event's registration form schema. The schema locks once
/// the first registration exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

/// An event or a merch drop. `seats_left`, `stock` and `team_slots_left` are
/// the bounded counters the allocation engine claims slots from; `None`
/// means unlimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub name: String,
    pub description: String,
    pub kind: EventKind,
    pub is_team_event: bool,
    pub min_team_size: i32,
    pub max_team_size: i32,
    pub max_teams: Option<i32>,
    pub team_slots_left: Option<i32>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub tags: Vec<String>,
    pub form_fields: Vec<FormField>,
    pub max_participants: Option<i32>,
    pub seats_left: Option<i32>,
    pub price: Decimal,
    pub stock: Option<i32>,
    pub eligibility: Eligibility,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Registration window check. Deadline is inclusive.
    pub fn accepts_registrations_at(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Published && now <= self.registration_deadline
    }
}
