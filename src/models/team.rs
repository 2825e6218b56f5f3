use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamStatus {
    Forming,
    Complete,
}

impl TeamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatus::Forming => "Forming",
            TeamStatus::Complete => "Complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Forming" => Some(TeamStatus::Forming),
            "Complete" => Some(TeamStatus::Complete),
            _ => None,
        }
    }
}

/// A team for a team event. The leader is always present in `members`.
/// `code` is a 6-character uppercase join code, unique across all teams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub leader_id: Uuid,
    pub members: Vec<Uuid>,
    pub event_id: Uuid,
    pub status: TeamStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
