use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{EventId, UserId};

/// Availability of a calendar slot.
///
/// `Busy <-> Swappable` is driven by the owner; `SwapPending` is entered and
/// left only through swap requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Busy,
    Swappable,
    SwapPending,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Busy => "BUSY",
            EventStatus::Swappable => "SWAPPABLE",
            EventStatus::SwapPending => "SWAP_PENDING",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar event owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: EventStatus,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Create a new event in the `Busy` state. Callers validate the inputs.
    pub fn new(
        user_id: UserId,
        title: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::new(),
            title,
            start_time,
            end_time,
            status: EventStatus::Busy,
            user_id,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
