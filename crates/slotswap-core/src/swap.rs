use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{EventId, SwapRequestId, UserId};

/// Lifecycle of a swap request. `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl SwapRequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SwapRequestStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwapRequestStatus::Pending => "PENDING",
            SwapRequestStatus::Accepted => "ACCEPTED",
            SwapRequestStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for SwapRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed one-for-one trade of two events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub id: SwapRequestId,
    pub requester_id: UserId,
    /// The slot the requester offers.
    pub requester_slot_id: EventId,
    /// Owner of the requested slot at creation time.
    pub requested_user_id: UserId,
    /// The slot the requester wants.
    pub requested_slot_id: EventId,
    pub status: SwapRequestStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl SwapRequest {
    pub fn new(
        requester_id: UserId,
        requester_slot_id: EventId,
        requested_user_id: UserId,
        requested_slot_id: EventId,
    ) -> Self {
        Self {
            id: SwapRequestId::new(),
            requester_id,
            requester_slot_id,
            requested_user_id,
            requested_slot_id,
            status: SwapRequestStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SwapRequestStatus::Pending
    }

    /// Both slots referenced by this request, requester's first.
    pub fn slots(&self) -> [EventId; 2] {
        [self.requester_slot_id, self.requested_slot_id]
    }

    pub fn references(&self, event_id: EventId) -> bool {
        self.requester_slot_id == event_id || self.requested_slot_id == event_id
    }

    /// Move to a terminal status. Returns false if already resolved.
    pub fn resolve(&mut self, status: SwapRequestStatus, at: DateTime<Utc>) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        self.resolved_at = Some(at);
        true
    }
}
