//! Read-only views joining users, events, and swap requests.
//!
//! Projections take a shared read of the store and never change a status.

use serde::{Deserialize, Serialize};

use slotswap_core::{
    Event, EventStatus, Result, Store, SwapRequest, Tables, UserId, UserSummary,
};

use crate::SwapEngine;

/// An event annotated with its owner's public identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub user: Option<UserSummary>,
}

/// A swap request annotated with both parties and both slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedSwapRequest {
    #[serde(flatten)]
    pub request: SwapRequest,
    pub requester: UserSummary,
    pub requested_user: UserSummary,
    pub requester_slot: Event,
    pub requested_slot: Event,
}

/// Pending requests addressed to a user and sent by that user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequestLists {
    pub incoming: Vec<DetailedSwapRequest>,
    pub outgoing: Vec<DetailedSwapRequest>,
}

impl<S: Store> SwapEngine<S> {
    /// The user's own events, earliest first.
    pub fn list_own_events(&self, user_id: UserId) -> Result<Vec<Event>> {
        let events = self.store.read(|tables| {
            sorted_by_start(
                tables
                    .events()
                    .filter(|e| e.is_owned_by(user_id))
                    .cloned()
                    .collect(),
            )
        })?;
        Ok(events)
    }

    /// The marketplace: every swappable slot not owned by `user_id`.
    pub fn list_swappable_slots(&self, user_id: UserId) -> Result<Vec<DetailedEvent>> {
        let slots: Vec<DetailedEvent> = self.store.read(|tables| {
            sorted_by_start(
                tables
                    .events()
                    .filter(|e| e.status == EventStatus::Swappable && !e.is_owned_by(user_id))
                    .cloned()
                    .collect(),
            )
            .into_iter()
            .map(|event| DetailedEvent {
                user: tables.user(event.user_id).map(|u| u.summary()),
                event,
            })
            .collect()
        })?;
        Ok(slots)
    }

    /// Slots the user can currently offer in a swap.
    pub fn list_own_swappable_slots(&self, user_id: UserId) -> Result<Vec<Event>> {
        let events = self.store.read(|tables| {
            sorted_by_start(
                tables
                    .events()
                    .filter(|e| e.is_owned_by(user_id) && e.status == EventStatus::Swappable)
                    .cloned()
                    .collect(),
            )
        })?;
        Ok(events)
    }

    /// Pending requests targeting the user's slots and pending requests the user sent.
    pub fn list_swap_requests(&self, user_id: UserId) -> Result<SwapRequestLists> {
        let lists = self.store.read(|tables| {
            let mut pending: Vec<&SwapRequest> =
                tables.requests().filter(|r| r.is_pending()).collect();
            pending.sort_by_key(|r| (r.created_at, r.id));

            SwapRequestLists {
                incoming: pending
                    .iter()
                    .filter(|r| r.requested_user_id == user_id)
                    .filter_map(|r| detail(tables, r))
                    .collect(),
                outgoing: pending
                    .iter()
                    .filter(|r| r.requester_id == user_id)
                    .filter_map(|r| detail(tables, r))
                    .collect(),
            }
        })?;
        Ok(lists)
    }
}

fn sorted_by_start(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by_key(|e| (e.start_time, e.id));
    events
}

fn detail(tables: &Tables, request: &SwapRequest) -> Option<DetailedSwapRequest> {
    Some(DetailedSwapRequest {
        requester: tables.user(request.requester_id)?.summary(),
        requested_user: tables.user(request.requested_user_id)?.summary(),
        requester_slot: tables.event(request.requester_slot_id)?.clone(),
        requested_slot: tables.event(request.requested_slot_id)?.clone(),
        request: request.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use slotswap_core::User;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    fn setup() -> (SwapEngine, User, User) {
        let engine = SwapEngine::in_memory();
        let ada = engine.register_user("Ada", "ada@example.com", "hash").unwrap();
        let bob = engine.register_user("Bob", "bob@example.com", "hash").unwrap();
        (engine, ada, bob)
    }

    #[test]
    fn test_own_events_sorted_by_start() {
        let (engine, ada, bob) = setup();
        let late = engine.create_event(ada.id, "Late", at(15), at(16)).unwrap();
        let early = engine.create_event(ada.id, "Early", at(8), at(9)).unwrap();
        engine.create_event(bob.id, "Bob's", at(10), at(11)).unwrap();

        let events = engine.list_own_events(ada.id).unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[test]
    fn test_marketplace_excludes_own_and_unavailable() {
        let (engine, ada, bob) = setup();
        let mine = engine.create_event(ada.id, "Mine", at(9), at(10)).unwrap();
        engine.set_swappable(mine.id, ada.id).unwrap();
        let busy = engine.create_event(bob.id, "Busy", at(10), at(11)).unwrap();
        let offered = engine.create_event(bob.id, "Offered", at(12), at(13)).unwrap();
        engine.set_swappable(offered.id, bob.id).unwrap();

        let slots = engine.list_swappable_slots(ada.id).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].event.id, offered.id);
        assert_ne!(slots[0].event.id, busy.id);

        let owner = slots[0].user.as_ref().unwrap();
        assert_eq!(owner.name, "Bob");
        assert_eq!(owner.email, "bob@example.com");
    }

    #[test]
    fn test_own_swappable_slots() {
        let (engine, ada, _bob) = setup();
        let a = engine.create_event(ada.id, "A", at(9), at(10)).unwrap();
        engine.create_event(ada.id, "B", at(11), at(12)).unwrap();
        engine.set_swappable(a.id, ada.id).unwrap();

        let slots = engine.list_own_swappable_slots(ada.id).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].id, a.id);
        assert_eq!(slots[0].status, EventStatus::Swappable);
    }

    #[test]
    fn test_request_lists_are_annotated() {
        let (engine, ada, bob) = setup();
        let e1 = engine.create_event(ada.id, "Ada's slot", at(10), at(11)).unwrap();
        let e2 = engine.create_event(bob.id, "Bob's slot", at(14), at(15)).unwrap();
        engine.set_swappable(e1.id, ada.id).unwrap();
        engine.set_swappable(e2.id, bob.id).unwrap();
        let request = engine.create_swap_request(bob.id, e2.id, e1.id).unwrap();

        let ada_lists = engine.list_swap_requests(ada.id).unwrap();
        assert!(ada_lists.outgoing.is_empty());
        assert_eq!(ada_lists.incoming.len(), 1);
        let incoming = &ada_lists.incoming[0];
        assert_eq!(incoming.request.id, request.id);
        assert_eq!(incoming.requester.name, "Bob");
        assert_eq!(incoming.requester_slot.title, "Bob's slot");
        assert_eq!(incoming.requested_slot.title, "Ada's slot");

        let bob_lists = engine.list_swap_requests(bob.id).unwrap();
        assert!(bob_lists.incoming.is_empty());
        assert_eq!(bob_lists.outgoing.len(), 1);
        assert_eq!(bob_lists.outgoing[0].requested_user.name, "Ada");
    }

    #[test]
    fn test_resolved_requests_leave_lists() {
        let (engine, ada, bob) = setup();
        let e1 = engine.create_event(ada.id, "A", at(10), at(11)).unwrap();
        let e2 = engine.create_event(bob.id, "B", at(14), at(15)).unwrap();
        engine.set_swappable(e1.id, ada.id).unwrap();
        engine.set_swappable(e2.id, bob.id).unwrap();
        let request = engine.create_swap_request(bob.id, e2.id, e1.id).unwrap();

        engine.respond_to_swap_request(request.id, ada.id, false).unwrap();

        assert_eq!(engine.list_swap_requests(ada.id).unwrap(), SwapRequestLists::default());
        assert_eq!(engine.list_swap_requests(bob.id).unwrap(), SwapRequestLists::default());
    }

    #[test]
    fn test_detailed_event_serializes_flat() {
        let (engine, ada, bob) = setup();
        let e = engine.create_event(bob.id, "Offered", at(12), at(13)).unwrap();
        engine.set_swappable(e.id, bob.id).unwrap();

        let slots = engine.list_swappable_slots(ada.id).unwrap();
        let json = serde_json::to_value(&slots[0]).unwrap();
        assert_eq!(json["title"], "Offered");
        assert_eq!(json["status"], "SWAPPABLE");
        assert_eq!(json["user"]["name"], "Bob");
        assert!(json["user"].get("credential").is_none());
    }
}
