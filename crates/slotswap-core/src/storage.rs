use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::event::Event;
use crate::id::{EventId, SwapRequestId, UserId};
use crate::swap::{SwapRequest, SwapRequestStatus};
use crate::user::User;

/// The record arena: id-indexed users, events, and swap requests.
///
/// Alongside the records it keeps two derived indexes:
/// - lower-cased email -> user, enforcing email uniqueness
/// - event -> pending swap requests that reference it
///
/// Swap requests can only be inserted and resolved through `Tables`, so the
/// pending index is always in step with request statuses.
#[derive(Debug, Default, Clone)]
pub struct Tables {
    users: HashMap<UserId, User>,
    emails: HashMap<String, UserId>,
    events: HashMap<EventId, Event>,
    requests: HashMap<SwapRequestId, SwapRequest>,
    pending: HashMap<EventId, BTreeSet<SwapRequestId>>,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Insert a user. Returns false (and stores nothing) if the email is taken.
    pub fn insert_user(&mut self, user: User) -> bool {
        let key = user.email.to_lowercase();
        if self.emails.contains_key(&key) {
            return false;
        }
        self.emails.insert(key, user.id);
        self.users.insert(user.id, user);
        true
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    pub fn event_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.events.get_mut(&id)
    }

    pub fn insert_event(&mut self, event: Event) {
        self.events.insert(event.id, event);
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn request(&self, id: SwapRequestId) -> Option<&SwapRequest> {
        self.requests.get(&id)
    }

    pub fn requests(&self) -> impl Iterator<Item = &SwapRequest> {
        self.requests.values()
    }

    /// Insert a swap request, indexing it against both slots if pending.
    pub fn insert_request(&mut self, request: SwapRequest) {
        if request.is_pending() {
            for slot in request.slots() {
                self.pending.entry(slot).or_default().insert(request.id);
            }
        }
        self.requests.insert(request.id, request);
    }

    /// Move a pending request to a terminal status and drop it from the index.
    /// Returns false if the request is missing or already resolved.
    pub fn resolve_request(
        &mut self,
        id: SwapRequestId,
        status: SwapRequestStatus,
        at: DateTime<Utc>,
    ) -> bool {
        let Some(request) = self.requests.get_mut(&id) else {
            return false;
        };
        if !request.resolve(status, at) {
            return false;
        }
        for slot in request.slots() {
            if let Some(ids) = self.pending.get_mut(&slot) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.pending.remove(&slot);
                }
            }
        }
        true
    }

    /// Pending requests referencing an event, in id order.
    pub fn pending_for(&self, event_id: EventId) -> Vec<SwapRequestId> {
        self.pending
            .get(&event_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn has_pending(&self, event_id: EventId) -> bool {
        self.pending
            .get(&event_id)
            .is_some_and(|ids| !ids.is_empty())
    }

    /// List every broken relationship between records and indexes.
    /// An empty result means the arena is consistent.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn consistency_violations(&self) -> Vec<String> {
        use crate::event::EventStatus;

        let mut violations = Vec::new();

        for event in self.events.values() {
            if !self.users.contains_key(&event.user_id) {
                violations.push(format!("{} owned by unknown {}", event.id, event.user_id));
            }
            let pending = self.pending.get(&event.id).map_or(0, BTreeSet::len);
            if pending > 1 {
                violations.push(format!("{} referenced by {} pending requests", event.id, pending));
            }
            if event.status == EventStatus::SwapPending && pending == 0 {
                violations.push(format!("{} is SWAP_PENDING with no pending request", event.id));
            }
        }

        for request in self.requests.values().filter(|r| r.is_pending()) {
            for slot in request.slots() {
                match self.events.get(&slot) {
                    Some(event) if event.status != EventStatus::SwapPending => violations.push(
                        format!("{} in pending {} has status {}", slot, request.id, event.status),
                    ),
                    Some(_) => {}
                    None => violations.push(format!("{} references missing {}", request.id, slot)),
                }
                if !self.pending.get(&slot).is_some_and(|ids| ids.contains(&request.id)) {
                    violations.push(format!("{} missing from index of {}", request.id, slot));
                }
            }
            let owners = (
                self.events.get(&request.requester_slot_id).map(|e| e.user_id),
                self.events.get(&request.requested_slot_id).map(|e| e.user_id),
            );
            if owners != (Some(request.requester_id), Some(request.requested_user_id)) {
                violations.push(format!("{} slot ownership drifted", request.id));
            }
            if request.requester_id == request.requested_user_id {
                violations.push(format!("{} is a self swap", request.id));
            }
        }

        for (event_id, ids) in &self.pending {
            for id in ids {
                match self.requests.get(id) {
                    Some(r) if r.is_pending() && r.references(*event_id) => {}
                    _ => violations.push(format!("stale index entry {} -> {}", event_id, id)),
                }
            }
        }

        violations
    }
}

/// Access to the record arena with transactional boundaries.
///
/// A `write` closure runs under exclusive access and is the unit of
/// atomicity: nothing else can observe the tables until it returns.
/// Callers perform all precondition checks before their first mutation,
/// so a closure that returns `Err` leaves the tables untouched.
pub trait Store: Send + Sync {
    /// Run a read-only closure against a consistent view of the tables.
    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> Result<R, StorageError>;

    /// Run a mutating closure under exclusive access.
    fn write<R, E>(&self, f: impl FnOnce(&mut Tables) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StorageError>;
}

pub mod memory {
    use super::*;
    use std::sync::RwLock;

    /// In-memory store guarded by a single reader-writer lock.
    #[derive(Debug, Default)]
    pub struct InMemoryStore {
        tables: RwLock<Tables>,
    }

    impl InMemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Start from pre-populated tables, bypassing engine checks.
        #[cfg(any(test, feature = "test-utils"))]
        pub fn with_tables(tables: Tables) -> Self {
            Self {
                tables: RwLock::new(tables),
            }
        }
    }

    impl Store for InMemoryStore {
        fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> Result<R, StorageError> {
            let tables = self.tables.read().map_err(|_| {
                tracing::warn!("store lock poisoned on read");
                StorageError::Poisoned
            })?;
            Ok(f(&tables))
        }

        fn write<R, E>(&self, f: impl FnOnce(&mut Tables) -> Result<R, E>) -> Result<R, E>
        where
            E: From<StorageError>,
        {
            let mut tables = self.tables.write().map_err(|_| {
                tracing::warn!("store lock poisoned on write");
                StorageError::Poisoned
            })?;
            f(&mut tables)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::event::Event;
        use crate::user::User;
        use chrono::TimeZone;

        fn make_user(email: &str) -> User {
            User::new("Test".to_string(), email.to_string(), "secret".to_string())
        }

        fn make_event(owner: UserId) -> Event {
            Event::new(
                owner,
                "Slot".to_string(),
                Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap(),
            )
        }

        #[test]
        fn test_email_uniqueness_is_case_insensitive() {
            let mut tables = Tables::new();
            let ada = make_user("ada@example.com");
            let ada_id = ada.id;
            assert!(tables.insert_user(ada));

            let imposter = make_user("ADA@example.com");
            let imposter_id = imposter.id;
            assert!(!tables.insert_user(imposter));
            assert!(tables.user(ada_id).is_some());
            assert!(tables.user(imposter_id).is_none());
        }

        #[test]
        fn test_pending_index_follows_request_lifecycle() {
            let mut tables = Tables::new();
            let a = make_user("a@example.com");
            let b = make_user("b@example.com");
            let (e1, e2) = (make_event(a.id), make_event(b.id));
            let request = SwapRequest::new(b.id, e2.id, a.id, e1.id);
            let request_id = request.id;

            tables.insert_request(request);
            assert_eq!(tables.pending_for(e1.id), vec![request_id]);
            assert_eq!(tables.pending_for(e2.id), vec![request_id]);

            assert!(tables.resolve_request(request_id, SwapRequestStatus::Rejected, Utc::now()));
            assert!(!tables.has_pending(e1.id));
            assert!(!tables.has_pending(e2.id));

            // Second resolution is refused
            assert!(!tables.resolve_request(request_id, SwapRequestStatus::Accepted, Utc::now()));
            assert_eq!(
                tables.request(request_id).unwrap().status,
                SwapRequestStatus::Rejected
            );
        }

        #[test]
        fn test_resolved_request_is_not_indexed() {
            let mut tables = Tables::new();
            let mut request =
                SwapRequest::new(UserId::new(), EventId::new(), UserId::new(), EventId::new());
            request.resolve(SwapRequestStatus::Accepted, Utc::now());
            let slot = request.requester_slot_id;

            tables.insert_request(request);
            assert!(!tables.has_pending(slot));
        }

        #[test]
        fn test_write_error_propagates() {
            let store = InMemoryStore::new();
            let result: Result<(), StorageError> = store.write(|_| Err(StorageError::Poisoned));
            assert_eq!(result, Err(StorageError::Poisoned));
        }

        #[test]
        fn test_write_then_read() {
            let store = InMemoryStore::new();
            let user = make_user("a@example.com");
            let id = user.id;

            store
                .write(|tables| {
                    tables.insert_user(user);
                    Ok::<_, StorageError>(())
                })
                .unwrap();

            let name = store.read(|tables| tables.user(id).map(|u| u.name.clone())).unwrap();
            assert_eq!(name.as_deref(), Some("Test"));
        }

        #[test]
        fn test_consistency_violations_detects_stranded_slot() {
            let mut tables = Tables::new();
            let a = make_user("a@example.com");
            let mut event = make_event(a.id);
            event.status = crate::event::EventStatus::SwapPending;
            tables.insert_user(a);
            tables.insert_event(event);

            let violations = tables.consistency_violations();
            assert_eq!(violations.len(), 1);
            assert!(violations[0].contains("SWAP_PENDING"));
        }
    }
}
