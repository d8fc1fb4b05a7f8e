use chrono::{DateTime, Utc};
use tracing::{debug, info};

use slotswap_core::{
    Event, EventId, EventStatus, Result, Store, SwapError, Tables, UserId, ValidationError,
    Validator,
};

use crate::SwapEngine;

impl<S: Store> SwapEngine<S> {
    /// Create a new `Busy` event for a registered owner.
    pub fn create_event(
        &self,
        owner_id: UserId,
        title: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Event> {
        let title = Validator::validate_title(title)?;
        Validator::validate_time_range(start_time, end_time)?;

        let event = self.store.write(|tables| {
            if tables.user(owner_id).is_none() {
                return Err(SwapError::not_found(owner_id));
            }
            let event = Event::new(owner_id, title, start_time, end_time);
            tables.insert_event(event.clone());
            Ok(event)
        })?;

        info!(event_id = %event.id, owner = %owner_id, "event created");
        Ok(event)
    }

    /// Same as [`create_event`](Self::create_event), taking RFC 3339 timestamps.
    pub fn create_event_iso(
        &self,
        owner_id: UserId,
        title: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<Event> {
        let start_time = Validator::parse_timestamp(start_time)?;
        let end_time = Validator::parse_timestamp(end_time)?;
        self.create_event(owner_id, title, start_time, end_time)
    }

    pub fn get_event(&self, event_id: EventId) -> Result<Event> {
        self.store
            .read(|tables| tables.event(event_id).cloned())?
            .ok_or_else(|| SwapError::not_found(event_id))
    }

    /// Offer a busy slot for trading.
    pub fn set_swappable(&self, event_id: EventId, actor_id: UserId) -> Result<Event> {
        self.owner_transition(event_id, actor_id, EventStatus::Swappable)
    }

    /// Withdraw a swappable slot. Slots under negotiation cannot be withdrawn.
    pub fn set_busy(&self, event_id: EventId, actor_id: UserId) -> Result<Event> {
        self.owner_transition(event_id, actor_id, EventStatus::Busy)
    }

    /// Owner-driven status change. Only `Busy` and `Swappable` are valid targets.
    pub fn set_event_status(
        &self,
        event_id: EventId,
        actor_id: UserId,
        target: EventStatus,
    ) -> Result<Event> {
        match target {
            EventStatus::Swappable => self.set_swappable(event_id, actor_id),
            EventStatus::Busy => self.set_busy(event_id, actor_id),
            EventStatus::SwapPending => {
                Err(ValidationError::UnsupportedStatus(EventStatus::SwapPending).into())
            }
        }
    }

    fn owner_transition(
        &self,
        event_id: EventId,
        actor_id: UserId,
        target: EventStatus,
    ) -> Result<Event> {
        let result = self
            .store
            .write(|tables| apply_owner_transition(tables, event_id, actor_id, target));

        match &result {
            Ok(event) => info!(event_id = %event.id, status = %event.status, "event status changed"),
            Err(e) => debug!(event_id = %event_id, actor = %actor_id, error = %e, "status change refused"),
        }
        result
    }
}

/// `Busy <-> Swappable` for the owner. Checks run before the single mutation.
fn apply_owner_transition(
    tables: &mut Tables,
    event_id: EventId,
    actor_id: UserId,
    target: EventStatus,
) -> Result<Event> {
    let event = tables
        .event_mut(event_id)
        .ok_or_else(|| SwapError::not_found(event_id))?;

    if !event.is_owned_by(actor_id) {
        return Err(SwapError::not_owner(actor_id, event_id));
    }

    let required = match target {
        EventStatus::Swappable => EventStatus::Busy,
        EventStatus::Busy => EventStatus::Swappable,
        EventStatus::SwapPending => {
            return Err(ValidationError::UnsupportedStatus(target).into());
        }
    };

    if event.status != required {
        let reason = if event.status == EventStatus::SwapPending {
            "slot is under negotiation until its swap request is resolved".to_string()
        } else {
            format!("cannot change from {} to {}", event.status, target)
        };
        return Err(SwapError::invalid_state(event_id, reason));
    }

    event.status = target;
    Ok(event.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use slotswap_core::{ErrorKind, User};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    fn setup() -> (SwapEngine, User) {
        let engine = SwapEngine::in_memory();
        let user = engine.register_user("Ada", "ada@example.com", "hash").unwrap();
        (engine, user)
    }

    #[test]
    fn test_create_event_is_busy() {
        let (engine, ada) = setup();
        let event = engine.create_event(ada.id, "Standup", at(10), at(11)).unwrap();

        assert_eq!(event.status, EventStatus::Busy);
        assert_eq!(event.user_id, ada.id);
        assert_eq!(engine.get_event(event.id).unwrap(), event);
    }

    #[test]
    fn test_create_event_validation() {
        let (engine, ada) = setup();

        let err = engine.create_event(ada.id, "Late", at(11), at(10)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = engine.create_event(ada.id, "Empty", at(10), at(10)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = engine.create_event(ada.id, "  ", at(10), at(11)).unwrap_err();
        assert_eq!(err, SwapError::Validation(ValidationError::EmptyTitle));
    }

    #[test]
    fn test_create_event_unknown_owner() {
        let engine = SwapEngine::in_memory();
        let ghost = UserId::new();
        let err = engine.create_event(ghost, "Standup", at(10), at(11)).unwrap_err();
        assert_eq!(err, SwapError::not_found(ghost));
    }

    #[test]
    fn test_create_event_iso() {
        let (engine, ada) = setup();
        let event = engine
            .create_event_iso(ada.id, "Standup", "2025-03-01T10:00:00Z", "2025-03-01T11:00:00Z")
            .unwrap();
        assert_eq!(event.start_time, at(10));

        let err = engine
            .create_event_iso(ada.id, "Standup", "10 o'clock", "2025-03-01T11:00:00Z")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_busy_swappable_round_trip() {
        let (engine, ada) = setup();
        let event = engine.create_event(ada.id, "Standup", at(10), at(11)).unwrap();

        let event = engine.set_swappable(event.id, ada.id).unwrap();
        assert_eq!(event.status, EventStatus::Swappable);

        let event = engine.set_busy(event.id, ada.id).unwrap();
        assert_eq!(event.status, EventStatus::Busy);
    }

    #[test]
    fn test_transition_requires_owner() {
        let (engine, ada) = setup();
        let bob = engine.register_user("Bob", "bob@example.com", "hash").unwrap();
        let event = engine.create_event(ada.id, "Standup", at(10), at(11)).unwrap();

        let err = engine.set_swappable(event.id, bob.id).unwrap_err();
        assert_eq!(err, SwapError::not_owner(bob.id, event.id));
        assert_eq!(engine.get_event(event.id).unwrap().status, EventStatus::Busy);
    }

    #[test]
    fn test_transition_from_wrong_state() {
        let (engine, ada) = setup();
        let event = engine.create_event(ada.id, "Standup", at(10), at(11)).unwrap();

        // Already busy
        let err = engine.set_busy(event.id, ada.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        engine.set_swappable(event.id, ada.id).unwrap();
        let err = engine.set_swappable(event.id, ada.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_swap_pending_cannot_be_set_directly() {
        let (engine, ada) = setup();
        let event = engine.create_event(ada.id, "Standup", at(10), at(11)).unwrap();

        let err = engine
            .set_event_status(event.id, ada.id, EventStatus::SwapPending)
            .unwrap_err();
        assert_eq!(
            err,
            SwapError::Validation(ValidationError::UnsupportedStatus(EventStatus::SwapPending))
        );
    }

    #[test]
    fn test_set_event_status_dispatch() {
        let (engine, ada) = setup();
        let event = engine.create_event(ada.id, "Standup", at(10), at(11)).unwrap();

        let event = engine
            .set_event_status(event.id, ada.id, EventStatus::Swappable)
            .unwrap();
        assert_eq!(event.status, EventStatus::Swappable);
        let event = engine
            .set_event_status(event.id, ada.id, EventStatus::Busy)
            .unwrap();
        assert_eq!(event.status, EventStatus::Busy);
    }

    #[test]
    fn test_unknown_event() {
        let (engine, ada) = setup();
        let id = EventId::new();
        assert_eq!(
            engine.set_swappable(id, ada.id).unwrap_err(),
            SwapError::not_found(id)
        );
        assert_eq!(engine.get_event(id).unwrap_err(), SwapError::not_found(id));
    }
}
