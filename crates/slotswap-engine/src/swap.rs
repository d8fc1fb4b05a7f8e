use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use slotswap_core::{
    EventId, EventStatus, Result, Store, SwapError, SwapRequest, SwapRequestId,
    SwapRequestStatus, Tables, UserId,
};

use crate::SwapEngine;

impl<S: Store> SwapEngine<S> {
    /// Propose trading `requester_slot_id` (owned by the requester) for `target_slot_id`.
    ///
    /// On success both slots are `SwapPending` and reserved against any other
    /// request. On failure nothing changes.
    pub fn create_swap_request(
        &self,
        requester_id: UserId,
        requester_slot_id: EventId,
        target_slot_id: EventId,
    ) -> Result<SwapRequest> {
        let result = self.store.write(|tables| {
            open_request(tables, requester_id, requester_slot_id, target_slot_id)
        });

        match &result {
            Ok(request) => info!(
                request_id = %request.id,
                requester = %request.requester_id,
                offered = %request.requester_slot_id,
                wanted = %request.requested_slot_id,
                "swap request created"
            ),
            Err(e) => debug!(requester = %requester_id, error = %e, "swap request refused"),
        }
        result
    }

    /// Accept or reject a pending request. Only the owner of the requested slot may respond.
    ///
    /// A request resolves exactly once; responding again fails with an
    /// invalid-state error and changes nothing.
    pub fn respond_to_swap_request(
        &self,
        request_id: SwapRequestId,
        responder_id: UserId,
        accept: bool,
    ) -> Result<SwapRequest> {
        let result: Result<(SwapRequest, Vec<SwapRequestId>)> = self.store.write(|tables| {
            let request = check_response(tables, request_id, responder_id)?;
            let now = Utc::now();
            let cascaded = if accept {
                accept_request(tables, &request, now)?
            } else {
                reject_request(tables, &request, now);
                Vec::new()
            };
            let resolved = tables
                .request(request_id)
                .cloned()
                .ok_or_else(|| SwapError::not_found(request_id))?;
            Ok((resolved, cascaded))
        });

        match result {
            Ok((request, cascaded)) => {
                info!(
                    request_id = %request.id,
                    status = %request.status,
                    cascaded = cascaded.len(),
                    "swap request resolved"
                );
                for id in cascaded {
                    info!(request_id = %id, "swap request auto-rejected");
                }
                Ok(request)
            }
            Err(e) => {
                debug!(request_id = %request_id, responder = %responder_id, error = %e, "response refused");
                Err(e)
            }
        }
    }

    pub fn get_swap_request(&self, request_id: SwapRequestId) -> Result<SwapRequest> {
        self.store
            .read(|tables| tables.request(request_id).cloned())?
            .ok_or_else(|| SwapError::not_found(request_id))
    }
}

fn open_request(
    tables: &mut Tables,
    requester_id: UserId,
    requester_slot_id: EventId,
    target_slot_id: EventId,
) -> Result<SwapRequest> {
    let offered = tables
        .event(requester_slot_id)
        .ok_or_else(|| SwapError::not_found(requester_slot_id))?;
    let wanted = tables
        .event(target_slot_id)
        .ok_or_else(|| SwapError::not_found(target_slot_id))?;

    if !offered.is_owned_by(requester_id) {
        return Err(SwapError::not_owner(requester_id, requester_slot_id));
    }
    if offered.user_id == wanted.user_id {
        return Err(SwapError::SelfSwap(requester_id));
    }
    for slot in [offered, wanted] {
        if slot.status != EventStatus::Swappable {
            return Err(SwapError::invalid_state(
                slot.id,
                format!("slot is {}, expected SWAPPABLE", slot.status),
            ));
        }
    }

    let request = SwapRequest::new(requester_id, offered.id, wanted.user_id, wanted.id);

    for slot in request.slots() {
        if let Some(event) = tables.event_mut(slot) {
            event.status = EventStatus::SwapPending;
        }
    }
    tables.insert_request(request.clone());
    Ok(request)
}

/// Resolve the request and confirm the responder owns the requested slot.
fn check_response(
    tables: &Tables,
    request_id: SwapRequestId,
    responder_id: UserId,
) -> Result<SwapRequest> {
    let request = tables
        .request(request_id)
        .ok_or_else(|| SwapError::not_found(request_id))?;

    if !request.is_pending() {
        return Err(SwapError::invalid_state(
            request_id,
            format!("already {}", request.status),
        ));
    }

    let wanted = tables
        .event(request.requested_slot_id)
        .ok_or_else(|| SwapError::not_found(request.requested_slot_id))?;
    if !wanted.is_owned_by(responder_id) {
        return Err(SwapError::not_owner(responder_id, request_id));
    }

    Ok(request.clone())
}

/// Swap ownership of both slots, then auto-reject every other pending request
/// that references either of them. Returns the auto-rejected request ids.
fn accept_request(
    tables: &mut Tables,
    request: &SwapRequest,
    now: DateTime<Utc>,
) -> Result<Vec<SwapRequestId>> {
    // Both slots must still be reserved by the parties that opened the request.
    for (slot, owner) in [
        (request.requester_slot_id, request.requester_id),
        (request.requested_slot_id, request.requested_user_id),
    ] {
        let event = tables
            .event(slot)
            .ok_or_else(|| SwapError::not_found(slot))?;
        if event.status != EventStatus::SwapPending || !event.is_owned_by(owner) {
            return Err(SwapError::invalid_state(
                slot,
                "slot changed since the request was made",
            ));
        }
    }

    for (slot, new_owner) in [
        (request.requester_slot_id, request.requested_user_id),
        (request.requested_slot_id, request.requester_id),
    ] {
        if let Some(event) = tables.event_mut(slot) {
            event.user_id = new_owner;
            event.status = EventStatus::Busy;
        }
    }
    tables.resolve_request(request.id, SwapRequestStatus::Accepted, now);

    let traded = request.slots();
    let mut cascaded = Vec::new();
    let mut counterparts = BTreeSet::new();
    for slot in traded {
        for other_id in tables.pending_for(slot) {
            if let Some(other) = tables.request(other_id) {
                counterparts.extend(other.slots().into_iter().filter(|s| !traded.contains(s)));
            }
            if tables.resolve_request(other_id, SwapRequestStatus::Rejected, now) {
                cascaded.push(other_id);
            }
        }
    }
    for slot in counterparts {
        release_if_unclaimed(tables, slot);
    }

    Ok(cascaded)
}

fn reject_request(tables: &mut Tables, request: &SwapRequest, now: DateTime<Utc>) {
    tables.resolve_request(request.id, SwapRequestStatus::Rejected, now);
    for slot in request.slots() {
        release_if_unclaimed(tables, slot);
    }
}

/// A `SwapPending` slot with no remaining pending request goes back on offer.
fn release_if_unclaimed(tables: &mut Tables, slot: EventId) {
    if tables.has_pending(slot) {
        return;
    }
    if let Some(event) = tables.event_mut(slot) {
        if event.status == EventStatus::SwapPending {
            event.status = EventStatus::Swappable;
        }
    }
}
