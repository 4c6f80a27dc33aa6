use alloy_primitives::Address;

use crate::engine::capacity::derive_capacity;
use crate::engine::refund::derive_refund_eligibility;
use crate::engine::status::derive_status;
use crate::types::event_types::{EventDetails, EventRecord, EventStatus, TicketAvailability};

pub fn is_registered(attendees: &[Address], account: Option<Address>) -> bool {
    account.is_some_and(|account| attendees.contains(&account))
}

/// Organizers may cancel an active event until it starts.
pub fn can_cancel(event: &EventRecord, now: u64) -> bool {
    event.is_active && !event.is_canceled && event.start_date > now
}

/// Ticket revenue becomes claimable once the event is over.
pub fn can_release_funds(event: &EventRecord, now: u64) -> bool {
    event.end_date < now && !event.is_canceled && !event.funds_released && !event.funds_held.is_zero()
}

pub fn can_request_refund(details: &EventDetails, account: Option<Address>, now: u64) -> bool {
    is_registered(&details.attendees, account)
        && derive_refund_eligibility(&details.event, now).eligible
}

pub fn ticket_availability(
    details: &EventDetails,
    account: Option<Address>,
    now: u64,
) -> TicketAvailability {
    let status = derive_status(&details.event, now);
    if !details.event.exists {
        return TicketAvailability::Closed(EventStatus::Inactive);
    }
    if status != EventStatus::Upcoming {
        return TicketAvailability::Closed(status);
    }
    if is_registered(&details.attendees, account) {
        return TicketAvailability::AlreadyOwned;
    }
    let capacity = derive_capacity(details.attendees.len() as u64, details.event.max_capacity);
    if capacity.remaining == 0 {
        return TicketAvailability::SoldOut;
    }
    TicketAvailability::Available
}

pub fn can_buy_ticket(details: &EventDetails, account: Option<Address>, now: u64) -> bool {
    account.is_some() && ticket_availability(details, account, now) == TicketAvailability::Available
}
