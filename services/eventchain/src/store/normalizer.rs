use alloy_primitives::{Address, U256};
use contract_client::{RawEventDetails, RawEventList, RawEventRecord};

use crate::errors::EventChainError;
use crate::types::event_types::{EventDetails, EventRecord, RefundPolicy};

/// Decodes a `(ids, records)` pair into events, index-aligned with `ids`.
/// Fails as a whole; a partial list is never returned.
pub fn normalize_event_list(raw: &RawEventList) -> Result<Vec<EventRecord>, EventChainError> {
    if raw.ids.len() != raw.records.len() {
        return Err(EventChainError::MalformedResponse(format!(
            "{} ids but {} records",
            raw.ids.len(),
            raw.records.len()
        )));
    }

    raw.ids
        .iter()
        .zip(&raw.records)
        .map(|(id, record)| {
            let id = narrow("id", *id)?;
            normalize_event(id, record)
        })
        .collect()
}

pub fn normalize_event(id: u64, raw: &RawEventRecord) -> Result<EventRecord, EventChainError> {
    let policy_tag = narrow("refundPolicy", raw.refund_policy)?;
    let refund_policy = RefundPolicy::from_tag(policy_tag).ok_or_else(|| {
        EventChainError::MalformedResponse(format!(
            "event #{}: unknown refund policy tag {}",
            id, policy_tag
        ))
    })?;

    Ok(EventRecord {
        id,
        owner: raw.owner,
        name: raw.event_name.clone(),
        details: raw.event_details.clone(),
        location: raw.event_location.clone(),
        image_ref: raw.event_card_img_url.clone(),
        start_date: narrow("startDate", raw.start_date)?,
        end_date: narrow("endDate", raw.end_date)?,
        start_time: narrow("startTime", raw.start_time)?,
        end_time: narrow("endTime", raw.end_time)?,
        is_active: raw.is_active,
        is_canceled: raw.is_canceled,
        funds_released: raw.funds_released,
        exists: raw.exists,
        ticket_price: raw.ticket_price,
        funds_held: raw.funds_held,
        minimum_age: narrow("minimumAge", raw.minimum_age)?,
        max_capacity: narrow("maxCapacity", raw.max_capacity)?,
        refund_policy,
        refund_buffer_hours: narrow("refundBufferHours", raw.refund_buffer_hours)?,
    })
}

/// Decodes a `getEventById` result. A record that was never created (or has
/// been deleted) comes back zeroed with `exists = false` and is reported as
/// not found.
pub fn normalize_event_details(
    id: u64,
    raw: &RawEventDetails,
) -> Result<EventDetails, EventChainError> {
    let event = normalize_event(id, &raw.record)?;
    if !event.exists {
        return Err(EventChainError::NotFound(id));
    }

    Ok(EventDetails {
        event,
        attendees: dedup_attendees(&raw.attendees),
    })
}

fn dedup_attendees(attendees: &[Address]) -> Vec<Address> {
    let mut unique: Vec<Address> = Vec::with_capacity(attendees.len());
    for attendee in attendees {
        if !unique.contains(attendee) {
            unique.push(*attendee);
        }
    }
    unique
}

fn narrow(field: &str, value: U256) -> Result<u64, EventChainError> {
    u64::try_from(value).map_err(|_| {
        EventChainError::MalformedResponse(format!("{} out of range: {}", field, value))
    })
}
