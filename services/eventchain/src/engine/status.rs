use crate::types::event_types::{EventRecord, EventStatus};

/// Lifecycle status at `now` (epoch seconds). Cancellation and inactivity win
/// over the date window.
pub fn derive_status(event: &EventRecord, now: u64) -> EventStatus {
    if event.is_canceled {
        EventStatus::Canceled
    } else if !event.is_active {
        EventStatus::Inactive
    } else if now < event.start_date {
        EventStatus::Upcoming
    } else if now <= event.end_date {
        EventStatus::Live
    } else {
        EventStatus::Ended
    }
}
