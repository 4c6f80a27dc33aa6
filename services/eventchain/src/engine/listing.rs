use crate::types::event_types::EventRecord;

/// Events shown on the public browse page: existing, not canceled, soonest
/// first.
pub fn browse_events(events: &[EventRecord]) -> Vec<EventRecord> {
    let mut visible: Vec<EventRecord> = events
        .iter()
        .filter(|event| event.exists && !event.is_canceled)
        .cloned()
        .collect();
    visible.sort_by_key(|event| (event.start_date, event.id));
    visible
}
