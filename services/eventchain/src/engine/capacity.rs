use crate::types::event_types::CapacityStats;

/// Fill level for display. The percentage is rounded half-up and clamped to
/// 100 even if the attendee count overshoots. A zero capacity is rejected at
/// creation; here it reads as 0% rather than dividing by zero.
pub fn derive_capacity(attendee_count: u64, max_capacity: u64) -> CapacityStats {
    let percent = if max_capacity == 0 {
        0
    } else {
        let filled = u128::from(attendee_count);
        let max = u128::from(max_capacity);
        ((200 * filled + max) / (2 * max)).min(100) as u8
    };

    CapacityStats {
        filled: attendee_count,
        max_capacity,
        remaining: max_capacity.saturating_sub(attendee_count),
        percent,
    }
}
