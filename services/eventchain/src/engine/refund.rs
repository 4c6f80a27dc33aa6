use crate::types::event_types::{EventRecord, RefundEligibility, RefundPolicy};

const SECS_PER_HOUR: u64 = 3_600;

/// Whether a ticket holder could request a refund at `now`, and why.
///
/// Under `CustomBuffer` the deadline is `start_date - buffer_hours`; a refund
/// is possible only strictly before it.
pub fn derive_refund_eligibility(event: &EventRecord, now: u64) -> RefundEligibility {
    if event.is_canceled {
        return eligible("Event canceled - full refund available".into());
    }

    match event.refund_policy {
        RefundPolicy::NoRefund => ineligible("No refunds for this event".into()),
        RefundPolicy::RefundBeforeStart => {
            if now < event.start_date {
                eligible("Refund available before event starts".into())
            } else {
                ineligible("Event has started".into())
            }
        }
        RefundPolicy::CustomBuffer => {
            let deadline = refund_deadline(event);
            if now < deadline {
                let hours_left = (deadline - now) / SECS_PER_HOUR;
                eligible(format!("{}h until refund deadline", hours_left))
            } else {
                ineligible(format!(
                    "{}h buffer period expired",
                    event.refund_buffer_hours
                ))
            }
        }
    }
}

/// Last instant (exclusive) at which a refund may be requested.
pub fn refund_deadline(event: &EventRecord) -> u64 {
    match event.refund_policy {
        RefundPolicy::CustomBuffer => event
            .start_date
            .saturating_sub(event.refund_buffer_hours.saturating_mul(SECS_PER_HOUR)),
        RefundPolicy::RefundBeforeStart | RefundPolicy::NoRefund => event.start_date,
    }
}

fn eligible(reason: String) -> RefundEligibility {
    RefundEligibility {
        eligible: true,
        reason,
    }
}

fn ineligible(reason: String) -> RefundEligibility {
    RefundEligibility {
        eligible: false,
        reason,
    }
}
