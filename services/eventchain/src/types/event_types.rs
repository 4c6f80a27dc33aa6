use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefundPolicy {
    NoRefund,
    RefundBeforeStart,
    CustomBuffer,
}

impl RefundPolicy {
    pub fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            0 => Some(RefundPolicy::NoRefund),
            1 => Some(RefundPolicy::RefundBeforeStart),
            2 => Some(RefundPolicy::CustomBuffer),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            RefundPolicy::NoRefund => 0,
            RefundPolicy::RefundBeforeStart => 1,
            RefundPolicy::CustomBuffer => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RefundPolicy::NoRefund => "No Refunds",
            RefundPolicy::RefundBeforeStart => "Before Event Start",
            RefundPolicy::CustomBuffer => "Custom Buffer Period",
        }
    }
}

/// Canonical, normalized view of one on-chain event.
///
/// `start_date`/`end_date` are epoch seconds. `start_time`/`end_time` are
/// seconds since local midnight and are only meaningful for display.
/// `ticket_price` and `funds_held` are wei amounts.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub id: u64,
    pub owner: Address,
    pub name: String,
    pub details: String,
    pub location: String,
    pub image_ref: String,
    pub start_date: u64,
    pub end_date: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub is_active: bool,
    pub is_canceled: bool,
    pub funds_released: bool,
    pub exists: bool,
    pub ticket_price: U256,
    pub funds_held: U256,
    pub minimum_age: u64,
    pub max_capacity: u64,
    pub refund_policy: RefundPolicy,
    pub refund_buffer_hours: u64,
}

/// A single event together with its attendee set.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub event: EventRecord,
    pub attendees: Vec<Address>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Upcoming,
    Live,
    Ended,
    Canceled,
    Inactive,
}

impl EventStatus {
    pub fn label(self) -> &'static str {
        match self {
            EventStatus::Upcoming => "Upcoming",
            EventStatus::Live => "Live Now",
            EventStatus::Ended => "Ended",
            EventStatus::Canceled => "Cancelled",
            EventStatus::Inactive => "Inactive",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RefundEligibility {
    pub eligible: bool,
    pub reason: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityStats {
    pub filled: u64,
    pub max_capacity: u64,
    pub remaining: u64,
    pub percent: u8,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAvailability {
    Available,
    AlreadyOwned,
    SoldOut,
    Closed(EventStatus),
}
