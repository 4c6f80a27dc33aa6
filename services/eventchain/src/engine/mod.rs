//! Pure derivations over normalized events. Nothing here performs I/O or
//! mutates its inputs; every function takes the current time explicitly.

pub mod actions;
pub mod capacity;
pub mod listing;
pub mod refund;
pub mod status;

pub use actions::{
    can_buy_ticket, can_cancel, can_release_funds, can_request_refund, is_registered,
    ticket_availability,
};
pub use capacity::derive_capacity;
pub use listing::browse_events;
pub use refund::derive_refund_eligibility;
pub use status::derive_status;
