use alloy_primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

/// Event struct as the contract returns it. Every integer is kept at its
/// on-chain width; narrowing happens in the service layer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawEventRecord {
    pub owner: Address,
    pub event_name: String,
    pub event_card_img_url: String,
    pub event_details: String,
    pub start_date: U256,
    pub end_date: U256,
    pub start_time: U256,
    pub end_time: U256,
    pub event_location: String,
    pub is_active: bool,
    pub ticket_price: U256,
    pub funds_held: U256,
    pub minimum_age: U256,
    pub max_capacity: U256,
    pub is_canceled: bool,
    pub funds_released: bool,
    pub exists: bool,
    pub refund_policy: U256,
    pub refund_buffer_hours: U256,
}

/// `(uint256[] ids, Event[] records)` as returned by the list reads.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct RawEventList {
    pub ids: Vec<U256>,
    pub records: Vec<RawEventRecord>,
}

/// `(Event record, address[] attendees)` as returned by `getEventById`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RawEventDetails {
    pub record: RawEventRecord,
    pub attendees: Vec<Address>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventCall {
    pub name: String,
    pub image_ref: String,
    pub details: String,
    pub start_date: u64,
    pub end_date: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub location: String,
    pub price_wei: U256,
    pub minimum_age: u64,
    pub max_capacity: u64,
    pub refund_policy: u8,
    pub refund_buffer_hours: u64,
}

/// A state-changing contract call, ready to be signed and submitted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "function", rename_all = "camelCase")]
pub enum ContractCall {
    CreateEvent(CreateEventCall),
    BuyTicket { event_id: u64, value: U256 },
    CancelEvent { event_id: u64 },
    RequestRefund { event_id: u64 },
    ReleaseFunds { event_id: u64 },
    Withdraw,
    DeleteEventById { event_id: u64 },
}

impl ContractCall {
    pub fn function_name(&self) -> &'static str {
        match self {
            ContractCall::CreateEvent(_) => "createEvent",
            ContractCall::BuyTicket { .. } => "buyTicket",
            ContractCall::CancelEvent { .. } => "cancelEvent",
            ContractCall::RequestRefund { .. } => "requestRefund",
            ContractCall::ReleaseFunds { .. } => "releaseFunds",
            ContractCall::Withdraw => "withdraw",
            ContractCall::DeleteEventById { .. } => "deleteEventById",
        }
    }

    /// Event the call targets, if any.
    pub fn event_id(&self) -> Option<u64> {
        match self {
            ContractCall::BuyTicket { event_id, .. }
            | ContractCall::CancelEvent { event_id }
            | ContractCall::RequestRefund { event_id }
            | ContractCall::ReleaseFunds { event_id }
            | ContractCall::DeleteEventById { event_id } => Some(*event_id),
            ContractCall::CreateEvent(_) | ContractCall::Withdraw => None,
        }
    }

    /// Native value attached to the transaction.
    pub fn value(&self) -> U256 {
        match self {
            ContractCall::BuyTicket { value, .. } => *value,
            _ => U256::ZERO,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub success: bool,
    pub revert_reason: Option<String>,
}
