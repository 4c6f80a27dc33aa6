use std::fmt;

use alloy_primitives::TxHash;
use chrono::{DateTime, Utc};
use contract_client::ContractCall;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EventChainError;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CreateEvent,
    BuyTicket,
    CancelEvent,
    RequestRefund,
    ReleaseFunds,
    Withdraw,
    DeleteEvent,
}

/// Identifies a logical action on a target; at most one operation per key
/// may be in flight.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxKey {
    pub action: ActionKind,
    pub target: Option<u64>,
}

impl TxKey {
    pub fn for_call(call: &ContractCall) -> Self {
        let action = match call {
            ContractCall::CreateEvent(_) => ActionKind::CreateEvent,
            ContractCall::BuyTicket { .. } => ActionKind::BuyTicket,
            ContractCall::CancelEvent { .. } => ActionKind::CancelEvent,
            ContractCall::RequestRefund { .. } => ActionKind::RequestRefund,
            ContractCall::ReleaseFunds { .. } => ActionKind::ReleaseFunds,
            ContractCall::Withdraw => ActionKind::Withdraw,
            ContractCall::DeleteEventById { .. } => ActionKind::DeleteEvent,
        };
        Self {
            action,
            target: call.event_id(),
        }
    }

    pub fn create_event() -> Self {
        Self {
            action: ActionKind::CreateEvent,
            target: None,
        }
    }
}

impl fmt::Display for TxKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(id) => write!(f, "{:?} #{}", self.action, id),
            None => write!(f, "{:?}", self.action),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Idle,
    Submitting,
    PendingConfirmation,
    Confirmed,
    Failed,
}

impl TxState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TxState::Confirmed | TxState::Failed)
    }

    pub fn can_transition(self, next: TxState) -> bool {
        matches!(
            (self, next),
            (TxState::Idle, TxState::Submitting)
                | (TxState::Submitting, TxState::PendingConfirmation)
                | (TxState::PendingConfirmation, TxState::Confirmed)
                | (TxState::Idle, TxState::Failed)
                | (TxState::Submitting, TxState::Failed)
                | (TxState::PendingConfirmation, TxState::Failed)
        )
    }
}

/// One user-triggered operation, tracked from `Idle` to a terminal state.
#[derive(Debug, Clone)]
pub struct TxOperation {
    pub id: Uuid,
    pub key: TxKey,
    pub state: TxState,
    pub started_at: DateTime<Utc>,
}

impl TxOperation {
    pub fn new(key: TxKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            state: TxState::Idle,
            started_at: Utc::now(),
        }
    }

    pub(crate) fn advance(&mut self, next: TxState) {
        debug_assert!(
            self.state.can_transition(next),
            "illegal transition {:?} -> {:?} for {}",
            self.state,
            next,
            self.key
        );
        self.state = next;
    }
}

#[derive(Debug, Clone)]
pub struct TxOutcome {
    pub operation_id: Uuid,
    pub key: TxKey,
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Set when the post-confirmation re-read failed; the local cache may
    /// still hold pre-transaction data and should be refreshed again.
    pub refresh_error: Option<EventChainError>,
}
