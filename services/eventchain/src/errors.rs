use contract_client::GatewayError;
use thiserror::Error;

use crate::types::tx_types::TxKey;
use crate::utils::revert::classify_rpc_message;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventChainError {
    /// A local precondition failed; nothing was sent anywhere.
    #[error("{0}")]
    Validation(String),

    #[error("malformed contract response: {0}")]
    MalformedResponse(String),

    #[error("Transaction was cancelled")]
    UserRejected,

    #[error("Insufficient funds for gas fees")]
    InsufficientFunds,

    #[error("{message}")]
    ContractReverted { message: String },

    #[error("network error: {0}")]
    Transport(String),

    #[error("{0} is already in progress")]
    ActionInFlight(TxKey),

    #[error("Failed to upload image: {0}")]
    Storage(String),

    #[error("event #{0} not found")]
    NotFound(u64),
}

impl EventChainError {
    /// Whether a user-initiated retry of the same action can succeed without
    /// changing any input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EventChainError::Transport(_) | EventChainError::Storage(_)
        )
    }

    /// Wallet declines are cancellations, not faults.
    pub fn is_benign(&self) -> bool {
        matches!(self, EventChainError::UserRejected)
    }
}

impl From<GatewayError> for EventChainError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport(msg) => EventChainError::Transport(msg),
            GatewayError::Decode(msg) => EventChainError::MalformedResponse(msg),
            GatewayError::Rpc(msg) => classify_rpc_message(&msg),
        }
    }
}
