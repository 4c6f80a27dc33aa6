use crate::errors::EventChainError;

const GENERIC_FAILURE: &str = "Transaction failed - please try again";
const MAX_RAW_MESSAGE_LEN: usize = 100;

/// Revert reason fragments emitted by the contract, and what the user sees.
const REVERT_MESSAGES: &[(&str, &str)] = &[
    ("transfer amount exceeds balance", "Insufficient token balance"),
    ("Already purchased", "You already own a ticket for this event"),
    ("Event expired", "This event has already started or ended"),
    ("Event inactive", "This event is no longer active"),
    ("Event at capacity", "Sorry, this event is sold out"),
    ("Refund period ended", "Refund period has expired for this event"),
    ("No ticket purchased", "You don't have a ticket to refund"),
    ("Insufficient allowance", "Token approval failed - please try again"),
];

/// Maps an error message reported by the wallet or node onto the error
/// taxonomy.
pub fn classify_rpc_message(message: &str) -> EventChainError {
    let lowered = message.to_lowercase();
    if lowered.contains("user rejected") || lowered.contains("user denied") {
        return EventChainError::UserRejected;
    }
    if lowered.contains("insufficient funds") {
        return EventChainError::InsufficientFunds;
    }
    EventChainError::ContractReverted {
        message: revert_message(message),
    }
}

/// User-facing text for a revert reason. Unknown reasons are shown as-is
/// unless they are too long to be useful.
pub fn revert_message(raw: &str) -> String {
    if let Some((_, friendly)) = REVERT_MESSAGES
        .iter()
        .find(|(pattern, _)| raw.contains(pattern))
    {
        return (*friendly).to_string();
    }

    if raw.chars().count() > MAX_RAW_MESSAGE_LEN {
        GENERIC_FAILURE.to_string()
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_reverts_get_friendly_text() {
        assert_eq!(
            revert_message("execution reverted: Event at capacity"),
            "Sorry, this event is sold out"
        );
        assert_eq!(
            revert_message("execution reverted: Already purchased"),
            "You already own a ticket for this event"
        );
        assert_eq!(
            revert_message("ERC20: transfer amount exceeds balance"),
            "Insufficient token balance"
        );
    }

    #[test]
    fn unknown_reverts_fall_back() {
        assert_eq!(revert_message("execution reverted: Nope"), "execution reverted: Nope");
        let long = "x".repeat(150);
        assert_eq!(revert_message(&long), GENERIC_FAILURE);
    }

    #[test]
    fn wallet_messages_are_classified() {
        assert_eq!(
            classify_rpc_message("MetaMask Tx Signature: User denied transaction signature."),
            EventChainError::UserRejected
        );
        assert_eq!(
            classify_rpc_message("User rejected the request."),
            EventChainError::UserRejected
        );
        assert_eq!(
            classify_rpc_message("insufficient funds for gas * price + value"),
            EventChainError::InsufficientFunds
        );
        assert_eq!(
            classify_rpc_message("execution reverted: Refund period ended"),
            EventChainError::ContractReverted {
                message: "Refund period has expired for this event".into()
            }
        );
    }
}
