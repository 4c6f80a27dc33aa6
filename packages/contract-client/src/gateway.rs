use std::future::Future;

use alloy_primitives::{Address, TxHash, U256};
use thiserror::Error;

use crate::types::{ContractCall, RawEventDetails, RawEventList, TxReceipt};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The node or wallet could not be reached, or timed out.
    #[error("transport error: {0}")]
    Transport(String),
    /// The node or wallet answered with an error message (rejections,
    /// balance problems, reverts).
    #[error("{0}")]
    Rpc(String),
    /// The response could not be decoded into the expected ABI shape.
    #[error("undecodable response: {0}")]
    Decode(String),
}

/// Read and write surface of the ticketing contract.
///
/// Implementations own the wallet and transport; the service layer only sees
/// raw contract values and transaction hashes.
pub trait ContractGateway: Send + Sync + 'static {
    fn get_all_events(&self) -> impl Future<Output = Result<RawEventList, GatewayError>> + Send;

    fn get_event_by_id(
        &self,
        event_id: u64,
    ) -> impl Future<Output = Result<RawEventDetails, GatewayError>> + Send;

    fn get_active_events_by_creator(
        &self,
        owner: Address,
    ) -> impl Future<Output = Result<RawEventList, GatewayError>> + Send;

    fn get_user_events(
        &self,
        user: Address,
    ) -> impl Future<Output = Result<RawEventList, GatewayError>> + Send;

    fn get_pending_withdrawal(
        &self,
        account: Address,
    ) -> impl Future<Output = Result<U256, GatewayError>> + Send;

    fn block_number(&self) -> impl Future<Output = Result<u64, GatewayError>> + Send;

    /// Hands the call to the wallet for signing and broadcast. Resolves once a
    /// transaction hash exists, not once it is mined.
    fn submit(
        &self,
        from: Address,
        call: ContractCall,
    ) -> impl Future<Output = Result<TxHash, GatewayError>> + Send;

    fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<TxReceipt, GatewayError>> + Send;
}
