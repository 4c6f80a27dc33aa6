pub mod gateway;
pub mod types;

pub use gateway::{ContractGateway, GatewayError};
pub use types::{
    ContractCall, CreateEventCall, RawEventDetails, RawEventList, RawEventRecord, TxReceipt,
};

pub use alloy_primitives::{Address, TxHash, U256};
