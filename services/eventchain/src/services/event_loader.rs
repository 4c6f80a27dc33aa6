use std::sync::Arc;

use alloy_primitives::{Address, U256};
use contract_client::{ContractCall, ContractGateway};
use log::{debug, info};

use crate::errors::EventChainError;
use crate::store::normalizer::{normalize_event_details, normalize_event_list};
use crate::store::EventStore;
use crate::types::event_types::{EventDetails, EventRecord};

/// Reads events from the contract, normalizes them and writes the result into
/// the shared cache. The only writer of `EventStore`.
pub struct EventLoader<G> {
    gateway: Arc<G>,
    store: EventStore,
}

impl<G> Clone for EventLoader<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            store: self.store.clone(),
        }
    }
}

impl<G: ContractGateway> EventLoader<G> {
    pub fn new(gateway: Arc<G>, store: EventStore) -> Self {
        Self { gateway, store }
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub async fn load_all_events(&self) -> Result<Vec<EventRecord>, EventChainError> {
        let raw = self.gateway.get_all_events().await?;
        let events = normalize_event_list(&raw)?;
        let visible: Vec<EventRecord> = events.into_iter().filter(|e| e.exists).collect();

        info!("Loaded {} events", visible.len());
        self.store.replace_events(visible.clone()).await;
        Ok(visible)
    }

    pub async fn load_event(&self, event_id: u64) -> Result<EventDetails, EventChainError> {
        let raw = self.gateway.get_event_by_id(event_id).await?;
        match normalize_event_details(event_id, &raw) {
            Ok(details) => {
                debug!(
                    "Loaded event #{} with {} attendees",
                    event_id,
                    details.attendees.len()
                );
                self.store.upsert_details(details.clone()).await;
                Ok(details)
            }
            Err(EventChainError::NotFound(id)) => {
                self.store.remove_event(id).await;
                Err(EventChainError::NotFound(id))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn load_creator_events(
        &self,
        owner: Address,
    ) -> Result<Vec<EventRecord>, EventChainError> {
        let raw = self.gateway.get_active_events_by_creator(owner).await?;
        let events = normalize_event_list(&raw)?;
        self.store.merge_events(events.clone()).await;
        Ok(events.into_iter().filter(|e| e.exists).collect())
    }

    /// Events the account holds a ticket for.
    pub async fn load_user_events(&self, user: Address) -> Result<Vec<EventRecord>, EventChainError> {
        let raw = self.gateway.get_user_events(user).await?;
        let events = normalize_event_list(&raw)?;
        self.store.merge_events(events.clone()).await;
        Ok(events.into_iter().filter(|e| e.exists).collect())
    }

    pub async fn load_pending_withdrawal(&self, account: Address) -> Result<U256, EventChainError> {
        let amount = self.gateway.get_pending_withdrawal(account).await?;
        self.store.set_pending_withdrawal(account, amount).await;
        Ok(amount)
    }

    /// Re-reads whatever a confirmed call may have changed.
    pub async fn refresh_after(
        &self,
        call: &ContractCall,
        account: Address,
    ) -> Result<(), EventChainError> {
        match call {
            ContractCall::CreateEvent(_) => {
                self.load_all_events().await?;
                self.load_creator_events(account).await?;
            }
            ContractCall::BuyTicket { event_id, .. } | ContractCall::CancelEvent { event_id } => {
                self.load_event(*event_id).await?;
            }
            ContractCall::RequestRefund { event_id } | ContractCall::ReleaseFunds { event_id } => {
                self.load_event(*event_id).await?;
                self.load_pending_withdrawal(account).await?;
            }
            ContractCall::Withdraw => {
                self.load_pending_withdrawal(account).await?;
            }
            ContractCall::DeleteEventById { .. } => {
                self.load_all_events().await?;
            }
        }
        Ok(())
    }
}
