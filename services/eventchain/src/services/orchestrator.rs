use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use alloy_primitives::{Address, TxHash};
use chrono::Utc;
use contract_client::{ContractCall, ContractGateway, TxReceipt};
use log::{error, info, warn};
use tokio::task::JoinHandle;

use crate::errors::EventChainError;
use crate::services::event_loader::EventLoader;
use crate::services::image_storage::ImageStorage;
use crate::services::wallet_session::WalletSession;
use crate::types::event_types::EventRecord;
use crate::types::form_types::{CreateEventInput, ImageUpload};
use crate::types::tx_types::{TxKey, TxOperation, TxOutcome, TxState};
use crate::utils::revert::revert_message;

/// Receives every state change of every operation. All methods default to
/// no-ops.
pub trait TxObserver: Send + Sync {
    fn on_submitting(&self, _op: &TxOperation) {}

    fn on_pending_confirmation(&self, _op: &TxOperation, _tx_hash: TxHash) {}

    fn on_confirmed(&self, _op: &TxOperation, _receipt: &TxReceipt) {}

    fn on_failed(&self, _op: &TxOperation, _error: &EventChainError) {}
}

/// Writes operation progress to the log.
pub struct LogObserver;

impl TxObserver for LogObserver {
    fn on_submitting(&self, op: &TxOperation) {
        info!("{} submitting ({})", op.key, op.id);
    }

    fn on_pending_confirmation(&self, op: &TxOperation, tx_hash: TxHash) {
        info!("{} pending confirmation: {}", op.key, tx_hash);
    }

    fn on_confirmed(&self, op: &TxOperation, receipt: &TxReceipt) {
        info!(
            "{} confirmed in block {} ({})",
            op.key, receipt.block_number, receipt.tx_hash
        );
    }

    fn on_failed(&self, op: &TxOperation, error: &EventChainError) {
        if error.is_benign() {
            info!("{} cancelled by user", op.key);
        } else {
            error!("{} failed: {}", op.key, error);
        }
    }
}

type InFlightSet = Arc<Mutex<HashSet<TxKey>>>;

/// Holds a key in the in-flight set until dropped.
struct InFlightSlot {
    set: InFlightSet,
    key: TxKey,
}

impl InFlightSlot {
    fn claim(set: &InFlightSet, key: TxKey) -> Result<Self, EventChainError> {
        let mut guard = set.lock().unwrap_or_else(PoisonError::into_inner);
        if !guard.insert(key) {
            return Err(EventChainError::ActionInFlight(key));
        }
        Ok(Self {
            set: set.clone(),
            key,
        })
    }
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        let mut guard = self.set.lock().unwrap_or_else(PoisonError::into_inner);
        guard.remove(&self.key);
    }
}

/// Drives contract writes from `Idle` to `Confirmed` or `Failed`, then
/// re-reads what the write changed.
pub struct TransactionOrchestrator<G, S> {
    gateway: Arc<G>,
    storage: Arc<S>,
    loader: EventLoader<G>,
    session: WalletSession,
    in_flight: InFlightSet,
    observers: Vec<Arc<dyn TxObserver>>,
    uploads: Arc<Mutex<HashMap<(usize, u64), String>>>,
    confirmation_timeout: Duration,
}

impl<G, S> Clone for TransactionOrchestrator<G, S> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            storage: self.storage.clone(),
            loader: self.loader.clone(),
            session: self.session.clone(),
            in_flight: self.in_flight.clone(),
            observers: self.observers.clone(),
            uploads: self.uploads.clone(),
            confirmation_timeout: self.confirmation_timeout,
        }
    }
}

impl<G, S> TransactionOrchestrator<G, S>
where
    G: ContractGateway,
    S: ImageStorage,
{
    pub fn new(
        gateway: Arc<G>,
        storage: Arc<S>,
        loader: EventLoader<G>,
        session: WalletSession,
        confirmation_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            storage,
            loader,
            session,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            observers: Vec::new(),
            uploads: Arc::new(Mutex::new(HashMap::new())),
            confirmation_timeout,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TxObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn loader(&self) -> &EventLoader<G> {
        &self.loader
    }

    pub fn is_in_flight(&self, key: &TxKey) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Runs one contract call to completion. `createEvent` is rejected here;
    /// it needs the validated form and upload of `create_event`.
    pub async fn execute(&self, call: ContractCall) -> Result<TxOutcome, EventChainError> {
        let mut op = TxOperation::new(TxKey::for_call(&call));

        if matches!(call, ContractCall::CreateEvent(_)) {
            let e = EventChainError::Validation("Events are created through create_event".into());
            return Err(self.fail(&mut op, e));
        }
        let account = match self.session.require_account() {
            Ok(account) => account,
            Err(e) => return Err(self.fail(&mut op, e)),
        };
        let slot = match InFlightSlot::claim(&self.in_flight, op.key) {
            Ok(slot) => slot,
            Err(e) => return Err(self.fail(&mut op, e)),
        };

        self.begin(&mut op);
        self.submit_and_confirm(&mut op, slot, account, call).await
    }

    /// Same as `execute`, on a background task. The task keeps running (and
    /// still refreshes the cache) if the handle is dropped.
    pub fn dispatch(&self, call: ContractCall) -> JoinHandle<Result<TxOutcome, EventChainError>> {
        let this = self.clone();
        tokio::spawn(async move { this.execute(call).await })
    }

    /// Uploads the image, then submits `createEvent` with its content id. A
    /// failed upload ends the operation before anything is submitted.
    pub async fn create_event(
        &self,
        input: CreateEventInput,
        image: ImageUpload,
    ) -> Result<TxOutcome, EventChainError> {
        let mut op = TxOperation::new(TxKey::create_event());

        let account = match self.session.require_account() {
            Ok(account) => account,
            Err(e) => return Err(self.fail(&mut op, e)),
        };
        if let Err(e) = input.validate_at(Utc::now()).and_then(|_| image.validate()) {
            return Err(self.fail(&mut op, e));
        }
        let slot = match InFlightSlot::claim(&self.in_flight, op.key) {
            Ok(slot) => slot,
            Err(e) => return Err(self.fail(&mut op, e)),
        };

        self.begin(&mut op);

        let image_ref = match self.upload_once(&image).await {
            Ok(image_ref) => image_ref,
            Err(e) => return Err(self.fail(&mut op, e)),
        };
        let call = match input.to_call(image_ref) {
            Ok(call) => call,
            Err(e) => return Err(self.fail(&mut op, e)),
        };

        self.submit_and_confirm(&mut op, slot, account, ContractCall::CreateEvent(call))
            .await
    }

    pub fn dispatch_create_event(
        &self,
        input: CreateEventInput,
        image: ImageUpload,
    ) -> JoinHandle<Result<TxOutcome, EventChainError>> {
        let this = self.clone();
        tokio::spawn(async move { this.create_event(input, image).await })
    }

    /// Pays the event's ticket price.
    pub async fn buy_ticket(&self, event: &EventRecord) -> Result<TxOutcome, EventChainError> {
        if !event.exists {
            let mut op = TxOperation::new(TxKey::for_call(&ContractCall::BuyTicket {
                event_id: event.id,
                value: event.ticket_price,
            }));
            return Err(self.fail(&mut op, EventChainError::NotFound(event.id)));
        }
        self.execute(ContractCall::BuyTicket {
            event_id: event.id,
            value: event.ticket_price,
        })
        .await
    }

    pub async fn cancel_event(&self, event_id: u64) -> Result<TxOutcome, EventChainError> {
        self.execute(ContractCall::CancelEvent { event_id }).await
    }

    pub async fn request_refund(&self, event_id: u64) -> Result<TxOutcome, EventChainError> {
        self.execute(ContractCall::RequestRefund { event_id }).await
    }

    pub async fn release_funds(&self, event_id: u64) -> Result<TxOutcome, EventChainError> {
        self.execute(ContractCall::ReleaseFunds { event_id }).await
    }

    pub async fn withdraw(&self) -> Result<TxOutcome, EventChainError> {
        self.execute(ContractCall::Withdraw).await
    }

    pub async fn delete_event(&self, event_id: u64) -> Result<TxOutcome, EventChainError> {
        self.execute(ContractCall::DeleteEventById { event_id }).await
    }

    async fn submit_and_confirm(
        &self,
        op: &mut TxOperation,
        slot: InFlightSlot,
        account: Address,
        call: ContractCall,
    ) -> Result<TxOutcome, EventChainError> {
        let tx_hash = match self.gateway.submit(account, call.clone()).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => return Err(self.fail(op, e.into())),
        };

        op.advance(TxState::PendingConfirmation);
        for observer in &self.observers {
            observer.on_pending_confirmation(op, tx_hash);
        }

        let receipt = match tokio::time::timeout(
            self.confirmation_timeout,
            self.gateway.wait_for_receipt(tx_hash),
        )
        .await
        {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => return Err(self.fail(op, e.into())),
            Err(_) => {
                let e = EventChainError::Transport(format!(
                    "no confirmation for {} within {:?}",
                    tx_hash, self.confirmation_timeout
                ));
                self.keep_watching(slot, account, call, tx_hash);
                return Err(self.fail(op, e));
            }
        };

        if !receipt.success {
            let reason = receipt
                .revert_reason
                .as_deref()
                .unwrap_or("Transaction reverted");
            let e = EventChainError::ContractReverted {
                message: revert_message(reason),
            };
            return Err(self.fail(op, e));
        }

        op.advance(TxState::Confirmed);

        let refresh_error = match self.loader.refresh_after(&call, account).await {
            Ok(()) => None,
            Err(e) => {
                warn!("{} confirmed but refresh failed: {}", op.key, e);
                Some(e)
            }
        };

        for observer in &self.observers {
            observer.on_confirmed(op, &receipt);
        }

        Ok(TxOutcome {
            operation_id: op.id,
            key: op.key,
            tx_hash,
            block_number: receipt.block_number,
            refresh_error,
        })
    }

    /// The transaction is still pending after the caller gave up on it. Its
    /// key stays reserved until the receipt arrives, and a confirmed call
    /// still refreshes the cache.
    fn keep_watching(
        &self,
        slot: InFlightSlot,
        account: Address,
        call: ContractCall,
        tx_hash: TxHash,
    ) {
        let gateway = self.gateway.clone();
        let loader = self.loader.clone();
        tokio::spawn(async move {
            let key = slot.key;
            match gateway.wait_for_receipt(tx_hash).await {
                Ok(receipt) if receipt.success => {
                    info!("{} confirmed late in block {}", key, receipt.block_number);
                    if let Err(e) = loader.refresh_after(&call, account).await {
                        warn!("{} confirmed late but refresh failed: {}", key, e);
                    }
                }
                Ok(receipt) => {
                    let reason = receipt
                        .revert_reason
                        .as_deref()
                        .unwrap_or("Transaction reverted");
                    warn!("{} reverted after timeout: {}", key, revert_message(reason));
                }
                Err(e) => {
                    error!("{} lost track of {}: {}", key, tx_hash, e);
                }
            }
            drop(slot);
        });
    }

    async fn upload_once(&self, image: &ImageUpload) -> Result<String, EventChainError> {
        let fingerprint = image.fingerprint();
        let cached = self
            .uploads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&fingerprint)
            .cloned();
        if let Some(image_ref) = cached {
            info!("Reusing uploaded image {}", image_ref);
            return Ok(image_ref);
        }

        let image_ref = self.storage.upload(image).await?;
        self.uploads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fingerprint, image_ref.clone());
        Ok(image_ref)
    }

    fn begin(&self, op: &mut TxOperation) {
        op.advance(TxState::Submitting);
        for observer in &self.observers {
            observer.on_submitting(op);
        }
    }

    fn fail(&self, op: &mut TxOperation, error: EventChainError) -> EventChainError {
        op.advance(TxState::Failed);
        for observer in &self.observers {
            observer.on_failed(op, &error);
        }
        error
    }
}
