use std::sync::Arc;

use contract_client::ContractGateway;
use log::info;

use crate::config::AppConfig;
use crate::errors::EventChainError;
use crate::services::{
    BlockWatcher, EventLoader, ImageStorage, LogObserver, MapboxGeocoder, PinataStorage,
    TransactionOrchestrator, WalletSession,
};
use crate::store::{spawn_event_store, EventStore};
use crate::types::event_types::EventRecord;
use crate::utils::format::resolve_image_url;

/// Everything a front end needs, wired from one config and one gateway.
pub struct EventChainApp<G, S> {
    pub config: AppConfig,
    pub session: WalletSession,
    pub store: EventStore,
    pub loader: EventLoader<G>,
    pub watcher: BlockWatcher<G>,
    pub orchestrator: TransactionOrchestrator<G, S>,
    pub places: Option<MapboxGeocoder>,
}

impl<G, S> EventChainApp<G, S>
where
    G: ContractGateway,
    S: ImageStorage,
{
    /// Must be called inside a tokio runtime; the event store task is spawned
    /// here.
    pub fn with_storage(config: AppConfig, gateway: Arc<G>, storage: Arc<S>) -> Self {
        let session = WalletSession::new();
        let store = spawn_event_store();
        let loader = EventLoader::new(gateway.clone(), store.clone());
        let watcher = BlockWatcher::new(gateway.clone(), config.block_poll_interval);
        let orchestrator = TransactionOrchestrator::new(
            gateway,
            storage,
            loader.clone(),
            session.clone(),
            config.confirmation_timeout,
        )
        .with_observer(Arc::new(LogObserver));
        let places = config.mapbox_token.as_deref().map(MapboxGeocoder::new);

        info!(
            "EventChain ready for contract {} (place search {})",
            config.contract_address,
            if places.is_some() { "on" } else { "off" }
        );

        Self {
            config,
            session,
            store,
            loader,
            watcher,
            orchestrator,
            places,
        }
    }

    /// Displayable URL for an event's image reference.
    pub fn image_url(&self, event: &EventRecord) -> Option<String> {
        resolve_image_url(&event.image_ref, &self.config.ipfs_gateway_url)
    }

    /// Stops every block poller. Wallet listeners stay with their owners.
    pub async fn shutdown(&self) {
        self.watcher.stop_all().await;
    }
}

impl<G: ContractGateway> EventChainApp<G, PinataStorage> {
    /// Uses Pinata for image uploads; requires `PINATA_JWT`.
    pub fn new(config: AppConfig, gateway: Arc<G>) -> Result<Self, EventChainError> {
        let jwt = config
            .pinata_jwt
            .clone()
            .ok_or_else(|| EventChainError::Validation("PINATA_JWT is not set".into()))?;
        Ok(Self::with_storage(
            config,
            gateway,
            Arc::new(PinataStorage::new(jwt)),
        ))
    }
}
