pub mod block_watcher;
pub mod event_loader;
pub mod geocoding;
pub mod image_storage;
pub mod orchestrator;
pub mod wallet_session;

pub use block_watcher::BlockWatcher;
pub use event_loader::EventLoader;
pub use geocoding::{MapboxGeocoder, PlaceSearch};
pub use image_storage::{ImageStorage, PinataStorage};
pub use orchestrator::{LogObserver, TransactionOrchestrator, TxObserver};
pub use wallet_session::{ConnectionState, WalletSession};
