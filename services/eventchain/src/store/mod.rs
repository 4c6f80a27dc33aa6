pub mod event_store;
pub mod normalizer;

pub use event_store::{spawn_event_store, EventStore};
