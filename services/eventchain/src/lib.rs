pub mod app;
pub mod config;
pub mod engine;
pub mod errors;
pub mod services;
pub mod store;
pub mod types;
pub mod utils;

pub use app::EventChainApp;
pub use config::AppConfig;
pub use errors::EventChainError;
