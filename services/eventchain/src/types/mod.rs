pub mod event_types;
pub mod form_types;
pub mod place_types;
pub mod tx_types;
