use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceSuggestion {
    pub display_name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub relevance: f64,
}
