use std::future::Future;

use log::{debug, error};
use reqwest::Url;
use serde::Deserialize;

use crate::errors::EventChainError;
use crate::types::place_types::PlaceSuggestion;

const MAPBOX_PLACES_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places/";
const SUGGESTION_LIMIT: &str = "5";

/// Free-text place lookup for the event location field.
pub trait PlaceSearch: Send + Sync + 'static {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<PlaceSuggestion>, EventChainError>> + Send;
}

#[derive(Deserialize, Debug)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize, Debug)]
struct Feature {
    place_name: String,
    center: [f64; 2],
    #[serde(default)]
    relevance: f64,
}

pub struct MapboxGeocoder {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl MapboxGeocoder {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            base_url: MAPBOX_PLACES_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_url(&self, query: &str) -> Result<Url, EventChainError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| EventChainError::Transport(format!("bad geocoding url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| EventChainError::Transport("bad geocoding url".into()))?
            .pop_if_empty()
            .push(&format!("{}.json", query));
        url.query_pairs_mut()
            .append_pair("access_token", &self.token)
            .append_pair("autocomplete", "true")
            .append_pair("limit", SUGGESTION_LIMIT);
        Ok(url)
    }
}

fn into_suggestions(collection: FeatureCollection) -> Vec<PlaceSuggestion> {
    collection
        .features
        .into_iter()
        .map(|feature| PlaceSuggestion {
            display_name: feature.place_name,
            longitude: feature.center[0],
            latitude: feature.center[1],
            relevance: feature.relevance,
        })
        .collect()
}

impl PlaceSearch for MapboxGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<PlaceSuggestion>, EventChainError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.request_url(query)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EventChainError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("Geocoding request failed with {}", status);
            return Err(EventChainError::Transport(format!(
                "geocoding failed ({})",
                status
            )));
        }

        let collection: FeatureCollection = response
            .json()
            .await
            .map_err(|e| EventChainError::MalformedResponse(e.to_string()))?;
        let suggestions = into_suggestions(collection);
        debug!("{} place suggestions for {:?}", suggestions.len(), query);
        Ok(suggestions)
    }
}
