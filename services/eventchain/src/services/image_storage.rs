use std::future::Future;

use chrono::Utc;
use log::{error, info};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use crate::errors::EventChainError;
use crate::types::form_types::ImageUpload;

const PINATA_PIN_FILE_URL: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";

/// Content-addressed storage for event images.
pub trait ImageStorage: Send + Sync + 'static {
    /// Stores the image and returns its content identifier.
    fn upload(
        &self,
        image: &ImageUpload,
    ) -> impl Future<Output = Result<String, EventChainError>> + Send;
}

#[derive(Deserialize, Debug)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

pub struct PinataStorage {
    client: reqwest::Client,
    jwt: String,
    endpoint: String,
}

impl PinataStorage {
    pub fn new(jwt: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            jwt: jwt.into(),
            endpoint: PINATA_PIN_FILE_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn form(image: &ImageUpload) -> Result<Form, EventChainError> {
        let file = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| EventChainError::Storage(e.to_string()))?;

        let metadata = json!({ "name": format!("event-image-{}", Utc::now().timestamp_millis()) });

        Ok(Form::new()
            .part("file", file)
            .text("pinataMetadata", metadata.to_string()))
    }
}

impl ImageStorage for PinataStorage {
    async fn upload(&self, image: &ImageUpload) -> Result<String, EventChainError> {
        image.validate()?;
        let form = Self::form(image)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| EventChainError::Storage(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Pinata upload failed with {}: {}", status, body);
            return Err(EventChainError::Storage(format!("upload rejected ({})", status)));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| EventChainError::Storage(format!("unexpected response: {}", e)))?;

        info!("Pinned {} as {}", image.file_name, pinned.ipfs_hash);
        Ok(pinned.ipfs_hash)
    }
}
