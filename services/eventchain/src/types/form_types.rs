use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use alloy_primitives::U256;
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use contract_client::CreateEventCall;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::EventChainError;
use crate::types::event_types::RefundPolicy;
use crate::utils::format::{parse_ether, WEI_PER_ETHER};

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const MAX_TICKET_PRICE_ETHER: u64 = 1_000_000;
const MIN_DURATION_SECS: i64 = 3_600;
const MAX_DURATION_SECS: i64 = 365 * 24 * 3_600;

/// What an organizer fills in on the create-event form.
#[derive(Deserialize, Serialize, Validate, Debug, Clone)]
pub struct CreateEventInput {
    #[validate(length(min = 1, message = "Please enter an event name"))]
    pub name: String,
    #[validate(length(min = 1, message = "Please provide event details"))]
    pub details: String,
    #[validate(length(min = 1, message = "Please enter event location"))]
    pub location: String,
    pub starts_at: DateTime<FixedOffset>,
    pub ends_at: DateTime<FixedOffset>,
    /// Decimal ether amount, as typed.
    pub ticket_price: String,
    #[validate(range(max = 120, message = "Please enter a valid minimum age (0-120)"))]
    pub minimum_age: u64,
    #[validate(range(
        min = 1,
        max = 100000,
        message = "Capacity must be between 1 and 100,000"
    ))]
    pub max_capacity: u64,
    pub refund_policy: RefundPolicy,
    #[validate(range(max = 720, message = "Refund buffer cannot exceed 720 hours (30 days)"))]
    pub refund_buffer_hours: Option<u64>,
}

impl CreateEventInput {
    /// Runs every local check against the wall clock `now`.
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), EventChainError> {
        self.validate()
            .map_err(|e| EventChainError::Validation(e.to_string()))?;

        for (value, message) in [
            (&self.name, "Please enter an event name"),
            (&self.details, "Please provide event details"),
            (&self.location, "Please enter event location"),
        ] {
            if value.trim().is_empty() {
                return Err(EventChainError::Validation(message.into()));
            }
        }

        let start = self.starts_at.timestamp();
        let end = self.ends_at.timestamp();
        if start < now.timestamp() {
            return Err(EventChainError::Validation(
                "The event must start in the future".into(),
            ));
        }
        if end <= start {
            return Err(EventChainError::Validation(
                "End date/time must be after start date/time".into(),
            ));
        }
        if end - start < MIN_DURATION_SECS {
            return Err(EventChainError::Validation(
                "Event must be at least 1 hour long".into(),
            ));
        }
        if end - start > MAX_DURATION_SECS {
            return Err(EventChainError::Validation(
                "Event duration cannot exceed 365 days".into(),
            ));
        }

        let price = parse_ether(&self.ticket_price)?;
        if price > U256::from(MAX_TICKET_PRICE_ETHER) * WEI_PER_ETHER {
            return Err(EventChainError::Validation(
                "Price seems unusually high".into(),
            ));
        }

        if self.refund_policy == RefundPolicy::CustomBuffer {
            let buffer_hours = match self.refund_buffer_hours {
                Some(hours) if hours > 0 => hours,
                Some(_) => {
                    return Err(EventChainError::Validation(
                        "Refund buffer must be greater than 0".into(),
                    ))
                }
                None => {
                    return Err(EventChainError::Validation(
                        "Please enter refund buffer hours".into(),
                    ))
                }
            };
            let hours_until_start = (start - now.timestamp()) / 3_600;
            if buffer_hours as i64 >= hours_until_start {
                return Err(EventChainError::Validation(
                    "Refund buffer exceeds time until event starts".into(),
                ));
            }
        }

        Ok(())
    }

    /// Builds the `createEvent` arguments. Call after `validate_at`.
    pub fn to_call(&self, image_ref: String) -> Result<CreateEventCall, EventChainError> {
        let refund_buffer_hours = match self.refund_policy {
            RefundPolicy::CustomBuffer => self.refund_buffer_hours.unwrap_or(0),
            _ => 0,
        };

        Ok(CreateEventCall {
            name: self.name.trim().to_string(),
            image_ref,
            details: self.details.trim().to_string(),
            start_date: non_negative(self.starts_at.timestamp())?,
            end_date: non_negative(self.ends_at.timestamp())?,
            start_time: minutes_into_day(&self.starts_at),
            end_time: minutes_into_day(&self.ends_at),
            location: self.location.trim().to_string(),
            price_wei: parse_ether(&self.ticket_price)?,
            minimum_age: self.minimum_age,
            max_capacity: self.max_capacity,
            refund_policy: self.refund_policy.tag(),
            refund_buffer_hours,
        })
    }
}

fn non_negative(timestamp: i64) -> Result<u64, EventChainError> {
    u64::try_from(timestamp)
        .map_err(|_| EventChainError::Validation("Dates before 1970 are not supported".into()))
}

/// Local time of day, truncated to the minute, in seconds.
fn minutes_into_day(at: &DateTime<FixedOffset>) -> u64 {
    u64::from(at.hour()) * 3_600 + u64::from(at.minute()) * 60
}

/// An event image selected for upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn validate(&self) -> Result<(), EventChainError> {
        if self.bytes.is_empty() {
            return Err(EventChainError::Validation(
                "Please upload an event image".into(),
            ));
        }
        if !self.content_type.starts_with("image/") {
            return Err(EventChainError::Validation(
                "Only image files are allowed (JPG, PNG, GIF, etc.)".into(),
            ));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(EventChainError::Validation(
                "File size must be less than 10MB".into(),
            ));
        }
        Ok(())
    }

    /// Identifies the image content so an upload can be reused on retry.
    pub fn fingerprint(&self) -> (usize, u64) {
        let mut hasher = DefaultHasher::new();
        self.content_type.hash(&mut hasher);
        self.bytes.hash(&mut hasher);
        (self.bytes.len(), hasher.finish())
    }
}
