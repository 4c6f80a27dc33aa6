use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use reqwest::Url;

use crate::errors::EventChainError;

/// 10^18, the scale of every amount the contract stores.
pub const WEI_PER_ETHER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);
const ETHER_DECIMALS: usize = 18;

pub fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Renders a wei amount as a decimal ether string without losing precision.
pub fn format_ether(wei: U256) -> String {
    let whole = wei / WEI_PER_ETHER;
    let fraction = wei % WEI_PER_ETHER;
    if fraction.is_zero() {
        return whole.to_string();
    }

    let padded = format!("{:0>width$}", fraction.to_string(), width = ETHER_DECIMALS);
    format!("{}.{}", whole, padded.trim_end_matches('0'))
}

/// Parses a user-entered decimal ether amount into wei.
pub fn parse_ether(text: &str) -> Result<U256, EventChainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EventChainError::Validation("Please enter ticket price".into()));
    }
    if text.starts_with('-') {
        return Err(EventChainError::Validation("Price cannot be negative".into()));
    }

    let invalid = || EventChainError::Validation("Please enter a valid number for price".into());

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || !all_digits(whole)
        || !all_digits(fraction)
        || fraction.len() > ETHER_DECIMALS
    {
        return Err(invalid());
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        format!("{:0<width$}", fraction, width = ETHER_DECIMALS)
            .parse()
            .map_err(|_| invalid())?
    };

    U256::from(whole)
        .checked_mul(WEI_PER_ETHER)
        .and_then(|wei| wei.checked_add(U256::from(fraction)))
        .ok_or_else(invalid)
}

/// "Saturday, March 1, 2025"
pub fn format_event_date(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|date| date.format("%A, %B %-d, %Y").to_string())
        .unwrap_or_default()
}

/// "Sat, Mar 1, 2025"
pub fn format_short_date(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|date| date.format("%a, %b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// Seconds since midnight as a 12-hour clock, e.g. "7:30 PM".
pub fn format_event_time(seconds_since_midnight: u64) -> String {
    let hours = (seconds_since_midnight / 3600) % 24;
    let minutes = (seconds_since_midnight % 3600) / 60;
    let period = if hours >= 12 { "PM" } else { "AM" };
    let display_hours = match hours % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hours, minutes, period)
}

/// Seconds since midnight as "HH:MM".
pub fn format_time_24(seconds_since_midnight: u64) -> String {
    let hours = (seconds_since_midnight / 3600) % 24;
    let minutes = (seconds_since_midnight % 3600) / 60;
    format!("{:02}:{:02}", hours, minutes)
}

/// Display URL for an event image. Absolute URLs pass through, anything else
/// is treated as a content identifier behind `gateway_base`.
pub fn resolve_image_url(image_ref: &str, gateway_base: &str) -> Option<String> {
    let image_ref = image_ref.trim();
    if image_ref.is_empty() {
        return None;
    }
    if image_ref.starts_with("http") {
        return Some(image_ref.to_string());
    }
    Some(format!(
        "{}/{}",
        gateway_base.trim_end_matches('/'),
        image_ref.trim_start_matches("ipfs://")
    ))
}

pub fn map_embed_url(location: &str) -> Option<String> {
    Url::parse_with_params(
        "https://www.google.com/maps",
        &[("q", location), ("output", "embed")],
    )
    .ok()
    .map(String::from)
}
