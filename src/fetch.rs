//! Metering endpoint client.
//!
//! One GET per run. The response is JSON; the remaining quota is read from a
//! configurable JSON pointer (default `/data/points`, the
//! `{code, msg, data: {points}}` envelope), with a top-level `remaining`
//! field accepted as a fallback. Anything that is not a non-negative integer
//! is rejected before the history is touched.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::history::MAX_REMAINING;

pub const DEFAULT_ENDPOINT: &str = "https://api.sunoaiapi.com/api/v1/gateway/limit";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub endpoint: String,
    /// Never read from the config file; supplied through the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub api_key_header: String,
    pub remaining_pointer: String,
    pub timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            api_key_header: "api-key".to_string(),
            remaining_pointer: "/data/points".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// A validated reading plus the raw payload it came from.
#[derive(Debug, Clone)]
pub struct Reading {
    pub remaining: u64,
    pub payload: Value,
}

#[derive(Debug, Clone)]
pub struct MeteringClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    api_key_header: String,
    remaining_pointer: String,
}

impl MeteringClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(MeteringClient {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            api_key_header: config.api_key_header.clone(),
            remaining_pointer: config.remaining_pointer.clone(),
        })
    }

    pub async fn fetch(&self) -> Result<Reading> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header(self.api_key_header.as_str(), key);
        }

        tracing::info!(endpoint = %self.endpoint, "fetching quota");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::FetchStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| Error::InvalidSnapshot(format!("response is not JSON: {e}")))?;
        tracing::debug!(%payload, "metering response");

        let remaining = extract_remaining(&payload, &self.remaining_pointer)?;
        Ok(Reading { remaining, payload })
    }
}

/// Pull the remaining quota out of a response payload.
pub fn extract_remaining(payload: &Value, pointer: &str) -> Result<u64> {
    let (value, location) = match payload.pointer(pointer) {
        Some(v) => (v, pointer),
        None => match payload.get("remaining") {
            Some(v) => (v, "/remaining"),
            None => {
                return Err(Error::InvalidSnapshot(format!(
                    "no remaining value at {pointer} or /remaining"
                )))
            }
        },
    };

    as_count(value).ok_or_else(|| {
        Error::InvalidSnapshot(format!("value at {location} is not a non-negative integer: {value}"))
    })
}

fn as_count(value: &Value) -> Option<u64> {
    let n = match value.as_u64() {
        Some(n) => n,
        None => {
            // 80.0 is fine, 80.5 and -1 are not
            let f = value.as_f64()?;
            if f < 0.0 || f.fract() != 0.0 || f >= MAX_REMAINING as f64 {
                return None;
            }
            f as u64
        }
    };
    (n <= MAX_REMAINING).then_some(n)
}
