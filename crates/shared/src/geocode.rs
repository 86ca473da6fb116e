//! OpenCage reverse-geocoding payloads.
//!
//! Only the request shape and the response classification live here; the
//! HTTP call itself belongs to whichever side holds the API key.

use serde::Deserialize;
use url::Url;

use crate::models::{AddressResult, Coordinate};

pub const DEFAULT_OPENCAGE_URL: &str = "https://api.opencagedata.com/geocode/v1/json";

/// Errors raised while talking to a geocoding provider. The session only
/// ever sees these collapsed into [`AddressResult::FetchError`].
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Malformed response payload: {0}")]
    Payload(String),

    #[error("Provider error (code {code}): {message}")]
    Provider { code: u16, message: String },

    #[error("Invalid geocoder URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Provider endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub api_key: String,
}

impl GeocoderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        GeocoderConfig {
            endpoint: DEFAULT_OPENCAGE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Reverse-geocoding request URL for `coordinate`.
    pub fn request_url(&self, coordinate: Coordinate) -> Result<Url, LookupError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("q", &format!("{} {}", coordinate.lat, coordinate.lng))
            .append_pair("key", &self.api_key)
            .append_pair("limit", "1")
            .append_pair("no_annotations", "1");
        Ok(url)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenCageResponse {
    #[serde(default)]
    pub results: Vec<OpenCageResult>,
    pub status: Option<OpenCageStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenCageResult {
    pub formatted: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenCageStatus {
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

impl OpenCageResponse {
    /// Map a decoded response onto the address outcome.
    pub fn classify(self) -> Result<AddressResult, LookupError> {
        if let Some(status) = self.status {
            if status.code != 200 {
                return Err(LookupError::Provider {
                    code: status.code,
                    message: status.message,
                });
            }
        }
        Ok(match self.results.into_iter().next() {
            Some(first) => AddressResult::Resolved(first.formatted),
            None => AddressResult::NotFound,
        })
    }
}

/// Decode and classify a raw response body.
pub fn parse_response(body: &[u8]) -> Result<AddressResult, LookupError> {
    let response: OpenCageResponse =
        serde_json::from_slice(body).map_err(|e| LookupError::Payload(e.to_string()))?;
    response.classify()
}
