use std::future::Future;
use std::time::Duration;

use picker_shared::geocode::{self, GeocoderConfig, LookupError};
use picker_shared::{AddressResult, Coordinate, GeocodingClient};

/// Reverse geocoder backed by the OpenCage HTTP API.
pub struct OpenCageClient {
    http: reqwest::Client,
    config: GeocoderConfig,
}

impl OpenCageClient {
    pub fn new(config: GeocoderConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(OpenCageClient { http, config })
    }

    /// One request, no retries.
    pub async fn reverse(&self, coordinate: Coordinate) -> Result<AddressResult, LookupError> {
        let url = self.config.request_url(coordinate)?;

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Http(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| LookupError::Http(e.without_url().to_string()))?;
        geocode::parse_response(&body)
    }

    /// Like [`reverse`](Self::reverse) with failures logged and collapsed
    /// into [`AddressResult::FetchError`].
    pub async fn address(&self, coordinate: Coordinate) -> AddressResult {
        match self.reverse(coordinate).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, %coordinate, "Reverse geocoding failed");
                AddressResult::FetchError
            }
        }
    }
}

impl GeocodingClient for OpenCageClient {
    fn lookup(&self, coordinate: Coordinate) -> impl Future<Output = AddressResult> {
        self.address(coordinate)
    }
}
