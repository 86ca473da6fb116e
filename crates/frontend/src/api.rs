use std::future::Future;

use dioxus::logger::tracing;
use picker_shared::{AddressResult, Coordinate, GeocodingClient};
use serde::{Deserialize, Serialize};

const REVERSE_GEOCODE_QUERY: &str = r#"query ReverseGeocode($lat: Float!, $lng: Float!) {
    reverseGeocode(lat: $lat, lng: $lng) { status formatted }
}"#;

/// Build the variables JSON for a reverse geocode query.
pub fn build_reverse_geocode_variables(coordinate: Coordinate) -> serde_json::Value {
    serde_json::json!({ "lat": coordinate.lat, "lng": coordinate.lng })
}

/// GraphQL endpoint on the given origin.
pub fn graphql_url(origin: &str) -> String {
    format!("{}/graphql", origin.trim_end_matches('/'))
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

impl<T> GraphQLResponse<T> {
    /// First error message wins, then missing data.
    pub fn into_result(self) -> Result<T, String> {
        if let Some(errors) = self.errors {
            if let Some(first) = errors.into_iter().next() {
                return Err(first.message);
            }
        }
        self.data.ok_or_else(|| "No data returned".to_string())
    }
}

async fn query<T: for<'de> Deserialize<'de>>(
    endpoint: &str,
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(endpoint)
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;
    gql_resp.into_result()
}

// Types mirroring the GraphQL schema

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressStatus {
    Resolved,
    NotFound,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddressData {
    pub status: AddressStatus,
    pub formatted: Option<String>,
}

impl From<AddressData> for AddressResult {
    fn from(data: AddressData) -> Self {
        match (data.status, data.formatted) {
            (AddressStatus::Resolved, Some(text)) => AddressResult::Resolved(text),
            (AddressStatus::NotFound, _) => AddressResult::NotFound,
            _ => AddressResult::FetchError,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseGeocodeResponse {
    pub reverse_geocode: AddressData,
}

pub async fn reverse_geocode(endpoint: &str, coordinate: Coordinate) -> Result<AddressData, String> {
    let resp: ReverseGeocodeResponse = query(
        endpoint,
        REVERSE_GEOCODE_QUERY,
        Some(build_reverse_geocode_variables(coordinate)),
    )
    .await?;
    Ok(resp.reverse_geocode)
}

/// Address lookups through the backend, which holds the provider key.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQlGeocoder {
    endpoint: String,
}

impl GraphQlGeocoder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        GraphQlGeocoder {
            endpoint: endpoint.into(),
        }
    }
}

impl GeocodingClient for GraphQlGeocoder {
    fn lookup(&self, coordinate: Coordinate) -> impl Future<Output = AddressResult> {
        let endpoint = self.endpoint.clone();
        async move {
            match reverse_geocode(&endpoint, coordinate).await {
                Ok(data) => data.into(),
                Err(e) => {
                    tracing::warn!("Address lookup for {coordinate} failed: {e}");
                    AddressResult::FetchError
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- GraphQL request serialization ---

    #[test]
    fn test_graphql_request_serializes_with_variables() {
        let c = Coordinate::new(-0.398221, 36.960749).unwrap();
        let req = GraphQLRequest {
            query: REVERSE_GEOCODE_QUERY.to_string(),
            variables: Some(build_reverse_geocode_variables(c)),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["query"].as_str().unwrap().contains("reverseGeocode"));
        assert_eq!(json["variables"]["lat"], -0.398221);
        assert_eq!(json["variables"]["lng"], 36.960749);
    }

    #[test]
    fn test_graphql_request_omits_null_variables() {
        let req = GraphQLRequest {
            query: "query { formatDms(lat: 0, lng: 0) { latitude } }".to_string(),
            variables: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("variables").is_none());
    }

    #[test]
    fn test_graphql_url_from_origin() {
        assert_eq!(graphql_url("http://localhost:3000"), "http://localhost:3000/graphql");
        assert_eq!(graphql_url("https://example.org/"), "https://example.org/graphql");
    }

    // --- Response deserialization ---

    #[test]
    fn test_resolved_response_deserializes() {
        let json = r#"{"data":{"reverseGeocode":{"status":"RESOLVED","formatted":"Nyeri, Kenya"}}}"#;
        let resp: GraphQLResponse<ReverseGeocodeResponse> = serde_json::from_str(json).unwrap();
        let data = resp.into_result().unwrap().reverse_geocode;
        assert_eq!(data.status, AddressStatus::Resolved);
        assert_eq!(
            AddressResult::from(data),
            AddressResult::Resolved("Nyeri, Kenya".to_string())
        );
    }

    #[test]
    fn test_not_found_response_deserializes() {
        let json = r#"{"data":{"reverseGeocode":{"status":"NOT_FOUND","formatted":null}}}"#;
        let resp: GraphQLResponse<ReverseGeocodeResponse> = serde_json::from_str(json).unwrap();
        let data = resp.into_result().unwrap().reverse_geocode;
        assert_eq!(AddressResult::from(data), AddressResult::NotFound);
    }

    #[test]
    fn test_failed_status_maps_to_fetch_error() {
        let data = AddressData {
            status: AddressStatus::Failed,
            formatted: None,
        };
        assert_eq!(AddressResult::from(data), AddressResult::FetchError);
    }

    #[test]
    fn test_resolved_without_text_maps_to_fetch_error() {
        let data = AddressData {
            status: AddressStatus::Resolved,
            formatted: None,
        };
        assert_eq!(AddressResult::from(data), AddressResult::FetchError);
    }

    #[test]
    fn test_graphql_errors_take_precedence() {
        let json = r#"{"data":null,"errors":[{"message":"Coordinate out of range: 95, 0"}]}"#;
        let resp: GraphQLResponse<ReverseGeocodeResponse> = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.into_result().err().as_deref(),
            Some("Coordinate out of range: 95, 0")
        );
    }

    #[test]
    fn test_missing_data_is_an_error() {
        let resp: GraphQLResponse<ReverseGeocodeResponse> =
            serde_json::from_str(r#"{"errors":[]}"#).unwrap();
        assert_eq!(resp.into_result().err().as_deref(), Some("No data returned"));
    }
}
