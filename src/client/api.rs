//! HTTP transport for the search client

use std::future::Future;

use serde::Deserialize;

use super::ClientError;
use crate::data::{CacheType, GeocacheRecord};
use crate::error::ErrorBody;
use crate::service::{PhotoList, SearchRequest};

/// Body of a search response.
///
/// The service signals failure through payload shape, not status code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SearchPayload {
    /// A sequence of result rows
    Rows(Vec<GeocacheRecord>),
    /// `{error, message?}`
    Error(ErrorBody),
    /// Anything else the server might have produced
    Unexpected(serde_json::Value),
}

/// Operations the search client needs from the server.
pub trait GeocacheApi: Send + Sync {
    /// Run a bounding-box search.
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchPayload, ClientError>> + Send;

    /// Photos near a coordinate.
    fn photos(
        &self,
        lat: f64,
        lng: f64,
    ) -> impl Future<Output = Result<PhotoList, ClientError>> + Send;

    /// Cache types available as a filter.
    fn cache_types(&self) -> impl Future<Output = Result<Vec<CacheType>, ClientError>> + Send;
}

/// `GeocacheApi` over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpGeocacheApi {
    http_client: reqwest::Client,
    base_url: url::Url,
}

impl HttpGeocacheApi {
    /// # Errors
    /// Returns `ClientError::InvalidUrl` if `base_url` does not parse.
    pub fn new(base_url: &str, http_client: reqwest::Client) -> Result<Self, ClientError> {
        let mut base_url = url::Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }
}

impl GeocacheApi for HttpGeocacheApi {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPayload, ClientError> {
        tracing::debug!(?request, "Sending search request");

        let response = self
            .http_client
            .post(self.endpoint("api/geocaches/search")?)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Decode(format!("search response (HTTP {status}): {e}")))
    }

    async fn photos(&self, lat: f64, lng: f64) -> Result<PhotoList, ClientError> {
        let mut url = self.endpoint("api/photos")?;
        url.query_pairs_mut()
            .append_pair("lat", &lat.to_string())
            .append_pair("lng", &lng.to_string());

        let photos = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(photos)
    }

    async fn cache_types(&self) -> Result<Vec<CacheType>, ClientError> {
        let types = self
            .http_client
            .get(self.endpoint("api/cache-types")?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_shape_selects_variant() {
        let rows: SearchPayload = serde_json::from_value(json!([{
            "id": 1,
            "latitude": 32.2,
            "longitude": -110.9,
            "cache_type_id": 1,
            "difficulty_rating": 2,
            "cache_type": "Traditional"
        }]))
        .unwrap();
        assert!(matches!(rows, SearchPayload::Rows(ref r) if r.len() == 1));

        let empty: SearchPayload = serde_json::from_value(json!([])).unwrap();
        assert_eq!(empty, SearchPayload::Rows(Vec::new()));

        let error: SearchPayload =
            serde_json::from_value(json!({"error": "Query failed", "message": "boom"})).unwrap();
        assert!(matches!(error, SearchPayload::Error(ref e) if e.error == "Query failed"));

        let other: SearchPayload = serde_json::from_value(json!("surprise")).unwrap();
        assert!(matches!(other, SearchPayload::Unexpected(_)));
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let api = HttpGeocacheApi::new("http://localhost:8080/finder", reqwest::Client::new())
            .unwrap();
        assert_eq!(
            api.endpoint("api/photos").unwrap().as_str(),
            "http://localhost:8080/finder/api/photos"
        );
    }
}
