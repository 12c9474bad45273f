//! Photo lookup service
//!
//! Finds photos taken near a coordinate through the Flickr REST API.
//! The API key lives in server configuration and never reaches clients;
//! they call the `/api/photos` proxy instead.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::PhotoConfig;
use crate::error::AppError;
use crate::metrics::PHOTO_LOOKUPS_TOTAL;

/// Photo descriptor as returned by the photo-search API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Photo {
    pub id: String,
    pub secret: String,
    pub server: String,
    pub farm: u32,
    #[serde(default)]
    pub title: String,
}

impl Photo {
    /// Small (`_t`) thumbnail URL for this photo.
    pub fn thumbnail_url(&self) -> String {
        format!(
            "https://farm{}.staticflickr.com/{}/{}_{}_t.jpg",
            self.farm, self.server, self.id, self.secret
        )
    }
}

/// Photo entry handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSummary {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
}

impl From<&Photo> for PhotoSummary {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id.clone(),
            title: photo.title.clone(),
            thumbnail_url: photo.thumbnail_url(),
        }
    }
}

/// Body of `GET /api/photos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoList {
    pub photos: Vec<PhotoSummary>,
}

#[derive(Debug, Deserialize)]
struct PhotoSearchResponse {
    stat: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    photos: Option<PhotoPage>,
}

#[derive(Debug, Deserialize)]
struct PhotoPage {
    #[serde(default)]
    photo: Vec<Photo>,
}

/// Client for the photo-search API.
pub struct PhotoService {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    per_page: usize,
    timeout: Duration,
}

impl PhotoService {
    pub fn new(config: &PhotoConfig, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key().map(str::to_string),
            per_page: config.per_page,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    /// Search for photos near a coordinate.
    ///
    /// # Returns
    /// At most `per_page` photos, in the order the API returned them
    ///
    /// # Errors
    /// - `AppError::Validation` for coordinates off the globe
    /// - `AppError::Config` when no API key is configured
    /// - `AppError::HttpClient` / `AppError::Photos` when the API call fails
    pub async fn search_near(&self, latitude: f64, longitude: f64) -> Result<Vec<Photo>, AppError> {
        if !latitude.is_finite() || latitude.abs() > 90.0 {
            return Err(AppError::Validation(format!(
                "lat must be between -90 and 90, got {latitude}"
            )));
        }
        if !longitude.is_finite() || longitude.abs() > 180.0 {
            return Err(AppError::Validation(format!(
                "lng must be between -180 and 180, got {longitude}"
            )));
        }

        let Some(api_key) = self.api_key.as_deref() else {
            PHOTO_LOOKUPS_TOTAL.with_label_values(&["unconfigured"]).inc();
            return Err(AppError::Config("photos.api_key is not configured".to_string()));
        };

        let result = self.fetch(api_key, latitude, longitude).await;
        let status = if result.is_ok() { "success" } else { "error" };
        PHOTO_LOOKUPS_TOTAL.with_label_values(&[status]).inc();

        match &result {
            Ok(photos) => tracing::debug!(
                latitude,
                longitude,
                count = photos.len(),
                "Photo lookup completed"
            ),
            Err(error) => tracing::warn!(latitude, longitude, %error, "Photo lookup failed"),
        }

        result
    }

    async fn fetch(
        &self,
        api_key: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Photo>, AppError> {
        let url = self.search_url(api_key, latitude, longitude)?;

        let response = self
            .http_client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let body: PhotoSearchResponse = response.json().await?;
        if body.stat != "ok" {
            return Err(AppError::Photos(
                body.message
                    .unwrap_or_else(|| format!("photo search returned stat={}", body.stat)),
            ));
        }

        let mut photos = body.photos.map(|page| page.photo).unwrap_or_default();
        photos.truncate(self.per_page);
        Ok(photos)
    }

    fn search_url(&self, api_key: &str, latitude: f64, longitude: f64) -> Result<url::Url, AppError> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let per_page = self.per_page.to_string();

        url::Url::parse_with_params(
            &self.endpoint,
            [
                ("method", "flickr.photos.search"),
                ("api_key", api_key),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "json"),
                ("nojsoncallback", "1"),
                ("per_page", per_page.as_str()),
            ],
        )
        .map_err(|e| AppError::Config(format!("invalid photos.endpoint: {e}")))
    }
}
