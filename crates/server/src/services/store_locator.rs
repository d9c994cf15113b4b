//! Nearest-store lookup client.
//!
//! Resolves a zip code to the closest store via
//! `GET {base_url}?apiKey=..&zip=..&format=json`, which answers with a JSON
//! array of store records. Only the first record is used.

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::StoreLocatorConfig;
use crate::models::user::GeoPoint;

/// Errors that can occur when looking up a store.
#[derive(Debug, Error)]
pub enum StoreLocatorError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// No store near the zip code.
    #[error("no store found for zip code {0}")]
    NoStore(i32),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A store record. Fields other than these are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// `[lon, lat]`.
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl Store {
    /// The store's position, if it reported both coordinates.
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        match self.coordinates.as_slice() {
            [lon, lat, ..] => Some(GeoPoint {
                lat: *lat,
                lon: *lon,
            }),
            _ => None,
        }
    }
}

/// Client for the nearest-store lookup.
#[derive(Clone)]
pub struct StoreLocatorClient {
    client: reqwest::Client,
    config: StoreLocatorConfig,
}

impl StoreLocatorClient {
    /// Create a new store locator client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StoreLocatorConfig) -> Result<Self, StoreLocatorError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Find the store closest to `zipcode`.
    ///
    /// # Errors
    ///
    /// Returns `StoreLocatorError::NoStore` if the lookup returns no stores.
    /// Returns `StoreLocatorError::Api` on a non-success status.
    /// Returns `StoreLocatorError::Http` / `Parse` on transport or decoding failure.
    pub async fn nearest_store(&self, zipcode: i32) -> Result<Store, StoreLocatorError> {
        if self.config.api_key.is_none() {
            tracing::warn!("WALMART_OPEN_API_KEY is not set");
        }

        let response = self.client.get(self.request_url(zipcode)).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreLocatorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let stores: Vec<Store> = response
            .json()
            .await
            .map_err(|e| StoreLocatorError::Parse(e.to_string()))?;

        let store = stores
            .into_iter()
            .next()
            .ok_or(StoreLocatorError::NoStore(zipcode))?;

        tracing::debug!(zipcode, store = ?store.name, "Resolved nearest store");

        Ok(store)
    }

    fn request_url(&self, zipcode: i32) -> Url {
        let mut url = self.config.base_url.clone();
        url.query_pairs_mut()
            .append_pair(
                "apiKey",
                self.config
                    .api_key
                    .as_ref()
                    .map_or("", |key| key.expose_secret()),
            )
            .append_pair("zip", &zipcode.to_string())
            .append_pair("format", "json");
        url
    }
}
