use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::Geocoder;
use crate::config::GeocoderConfig;
use crate::constants::DEFAULT_USER_AGENT;
use crate::error::{PrepError, Result};
use crate::infra::http_client::build_client;
use crate::observability::metrics;
use crate::types::Coordinates;

#[derive(Debug, Deserialize)]
struct GeoapifyResponse {
    #[serde(default)]
    results: Vec<GeoapifyResult>,
}

#[derive(Debug, Deserialize)]
struct GeoapifyResult {
    lat: f64,
    lon: f64,
    #[serde(default)]
    rank: Option<GeoapifyRank>,
}

#[derive(Debug, Deserialize)]
struct GeoapifyRank {
    #[serde(default)]
    confidence: Option<f64>,
}

/// Best match returned by the geocoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeHit {
    pub coordinates: Coordinates,
    pub confidence: Option<f64>,
}

impl GeoapifyResponse {
    fn best_hit(self) -> Option<GeocodeHit> {
        self.results.into_iter().next().map(|result| GeocodeHit {
            coordinates: Coordinates {
                lat: result.lat,
                lon: result.lon,
            },
            confidence: result.rank.and_then(|rank| rank.confidence),
        })
    }
}

/// Geoapify forward-geocoding client
pub struct GeoapifyGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    limit: u32,
}

impl std::fmt::Debug for GeoapifyGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoapifyGeocoder")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("limit", &self.limit)
            .finish()
    }
}

impl GeoapifyGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(PrepError::Config("Geoapify API key is not configured".into()));
        }
        let client = build_client(
            Duration::from_secs(config.timeout_seconds),
            DEFAULT_USER_AGENT,
        )?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            limit: config.limit,
        })
    }

    /// Single search request; `Ok(None)` when the service found nothing.
    pub async fn lookup(&self, query: &str) -> Result<Option<GeocodeHit>> {
        let limit = self.limit.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("text", query),
                ("apiKey", self.api_key.as_str()),
                ("limit", limit.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: GeoapifyResponse = response.json().await?;
        Ok(body.best_hit())
    }
}

fn failure_reason(err: &PrepError) -> &'static str {
    match err {
        PrepError::Http(e) if e.is_status() => "status",
        PrepError::Http(e) if e.is_decode() => "decode",
        PrepError::Json(_) => "decode",
        _ => "request",
    }
}

#[async_trait]
impl Geocoder for GeoapifyGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Option<Coordinates> {
        info!("Geocoding: {}", query);
        match self.lookup(query).await {
            Ok(Some(hit)) => {
                info!("{} - {}", hit.coordinates.lat, hit.coordinates.lon);
                debug!(confidence = ?hit.confidence, "geocode confidence");
                metrics::geocode::success();
                Some(hit.coordinates)
            }
            Ok(None) => {
                warn!("No geocoding result for: {}", query);
                metrics::geocode::failure("empty");
                None
            }
            Err(e) => {
                warn!("Geoapify error: {}", e);
                metrics::geocode::failure(failure_reason(&e));
                None
            }
        }
    }
}
