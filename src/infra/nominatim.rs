use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::app::ports::BoundaryProvider;
use crate::boundary::{Boundary, GeoJsonGeometry};
use crate::config::BoundaryConfig;
use crate::error::{PrepError, Result};
use crate::infra::http_client::build_client;

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    geojson: Option<GeoJsonGeometry>,
}

/// Looks up administrative boundaries on OpenStreetMap Nominatim
pub struct NominatimBoundaryProvider {
    client: reqwest::Client,
    search_url: String,
    candidate_limit: u32,
}

impl NominatimBoundaryProvider {
    pub fn new(config: &BoundaryConfig) -> Result<Self> {
        let client = build_client(
            Duration::from_secs(config.timeout_seconds),
            &config.user_agent,
        )?;
        Ok(Self {
            client,
            search_url: format!("{}/search", config.base_url.trim_end_matches('/')),
            candidate_limit: config.candidate_limit.max(1),
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<NominatimPlace>> {
        let limit = self.candidate_limit.to_string();
        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("polygon_geojson", "1"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

/// First candidate with an areal geometry wins; point and line results
/// (a district's admin centre, say) are skipped.
fn select_boundary(places: Vec<NominatimPlace>, query: &str) -> Result<Boundary> {
    let total = places.len();
    for place in places {
        match place.geojson {
            Some(geometry) if geometry.is_areal() => {
                let polygon = geometry.to_multi_polygon()?;
                return Ok(Boundary::new(place.display_name, polygon));
            }
            Some(geometry) => {
                debug!("Skipping {} ({} geometry)", place.display_name, geometry.kind);
            }
            None => debug!("Skipping {} (no geometry)", place.display_name),
        }
    }
    Err(PrepError::Boundary {
        message: format!(
            "no polygon found for '{}' among {} result(s)",
            query, total
        ),
    })
}

#[async_trait]
impl BoundaryProvider for NominatimBoundaryProvider {
    #[instrument(skip(self))]
    async fn fetch(&self, query: &str) -> Result<Boundary> {
        info!("Query: {}", query);
        let places = self.search(query).await.map_err(|e| PrepError::Boundary {
            message: format!("Error downloading from OSM: {}", e),
        })?;
        let boundary = select_boundary(places, query)?;
        info!("Successfully downloaded boundary: {}", boundary.name);
        Ok(boundary)
    }
}
