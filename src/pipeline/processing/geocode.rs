use tracing::{info, warn};

use crate::app::ports::Geocoder;
use crate::observability::metrics;
use crate::types::{GeocodedRecord, PlaceRecord};

/// Result of geocoding a whole table
#[derive(Debug, Clone)]
pub struct GeocodeBatch {
    pub records: Vec<GeocodedRecord>,
    pub geocoded: usize,
    /// Percentage of rows that received coordinates
    pub success_rate: f64,
}

/// Free-text query sent for one place, or `None` when the row has no address
pub fn build_query(place: &PlaceRecord, district: &str, city: &str) -> Option<String> {
    let address = place.address.as_deref().map(str::trim).filter(|a| !a.is_empty())?;
    Some(format!("{}, {}, {}, {}", place.name.trim(), address, district, city))
}

/// Geocode every row, one request at a time, keeping input order.
pub async fn geocode_batch(
    geocoder: &dyn Geocoder,
    places: Vec<PlaceRecord>,
    district: &str,
    city: &str,
) -> GeocodeBatch {
    let total = places.len();
    let mut records = Vec::with_capacity(total);
    let mut geocoded = 0;

    for (i, place) in places.into_iter().enumerate() {
        let coordinates = match build_query(&place, district, city) {
            Some(query) => geocoder.geocode(&query).await,
            None => {
                warn!("[{}/{}] {} has no address, skipping lookup", i + 1, total, place.name);
                metrics::geocode::failure("no_address");
                None
            }
        };

        if coordinates.is_some() {
            geocoded += 1;
        }
        records.push(GeocodedRecord {
            place,
            lat: coordinates.map(|c| c.lat),
            lon: coordinates.map(|c| c.lon),
        });
    }

    let success_rate = if total == 0 {
        0.0
    } else {
        geocoded as f64 / total as f64 * 100.0
    };
    info!("success: {:.1}% ({}/{})", success_rate, geocoded, total);
    metrics::geocode::success_rate(success_rate);

    GeocodeBatch {
        records,
        geocoded,
        success_rate,
    }
}
