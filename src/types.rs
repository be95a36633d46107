use geo::Point;
use std::collections::BTreeMap;

/// A raw scraped cell. Scraped tables mix numbers and free text in the same
/// column, so the type is decided per cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Missing,
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Infer a value from a CSV cell: empty is missing, anything that parses
    /// as a float is numeric, the rest stays text.
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            FieldValue::Missing
        } else if let Ok(n) = trimmed.parse::<f64>() {
            FieldValue::Number(n)
        } else {
            FieldValue::Text(cell.to_string())
        }
    }
}

/// Geographic coordinates in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One place row as loaded from the input table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceRecord {
    pub name: String,
    pub address: Option<String>,
    pub place_type: Option<String>,
    pub comment: Option<String>,
    pub rating: FieldValue,
    pub count: FieldValue,
    /// Input columns that the pipeline does not interpret, keyed by header
    pub extra: BTreeMap<String, String>,
}

/// A place row after the geocoding pass; coordinates stay `None` when the
/// lookup failed.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedRecord {
    pub place: PlaceRecord,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl GeocodedRecord {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        }
    }
}

/// A row that survived cleaning: coordinates present, numeric fields parsed
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub name: String,
    pub address: Option<String>,
    pub place_type: Option<String>,
    pub comment: String,
    pub rating: f64,
    pub count: f64,
    pub lat: f64,
    pub lon: f64,
    pub extra: BTreeMap<String, String>,
}

impl From<CleanRecord> for GeocodedRecord {
    fn from(record: CleanRecord) -> Self {
        GeocodedRecord {
            place: PlaceRecord {
                name: record.name,
                address: record.address,
                place_type: record.place_type,
                comment: Some(record.comment),
                rating: FieldValue::Number(record.rating),
                count: FieldValue::Number(record.count),
                extra: record.extra,
            },
            lat: Some(record.lat),
            lon: Some(record.lon),
        }
    }
}

/// A cleaned row inside the requested boundary, with its point geometry
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRecord {
    pub record: CleanRecord,
    pub geometry: Point<f64>,
}

impl FilteredRecord {
    /// Geometry rendered as WKT, the way GIS tools write point columns to CSV
    pub fn geometry_wkt(&self) -> String {
        format!("POINT ({} {})", self.geometry.x(), self.geometry.y())
    }
}
