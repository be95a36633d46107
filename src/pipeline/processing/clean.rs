use std::collections::HashSet;
use tracing::info;

use crate::constants::{DEFAULT_COMMENT_PLACEHOLDER, TYPE_BULLET_MARKER};
use crate::observability::metrics;
use crate::pipeline::processing::normalize::{normalize_count, normalize_rating};
use crate::types::{CleanRecord, GeocodedRecord};

/// Row counts at each cleaning stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub initial: usize,
    pub geocode_failed: usize,
    pub duplicates: usize,
    pub remaining: usize,
}

impl CleanReport {
    pub fn removed(&self) -> usize {
        self.initial - self.remaining
    }
}

#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub records: Vec<CleanRecord>,
    pub report: CleanReport,
}

/// Drops unusable rows and normalizes the scraped text and numeric fields
#[derive(Debug, Clone)]
pub struct DataCleaner {
    comment_placeholder: String,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMENT_PLACEHOLDER)
    }
}

impl DataCleaner {
    pub fn new(comment_placeholder: impl Into<String>) -> Self {
        Self {
            comment_placeholder: comment_placeholder.into(),
        }
    }

    pub fn clean(&self, records: Vec<GeocodedRecord>) -> CleanOutcome {
        let initial = records.len();

        let located: Vec<(GeocodedRecord, f64, f64)> = records
            .into_iter()
            .filter_map(|r| {
                let c = r.coordinates()?;
                Some((r, c.lat, c.lon))
            })
            .collect();
        let geocode_failed = initial - located.len();
        info!("Removed {} rows (Geocode failed)", geocode_failed);

        // First occurrence of each exact coordinate pair wins
        let mut seen = HashSet::new();
        let unique: Vec<(GeocodedRecord, f64, f64)> = located
            .into_iter()
            .filter(|(_, lat, lon)| seen.insert((lat.to_bits(), lon.to_bits())))
            .collect();
        let duplicates = initial - geocode_failed - unique.len();
        info!("Removed {} rows (Duplicates)", duplicates);

        let cleaned: Vec<CleanRecord> = unique
            .into_iter()
            .map(|(record, lat, lon)| self.clean_record(record, lat, lon))
            .collect();

        let report = CleanReport {
            initial,
            geocode_failed,
            duplicates,
            remaining: cleaned.len(),
        };
        info!("Initial rows: {}", report.initial);
        info!("After cleaning: {}", report.remaining);
        info!("Total removed: {} rows", report.removed());

        metrics::clean::rows_removed("geocode_failed", geocode_failed);
        metrics::clean::rows_removed("duplicates", duplicates);
        metrics::clean::rows_kept(report.remaining);

        CleanOutcome {
            records: cleaned,
            report,
        }
    }

    fn clean_record(&self, record: GeocodedRecord, lat: f64, lon: f64) -> CleanRecord {
        let place = record.place;
        CleanRecord {
            comment: clean_comment(place.comment, &self.comment_placeholder),
            place_type: clean_type(place.place_type),
            count: normalize_count(&place.count),
            rating: normalize_rating(&place.rating),
            name: place.name,
            address: place.address,
            lat,
            lon,
            extra: place.extra,
        }
    }
}

/// Missing comments get the placeholder; quotes and whitespace are stripped
/// from both ends.
pub fn clean_comment(comment: Option<String>, placeholder: &str) -> String {
    let comment = comment.unwrap_or_else(|| placeholder.to_string());
    comment
        .trim_matches(|c: char| c == '"' || c.is_whitespace())
        .to_string()
}

/// Remove the scraper's bullet markers from a place type
pub fn clean_type(place_type: Option<String>) -> Option<String> {
    place_type
        .map(|t| t.replace(TYPE_BULLET_MARKER, "").trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldValue, PlaceRecord};

    fn row(name: &str, lat: Option<f64>, lon: Option<f64>) -> GeocodedRecord {
        GeocodedRecord {
            place: PlaceRecord {
                name: name.to_string(),
                address: Some("addr".into()),
                place_type: Some("· Bảo tàng ".into()),
                comment: Some(" \"Đẹp lắm\" ".into()),
                rating: FieldValue::Text("4,5".into()),
                count: FieldValue::Text("1,2 K".into()),
                ..PlaceRecord::default()
            },
            lat,
            lon,
        }
    }

    #[test]
    fn test_drops_null_and_duplicate_coordinates() {
        let records = vec![
            row("a", Some(10.0), Some(106.0)),
            row("b", None, None),
            row("c", Some(10.0), None),
            row("d", Some(10.0), Some(106.0)),
            row("e", Some(10.5), Some(106.0)),
        ];

        let outcome = DataCleaner::default().clean(records);

        let names: Vec<_> = outcome.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "e"]);
        assert_eq!(
            outcome.report,
            CleanReport {
                initial: 5,
                geocode_failed: 2,
                duplicates: 1,
                remaining: 2,
            }
        );
        assert_eq!(outcome.report.removed(), 3);
    }

    #[test]
    fn test_normalizes_fields() {
        let outcome = DataCleaner::default().clean(vec![row("a", Some(1.0), Some(2.0))]);
        let record = &outcome.records[0];
        assert_eq!(record.comment, "Đẹp lắm");
        assert_eq!(record.place_type.as_deref(), Some("Bảo tàng"));
        assert_eq!(record.rating, 4.5);
        assert!((record.count - 1200.0).abs() < 1e-9);
        assert_eq!((record.lat, record.lon), (1.0, 2.0));
    }

    #[test]
    fn test_missing_comment_gets_placeholder() {
        assert_eq!(clean_comment(None, "không có đánh giá"), "không có đánh giá");
        assert_eq!(clean_comment(Some("\"\"".into()), "x"), "");

        let cleaner = DataCleaner::new("n/a");
        let mut record = row("a", Some(1.0), Some(2.0));
        record.place.comment = None;
        assert_eq!(cleaner.clean(vec![record]).records[0].comment, "n/a");
    }

    #[test]
    fn test_clean_type() {
        assert_eq!(clean_type(Some("· Công viên".into())).as_deref(), Some("Công viên"));
        assert_eq!(
            clean_type(Some("Bảo tàng · Di tích".into())).as_deref(),
            Some("Bảo tàngDi tích")
        );
        assert_eq!(clean_type(Some("· ".into())), None);
        assert_eq!(clean_type(None), None);
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let records = vec![
            row("a", Some(10.0), Some(106.0)),
            row("b", Some(10.1), Some(106.1)),
            row("c", Some(10.2), Some(106.2)),
        ];
        let cleaner = DataCleaner::default();

        let first = cleaner.clean(records);
        let again: Vec<GeocodedRecord> = first
            .records
            .iter()
            .cloned()
            .map(GeocodedRecord::from)
            .collect();
        let second = cleaner.clean(again);

        assert_eq!(first.records.len(), second.records.len());
        assert_eq!(first.records, second.records);
        assert_eq!(second.report.removed(), 0);
    }

    #[test]
    fn test_empty_input() {
        let outcome = DataCleaner::default().clean(Vec::new());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.report, CleanReport::default());
    }
}
