use geo::Point;
use tracing::info;

use crate::boundary::Boundary;
use crate::observability::metrics;
use crate::types::{CleanRecord, FilteredRecord};

/// Keep the records whose point lies strictly inside the boundary. Points
/// on the boundary line are dropped. Input order is preserved.
pub fn filter_within(records: Vec<CleanRecord>, boundary: &Boundary) -> Vec<FilteredRecord> {
    let total = records.len();
    info!("Creating points from {} rows", total);

    let inside: Vec<FilteredRecord> = records
        .into_iter()
        .map(|record| {
            let geometry = Point::new(record.lon, record.lat);
            FilteredRecord { record, geometry }
        })
        .filter(|r| boundary.contains_point(&r.geometry))
        .collect();

    let outside = total - inside.len();
    info!("Points before filter: {}", total);
    info!("Points inside {}: {}", boundary.name, inside.len());
    info!("Points removed: {}", outside);
    metrics::boundary::filtered(inside.len(), outside);

    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use std::collections::BTreeMap;

    fn unit_square() -> Boundary {
        let square = polygon![
            (x: 106.0, y: 10.0),
            (x: 107.0, y: 10.0),
            (x: 107.0, y: 11.0),
            (x: 106.0, y: 11.0),
            (x: 106.0, y: 10.0),
        ];
        Boundary::new("Test District", MultiPolygon(vec![square]))
    }

    fn record(name: &str, lat: f64, lon: f64) -> CleanRecord {
        CleanRecord {
            name: name.to_string(),
            address: None,
            place_type: None,
            comment: String::new(),
            rating: 0.0,
            count: 0.0,
            lat,
            lon,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_keeps_only_interior_points() {
        let records = vec![
            record("inside", 10.5, 106.5),
            record("outside", 12.0, 106.5),
            record("edge", 10.0, 106.5),
            record("also inside", 10.9, 106.1),
        ];

        let kept = filter_within(records, &unit_square());

        let names: Vec<_> = kept.iter().map(|r| r.record.name.as_str()).collect();
        assert_eq!(names, vec!["inside", "also inside"]);
        assert_eq!(kept[0].geometry, Point::new(106.5, 10.5));
    }

    #[test]
    fn test_results_fall_inside_bounding_box() {
        let boundary = unit_square();
        let records = (0..20)
            .map(|i| record(&i.to_string(), 9.5 + i as f64 * 0.1, 105.5 + i as f64 * 0.1))
            .collect();

        let kept = filter_within(records, &boundary);
        let bbox = boundary.bounding_rect().unwrap();

        assert!(!kept.is_empty());
        for r in &kept {
            assert!(r.geometry.x() >= bbox.min().x && r.geometry.x() <= bbox.max().x);
            assert!(r.geometry.y() >= bbox.min().y && r.geometry.y() <= bbox.max().y);
        }
    }

    #[test]
    fn test_swapped_coordinates_are_outside() {
        let kept = filter_within(vec![record("swapped", 106.5, 10.5)], &unit_square());
        assert!(kept.is_empty());
    }
}
