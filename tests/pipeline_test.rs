use anyhow::Result;
use async_trait::async_trait;
use geo::{polygon, MultiPolygon};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

use geoprep::app::ports::{BoundaryProvider, Geocoder};
use geoprep::boundary::Boundary;
use geoprep::config::PipelineConfig;
use geoprep::error::PrepError;
use geoprep::pipeline::Pipeline;
use geoprep::types::Coordinates;

/// Every query resolves to the same point unless it mentions "nowhere"
struct FixedGeocoder {
    coordinates: Coordinates,
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, query: &str) -> Option<Coordinates> {
        if query.contains("nowhere") {
            None
        } else {
            Some(self.coordinates)
        }
    }
}

struct StubBoundary {
    calls: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

#[async_trait]
impl BoundaryProvider for StubBoundary {
    async fn fetch(&self, query: &str) -> geoprep::error::Result<Boundary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(PrepError::Boundary {
                message: format!("No polygon found for {}", query),
            });
        }
        let square = polygon![
            (x: 106.6, y: 10.7),
            (x: 106.8, y: 10.7),
            (x: 106.8, y: 10.9),
            (x: 106.6, y: 10.9),
            (x: 106.6, y: 10.7),
        ];
        Ok(Boundary::new("Quận 1", MultiPolygon(vec![square])))
    }
}

struct Harness {
    pipeline: Pipeline,
    boundary_calls: Arc<AtomicUsize>,
    boundary_queries: Arc<Mutex<Vec<String>>>,
}

fn harness(input: &Path, output: Option<PathBuf>, fail_boundary: bool) -> Harness {
    let boundary_calls = Arc::new(AtomicUsize::new(0));
    let boundary_queries = Arc::new(Mutex::new(Vec::new()));
    let config = PipelineConfig {
        input_file: input.to_path_buf(),
        output_file: output,
        district: "Quận 1".into(),
        city: "Thành phố Hồ Chí Minh".into(),
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(
        config,
        "Việt Nam",
        Box::new(FixedGeocoder {
            coordinates: Coordinates {
                lat: 10.7769,
                lon: 106.7009,
            },
        }),
        Box::new(StubBoundary {
            calls: boundary_calls.clone(),
            queries: boundary_queries.clone(),
            fail: fail_boundary,
        }),
    );
    Harness {
        pipeline,
        boundary_calls,
        boundary_queries,
    }
}

const THREE_PLACES: &str = "name,address,type,comment,rating,count,category\n\
Bảo tàng Mỹ thuật,97A Phó Đức Chính,· Bảo tàng,\" Rất đẹp \",\"4,5\",\"1,2 K\",museum\n\
Không địa chỉ,,· Công viên,,4,10,park\n\
Bảo tàng trùng,97A Phó Đức Chính,· Bảo tàng,,3.5,(87),museum\n";

#[tokio::test]
async fn test_end_to_end_three_rows() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("places.csv");
    fs::write(&input, THREE_PLACES)?;
    let output = dir.path().join("out").join("places_filtered.csv");

    let h = harness(&input, Some(output.clone()), false);
    let result = h.pipeline.run().await?;

    assert_eq!(result.loaded, 3);
    assert_eq!(result.geocoded, 2);
    assert!((result.geocode_success_rate - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(result.clean_report.geocode_failed, 1);
    assert_eq!(result.clean_report.duplicates, 1);
    assert_eq!(result.inside_boundary, 1);
    assert_eq!(result.records.len(), 1);

    let kept = &result.records[0].record;
    assert_eq!(kept.name, "Bảo tàng Mỹ thuật");
    assert!((kept.count - 1200.0).abs() < 1e-9);
    assert_eq!(kept.rating, 4.5);
    assert_eq!(kept.comment, "Rất đẹp");
    assert_eq!(kept.place_type.as_deref(), Some("Bảo tàng"));

    assert_eq!(
        h.boundary_queries.lock().unwrap().as_slice(),
        ["Quận 1, Thành phố Hồ Chí Minh, Việt Nam"]
    );
    assert_eq!(result.output_file.as_deref(), Some(output.as_path()));
    assert!(result.finished_at >= result.started_at);
    Ok(())
}

#[tokio::test]
async fn test_saved_csv_keeps_columns_and_adds_geometry() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("places.csv");
    fs::write(&input, THREE_PLACES)?;
    let output = dir.path().join("filtered.csv");

    let h = harness(&input, Some(output.clone()), false);
    h.pipeline.run().await?;

    let mut reader = csv::Reader::from_path(&output)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    assert_eq!(
        headers,
        vec![
            "name", "address", "type", "comment", "rating", "count", "category", "lat", "lon",
            "geometry"
        ]
    );

    let rows: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(&row[0], "Bảo tàng Mỹ thuật");
    assert_eq!(&row[2], "Bảo tàng");
    assert_eq!(row[4].parse::<f64>()?, 4.5);
    assert!((row[5].parse::<f64>()? - 1200.0).abs() < 1e-9);
    assert_eq!(&row[6], "museum");
    assert_eq!(row[7].parse::<f64>()?, 10.7769);
    assert_eq!(row[8].parse::<f64>()?, 106.7009);
    assert_eq!(&row[9], "POINT (106.7009 10.7769)");
    Ok(())
}

#[tokio::test]
async fn test_nothing_geocoded_skips_boundary_and_save() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("places.csv");
    fs::write(
        &input,
        "name,address\nLost,nowhere street\nAlso lost,\n",
    )?;
    let output = dir.path().join("filtered.csv");

    let h = harness(&input, Some(output.clone()), false);
    let result = h.pipeline.run().await?;

    assert_eq!(result.loaded, 2);
    assert_eq!(result.geocoded, 0);
    assert_eq!(result.geocode_success_rate, 0.0);
    assert!(result.records.is_empty());
    assert!(result.output_file.is_none());
    assert_eq!(h.boundary_calls.load(Ordering::SeqCst), 0);
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_boundary_failure_aborts_run() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("places.csv");
    fs::write(&input, THREE_PLACES)?;
    let output = dir.path().join("filtered.csv");

    let h = harness(&input, Some(output.clone()), true);
    let err = h.pipeline.run().await.unwrap_err();

    assert!(matches!(err, PrepError::Boundary { .. }));
    assert_eq!(h.boundary_calls.load(Ordering::SeqCst), 1);
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_without_output_path_nothing_is_written() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("places.csv");
    fs::write(&input, THREE_PLACES)?;

    let h = harness(&input, None, false);
    let result = h.pipeline.run().await?;

    assert_eq!(result.records.len(), 1);
    assert!(result.output_file.is_none());
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_name_column_is_reported() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("places.csv");
    fs::write(&input, "title,address\nA,1 Street\n")?;

    let h = harness(&input, None, false);
    let err = h.pipeline.run().await.unwrap_err();

    assert!(matches!(err, PrepError::MissingColumn(ref c) if c == "name"));
    Ok(())
}

#[tokio::test]
async fn test_header_only_input_yields_empty_result() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("places.csv");
    fs::write(&input, "name,address,type,comment,rating,count\n")?;

    let h = harness(&input, None, false);
    let result = h.pipeline.run().await?;

    assert_eq!(result.loaded, 0);
    assert_eq!(result.geocode_success_rate, 0.0);
    assert!(result.records.is_empty());
    assert_eq!(h.boundary_calls.load(Ordering::SeqCst), 0);
    Ok(())
}
