// Place preparation pipeline: load, geocode, clean, clip to a boundary, save

pub mod processing;

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::app::ports::{BoundaryProvider, Geocoder};
use crate::config::{Config, PipelineConfig};
use crate::dataset::{load_dataset, save_csv, ColumnMap, Dataset};
use crate::error::Result;
use crate::infra::{GeoapifyGeocoder, NominatimBoundaryProvider};
use crate::observability::metrics;
use crate::types::FilteredRecord;
use processing::{filter_within, geocode_batch, CleanReport, DataCleaner};

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub input_file: PathBuf,
    pub loaded: usize,
    pub geocoded: usize,
    pub geocode_success_rate: f64,
    pub clean_report: CleanReport,
    pub inside_boundary: usize,
    pub records: Vec<FilteredRecord>,
    /// Set only when a file was actually written
    pub output_file: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct Pipeline {
    config: PipelineConfig,
    country: String,
    geocoder: Box<dyn Geocoder>,
    boundary_provider: Box<dyn BoundaryProvider>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        country: impl Into<String>,
        geocoder: Box<dyn Geocoder>,
        boundary_provider: Box<dyn BoundaryProvider>,
    ) -> Self {
        Self {
            config,
            country: country.into(),
            geocoder,
            boundary_provider,
        }
    }

    /// Wire the pipeline to Geoapify and Nominatim
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate_pipeline()?;
        let geocoder = GeoapifyGeocoder::new(&config.geocoder)?;
        let boundary_provider = NominatimBoundaryProvider::new(&config.boundary)?;
        Ok(Self::new(
            config.pipeline.clone(),
            config.boundary.country.clone(),
            Box::new(geocoder),
            Box::new(boundary_provider),
        ))
    }

    /// Load the configured input file and run every stage on it
    #[instrument(skip(self), fields(input = %self.config.input_file.display()))]
    pub async fn run(&self) -> Result<PipelineResult> {
        info!("📂 Loading {}", self.config.input_file.display());
        let dataset = load_dataset(&self.config.input_file, &ColumnMap::from(&self.config))?;
        self.process(dataset).await
    }

    /// Run geocoding, cleaning, boundary filtering and the optional save on
    /// an already loaded table.
    #[instrument(skip(self, dataset), fields(rows = dataset.len()))]
    pub async fn process(&self, dataset: Dataset) -> Result<PipelineResult> {
        let started_at = Utc::now();
        let t_pipeline = std::time::Instant::now();
        let loaded = dataset.len();
        if dataset.is_empty() {
            warn!("Input table has no data rows");
        }
        let output_headers = dataset.output_headers();

        // Step 1: geocode
        info!("🌍 Geocoding {} places...", loaded);
        let batch = geocode_batch(
            self.geocoder.as_ref(),
            dataset.records,
            &self.config.district,
            &self.config.city,
        )
        .await;

        // Step 2: clean
        info!("🧹 Cleaning data...");
        let cleaned = DataCleaner::new(self.config.comment_placeholder.as_str()).clean(batch.records);

        let mut result = PipelineResult {
            input_file: self.config.input_file.clone(),
            loaded,
            geocoded: batch.geocoded,
            geocode_success_rate: batch.success_rate,
            clean_report: cleaned.report,
            inside_boundary: 0,
            records: Vec::new(),
            output_file: None,
            started_at,
            finished_at: started_at,
        };

        if cleaned.records.is_empty() {
            info!("No rows left after cleaning, skipping boundary filter");
            result.finished_at = Utc::now();
            metrics::pipeline::duration(t_pipeline.elapsed().as_secs_f64());
            return Ok(result);
        }

        // Step 3: clip to the district boundary
        let query = self.config.boundary_query(&self.country);
        info!("🗺️ Downloading boundary for {}", query);
        let boundary = self.boundary_provider.fetch(&query).await?;
        let records = filter_within(cleaned.records, &boundary);
        result.inside_boundary = records.len();

        // Step 4: save
        if let Some(path) = &self.config.output_file {
            save_csv(path, &output_headers, &ColumnMap::from(&self.config), &records)?;
            result.output_file = Some(path.clone());
        }

        result.records = records;
        result.finished_at = Utc::now();
        metrics::pipeline::duration(t_pipeline.elapsed().as_secs_f64());
        info!(
            "✅ Pipeline finished: {} loaded, {} geocoded, {} inside boundary",
            result.loaded, result.geocoded, result.inside_boundary
        );
        Ok(result)
    }
}
