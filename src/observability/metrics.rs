//! Metric recording for each pipeline phase.
//!
//! Recording goes through the `metrics` facade. Nothing is exported unless the
//! host process installs a recorder, in which case these names show up as-is.

/// All metric names used by the pipeline and the index builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    RowsLoaded,
    GeocodeSuccess,
    GeocodeFailure,
    GeocodeSuccessRate,
    CleanRowsRemoved,
    CleanRowsKept,
    BoundaryInside,
    BoundaryOutside,
    PipelineDuration,
    IndexDocuments,
    IndexQueryResults,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RowsLoaded => "geoprep_rows_loaded_total",
            MetricName::GeocodeSuccess => "geoprep_geocode_success_total",
            MetricName::GeocodeFailure => "geoprep_geocode_failure_total",
            MetricName::GeocodeSuccessRate => "geoprep_geocode_success_rate_percent",
            MetricName::CleanRowsRemoved => "geoprep_clean_rows_removed_total",
            MetricName::CleanRowsKept => "geoprep_clean_rows_kept_total",
            MetricName::BoundaryInside => "geoprep_boundary_inside_total",
            MetricName::BoundaryOutside => "geoprep_boundary_outside_total",
            MetricName::PipelineDuration => "geoprep_pipeline_duration_seconds",
            MetricName::IndexDocuments => "geoprep_index_documents_total",
            MetricName::IndexQueryResults => "geoprep_index_query_results",
        }
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod load {
    use super::MetricName;

    pub fn rows_loaded(count: usize) {
        ::metrics::counter!(MetricName::RowsLoaded.as_str()).increment(count as u64);
    }
}

pub mod geocode {
    use super::MetricName;

    pub fn success() {
        ::metrics::counter!(MetricName::GeocodeSuccess.as_str()).increment(1);
    }

    /// `reason` is one of `request`, `status`, `decode`, `empty`, `no_address`
    pub fn failure(reason: &'static str) {
        ::metrics::counter!(MetricName::GeocodeFailure.as_str(), "reason" => reason).increment(1);
    }

    pub fn success_rate(percent: f64) {
        ::metrics::gauge!(MetricName::GeocodeSuccessRate.as_str()).set(percent);
    }
}

pub mod clean {
    use super::MetricName;

    pub fn rows_removed(stage: &'static str, count: usize) {
        ::metrics::counter!(MetricName::CleanRowsRemoved.as_str(), "stage" => stage)
            .increment(count as u64);
    }

    pub fn rows_kept(count: usize) {
        ::metrics::counter!(MetricName::CleanRowsKept.as_str()).increment(count as u64);
    }
}

pub mod boundary {
    use super::MetricName;

    pub fn filtered(inside: usize, outside: usize) {
        ::metrics::counter!(MetricName::BoundaryInside.as_str()).increment(inside as u64);
        ::metrics::counter!(MetricName::BoundaryOutside.as_str()).increment(outside as u64);
    }
}

pub mod pipeline {
    use super::MetricName;

    pub fn duration(seconds: f64) {
        ::metrics::histogram!(MetricName::PipelineDuration.as_str()).record(seconds);
    }
}

pub mod index {
    use super::MetricName;

    pub fn documents_added(count: usize) {
        ::metrics::counter!(MetricName::IndexDocuments.as_str()).increment(count as u64);
    }

    pub fn query_results(count: usize) {
        ::metrics::histogram!(MetricName::IndexQueryResults.as_str()).record(count as f64);
    }
}
