// Pipeline stages: geocoding, cleaning, boundary filtering

pub mod boundary_filter;
pub mod clean;
pub mod geocode;
pub mod normalize;

pub use boundary_filter::filter_within;
pub use clean::{CleanOutcome, CleanReport, DataCleaner};
pub use geocode::{geocode_batch, GeocodeBatch};
