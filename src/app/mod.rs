pub mod ports;

pub use ports::{BoundaryProvider, Embedder, Geocoder};
