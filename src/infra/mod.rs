// Adapters for the external services behind the app ports

pub mod fastembed_embedder;
pub mod geoapify;
pub mod http_client;
pub mod nominatim;

pub use fastembed_embedder::FastEmbedder;
pub use geoapify::GeoapifyGeocoder;
pub use nominatim::NominatimBoundaryProvider;
