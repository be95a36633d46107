//! Default values shared by configuration, cleaning and the index builder.

// Column names expected in scraped place tables
pub const NAME_COLUMN: &str = "name";
pub const ADDRESS_COLUMN: &str = "address";
pub const TYPE_COLUMN: &str = "type";
pub const COMMENT_COLUMN: &str = "comment";
pub const RATING_COLUMN: &str = "rating";
pub const COUNT_COLUMN: &str = "count";
pub const LAT_COLUMN: &str = "lat";
pub const LON_COLUMN: &str = "lon";
pub const GEOMETRY_COLUMN: &str = "geometry";

/// Written into rows that were scraped without a review comment
pub const DEFAULT_COMMENT_PLACEHOLDER: &str = "không có đánh giá";

/// Bullet prefix the scraper leaves in front of place types
pub const TYPE_BULLET_MARKER: &str = "· ";

// Geocoder (Geoapify)
pub const GEOAPIFY_SEARCH_URL: &str = "https://api.geoapify.com/v1/geocode/search";
pub const GEOAPIFY_API_KEY_ENV: &str = "GEOAPIFY_API_KEY";
pub const DEFAULT_GEOCODE_LIMIT: u32 = 1;
pub const DEFAULT_GEOCODE_TIMEOUT_SECS: u64 = 10;

// Boundary provider (OpenStreetMap Nominatim)
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = concat!("geoprep/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_COUNTRY: &str = "Việt Nam";
pub const DEFAULT_BOUNDARY_CANDIDATES: u32 = 5;
pub const DEFAULT_BOUNDARY_TIMEOUT_SECS: u64 = 30;

// Embedding index
pub const DEFAULT_COLLECTION_NAME: &str = "sightseeing";
pub const DEFAULT_EMBEDDING_MODEL: &str = "intfloat/multilingual-e5-base";
pub const DEFAULT_QUERY_TEXT: &str = "tôi muốn tham quan vườn thú, bảo tàng";
pub const DEFAULT_TOP_K: usize = 5;
