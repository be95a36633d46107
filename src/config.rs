use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{PrepError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub geocoder: GeocoderConfig,
    pub boundary: BoundaryConfig,
    pub pipeline: PipelineConfig,
    pub index: IndexConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub api_key: String,
    pub limit: u32,
    pub timeout_seconds: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: GEOAPIFY_SEARCH_URL.to_string(),
            api_key: String::new(),
            limit: DEFAULT_GEOCODE_LIMIT,
            timeout_seconds: DEFAULT_GEOCODE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    pub base_url: String,
    pub user_agent: String,
    pub country: String,
    /// Nominatim results to inspect when looking for a polygon
    pub candidate_limit: u32,
    pub timeout_seconds: u64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            base_url: NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            candidate_limit: DEFAULT_BOUNDARY_CANDIDATES,
            timeout_seconds: DEFAULT_BOUNDARY_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input_file: PathBuf,
    /// No file is written when unset
    pub output_file: Option<PathBuf>,
    pub district: String,
    pub city: String,
    pub name_column: String,
    pub address_column: String,
    pub comment_placeholder: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("places.csv"),
            output_file: None,
            district: String::new(),
            city: String::new(),
            name_column: NAME_COLUMN.to_string(),
            address_column: ADDRESS_COLUMN.to_string(),
            comment_placeholder: DEFAULT_COMMENT_PLACEHOLDER.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Free-text query used to look up the district boundary
    pub fn boundary_query(&self, country: &str) -> String {
        format!("{}, {}, {}", self.district, self.city, country)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub input_file: PathBuf,
    pub collection_name: String,
    pub model: String,
    pub query_text: String,
    pub top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("places_filtered.csv"),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            query_text: DEFAULT_QUERY_TEXT.to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_or_default(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load `path`. Only the default path may be absent, in which case the
    /// defaults (plus environment overrides) are used.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else if path == Path::new(DEFAULT_CONFIG_PATH) {
            let mut config = Config::default();
            config.apply_env();
            Ok(config)
        } else {
            Err(PrepError::Config(format!(
                "config file '{}' does not exist",
                path.display()
            )))
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_content = fs::read_to_string(path).map_err(|e| {
            PrepError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_toml(&config_content)?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Environment overrides; callers load `.env` beforehand.
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(GEOAPIFY_API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.geocoder.api_key = key.trim().to_string();
            }
        }
    }

    /// Checks required by the geocode/clean/filter pipeline
    pub fn validate_pipeline(&self) -> Result<()> {
        if self.geocoder.api_key.trim().is_empty() {
            return Err(PrepError::Config(format!(
                "geocoder.api_key is empty; set it in the config file or {}",
                GEOAPIFY_API_KEY_ENV
            )));
        }
        if self.pipeline.district.trim().is_empty() {
            return Err(PrepError::Config("pipeline.district is required".into()));
        }
        if self.pipeline.city.trim().is_empty() {
            return Err(PrepError::Config("pipeline.city is required".into()));
        }
        if self.geocoder.limit == 0 {
            return Err(PrepError::Config("geocoder.limit must be at least 1".into()));
        }
        Ok(())
    }

    pub fn validate_index(&self) -> Result<()> {
        if self.index.top_k == 0 {
            return Err(PrepError::Config("index.top_k must be at least 1".into()));
        }
        if self.index.collection_name.trim().is_empty() {
            return Err(PrepError::Config("index.collection_name is required".into()));
        }
        Ok(())
    }
}
