//! Pipeline configuration
//!
//! Every field has a default matching the public ASF/CMR services and the stock
//! ISCE/GDAL tool names, so a config file is only needed to override them.

use crate::types::{InsarError, InsarResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CMR_URL: &str = "https://cmr.earthdata.nasa.gov/search/granules.json";
pub const ORBIT_URL: &str = "https://s1qc.asf.alaska.edu/api/orbits/";
pub const USER_AGENT: &str = concat!("s1-insar/", env!("CARGO_PKG_VERSION"), " asfdaac/apt-insar");
/// Download chunk size (5 MiB)
pub const CHUNK_SIZE: usize = 5_242_880;

/// Sentinel-1A and Sentinel-1B SLC collections hosted by ASF
pub const COLLECTION_IDS: [&str; 2] = [
    "C1214470488-ASF", // SENTINEL-1A_SLC
    "C1327985661-ASF", // SENTINEL-1B_SLC
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub cmr_url: String,
    pub orbit_url: String,
    pub user_agent: String,
    pub chunk_size: usize,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            cmr_url: CMR_URL.to_string(),
            orbit_url: ORBIT_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            chunk_size: CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// topsApp executable
    pub topsapp: String,
    /// Last processing step to run
    pub end_step: String,
    pub swaths: Vec<u8>,
    pub azimuth_looks: u32,
    pub range_looks: u32,
    pub unwrapper: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            topsapp: "topsApp.py".to_string(),
            end_step: "geocode".to_string(),
            swaths: vec![1, 2, 3],
            azimuth_looks: 7,
            range_looks: 19,
            unwrapper: "snaphu_mcf".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductConfig {
    pub gdal_translate: String,
    pub gdaladdo: String,
    pub mdx: String,
    pub overview_levels: Vec<u32>,
    pub preview_width: u32,
    pub preview: bool,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            gdal_translate: "gdal_translate".to_string(),
            gdaladdo: "gdaladdo".to_string(),
            mdx: "mdx.py".to_string(),
            overview_levels: vec![2, 4, 6, 8],
            preview_width: 2048,
            preview: true,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Staging directory shared by both granules, the config document and products
    pub work_dir: PathBuf,
    /// Earthdata credential file; resolved from the home directory when unset
    pub netrc_path: Option<PathBuf>,
    pub endpoints: EndpointConfig,
    pub processor: ProcessorConfig,
    pub products: ProductConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            netrc_path: None,
            endpoints: EndpointConfig::default(),
            processor: ProcessorConfig::default(),
            products: ProductConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> InsarResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> InsarResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| InsarError::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> InsarResult<()> {
        if self.endpoints.chunk_size == 0 {
            return Err(InsarError::Config("endpoints.chunk_size must be positive".to_string()));
        }
        if self.products.overview_levels.is_empty() {
            return Err(InsarError::Config("products.overview_levels must not be empty".to_string()));
        }
        if self.processor.azimuth_looks == 0 || self.processor.range_looks == 0 {
            return Err(InsarError::Config("processor looks must be positive".to_string()));
        }
        if self.processor.swaths.is_empty() {
            return Err(InsarError::Config("processor.swaths must not be empty".to_string()));
        }
        Ok(())
    }

    /// Credential file path, falling back to `~/.netrc`
    pub fn resolve_netrc_path(&self) -> InsarResult<PathBuf> {
        if let Some(path) = &self.netrc_path {
            return Ok(path.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".netrc"))
            .ok_or_else(|| InsarError::Config("cannot determine home directory for .netrc".to_string()))
    }
}
