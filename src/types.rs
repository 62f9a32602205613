use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Minimum length of a Sentinel-1 granule name carrying a full start timestamp
pub const MIN_GRANULE_LEN: usize = 33;

/// Sentinel-1 granule name, validated against the fixed product naming layout
///
/// `S1A_IW_SLC__1SDV_20200101T000000_20200101T000020_030639_0382D5_DADE`
///  ^^^              ^^^^^^^^ ^^^^^^
///  platform         date     time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GranuleId {
    name: String,
    acquisition_time: NaiveDateTime,
}

fn granule_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Offsets: platform 0..3, date 17..25, 'T' at 25, time 26..32, '_' at 32
        Regex::new(r"^[A-Z0-9]{3}_[A-Z0-9]{2}_[A-Z0-9_]{4}_[A-Z0-9]{4}_(\d{8})T(\d{6})_")
            .expect("granule pattern is valid")
    })
}

impl GranuleId {
    /// Parse and validate a granule name
    pub fn parse(name: &str) -> InsarResult<Self> {
        let name = name.trim();

        if name.len() < MIN_GRANULE_LEN || !name.is_ascii() {
            return Err(InsarError::MalformedGranule {
                name: name.to_string(),
                reason: format!("expected at least {} ASCII characters", MIN_GRANULE_LEN),
            });
        }

        let caps = granule_pattern().captures(name).ok_or_else(|| InsarError::MalformedGranule {
            name: name.to_string(),
            reason: "does not match <platform>_<mode>_<type>_<class>_<YYYYMMDD>T<HHMMSS>_".to_string(),
        })?;

        let date = NaiveDate::parse_from_str(&caps[1], "%Y%m%d").map_err(|e| {
            InsarError::MalformedGranule {
                name: name.to_string(),
                reason: format!("invalid acquisition date: {}", e),
            }
        })?;
        let time = NaiveTime::parse_from_str(&caps[2], "%H%M%S").map_err(|e| {
            InsarError::MalformedGranule {
                name: name.to_string(),
                reason: format!("invalid acquisition time: {}", e),
            }
        })?;

        Ok(Self {
            name: name.to_string(),
            acquisition_time: NaiveDateTime::new(date, time),
        })
    }

    /// Full granule name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Platform code, e.g. `S1A`
    pub fn platform(&self) -> &str {
        &self.name[0..3]
    }

    /// Acquisition start as `YYYY-MM-DDTHH:MM:SS`
    pub fn acquisition_timestamp(&self) -> String {
        let n = &self.name;
        format!(
            "{}-{}-{}T{}:{}:{}",
            &n[17..21],
            &n[21..23],
            &n[23..25],
            &n[26..28],
            &n[28..30],
            &n[30..32]
        )
    }

    /// Acquisition start as a naive UTC instant
    pub fn acquisition_time(&self) -> NaiveDateTime {
        self.acquisition_time
    }

    /// Acquisition date as `YYYYMMDD`
    pub fn acquisition_date(&self) -> &str {
        &self.name[17..25]
    }

    /// Name of the directory the granule archive unpacks to
    pub fn safe_dir_name(&self) -> String {
        format!("{}.SAFE", self.name)
    }

    /// Lookup parameters `(platform, timestamp)` used by the orbit catalog
    pub fn lookup_parameters(&self) -> (String, String) {
        (self.platform().to_string(), self.acquisition_timestamp())
    }
}

impl std::fmt::Display for GranuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl std::str::FromStr for GranuleId {
    type Err = InsarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Staged granule ready for interferometric processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranuleDescriptor {
    /// Extracted `<granule>.SAFE` directory
    pub working_directory: PathBuf,
    /// Downloaded orbit file
    pub orbit_file: PathBuf,
    /// Acquisition date, `YYYYMMDD`
    pub acquisition_date: String,
}

/// Orbit product quality tiers published for Sentinel-1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitType {
    /// Precise Orbit Ephemerides (best accuracy, ~20 days delay)
    POEORB,
    /// Restituted Orbit Ephemerides (lower accuracy, ~3 hours delay)
    RESORB,
}

impl OrbitType {
    /// Product type string used by the orbit catalog
    pub fn product_type(&self) -> &'static str {
        match self {
            OrbitType::POEORB => "AUX_POEORB",
            OrbitType::RESORB => "AUX_RESORB",
        }
    }
}

impl std::fmt::Display for OrbitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrbitType::POEORB => write!(f, "POEORB"),
            OrbitType::RESORB => write!(f, "RESORB"),
        }
    }
}

/// One orbit catalog lookup attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrbitQuery {
    pub orbit_type: OrbitType,
    pub platform_prefix: String,
    /// Orbit validity must start strictly before this instant
    pub validity_start_before: String,
    /// Orbit validity must stop strictly after this instant
    pub validity_stop_after: String,
    pub ordering: String,
    pub page_size: u32,
}

impl OrbitQuery {
    /// Query for the most recently created orbit of `orbit_type` covering the granule
    pub fn for_granule(granule: &GranuleId, orbit_type: OrbitType) -> Self {
        let (platform, timestamp) = granule.lookup_parameters();
        Self {
            orbit_type,
            platform_prefix: platform,
            validity_start_before: timestamp.clone(),
            validity_stop_after: timestamp,
            ordering: "-creation_date".to_string(),
            page_size: 1,
        }
    }

    /// Query string parameters
    pub fn to_params(&self) -> Vec<(String, String)> {
        vec![
            ("product_type".to_string(), self.orbit_type.product_type().to_string()),
            ("product_name__startswith".to_string(), self.platform_prefix.clone()),
            ("validity_start__lt".to_string(), self.validity_start_before.clone()),
            ("validity_stop__gt".to_string(), self.validity_stop_after.clone()),
            ("ordering".to_string(), self.ordering.clone()),
            ("page_size".to_string(), self.page_size.to_string()),
        ]
    }
}

/// Outcome of a catalog lookup; an empty result set is not an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogResult {
    Found(String),
    NotFound,
}

impl CatalogResult {
    pub fn is_found(&self) -> bool {
        matches!(self, CatalogResult::Found(_))
    }
}

/// DEM selection passed through to the interferometric processor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemChoice {
    /// Let the processor pick and download a DEM itself
    #[default]
    Auto,
    /// Force the 1-arcsecond SRTM DEM
    Srtm,
}

impl std::fmt::Display for DemChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemChoice::Auto => write!(f, "auto"),
            DemChoice::Srtm => write!(f, "srtm"),
        }
    }
}

/// Error types for the InSAR pipeline
#[derive(Debug, thiserror::Error)]
pub enum InsarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP {status} from {url}")]
    Transport { url: String, status: u16 },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Granule not found in catalog: {0}")]
    GranuleNotFound(String),

    #[error("No precise or restituted orbit available for {0}")]
    OrbitNotFound(String),

    #[error("Malformed granule name '{name}': {reason}")]
    MalformedGranule { name: String, reason: String },

    #[error("Malformed catalog response: {0}")]
    MalformedResponse(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{program} exited with status {code}")]
    Subprocess { program: String, code: i32 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl InsarError {
    /// Exit status the whole run should terminate with
    pub fn exit_code(&self) -> i32 {
        match self {
            InsarError::Subprocess { code, .. } => *code,
            _ => 1,
        }
    }
}

impl From<reqwest::Error> for InsarError {
    fn from(e: reqwest::Error) -> Self {
        InsarError::Http(e.to_string())
    }
}

impl From<zip::result::ZipError> for InsarError {
    fn from(e: zip::result::ZipError) -> Self {
        InsarError::Archive(e.to_string())
    }
}

/// Result type for pipeline operations
pub type InsarResult<T> = Result<T, InsarError>;
