use crate::config::EndpointConfig;
use crate::io::http::{Fetcher, HttpTransport};
use crate::types::{CatalogResult, GranuleId, InsarError, InsarResult, OrbitQuery, OrbitType};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use std::path::PathBuf;

/// How to choose among several orbit products that all cover an acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// Latest `creation_date` wins (reprocessed products supersede older ones)
    MostRecentCreation,
}

impl TieBreak {
    /// Server-side ordering parameter
    pub fn ordering(&self) -> &'static str {
        match self {
            TieBreak::MostRecentCreation => "-creation_date",
        }
    }
}

/// One step of the orbit fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrbitTier {
    pub orbit_type: OrbitType,
    pub tie_break: TieBreak,
}

/// Precise orbits first, restituted orbits when no precise product exists yet
pub const DEFAULT_TIERS: [OrbitTier; 2] = [
    OrbitTier {
        orbit_type: OrbitType::POEORB,
        tie_break: TieBreak::MostRecentCreation,
    },
    OrbitTier {
        orbit_type: OrbitType::RESORB,
        tie_break: TieBreak::MostRecentCreation,
    },
];

#[derive(Debug, Deserialize)]
struct OrbitResponse {
    #[serde(default)]
    results: Vec<OrbitRecord>,
}

/// Orbit catalog record; only `remote_url` is guaranteed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrbitRecord {
    pub remote_url: String,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub validity_start: Option<String>,
    #[serde(default)]
    pub validity_stop: Option<String>,
}

impl OrbitRecord {
    fn created(&self) -> Option<NaiveDateTime> {
        self.creation_date.as_deref().and_then(parse_catalog_time)
    }

    /// Whether the validity window strictly brackets `t`; records without a
    /// parsable window are trusted to match the server-side filter
    fn covers(&self, t: NaiveDateTime) -> bool {
        let start = self.validity_start.as_deref().and_then(parse_catalog_time);
        let stop = self.validity_stop.as_deref().and_then(parse_catalog_time);
        match (start, stop) {
            (Some(start), Some(stop)) => start < t && t < stop,
            _ => true,
        }
    }
}

/// Orbit chosen by the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrbit {
    pub orbit_type: OrbitType,
    pub url: String,
}

/// Parse catalog timestamps (`2020-01-03T17:08:15`, optional fraction or offset)
fn parse_catalog_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_utc()))
}

/// Selects and downloads the best orbit file for a granule
pub struct OrbitResolver<'a> {
    transport: &'a dyn HttpTransport,
    orbit_url: String,
    tiers: Vec<OrbitTier>,
}

impl<'a> OrbitResolver<'a> {
    pub fn new(transport: &'a dyn HttpTransport, endpoints: &EndpointConfig) -> Self {
        Self {
            transport,
            orbit_url: endpoints.orbit_url.clone(),
            tiers: DEFAULT_TIERS.to_vec(),
        }
    }

    /// Replace the fallback chain; tiers are tried in order
    pub fn with_tiers(mut self, tiers: Vec<OrbitTier>) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn tiers(&self) -> &[OrbitTier] {
        &self.tiers
    }

    /// Best candidate within one tier
    pub fn find_orbit(&self, granule: &GranuleId, tier: &OrbitTier) -> InsarResult<Option<OrbitRecord>> {
        let mut query = OrbitQuery::for_granule(granule, tier.orbit_type);
        query.ordering = tier.tie_break.ordering().to_string();
        let params = query.to_params();
        log::debug!("Orbit query for {}: {:?}", granule, params);

        let body = self.transport.get(&self.orbit_url, &params)?;
        let response: OrbitResponse = serde_json::from_reader(body)
            .map_err(|e| InsarError::MalformedResponse(format!("orbit response: {}", e)))?;

        let acquisition = granule.acquisition_time();
        let mut candidates: Vec<OrbitRecord> = response
            .results
            .into_iter()
            .filter(|record| record.covers(acquisition))
            .collect();

        match tier.tie_break {
            // Stable sort keeps server order among equal creation dates
            TieBreak::MostRecentCreation => candidates.sort_by(|a, b| b.created().cmp(&a.created())),
        }

        Ok(candidates.into_iter().next())
    }

    /// Single-tier lookup as a catalog result
    pub fn lookup(&self, granule: &GranuleId, tier: &OrbitTier) -> InsarResult<CatalogResult> {
        Ok(match self.find_orbit(granule, tier)? {
            Some(record) => CatalogResult::Found(record.remote_url),
            None => CatalogResult::NotFound,
        })
    }

    /// Walk the tiers and return the first match
    pub fn resolve_orbit_url(&self, granule: &GranuleId) -> InsarResult<ResolvedOrbit> {
        log::info!("Resolving orbit file for {}", granule);

        for (i, tier) in self.tiers.iter().enumerate() {
            match self.lookup(granule, tier)? {
                CatalogResult::Found(url) => {
                    log::info!("Selected {} orbit: {}", tier.orbit_type, url);
                    return Ok(ResolvedOrbit {
                        orbit_type: tier.orbit_type,
                        url,
                    });
                }
                CatalogResult::NotFound => {
                    if let Some(next) = self.tiers.get(i + 1) {
                        log::warn!(
                            "No {} orbit covers {}, falling back to {}",
                            tier.orbit_type,
                            granule.acquisition_timestamp(),
                            next.orbit_type
                        );
                    }
                }
            }
        }

        Err(InsarError::OrbitNotFound(granule.name().to_string()))
    }

    /// Resolve and download the orbit file
    pub fn resolve_orbit_file(&self, granule: &GranuleId, fetcher: &Fetcher<'_>) -> InsarResult<PathBuf> {
        let orbit = self.resolve_orbit_url(granule)?;
        fetcher.fetch(&orbit.url)
    }
}
