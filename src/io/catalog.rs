//! CMR granule search client

use crate::config::{EndpointConfig, COLLECTION_IDS};
use crate::io::http::HttpTransport;
use crate::types::{CatalogResult, InsarError, InsarResult};
use serde::Deserialize;

/// `granules.json` response: `{feed: {entry: [{links: [{rel, href}]}]}}`
#[derive(Debug, Deserialize)]
struct CmrResponse {
    feed: CmrFeed,
}

#[derive(Debug, Deserialize)]
struct CmrFeed {
    #[serde(default)]
    entry: Vec<CmrEntry>,
}

#[derive(Debug, Deserialize)]
struct CmrEntry {
    #[serde(default)]
    links: Vec<CmrLink>,
}

#[derive(Debug, Deserialize)]
struct CmrLink {
    #[serde(default)]
    rel: String,
    #[serde(default)]
    href: String,
}

/// Resolves granule names to direct download URLs
pub struct CatalogClient<'a> {
    transport: &'a dyn HttpTransport,
    cmr_url: String,
}

impl<'a> CatalogClient<'a> {
    pub fn new(transport: &'a dyn HttpTransport, endpoints: &EndpointConfig) -> Self {
        Self {
            transport,
            cmr_url: endpoints.cmr_url.clone(),
        }
    }

    /// Query parameters for a granule lookup
    pub fn query_params(granule: &str) -> Vec<(String, String)> {
        let mut params = vec![
            ("readable_granule_name".to_string(), granule.to_string()),
            ("provider".to_string(), "ASF".to_string()),
        ];
        params.extend(
            COLLECTION_IDS
                .iter()
                .map(|id| ("collection_concept_id".to_string(), id.to_string())),
        );
        params
    }

    /// First `data` link of the first matching granule, or `NotFound`
    pub fn resolve_download_url(&self, granule: &str) -> InsarResult<CatalogResult> {
        log::info!("Fetching granule information for {}", granule);

        let body = self.transport.get(&self.cmr_url, &Self::query_params(granule))?;
        let response: CmrResponse = serde_json::from_reader(body)
            .map_err(|e| InsarError::MalformedResponse(format!("CMR response: {}", e)))?;

        let entry = match response.feed.entry.first() {
            Some(entry) => entry,
            None => {
                log::warn!("No catalog entry for {}", granule);
                return Ok(CatalogResult::NotFound);
            }
        };

        match entry.links.iter().find(|link| link.rel.contains("data")) {
            Some(link) => {
                log::debug!("Resolved {} -> {}", granule, link.href);
                Ok(CatalogResult::Found(link.href.clone()))
            }
            None => {
                log::warn!("Catalog entry for {} has no data link", granule);
                Ok(CatalogResult::NotFound)
            }
        }
    }
}
