use crate::config::PipelineConfig;
use crate::io::archive::stage_archive;
use crate::io::catalog::CatalogClient;
use crate::io::http::{Fetcher, HttpTransport};
use crate::io::orbit::OrbitResolver;
use crate::types::{CatalogResult, GranuleDescriptor, GranuleId, InsarError, InsarResult};

/// Downloads, unpacks and pairs a granule with its orbit file.
///
/// All artifacts land in the configured staging directory. Two acquisitions
/// sharing one staging directory must run one after the other.
pub struct GranuleAcquirer<'a> {
    catalog: CatalogClient<'a>,
    orbits: OrbitResolver<'a>,
    fetcher: Fetcher<'a>,
}

impl<'a> GranuleAcquirer<'a> {
    pub fn new(transport: &'a dyn HttpTransport, config: &PipelineConfig) -> Self {
        Self {
            catalog: CatalogClient::new(transport, &config.endpoints),
            orbits: OrbitResolver::new(transport, &config.endpoints),
            fetcher: Fetcher::new(transport, &config.work_dir, config.endpoints.chunk_size),
        }
    }

    /// Swap the orbit resolver, e.g. to change the tier chain
    pub fn with_orbit_resolver(mut self, orbits: OrbitResolver<'a>) -> Self {
        self.orbits = orbits;
        self
    }

    /// Catalog lookup → download → extract → orbit download.
    ///
    /// Any failure aborts the granule; no descriptor is produced.
    pub fn acquire_granule(&self, name: &str) -> InsarResult<GranuleDescriptor> {
        let granule = GranuleId::parse(name)?;

        let url = match self.catalog.resolve_download_url(granule.name())? {
            CatalogResult::Found(url) => url,
            CatalogResult::NotFound => return Err(InsarError::GranuleNotFound(granule.name().to_string())),
        };

        let archive = self.fetcher.fetch(&url)?;
        let root = stage_archive(&archive)?;

        let orbit_file = self.orbits.resolve_orbit_file(&granule, &self.fetcher)?;

        let descriptor = GranuleDescriptor {
            working_directory: root.join(granule.safe_dir_name()),
            orbit_file,
            acquisition_date: granule.acquisition_date().to_string(),
        };
        log::info!(
            "Granule {} staged at {} (orbit {})",
            granule,
            descriptor.working_directory.display(),
            descriptor.orbit_file.display()
        );

        Ok(descriptor)
    }
}
