use crate::config::PipelineConfig;
use crate::core::acquisition::GranuleAcquirer;
use crate::core::processor::{CommandRunner, TopsAppProcessor};
use crate::core::products::OutputConverter;
use crate::core::topsapp::TopsAppRenderer;
use crate::io::credentials::{write_netrc, Credentials};
use crate::io::http::HttpTransport;
use crate::types::{DemChoice, GranuleDescriptor, InsarResult};
use std::path::PathBuf;

/// One interferogram request
#[derive(Debug, Clone)]
pub struct PairRequest {
    pub reference_granule: String,
    pub secondary_granule: String,
    pub dem: DemChoice,
    /// Written to the configured credential file before any download
    pub credentials: Option<Credentials>,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reference: GranuleDescriptor,
    pub secondary: GranuleDescriptor,
    pub configuration: PathBuf,
    pub products: Vec<PathBuf>,
    pub preview: Option<PathBuf>,
}

/// Full acquisition → topsApp → GeoTIFF run, strictly sequential
pub struct Pipeline<'a> {
    config: PipelineConfig,
    transport: &'a dyn HttpTransport,
    runner: &'a dyn CommandRunner,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: PipelineConfig, transport: &'a dyn HttpTransport, runner: &'a dyn CommandRunner) -> Self {
        Self {
            config,
            transport,
            runner,
        }
    }

    /// Run the whole workflow. The first failure ends the run; nothing after
    /// it is attempted.
    pub fn run(&self, request: &PairRequest) -> InsarResult<RunSummary> {
        if let Some(credentials) = &request.credentials {
            let netrc = self.config.resolve_netrc_path()?;
            write_netrc(&netrc, credentials)?;
        }

        std::fs::create_dir_all(&self.config.work_dir)?;
        let acquirer = GranuleAcquirer::new(self.transport, &self.config);

        log::info!("Acquiring reference granule {}", request.reference_granule);
        let reference = acquirer.acquire_granule(&request.reference_granule)?;

        log::info!("Acquiring secondary granule {}", request.secondary_granule);
        let secondary = acquirer.acquire_granule(&request.secondary_granule)?;

        let renderer = TopsAppRenderer::new(&self.config.processor, &self.config.work_dir);
        let configuration = renderer.render_configuration(&reference, &secondary, request.dem)?;

        TopsAppProcessor::new(self.runner, &self.config.processor, &self.config.work_dir).run(&configuration)?;

        let converter = OutputConverter::new(self.runner, &self.config.products, &self.config.work_dir);
        let products = converter.convert_products(&reference.acquisition_date, &secondary.acquisition_date)?;

        let preview = if self.config.products.preview {
            Some(converter.render_preview(&reference.acquisition_date, &secondary.acquisition_date)?)
        } else {
            None
        };

        log::info!("Done: {} products written to {}", products.len(), self.config.work_dir.display());
        Ok(RunSummary {
            reference,
            secondary,
            configuration,
            products,
            preview,
        })
    }
}
