use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dialoguer::{Input, Password};
use s1_insar::core::{PairRequest, Pipeline, SystemRunner};
use s1_insar::io::credentials::{resolve_credentials, Credentials};
use s1_insar::io::ReqwestTransport;
use s1_insar::{DemChoice, InsarError, PipelineConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "s1-insar")]
#[command(version, about = "Sentinel-1 InSAR using ISCE", long_about = None)]
struct Cli {
    /// Reference granule name
    #[arg(short = 'r', long = "reference-granule", value_name = "GRANULE")]
    reference_granule: String,

    /// Secondary granule name
    #[arg(short = 's', long = "secondary-granule", value_name = "GRANULE")]
    secondary_granule: String,

    /// Earthdata Login username (prompted when omitted)
    #[arg(short = 'u', long)]
    username: Option<String>,

    /// Earthdata Login password (prompted when omitted)
    #[arg(short = 'p', long)]
    password: Option<String>,

    /// DEM used by topsApp
    #[arg(long, value_enum, default_value = "auto")]
    dem: DemArg,

    /// Staging directory for downloads, topsApp.xml and products
    #[arg(short = 'w', long = "work-dir", value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip the PNG preview
    #[arg(long)]
    no_preview: bool,

    /// Debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum DemArg {
    /// topsApp selects and downloads a DEM
    Auto,
    /// Force the 1-arcsecond SRTM DEM
    Srtm,
}

impl From<DemArg> for DemChoice {
    fn from(arg: DemArg) -> Self {
        match arg {
            DemArg::Auto => DemChoice::Auto,
            DemArg::Srtm => DemChoice::Srtm,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();
}

/// Command-line values first, then the stored `.netrc` entry, then an interactive prompt
fn obtain_credentials(netrc_path: &Path, username: Option<String>, password: Option<String>) -> Result<Credentials> {
    if let Some(credentials) = resolve_credentials(netrc_path, username.as_deref(), password.as_deref())
        .with_context(|| format!("failed to read {}", netrc_path.display()))?
    {
        return Ok(credentials);
    }

    let username = match username {
        Some(u) => u,
        None => Input::<String>::new()
            .with_prompt("Earthdata Login username")
            .interact_text()
            .context("failed to read username")?,
    };
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Earthdata Login password")
            .interact()
            .context("failed to read password")?,
    };
    Ok(Credentials::earthdata(&username, &password))
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(work_dir) = cli.work_dir {
        config.work_dir = work_dir;
    }
    if cli.no_preview {
        config.products.preview = false;
    }
    // Resolve once so nothing downstream consults the environment
    let netrc_path = config.resolve_netrc_path()?;
    config.netrc_path = Some(netrc_path.clone());
    config.validate()?;

    let credentials = obtain_credentials(&netrc_path, cli.username, cli.password)?;
    let transport = ReqwestTransport::new(&config.endpoints.user_agent, Some(credentials.clone()))?;
    let runner = SystemRunner;

    let request = PairRequest {
        reference_granule: cli.reference_granule,
        secondary_granule: cli.secondary_granule,
        dem: cli.dem.into(),
        credentials: Some(credentials),
    };

    let summary = Pipeline::new(config, &transport, &runner).run(&request)?;
    for product in &summary.products {
        println!("{}", product.display());
    }
    if let Some(preview) = &summary.preview {
        println!("{}", preview.display());
    }
    Ok(())
}

/// Process exit status for a failed run: the failing tool's status, 1 otherwise
fn failure_status(error: &anyhow::Error) -> u8 {
    let code = error.downcast_ref::<InsarError>().map_or(1, InsarError::exit_code);
    code.clamp(1, 255) as u8
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(failure_status(&e))
        }
    }
}
