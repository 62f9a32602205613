//! s1-insar: Sentinel-1 InSAR pair acquisition and processing driver
//!
//! Resolves two Sentinel-1 SLC granules through NASA CMR, downloads and
//! unpacks them with their precise (or restituted) orbit files, renders an
//! ISCE `topsApp.xml`, runs `topsApp.py` through geocoding and packages the
//! results as tiled, DEFLATE-compressed GeoTIFFs with GDAL.

pub mod config;
pub mod core;
pub mod io;
pub mod testing;
pub mod types;

// Re-export main types and functions for easier access
pub use config::PipelineConfig;
pub use types::{
    CatalogResult, DemChoice, GranuleDescriptor, GranuleId, InsarError, InsarResult, OrbitQuery, OrbitType,
};

pub use crate::core::{GranuleAcquirer, OutputConverter, PairRequest, Pipeline, TopsAppRenderer};
pub use io::{CatalogClient, Fetcher, OrbitResolver};
