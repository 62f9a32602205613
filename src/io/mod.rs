//! I/O modules for catalog lookups, downloads, archives and credentials

pub mod archive;
pub mod catalog;
pub mod credentials;
pub mod http;
pub mod orbit;

pub use archive::stage_archive;
pub use catalog::CatalogClient;
pub use credentials::{resolve_credentials, write_netrc, Credentials};
pub use http::{Fetcher, HttpTransport, ReqwestTransport};
pub use orbit::{OrbitResolver, OrbitTier, ResolvedOrbit, TieBreak, DEFAULT_TIERS};
