//! Pipeline stages built on the I/O layer

pub mod acquisition;
pub mod pipeline;
pub mod processor;
pub mod products;
pub mod topsapp;

// Re-export main types
pub use acquisition::GranuleAcquirer;
pub use pipeline::{PairRequest, Pipeline, RunSummary};
pub use processor::{CommandRunner, SystemRunner, TopsAppProcessor};
pub use products::{product_name, OutputConverter, ProductKind};
pub use topsapp::TopsAppRenderer;
