//! Test doubles for the HTTP and subprocess seams.
//!
//! Lets the acquisition and processing pipeline run end to end against canned
//! catalog responses and scripted tool exit codes, without network access or
//! ISCE/GDAL installed.
//!
//! ```rust,ignore
//! use s1_insar::testing::{MockRunner, MockTransport};
//!
//! let transport = MockTransport::new();
//! transport.respond_json(s1_insar::config::CMR_URL, r#"{"feed": {"entry": []}}"#);
//!
//! let runner = MockRunner::new();
//! runner.fail_on("topsApp.py", 1);
//! ```

mod mock_runner;
mod mock_transport;

pub use mock_runner::{MockRunner, RecordedCommand};
pub use mock_transport::{MockTransport, RecordedRequest};
