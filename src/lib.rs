pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod types;

pub use config::Config;
pub use error::{ReportError, Result};
pub use pipeline::{Pipeline, PipelineResult};
