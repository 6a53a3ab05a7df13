// Data processing pipeline: ingestion, processing, and orchestration

pub mod ingestion;
pub mod pipeline;
pub mod processing;

pub use pipeline::{Pipeline, PipelineResult};
