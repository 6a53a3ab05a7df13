// Pipeline ingestion: fetching and caching the source artifact, then decoding it into records

pub mod fetch;
pub mod loader;
