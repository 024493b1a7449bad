pub mod pipeline;
pub mod utils;

pub use pipeline::{IngestResult, IngestionConfig, IngestionPipeline};
