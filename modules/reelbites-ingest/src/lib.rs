pub mod builder;
pub mod extract;
pub mod fetcher;
pub mod firestore;
pub mod geocode;
pub mod matcher;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use pipeline::{IngestPipeline, PipelineOutcome};
