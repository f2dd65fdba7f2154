use thiserror::Error;

/// Fatal pipeline failures. Every variant routes to the status reporter,
/// which records the message and moves the submission to `error`.
///
/// Transient degradations (missing comments, empty geocode results, absent
/// websites, thumbnail failures) are not errors: they log a warning and apply
/// the documented default from [`crate::defaults`].
#[derive(Error, Debug)]
pub enum IngestError {
    /// No playable media URL could be resolved, or the download itself failed.
    #[error("media fetch failed: {0}")]
    FatalFetch(String),

    /// The model response contained no parseable JSON object.
    #[error("no parseable JSON in model output: {0}")]
    ExtractionParse(String),

    /// A required extraction field was missing or malformed and no documented
    /// default applies.
    #[error("extraction schema violation: {0}")]
    Schema(String),

    /// Durable store write failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The invocation exceeded its hard wall-clock deadline.
    #[error("deadline exceeded after {0}s")]
    DeadlineExceeded(u64),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
