// Trait abstractions for the ingest pipeline's external collaborators.
//
// SourceResolver — platform metadata + thumbnails (social-client).
// MediaFetcher — streaming download into owned transient storage.
// ReviewModel — generative model calls (raw text out; decoding is ours).
// Geocoder — address canonicalization + optional website lookup.
// RestaurantStore — the durable document store's query/update operations.
//
// These enable deterministic testing with the mocks in `testing`:
// no network, no Firestore. `cargo test` in seconds.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use reelbites_common::{
    GeoPoint, GlobalSummary, IngestError, LinkSubmission, Recommendation, RestaurantRecord,
    SubmissionStatus,
};
use social_client::{ResolvedMedia, SocialClient};

use crate::fetcher::TransientMedia;

// ---------------------------------------------------------------------------
// SourceResolver
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Resolve a submission URL to playable media + caption/author/comments.
    async fn resolve(&self, url: &str) -> social_client::Result<ResolvedMedia>;

    /// Best-effort thumbnail for the submitted link. Never fails.
    async fn thumbnail(&self, url: &str) -> String;
}

#[async_trait]
impl SourceResolver for SocialClient {
    async fn resolve(&self, url: &str) -> social_client::Result<ResolvedMedia> {
        SocialClient::resolve(self, url).await
    }

    async fn thumbnail(&self, url: &str) -> String {
        SocialClient::thumbnail(self, url).await
    }
}

// ---------------------------------------------------------------------------
// MediaFetcher
// ---------------------------------------------------------------------------

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download the resolved media into a transient file keyed by the
    /// submission id. The returned handle owns the file; dropping it deletes
    /// the file on every exit path.
    async fn fetch(&self, media_url: &str, submission_id: Uuid)
        -> Result<TransientMedia, IngestError>;
}

// ---------------------------------------------------------------------------
// ReviewModel
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ReviewModel: Send + Sync {
    /// Single-review multimodal extraction. Returns the raw response text.
    async fn extract_review(&self, prompt: &str, mime_type: &str, media: &[u8])
        -> Result<String>;

    /// Cross-review consensus summarization. Returns the raw response text.
    async fn summarize(&self, prompt: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Geocoder
// ---------------------------------------------------------------------------

/// One geocoding candidate.
#[derive(Debug, Clone)]
pub struct GeocodeCandidate {
    pub formatted_address: String,
    pub location: GeoPoint,
    pub place_id: Option<String>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocode a free-text query. Zero candidates is a valid outcome.
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>>;

    /// Look up an official website for a place id, if one exists.
    async fn website(&self, place_id: &str) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// RestaurantStore
// ---------------------------------------------------------------------------

/// Outcome of a compare-and-swap record create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// A concurrent submission created the (user, name) record first. The
    /// caller re-matches and merges instead of duplicating.
    Lost,
}

#[async_trait]
pub trait RestaurantStore: Send + Sync {
    /// Idempotency guard query: any record of this user already containing
    /// the video URL.
    async fn find_by_video_url(
        &self,
        user_id: &str,
        url: &str,
    ) -> Result<Option<RestaurantRecord>, IngestError>;

    /// Primary entity-match key: exact (user, name).
    async fn find_by_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<RestaurantRecord>, IngestError>;

    /// Secondary entity-match key: exact (user, formatted address).
    async fn find_by_address(
        &self,
        user_id: &str,
        address: &str,
    ) -> Result<Option<RestaurantRecord>, IngestError>;

    /// Create a new record unless one with the same (user, name) key already
    /// exists. Server assigns the creation timestamp.
    async fn create_if_vacant(&self, record: &RestaurantRecord)
        -> Result<CreateOutcome, IngestError>;

    /// Atomically set-union-append the video URL and recommendation, replace
    /// the global summary, and stamp a server-assigned update time.
    async fn append_review(
        &self,
        record_id: &str,
        video_url: &str,
        recommendation: &Recommendation,
        summary: &GlobalSummary,
    ) -> Result<(), IngestError>;

    /// Record the submission's terminal status.
    async fn set_submission_status(
        &self,
        submission: &LinkSubmission,
        status: SubmissionStatus,
        message: Option<&str>,
    ) -> Result<(), IngestError>;
}

/// Deterministic document key for the (user, name) primary identity. Keying
/// creates on this hash is what turns the match-then-insert race into a
/// store-side conflict instead of a duplicate record.
pub fn record_key(user_id: &str, name: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update([0x1f]);
    hasher.update(name.as_bytes());
    hex::encode(hasher.finalize())[..20].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_key_is_deterministic_and_scoped() {
        let a = record_key("u1", "Sushi Bar");
        let b = record_key("u1", "Sushi Bar");
        let other_user = record_key("u2", "Sushi Bar");
        let other_name = record_key("u1", "Taqueria");
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
        assert_ne!(a, other_user);
        assert_ne!(a, other_name);
    }

    #[test]
    fn record_key_separator_prevents_collisions() {
        assert_ne!(record_key("ab", "c"), record_key("a", "bc"));
    }
}
