//! In-memory fakes for the pipeline's collaborator traits.
//!
//! Deterministic, network-free stand-ins used by unit tests and the
//! integration suite. Each mock records enough about its calls (counters,
//! query logs, last paths) for tests to assert on behavior, not just output.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use reelbites_common::{
    GeoPoint, GlobalSummary, IngestError, LinkSubmission, Platform, PriceLevel, Recommendation,
    RestaurantRecord, SubmissionStatus,
};
use social_client::{ResolvedMedia, SocialError};

use crate::fetcher::TransientMedia;
use crate::traits::{
    CreateOutcome, GeocodeCandidate, Geocoder, MediaFetcher, RestaurantStore, ReviewModel,
    SourceResolver,
};

// ---------------------------------------------------------------------------
// SourceResolver
// ---------------------------------------------------------------------------

/// Resolves only the URLs it was seeded with; anything else is unplayable.
#[derive(Default)]
pub struct MockResolver {
    media: HashMap<String, ResolvedMedia>,
    resolve_calls: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_media(mut self, url: &str, media: ResolvedMedia) -> Self {
        self.media.insert(url.to_string(), media);
        self
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceResolver for MockResolver {
    async fn resolve(&self, url: &str) -> social_client::Result<ResolvedMedia> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.media
            .get(url)
            .cloned()
            .ok_or_else(|| SocialError::NoPlayableMedia(url.to_string()))
    }

    async fn thumbnail(&self, _url: &str) -> String {
        "https://thumbs.example/t.jpg".to_string()
    }
}

// ---------------------------------------------------------------------------
// MediaFetcher
// ---------------------------------------------------------------------------

/// Writes canned bytes into a real transient file, or fails after creating
/// one, so cleanup-on-drop is observable either way.
pub struct MockFetcher {
    bytes: Vec<u8>,
    fail: bool,
    last_path: Mutex<Option<PathBuf>>,
}

impl MockFetcher {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            fail: false,
            last_path: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            bytes: Vec::new(),
            fail: true,
            last_path: Mutex::new(None),
        }
    }

    /// Path of the most recently created transient file.
    pub fn last_path(&self) -> Option<PathBuf> {
        self.last_path.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn fetch(
        &self,
        _media_url: &str,
        submission_id: Uuid,
    ) -> Result<TransientMedia, IngestError> {
        let mut media = TransientMedia::create(submission_id)?;
        *self.last_path.lock().unwrap() = Some(media.path_buf());
        if self.fail {
            // media drops here, deleting the file like the real fetcher.
            return Err(IngestError::FatalFetch(
                "media download failed with status 403".to_string(),
            ));
        }
        media.write_chunk(&self.bytes)?;
        Ok(media)
    }
}

// ---------------------------------------------------------------------------
// ReviewModel
// ---------------------------------------------------------------------------

/// Canned model responses with call counters and an optional artificial
/// delay for exercising the pipeline deadline.
#[derive(Default)]
pub struct MockModel {
    extract_response: Option<String>,
    summarize_response: Option<String>,
    delay: Option<Duration>,
    extract_calls: AtomicUsize,
    summarize_calls: AtomicUsize,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extraction(mut self, response: &str) -> Self {
        self.extract_response = Some(response.to_string());
        self
    }

    pub fn with_summary(mut self, response: &str) -> Self {
        self.summarize_response = Some(response.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    pub fn summarize_calls(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReviewModel for MockModel {
    async fn extract_review(&self, _prompt: &str, _mime_type: &str, _media: &[u8]) -> Result<String> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.extract_response
            .clone()
            .ok_or_else(|| anyhow!("no extraction response configured"))
    }

    async fn summarize(&self, _prompt: &str) -> Result<String> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        self.summarize_response
            .clone()
            .ok_or_else(|| anyhow!("no summary response configured"))
    }
}

// ---------------------------------------------------------------------------
// Geocoder
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockGeocoder {
    candidates: Vec<GeocodeCandidate>,
    website: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl MockGeocoder {
    /// A geocoder that finds nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_candidate(mut self, address: &str, lat: f64, lng: f64, place_id: Option<&str>) -> Self {
        self.candidates.push(GeocodeCandidate {
            formatted_address: address.to_string(),
            location: GeoPoint { lat, lng },
            place_id: place_id.map(|p| p.to_string()),
        });
        self
    }

    pub fn with_website(mut self, website: &str) -> Self {
        self.website = Some(website.to_string());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.candidates.clone())
    }

    async fn website(&self, _place_id: &str) -> Result<Option<String>> {
        Ok(self.website.clone())
    }
}

// ---------------------------------------------------------------------------
// RestaurantStore
// ---------------------------------------------------------------------------

struct StoreInner {
    records: Vec<RestaurantRecord>,
    submissions: HashMap<Uuid, (SubmissionStatus, Option<String>)>,
    query_log: Vec<String>,
    create_race: Option<RestaurantRecord>,
}

/// Mutex-over-Vec store with a query log and an injectable create race.
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                records: Vec::new(),
                submissions: HashMap::new(),
                query_log: Vec::new(),
                create_race: None,
            }),
        }
    }

    pub fn with_record(self, record: RestaurantRecord) -> Self {
        self.inner.lock().unwrap().records.push(record);
        self
    }

    /// Make the first `create_if_vacant` lose: the competing record appears
    /// in the store and the create reports [`CreateOutcome::Lost`].
    pub fn with_create_race(self, competing: RestaurantRecord) -> Self {
        self.inner.lock().unwrap().create_race = Some(competing);
        self
    }

    pub fn records(&self) -> Vec<RestaurantRecord> {
        self.inner.lock().unwrap().records.clone()
    }

    pub fn query_log(&self) -> Vec<String> {
        self.inner.lock().unwrap().query_log.clone()
    }

    pub fn submission_status(&self, id: Uuid) -> Option<(SubmissionStatus, Option<String>)> {
        self.inner.lock().unwrap().submissions.get(&id).cloned()
    }

    fn find(
        &self,
        log: &str,
        pred: impl Fn(&RestaurantRecord) -> bool,
    ) -> Option<RestaurantRecord> {
        let mut inner = self.inner.lock().unwrap();
        inner.query_log.push(log.to_string());
        inner.records.iter().find(|r| pred(r)).cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RestaurantStore for MemoryStore {
    async fn find_by_video_url(
        &self,
        user_id: &str,
        url: &str,
    ) -> Result<Option<RestaurantRecord>, IngestError> {
        Ok(self.find("find_by_video_url", |r| {
            r.user_id == user_id && r.video_urls.iter().any(|u| u == url)
        }))
    }

    async fn find_by_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<RestaurantRecord>, IngestError> {
        Ok(self.find("find_by_name", |r| r.user_id == user_id && r.name == name))
    }

    async fn find_by_address(
        &self,
        user_id: &str,
        address: &str,
    ) -> Result<Option<RestaurantRecord>, IngestError> {
        Ok(self.find("find_by_address", |r| {
            r.user_id == user_id && r.address == address
        }))
    }

    async fn create_if_vacant(
        &self,
        record: &RestaurantRecord,
    ) -> Result<CreateOutcome, IngestError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(competing) = inner.create_race.take() {
            inner.records.push(competing);
            return Ok(CreateOutcome::Lost);
        }
        if inner.records.iter().any(|r| r.id == record.id) {
            return Ok(CreateOutcome::Lost);
        }
        let mut stored = record.clone();
        let now = chrono::Utc::now();
        stored.created_at = Some(now);
        stored.updated_at = Some(now);
        inner.records.push(stored);
        Ok(CreateOutcome::Created)
    }

    async fn append_review(
        &self,
        record_id: &str,
        video_url: &str,
        recommendation: &Recommendation,
        summary: &GlobalSummary,
    ) -> Result<(), IngestError> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| IngestError::Persistence(format!("no record {record_id}")))?;
        if !record.video_urls.iter().any(|u| u == video_url) {
            record.video_urls.push(video_url.to_string());
        }
        record.recommendations.push(recommendation.clone());
        record.global_summary = summary.clone();
        record.updated_at = Some(chrono::Utc::now());
        Ok(())
    }

    async fn set_submission_status(
        &self,
        submission: &LinkSubmission,
        status: SubmissionStatus,
        message: Option<&str>,
    ) -> Result<(), IngestError> {
        self.inner
            .lock()
            .unwrap()
            .submissions
            .insert(submission.id, (status, message.map(|m| m.to_string())));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A persisted record as it would exist after one successful ingest.
pub fn sample_record(user_id: &str, name: &str, address: &str) -> RestaurantRecord {
    let video_url = format!("https://www.tiktok.com/@seed/video/{}", name.len());
    RestaurantRecord {
        id: crate::traits::record_key(user_id, name),
        user_id: user_id.to_string(),
        name: name.to_string(),
        address: address.to_string(),
        location: GeoPoint { lat: 32.07, lng: 34.78 },
        website: String::new(),
        cuisine: "Japanese".to_string(),
        thumbnail_url: "https://thumbs.example/seed.jpg".to_string(),
        video_urls: vec![video_url.clone()],
        recommendations: vec![Recommendation {
            video_url,
            source: Platform::TikTok,
            reviewer_name: "Seed Creator".to_string(),
            thumbnail_url: "https://thumbs.example/seed.jpg".to_string(),
            highlights: vec!["Fresh fish".to_string()],
            description: "Seed review.".to_string(),
            community_sentiment: "Positive".to_string(),
            sentiment_score: Default::default(),
            price_level: PriceLevel::Normal,
            added_at: chrono::Utc::now(),
        }],
        global_summary: GlobalSummary {
            price_level: PriceLevel::Normal,
            unified_description: "Seed summary.".to_string(),
            decision_chips: vec!["Fresh Fish".to_string()],
        },
        must_order_dishes: vec![],
        recommendation_tags: vec![],
        user_rating: 0.0,
        user_notes: String::new(),
        created_at: Some(chrono::Utc::now()),
        updated_at: Some(chrono::Utc::now()),
    }
}

/// A [`ResolvedMedia`] the mock resolver can hand out.
pub fn sample_media(platform: Platform) -> ResolvedMedia {
    ResolvedMedia {
        platform,
        direct_media_url: "https://cdn.example/v.mp4".to_string(),
        caption: Some("Best omakase in town".to_string()),
        author: Some("Chef Dana".to_string()),
        comments: vec!["so good".to_string(), "pricey but worth it".to_string()],
    }
}
