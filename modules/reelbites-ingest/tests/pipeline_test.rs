//! End-to-end pipeline runs against the in-memory fakes: no network, no
//! Firestore, no model. Each test drives one submission through `run` and
//! asserts on the store contents and the recorded terminal status.

use std::sync::Arc;
use std::time::Duration;

use reelbites_common::{defaults, LinkSubmission, Platform, PriceLevel, SubmissionStatus};
use reelbites_ingest::testing::{
    sample_media, sample_record, MemoryStore, MockFetcher, MockGeocoder, MockModel, MockResolver,
};
use reelbites_ingest::IngestPipeline;

const TIKTOK_URL: &str = "https://www.tiktok.com/@foodie/video/7300000000000000001";

const EXTRACTION: &str = r#"{
  "name": "Sushi Bar",
  "address": "1 Main St",
  "cuisine": "Japanese",
  "top_highlights": ["Fresh fish", "Omakase", "Cozy", "Fast service", "Late hours"],
  "full_description": "A tiny omakase counter with remarkable nigiri and a warm room.",
  "community_sentiment": "Locals love it",
  "sentiment_score": "positive",
  "must_order_dishes": ["Omakase set"],
  "price_level": 2,
  "recommendation_tags": ["date night"],
  "website": ""
}"#;

const SUMMARY: &str = r#"{
  "price_level": 2,
  "unified_description": "Beloved omakase counter with fair prices.",
  "decision_chips": ["Fresh Fish", "Date Night", "Fair Prices", "Cozy Room"]
}"#;

struct Harness {
    resolver: Arc<MockResolver>,
    fetcher: Arc<MockFetcher>,
    model: Arc<MockModel>,
    geocoder: Arc<MockGeocoder>,
    store: Arc<MemoryStore>,
    deadline_secs: u64,
}

impl Harness {
    fn pipeline(&self) -> IngestPipeline {
        IngestPipeline::new(
            self.resolver.clone(),
            self.fetcher.clone(),
            self.model.clone(),
            self.geocoder.clone(),
            self.store.clone(),
            self.deadline_secs,
        )
    }
}

fn harness(model: MockModel, geocoder: MockGeocoder, store: MemoryStore) -> Harness {
    Harness {
        resolver: Arc::new(
            MockResolver::new().with_media(TIKTOK_URL, sample_media(Platform::TikTok)),
        ),
        fetcher: Arc::new(MockFetcher::new(b"fake video bytes")),
        model: Arc::new(model),
        geocoder: Arc::new(geocoder),
        store: Arc::new(store),
        deadline_secs: 540,
    }
}

fn located_geocoder() -> MockGeocoder {
    MockGeocoder::empty()
        .with_candidate("1 Main Street, Springfield, USA", 39.79, -89.64, Some("place-1"))
        .with_website("https://sushibar.example")
}

#[tokio::test]
async fn new_link_creates_a_record() {
    let h = harness(
        MockModel::new().with_extraction(EXTRACTION),
        located_geocoder(),
        MemoryStore::new(),
    );
    let submission = LinkSubmission::new(TIKTOK_URL, Some("u1".to_string()));

    let status = h.pipeline().run(&submission).await;

    assert_eq!(status, SubmissionStatus::Completed);
    let records = h.store.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.name, "Sushi Bar");
    assert_eq!(record.address, "1 Main Street, Springfield, USA");
    assert_eq!(record.website, "https://sushibar.example");
    assert_eq!(record.video_urls, vec![TIKTOK_URL]);
    assert_eq!(record.recommendations.len(), 1);
    assert_eq!(record.recommendations[0].reviewer_name, "Chef Dana");
    assert_eq!(record.recommendations[0].video_url, TIKTOK_URL);
    assert!(record.created_at.is_some());

    // Single review: summary is derived locally, no second model call.
    assert_eq!(h.model.summarize_calls(), 0);
    assert_eq!(record.global_summary.price_level, PriceLevel::Normal);
    assert_eq!(record.global_summary.decision_chips.len(), 3);

    let (status, message) = h.store.submission_status(submission.id).unwrap();
    assert_eq!(status, SubmissionStatus::Completed);
    assert_eq!(message, None);

    // The downloaded media never outlives the run.
    let path = h.fetcher.last_path().unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn already_ingested_link_is_skipped_before_any_network_work() {
    let seed = sample_record("u1", "Sushi Bar", "1 Main St");
    let url = seed.video_urls[0].clone();
    let h = harness(MockModel::new(), MockGeocoder::empty(), MemoryStore::new().with_record(seed));
    let submission = LinkSubmission::new(url, Some("u1".to_string()));

    let status = h.pipeline().run(&submission).await;

    assert_eq!(status, SubmissionStatus::Completed);
    assert_eq!(h.resolver.resolve_calls(), 0, "guard must run before resolution");
    assert_eq!(h.store.records().len(), 1);
    assert_eq!(h.store.records()[0].recommendations.len(), 1);

    let (_, message) = h.store.submission_status(submission.id).unwrap();
    assert_eq!(message.as_deref(), Some("Link already exists"));
}

#[tokio::test]
async fn name_match_merges_and_recomputes_the_summary() {
    let h = harness(
        MockModel::new().with_extraction(EXTRACTION).with_summary(SUMMARY),
        located_geocoder(),
        MemoryStore::new().with_record(sample_record("u1", "Sushi Bar", "9 Old Rd")),
    );
    let submission = LinkSubmission::new(TIKTOK_URL, Some("u1".to_string()));

    let status = h.pipeline().run(&submission).await;

    assert_eq!(status, SubmissionStatus::Completed);
    let records = h.store.records();
    assert_eq!(records.len(), 1, "no duplicate record for a matched name");
    let record = &records[0];
    assert_eq!(record.recommendations.len(), 2);
    assert_eq!(record.video_urls.len(), 2);
    assert!(record.video_urls.iter().any(|u| u == TIKTOK_URL));

    // Merge path recomputes consensus over the full list, exactly once.
    assert_eq!(h.model.summarize_calls(), 1);
    assert_eq!(
        record.global_summary.unified_description,
        "Beloved omakase counter with fair prices."
    );
    assert_eq!(record.global_summary.decision_chips.len(), 4);
}

#[tokio::test]
async fn different_user_never_merges() {
    let h = harness(
        MockModel::new().with_extraction(EXTRACTION),
        located_geocoder(),
        MemoryStore::new().with_record(sample_record("u2", "Sushi Bar", "1 Main St")),
    );
    let submission = LinkSubmission::new(TIKTOK_URL, Some("u1".to_string()));

    let status = h.pipeline().run(&submission).await;

    assert_eq!(status, SubmissionStatus::Completed);
    assert_eq!(h.store.records().len(), 2);
    assert_eq!(h.model.summarize_calls(), 0);
}

#[tokio::test]
async fn failed_download_writes_error_status_and_nothing_else() {
    let mut h = harness(
        MockModel::new().with_extraction(EXTRACTION),
        located_geocoder(),
        MemoryStore::new(),
    );
    h.fetcher = Arc::new(MockFetcher::failing());
    let submission = LinkSubmission::new(TIKTOK_URL, Some("u1".to_string()));

    let status = h.pipeline().run(&submission).await;

    assert_eq!(status, SubmissionStatus::Error);
    assert!(h.store.records().is_empty());
    assert_eq!(h.model.extract_calls(), 0);

    let (status, message) = h.store.submission_status(submission.id).unwrap();
    assert_eq!(status, SubmissionStatus::Error);
    assert!(message.unwrap().contains("media fetch failed"));

    // The half-created transient file is gone.
    let path = h.fetcher.last_path().unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn unparseable_model_output_fails_the_run() {
    let h = harness(
        MockModel::new().with_extraction("I could not identify a restaurant in this video."),
        located_geocoder(),
        MemoryStore::new(),
    );
    let submission = LinkSubmission::new(TIKTOK_URL, Some("u1".to_string()));

    let status = h.pipeline().run(&submission).await;

    assert_eq!(status, SubmissionStatus::Error);
    assert!(h.store.records().is_empty());
}

#[tokio::test]
async fn zero_geocode_candidates_keep_the_extracted_address() {
    let h = harness(
        MockModel::new().with_extraction(EXTRACTION),
        MockGeocoder::empty(),
        MemoryStore::new(),
    );
    let submission = LinkSubmission::new(TIKTOK_URL, Some("u1".to_string()));

    let status = h.pipeline().run(&submission).await;

    assert_eq!(status, SubmissionStatus::Completed);
    let record = &h.store.records()[0];
    assert_eq!(record.address, "1 Main St", "extracted address kept verbatim");
    assert_eq!(record.location, defaults::FALLBACK_COORD);
    assert_eq!(h.geocoder.queries(), vec!["Sushi Bar 1 Main St"]);
}

#[tokio::test]
async fn lost_create_race_falls_back_to_merge() {
    let competing = sample_record("u1", "Sushi Bar", "1 Main Street, Springfield, USA");
    let h = harness(
        MockModel::new().with_extraction(EXTRACTION).with_summary(SUMMARY),
        located_geocoder(),
        MemoryStore::new().with_create_race(competing),
    );
    let submission = LinkSubmission::new(TIKTOK_URL, Some("u1".to_string()));

    let status = h.pipeline().run(&submission).await;

    assert_eq!(status, SubmissionStatus::Completed);
    let records = h.store.records();
    assert_eq!(records.len(), 1, "losing the create must not duplicate");
    assert_eq!(records[0].recommendations.len(), 2);
    assert_eq!(h.model.summarize_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn deadline_overrun_reports_an_error_status() {
    let mut h = harness(
        MockModel::new()
            .with_extraction(EXTRACTION)
            .with_delay(Duration::from_secs(600)),
        located_geocoder(),
        MemoryStore::new(),
    );
    h.deadline_secs = 540;
    let submission = LinkSubmission::new(TIKTOK_URL, Some("u1".to_string()));

    let status = h.pipeline().run(&submission).await;

    assert_eq!(status, SubmissionStatus::Error);
    assert!(h.store.records().is_empty());

    let (_, message) = h.store.submission_status(submission.id).unwrap();
    assert!(message.unwrap().contains("deadline exceeded after 540s"));

    let path = h.fetcher.last_path().unwrap();
    assert!(!path.exists(), "deadline abort still cleans up the media file");
}

#[tokio::test]
async fn outcome_reports_created_then_duplicate() {
    let h = harness(
        MockModel::new().with_extraction(EXTRACTION),
        located_geocoder(),
        MemoryStore::new(),
    );
    let first = LinkSubmission::new(TIKTOK_URL, Some("u1".to_string()));
    let second = LinkSubmission::new(TIKTOK_URL, Some("u1".to_string()));

    assert_eq!(h.pipeline().run(&first).await, SubmissionStatus::Completed);
    assert_eq!(h.pipeline().run(&second).await, SubmissionStatus::Completed);

    let (_, first_msg) = h.store.submission_status(first.id).unwrap();
    let (_, second_msg) = h.store.submission_status(second.id).unwrap();
    assert_eq!(first_msg, None);
    assert_eq!(second_msg.as_deref(), Some("Link already exists"));
    assert_eq!(h.store.records().len(), 1);
}
