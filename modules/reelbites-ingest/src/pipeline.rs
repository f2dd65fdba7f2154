//! End-to-end ingest orchestration.
//!
//! One submission in, one terminal status out. Stages run strictly in order:
//! duplicate guard, platform resolution, media download, multimodal
//! extraction, location resolution, thumbnail, then entity match with either
//! a merge-append or a guarded create. The whole run races a wall-clock
//! deadline; the transient media file is dropped on every exit path.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use reelbites_common::{IngestError, LinkSubmission, Recommendation, RestaurantRecord, SubmissionStatus};

use crate::builder::{build_record, build_recommendation};
use crate::extract::ReviewExtractor;
use crate::geocode::resolve_location;
use crate::matcher::find_existing;
use crate::merge::consensus_summary;
use crate::traits::{
    CreateOutcome, Geocoder, MediaFetcher, RestaurantStore, ReviewModel, SourceResolver,
};

const DUPLICATE_MESSAGE: &str = "Link already exists";

/// What one pipeline run did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// A new restaurant record was created.
    Created { record_id: String },
    /// The review was appended to an existing record.
    Merged { record_id: String },
    /// The (user, URL) pair was already ingested; nothing was written.
    Duplicate,
}

pub struct IngestPipeline {
    resolver: Arc<dyn SourceResolver>,
    fetcher: Arc<dyn MediaFetcher>,
    model: Arc<dyn ReviewModel>,
    geocoder: Arc<dyn Geocoder>,
    store: Arc<dyn RestaurantStore>,
    deadline_secs: u64,
}

impl IngestPipeline {
    pub fn new(
        resolver: Arc<dyn SourceResolver>,
        fetcher: Arc<dyn MediaFetcher>,
        model: Arc<dyn ReviewModel>,
        geocoder: Arc<dyn Geocoder>,
        store: Arc<dyn RestaurantStore>,
        deadline_secs: u64,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            model,
            geocoder,
            store,
            deadline_secs,
        }
    }

    /// Run the pipeline under the deadline and record the terminal status.
    /// Always returns the status that was (or should have been) written.
    pub async fn run(&self, submission: &LinkSubmission) -> SubmissionStatus {
        info!(
            submission_id = %submission.id,
            url = submission.url.as_str(),
            user_id = submission.user_id.as_str(),
            "Ingest started"
        );

        let deadline = Duration::from_secs(self.deadline_secs);
        let result = match tokio::time::timeout(deadline, self.process(submission)).await {
            Ok(result) => result,
            Err(_) => Err(IngestError::DeadlineExceeded(self.deadline_secs)),
        };

        let (status, message) = match &result {
            Ok(PipelineOutcome::Created { record_id }) => {
                info!(record_id = record_id.as_str(), "Ingest complete, new record");
                (SubmissionStatus::Completed, None)
            }
            Ok(PipelineOutcome::Merged { record_id }) => {
                info!(record_id = record_id.as_str(), "Ingest complete, merged into existing record");
                (SubmissionStatus::Completed, None)
            }
            Ok(PipelineOutcome::Duplicate) => {
                info!("Ingest skipped, link already ingested");
                (SubmissionStatus::Completed, Some(DUPLICATE_MESSAGE.to_string()))
            }
            Err(e) => {
                warn!(error = %e, "Ingest failed");
                (SubmissionStatus::Error, Some(e.to_string()))
            }
        };

        if let Err(e) = self
            .store
            .set_submission_status(submission, status, message.as_deref())
            .await
        {
            warn!(error = %e, "Failed to record submission status");
        }

        status
    }

    async fn process(&self, submission: &LinkSubmission) -> Result<PipelineOutcome, IngestError> {
        let user_id = submission.user_id.as_str();
        let url = submission.url.as_str();

        if let Some(existing) = self.store.find_by_video_url(user_id, url).await? {
            info!(
                record_id = existing.id.as_str(),
                "URL already present on a record, skipping"
            );
            return Ok(PipelineOutcome::Duplicate);
        }

        let media = self
            .resolver
            .resolve(url)
            .await
            .map_err(|e| IngestError::FatalFetch(e.to_string()))?;
        info!(platform = %media.platform, comments = media.comments.len(), "Media resolved");

        let extraction = {
            let transient = self
                .fetcher
                .fetch(&media.direct_media_url, submission.id)
                .await?;
            let video_bytes = transient.read()?;
            ReviewExtractor::new(self.model.clone())
                .extract(&media, &video_bytes)
                .await?
            // transient drops here, removing the downloaded file.
        };

        let location = resolve_location(
            self.geocoder.as_ref(),
            &extraction.name,
            &extraction.address,
            &extraction.website,
        )
        .await;

        let thumbnail = self.resolver.thumbnail(url).await;
        let recommendation = build_recommendation(url, &media, &extraction, thumbnail);

        if let Some(existing) = find_existing(
            self.store.as_ref(),
            user_id,
            &extraction.name,
            &location.address,
        )
        .await?
        {
            return self.merge_into(existing, recommendation).await;
        }

        let record = build_record(user_id, &extraction, &location, recommendation.clone());
        match self.store.create_if_vacant(&record).await? {
            CreateOutcome::Created => Ok(PipelineOutcome::Created {
                record_id: record.id,
            }),
            CreateOutcome::Lost => {
                // Another submission created the same (user, name) record
                // between our match and our create. Merge into the winner.
                let existing = find_existing(
                    self.store.as_ref(),
                    user_id,
                    &extraction.name,
                    &location.address,
                )
                .await?
                .ok_or_else(|| {
                    IngestError::Persistence(
                        "create conflicted but no matching record found".to_string(),
                    )
                })?;
                self.merge_into(existing, recommendation).await
            }
        }
    }

    /// Append the new review and recompute the consensus summary over the
    /// full accumulated list.
    async fn merge_into(
        &self,
        existing: RestaurantRecord,
        recommendation: Recommendation,
    ) -> Result<PipelineOutcome, IngestError> {
        let mut all = existing.recommendations;
        all.push(recommendation.clone());

        let summary = consensus_summary(self.model.as_ref(), &existing.name, &all).await?;
        self.store
            .append_review(&existing.id, &recommendation.video_url, &recommendation, &summary)
            .await?;

        Ok(PipelineOutcome::Merged {
            record_id: existing.id,
        })
    }
}
