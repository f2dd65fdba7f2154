use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reelbites_common::{Config, LinkSubmission, SubmissionStatus};
use social_client::SocialClient;

use reelbites_ingest::fetcher::HttpMediaFetcher;
use reelbites_ingest::firestore::FirestoreStore;
use reelbites_ingest::geocode::GoogleGeocoder;
use reelbites_ingest::model::GeminiReviewModel;
use reelbites_ingest::IngestPipeline;

/// Ingest one social video review link into the restaurant store.
#[derive(Parser, Debug)]
#[command(name = "reelbites-ingest")]
struct Args {
    /// TikTok or Instagram video URL to ingest.
    url: String,

    /// Owning user id. Defaults to the shared anonymous user.
    #[arg(long)]
    user: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("reelbites_ingest=info".parse()?))
        .init();

    info!("ReelBites ingest starting...");

    let args = Args::parse();
    let config = Config::from_env();

    let pipeline = IngestPipeline::new(
        Arc::new(SocialClient::new(config.rapid_api_key.clone())),
        Arc::new(HttpMediaFetcher::new()),
        Arc::new(GeminiReviewModel::new(
            &config.gemini_api_key,
            &config.gemini_model,
        )),
        Arc::new(GoogleGeocoder::new(config.maps_api_key.clone())),
        Arc::new(FirestoreStore::new(
            config.firebase_project_id.clone(),
            config.firebase_api_key.clone(),
        )),
        config.deadline_secs,
    );

    let submission = LinkSubmission::new(args.url, args.user);
    let status = pipeline.run(&submission).await;

    if status == SubmissionStatus::Error {
        std::process::exit(1);
    }
    Ok(())
}
