pub mod error;
pub mod instagram;
pub mod thumbnail;
pub mod tiktok;
pub mod types;

pub use error::{Result, SocialError};
pub use types::ResolvedMedia;

use reelbites_common::Platform;

use instagram::InstagramResolver;
use tiktok::TikTokResolver;

/// One platform adapter: raw submission URL in, normalized metadata out.
/// New platforms plug in here without touching the pipeline.
#[async_trait::async_trait]
pub trait PlatformResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia>;
}

/// Classifier-driven dispatcher over the platform adapters.
pub struct SocialClient {
    http: reqwest::Client,
    tiktok: TikTokResolver,
    instagram: InstagramResolver,
}

impl SocialClient {
    pub fn new(rapid_api_key: String) -> Self {
        let http = reqwest::Client::new();
        Self {
            tiktok: TikTokResolver::new(http.clone()),
            instagram: InstagramResolver::new(http.clone(), rapid_api_key),
            http,
        }
    }

    /// Resolve a submission URL through the adapter its platform maps to.
    pub async fn resolve(&self, url: &str) -> Result<ResolvedMedia> {
        let adapter: &dyn PlatformResolver = match Platform::classify(url) {
            Platform::TikTok => &self.tiktok,
            Platform::Instagram => &self.instagram,
        };
        adapter.resolve(url).await
    }

    /// Best-effort thumbnail for the submitted link. Never fails.
    pub async fn thumbnail(&self, url: &str) -> String {
        thumbnail::thumbnail_url(&self.http, url).await
    }
}
