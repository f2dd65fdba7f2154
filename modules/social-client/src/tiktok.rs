use reelbites_common::Platform;
use tracing::{info, warn};

use crate::error::{Result, SocialError};
use crate::types::{ResolvedMedia, TikwmCommentResponse, TikwmResponse};
use crate::PlatformResolver;

const TIKWM_BASE: &str = "https://www.tikwm.com/api";

/// TikTok resolver backed by the tikwm.com metadata API.
pub struct TikTokResolver {
    client: reqwest::Client,
}

impl TikTokResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_comments(&self, video_id: &str, url: &str) -> Result<Vec<String>> {
        let endpoint = format!("{TIKWM_BASE}/comment/list");
        let resp = self
            .client
            .get(&endpoint)
            .query(&[("id", video_id), ("url", url)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SocialError::Api {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        let parsed: TikwmCommentResponse = resp.json().await?;
        let comments = parsed
            .data
            .map(|d| d.comments)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.text)
            .collect();
        Ok(comments)
    }
}

#[async_trait::async_trait]
impl PlatformResolver for TikTokResolver {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia> {
        let resp = self
            .client
            .get(&format!("{TIKWM_BASE}/"))
            .query(&[("url", url)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SocialError::Api {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        let parsed: TikwmResponse = resp.json().await?;
        let video = parsed
            .data
            .ok_or_else(|| SocialError::NoPlayableMedia(url.to_string()))?;
        let direct_media_url = video
            .play
            .filter(|p| !p.is_empty())
            .ok_or_else(|| SocialError::NoPlayableMedia(url.to_string()))?;

        // Comment fetch is best effort; the pipeline degrades to a sentinel.
        let comments = match &video.id {
            Some(id) => match self.fetch_comments(id, url).await {
                Ok(comments) => comments,
                Err(e) => {
                    warn!(url, error = %e, "TikTok comment fetch failed, continuing without");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        info!(url, comments = comments.len(), "Resolved TikTok video");

        Ok(ResolvedMedia {
            platform: Platform::TikTok,
            direct_media_url,
            caption: video.title.filter(|t| !t.is_empty()),
            author: video.author.and_then(|a| a.nickname),
            comments,
        })
    }
}
