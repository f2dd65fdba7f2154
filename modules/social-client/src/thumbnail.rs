use reelbites_common::{defaults, Platform};
use tracing::warn;

use crate::types::TikTokOembed;

/// Derive a thumbnail URL for a submitted video link. Never fails: every
/// degradation falls back to [`defaults::FALLBACK_THUMBNAIL`].
///
/// - TikTok: the public oEmbed endpoint carries a `thumbnail_url`.
/// - Instagram: the post URL with a `media/?size=l` suffix serves the image.
pub async fn thumbnail_url(client: &reqwest::Client, video_url: &str) -> String {
    match Platform::classify(video_url) {
        Platform::TikTok => match fetch_oembed_thumbnail(client, video_url).await {
            Some(url) => url,
            None => defaults::FALLBACK_THUMBNAIL.to_string(),
        },
        Platform::Instagram => {
            let base = video_url
                .split('?')
                .next()
                .unwrap_or(video_url)
                .trim_end_matches('/');
            format!("{base}/media/?size=l")
        }
    }
}

async fn fetch_oembed_thumbnail(client: &reqwest::Client, video_url: &str) -> Option<String> {
    let result = client
        .get("https://www.tiktok.com/oembed")
        .query(&[("url", video_url)])
        .send()
        .await;

    match result {
        Ok(resp) => match resp.json::<TikTokOembed>().await {
            Ok(oembed) => oembed.thumbnail_url,
            Err(e) => {
                warn!(video_url, error = %e, "TikTok oEmbed parse failed");
                None
            }
        },
        Err(e) => {
            warn!(video_url, error = %e, "TikTok oEmbed fetch failed");
            None
        }
    }
}
