use reelbites_common::Platform;
use tracing::{info, warn};

use crate::error::{Result, SocialError};
use crate::types::{IgMediaDetails, IgPostDetails, ResolvedMedia};
use crate::PlatformResolver;

const IG_HOST: &str = "social-media-video-downloader.p.rapidapi.com";

/// Extract the shortcode from an Instagram URL: the path segment following
/// `reel`, `reels`, or `p`.
pub fn extract_shortcode(url: &str) -> Option<&str> {
    let mut parts = url.split('/');
    while let Some(part) = parts.next() {
        if matches!(part, "reel" | "reels" | "p") {
            return parts.next().filter(|s| !s.is_empty()).map(|s| {
                s.split('?').next().unwrap_or(s)
            });
        }
    }
    None
}

/// Instagram resolver backed by the RapidAPI social-media-video-downloader.
///
/// Caption and comments live on separate endpoints, so resolution chains two
/// calls: post details (direct URL, fatal if missing) then media details
/// (richer caption + comments, non-fatal).
pub struct InstagramResolver {
    client: reqwest::Client,
    rapid_api_key: String,
}

impl InstagramResolver {
    pub fn new(client: reqwest::Client, rapid_api_key: String) -> Self {
        Self {
            client,
            rapid_api_key,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let resp = self
            .client
            .get(&format!("https://{IG_HOST}{path}"))
            .query(query)
            .header("x-rapidapi-key", &self.rapid_api_key)
            .header("x-rapidapi-host", IG_HOST)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SocialError::Api {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait::async_trait]
impl PlatformResolver for InstagramResolver {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia> {
        let shortcode =
            extract_shortcode(url).ok_or_else(|| SocialError::NoPlayableMedia(url.to_string()))?;

        let post: IgPostDetails = self
            .get_json(
                "/instagram/v3/media/post/details",
                &[("shortcode", shortcode), ("renderableFormats", "all")],
            )
            .await?;

        let first_content = post.contents.first();
        let direct_media_url = first_content
            .and_then(|c| c.videos.first())
            .and_then(|v| v.url.clone())
            .or(post.video_url)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| SocialError::NoPlayableMedia(url.to_string()))?;

        let mut caption = first_content
            .and_then(|c| c.description.clone())
            .or_else(|| post.caption.and_then(|c| c.text))
            .filter(|c| !c.is_empty());
        let mut author = None;
        let mut comments = Vec::new();

        // Second call carries the richer caption and the comment thread.
        // Its failure is non-fatal.
        match self
            .get_json::<IgMediaDetails>(
                "/instagram/v1/media/details",
                &[("url_or_shortcode", shortcode)],
            )
            .await
        {
            Ok(details) => {
                if let Some(data) = details.data {
                    if let Some(text) = data.caption.and_then(|c| c.text).filter(|t| !t.is_empty())
                    {
                        caption = Some(text);
                    }
                    author = data
                        .owner
                        .and_then(|o| o.full_name.or(o.username))
                        .filter(|a| !a.is_empty());
                    comments = data
                        .comments
                        .map(|c| c.items)
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(|c| c.text)
                        .collect();
                }
            }
            Err(e) => warn!(url, error = %e, "Instagram media details failed, continuing without"),
        }

        info!(url, shortcode, comments = comments.len(), "Resolved Instagram video");

        Ok(ResolvedMedia {
            platform: Platform::Instagram,
            direct_media_url,
            caption,
            author,
            comments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcode_from_reel_url() {
        assert_eq!(
            extract_shortcode("https://www.instagram.com/reel/Cxyz123/"),
            Some("Cxyz123")
        );
    }

    #[test]
    fn shortcode_from_reels_and_p_urls() {
        assert_eq!(
            extract_shortcode("https://instagram.com/reels/AbC9/"),
            Some("AbC9")
        );
        assert_eq!(
            extract_shortcode("https://www.instagram.com/p/Dq8xW/"),
            Some("Dq8xW")
        );
    }

    #[test]
    fn shortcode_strips_query_string() {
        assert_eq!(
            extract_shortcode("https://www.instagram.com/reel/Cxyz123?igsh=abc"),
            Some("Cxyz123")
        );
    }

    #[test]
    fn no_shortcode_in_profile_url() {
        assert_eq!(extract_shortcode("https://www.instagram.com/somechef/"), None);
    }
}
