use reelbites_common::Platform;
use serde::Deserialize;

// --- Platform-agnostic resolver output ---

/// Normalized metadata for one social video, produced by a platform resolver.
/// `caption` and `author` stay optional here; the pipeline applies the
/// documented defaults uniformly at prompt-build time.
#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    pub platform: Platform,
    /// Direct, playable media URL. Resolution fails fatally without one.
    pub direct_media_url: String,
    pub caption: Option<String>,
    pub author: Option<String>,
    /// Raw comment texts, most relevant first. Empty when the comment
    /// endpoint failed (non-fatal).
    pub comments: Vec<String>,
}

// --- tikwm.com wire types ---

#[derive(Debug, Clone, Deserialize)]
pub struct TikwmResponse {
    pub data: Option<TikwmVideo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TikwmVideo {
    pub id: Option<String>,
    /// Watermark-free play URL.
    pub play: Option<String>,
    pub title: Option<String>,
    pub author: Option<TikwmAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TikwmAuthor {
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TikwmCommentResponse {
    pub data: Option<TikwmCommentList>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TikwmCommentList {
    #[serde(default)]
    pub comments: Vec<TikwmComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TikwmComment {
    pub text: Option<String>,
}

// --- RapidAPI Instagram wire types ---

/// Response of `instagram/v3/media/post/details`.
#[derive(Debug, Clone, Deserialize)]
pub struct IgPostDetails {
    #[serde(default)]
    pub contents: Vec<IgContent>,
    /// Legacy flat fields, populated for some post types.
    pub video_url: Option<String>,
    pub caption: Option<IgCaption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgContent {
    #[serde(default)]
    pub videos: Vec<IgVideo>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgVideo {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgCaption {
    pub text: Option<String>,
}

/// Response of `instagram/v1/media/details`.
#[derive(Debug, Clone, Deserialize)]
pub struct IgMediaDetails {
    pub data: Option<IgMediaData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgMediaData {
    pub caption: Option<IgCaption>,
    pub comments: Option<IgCommentList>,
    pub owner: Option<IgOwner>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgOwner {
    pub username: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgCommentList {
    #[serde(default)]
    pub items: Vec<IgComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgComment {
    pub text: Option<String>,
}

// --- TikTok oEmbed (thumbnails) ---

#[derive(Debug, Clone, Deserialize)]
pub struct TikTokOembed {
    pub thumbnail_url: Option<String>,
}
