use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Submissions ---

/// Terminal states are Completed and Error; the pipeline never moves a
/// submission out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Completed,
    Error,
}

/// A user-submitted review link. Drives exactly one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSubmission {
    pub id: Uuid,
    pub url: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LinkSubmission {
    pub fn new(url: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            user_id: user_id.unwrap_or_else(|| "anonymous".to_string()),
            status: SubmissionStatus::Pending,
            message: None,
        }
    }
}

// --- Platforms ---

/// Supported video platforms, selected by URL pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    TikTok,
    Instagram,
}

impl Platform {
    /// Classify a raw submission URL. Anything that isn't Instagram is
    /// treated as TikTok; unknown hosts fail later in the resolver rather
    /// than here.
    pub fn classify(url: &str) -> Self {
        if url.contains("instagram.com") {
            Platform::Instagram
        } else {
            Platform::TikTok
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::TikTok => write!(f, "tiktok"),
            Platform::Instagram => write!(f, "instagram"),
        }
    }
}

// --- Restaurant facts ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// 0 means "no cost signal in video or comments", per the extraction prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum PriceLevel {
    #[default]
    Unknown,
    Cheap,
    Normal,
    Expensive,
}

impl From<PriceLevel> for u8 {
    fn from(level: PriceLevel) -> u8 {
        match level {
            PriceLevel::Unknown => 0,
            PriceLevel::Cheap => 1,
            PriceLevel::Normal => 2,
            PriceLevel::Expensive => 3,
        }
    }
}

impl TryFrom<u8> for PriceLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PriceLevel::Unknown),
            1 => Ok(PriceLevel::Cheap),
            2 => Ok(PriceLevel::Normal),
            3 => Ok(PriceLevel::Expensive),
            other => Err(format!("price_level out of range: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SentimentScore {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// One review's extracted facts, embedded append-only in a RestaurantRecord.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "videoUrl")]
    pub video_url: String,
    pub source: Platform,
    #[serde(rename = "reviewerName")]
    pub reviewer_name: String,
    #[serde(rename = "thumbnailUrl")]
    pub thumbnail_url: String,
    /// At most 5 short punchy points.
    pub highlights: Vec<String>,
    pub description: String,
    pub community_sentiment: String,
    pub sentiment_score: SentimentScore,
    pub price_level: PriceLevel,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

/// Consensus view over all recommendations of a record. Always recomputed
/// from the full list, never patched in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSummary {
    pub price_level: PriceLevel,
    /// Single short sentence, max 15 words.
    pub unified_description: String,
    /// 4-5 punchy facts, max 3 words each.
    pub decision_chips: Vec<String>,
}

/// Per-user restaurant entity aggregating every review of one restaurant.
/// Created and appended to by the pipeline; never deleted by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantRecord {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub cuisine: String,
    #[serde(rename = "thumbnailUrl", default)]
    pub thumbnail_url: String,
    /// Set semantics: one entry per submitted video URL.
    #[serde(rename = "videoUrls")]
    pub video_urls: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub global_summary: GlobalSummary,
    #[serde(default)]
    pub must_order_dishes: Vec<String>,
    #[serde(default)]
    pub recommendation_tags: Vec<String>,
    #[serde(default)]
    pub user_rating: f32,
    #[serde(default)]
    pub user_notes: String,
    /// Server-assigned; None until the record has been persisted.
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_instagram_urls() {
        assert_eq!(
            Platform::classify("https://www.instagram.com/reel/Cxyz123/"),
            Platform::Instagram
        );
        assert_eq!(
            Platform::classify("https://tiktok.com/@x/video/1"),
            Platform::TikTok
        );
        // Unknown hosts fall through to TikTok; the resolver rejects them.
        assert_eq!(Platform::classify("https://example.com/v/1"), Platform::TikTok);
    }

    #[test]
    fn price_level_roundtrips_as_number() {
        let json = serde_json::to_string(&PriceLevel::Expensive).unwrap();
        assert_eq!(json, "3");
        let back: PriceLevel = serde_json::from_str("0").unwrap();
        assert_eq!(back, PriceLevel::Unknown);
        assert!(serde_json::from_str::<PriceLevel>("7").is_err());
    }

    #[test]
    fn submission_defaults_to_anonymous() {
        let sub = LinkSubmission::new("https://tiktok.com/@x/video/1", None);
        assert_eq!(sub.user_id, "anonymous");
        assert_eq!(sub.status, SubmissionStatus::Pending);
    }
}
