//! Record and recommendation construction.

use chrono::Utc;

use reelbites_common::{defaults, Platform, Recommendation, RestaurantRecord};
use social_client::ResolvedMedia;

use crate::extract::ExtractionResult;
use crate::geocode::ResolvedLocation;
use crate::merge::initial_summary;
use crate::traits::record_key;

/// Build the embedded recommendation for the triggering submission.
/// `video_url` is always the submitted URL, never the resolved media URL.
pub fn build_recommendation(
    video_url: &str,
    media: &ResolvedMedia,
    extraction: &ExtractionResult,
    thumbnail_url: String,
) -> Recommendation {
    let reviewer_name = media.author.clone().unwrap_or_else(|| {
        match media.platform {
            Platform::TikTok => defaults::TIKTOK_REVIEWER,
            Platform::Instagram => defaults::GENERIC_REVIEWER,
        }
        .to_string()
    });

    Recommendation {
        video_url: video_url.to_string(),
        source: media.platform,
        reviewer_name,
        thumbnail_url,
        highlights: extraction.top_highlights.clone(),
        description: extraction.full_description.clone(),
        community_sentiment: extraction.community_sentiment.clone(),
        sentiment_score: extraction.sentiment_score,
        price_level: extraction.price_level,
        added_at: Utc::now(),
    }
}

/// Seed a brand-new restaurant record from a single extraction. The global
/// summary is derived locally; the merge path's model pass only runs once a
/// second review arrives.
pub fn build_record(
    user_id: &str,
    extraction: &ExtractionResult,
    location: &ResolvedLocation,
    recommendation: Recommendation,
) -> RestaurantRecord {
    RestaurantRecord {
        id: record_key(user_id, &extraction.name),
        user_id: user_id.to_string(),
        name: extraction.name.clone(),
        address: location.address.clone(),
        location: location.location,
        website: location.website.clone(),
        cuisine: extraction.cuisine.clone(),
        thumbnail_url: recommendation.thumbnail_url.clone(),
        video_urls: vec![recommendation.video_url.clone()],
        global_summary: initial_summary(extraction),
        must_order_dishes: extraction.must_order_dishes.clone(),
        recommendation_tags: extraction.recommendation_tags.clone(),
        recommendations: vec![recommendation],
        user_rating: 0.0,
        user_notes: String::new(),
        created_at: None,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelbites_common::{GeoPoint, PriceLevel};

    fn media(platform: Platform, author: Option<&str>) -> ResolvedMedia {
        ResolvedMedia {
            platform,
            direct_media_url: "https://cdn.example/v.mp4".to_string(),
            caption: Some("great spot".to_string()),
            author: author.map(|a| a.to_string()),
            comments: vec![],
        }
    }

    fn extraction() -> ExtractionResult {
        ExtractionResult {
            name: "Sushi Bar".to_string(),
            address: "1 Main St".to_string(),
            cuisine: "Japanese".to_string(),
            top_highlights: vec!["Fresh fish".to_string()],
            full_description: "Great omakase.".to_string(),
            community_sentiment: "Loved".to_string(),
            sentiment_score: Default::default(),
            must_order_dishes: vec!["Omakase".to_string()],
            price_level: PriceLevel::Normal,
            recommendation_tags: vec!["date night".to_string()],
            website: String::new(),
        }
    }

    #[test]
    fn recommendation_carries_submitted_url_not_media_url() {
        let rec = build_recommendation(
            "https://tiktok.com/@x/video/1",
            &media(Platform::TikTok, Some("Chef Dana")),
            &extraction(),
            "thumb".to_string(),
        );
        assert_eq!(rec.video_url, "https://tiktok.com/@x/video/1");
        assert_eq!(rec.reviewer_name, "Chef Dana");
        assert_eq!(rec.source, Platform::TikTok);
    }

    #[test]
    fn missing_author_falls_back_per_platform() {
        let tiktok = build_recommendation(
            "u",
            &media(Platform::TikTok, None),
            &extraction(),
            String::new(),
        );
        let instagram = build_recommendation(
            "u",
            &media(Platform::Instagram, None),
            &extraction(),
            String::new(),
        );
        assert_eq!(tiktok.reviewer_name, defaults::TIKTOK_REVIEWER);
        assert_eq!(instagram.reviewer_name, defaults::GENERIC_REVIEWER);
    }

    #[test]
    fn new_record_seeds_urls_and_local_summary() {
        let rec = build_recommendation(
            "https://tiktok.com/@x/video/1",
            &media(Platform::TikTok, None),
            &extraction(),
            "thumb".to_string(),
        );
        let location = ResolvedLocation {
            address: "1 Main Street, Springfield".to_string(),
            location: GeoPoint { lat: 1.0, lng: 2.0 },
            website: "https://sushibar.example".to_string(),
        };
        let record = build_record("u1", &extraction(), &location, rec);

        assert_eq!(record.id, record_key("u1", "Sushi Bar"));
        assert_eq!(record.video_urls, vec!["https://tiktok.com/@x/video/1"]);
        assert_eq!(record.recommendations.len(), 1);
        assert_eq!(record.global_summary.price_level, PriceLevel::Normal);
        assert_eq!(record.address, "1 Main Street, Springfield");
        assert!(record.created_at.is_none(), "creation time is server-assigned");
    }
}
