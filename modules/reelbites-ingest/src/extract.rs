//! Single-review structured extraction.
//!
//! The prompt carries the whole contract: input channels, the price-level
//! cross-referencing rules, and the exact JSON shape. The response is free
//! text; decoding goes through the balanced-brace scanner in
//! `ai_client::util` rather than trusting the model to return bare JSON.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use ai_client::util::{first_json_object, strip_code_blocks};
use reelbites_common::{defaults, IngestError, PriceLevel, SentimentScore};
use social_client::ResolvedMedia;

use crate::traits::ReviewModel;

/// What the model returns for one review video. Transient: feeds the record
/// builder and the merge path, never persisted as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub cuisine: String,
    /// Exactly 5 requested; clamped to 5 on decode.
    #[serde(default)]
    pub top_highlights: Vec<String>,
    #[serde(default)]
    pub full_description: String,
    #[serde(default)]
    pub community_sentiment: String,
    #[serde(default)]
    pub sentiment_score: SentimentScore,
    #[serde(default)]
    pub must_order_dishes: Vec<String>,
    #[serde(default)]
    pub price_level: PriceLevel,
    #[serde(default)]
    pub recommendation_tags: Vec<String>,
    #[serde(default)]
    pub website: String,
}

impl ExtractionResult {
    /// Enforce the parts of the schema no default covers.
    fn validate(mut self) -> Result<Self, IngestError> {
        if self.name.trim().is_empty() {
            return Err(IngestError::Schema(
                "extraction returned no restaurant name".to_string(),
            ));
        }
        self.top_highlights.truncate(5);
        Ok(self)
    }
}

/// Decode a raw model response into a validated [`ExtractionResult`].
pub fn decode_extraction(response: &str) -> Result<ExtractionResult, IngestError> {
    let cleaned = strip_code_blocks(response);
    let json = first_json_object(cleaned).ok_or_else(|| {
        IngestError::ExtractionParse(format!(
            "no JSON object in model response: {}",
            ai_client::util::truncate_to_char_boundary(cleaned, 120)
        ))
    })?;
    let extraction: ExtractionResult =
        serde_json::from_str(json).map_err(|e| IngestError::Schema(e.to_string()))?;
    extraction.validate()
}

fn extraction_prompt(caption: &str, comments: &str) -> String {
    format!(
        r#"Analyze this restaurant review video.
--- INPUT SOURCES ---
1. CREATOR_CAPTION: "{caption}"
2. USER_COMMENTS: "{comments}"
3. VIDEO_CONTENT: Visuals and Audio

--- MISSION & RULES ---
- NAME & ADDRESS: Search the CREATOR_CAPTION first. If the caption is "{no_caption}" or lacks info, use your visual intelligence to identify signs, menus, or landmarks in the video.
- PRICE ANALYSIS (CRITICAL): Determine "price_level" as a NUMBER: 1 (Cheap), 2 (Normal), 3 (Expensive).
  * CROSS-REFERENCE: Look at the menu in the video AND scan USER_COMMENTS.
  * If users in comments mention "it's overpriced" or "too expensive", lean towards 3.
  * If NO mention of price exists in video OR comments, return 0.
- COMMUNITY VOICE: Use USER_COMMENTS to summarize sentiment. If missing, describe the vibe from the video.
- HIGHLIGHTS: Extract EXACTLY 5 short, punchy points (e.g., "Cheap lunch", "Amazing pasta").
- DESCRIPTION: Write a detailed, coherent paragraph about the experience.

STRICT JSON STRUCTURE:
{{
  "name": "Restaurant Name",
  "address": "Street, City, Country",
  "cuisine": "Food type",
  "top_highlights": ["Point 1", "Point 2", "Point 3", "Point 4", "Point 5"],
  "full_description": "A detailed summary of the food, service and atmosphere.",
  "community_sentiment": "Summary of user comments.",
  "sentiment_score": "positive/neutral/negative",
  "must_order_dishes": ["Dish1", "Dish2"],
  "price_level": 0,
  "recommendation_tags": ["Tag1", "Tag2"],
  "website": ""
}}
Return ONLY valid JSON."#,
        no_caption = defaults::NO_CAPTION,
    )
}

pub struct ReviewExtractor {
    model: Arc<dyn ReviewModel>,
}

impl ReviewExtractor {
    pub fn new(model: Arc<dyn ReviewModel>) -> Self {
        Self { model }
    }

    /// Extract structured restaurant facts from caption + comments + media.
    pub async fn extract(
        &self,
        media: &ResolvedMedia,
        video_bytes: &[u8],
    ) -> Result<ExtractionResult, IngestError> {
        let caption = match media.caption.as_deref() {
            Some(caption) => caption,
            None => {
                warn!(platform = %media.platform, "No caption found, prompting with sentinel");
                defaults::NO_CAPTION
            }
        };
        let digest = defaults::comment_digest(&media.comments);
        if digest == defaults::NO_COMMENTS {
            warn!(platform = %media.platform, "No comments available, prompting with sentinel");
        }

        let prompt = extraction_prompt(caption, &digest);
        let response = self
            .model
            .extract_review(&prompt, "video/mp4", video_bytes)
            .await?;

        let extraction = decode_extraction(&response)?;
        info!(
            name = extraction.name.as_str(),
            price_level = u8::from(extraction.price_level),
            "Extracted restaurant facts"
        );
        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = r#"Here is the analysis:
{
  "name": "Sushi Bar",
  "address": "1 Main St",
  "cuisine": "Japanese",
  "top_highlights": ["Fresh fish", "Fast service", "Cozy", "Omakase", "Late hours", "Extra point"],
  "full_description": "A tiny omakase counter with remarkable nigiri.",
  "community_sentiment": "Locals love it",
  "sentiment_score": "positive",
  "must_order_dishes": ["Omakase set"],
  "price_level": 2,
  "recommendation_tags": ["date night"],
  "website": ""
}"#;

    #[test]
    fn decodes_full_response_and_clamps_highlights() {
        let extraction = decode_extraction(FULL_RESPONSE).unwrap();
        assert_eq!(extraction.name, "Sushi Bar");
        assert_eq!(extraction.price_level, PriceLevel::Normal);
        assert_eq!(extraction.sentiment_score, SentimentScore::Positive);
        assert_eq!(extraction.top_highlights.len(), 5);
    }

    #[test]
    fn decodes_fenced_response() {
        let body = &FULL_RESPONSE[FULL_RESPONSE.find('{').unwrap()..];
        let fenced = format!("```json\n{body}\n```");
        let extraction = decode_extraction(&fenced).unwrap();
        assert_eq!(extraction.name, "Sushi Bar");
    }

    #[test]
    fn missing_json_is_a_parse_error() {
        let err = decode_extraction("I could not identify a restaurant.").unwrap_err();
        assert!(matches!(err, IngestError::ExtractionParse(_)));
    }

    #[test]
    fn missing_name_is_a_schema_violation() {
        let err = decode_extraction(r#"{"address": "1 Main St"}"#).unwrap_err();
        assert!(matches!(err, IngestError::Schema(_)));
    }

    #[test]
    fn wrong_type_is_a_schema_violation() {
        let err =
            decode_extraction(r#"{"name": "Sushi Bar", "price_level": 9}"#).unwrap_err();
        assert!(matches!(err, IngestError::Schema(_)));
    }

    #[test]
    fn prompt_encodes_price_contract() {
        let prompt = extraction_prompt("caption", "comments");
        assert!(prompt.contains("If NO mention of price exists in video OR comments, return 0"));
        assert!(prompt.contains("lean towards 3"));
    }
}
