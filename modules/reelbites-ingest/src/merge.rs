//! Consensus summarization.
//!
//! Two strategies, chosen by the entity matcher's outcome:
//! - merge path: a second model pass over the *entire* accumulated
//!   recommendation list. Recomputing from the full list instead of patching
//!   incrementally keeps the summary drift-free as reviews pile up.
//! - new-record path: a locally derived summary for the single-review case,
//!   with no model call.

use tracing::info;

use ai_client::util::{first_json_object, strip_code_blocks, truncate_to_char_boundary};
use reelbites_common::{defaults, GlobalSummary, IngestError, Recommendation};

use crate::extract::ExtractionResult;
use crate::traits::ReviewModel;

pub(crate) fn summary_prompt(name: &str, recommendations: &[Recommendation]) -> String {
    let data = serde_json::to_string(recommendations).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"Summarize these {count} reviews for "{name}".
DATA: {data}

STRICT RULES:
1. FINAL PRICE: Determine a unified "price_level" (1=Cheap, 2=Normal, 3=Expensive).
   * Weigh the "price_level" from all reviews.
   * If USER_COMMENTS across different videos mention high costs, prioritize a higher score.
   * If all reviews have 0 (no info), the final "price_level" MUST be 0.
2. Generate 4-5 very short "decision_chips" (max 3 words each) in English.
3. These must be punchy facts like "Handmade Pasta", "Authentic Vibes", "Expensive but worth it".
4. "unified_description": A single, very short sentence (max 15 words) in English summarizing the place.

Return ONLY JSON:
{{
  "price_level": 0,
  "unified_description": "...",
  "decision_chips": ["chip1", "chip2", "chip3", "chip4"]
}}"#,
        count = recommendations.len(),
    )
}

fn decode_summary(response: &str) -> Result<GlobalSummary, IngestError> {
    let cleaned = strip_code_blocks(response);
    let json = first_json_object(cleaned).ok_or_else(|| {
        IngestError::ExtractionParse("no JSON object in summary response".to_string())
    })?;
    serde_json::from_str(json).map_err(|e| IngestError::Schema(e.to_string()))
}

/// Recompute the consensus summary over the full recommendation list.
pub async fn consensus_summary(
    model: &dyn ReviewModel,
    name: &str,
    recommendations: &[Recommendation],
) -> Result<GlobalSummary, IngestError> {
    let prompt = summary_prompt(name, recommendations);
    let response = model.summarize(&prompt).await?;
    let summary = decode_summary(&response)?;
    info!(
        name,
        reviews = recommendations.len(),
        price_level = u8::from(summary.price_level),
        chips = summary.decision_chips.len(),
        "Recomputed consensus summary"
    );
    Ok(summary)
}

/// Locally derived summary for a brand-new single-review record.
pub fn initial_summary(extraction: &ExtractionResult) -> GlobalSummary {
    let prefix =
        truncate_to_char_boundary(&extraction.full_description, defaults::INITIAL_DESCRIPTION_CHARS);
    let unified_description = if prefix.len() < extraction.full_description.len() {
        format!("{prefix}...")
    } else {
        prefix.to_string()
    };

    GlobalSummary {
        price_level: extraction.price_level,
        unified_description,
        decision_chips: extraction
            .top_highlights
            .iter()
            .take(defaults::INITIAL_CHIP_COUNT)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelbites_common::PriceLevel;

    fn extraction(description: &str, highlights: &[&str], price: PriceLevel) -> ExtractionResult {
        ExtractionResult {
            name: "Sushi Bar".to_string(),
            address: "1 Main St".to_string(),
            cuisine: "Japanese".to_string(),
            top_highlights: highlights.iter().map(|s| s.to_string()).collect(),
            full_description: description.to_string(),
            community_sentiment: String::new(),
            sentiment_score: Default::default(),
            must_order_dishes: vec![],
            price_level: price,
            recommendation_tags: vec![],
            website: String::new(),
        }
    }

    #[test]
    fn initial_summary_truncates_long_descriptions() {
        let long = "x".repeat(120);
        let summary = initial_summary(&extraction(&long, &["a", "b", "c", "d"], PriceLevel::Cheap));
        assert_eq!(summary.unified_description.len(), 53); // 50 chars + "..."
        assert!(summary.unified_description.ends_with("..."));
        assert_eq!(summary.decision_chips, vec!["a", "b", "c"]);
        assert_eq!(summary.price_level, PriceLevel::Cheap);
    }

    #[test]
    fn initial_summary_keeps_short_descriptions_verbatim() {
        let summary = initial_summary(&extraction("Tiny omakase spot.", &["a"], PriceLevel::Unknown));
        assert_eq!(summary.unified_description, "Tiny omakase spot.");
        assert_eq!(summary.price_level, PriceLevel::Unknown);
    }

    #[test]
    fn summary_prompt_embeds_all_reviews_and_zero_price_rule() {
        let recs: Vec<Recommendation> = (0..3)
            .map(|i| Recommendation {
                video_url: format!("https://tiktok.com/@x/video/{i}"),
                source: reelbites_common::Platform::TikTok,
                reviewer_name: "Creator".to_string(),
                thumbnail_url: String::new(),
                highlights: vec![],
                description: format!("review {i}"),
                community_sentiment: String::new(),
                sentiment_score: Default::default(),
                price_level: PriceLevel::Unknown,
                added_at: chrono::Utc::now(),
            })
            .collect();

        let prompt = summary_prompt("Sushi Bar", &recs);
        assert!(prompt.contains("Summarize these 3 reviews"));
        assert!(prompt.contains("review 0") && prompt.contains("review 2"));
        assert!(prompt.contains(r#"the final "price_level" MUST be 0"#));
    }

    #[test]
    fn decodes_summary_json() {
        let summary = decode_summary(
            r#"{"price_level": 2, "unified_description": "Beloved omakase counter.", "decision_chips": ["Fresh Fish", "Date Night", "Normal Prices", "Cozy"]}"#,
        )
        .unwrap();
        assert_eq!(summary.price_level, PriceLevel::Normal);
        assert_eq!(summary.decision_chips.len(), 4);
    }

    #[test]
    fn summary_without_json_fails_parse() {
        assert!(matches!(
            decode_summary("Sorry, I can't do that."),
            Err(IngestError::ExtractionParse(_))
        ));
    }
}
