//! Gemini-backed [`ReviewModel`].

use anyhow::Result;
use async_trait::async_trait;

use ai_client::Gemini;

use crate::traits::ReviewModel;

pub struct GeminiReviewModel {
    gemini: Gemini,
}

impl GeminiReviewModel {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            gemini: Gemini::new(api_key, model),
        }
    }
}

#[async_trait]
impl ReviewModel for GeminiReviewModel {
    async fn extract_review(
        &self,
        prompt: &str,
        mime_type: &str,
        media: &[u8],
    ) -> Result<String> {
        self.gemini.generate_with_media(prompt, mime_type, media).await
    }

    async fn summarize(&self, prompt: &str) -> Result<String> {
        self.gemini.generate_text(prompt).await
    }
}
