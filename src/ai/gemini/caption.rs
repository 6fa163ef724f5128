use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerationConfig, HarmBlockThreshold, HarmCategory,
    InlineData, Part, SafetySetting,
};
use crate::ai::CaptionService;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

fn generation_config() -> GenerationConfig {
    GenerationConfig {
        temperature: 0.8,
        top_p: 0.9,
        top_k: 40,
        max_output_tokens: 150,
    }
}

fn safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::HarmCategoryHarassment,
        HarmCategory::HarmCategoryHateSpeech,
        HarmCategory::HarmCategorySexuallyExplicit,
        HarmCategory::HarmCategoryDangerousContent,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: HarmBlockThreshold::BlockLowAndAbove,
    })
    .collect()
}

/// Captions images through Gemini's multimodal `generateContent`.
pub struct GeminiCaptionClient {
    http: GeminiHttpClient,
}

impl GeminiCaptionClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, timeout, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }
}

#[async_trait]
impl CaptionService for GeminiCaptionClient {
    async fn generate(
        &self,
        prompt: &str,
        mime_type: &str,
        image_bytes: &[u8],
    ) -> Result<serde_json::Value> {
        tracing::debug!(
            "Requesting caption for {} image ({} bytes) from {}",
            mime_type,
            image_bytes.len(),
            self.http.model()
        );

        use base64::Engine as _;
        let data = base64::engine::general_purpose::STANDARD.encode(image_bytes);

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data,
                        },
                    },
                ],
            }],
            generation_config: generation_config(),
            safety_settings: safety_settings(),
        };

        self.http.generate_content(&request).await
    }
}
