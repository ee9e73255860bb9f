/// Google Gemini provider
///
/// Serves both text generation and inline image generation through the
/// `generateContent` REST endpoint.
///
/// API Flow:
/// 1. Text: POST /v1beta/models/{text_model}:generateContent → candidates[0].content.parts[0].text
/// 2. Image: same endpoint on the image model with TEXT+IMAGE response modalities,
///    image bytes returned base64-encoded in an `inlineData` part
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::services::{
    prompt::PromptDialect,
    providers::{
        GeneratedContent, GenerationConfig, ImageDelivery, ImageGenerator, ImageOutput,
        ProviderError, TextGenerator,
    },
};

const PROVIDER: &str = "gemini";

#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    text_model: String,
    image_model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl WireGenerationConfig {
    fn from_config(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_tokens,
            response_modalities: None,
        }
    }
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        api_url: String,
        text_model: String,
        image_model: String,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            text_model,
            image_model,
        }
    }

    /// Calls `generateContent` on a model and returns the decoded response
    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        generation_config: WireGenerationConfig,
    ) -> Result<GeneratedContent, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            model
        );
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config,
        };

        tracing::debug!(model = %model, prompt_len = prompt.len(), "Calling Gemini");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                model = %model,
                status = %status,
                body = %body,
                "Gemini API request failed"
            );
            return Err(error_from_body(status.as_u16(), &body));
        }

        response
            .json::<GeneratedContent>()
            .await
            .map_err(|e| ProviderError::new(PROVIDER, format!("Failed to decode response: {e}")))
    }
}

/// Turns a Gemini error body into a provider error, keeping the status name in the message
fn error_from_body(status: u16, body: &str) -> ProviderError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(code) => format!("{}: {}", code, envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) => format!("API returned status {status}: {body}"),
    };
    ProviderError::with_status(PROVIDER, status, message)
}

/// First text part of the first candidate
fn first_text(content: GeneratedContent) -> Result<String, ProviderError> {
    let candidate_content = content
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .ok_or_else(|| ProviderError::new(PROVIDER, "No content in response"))?;

    candidate_content
        .parts
        .into_iter()
        .next()
        .and_then(|part| part.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ProviderError::new(PROVIDER, "Empty content in response"))
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, ProviderError> {
        let content = self
            .generate_content(
                &self.text_model,
                prompt,
                WireGenerationConfig::from_config(config),
            )
            .await?;
        first_text(content)
    }

    fn dialect(&self) -> PromptDialect {
        PromptDialect::Gemini
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

#[async_trait::async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate_image(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<ImageOutput, ProviderError> {
        let mut generation_config = WireGenerationConfig::from_config(config);
        generation_config.response_modalities = Some(vec!["TEXT", "IMAGE"]);

        let content = self
            .generate_content(&self.image_model, prompt, generation_config)
            .await?;
        Ok(ImageOutput::Inline(content))
    }

    fn delivery(&self) -> ImageDelivery {
        ImageDelivery::Inline
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
