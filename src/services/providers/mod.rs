/// Generative provider abstraction
///
/// The pipeline talks to one text-generation provider and one image-capable
/// provider through the traits below. Each implementation owns its wire format;
/// call sites only see prompts in, text or image content out.
use serde::Deserialize;

use crate::services::prompt::PromptDialect;

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Sampling parameters for a single generation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub max_tokens: Option<u32>,
}

/// Failure reported by a provider call, carrying the raw provider message
///
/// `status` is the HTTP status when the provider answered at all; transport
/// failures leave it empty.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{provider} API error: {message}")]
pub struct ProviderError {
    pub provider: &'static str,
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: &'static str, message: impl Into<String>) -> Self {
        Self {
            provider,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(provider: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self {
            provider,
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(provider: &'static str, err: reqwest::Error) -> Self {
        Self {
            provider,
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Trait for text-generation providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate raw text for a prompt
    ///
    /// No retries happen here; a failed call surfaces immediately.
    async fn generate(&self, prompt: &str, config: &GenerationConfig)
        -> Result<String, ProviderError>;

    /// Prompt dialect this provider understands best
    fn dialect(&self) -> PromptDialect;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// How an image provider hands back its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageDelivery {
    /// Image bytes inlined in a candidates/content/parts structure
    Inline,
    /// A URL to an image the provider hosts
    Hosted,
}

/// Raw output of one image generation call
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutput {
    Inline(GeneratedContent),
    Hosted(String),
}

/// Trait for image-capable providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<ImageOutput, ProviderError>;

    fn delivery(&self) -> ImageDelivery;

    fn name(&self) -> &'static str;
}

// ============================================================================
// Inline Content Types
// ============================================================================

/// Multimodal generation result: candidates, each with content parts
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeneratedContent {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(alias = "mime_type")]
    pub mime_type: String,
    pub data: ImagePayload,
}

/// Image bytes as a provider returned them
///
/// Providers disagree on encoding: some send raw bytes, most send base64 text,
/// and some SDK layers hand back a stringified bytes literal such as `b'iVBO...'`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImagePayload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Content {
    /// First part carrying image data
    pub fn image_part(&self) -> Option<&InlineData> {
        self.parts
            .iter()
            .filter_map(|part| part.inline_data.as_ref())
            .find(|inline| inline.mime_type.starts_with("image/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_content_deserialization() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your image" },
                        { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
                    ]
                }
            }]
        }"#;

        let content: GeneratedContent = serde_json::from_str(json).unwrap();
        let parts = &content.candidates[0].content.as_ref().unwrap().parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].text.as_deref(), Some("Here is your image"));

        let inline = parts[1].inline_data.as_ref().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, ImagePayload::Text("aGVsbG8=".to_string()));
    }

    #[test]
    fn test_generated_content_accepts_snake_case_inline_data() {
        let json = r#"{ "parts": [{ "inline_data": { "mime_type": "image/jpeg", "data": [1, 2, 3] } }] }"#;

        let content: Content = serde_json::from_str(json).unwrap();
        let inline = content.image_part().unwrap();
        assert_eq!(inline.mime_type, "image/jpeg");
        assert_eq!(inline.data, ImagePayload::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn test_image_part_skips_non_image_mime_types() {
        let content = Content {
            parts: vec![Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: "application/json".to_string(),
                    data: ImagePayload::Text("e30=".to_string()),
                }),
            }],
        };

        assert!(content.image_part().is_none());
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::with_status("gemini", 429, "RESOURCE_EXHAUSTED: quota");
        assert_eq!(err.to_string(), "gemini API error: RESOURCE_EXHAUSTED: quota");
        assert_eq!(err.status, Some(429));
    }
}
