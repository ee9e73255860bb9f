/// OpenAI provider
///
/// Text comes from the chat completions endpoint in JSON mode; images from the
/// image generation endpoint, which hosts the result and hands back a URL.
use reqwest::Client as HttpClient;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::services::{
    prompt::PromptDialect,
    providers::{
        GenerationConfig, ImageDelivery, ImageGenerator, ImageOutput, ProviderError,
        TextGenerator,
    },
};

const PROVIDER: &str = "openai";
const SYSTEM_INSTRUCTION: &str = "You are a travel planning assistant that provides personalized \
    destination recommendations based on user preferences. Always respond in the exact JSON \
    format specified in the prompt. Focus on providing specific, actionable recommendations that \
    match the user's preferences.";
const IMAGE_SIZE: &str = "1024x1024";
const IMAGE_QUALITY: &str = "standard";

#[derive(Clone)]
pub struct OpenAiClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    text_model: String,
    image_model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'static str,
    quality: &'static str,
    n: u8,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl OpenAiClient {
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

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ProviderError> {
        let url = format!("{}/v1/{}", self.api_url.trim_end_matches('/'), path);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "OpenAI API request failed"
            );
            return Err(error_from_body(status.as_u16(), &body));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::new(PROVIDER, format!("Failed to decode response: {e}")))
    }
}

/// Builds a provider error whose message keeps OpenAI's error type and code
///
/// Codes such as `invalid_api_key` or `insufficient_quota` are what the
/// classifier matches on.
fn error_from_body(status: u16, body: &str) -> ProviderError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let error = envelope.error;
            let tags: Vec<String> = [error.error_type, error.code]
                .into_iter()
                .flatten()
                .collect();
            if tags.is_empty() {
                error.message
            } else {
                format!("{} ({})", error.message, tags.join(", "))
            }
        }
        Err(_) => format!("API returned status {status}: {body}"),
    };
    ProviderError::with_status(PROVIDER, status, message)
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.text_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        };

        tracing::debug!(model = %self.text_model, prompt_len = prompt.len(), "Calling OpenAI");

        let response: ChatResponse = self.post("chat/completions", &request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ProviderError::new(PROVIDER, "No content in response"))
    }

    fn dialect(&self) -> PromptDialect {
        PromptDialect::OpenAi
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

#[async_trait::async_trait]
impl ImageGenerator for OpenAiClient {
    /// Sampling parameters do not apply to the image endpoint
    async fn generate_image(
        &self,
        prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<ImageOutput, ProviderError> {
        let request = ImageRequest {
            model: &self.image_model,
            prompt,
            size: IMAGE_SIZE,
            quality: IMAGE_QUALITY,
            n: 1,
            response_format: "url",
        };

        let response: ImageResponse = self.post("images/generations", &request).await?;
        response
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .map(ImageOutput::Hosted)
            .ok_or_else(|| ProviderError::new(PROVIDER, "No image URL in response"))
    }

    fn delivery(&self) -> ImageDelivery {
        ImageDelivery::Hosted
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4-turbo-preview",
            messages: vec![ChatMessage {
                role: "user",
                content: "plan a trip",
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: 0.7,
            top_p: None,
            max_tokens: Some(1500),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["max_tokens"], 1500);
        assert!(value.get("top_p").is_none());
    }

    #[test]
    fn test_chat_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "{\"destinations\": []}" },
                "finish_reason": "stop"
            }]
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some(r#"{"destinations": []}"#)
        );
    }

    #[test]
    fn test_image_response_deserialization() {
        let json = r#"{ "created": 1700000000, "data": [{ "url": "https://images.example.com/a.png", "revised_prompt": "..." }] }"#;

        let response: ImageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.data[0].url.as_deref(),
            Some("https://images.example.com/a.png")
        );
    }

    #[test]
    fn test_error_from_body_includes_code() {
        let body = r#"{ "error": { "message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key" } }"#;
        let err = error_from_body(401, body);

        assert_eq!(err.status, Some(401));
        assert_eq!(
            err.message,
            "Incorrect API key provided (invalid_request_error, invalid_api_key)"
        );
    }

    #[test]
    fn test_error_from_body_quota() {
        let body = r#"{ "error": { "message": "You exceeded your current quota", "type": "insufficient_quota", "code": null } }"#;
        let err = error_from_body(429, body);
        assert!(err.message.contains("insufficient_quota"));
    }
}
