use std::sync::Arc;

use crate::{
    config::{Config, ProviderKind},
    services::{
        providers::{GeminiClient, ImageGenerator, OpenAiClient, TextGenerator},
        ImageSynthesizer, RecommendationService,
    },
};

/// Shared application state
///
/// Everything in here is read-only after startup.
pub struct AppState {
    pub recommendations: RecommendationService,
    pub allowed_origin: Option<String>,
}

impl AppState {
    pub fn new(recommendations: RecommendationService) -> Self {
        Self {
            recommendations,
            allowed_origin: None,
        }
    }

    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origin = Some(origin.into());
        self
    }

    /// Builds provider clients for the configured text and image providers
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let text: Arc<dyn TextGenerator> = match config.text_provider {
            ProviderKind::Gemini => Arc::new(gemini_client(config)?),
            ProviderKind::OpenAi => Arc::new(openai_client(config)?),
        };
        let image: Arc<dyn ImageGenerator> = match config.image_provider() {
            ProviderKind::Gemini => Arc::new(gemini_client(config)?),
            ProviderKind::OpenAi => Arc::new(openai_client(config)?),
        };

        tracing::info!(
            text_provider = text.name(),
            image_provider = image.name(),
            image_max_attempts = config.image_max_attempts,
            "Providers configured"
        );

        let images = ImageSynthesizer::with_max_attempts(image, config.image_max_attempts);
        let state = Self::new(RecommendationService::new(text, images));

        Ok(match config.frontend_url.as_deref().map(str::trim) {
            Some(origin) if !origin.is_empty() => state.with_allowed_origin(origin),
            _ => state,
        })
    }
}

fn gemini_client(config: &Config) -> anyhow::Result<GeminiClient> {
    let api_key = config
        .api_key(ProviderKind::Gemini)
        .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY environment variable is not set"))?;
    Ok(GeminiClient::new(
        api_key.to_string(),
        config.gemini_api_url.clone(),
        config.gemini_text_model.clone(),
        config.gemini_image_model.clone(),
    ))
}

fn openai_client(config: &Config) -> anyhow::Result<OpenAiClient> {
    let api_key = config
        .api_key(ProviderKind::OpenAi)
        .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY environment variable is not set"))?;
    Ok(OpenAiClient::new(
        api_key.to_string(),
        config.openai_api_url.clone(),
        config.openai_text_model.clone(),
        config.openai_image_model.clone(),
    ))
}
