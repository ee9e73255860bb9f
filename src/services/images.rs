//! Destination image synthesis with bounded retries
//!
//! Image failures are never fatal to a recommendation: after the last attempt the
//! engine gives up and the destination is returned without an image.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use std::sync::Arc;
use tracing::instrument;

use crate::services::prompt::image_prompt;
use crate::services::providers::{
    GeneratedContent, GenerationConfig, ImageDelivery, ImageGenerator, ImageOutput, ImagePayload,
    ProviderError,
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Lower-variance sampling for photographic output
pub const IMAGE_SAMPLING: GenerationConfig = GenerationConfig {
    temperature: 0.7,
    top_p: Some(0.9),
    top_k: Some(40),
    max_tokens: None,
};

/// Nesting depth of `b'...'` envelopes we are willing to unwrap
const MAX_ENVELOPE_DEPTH: usize = 3;

/// Why a single image attempt failed
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ImageAttemptError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("no candidates in response")]
    NoCandidates,

    #[error("no content in response")]
    NoContent,

    #[error("no parts in content")]
    NoParts,

    #[error("no image found in response parts")]
    NoImagePart,

    #[error("invalid image payload: {0}")]
    InvalidPayload(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ImageSynthesisError {
    #[error("image synthesis exhausted after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: ImageAttemptError,
    },
}

/// Acquires one image per destination from the configured image provider
#[derive(Clone)]
pub struct ImageSynthesizer {
    generator: Arc<dyn ImageGenerator>,
    max_attempts: u32,
}

impl ImageSynthesizer {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self::with_max_attempts(generator, DEFAULT_MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(generator: Arc<dyn ImageGenerator>, max_attempts: u32) -> Self {
        Self {
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Returns a data URI (or hosted URL) for the destination, or `None` once
    /// every attempt has failed
    pub async fn synthesize(
        &self,
        city: &str,
        location_label: &str,
        is_regional: bool,
    ) -> Option<String> {
        match self.try_synthesize(city, location_label, is_regional).await {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(
                    city = %city,
                    location = %location_label,
                    provider = self.generator.name(),
                    error = %e,
                    "Continuing without destination image"
                );
                None
            }
        }
    }

    #[instrument(skip(self), fields(provider = self.generator.name()))]
    async fn try_synthesize(
        &self,
        city: &str,
        location_label: &str,
        is_regional: bool,
    ) -> Result<String, ImageSynthesisError> {
        let delivery = self.generator.delivery();
        // Hosted providers handle their own reliability; one call is enough
        let attempts = match delivery {
            ImageDelivery::Inline => self.max_attempts,
            ImageDelivery::Hosted => 1,
        };
        let prompt = image_prompt(
            city,
            location_label,
            is_regional,
            delivery == ImageDelivery::Inline,
        );

        let mut last = ImageAttemptError::NoCandidates;
        for attempt in 1..=attempts {
            match self.attempt(&prompt).await {
                Ok(image) => {
                    tracing::info!(attempt, "Destination image generated");
                    return Ok(image);
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = attempts,
                        reason = %e,
                        "Image attempt failed"
                    );
                    last = e;
                }
            }
        }

        Err(ImageSynthesisError::Exhausted { attempts, last })
    }

    async fn attempt(&self, prompt: &str) -> Result<String, ImageAttemptError> {
        match self.generator.generate_image(prompt, &IMAGE_SAMPLING).await? {
            ImageOutput::Hosted(url) => Ok(url),
            ImageOutput::Inline(content) => extract_data_uri(&content),
        }
    }
}

/// Walks candidates → content → parts to the first image and renders it as a data URI
pub fn extract_data_uri(content: &GeneratedContent) -> Result<String, ImageAttemptError> {
    let candidate = content
        .candidates
        .first()
        .ok_or(ImageAttemptError::NoCandidates)?;
    let content = candidate
        .content
        .as_ref()
        .ok_or(ImageAttemptError::NoContent)?;
    if content.parts.is_empty() {
        return Err(ImageAttemptError::NoParts);
    }

    let image = content.image_part().ok_or(ImageAttemptError::NoImagePart)?;
    let payload = normalize_payload(&image.data)?;

    Ok(format!("data:{};base64,{}", image.mime_type, payload))
}

/// Normalizes an image payload into canonical standard base64
///
/// Accepts raw bytes, standard or URL-safe base64 text (line breaks tolerated),
/// and stringified bytes literals such as `b'iVBO...'`, including double wrapping.
pub fn normalize_payload(payload: &ImagePayload) -> Result<String, ImageAttemptError> {
    match payload {
        ImagePayload::Bytes(bytes) => Ok(STANDARD.encode(bytes)),
        ImagePayload::Text(text) => {
            let mut candidate = text.trim();
            for _ in 0..=MAX_ENVELOPE_DEPTH {
                if let Some(canonical) = canonical_base64(candidate) {
                    return Ok(canonical);
                }
                match strip_bytes_envelope(candidate) {
                    Some(inner) => candidate = inner.trim(),
                    None => break,
                }
            }

            Err(ImageAttemptError::InvalidPayload(format!(
                "payload of {} chars is not valid base64",
                text.len()
            )))
        }
    }
}

fn canonical_base64(text: &str) -> Option<String> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    if STANDARD.decode(&compact).is_ok() {
        return Some(compact);
    }

    URL_SAFE
        .decode(&compact)
        .ok()
        .map(|bytes| STANDARD.encode(bytes))
}

/// Strips one `b'...'`, `b"..."` or `'b'...''` layer
fn strip_bytes_envelope(text: &str) -> Option<&str> {
    if let Some(inner) = text.strip_prefix("'b'").and_then(|t| t.strip_suffix("''")) {
        return Some(inner);
    }

    text.strip_prefix("b'")
        .and_then(|t| t.strip_suffix('\''))
        .or_else(|| text.strip_prefix("b\"").and_then(|t| t.strip_suffix('"')))
}
