use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{DestinationsResponse, PastTrip, RecommendationResult, TravelRequest},
    services::{
        images::ImageSynthesizer,
        personalization::{self, DirectivePicker, RandomDirectivePicker, DIRECTIVES},
        providers::TextGenerator,
        sanitizer,
    },
};

/// Generates destination recommendations and personalized trip suggestions
///
/// Holds read-only provider handles only, so one instance is shared across
/// concurrent requests. Each request runs its stages sequentially.
#[derive(Clone)]
pub struct RecommendationService {
    text: Arc<dyn TextGenerator>,
    images: ImageSynthesizer,
    directives: Arc<dyn DirectivePicker>,
}

impl RecommendationService {
    pub fn new(text: Arc<dyn TextGenerator>, images: ImageSynthesizer) -> Self {
        Self {
            text,
            images,
            directives: Arc::new(RandomDirectivePicker),
        }
    }

    /// Replaces the diversification directive source
    pub fn with_directive_picker(mut self, directives: Arc<dyn DirectivePicker>) -> Self {
        self.directives = directives;
        self
    }

    /// Recommends destinations for a travel request, each with an image when one
    /// could be produced
    ///
    /// Destinations keep the provider's order. Images are generated one
    /// destination at a time; an image failure leaves `image_url` empty and never
    /// fails the request.
    #[instrument(skip_all, fields(provider = self.text.name()))]
    pub async fn generate_recommendations(
        &self,
        request: &TravelRequest,
    ) -> AppResult<DestinationsResponse> {
        request.validate()?;

        let dialect = self.text.dialect();
        let prompt = dialect.destinations_prompt(request);
        tracing::debug!(prompt = %prompt, "Generated recommendation prompt");

        let raw = self.text.generate(&prompt, &dialect.sampling()).await?;

        let mut destinations = sanitizer::parse_destinations(&raw).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %raw,
                "Provider returned an invalid recommendation"
            );
            e
        })?;

        tracing::info!(
            destinations = destinations.len(),
            "Recommendations parsed, generating images"
        );

        for destination in destinations.iter_mut() {
            let location = &destination.destination;
            destination.image_url = self
                .images
                .synthesize(&location.city, location.label(), location.is_regional())
                .await;
        }

        let with_images = destinations
            .iter()
            .filter(|d| d.image_url.is_some())
            .count();
        tracing::info!(
            destinations = destinations.len(),
            with_images,
            "Recommendations completed"
        );

        Ok(DestinationsResponse { destinations })
    }

    /// Suggests one new trip based on the user's travel history
    pub async fn suggest_trip(
        &self,
        user_id: Uuid,
        past_trips: &[PastTrip],
    ) -> AppResult<RecommendationResult> {
        self.suggest_trip_on(user_id, past_trips, Local::now().date_naive())
            .await
    }

    #[instrument(
        skip(self, past_trips),
        fields(provider = self.text.name(), trips = past_trips.len())
    )]
    pub async fn suggest_trip_on(
        &self,
        user_id: Uuid,
        past_trips: &[PastTrip],
        today: NaiveDate,
    ) -> AppResult<RecommendationResult> {
        let directive = self.directives.pick(&DIRECTIVES);
        let prompt = personalization::suggestion_prompt(past_trips, directive, today);
        tracing::debug!(directive = %directive, "Generated suggestion prompt");

        let sampling = self.text.dialect().sampling();
        let raw = self.text.generate(&prompt, &sampling).await?;

        let result = sanitizer::parse_recommendation(&raw).map_err(|e| {
            tracing::error!(error = %e, response = %raw, "Provider returned an invalid suggestion");
            e
        })?;

        tracing::info!(
            destination = %result.data.destination.city,
            "Trip suggestion completed"
        );

        Ok(result)
    }
}
