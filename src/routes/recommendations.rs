use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{DestinationsResponse, PastTrip, RecommendationResult, TravelRequest},
    state::AppState,
};

/// Handler for the destination recommendations endpoint
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<TravelRequest>, JsonRejection>,
) -> AppResult<Json<DestinationsResponse>> {
    let Json(request) = payload?;

    tracing::info!(
        request_id = %request_id,
        is_specific_place = request.basic_info.is_specific_place,
        travelers = request.basic_info.travelers,
        "Generating travel recommendations"
    );

    let response = state.recommendations.generate_recommendations(&request).await?;
    Ok(Json(response))
}

/// Handler for the personalized trip suggestion endpoint
pub async fn suggest_trip(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    user_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<Vec<PastTrip>>, JsonRejection>,
) -> AppResult<Json<RecommendationResult>> {
    let Path(user_id) = user_id?;
    let Json(past_trips) = payload?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        trips = past_trips.len(),
        "Suggesting trip"
    );

    let result = state.recommendations.suggest_trip(user_id, &past_trips).await?;
    Ok(Json(result))
}
