use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use travel_planner_api::{
    routes::create_router,
    services::{
        prompt::PromptDialect,
        providers::{
            GeneratedContent, GenerationConfig, ImageDelivery, ImageGenerator, ImageOutput,
            ProviderError, TextGenerator,
        },
        ImageSynthesizer, RecommendationService,
    },
    state::AppState,
};

const FRANCE: &str = r#"```json
{
    "destinations": [{
        "destination": { "city": "Annecy", "country": "France" },
        "description": "Lakeside town in the Alps.",
        "highlights": ["Lake Annecy", "Palais de l'Isle", "Old town canals"]
    }]
}
```"#;

const SUGGESTION: &str = r#"{
    "data": {
        "destination": { "city": "Porto", "country": "Portugal" },
        "isSpecificPlace": true,
        "startDate": "2026-11-10",
        "endDate": "2026-11-15",
        "travelers": 2,
        "dining": { "localCuisine": true }
    },
    "explanation": {
        "summary": "Riverside wine cellars and tiled facades.",
        "highlights": ["Ribeira", "Livraria Lello"]
    }
}"#;

/// Text provider that answers every prompt with the same canned result
struct StubText {
    response: Result<&'static str, ProviderError>,
    calls: AtomicUsize,
}

impl StubText {
    fn ok(response: &'static str) -> Self {
        Self {
            response: Ok(response),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(error: ProviderError) -> Self {
        Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for StubText {
    async fn generate(
        &self,
        _prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().map(str::to_string)
    }

    fn dialect(&self) -> PromptDialect {
        PromptDialect::Gemini
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Inline image provider returning a one-pixel PNG
#[derive(Default)]
struct StubImages {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl ImageGenerator for StubImages {
    async fn generate_image(
        &self,
        _prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<ImageOutput, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content: GeneratedContent = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Annecy at dusk" },
                { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==" } }
            ] } }]
        }))
        .map_err(|e| ProviderError::new("stub", e.to_string()))?;
        Ok(ImageOutput::Inline(content))
    }

    fn delivery(&self) -> ImageDelivery {
        ImageDelivery::Inline
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn create_test_app(text: Arc<StubText>, images: Arc<StubImages>) -> Router {
    create_router(Arc::new(test_state(text, images)))
}

fn test_state(text: Arc<StubText>, images: Arc<StubImages>) -> AppState {
    AppState::new(RecommendationService::new(text, ImageSynthesizer::new(images)))
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/recommendations")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap()
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn france_request() -> Value {
    json!({
        "basicInfo": {
            "isSpecificPlace": true,
            "specificPlace": "France",
            "startDate": "2026-11-01",
            "endDate": "2026-11-08",
            "travelers": 2
        },
        "travelPreferences": {
            "tripStyles": ["relaxation", "cultural"],
            "accommodation": ["boutique"],
            "transportation": ["train"]
        },
        "diningPreferences": ["localCuisine"],
        "activities": ["hiking"]
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(Arc::new(StubText::ok(FRANCE)), Arc::default());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_specific_country_returns_one_destination_with_image() {
    let images = Arc::new(StubImages::default());
    let app = create_test_app(Arc::new(StubText::ok(FRANCE)), images.clone());

    let (status, body) = post_json(app, "/api/v1/recommendations", france_request()).await;

    assert_eq!(status, StatusCode::OK);
    let destinations = body["destinations"].as_array().unwrap();
    assert_eq!(destinations.len(), 1);
    assert_eq!(destinations[0]["destination"]["city"], "Annecy");
    assert_eq!(destinations[0]["destination"]["country"], "France");
    assert!(destinations[0]["destination"].get("state").is_none());
    assert!(destinations[0]["imageUrl"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert_eq!(images.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_highlights_fails_before_images() {
    let raw = r#"{"destinations": [{"destination": {"city": "Annecy", "country": "France"}, "description": "Lakeside town."}]}"#;
    let images = Arc::new(StubImages::default());
    let app = create_test_app(Arc::new(StubText::ok(raw)), images.clone());

    let (status, body) = post_json(app, "/api/v1/recommendations", france_request()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Invalid response format: Missing required field: destinations[0].highlights"
    );
    assert_eq!(images.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rate_limited_provider_maps_to_429() {
    let text = Arc::new(StubText::failing(ProviderError::new(
        "stub",
        "RESOURCE_EXHAUSTED: Quota exceeded",
    )));
    let app = create_test_app(text, Arc::default());

    let (status, body) = post_json(app, "/api/v1/recommendations", france_request()).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests, please try again later");
}

#[tokio::test]
async fn test_invalid_api_key_maps_to_401() {
    let text = Arc::new(StubText::failing(ProviderError::with_status(
        "stub",
        400,
        "API key not valid. Please pass a valid API key.",
    )));
    let app = create_test_app(text, Arc::default());

    let (status, body) = post_json(app, "/api/v1/recommendations", france_request()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or missing API key");
}

#[tokio::test]
async fn test_blank_specific_place_is_rejected() {
    let text = Arc::new(StubText::ok(FRANCE));
    let app = create_test_app(text.clone(), Arc::default());
    let mut request = france_request();
    request["basicInfo"]["specificPlace"] = json!("   ");

    let (status, body) = post_json(app, "/api/v1/recommendations", request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(text.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = create_test_app(Arc::new(StubText::ok(FRANCE)), Arc::default());

    let (status, body) =
        post_json(app, "/api/v1/recommendations", json!({ "basicInfo": 7 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_suggest_trip() {
    let images = Arc::new(StubImages::default());
    let app = create_test_app(Arc::new(StubText::ok(SUGGESTION)), images.clone());
    let uri = format!("/api/v1/recommendations/suggest-trip/{}", uuid::Uuid::new_v4());

    let (status, body) = post_json(
        app,
        &uri,
        json!([
            { "destinationName": "Lisbon", "tripHighlights": "Belém at sunrise" },
            { "destinationName": "Lisbon" },
            { "destinationName": "Seville" }
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["destination"]["city"], "Porto");
    assert_eq!(body["data"]["travelers"], 2);
    assert_eq!(body["explanation"]["highlights"][0], "Ribeira");
    assert_eq!(images.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_suggest_trip_rejects_non_uuid_user_id_as_json() {
    let text = Arc::new(StubText::ok(SUGGESTION));
    let app = create_test_app(text.clone(), Arc::default());

    let (status, body) = post_json(
        app,
        "/api/v1/recommendations/suggest-trip/user-42",
        json!([{ "destinationName": "Lisbon" }]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("UUID"));
    assert_eq!(text.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cors_allows_credentials_for_configured_frontend() {
    let state = test_state(Arc::new(StubText::ok(FRANCE)), Arc::default())
        .with_allowed_origin("http://localhost:5173");
    let app = create_router(Arc::new(state));

    let response = app.oneshot(preflight("http://localhost:5173")).await.unwrap();

    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn test_cors_any_origin_without_credentials() {
    let app = create_test_app(Arc::new(StubText::ok(FRANCE)), Arc::default());

    let response = app.oneshot(preflight("http://elsewhere.test")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers.get("access-control-allow-credentials").is_none());
}
